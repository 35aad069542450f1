/// The live animation clock, advanced once per host tick while running.
///
/// Time is measured in ticks; strokes record it as their birth time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiveAnimation {
    time: f64,
    running: bool,
}

impl LiveAnimation {
    /// Stopped clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let ticks advance the clock.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Freeze the clock.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether ticks advance the clock.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current clock value, in ticks.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Jump the clock to `time`.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Advance by one tick. Returns `true` when a frame should be rendered.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.time += 1.0;
        true
    }
}
