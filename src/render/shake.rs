/// Source of uniform samples in `[0, 1)` for the shake offset.
///
/// Two samples are drawn per shaken stroke per frame: x first, then y.
pub trait ShakeSource {
    /// Next sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<S: ShakeSource + ?Sized> ShakeSource for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Seedable SplitMix64 generator.
#[derive(Clone, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Generator with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeded from the wall clock; for interactive sessions only.
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED);
        Self::new(nanos)
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

impl ShakeSource for Rng64 {
    fn next_unit(&mut self) -> f64 {
        self.next_f64_01()
    }
}

/// Always 0.5, which yields a zero offset.
#[derive(Clone, Copy, Debug, Default)]
pub struct CenteredShake;

impl ShakeSource for CenteredShake {
    fn next_unit(&mut self) -> f64 {
        0.5
    }
}

/// Replays a fixed sequence, wrapping around. An empty script behaves like [`CenteredShake`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedShake {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedShake {
    /// Script replaying `values` in order.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Samples drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl ShakeSource for ScriptedShake {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.5;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/shake.rs"]
mod tests;
