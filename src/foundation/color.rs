use serde::{Deserialize, Serialize};

/// Opaque stroke color. Serialized as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl StrokeColor {
    /// Pure black, the default pen color.
    pub const BLACK: StrokeColor = StrokeColor::rgb(0, 0, 0);
    /// Pure white, the canvas background.
    pub const WHITE: StrokeColor = StrokeColor::rgb(255, 255, 255);

    /// Build a color from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive, `#` optional).
    pub fn from_hex(s: &str) -> Result<Self, String> {
        parse_hex(s)
    }

    /// Parse a CSS-style color as found in vector markup: hex, `rgb(r, g, b)` or a named color.
    ///
    /// Returns `None` for `none`, `transparent`, gradients and anything unrecognized.
    pub fn from_css(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex(s).ok();
        }
        let lower = s.to_ascii_lowercase();
        if let Some(inner) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_fn(inner);
        }
        named(&lower)
    }

    pub(crate) fn to_vello(self, alpha: f32) -> vello_cpu::peniko::Color {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, a)
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for StrokeColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_css(s).ok_or_else(|| format!("unrecognized color \"{s}\""))
    }
}

impl Serialize for StrokeColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for StrokeColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> Result<StrokeColor, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    match s.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, i) in out.iter_mut().zip(0..3) {
                let nib = hex_byte(&s[i..i + 1])?;
                *slot = nib * 17;
            }
            Ok(StrokeColor::rgb(out[0], out[1], out[2]))
        }
        6 => Ok(StrokeColor::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        _ => Err("hex color must be #RGB or #RRGGBB (case-insensitive)".to_owned()),
    }
}

fn parse_rgb_fn(inner: &str) -> Option<StrokeColor> {
    let mut channels = inner.split(',').map(|c| {
        let c = c.trim();
        match c.strip_suffix('%') {
            Some(pct) => pct
                .trim()
                .parse::<f64>()
                .ok()
                .map(|v| (v.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8),
            None => c.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8),
        }
    });
    let r = channels.next()??;
    let g = channels.next()??;
    let b = channels.next()??;
    if channels.next().is_some() {
        return None;
    }
    Some(StrokeColor::rgb(r, g, b))
}

fn named(name: &str) -> Option<StrokeColor> {
    let rgb = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "crimson" => (220, 20, 60),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "tomato" => (255, 99, 71),
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "darkblue" => (0, 0, 139),
        "darkgreen" => (0, 100, 0),
        "darkred" => (139, 0, 0),
        _ => return None,
    };
    Some(StrokeColor::rgb(rgb.0, rgb.1, rgb.2))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
