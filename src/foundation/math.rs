use crate::foundation::core::Point;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Composite one premultiplied RGBA8 pixel over opaque white, returning straight RGB.
pub(crate) fn flatten_over_white(px: [u8; 4]) -> [u8; 3] {
    let inv = 255 - u16::from(px[3]);
    let ch = |c: u8| (u16::from(c) + mul_div255_u16(255, inv)).min(255) as u8;
    [ch(px[0]), ch(px[1]), ch(px[2])]
}

/// Inclusive circle containment.
pub(crate) fn point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    p.distance(center) <= radius
}

/// `p` moved by `amount` along the left-hand normal of the segment `prev -> p`.
pub(crate) fn displace_along_normal(prev: Point, p: Point, amount: f64) -> Point {
    let angle = (p.y - prev.y).atan2(p.x - prev.x) + std::f64::consts::FRAC_PI_2;
    Point::new(p.x + angle.cos() * amount, p.y + angle.sin() * amount)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
