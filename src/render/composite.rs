use crate::foundation::{
    error::{DrawerzError, DrawerzResult},
    math::mul_div255_u16,
};

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel, with the source scaled by `opacity`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - sa;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u16(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over of whole RGBA8 buffers of equal size.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> DrawerzResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(DrawerzError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}
