use crate::{
    document::model::BlendMode,
    foundation::core::Rgba8,
    foundation::math::{div255_u8, mul_div255_u8},
};

/// Composite one straight-alpha pixel over another.
///
/// `mode` mixes the backdrop and source colors, the mix is weighted by backdrop coverage
/// (a fully transparent backdrop leaves the source color untouched), and the result is merged
/// with straight-alpha source-over at `opacity`.
pub fn blend_rgba8(mode: BlendMode, backdrop: Rgba8, src: Rgba8, opacity: u8) -> Rgba8 {
    if mode == BlendMode::Normal || backdrop[3] == 0 {
        return over(backdrop, src, opacity);
    }

    let mixed = match mode {
        BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => {
            non_separable(mode, backdrop, src)
        }
        _ => {
            let mut out = [0u8; 3];
            for i in 0..3 {
                out[i] = separable(mode, backdrop[i], src[i]);
            }
            out
        }
    };

    // Cs' = (1 - ab) * Cs + ab * B(Cb, Cs)
    let ba = u16::from(backdrop[3]);
    let inv = 255 - ba;
    let mut weighted = src;
    for i in 0..3 {
        weighted[i] = mul_div255_u8(u16::from(src[i]), inv)
            .saturating_add(mul_div255_u8(u16::from(mixed[i]), ba));
    }
    over(backdrop, weighted, opacity)
}

/// Straight-alpha source-over.
pub(crate) fn over(backdrop: Rgba8, src: Rgba8, opacity: u8) -> Rgba8 {
    let sa = mul_div255_u8(u16::from(src[3]), u16::from(opacity));
    let ba = backdrop[3];
    // An empty backdrop takes the source color as-is, even at zero coverage.
    if ba == 0 {
        return [src[0], src[1], src[2], sa];
    }
    if sa == 0 {
        return backdrop;
    }

    let ra = i32::from(sa) + i32::from(ba) - i32::from(mul_div255_u8(u16::from(ba), u16::from(sa)));
    let mut out = [0u8; 4];
    for i in 0..3 {
        let bc = i32::from(backdrop[i]);
        let sc = i32::from(src[i]);
        out[i] = (bc + (sc - bc) * i32::from(sa) / ra).clamp(0, 255) as u8;
    }
    out[3] = ra.clamp(0, 255) as u8;
    out
}

/// Premultiply every pixel in place.
pub(crate) fn premultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

fn separable(mode: BlendMode, b: u8, s: u8) -> u8 {
    match mode {
        BlendMode::Normal => s,
        BlendMode::Multiply => multiply(b, s),
        BlendMode::Screen => screen(b, s),
        BlendMode::Overlay => hard_light(s, b),
        BlendMode::Darken => b.min(s),
        BlendMode::Lighten => b.max(s),
        BlendMode::ColorDodge => color_dodge(b, s),
        BlendMode::ColorBurn => color_burn(b, s),
        BlendMode::HardLight => hard_light(b, s),
        BlendMode::SoftLight => soft_light(b, s),
        BlendMode::Difference => b.abs_diff(s),
        BlendMode::Exclusion => {
            let v = i32::from(b) + i32::from(s) - 2 * i32::from(multiply(b, s));
            v.clamp(0, 255) as u8
        }
        BlendMode::Addition => b.saturating_add(s),
        BlendMode::Subtract => b.saturating_sub(s),
        BlendMode::Divide => divide(b, s),
        BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => s,
    }
}

fn multiply(b: u8, s: u8) -> u8 {
    mul_div255_u8(u16::from(b), u16::from(s))
}

fn screen(b: u8, s: u8) -> u8 {
    let v = u16::from(b) + u16::from(s) - u16::from(multiply(b, s));
    v.min(255) as u8
}

fn hard_light(b: u8, s: u8) -> u8 {
    let s2 = u16::from(s) * 2;
    if s < 128 {
        mul_div255_u8(u16::from(b), s2)
    } else {
        screen(b, (s2 - 255) as u8)
    }
}

fn color_dodge(b: u8, s: u8) -> u8 {
    if b == 0 {
        return 0;
    }
    let inv = 255 - s;
    if b >= inv {
        255
    } else {
        div255_u8(b, inv)
    }
}

fn color_burn(b: u8, s: u8) -> u8 {
    if b == 255 {
        return 255;
    }
    let inv = 255 - b;
    if inv >= s {
        0
    } else {
        255 - div255_u8(inv, s)
    }
}

fn soft_light(b: u8, s: u8) -> u8 {
    let cb = f64::from(b) / 255.0;
    let cs = f64::from(s) / 255.0;
    let r = if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    };
    to_u8(r)
}

fn divide(b: u8, s: u8) -> u8 {
    if b == 0 {
        0
    } else if b >= s {
        255
    } else {
        div255_u8(b, s)
    }
}

type Rgb = [f64; 3];

fn non_separable(mode: BlendMode, backdrop: Rgba8, src: Rgba8) -> [u8; 3] {
    let cb = unit_rgb(backdrop);
    let cs = unit_rgb(src);
    let r = match mode {
        BlendMode::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
        BlendMode::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
        BlendMode::Color => set_lum(cs, lum(cb)),
        BlendMode::Luminosity => set_lum(cb, lum(cs)),
        _ => cs,
    };
    [to_u8(r[0]), to_u8(r[1]), to_u8(r[2])]
}

fn unit_rgb(px: Rgba8) -> Rgb {
    [
        f64::from(px[0]) / 255.0,
        f64::from(px[1]) / 255.0,
        f64::from(px[2]) / 255.0,
    ]
}

fn to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn lum(c: Rgb) -> f64 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: Rgb) -> Rgb {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: Rgb, l: f64) -> Rgb {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: Rgb) -> f64 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: Rgb, s: f64) -> Rgb {
    let mut idx = [0usize, 1, 2];
    idx.sort_by(|&a, &b| c[a].total_cmp(&c[b]));
    let [min, mid, max] = idx;

    let mut out = [0.0; 3];
    if c[max] > c[min] {
        out[mid] = (c[mid] - c[min]) * s / (c[max] - c[min]);
        out[max] = s;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
