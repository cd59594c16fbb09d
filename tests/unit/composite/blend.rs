use super::*;

const OPAQUE_BLACK: Rgba8 = [0, 0, 0, 255];
const OPAQUE_WHITE: Rgba8 = [255, 255, 255, 255];

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 255), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = OPAQUE_BLACK;
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 255), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 255), src);
}

#[test]
fn over_transparent_dst_keeps_color_of_zero_alpha_src() {
    let dst = [0, 0, 0, 0];
    let src = [10, 20, 30, 0];
    assert_eq!(over(dst, src, 255), src);
}

#[test]
fn over_half_opacity_mixes_evenly() {
    assert_eq!(over(OPAQUE_BLACK, OPAQUE_WHITE, 128), [128, 128, 128, 255]);
}

#[test]
fn multiply_white_is_identity_and_black_absorbs() {
    let backdrop = [90, 160, 30, 255];
    assert_eq!(
        blend_rgba8(BlendMode::Multiply, backdrop, OPAQUE_WHITE, 255),
        backdrop
    );
    assert_eq!(
        blend_rgba8(BlendMode::Multiply, backdrop, OPAQUE_BLACK, 255),
        OPAQUE_BLACK
    );
}

#[test]
fn screen_black_is_identity() {
    let backdrop = [90, 160, 30, 255];
    assert_eq!(
        blend_rgba8(BlendMode::Screen, backdrop, OPAQUE_BLACK, 255),
        backdrop
    );
}

#[test]
fn difference_of_equal_colors_is_black() {
    let px = [90, 160, 30, 255];
    assert_eq!(blend_rgba8(BlendMode::Difference, px, px, 255), OPAQUE_BLACK);
}

#[test]
fn addition_saturates_and_subtract_floors() {
    let backdrop = [200, 10, 100, 255];
    let src = [100, 20, 100, 255];
    assert_eq!(
        blend_rgba8(BlendMode::Addition, backdrop, src, 255),
        [255, 30, 200, 255]
    );
    assert_eq!(
        blend_rgba8(BlendMode::Subtract, backdrop, src, 255),
        [100, 0, 0, 255]
    );
}

#[test]
fn divide_by_self_is_white() {
    let px = [90, 160, 30, 255];
    assert_eq!(blend_rgba8(BlendMode::Divide, px, px, 255), OPAQUE_WHITE);
}

#[test]
fn darken_and_lighten_pick_channels() {
    let backdrop = [200, 10, 100, 255];
    let src = [100, 20, 100, 255];
    assert_eq!(
        blend_rgba8(BlendMode::Darken, backdrop, src, 255),
        [100, 10, 100, 255]
    );
    assert_eq!(
        blend_rgba8(BlendMode::Lighten, backdrop, src, 255),
        [200, 20, 100, 255]
    );
}

#[test]
fn dodge_and_burn_extremes() {
    let backdrop = [128, 0, 255, 255];
    assert_eq!(
        blend_rgba8(BlendMode::ColorDodge, backdrop, OPAQUE_WHITE, 255),
        [255, 0, 255, 255]
    );
    assert_eq!(
        blend_rgba8(BlendMode::ColorBurn, backdrop, OPAQUE_BLACK, 255),
        [0, 0, 255, 255]
    );
}

#[test]
fn overlay_and_hard_light_swap_roles() {
    let dark = [40, 40, 40, 255];
    let light = [220, 220, 220, 255];
    assert_eq!(
        blend_rgba8(BlendMode::Overlay, dark, light, 255),
        blend_rgba8(BlendMode::HardLight, light, dark, 255)
    );
}

#[test]
fn soft_light_with_mid_gray_is_identity() {
    let backdrop = [90, 160, 30, 255];
    let gray = [127, 127, 127, 255];
    let out = blend_rgba8(BlendMode::SoftLight, backdrop, gray, 255);
    for i in 0..3 {
        assert!(out[i].abs_diff(backdrop[i]) <= 1, "channel {i}: {out:?}");
    }
}

#[test]
fn saturation_on_gray_backdrop_keeps_gray() {
    let gray = [100, 100, 100, 255];
    assert_eq!(
        blend_rgba8(BlendMode::Saturation, gray, [255, 0, 0, 255], 255),
        gray
    );
}

#[test]
fn luminosity_of_white_on_red_is_white() {
    assert_eq!(
        blend_rgba8(BlendMode::Luminosity, [255, 0, 0, 255], OPAQUE_WHITE, 255),
        OPAQUE_WHITE
    );
}

#[test]
fn color_mode_keeps_backdrop_luminance() {
    let backdrop = [128, 128, 128, 255];
    let out = blend_rgba8(BlendMode::Color, backdrop, [255, 0, 0, 255], 255);
    let l = |p: Rgba8| 0.3 * f64::from(p[0]) + 0.59 * f64::from(p[1]) + 0.11 * f64::from(p[2]);
    assert!((l(out) - l(backdrop)).abs() < 2.0);
    assert!(out[0] > out[1]);
}

#[test]
fn non_normal_over_transparent_backdrop_keeps_source() {
    let src = [10, 200, 30, 255];
    for mode in [
        BlendMode::Multiply,
        BlendMode::Difference,
        BlendMode::Hue,
        BlendMode::Divide,
    ] {
        assert_eq!(blend_rgba8(mode, [0, 0, 0, 0], src, 255), src, "{mode:?}");
    }
}

#[test]
fn premultiply_scales_color_by_alpha() {
    let mut data = vec![200, 100, 50, 128, 9, 9, 9, 0, 1, 2, 3, 255];
    premultiply_in_place(&mut data);
    assert_eq!(data, vec![100, 50, 25, 128, 0, 0, 0, 0, 1, 2, 3, 255]);
}
