use rayon::prelude::*;

use crate::{
    composite::blend::{blend_rgba8, premultiply_in_place},
    document::model::{BlendMode, CelContent, Document, Layer, LayerKind},
    document::visibility::LayerVisibility,
    foundation::core::{PixelBuffer, Point, pixel_len},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
    foundation::math::mul_div255_u8,
    process::options::ProcessorOptions,
};

/// Flattens frames of one document.
///
/// Layer visibility is resolved once on construction; each [`FrameCompositor::flatten`] call is
/// then a pure function of the frame index, so one compositor can be shared across threads.
pub struct FrameCompositor<'a> {
    doc: &'a Document,
    visibility: LayerVisibility,
    options: &'a ProcessorOptions,
}

impl<'a> FrameCompositor<'a> {
    pub fn new(doc: &'a Document, options: &'a ProcessorOptions) -> Self {
        Self {
            doc,
            visibility: LayerVisibility::compute(doc),
            options,
        }
    }

    /// Effective visibility table for the document.
    pub fn visibility(&self) -> &LayerVisibility {
        &self.visibility
    }

    /// Blend every participating image layer of `frame` bottom to top.
    ///
    /// Missing cels are not an error; a frame with nothing to draw yields a transparent buffer of
    /// the frame's size.
    pub fn flatten(&self, frame: usize) -> SpriteforgeResult<PixelBuffer> {
        let Some(f) = self.doc.frames.get(frame) else {
            return Err(SpriteforgeError::validation(format!(
                "frame {frame} is out of bounds ({} frames)",
                self.doc.frames.len()
            )));
        };

        let mut out = PixelBuffer::transparent(f.width, f.height);
        for (idx, layer) in self.doc.layers.iter().enumerate() {
            if !self.participates(idx, layer) {
                continue;
            }
            let Some(cel) = self.doc.resolve_cel(frame, idx) else {
                continue;
            };
            let CelContent::Image {
                position,
                width,
                height,
                pixels,
            } = &cel.content
            else {
                continue;
            };

            if pixels.len() != pixel_len(*width, *height) {
                return Err(SpriteforgeError::validation(format!(
                    "cel on frame {frame}, layer {idx} has {} bytes for {width}x{height}",
                    pixels.len()
                )));
            }

            let opacity = mul_div255_u8(u16::from(layer.opacity), u16::from(cel.opacity));
            if opacity == 0 {
                continue;
            }
            blend_cel(
                &mut out,
                CelPixels {
                    position: *position,
                    width: *width,
                    height: *height,
                    pixels,
                },
                layer.blend_mode,
                opacity,
            );
        }

        if self.options.premultiply_alpha {
            premultiply_in_place(&mut out.data);
            out.premultiplied = true;
        }
        Ok(out)
    }

    fn participates(&self, idx: usize, layer: &Layer) -> bool {
        if layer.kind != LayerKind::Image || layer.flags.reference {
            return false;
        }
        if layer.flags.background && !self.options.include_background_layer {
            return false;
        }
        !self.options.only_visible_layers || self.visibility.is_visible(idx)
    }
}

/// Flatten a single frame.
pub fn flatten_frame(
    doc: &Document,
    frame: usize,
    options: &ProcessorOptions,
) -> SpriteforgeResult<PixelBuffer> {
    FrameCompositor::new(doc, options).flatten(frame)
}

/// Flatten every frame, in frame order.
#[tracing::instrument(skip(doc, options), fields(doc = %doc.name, frames = doc.frames.len()))]
pub fn flatten_frames(
    doc: &Document,
    options: &ProcessorOptions,
) -> SpriteforgeResult<Vec<PixelBuffer>> {
    let compositor = FrameCompositor::new(doc, options);
    let frames = 0..doc.frames.len();

    if !options.threading.parallel {
        return frames.map(|f| compositor.flatten(f)).collect();
    }

    let pool = build_thread_pool(options.threading.threads)?;
    tracing::debug!(threads = pool.current_num_threads(), "flattening frames in parallel");
    // Indexed collect keeps frame order identical to the sequential path.
    pool.install(|| {
        frames
            .into_par_iter()
            .map(|f| compositor.flatten(f))
            .collect::<SpriteforgeResult<Vec<_>>>()
    })
}

struct CelPixels<'p> {
    position: Point,
    width: u32,
    height: u32,
    pixels: &'p [u8],
}

fn blend_cel(dst: &mut PixelBuffer, cel: CelPixels<'_>, mode: BlendMode, opacity: u8) {
    let (dw, dh) = (i64::from(dst.width), i64::from(dst.height));
    let (px, py) = (i64::from(cel.position.x), i64::from(cel.position.y));

    let x0 = (-px).clamp(0, i64::from(cel.width));
    let y0 = (-py).clamp(0, i64::from(cel.height));
    let x1 = (dw - px).clamp(0, i64::from(cel.width));
    let y1 = (dh - py).clamp(0, i64::from(cel.height));

    for sy in y0..y1 {
        let src_row = (sy as usize) * (cel.width as usize);
        let dst_row = ((py + sy) as usize) * (dst.width as usize);
        for sx in x0..x1 {
            let s = (src_row + sx as usize) * 4;
            let d = (dst_row + (px + sx) as usize) * 4;
            let src = [
                cel.pixels[s],
                cel.pixels[s + 1],
                cel.pixels[s + 2],
                cel.pixels[s + 3],
            ];
            let backdrop = [dst.data[d], dst.data[d + 1], dst.data[d + 2], dst.data[d + 3]];
            let out = blend_rgba8(mode, backdrop, src, opacity);
            dst.data[d..d + 4].copy_from_slice(&out);
        }
    }
}

/// Pool sized to `threads`, or rayon's default when unset.
fn build_thread_pool(threads: Option<usize>) -> SpriteforgeResult<rayon::ThreadPool> {
    let builder = match threads {
        Some(0) => {
            return Err(SpriteforgeError::validation(
                "threading 'threads' must be >= 1 when set",
            ));
        }
        Some(n) => rayon::ThreadPoolBuilder::new().num_threads(n),
        None => rayon::ThreadPoolBuilder::new(),
    };
    builder
        .build()
        .map_err(|e| SpriteforgeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/composite/flatten.rs"]
mod tests;
