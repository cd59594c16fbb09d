use crate::{
    composite::flatten::flatten_frames,
    document::model::{Document, Tag},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
    process::{atlas::pack_atlas, options::ProcessorOptions},
    raw::types::{RawAnimationFrame, RawAnimationTag, RawSpriteSheet},
};

/// Pack the document into an atlas and describe its animation.
///
/// Animation frame `i` shows region `i` for the source frame's duration; tags keep their range,
/// direction and repeat count.
#[tracing::instrument(skip(doc, options), fields(doc = %doc.name, frames = doc.frames.len()))]
pub fn process_sprite_sheet(
    doc: &Document,
    options: &ProcessorOptions,
) -> SpriteforgeResult<RawSpriteSheet> {
    // Tags are checked before any pixel work.
    let tags = doc
        .tags
        .iter()
        .map(|t| animation_tag(t, doc.frames.len()))
        .collect::<SpriteforgeResult<Vec<_>>>()?;

    let flattened = flatten_frames(doc, options)?;
    let atlas = pack_atlas(doc, &flattened, options)?;

    let frames = doc
        .frames
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            Ok(RawAnimationFrame {
                region: frame_index(idx)?,
                duration_ms: f.duration_ms,
            })
        })
        .collect::<SpriteforgeResult<Vec<_>>>()?;

    tracing::debug!(
        frames = frames.len(),
        tags = tags.len(),
        "built sprite sheet"
    );
    Ok(RawSpriteSheet {
        name: doc.name.clone(),
        atlas,
        frames,
        tags,
    })
}

fn animation_tag(tag: &Tag, frame_count: usize) -> SpriteforgeResult<RawAnimationTag> {
    if tag.from > tag.to || tag.to >= frame_count {
        return Err(SpriteforgeError::InvalidTagRange {
            tag: tag.name.clone(),
            from: tag.from,
            to: tag.to,
            frame_count,
        });
    }
    Ok(RawAnimationTag {
        name: tag.name.clone(),
        from: frame_index(tag.from)?,
        to: frame_index(tag.to)?,
        direction: tag.direction,
        repeat: tag.repeat,
    })
}

fn frame_index(idx: usize) -> SpriteforgeResult<u32> {
    u32::try_from(idx)
        .map_err(|_| SpriteforgeError::validation(format!("frame index {idx} exceeds u32")))
}

#[cfg(test)]
#[path = "../../tests/unit/process/sprite_sheet.rs"]
mod tests;
