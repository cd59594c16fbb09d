use std::collections::HashMap;

use crate::{
    composite::flatten::flatten_frames,
    document::model::Document,
    foundation::core::{PixelBuffer, Point, Rect, Rgba8},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
    foundation::math::Fnv1a64,
    process::options::{AtlasLayout, ProcessorOptions},
    raw::types::{RawSlice, RawTextureAtlas, RawTextureRegion},
};

/// Slice color used when a slice carries no user color.
pub const DEFAULT_SLICE_COLOR: Rgba8 = [0, 0, 255, 255];

/// Flatten every frame and pack them into one atlas.
///
/// Regions come out one per frame, in frame order, named `"{doc name} {frame index}"`. With
/// `merge_duplicate_frames` several regions may share one cell.
#[tracing::instrument(skip(doc, options), fields(doc = %doc.name, frames = doc.frames.len()))]
pub fn process_texture_atlas(
    doc: &Document,
    options: &ProcessorOptions,
) -> SpriteforgeResult<RawTextureAtlas> {
    let frames = flatten_frames(doc, options)?;
    pack_atlas(doc, &frames, options)
}

pub(crate) fn pack_atlas(
    doc: &Document,
    frames: &[PixelBuffer],
    options: &ProcessorOptions,
) -> SpriteforgeResult<RawTextureAtlas> {
    let (cells, frame_cell) = if options.merge_duplicate_frames {
        dedup_frames(frames)
    } else {
        ((0..frames.len()).collect(), (0..frames.len()).collect())
    };
    if cells.len() < frames.len() {
        tracing::debug!(
            frames = frames.len(),
            cells = cells.len(),
            "merged duplicate frames"
        );
    }

    let cell_w = cells.iter().map(|&f| frames[f].width).max().unwrap_or(0);
    let cell_h = cells.iter().map(|&f| frames[f].height).max().unwrap_or(0);
    let grid = Grid::new(options, cells.len(), cell_w, cell_h)?;
    tracing::debug!(
        layout = ?options.layout,
        columns = grid.columns,
        rows = grid.rows,
        width = grid.width,
        height = grid.height,
        "packing atlas"
    );

    let mut page = PixelBuffer::transparent(grid.width, grid.height);
    let mut origins = Vec::with_capacity(cells.len());
    for (cell, &frame) in cells.iter().enumerate() {
        let (x, y) = grid.origin(cell);
        page.blit(&frames[frame], x, y)?;
        origins.push((x, y));
    }

    let mut regions = Vec::with_capacity(frames.len());
    for (idx, frame) in frames.iter().enumerate() {
        let (x, y) = origins[frame_cell[idx]];
        regions.push(RawTextureRegion {
            name: format!("{} {idx}", doc.name),
            bounds: Rect::new(to_i32(x)?, to_i32(y)?, frame.width, frame.height),
            slices: slices_at(doc, idx),
        });
    }

    Ok(RawTextureAtlas {
        name: doc.name.clone(),
        width: page.width,
        height: page.height,
        pixels: page.data,
        regions,
    })
}

/// Unique frames in first-seen order, plus each frame's unique index.
fn dedup_frames(frames: &[PixelBuffer]) -> (Vec<usize>, Vec<usize>) {
    let mut by_hash: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut cells: Vec<usize> = Vec::new();
    let mut frame_cell = Vec::with_capacity(frames.len());

    for (idx, frame) in frames.iter().enumerate() {
        let mut h = Fnv1a64::new_default();
        h.write_u32(frame.width);
        h.write_u32(frame.height);
        h.write_bytes(&frame.data);
        let bucket = by_hash.entry(h.finish()).or_default();

        let same = bucket
            .iter()
            .copied()
            .find(|&cell| frames[cells[cell]] == *frame);
        match same {
            Some(cell) => frame_cell.push(cell),
            None => {
                bucket.push(cells.len());
                frame_cell.push(cells.len());
                cells.push(idx);
            }
        }
    }
    (cells, frame_cell)
}

fn slices_at(doc: &Document, frame: usize) -> Vec<RawSlice> {
    doc.slices
        .iter()
        .filter_map(|slice| {
            let key = slice.key_at(frame)?;
            Some(RawSlice {
                name: slice.name.clone(),
                bounds: key.bounds,
                origin: key.pivot.unwrap_or(Point::ZERO),
                color: slice.user_data.color.unwrap_or(DEFAULT_SLICE_COLOR),
                center: key.center,
            })
        })
        .collect()
}

/// Cell grid of one atlas page.
struct Grid {
    columns: u32,
    rows: u32,
    cell_w: u32,
    cell_h: u32,
    border: u32,
    spacing: u32,
    inner: u32,
    width: u32,
    height: u32,
}

impl Grid {
    fn new(
        options: &ProcessorOptions,
        cells: usize,
        cell_w: u32,
        cell_h: u32,
    ) -> SpriteforgeResult<Self> {
        let n = u32::try_from(cells)
            .map_err(|_| SpriteforgeError::validation("too many atlas cells"))?;
        let (columns, rows) = match options.layout {
            AtlasLayout::Horizontal => (n, n.min(1)),
            AtlasLayout::Vertical => (n.min(1), n),
            AtlasLayout::Square => {
                let columns = ceil_sqrt(n);
                (columns, n.div_ceil(columns.max(1)))
            }
        };

        let extent = |count: u32, cell: u32| -> SpriteforgeResult<u32> {
            if count == 0 {
                return Ok(0);
            }
            let count = u64::from(count);
            let total = count * u64::from(cell)
                + 2 * u64::from(options.border_padding)
                + u64::from(options.spacing) * (count - 1)
                + 2 * u64::from(options.inner_padding) * count;
            u32::try_from(total).map_err(|_| {
                SpriteforgeError::validation(format!("atlas extent {total} does not fit in u32"))
            })
        };

        Ok(Self {
            columns,
            rows,
            cell_w,
            cell_h,
            border: options.border_padding,
            spacing: options.spacing,
            inner: options.inner_padding,
            width: extent(columns, cell_w)?,
            height: extent(rows, cell_h)?,
        })
    }

    /// Top-left of the frame inside cell `idx`, inner padding applied.
    fn origin(&self, idx: usize) -> (u32, u32) {
        let idx = idx as u32;
        let (col, row) = (idx % self.columns, idx / self.columns);
        let at = |i: u32, cell: u32| {
            self.border + i * (cell + self.spacing + 2 * self.inner) + self.inner
        };
        (at(col, self.cell_w), at(row, self.cell_h))
    }
}

fn ceil_sqrt(n: u32) -> u32 {
    let mut c = 0u32;
    while u64::from(c) * u64::from(c) < u64::from(n) {
        c += 1;
    }
    c
}

fn to_i32(v: u32) -> SpriteforgeResult<i32> {
    i32::try_from(v)
        .map_err(|_| SpriteforgeError::validation(format!("atlas coordinate {v} exceeds i32")))
}

#[cfg(test)]
#[path = "../../tests/unit/process/atlas.rs"]
mod tests;
