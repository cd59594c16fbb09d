use crate::{
    document::model::{CelContent, Document, LayerKind},
    document::visibility::LayerVisibility,
    foundation::error::{SpriteforgeError, SpriteforgeResult},
    process::{options::ProcessorOptions, tileset::raw_tileset},
    raw::types::{RawAnimatedTilemap, RawTilemap, RawTilemapFrame, RawTilemapLayer, RawTileset},
};

/// Tile layers of one frame.
///
/// Layers without a cel on `frame` are left out. Each referenced tileset is included once, in the
/// order layers first reference it; two referenced tilesets sharing a name fail with
/// [`SpriteforgeError::DuplicateTilesetName`].
#[tracing::instrument(skip(doc, options), fields(doc = %doc.name))]
pub fn process_tilemap(
    doc: &Document,
    frame: usize,
    options: &ProcessorOptions,
) -> SpriteforgeResult<RawTilemap> {
    let mut ctx = TilemapContext::new(doc, options);
    let layers = ctx.layers(frame)?;
    tracing::debug!(layers = layers.len(), tilesets = ctx.tileset_ids.len(), "built tilemap");
    Ok(RawTilemap {
        name: doc.name.clone(),
        tilesets: ctx.tilesets(),
        layers,
    })
}

/// Tile layers of every frame, with frame durations.
#[tracing::instrument(skip(doc, options), fields(doc = %doc.name, frames = doc.frames.len()))]
pub fn process_animated_tilemap(
    doc: &Document,
    options: &ProcessorOptions,
) -> SpriteforgeResult<RawAnimatedTilemap> {
    let mut ctx = TilemapContext::new(doc, options);
    let mut frames = Vec::with_capacity(doc.frames.len());
    for (idx, f) in doc.frames.iter().enumerate() {
        frames.push(RawTilemapFrame {
            duration_ms: f.duration_ms,
            layers: ctx.layers(idx)?,
        });
    }
    tracing::debug!(tilesets = ctx.tileset_ids.len(), "built animated tilemap");
    Ok(RawAnimatedTilemap {
        name: doc.name.clone(),
        tilesets: ctx.tilesets(),
        frames,
    })
}

struct TilemapContext<'a> {
    doc: &'a Document,
    options: &'a ProcessorOptions,
    visibility: LayerVisibility,
    /// Referenced tileset ids in first-reference order.
    tileset_ids: Vec<u32>,
}

impl<'a> TilemapContext<'a> {
    fn new(doc: &'a Document, options: &'a ProcessorOptions) -> Self {
        Self {
            doc,
            options,
            visibility: LayerVisibility::compute(doc),
            tileset_ids: Vec::new(),
        }
    }

    fn layers(&mut self, frame: usize) -> SpriteforgeResult<Vec<RawTilemapLayer>> {
        if frame >= self.doc.frames.len() {
            return Err(SpriteforgeError::validation(format!(
                "frame {frame} is out of bounds ({} frames)",
                self.doc.frames.len()
            )));
        }

        let mut out = Vec::new();
        for (idx, layer) in self.doc.layers.iter().enumerate() {
            let LayerKind::Tilemap { tileset_id } = layer.kind else {
                continue;
            };
            if layer.flags.reference
                || (self.options.only_visible_layers && !self.visibility.is_visible(idx))
            {
                continue;
            }

            let tileset = self.doc.tileset(tileset_id).ok_or_else(|| {
                SpriteforgeError::MissingTilesetReference {
                    layer: layer.name.clone(),
                    tileset_id,
                }
            })?;

            let Some(cel) = self.doc.resolve_cel(frame, idx) else {
                continue;
            };
            let CelContent::Tilemap {
                position,
                columns,
                rows,
                tiles,
            } = &cel.content
            else {
                continue;
            };

            if tiles.len() != (*columns as usize) * (*rows as usize) {
                return Err(SpriteforgeError::validation(format!(
                    "tilemap cel on frame {frame}, layer {idx} has {} tiles for {columns}x{rows}",
                    tiles.len()
                )));
            }
            if let Some(bad) = tiles.iter().find(|t| t.id >= tileset.tile_count) {
                return Err(SpriteforgeError::TileIndexOutOfRange {
                    tileset: tileset.name.clone(),
                    tile_id: bad.id,
                    tile_count: tileset.tile_count,
                });
            }

            if !self.tileset_ids.contains(&tileset_id) {
                // Layers name their tileset, so two listed tilesets must not share a name.
                let doc = self.doc;
                if self
                    .tileset_ids
                    .iter()
                    .filter_map(|&id| doc.tileset(id))
                    .any(|t| t.name == tileset.name)
                {
                    return Err(SpriteforgeError::DuplicateTilesetName(tileset.name.clone()));
                }
                self.tileset_ids.push(tileset_id);
            }
            out.push(RawTilemapLayer {
                name: layer.name.clone(),
                tileset: tileset.name.clone(),
                columns: *columns,
                rows: *rows,
                offset: *position,
                tiles: tiles.clone(),
            });
        }
        Ok(out)
    }

    fn tilesets(&self) -> Vec<RawTileset> {
        self.tileset_ids
            .iter()
            .filter_map(|&id| self.doc.tileset(id))
            .map(raw_tileset)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/tilemap.rs"]
mod tests;
