use crate::{
    document::model::{Document, Tileset},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
    raw::types::{RawTileset, RawTilesetCollection},
};

/// Selects one tileset of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TilesetRef {
    /// The tileset's own id, as referenced by tilemap layers.
    Id(u32),
    /// Position in the document's tileset list.
    Index(usize),
}

impl std::fmt::Display for TilesetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TilesetRef::Id(id) => write!(f, "id {id}"),
            TilesetRef::Index(idx) => write!(f, "index {idx}"),
        }
    }
}

pub(crate) fn raw_tileset(ts: &Tileset) -> RawTileset {
    RawTileset {
        name: ts.name.clone(),
        tile_width: ts.tile_width,
        tile_height: ts.tile_height,
        tile_count: ts.tile_count,
        pixels: ts.pixels.clone(),
    }
}

/// Every tileset of `doc`, in document order.
///
/// Fails with [`SpriteforgeError::DuplicateTilesetName`] on the first repeated name.
pub fn extract_tilesets(doc: &Document) -> SpriteforgeResult<RawTilesetCollection> {
    RawTilesetCollection::new(doc.tilesets.iter().map(raw_tileset).collect())
}

#[tracing::instrument(skip(doc), fields(doc = %doc.name))]
pub fn process_tileset(doc: &Document, tileset: TilesetRef) -> SpriteforgeResult<RawTileset> {
    let found = match tileset {
        TilesetRef::Id(id) => doc.tileset(id),
        TilesetRef::Index(idx) => doc.tilesets.get(idx),
    };
    let ts = found.ok_or_else(|| SpriteforgeError::TilesetNotFound(tileset.to_string()))?;
    tracing::debug!(name = %ts.name, tiles = ts.tile_count, "extracted tileset");
    Ok(raw_tileset(ts))
}

#[tracing::instrument(skip(doc), fields(doc = %doc.name))]
pub fn process_tileset_collection(doc: &Document) -> SpriteforgeResult<RawTilesetCollection> {
    let collection = extract_tilesets(doc)?;
    tracing::debug!(tilesets = collection.len(), "extracted tileset collection");
    Ok(collection)
}

#[cfg(test)]
#[path = "../../tests/unit/process/tileset.rs"]
mod tests;
