use crate::{
    document::model::{LoopDirection, Tile},
    foundation::core::{PixelBuffer, Point, Rect, Rgba8},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Engine-agnostic tileset: tiles stacked vertically in one RGBA8 strip.
pub struct RawTileset {
    /// Tileset name; the lookup key in collections and tilemaps.
    pub name: String,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Number of tiles.
    pub tile_count: u32,
    /// `tile_width x tile_height * tile_count` RGBA8 pixels.
    pub pixels: Vec<u8>,
}

impl RawTileset {
    /// Pixel strip as a buffer.
    pub fn to_pixel_buffer(&self) -> SpriteforgeResult<PixelBuffer> {
        PixelBuffer::from_rgba8(
            self.tile_width,
            self.tile_height.saturating_mul(self.tile_count),
            self.pixels.clone(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<RawTileset>", into = "Vec<RawTileset>")]
/// Tilesets keyed by unique name, in document order.
pub struct RawTilesetCollection {
    tilesets: Vec<RawTileset>,
}

impl RawTilesetCollection {
    /// Build a collection, rejecting repeated names.
    pub fn new(tilesets: Vec<RawTileset>) -> SpriteforgeResult<Self> {
        for (idx, ts) in tilesets.iter().enumerate() {
            if tilesets[..idx].iter().any(|t| t.name == ts.name) {
                return Err(SpriteforgeError::DuplicateTilesetName(ts.name.clone()));
            }
        }
        Ok(Self { tilesets })
    }

    pub fn get(&self, name: &str) -> Option<&RawTileset> {
        self.tilesets.iter().find(|t| t.name == name)
    }

    pub fn tilesets(&self) -> &[RawTileset] {
        &self.tilesets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawTileset> {
        self.tilesets.iter()
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    pub fn into_tilesets(self) -> Vec<RawTileset> {
        self.tilesets
    }
}

impl TryFrom<Vec<RawTileset>> for RawTilesetCollection {
    type Error = SpriteforgeError;

    fn try_from(tilesets: Vec<RawTileset>) -> Result<Self, Self::Error> {
        Self::new(tilesets)
    }
}

impl From<RawTilesetCollection> for Vec<RawTileset> {
    fn from(collection: RawTilesetCollection) -> Self {
        collection.tilesets
    }
}

impl<'a> IntoIterator for &'a RawTilesetCollection {
    type Item = &'a RawTileset;
    type IntoIter = std::slice::Iter<'a, RawTileset>;

    fn into_iter(self) -> Self::IntoIter {
        self.tilesets.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Slice geometry in effect on one region's frame.
pub struct RawSlice {
    pub name: String,
    /// Bounds relative to the frame.
    pub bounds: Rect,
    /// Pivot relative to `bounds`; `(0, 0)` when the slice has none.
    pub origin: Point,
    pub color: Rgba8,
    /// Nine-patch center relative to `bounds`.
    pub center: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A named rectangle inside an atlas.
pub struct RawTextureRegion {
    pub name: String,
    pub bounds: Rect,
    pub slices: Vec<RawSlice>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Packed frames plus one region per source frame.
pub struct RawTextureAtlas {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 atlas pixels.
    pub pixels: Vec<u8>,
    /// Regions in source frame order.
    pub regions: Vec<RawTextureRegion>,
}

impl RawTextureAtlas {
    pub fn region(&self, name: &str) -> Option<&RawTextureRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn to_rgba_image(&self) -> SpriteforgeResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            SpriteforgeError::validation("atlas pixel data does not match its dimensions")
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One step of an animation: which region to show and for how long.
pub struct RawAnimationFrame {
    /// Index into the atlas regions.
    pub region: u32,
    pub duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Named frame range with playback direction.
pub struct RawAnimationTag {
    pub name: String,
    /// First animation frame.
    pub from: u32,
    /// Last animation frame (inclusive).
    pub to: u32,
    pub direction: LoopDirection,
    /// Cycles to play; `0` repeats forever.
    pub repeat: u16,
}

impl RawAnimationTag {
    /// Frame indices of one playback cycle.
    ///
    /// Ping-pong cycles do not repeat the turnaround frames, so `0..=3` plays
    /// `0 1 2 3 2 1` and a reversed ping-pong plays `3 2 1 0 1 2`.
    pub fn playback_indices(&self) -> Vec<u32> {
        let (from, to) = (self.from, self.to);
        match self.direction {
            LoopDirection::Forward => (from..=to).collect(),
            LoopDirection::Reverse => (from..=to).rev().collect(),
            LoopDirection::PingPong => (from..=to)
                .chain((from.saturating_add(1)..to).rev())
                .collect(),
            LoopDirection::PingPongReverse => (from..=to)
                .rev()
                .chain(from.saturating_add(1)..to)
                .collect(),
        }
    }

    /// Animation frames of one playback cycle.
    pub fn playback(&self, frames: &[RawAnimationFrame]) -> Vec<RawAnimationFrame> {
        self.playback_indices()
            .into_iter()
            .filter_map(|i| frames.get(i as usize).copied())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Atlas plus animation frames and tags.
pub struct RawSpriteSheet {
    pub name: String,
    pub atlas: RawTextureAtlas,
    /// One entry per source frame, in frame order.
    pub frames: Vec<RawAnimationFrame>,
    pub tags: Vec<RawAnimationTag>,
}

impl RawSpriteSheet {
    pub fn tag(&self, name: &str) -> Option<&RawAnimationTag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

/// Tile reference inside a tilemap layer grid.
pub type RawTile = Tile;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One tile grid of a tilemap.
pub struct RawTilemapLayer {
    pub name: String,
    /// Name of the tileset the tile ids index into.
    pub tileset: String,
    pub columns: u32,
    pub rows: u32,
    /// Pixel offset of the grid's top-left corner.
    pub offset: Point,
    /// Row-major tiles, `columns * rows` long.
    pub tiles: Vec<RawTile>,
}

impl RawTilemapLayer {
    pub fn tile(&self, column: u32, row: u32) -> Option<&RawTile> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.tiles
            .get((row as usize) * (self.columns as usize) + column as usize)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Tile layers of one frame plus the tilesets they reference.
pub struct RawTilemap {
    pub name: String,
    /// Each referenced tileset once, in first-reference order.
    pub tilesets: Vec<RawTileset>,
    /// Layers in paint order.
    pub layers: Vec<RawTilemapLayer>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawTilemapFrame {
    pub duration_ms: u32,
    pub layers: Vec<RawTilemapLayer>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Tilemap frames with durations.
pub struct RawAnimatedTilemap {
    pub name: String,
    /// Each tileset referenced by any frame once, in first-reference order.
    pub tilesets: Vec<RawTileset>,
    pub frames: Vec<RawTilemapFrame>,
}

#[cfg(test)]
#[path = "../../tests/unit/raw/types.rs"]
mod tests;
