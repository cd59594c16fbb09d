//! Spriteforge turns layered sprite animation documents into engine-agnostic descriptors.
//!
//! The pipeline is a set of pure functions over an immutable [`Document`]:
//!
//! - Flatten frames with [`flatten_frame`] / [`flatten_frames`]
//! - Pack them into a [`RawTextureAtlas`] or a [`RawSpriteSheet`]
//! - Extract tilesets and tile grids as [`RawTileset`], [`RawTilemap`] and
//!   [`RawAnimatedTilemap`]
//! - Persist any descriptor with [`write_raw`] and load it back with [`read_raw`]
#![forbid(unsafe_code)]

mod composite;
mod document;
mod foundation;
mod process;
mod raw;

pub use crate::foundation::core::{PixelBuffer, Point, Rect, Rgba8};
pub use crate::foundation::error::{SpriteforgeError, SpriteforgeResult};

pub use crate::document::dsl::{
    DocumentBuilder, LayerBuilder, image_cel, linked_cel, tag, tilemap_cel,
};
pub use crate::document::model::{
    BlendMode, Cel, CelContent, Document, Frame, Layer, LayerFlags, LayerKind, LoopDirection,
    Slice, SliceKey, Tag, Tile, Tileset, UserData,
};
pub use crate::document::visibility::LayerVisibility;

pub use crate::composite::blend::blend_rgba8;
pub use crate::composite::flatten::{FrameCompositor, flatten_frame, flatten_frames};

pub use crate::process::atlas::{DEFAULT_SLICE_COLOR, process_texture_atlas};
pub use crate::process::options::{AtlasLayout, ProcessThreading, ProcessorOptions};
pub use crate::process::sprite_sheet::process_sprite_sheet;
pub use crate::process::tilemap::{process_animated_tilemap, process_tilemap};
pub use crate::process::tileset::{
    TilesetRef, extract_tilesets, process_tileset, process_tileset_collection,
};

pub use crate::raw::codec::{
    RAW_FORMAT_VERSION, RawCodec, RawReader, RawWriter, from_raw_bytes, read_raw, to_raw_bytes,
    write_raw,
};
pub use crate::raw::types::{
    RawAnimatedTilemap, RawAnimationFrame, RawAnimationTag, RawSlice, RawSpriteSheet,
    RawTextureAtlas, RawTextureRegion, RawTile, RawTilemap, RawTilemapFrame, RawTilemapLayer,
    RawTileset, RawTilesetCollection,
};
