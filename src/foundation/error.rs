/// Convenience result type used across spriteforge.
pub type SpriteforgeResult<T> = Result<T, SpriteforgeError>;

/// Top-level error taxonomy used by processor and codec APIs.
#[derive(thiserror::Error, Debug)]
pub enum SpriteforgeError {
    /// Two tilesets in one document share a name.
    #[error("duplicate tileset name: {0:?}")]
    DuplicateTilesetName(String),

    /// A tileset selected by id or index does not exist.
    #[error("tileset not found: {0}")]
    TilesetNotFound(String),

    /// A tilemap layer references a tileset id absent from the document.
    #[error("layer {layer:?} references missing tileset id {tileset_id}")]
    MissingTilesetReference {
        /// Name of the offending layer.
        layer: String,
        /// Tileset id the layer points at.
        tileset_id: u32,
    },

    /// A tilemap cel holds a tile id outside its tileset.
    #[error("tile id {tile_id} is out of range for tileset {tileset:?} ({tile_count} tiles)")]
    TileIndexOutOfRange {
        /// Name of the tileset the tile was resolved against.
        tileset: String,
        /// Offending tile id.
        tile_id: u32,
        /// Number of tiles in the tileset.
        tile_count: u32,
    },

    /// A tag covers frames outside the document.
    #[error("tag {tag:?} range {from}..={to} is outside 0..{frame_count}")]
    InvalidTagRange {
        /// Tag name.
        tag: String,
        /// First frame of the tag.
        from: usize,
        /// Last frame of the tag (inclusive).
        to: usize,
        /// Number of frames in the document.
        frame_count: usize,
    },

    /// The stream does not start with the expected magic tag.
    #[error("unsupported format: expected magic {expected:?}, found {found:?}")]
    UnsupportedFormat {
        /// Magic tag of the requested descriptor kind.
        expected: [u8; 4],
        /// Magic tag read from the stream.
        found: [u8; 4],
    },

    /// The stream was written by an unknown format version.
    #[error("unsupported format version {found} (highest known is {supported})")]
    UnsupportedVersion {
        /// Version byte read from the stream.
        found: u8,
        /// Highest version this build understands.
        supported: u8,
    },

    /// The stream ended before a declared field or length was satisfied.
    #[error("unexpected end of data")]
    UnexpectedEndOfData,

    /// Invalid document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Undecodable serialized content.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpriteforgeError {
    /// Build a [`SpriteforgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SpriteforgeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
