use crate::foundation::{
    core::{Point, Rect, Rgba8, pixel_len},
    error::{SpriteforgeError, SpriteforgeResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A parsed, layered sprite animation document.
///
/// The document is plain data handed over by a container-format reader (or assembled with
/// [`crate::DocumentBuilder`]). Processors only ever borrow it immutably, so one document can
/// feed several processors running on different threads.
pub struct Document {
    /// Document name, used to name atlas regions and descriptors.
    pub name: String,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Color palette.
    #[serde(default)]
    pub palette: Vec<Rgba8>,
    /// Frames in playback order; a frame's index is its position.
    pub frames: Vec<Frame>,
    /// Layers in paint order (index 0 is painted first).
    pub layers: Vec<Layer>,
    /// Animation tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Named, keyframed regions.
    #[serde(default)]
    pub slices: Vec<Slice>,
    /// Tilesets referenced by tilemap layers.
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
    /// Document-level user data.
    #[serde(default)]
    pub user_data: UserData,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One animation frame and the cels drawn on it.
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
    /// Cels on this frame, at most one per layer.
    pub cels: Vec<Cel>,
}

impl Frame {
    /// Cel stored on this frame for `layer`, without linked-cel resolution.
    pub fn cel(&self, layer: usize) -> Option<&Cel> {
        self.cels.iter().find(|c| c.layer == layer)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A layer in the document's layer stack.
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Visibility and role flags.
    pub flags: LayerFlags,
    /// Layer opacity (`255` is opaque).
    pub opacity: u8,
    /// Blend mode applied when compositing this layer's cels.
    pub blend_mode: BlendMode,
    /// What the layer holds.
    pub kind: LayerKind,
    /// Index of the enclosing group layer, if any.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Layer user data.
    #[serde(default)]
    pub user_data: UserData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Layer flags relevant to flattening.
pub struct LayerFlags {
    /// The layer's own visibility toggle.
    pub visible: bool,
    /// Background layers are opaque bottom layers, often excluded from sprites.
    #[serde(default)]
    pub background: bool,
    /// Reference layers are authoring aids and never composited.
    #[serde(default)]
    pub reference: bool,
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self {
            visible: true,
            background: false,
            reference: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Layer content kind.
pub enum LayerKind {
    /// Pixel cels.
    Image,
    /// Tile-index cels resolved against the tileset with `tileset_id`.
    Tilemap {
        /// Id of the tileset the layer's tiles index into.
        tileset_id: u32,
    },
    /// Structural group; gates the visibility of its descendants.
    Group,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Blend mode used when compositing a layer.
pub enum BlendMode {
    /// Source over destination.
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Addition,
    Subtract,
    Divide,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Content of one layer on one frame.
pub struct Cel {
    /// Index of the owning layer.
    pub layer: usize,
    /// Cel opacity (`255` is opaque).
    pub opacity: u8,
    /// Pixel, tile or link payload.
    pub content: CelContent,
    /// Cel user data.
    #[serde(default)]
    pub user_data: UserData,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Cel payload.
pub enum CelContent {
    /// Straight-alpha RGBA8 pixels placed at `position` on the canvas.
    Image {
        /// Top-left corner on the canvas; may be negative or overhang.
        position: Point,
        /// Pixel width.
        width: u32,
        /// Pixel height.
        height: u32,
        /// Row-major RGBA8 bytes.
        pixels: Vec<u8>,
    },
    /// A grid of tiles placed at `position` on the canvas.
    Tilemap {
        /// Top-left corner on the canvas, in pixels.
        position: Point,
        /// Grid width in tiles.
        columns: u32,
        /// Grid height in tiles.
        rows: u32,
        /// Row-major tiles.
        tiles: Vec<Tile>,
    },
    /// Reuses the cel on the same layer at `frame`.
    Linked {
        /// Concrete target frame index.
        frame: usize,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// One tilemap cell.
pub struct Tile {
    /// Index into the layer's tileset.
    pub id: u32,
    /// Mirrored along the vertical axis.
    #[serde(default)]
    pub flip_x: bool,
    /// Mirrored along the horizontal axis.
    #[serde(default)]
    pub flip_y: bool,
    /// Mirrored along the top-left to bottom-right diagonal.
    #[serde(default)]
    pub flip_diagonal: bool,
}

impl Tile {
    /// Tile `id` with no flips.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Playback direction of a tag.
pub enum LoopDirection {
    /// `from` to `to`.
    #[default]
    Forward,
    /// `to` to `from`.
    Reverse,
    /// `from` to `to` and back.
    PingPong,
    /// `to` to `from` and back.
    PingPongReverse,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A named, inclusive frame range.
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// First frame.
    pub from: usize,
    /// Last frame (inclusive).
    pub to: usize,
    /// Playback direction.
    pub direction: LoopDirection,
    /// Number of cycles to play; `0` repeats forever.
    #[serde(default)]
    pub repeat: u16,
    /// Tag color.
    #[serde(default)]
    pub color: Rgba8,
    /// Tag user data.
    #[serde(default)]
    pub user_data: UserData,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A named rectangle whose geometry changes over time.
pub struct Slice {
    /// Slice name.
    pub name: String,
    /// Keys in ascending frame order.
    pub keys: Vec<SliceKey>,
    /// Slice user data; its color tints the slice.
    #[serde(default)]
    pub user_data: UserData,
}

impl Slice {
    /// Key in effect on `frame`: the last key starting at or before it.
    pub fn key_at(&self, frame: usize) -> Option<&SliceKey> {
        self.keys.iter().take_while(|k| k.frame <= frame).last()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Slice geometry from `frame` onward.
pub struct SliceKey {
    /// First frame this key applies to.
    pub frame: usize,
    /// Slice bounds on the canvas.
    pub bounds: Rect,
    /// Nine-patch center, relative to `bounds`.
    #[serde(default)]
    pub center: Option<Rect>,
    /// Pivot, relative to `bounds`.
    #[serde(default)]
    pub pivot: Option<Point>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A set of equally sized tiles.
pub struct Tileset {
    /// Id referenced by tilemap layers.
    pub id: u32,
    /// Tileset name; unique within a document.
    pub name: String,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Number of tiles.
    pub tile_count: u32,
    /// Tiles stacked vertically as RGBA8, `tile_width x tile_height * tile_count`.
    pub pixels: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Free-form text and color attached to document elements.
pub struct UserData {
    /// Optional text.
    #[serde(default)]
    pub text: Option<String>,
    /// Optional color.
    #[serde(default)]
    pub color: Option<Rgba8>,
}

impl Document {
    /// Tileset with the given id.
    pub fn tileset(&self, id: u32) -> Option<&Tileset> {
        self.tilesets.iter().find(|t| t.id == id)
    }

    /// Resolve the cel on `(frame, layer)`, following a link once.
    ///
    /// Links point at a concrete cel by construction; a link to another link or to a missing cel
    /// resolves to `None` rather than chasing the chain.
    pub fn resolve_cel(&self, frame: usize, layer: usize) -> Option<&Cel> {
        let cel = self.frames.get(frame)?.cel(layer)?;
        match cel.content {
            CelContent::Linked { frame: target } => {
                let linked = self.frames.get(target)?.cel(layer)?;
                match linked.content {
                    CelContent::Linked { .. } => None,
                    _ => Some(linked),
                }
            }
            _ => Some(cel),
        }
    }

    /// Check the structural invariants processors rely on.
    pub fn validate(&self) -> SpriteforgeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SpriteforgeError::validation(
                "document width/height must be > 0",
            ));
        }

        for (idx, layer) in self.layers.iter().enumerate() {
            if let Some(parent) = layer.parent {
                match self.layers.get(parent) {
                    Some(p) if p.kind == LayerKind::Group => {}
                    Some(_) => {
                        return Err(SpriteforgeError::validation(format!(
                            "layer {idx} ('{}') has parent {parent} which is not a group",
                            layer.name
                        )));
                    }
                    None => {
                        return Err(SpriteforgeError::validation(format!(
                            "layer {idx} ('{}') references missing parent {parent}",
                            layer.name
                        )));
                    }
                }
            }
            // A chain longer than the layer count must revisit a layer.
            let mut cursor = layer.parent;
            let mut depth = 0usize;
            while let Some(p) = cursor {
                depth += 1;
                if depth > self.layers.len() {
                    return Err(SpriteforgeError::validation(format!(
                        "layer {idx} ('{}') has a cyclic parent chain",
                        layer.name
                    )));
                }
                cursor = self.layers.get(p).and_then(|l| l.parent);
            }
        }

        for (frame_idx, frame) in self.frames.iter().enumerate() {
            for (cel_idx, cel) in frame.cels.iter().enumerate() {
                if cel.layer >= self.layers.len() {
                    return Err(SpriteforgeError::validation(format!(
                        "frame {frame_idx} has a cel on missing layer {}",
                        cel.layer
                    )));
                }
                if frame.cels[..cel_idx].iter().any(|c| c.layer == cel.layer) {
                    return Err(SpriteforgeError::validation(format!(
                        "frame {frame_idx} has more than one cel on layer {}",
                        cel.layer
                    )));
                }
                validate_cel(self, frame_idx, cel)?;
            }
        }

        let frame_count = self.frames.len();
        for tag in &self.tags {
            if tag.from > tag.to || tag.to >= frame_count {
                return Err(SpriteforgeError::InvalidTagRange {
                    tag: tag.name.clone(),
                    from: tag.from,
                    to: tag.to,
                    frame_count,
                });
            }
        }

        for slice in &self.slices {
            if slice.keys.windows(2).any(|w| w[0].frame >= w[1].frame) {
                return Err(SpriteforgeError::validation(format!(
                    "slice '{}' keys must have strictly ascending frames",
                    slice.name
                )));
            }
        }

        for tileset in &self.tilesets {
            let expected = pixel_len(
                tileset.tile_width,
                tileset.tile_height.saturating_mul(tileset.tile_count),
            );
            if tileset.pixels.len() != expected {
                return Err(SpriteforgeError::validation(format!(
                    "tileset '{}' needs {expected} pixel bytes, got {}",
                    tileset.name,
                    tileset.pixels.len()
                )));
            }
        }

        Ok(())
    }
}

fn validate_cel(doc: &Document, frame_idx: usize, cel: &Cel) -> SpriteforgeResult<()> {
    let layer = &doc.layers[cel.layer];
    match (&cel.content, layer.kind) {
        (CelContent::Linked { frame }, _) => {
            if *frame >= frame_idx {
                return Err(SpriteforgeError::validation(format!(
                    "linked cel on frame {frame_idx}, layer {} must target an earlier frame",
                    cel.layer
                )));
            }
            match doc.frames[*frame].cel(cel.layer).map(|c| &c.content) {
                Some(CelContent::Linked { .. }) => Err(SpriteforgeError::validation(format!(
                    "linked cel on frame {frame_idx}, layer {} targets another linked cel",
                    cel.layer
                ))),
                Some(_) => Ok(()),
                None => Err(SpriteforgeError::validation(format!(
                    "linked cel on frame {frame_idx}, layer {} targets a missing cel",
                    cel.layer
                ))),
            }
        }
        (
            CelContent::Image {
                width,
                height,
                pixels,
                ..
            },
            LayerKind::Image,
        ) => {
            if pixels.len() != pixel_len(*width, *height) {
                return Err(SpriteforgeError::validation(format!(
                    "image cel on frame {frame_idx}, layer {} has {} bytes for {width}x{height}",
                    cel.layer,
                    pixels.len()
                )));
            }
            Ok(())
        }
        (
            CelContent::Tilemap {
                columns,
                rows,
                tiles,
                ..
            },
            LayerKind::Tilemap { .. },
        ) => {
            if tiles.len() != (*columns as usize) * (*rows as usize) {
                return Err(SpriteforgeError::validation(format!(
                    "tilemap cel on frame {frame_idx}, layer {} has {} tiles for {columns}x{rows}",
                    cel.layer,
                    tiles.len()
                )));
            }
            Ok(())
        }
        _ => Err(SpriteforgeError::validation(format!(
            "cel on frame {frame_idx} does not match the kind of layer {} ('{}')",
            cel.layer, layer.name
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
