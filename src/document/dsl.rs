use crate::{
    document::model::{
        BlendMode, Cel, CelContent, Document, Frame, Layer, LayerFlags, LayerKind, LoopDirection,
        Slice, Tag, Tile, Tileset, UserData,
    },
    foundation::core::{Point, Rgba8},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
};

pub struct DocumentBuilder {
    name: String,
    width: u32,
    height: u32,
    palette: Vec<Rgba8>,
    frames: Vec<Frame>,
    layers: Vec<Layer>,
    tags: Vec<Tag>,
    slices: Vec<Slice>,
    tilesets: Vec<Tileset>,
    user_data: UserData,
}

impl DocumentBuilder {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            palette: Vec::new(),
            frames: Vec::new(),
            layers: Vec::new(),
            tags: Vec::new(),
            slices: Vec::new(),
            tilesets: Vec::new(),
            user_data: UserData::default(),
        }
    }

    pub fn palette(mut self, palette: Vec<Rgba8>) -> Self {
        self.palette = palette;
        self
    }

    /// Append a canvas-sized frame shown for `duration_ms`.
    pub fn frame(mut self, duration_ms: u32) -> Self {
        self.frames.push(Frame {
            width: self.width,
            height: self.height,
            duration_ms,
            cels: Vec::new(),
        });
        self
    }

    pub fn frames(self, durations_ms: &[u32]) -> Self {
        durations_ms.iter().fold(self, |b, &d| b.frame(d))
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn cel(mut self, frame: usize, cel: Cel) -> SpriteforgeResult<Self> {
        let Some(target) = self.frames.get_mut(frame) else {
            return Err(SpriteforgeError::validation(format!(
                "cel added to missing frame {frame}"
            )));
        };
        target.cels.push(cel);
        Ok(self)
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn slice(mut self, slice: Slice) -> Self {
        self.slices.push(slice);
        self
    }

    pub fn tileset(mut self, tileset: Tileset) -> Self {
        self.tilesets.push(tileset);
        self
    }

    pub fn user_data(mut self, user_data: UserData) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn build(self) -> SpriteforgeResult<Document> {
        let doc = Document {
            name: self.name,
            width: self.width,
            height: self.height,
            palette: self.palette,
            frames: self.frames,
            layers: self.layers,
            tags: self.tags,
            slices: self.slices,
            tilesets: self.tilesets,
            user_data: self.user_data,
        };
        doc.validate()?;
        Ok(doc)
    }
}

pub struct LayerBuilder {
    name: String,
    flags: LayerFlags,
    opacity: u8,
    blend_mode: BlendMode,
    kind: LayerKind,
    parent: Option<usize>,
    user_data: UserData,
}

impl LayerBuilder {
    fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            flags: LayerFlags::default(),
            opacity: 255,
            blend_mode: BlendMode::Normal,
            kind,
            parent: None,
            user_data: UserData::default(),
        }
    }

    pub fn image(name: impl Into<String>) -> Self {
        Self::new(name, LayerKind::Image)
    }

    pub fn tilemap(name: impl Into<String>, tileset_id: u32) -> Self {
        Self::new(name, LayerKind::Tilemap { tileset_id })
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, LayerKind::Group)
    }

    pub fn hidden(mut self) -> Self {
        self.flags.visible = false;
        self
    }

    pub fn background(mut self) -> Self {
        self.flags.background = true;
        self
    }

    pub fn reference(mut self) -> Self {
        self.flags.reference = true;
        self
    }

    pub fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn blend(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn parent(mut self, group: usize) -> Self {
        self.parent = Some(group);
        self
    }

    pub fn user_data(mut self, user_data: UserData) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn build(self) -> SpriteforgeResult<Layer> {
        if self.name.trim().is_empty() {
            return Err(SpriteforgeError::validation("layer name must be non-empty"));
        }
        Ok(Layer {
            name: self.name,
            flags: self.flags,
            opacity: self.opacity,
            blend_mode: self.blend_mode,
            kind: self.kind,
            parent: self.parent,
            user_data: self.user_data,
        })
    }
}

/// Opaque pixel cel on `layer`.
pub fn image_cel(layer: usize, position: Point, width: u32, height: u32, pixels: Vec<u8>) -> Cel {
    Cel {
        layer,
        opacity: 255,
        content: CelContent::Image {
            position,
            width,
            height,
            pixels,
        },
        user_data: UserData::default(),
    }
}

pub fn tilemap_cel(layer: usize, position: Point, columns: u32, rows: u32, tiles: Vec<Tile>) -> Cel {
    Cel {
        layer,
        opacity: 255,
        content: CelContent::Tilemap {
            position,
            columns,
            rows,
            tiles,
        },
        user_data: UserData::default(),
    }
}

/// Cel on `layer` that reuses the cel at `frame`.
pub fn linked_cel(layer: usize, frame: usize) -> Cel {
    Cel {
        layer,
        opacity: 255,
        content: CelContent::Linked { frame },
        user_data: UserData::default(),
    }
}

pub fn tag(name: impl Into<String>, from: usize, to: usize, direction: LoopDirection) -> Tag {
    Tag {
        name: name.into(),
        from,
        to,
        direction,
        repeat: 0,
        color: [0, 0, 0, 255],
        user_data: UserData::default(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/dsl.rs"]
mod tests;
