use std::io::{Read, Write};

use crate::{
    document::model::LoopDirection,
    foundation::core::{Point, Rect},
    foundation::error::{SpriteforgeError, SpriteforgeResult},
    raw::codec::{RawCodec, RawReader, RawWriter},
    raw::types::{
        RawAnimatedTilemap, RawAnimationFrame, RawAnimationTag, RawSlice, RawSpriteSheet,
        RawTextureAtlas, RawTextureRegion, RawTile, RawTilemap, RawTilemapFrame, RawTilemapLayer,
        RawTileset, RawTilesetCollection,
    },
};

/// Headerless value nested inside a descriptor body.
trait Element: Sized {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()>;
    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self>;
}

fn put_all<W: Write, T: Element>(w: &mut RawWriter<W>, items: &[T]) -> SpriteforgeResult<()> {
    w.seq(items, |w, item| item.put(w))
}

fn get_all<R: Read, T: Element>(r: &mut RawReader<R>) -> SpriteforgeResult<Vec<T>> {
    r.seq(T::get)
}

impl Element for Point {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.i32(self.x)?;
        w.i32(self.y)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(Point::new(r.i32()?, r.i32()?))
    }
}

impl Element for Rect {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.i32(self.x)?;
        w.i32(self.y)?;
        w.u32(self.width)?;
        w.u32(self.height)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(Rect::new(r.i32()?, r.i32()?, r.u32()?, r.u32()?))
    }
}

impl Element for RawTile {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.u32(self.id)?;
        w.bool(self.flip_x)?;
        w.bool(self.flip_y)?;
        w.bool(self.flip_diagonal)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTile {
            id: r.u32()?,
            flip_x: r.bool()?,
            flip_y: r.bool()?,
            flip_diagonal: r.bool()?,
        })
    }
}

impl Element for LoopDirection {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.u8(match self {
            LoopDirection::Forward => 0,
            LoopDirection::Reverse => 1,
            LoopDirection::PingPong => 2,
            LoopDirection::PingPongReverse => 3,
        })
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        match r.u8()? {
            0 => Ok(LoopDirection::Forward),
            1 => Ok(LoopDirection::Reverse),
            2 => Ok(LoopDirection::PingPong),
            3 => Ok(LoopDirection::PingPongReverse),
            d => Err(SpriteforgeError::serde(format!(
                "unknown loop direction discriminant {d}"
            ))),
        }
    }
}

impl Element for RawTileset {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        self.encode_body(w)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Self::decode_body(r)
    }
}

impl RawCodec for RawTileset {
    const MAGIC: [u8; 4] = *b"RTST";

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        w.u32(self.tile_width)?;
        w.u32(self.tile_height)?;
        w.u32(self.tile_count)?;
        w.bytes(&self.pixels)
    }

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTileset {
            name: r.string()?,
            tile_width: r.u32()?,
            tile_height: r.u32()?,
            tile_count: r.u32()?,
            pixels: r.bytes()?,
        })
    }
}

impl RawCodec for RawTilesetCollection {
    const MAGIC: [u8; 4] = *b"RTSC";

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        put_all(w, self.tilesets())
    }

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        RawTilesetCollection::new(get_all(r)?)
    }
}

impl Element for RawSlice {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        self.bounds.put(w)?;
        self.origin.put(w)?;
        w.array4(self.color)?;
        w.option(self.center.as_ref(), |w, c| c.put(w))
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawSlice {
            name: r.string()?,
            bounds: Rect::get(r)?,
            origin: Point::get(r)?,
            color: r.array4()?,
            center: r.option(Rect::get)?,
        })
    }
}

impl Element for RawTextureRegion {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        self.bounds.put(w)?;
        put_all(w, &self.slices)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTextureRegion {
            name: r.string()?,
            bounds: Rect::get(r)?,
            slices: get_all(r)?,
        })
    }
}

impl RawCodec for RawTextureAtlas {
    const MAGIC: [u8; 4] = *b"RTXA";

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        w.u32(self.width)?;
        w.u32(self.height)?;
        w.bytes(&self.pixels)?;
        put_all(w, &self.regions)
    }

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTextureAtlas {
            name: r.string()?,
            width: r.u32()?,
            height: r.u32()?,
            pixels: r.bytes()?,
            regions: get_all(r)?,
        })
    }
}

impl Element for RawAnimationFrame {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.u32(self.region)?;
        w.u32(self.duration_ms)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawAnimationFrame {
            region: r.u32()?,
            duration_ms: r.u32()?,
        })
    }
}

impl Element for RawAnimationTag {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        w.u32(self.from)?;
        w.u32(self.to)?;
        self.direction.put(w)?;
        w.u16(self.repeat)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawAnimationTag {
            name: r.string()?,
            from: r.u32()?,
            to: r.u32()?,
            direction: LoopDirection::get(r)?,
            repeat: r.u16()?,
        })
    }
}

impl RawCodec for RawSpriteSheet {
    const MAGIC: [u8; 4] = *b"RSPS";

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        self.atlas.encode_body(w)?;
        put_all(w, &self.frames)?;
        put_all(w, &self.tags)
    }

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawSpriteSheet {
            name: r.string()?,
            atlas: RawTextureAtlas::decode_body(r)?,
            frames: get_all(r)?,
            tags: get_all(r)?,
        })
    }
}

impl Element for RawTilemapLayer {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        w.str(&self.tileset)?;
        w.u32(self.columns)?;
        w.u32(self.rows)?;
        self.offset.put(w)?;
        put_all(w, &self.tiles)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTilemapLayer {
            name: r.string()?,
            tileset: r.string()?,
            columns: r.u32()?,
            rows: r.u32()?,
            offset: Point::get(r)?,
            tiles: get_all(r)?,
        })
    }
}

impl RawCodec for RawTilemap {
    const MAGIC: [u8; 4] = *b"RTMP";

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        put_all(w, &self.tilesets)?;
        put_all(w, &self.layers)
    }

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTilemap {
            name: r.string()?,
            tilesets: get_all(r)?,
            layers: get_all(r)?,
        })
    }
}

impl Element for RawTilemapFrame {
    fn put<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.u32(self.duration_ms)?;
        put_all(w, &self.layers)
    }

    fn get<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawTilemapFrame {
            duration_ms: r.u32()?,
            layers: get_all(r)?,
        })
    }
}

impl RawCodec for RawAnimatedTilemap {
    const MAGIC: [u8; 4] = *b"RATM";

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()> {
        w.str(&self.name)?;
        put_all(w, &self.tilesets)?;
        put_all(w, &self.frames)
    }

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self> {
        Ok(RawAnimatedTilemap {
            name: r.string()?,
            tilesets: get_all(r)?,
            frames: get_all(r)?,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raw/formats.rs"]
mod tests;
