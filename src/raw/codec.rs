use std::io::{self, Read, Write};

use anyhow::Context as _;

use crate::foundation::error::{SpriteforgeError, SpriteforgeResult};

/// Highest raw format version this build reads and the version it writes.
pub const RAW_FORMAT_VERSION: u8 = 1;

/// A descriptor with its own top-level raw stream.
///
/// A stream is the 4-byte [`RawCodec::MAGIC`], one version byte, then the body. Bodies nest
/// without headers, so a sprite sheet embeds its atlas body directly.
pub trait RawCodec: Sized {
    const MAGIC: [u8; 4];

    fn encode_body<W: Write>(&self, w: &mut RawWriter<W>) -> SpriteforgeResult<()>;

    fn decode_body<R: Read>(r: &mut RawReader<R>) -> SpriteforgeResult<Self>;
}

/// Write `value` with its header to `writer`.
pub fn write_raw<T: RawCodec>(writer: impl Write, value: &T) -> SpriteforgeResult<()> {
    let mut w = RawWriter::new(writer);
    w.write_all(&T::MAGIC)?;
    w.u8(RAW_FORMAT_VERSION)?;
    value.encode_body(&mut w)?;
    tracing::debug!(
        magic = %String::from_utf8_lossy(&T::MAGIC),
        bytes = w.written,
        "wrote raw value"
    );
    Ok(())
}

/// Read one `T` from `reader`, checking magic and version first.
pub fn read_raw<T: RawCodec>(reader: impl Read) -> SpriteforgeResult<T> {
    let mut r = RawReader::new(reader);
    let found = r.array::<4>()?;
    if found != T::MAGIC {
        return Err(SpriteforgeError::UnsupportedFormat {
            expected: T::MAGIC,
            found,
        });
    }
    let version = r.u8()?;
    if version == 0 || version > RAW_FORMAT_VERSION {
        return Err(SpriteforgeError::UnsupportedVersion {
            found: version,
            supported: RAW_FORMAT_VERSION,
        });
    }
    let value = T::decode_body(&mut r)?;
    tracing::debug!(
        magic = %String::from_utf8_lossy(&T::MAGIC),
        version,
        bytes = r.read,
        "read raw value"
    );
    Ok(value)
}

/// Encode `value` into a fresh buffer.
pub fn to_raw_bytes<T: RawCodec>(value: &T) -> SpriteforgeResult<Vec<u8>> {
    let mut out = Vec::new();
    write_raw(&mut out, value)?;
    Ok(out)
}

/// Decode a buffer holding exactly one raw value.
pub fn from_raw_bytes<T: RawCodec>(bytes: &[u8]) -> SpriteforgeResult<T> {
    let mut rest = bytes;
    let value = read_raw(&mut rest)?;
    if !rest.is_empty() {
        return Err(SpriteforgeError::serde(format!(
            "{} trailing bytes after raw value",
            rest.len()
        )));
    }
    Ok(value)
}

/// Little-endian primitive writer over a caller-supplied stream.
pub struct RawWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> RawWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_all(&mut self, bytes: &[u8]) -> SpriteforgeResult<()> {
        self.inner
            .write_all(bytes)
            .context("failed to write raw stream")?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn u8(&mut self, v: u8) -> SpriteforgeResult<()> {
        self.write_all(&[v])
    }

    pub fn u16(&mut self, v: u16) -> SpriteforgeResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> SpriteforgeResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    pub fn i32(&mut self, v: i32) -> SpriteforgeResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    pub fn bool(&mut self, v: bool) -> SpriteforgeResult<()> {
        self.u8(u8::from(v))
    }

    /// Length or count prefix.
    pub fn len(&mut self, len: usize) -> SpriteforgeResult<()> {
        let len = u32::try_from(len)
            .map_err(|_| SpriteforgeError::serde(format!("length {len} does not fit in u32")))?;
        self.u32(len)
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> SpriteforgeResult<()> {
        self.len(bytes.len())?;
        self.write_all(bytes)
    }

    pub fn str(&mut self, s: &str) -> SpriteforgeResult<()> {
        self.bytes(s.as_bytes())
    }

    /// Fixed 4-byte value with no length prefix.
    pub fn array4(&mut self, v: [u8; 4]) -> SpriteforgeResult<()> {
        self.write_all(&v)
    }

    pub fn seq<T>(
        &mut self,
        items: &[T],
        mut each: impl FnMut(&mut Self, &T) -> SpriteforgeResult<()>,
    ) -> SpriteforgeResult<()> {
        self.len(items.len())?;
        for item in items {
            each(self, item)?;
        }
        Ok(())
    }

    pub fn option<T>(
        &mut self,
        value: Option<&T>,
        some: impl FnOnce(&mut Self, &T) -> SpriteforgeResult<()>,
    ) -> SpriteforgeResult<()> {
        match value {
            Some(v) => {
                self.bool(true)?;
                some(self, v)
            }
            None => self.bool(false),
        }
    }
}

/// Little-endian primitive reader over a caller-supplied stream.
///
/// Length-prefixed reads never allocate more than the stream actually delivers.
pub struct RawReader<R> {
    inner: R,
    read: u64,
}

impl<R: Read> RawReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, read: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn array<const N: usize>(&mut self) -> SpriteforgeResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(read_error)?;
        self.read += N as u64;
        Ok(buf)
    }

    pub fn u8(&mut self) -> SpriteforgeResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> SpriteforgeResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> SpriteforgeResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> SpriteforgeResult<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn bool(&mut self) -> SpriteforgeResult<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(SpriteforgeError::serde(format!("invalid bool byte {b}"))),
        }
    }

    pub fn len(&mut self) -> SpriteforgeResult<usize> {
        let len = self.u32()?;
        usize::try_from(len)
            .map_err(|_| SpriteforgeError::serde(format!("length {len} does not fit in usize")))
    }

    pub fn bytes(&mut self) -> SpriteforgeResult<Vec<u8>> {
        let len = u64::from(self.u32()?);
        let mut buf = Vec::new();
        (&mut self.inner)
            .take(len)
            .read_to_end(&mut buf)
            .map_err(read_error)?;
        self.read += buf.len() as u64;
        if buf.len() as u64 != len {
            return Err(SpriteforgeError::UnexpectedEndOfData);
        }
        Ok(buf)
    }

    pub fn string(&mut self) -> SpriteforgeResult<String> {
        String::from_utf8(self.bytes()?)
            .map_err(|e| SpriteforgeError::serde(format!("invalid UTF-8 in string: {e}")))
    }

    pub fn array4(&mut self) -> SpriteforgeResult<[u8; 4]> {
        self.array()
    }

    pub fn seq<T>(
        &mut self,
        mut each: impl FnMut(&mut Self) -> SpriteforgeResult<T>,
    ) -> SpriteforgeResult<Vec<T>> {
        let count = self.len()?;
        // Elements are pushed as they decode; `count` alone never sizes an allocation.
        let mut out = Vec::new();
        for _ in 0..count {
            out.push(each(self)?);
        }
        Ok(out)
    }

    pub fn option<T>(
        &mut self,
        some: impl FnOnce(&mut Self) -> SpriteforgeResult<T>,
    ) -> SpriteforgeResult<Option<T>> {
        if self.bool()? {
            some(self).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn read_error(e: io::Error) -> SpriteforgeError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        SpriteforgeError::UnexpectedEndOfData
    } else {
        SpriteforgeError::Other(anyhow::Error::new(e).context("failed to read raw stream"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raw/codec.rs"]
mod tests;
