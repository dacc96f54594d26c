//! Word-level access to an AREA resource.
//!
//! Every integer in the format is a 4-byte signed word. The format is
//! natively big-endian; files written on little-endian producers store the
//! same words byte-reversed, so the caller states the order up front.

use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::PathBuf;

use area_common::{AreaError, AreaResult};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Byte order of the integer words (and sample pairs) in a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Native AREA order.
    #[default]
    #[serde(rename = "big", alias = "big_endian")]
    BigEndian,
    #[serde(rename = "little", alias = "little_endian")]
    LittleEndian,
}

impl ByteOrder {
    /// Get the order name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigEndian => "big",
            Self::LittleEndian => "little",
        }
    }

    /// The opposite order.
    pub fn swapped(self) -> Self {
        match self {
            Self::BigEndian => Self::LittleEndian,
            Self::LittleEndian => Self::BigEndian,
        }
    }

    /// Interpret 4 bytes as a signed word in this order.
    pub fn word(self, bytes: [u8; 4]) -> i32 {
        match self {
            Self::BigEndian => BigEndian::read_i32(&bytes),
            Self::LittleEndian => LittleEndian::read_i32(&bytes),
        }
    }
}

impl std::str::FromStr for ByteOrder {
    type Err = AreaError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "big" | "be" | "big_endian" | "bigendian" => Ok(Self::BigEndian),
            "little" | "le" | "little_endian" | "littleendian" => Ok(Self::LittleEndian),
            other => Err(AreaError::Config(format!("unknown byte order '{}'", other))),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A random-access resource that can hand out fresh read handles.
pub trait ByteSource {
    type Reader: Read + Seek;

    /// Open a new read handle positioned at the start.
    fn open(&self) -> AreaResult<Self::Reader>;

    /// Total length of the resource in bytes.
    fn byte_len(&self) -> AreaResult<u64>;

    /// Human-readable identifier used in logs and errors.
    fn describe(&self) -> String;
}

impl ByteSource for PathBuf {
    type Reader = BufReader<File>;

    fn open(&self) -> AreaResult<Self::Reader> {
        let file = File::open(self)
            .map_err(|e| AreaError::io(format!("opening {}", self.display()), e))?;
        Ok(BufReader::new(file))
    }

    fn byte_len(&self) -> AreaResult<u64> {
        std::fs::metadata(self)
            .map(|m| m.len())
            .map_err(|e| AreaError::io(format!("stat {}", self.display()), e))
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl ByteSource for Bytes {
    type Reader = Cursor<Bytes>;

    fn open(&self) -> AreaResult<Self::Reader> {
        Ok(Cursor::new(self.clone()))
    }

    fn byte_len(&self) -> AreaResult<u64> {
        Ok(self.len() as u64)
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.len())
    }
}

/// Reads words, ASCII tags and sample pairs at byte offsets.
pub struct WordReader<R> {
    inner: R,
    byte_order: ByteOrder,
}

impl<R: Read + Seek> WordReader<R> {
    pub fn new(inner: R, byte_order: ByteOrder) -> Self {
        Self { inner, byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Position the handle at an absolute byte offset.
    pub fn seek_to(&mut self, offset: u64) -> AreaResult<()> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|e| AreaError::io(format!("seeking to byte {}", offset), e))
    }

    /// Length of the underlying stream. Leaves the position at the end.
    pub fn stream_len(&mut self) -> AreaResult<u64> {
        self.inner
            .seek(SeekFrom::End(0))
            .map_err(|e| AreaError::io("measuring stream length", e))
    }

    /// Read the signed word starting at `offset`.
    pub fn read_i32_at(&mut self, offset: u64, what: &str) -> AreaResult<i32> {
        let mut buf = [0u8; 4];
        self.seek_to(offset)?;
        self.fill(&mut buf, offset, what)?;
        Ok(self.byte_order.word(buf))
    }

    /// Read the word with the given index (`index * 4` bytes from `base`).
    pub fn read_word(&mut self, base: u64, index: u64, what: &str) -> AreaResult<i32> {
        self.read_i32_at(base + index * 4, what)
    }

    /// Read `len` bytes at `offset` as a single-byte character string.
    pub fn read_ascii_at(&mut self, offset: u64, len: usize, what: &str) -> AreaResult<String> {
        let mut buf = vec![0u8; len];
        self.seek_to(offset)?;
        self.fill(&mut buf, offset, what)?;
        Ok(buf.iter().map(|&b| b as char).collect())
    }

    /// Read raw bytes from the current position.
    pub fn read_bytes(&mut self, buf: &mut [u8], what: &str) -> AreaResult<()> {
        let offset = self
            .inner
            .stream_position()
            .map_err(|e| AreaError::io(format!("locating {}", what), e))?;
        self.fill(buf, offset, what)
    }

    // `read_exact` loses the count on EOF, which the ShortRead error reports.
    fn fill(&mut self, buf: &mut [u8], offset: u64, what: &str) -> AreaResult<()> {
        let mut found = 0;
        while found < buf.len() {
            match self.inner.read(&mut buf[found..]) {
                Ok(0) => {
                    return Err(AreaError::ShortRead {
                        what: what.to_string(),
                        offset,
                        expected: buf.len(),
                        found,
                    })
                }
                Ok(n) => found += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(AreaError::io(
                        format!("reading {} at byte {}", what, offset),
                        e,
                    ))
                }
            }
        }
        Ok(())
    }
}

/// A read handle opened on first use and released when the session drops.
///
/// One session spans one logical operation (a header parse, a grid decode),
/// so a batch of field reads shares a single open.
pub struct ReadSession<'a, S: ByteSource> {
    source: &'a S,
    byte_order: ByteOrder,
    reader: Option<WordReader<S::Reader>>,
}

impl<'a, S: ByteSource> ReadSession<'a, S> {
    pub fn new(source: &'a S, byte_order: ByteOrder) -> Self {
        Self {
            source,
            byte_order,
            reader: None,
        }
    }

    /// The open reader, opening the source if this is the first read.
    pub fn reader(&mut self) -> AreaResult<&mut WordReader<S::Reader>> {
        let reader = match self.reader.take() {
            Some(reader) => reader,
            None => WordReader::new(self.source.open()?, self.byte_order),
        };
        Ok(self.reader.insert(reader))
    }

    /// Whether the source has been opened in this session.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    pub fn source(&self) -> &S {
        self.source
    }
}

/// Byte offset for a header word index, rejecting negative bases.
pub(crate) fn checked_offset(field: &'static str, value: i32) -> AreaResult<u64> {
    u64::try_from(value)
        .map_err(|_| AreaError::invalid_field(field, value as i64, "byte offset must not be negative"))
}
