// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Persistent binary format for compiled FSTs.
//!
//! Loading is byte reinterpretation, not reconstruction: the node section is
//! copied in verbatim and traversal runs against it directly. The header is
//! fixed-size and parsed in one read; the footer carries a CRC32 over
//! everything before it plus a reversed magic, so truncation and corruption
//! are caught at load time, never mid-traversal.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ HEADER (48 bytes)                                        │
//! │   magic: [u8; 4] = "MOJI"                                │
//! │   version: u8 = 1                                        │
//! │   input_mode: u8        flags: u8 (bit 0: has empty out) │
//! │   algebra_id: u8                                         │
//! │   start_node: i64                                        │
//! │   node_count: u64, arc_count: u64 (diagnostic)           │
//! │   empty_len: u32, data_len: u64                          │
//! │   reserved: [u8; 4]                                      │
//! ├──────────────────────────────────────────────────────────┤
//! │ EMPTY OUTPUT (empty_len, algebra-encoded)                │
//! ├──────────────────────────────────────────────────────────┤
//! │ NODE DATA (data_len, reversed node blocks)               │
//! ├──────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "IJOM"                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crc32fast::Hasher as Crc32Hasher;

use crate::fst::bytes::SliceReader;
use crate::fst::outputs::OutputAlgebra;
use crate::fst::{CompiledAddr, Fst, InputMode};

/// Magic bytes: "MOJI" (header)
pub const MAGIC: [u8; 4] = *b"MOJI";

/// Footer magic: "IJOM" (reversed, marks a complete file)
pub const FOOTER_MAGIC: [u8; 4] = *b"IJOM";

/// Current format version.
pub const VERSION: u8 = 1;

/// Header flag: the empty key is accepted.
const FLAG_HAS_EMPTY_OUTPUT: u8 = 0b0000_0001;

// ============================================================================
// ERRORS
// ============================================================================

/// What can go wrong loading (or writing) a serialized FST.
#[derive(Debug)]
pub enum FstError {
    Io(io::Error),
    /// Bytes that are not a valid FST file: bad magic, inconsistent section
    /// lengths, checksum mismatch, truncation.
    Corrupt(String),
    /// A well-formed file from a newer (or unknown) format revision.
    UnsupportedVersion(u8),
    /// The file was built with a different output algebra than the caller
    /// supplied.
    AlgebraMismatch { expected: u8, found: u8 },
}

impl fmt::Display for FstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FstError::Io(e) => write!(f, "i/o error: {}", e),
            FstError::Corrupt(why) => write!(f, "corrupt fst data: {}", why),
            FstError::UnsupportedVersion(v) => {
                write!(f, "unsupported fst format version {}", v)
            }
            FstError::AlgebraMismatch { expected, found } => write!(
                f,
                "output algebra mismatch: caller supplied id {}, file has id {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for FstError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FstError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FstError {
    fn from(e: io::Error) -> FstError {
        FstError::Io(e)
    }
}

// ============================================================================
// HEADER / FOOTER
// ============================================================================

/// Fixed-size file header. Parse first, then you know where everything is.
#[derive(Debug, Clone)]
pub struct FstHeader {
    pub version: u8,
    pub input_mode: u8,
    pub algebra_id: u8,
    pub flags: u8,
    pub start_node: i64,
    pub node_count: u64,
    pub arc_count: u64,
    pub empty_len: u32,
    pub data_len: u64,
}

impl FstHeader {
    // 4 (magic) + 4 (u8 fields) + 3*8 (i64/u64) + 4 + 8 + 4 (reserved) = 48
    pub const SIZE: usize = 48;

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version, self.input_mode, self.algebra_id, self.flags])?;
        w.write_all(&self.start_node.to_le_bytes())?;
        w.write_all(&self.node_count.to_le_bytes())?;
        w.write_all(&self.arc_count.to_le_bytes())?;
        w.write_all(&self.empty_len.to_le_bytes())?;
        w.write_all(&self.data_len.to_le_bytes())?;
        w.write_all(&[0u8; 4])?; // reserved
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> Result<FstHeader, FstError> {
        if bytes.len() < Self::SIZE {
            return Err(FstError::Corrupt("file shorter than header".to_string()));
        }
        if bytes[0..4] != MAGIC {
            return Err(FstError::Corrupt(format!(
                "bad magic: expected MOJI, got {:?}",
                &bytes[0..4]
            )));
        }
        let le8 = |off: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[off..off + 8]);
            b
        };
        Ok(FstHeader {
            version: bytes[4],
            input_mode: bytes[5],
            algebra_id: bytes[6],
            flags: bytes[7],
            start_node: i64::from_le_bytes(le8(8)),
            node_count: u64::from_le_bytes(le8(16)),
            arc_count: u64::from_le_bytes(le8(24)),
            empty_len: u32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]),
            data_len: u64::from_le_bytes(le8(36)),
            // bytes[44..48] reserved
        })
    }
}

/// Footer: CRC32 over header + sections, then the reversed magic.
#[derive(Debug, Clone)]
pub struct FstFooter {
    pub crc32: u32,
}

impl FstFooter {
    pub const SIZE: usize = 8;

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> Result<FstFooter, FstError> {
        if bytes.len() < Self::SIZE {
            return Err(FstError::Corrupt("file shorter than footer".to_string()));
        }
        let start = bytes.len() - Self::SIZE;
        if bytes[start + 4..] != FOOTER_MAGIC {
            return Err(FstError::Corrupt(format!(
                "bad footer magic: expected IJOM, got {:?}",
                &bytes[start + 4..]
            )));
        }
        let crc32 =
            u32::from_le_bytes([bytes[start], bytes[start + 1], bytes[start + 2], bytes[start + 3]]);
        Ok(FstFooter { crc32 })
    }

    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

// ============================================================================
// SAVE / LOAD
// ============================================================================

impl<A: OutputAlgebra> Fst<A> {
    /// Serialize to a writer.
    pub fn save<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut empty_bytes = Vec::new();
        if let Some(empty) = &self.empty_output {
            self.algebra.write(empty, &mut empty_bytes);
        }

        let header = FstHeader {
            version: VERSION,
            input_mode: self.input_mode.as_u8(),
            algebra_id: self.algebra.algebra_id(),
            flags: if self.empty_output.is_some() {
                FLAG_HAS_EMPTY_OUTPUT
            } else {
                0
            },
            start_node: self.start_node,
            node_count: self.node_count,
            arc_count: self.arc_count,
            empty_len: empty_bytes.len() as u32,
            data_len: self.data.len() as u64,
        };

        let mut buf =
            Vec::with_capacity(FstHeader::SIZE + empty_bytes.len() + self.data.len() + FstFooter::SIZE);
        header.write(&mut buf)?;
        buf.extend_from_slice(&empty_bytes);
        buf.extend_from_slice(&self.data);
        let footer = FstFooter {
            crc32: FstFooter::compute_crc32(&buf),
        };
        footer.write(&mut buf)?;
        w.write_all(&buf)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        self.save(&mut file)
    }

    /// Reconstruct from serialized bytes. The caller supplies the same
    /// output algebra the file was built with; a mismatch is an error, not
    /// a guess.
    pub fn load(bytes: &[u8], algebra: A) -> Result<Fst<A>, FstError> {
        if bytes.len() < FstHeader::SIZE + FstFooter::SIZE {
            return Err(FstError::Corrupt("file too short".to_string()));
        }
        let header = FstHeader::read(bytes)?;
        if header.version != VERSION {
            return Err(FstError::UnsupportedVersion(header.version));
        }
        if header.algebra_id != algebra.algebra_id() {
            return Err(FstError::AlgebraMismatch {
                expected: algebra.algebra_id(),
                found: header.algebra_id,
            });
        }
        let input_mode = InputMode::from_u8(header.input_mode)
            .ok_or_else(|| FstError::Corrupt(format!("unknown input mode {}", header.input_mode)))?;

        let expected_len = FstHeader::SIZE
            + header.empty_len as usize
            + header.data_len as usize
            + FstFooter::SIZE;
        if expected_len != bytes.len() {
            return Err(FstError::Corrupt(format!(
                "section lengths sum to {} but file is {} bytes",
                expected_len,
                bytes.len()
            )));
        }

        // verify integrity before trusting any section content
        let footer = FstFooter::read(bytes)?;
        let actual_crc = FstFooter::compute_crc32(&bytes[..bytes.len() - FstFooter::SIZE]);
        if footer.crc32 != actual_crc {
            return Err(FstError::Corrupt(format!(
                "checksum mismatch: footer {:#010x}, computed {:#010x}",
                footer.crc32, actual_crc
            )));
        }

        let empty_start = FstHeader::SIZE;
        let data_start = empty_start + header.empty_len as usize;
        let data_end = data_start + header.data_len as usize;

        let empty_output = if header.flags & FLAG_HAS_EMPTY_OUTPUT != 0 {
            let section = &bytes[empty_start..data_start];
            let mut r = SliceReader::new(section);
            let value = algebra.read(&mut r);
            if r.position() != section.len() {
                return Err(FstError::Corrupt(
                    "empty-output section length mismatch".to_string(),
                ));
            }
            Some(value)
        } else {
            None
        };

        let data = bytes[data_start..data_end].to_vec();
        if header.start_node < -1 || header.start_node >= data.len() as CompiledAddr {
            return Err(FstError::Corrupt(format!(
                "start node {} outside data section",
                header.start_node
            )));
        }

        Ok(Fst {
            algebra,
            data,
            start_node: header.start_node,
            empty_output,
            input_mode,
            node_count: header.node_count,
            arc_count: header.arc_count,
        })
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P, algebra: A) -> Result<Fst<A>, FstError> {
        let bytes = fs::read(path)?;
        Fst::load(&bytes, algebra)
    }
}
