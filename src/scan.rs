//! Tag-scanning decoder for existing archives.
//!
//! Walks every byte offset of an immutable buffer looking for `OBJX` /
//! `FACE` tags and decodes the fixed-offset header fields at each hit. The
//! scan performs no record-boundary validation: tag bytes that happen to
//! occur inside vertex or face payloads produce false-positive rows. That
//! heuristic matches the original tabulation tooling and is accepted for
//! compatibility; candidates too close to the end of the buffer for a full
//! header are skipped, never fatal, since the scanner exists to survey
//! possibly-corrupt archives.

use crate::formats::{FaceHeader, ObjxHeader, FACE_TAG, OBJX_TAG};

/// An OBJX header hit with the offset it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjxRecord {
    pub offset: usize,
    pub header: ObjxHeader,
}

/// A FACE header hit with the offset it was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRecord {
    pub offset: usize,
    pub header: FaceHeader,
}

/// Linear scanner over one immutable byte buffer.
///
/// Each call to [`objects`](Self::objects) or [`faces`](Self::faces) starts
/// a fresh scan; the buffer is never mutated.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveScanner<'a> {
    data: &'a [u8],
}

impl<'a> ArchiveScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Lazily decode every OBJX header occurrence.
    pub fn objects(&self) -> impl Iterator<Item = ObjxRecord> + 'a {
        let data = self.data;
        tag_offsets(data, OBJX_TAG).filter_map(move |offset| {
            ObjxHeader::from_bytes(&data[offset..]).map(|header| ObjxRecord { offset, header })
        })
    }

    /// Lazily decode every FACE header occurrence.
    pub fn faces(&self) -> impl Iterator<Item = FaceRecord> + 'a {
        let data = self.data;
        tag_offsets(data, FACE_TAG).filter_map(move |offset| {
            FaceHeader::from_bytes(&data[offset..]).map(|header| FaceRecord { offset, header })
        })
    }
}

/// Every byte offset at which `tag` occurs.
fn tag_offsets<'a>(data: &'a [u8], tag: &'static [u8; 4]) -> impl Iterator<Item = usize> + 'a {
    (0..data.len().saturating_sub(3)).filter(move |&i| &data[i..i + 4] == tag)
}
