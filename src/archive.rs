//! Editing operations on full `sim3d#.max` archives.
//!
//! An archive is a concatenation of OBJX records. The stored size of each
//! record excludes the opaque 12-byte block, so a record's true byte span is
//! `size + 12`. When substituting a standalone export for an existing record
//! the victim's opaque block must be carried over verbatim; the game refuses
//! meshes whose block doesn't match.

use crate::error::{ExportError, Result};
use crate::formats::{
    ObjxHeader, GLOBAL_FACE_COUNT_OFFSET, OPAQUE_BLOCK_OFFSET, OPAQUE_BLOCK_SIZE,
    TOTAL_VERTEX_COUNT_OFFSET, UNIQUE_VERTEX_COUNT_OFFSET,
};
use crate::scan::ArchiveScanner;

/// Byte span of one OBJX record within an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpan {
    pub offset: usize,
    pub len: usize,
}

impl ObjectSpan {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Locate the span of the `index`-th OBJX record.
fn object_span(data: &[u8], index: usize) -> Result<ObjectSpan> {
    let record = ArchiveScanner::new(data)
        .objects()
        .nth(index)
        .ok_or(ExportError::NoSuchObject(index))?;
    let len = record.header.size as usize + OPAQUE_BLOCK_SIZE;
    if record.offset + len > data.len() {
        return Err(ExportError::Truncated(record.offset));
    }
    Ok(ObjectSpan {
        offset: record.offset,
        len,
    })
}

/// Extract the complete bytes of the `index`-th OBJX record.
pub fn extract_object(data: &[u8], index: usize) -> Result<&[u8]> {
    let span = object_span(data, index)?;
    Ok(&data[span.offset..span.end()])
}

/// Per-record counts that feed the archive-global running totals.
#[derive(Debug, Clone, Copy)]
struct RecordCounts {
    /// Sum of the vertex counts of every FACE record.
    total_vertices: i32,
    faces: i32,
    /// The record header's vertex table size.
    unique_vertices: i32,
}

fn record_counts(record: &[u8]) -> RecordCounts {
    let header = ObjxHeader::from_bytes(record);
    RecordCounts {
        total_vertices: ArchiveScanner::new(record)
            .faces()
            .map(|f| f.header.vertex_count as i32)
            .sum(),
        faces: header.as_ref().map(|h| h.face_count as i32).unwrap_or(0),
        unique_vertices: header.as_ref().map(|h| h.vertex_count as i32).unwrap_or(0),
    }
}

/// Replace the OBJX records at `indices` with `replacement`, preserving each
/// victim's opaque 12-byte block. The replacement must itself be a complete
/// OBJX record (typically a standalone encoder output).
///
/// A full `sim3d#.max` file carries archive-global running totals (total
/// vertex, face, and unique vertex counts) in its preamble; when the input
/// has that preamble the totals are adjusted for every swapped record. A
/// bare record concatenation has no preamble and is spliced as-is.
pub fn replace_object(data: &[u8], indices: &[usize], replacement: &[u8]) -> Result<Vec<u8>> {
    let header = ObjxHeader::from_bytes(replacement).ok_or_else(|| {
        ExportError::Config("replacement does not start with an OBJX record".to_string())
    })?;
    if header.size as usize + OPAQUE_BLOCK_SIZE != replacement.len() {
        return Err(ExportError::Config(format!(
            "replacement length {} disagrees with its stored size {}",
            replacement.len(),
            header.size
        )));
    }

    // Spans are taken from the unmodified input; splicing from the highest
    // offset down keeps the remaining spans valid.
    let mut spans = Vec::with_capacity(indices.len());
    for &index in indices {
        spans.push(object_span(data, index)?);
    }
    spans.sort_by_key(|span| span.offset);
    spans.dedup();
    spans.reverse();

    // The preamble ends before the first record in a real archive; a bare
    // record concatenation starts at offset 0 and has no global counts.
    let preamble_end = UNIQUE_VERTEX_COUNT_OFFSET + 4;
    let has_global_counts =
        data.len() >= preamble_end && spans.iter().all(|span| span.offset >= preamble_end);

    let mut out = data.to_vec();
    let replacement_counts = record_counts(replacement);
    let mut deltas = RecordCounts {
        total_vertices: 0,
        faces: 0,
        unique_vertices: 0,
    };

    for span in spans {
        let victim = record_counts(&data[span.offset..span.end()]);
        deltas.total_vertices += replacement_counts.total_vertices - victim.total_vertices;
        deltas.faces += replacement_counts.faces - victim.faces;
        deltas.unique_vertices += replacement_counts.unique_vertices - victim.unique_vertices;

        let mut patched = replacement.to_vec();
        patched[OPAQUE_BLOCK_OFFSET..OPAQUE_BLOCK_OFFSET + OPAQUE_BLOCK_SIZE].copy_from_slice(
            &data[span.offset + OPAQUE_BLOCK_OFFSET..span.offset + OPAQUE_BLOCK_OFFSET + OPAQUE_BLOCK_SIZE],
        );
        out.splice(span.offset..span.offset + span.len, patched);
    }

    if has_global_counts {
        for (offset, delta) in [
            (TOTAL_VERTEX_COUNT_OFFSET, deltas.total_vertices),
            (GLOBAL_FACE_COUNT_OFFSET, deltas.faces),
            (UNIQUE_VERTEX_COUNT_OFFSET, deltas.unique_vertices),
        ] {
            let mut field = [0u8; 4];
            field.copy_from_slice(&out[offset..offset + 4]);
            let old = i32::from_le_bytes(field);
            out[offset..offset + 4].copy_from_slice(&(old + delta).to_le_bytes());
        }
    }
    Ok(out)
}
