//! OBJX/FACE binary record layout.
//!
//! All integers little-endian.
//!
//! # OBJX header layout
//! ```text
//! 0x00: tag          b"OBJX"
//! 0x04: size         u32 (record length, excludes the trailing 12-byte block)
//! 0x08: vertex_count u16
//! 0x0A: face_count   u16
//! 0x0C: attributes   u32 (always 0)
//! 0x10: radius       u32 (standalone exports: three collision bytes + zero)
//! 0x14: y_radius     u32 (always 0 in standalone exports)
//! 0x18: name         [u8; 24] null-padded ASCII
//! 0x30: texture_file [u8; 64] null-padded ASCII
//! 0x70: anim_count   u32 \
//! 0x74: anim_ptr     u32  > the opaque 12-byte block
//! 0x78: id           i32 /
//! 0x7C: vertex table (vertex_count * 12 bytes, i32 triples)
//! var:  FACE records
//! ```
//!
//! The 12 bytes at 0x70 are meaningful only inside a full `sim3d#.max`
//! archive; a standalone export carries a sentinel there, and the bytes must
//! be copied verbatim from the record being replaced when splicing into an
//! archive. The stored size at 0x04 does not count them.
//!
//! # FACE record layout
//! ```text
//! 0x00: tag          b"FACE"
//! 0x04: size         u32 (21 + 10 * vertex_count, self-inclusive)
//! 0x08: vertex_count u16
//! 0x0A: flags        u16
//! 0x0C: is_light     u16 (always 0)
//! 0x0E: group        u32 (color/texture index)
//! 0x12: type_code    u8
//! 0x13: color_index  u8 (low byte of group)
//! 0x14: texture_file u8
//! 0x15: vertex indices (vertex_count * 2 bytes, 1-based into vertex table)
//! var:  UV pairs (vertex_count * 8 bytes, i32 pairs; zero unless textured)
//! ```

/// Tag opening every object record.
pub const OBJX_TAG: &[u8; 4] = b"OBJX";

/// Tag opening every face record.
pub const FACE_TAG: &[u8; 4] = b"FACE";

/// Offset of the backpatched size field, for both record kinds.
pub const SIZE_FIELD_OFFSET: usize = 4;

/// Combined width of the null-padded name + texture-file block.
pub const NAME_BLOCK_SIZE: usize = 88;

/// Offset of the opaque 12-byte block within an OBJX record.
pub const OPAQUE_BLOCK_OFFSET: usize = 112;

/// Width of the opaque block. Not counted by the stored record size.
pub const OPAQUE_BLOCK_SIZE: usize = 12;

/// Sentinel a standalone export writes into the opaque block.
pub const OPAQUE_SENTINEL: &[u8; 12] = b"DEADDEADDEAD";

/// Bytes per vertex table entry (three i32 components).
pub const VERTEX_ENTRY_SIZE: usize = 12;

/// Absolute offset of the archive-global total vertex count (i32) in a
/// `sim3d#.max` file preamble. The game reads these running totals, so they
/// must be adjusted whenever records are swapped out.
pub const TOTAL_VERTEX_COUNT_OFFSET: usize = 882;

/// Absolute offset of the archive-global face count (i32).
pub const GLOBAL_FACE_COUNT_OFFSET: usize = 894;

/// Absolute offset of the archive-global unique vertex count (i32).
pub const UNIQUE_VERTEX_COUNT_OFFSET: usize = 898;

/// OBJX record header (124 bytes including tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjxHeader {
    pub size: u32,
    pub vertex_count: u16,
    pub face_count: u16,
    pub attributes: u32,
    pub radius: u32,
    pub y_radius: u32,
    pub name: String,
    pub texture_file: String,
    pub anim_count: u32,
    pub anim_ptr: u32,
    pub id: i32,
}

impl ObjxHeader {
    pub const SIZE: usize = 124;

    /// Collision bytes 1-4 (the low bytes of the radius field).
    pub fn collision_bytes(&self) -> [u8; 4] {
        self.radius.to_le_bytes()
    }

    /// Parse a header from bytes starting at the tag.
    ///
    /// Returns `None` if the tag does not match or fewer than
    /// [`Self::SIZE`] bytes remain.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || &bytes[0..4] != OBJX_TAG {
            return None;
        }
        Some(Self {
            size: read_u32(bytes, 4),
            vertex_count: read_u16(bytes, 8),
            face_count: read_u16(bytes, 10),
            attributes: read_u32(bytes, 12),
            radius: read_u32(bytes, 16),
            y_radius: read_u32(bytes, 20),
            name: read_padded_ascii(&bytes[24..48]),
            texture_file: read_padded_ascii(&bytes[48..112]),
            anim_count: read_u32(bytes, 112),
            anim_ptr: read_u32(bytes, 116),
            id: read_u32(bytes, 120) as i32,
        })
    }
}

/// FACE record header (21 bytes including tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceHeader {
    pub size: u32,
    pub vertex_count: u16,
    pub flags: u16,
    pub is_light: u16,
    pub group: u32,
    pub type_code: u8,
    pub color_index: u8,
    pub texture_file: u8,
}

impl FaceHeader {
    pub const SIZE: usize = 21;

    /// Parse a header from bytes starting at the tag.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || &bytes[0..4] != FACE_TAG {
            return None;
        }
        Some(Self {
            size: read_u32(bytes, 4),
            vertex_count: read_u16(bytes, 8),
            flags: read_u16(bytes, 10),
            is_light: read_u16(bytes, 12),
            group: read_u32(bytes, 14),
            type_code: bytes[18],
            color_index: bytes[19],
            texture_file: bytes[20],
        })
    }
}

/// Total byte length of a FACE record with `vertex_count` vertices:
/// 21-byte fixed header + 2 bytes per index + 8 bytes per UV pair.
pub fn face_record_size(vertex_count: usize) -> usize {
    FaceHeader::SIZE + 10 * vertex_count
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Decode a null-padded ASCII field, stopping at the first NUL.
fn read_padded_ascii(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}
