//! Game palette: an ordered list of RGB triples with exact-match lookup.

use std::path::Path;

use crate::error::{ExportError, Result};

/// An RGB triple as stored in the palette.
pub type Rgb = [u8; 3];

/// First index of the unshaded range: the last 10 palette entries are
/// constant colors that don't brighten or darken with face orientation.
pub const UNSHADED_RANGE_START: usize = 246;

/// Number of header lines in a GIMP palette file.
const HEADER_LINES: usize = 3;

/// Ordered, duplicate-tolerant palette loaded from a GIMP `.gpl` file.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    /// Parse a palette from GIMP palette text. The fixed 3-line header is
    /// skipped; every remaining line must hold exactly three integers.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (line_number, line) in text.lines().enumerate().skip(HEADER_LINES) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(ExportError::Config(format!(
                    "palette line {}: expected three integers, got {:?}",
                    line_number + 1,
                    line
                )));
            }
            let mut rgb = [0u8; 3];
            for (channel, field) in rgb.iter_mut().zip(&fields) {
                *channel = field.parse().map_err(|_| {
                    ExportError::Config(format!(
                        "palette line {}: invalid channel value {:?}",
                        line_number + 1,
                        field
                    ))
                })?;
            }
            entries.push(rgb);
        }
        Ok(Self { entries })
    }

    /// Load a palette file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.entries.get(index).copied()
    }

    /// Index of the first exact match at or after `search_start`.
    ///
    /// Duplicate colors resolve to the first matching index; this is a known
    /// ambiguity of the format, not an error. A color with no exact match is
    /// fatal - there is deliberately no nearest-neighbor fallback.
    pub fn index_of(&self, color: Rgb, search_start: usize) -> Result<usize> {
        self.entries
            .iter()
            .enumerate()
            .skip(search_start)
            .find(|(_, &entry)| entry == color)
            .map(|(index, _)| index)
            .ok_or(ExportError::ColorNotFound(color[0], color[1], color[2]))
    }
}
