//! Face classification: vertex-group names to (type code, flag word) pairs.
//!
//! The games crash at spawn time if a face's type code and flag word don't
//! agree, so both values live in a single closed registry and are only ever
//! read together. There is no path that sets one without the other.

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::palette::{Palette, Rgb, UNSHADED_RANGE_START};

/// Group name that restricts palette lookup to the unshaded range
/// (the last 10 palette entries).
pub const UNSHADED_GROUP: &str = "unshaded";

/// The closed registry of face categories.
///
/// Serialized spellings match the vertex-group names the authoring
/// convention uses for direct assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceCategory {
    #[serde(rename = "lineSprite")]
    LineSprite,
    #[serde(rename = "faceTranslucent")]
    FaceTranslucent,
    #[serde(rename = "faceTexturedDedicated")]
    FaceTexturedDedicated,
    #[serde(rename = "faceColorFlatShaded")]
    FaceColorFlatShaded,
    #[serde(rename = "faceTexturedAtlas")]
    FaceTexturedAtlas,
    #[serde(rename = "faceColorSmoothShaded")]
    FaceColorSmoothShaded,
    #[serde(rename = "lineNormal")]
    LineNormal,
    #[serde(rename = "pointLight")]
    PointLight,
    #[serde(rename = "pointEmitter")]
    PointEmitter,
}

impl FaceCategory {
    pub const ALL: [FaceCategory; 9] = [
        FaceCategory::LineSprite,
        FaceCategory::FaceTranslucent,
        FaceCategory::FaceTexturedDedicated,
        FaceCategory::FaceColorFlatShaded,
        FaceCategory::FaceTexturedAtlas,
        FaceCategory::FaceColorSmoothShaded,
        FaceCategory::LineNormal,
        FaceCategory::PointLight,
        FaceCategory::PointEmitter,
    ];

    /// Numeric type code written to the FACE record.
    pub fn type_code(self) -> u8 {
        match self {
            FaceCategory::LineSprite => 2,
            FaceCategory::FaceTranslucent => 11,
            FaceCategory::FaceTexturedDedicated => 13,
            FaceCategory::FaceColorFlatShaded => 15,
            FaceCategory::FaceTexturedAtlas => 18,
            FaceCategory::FaceColorSmoothShaded => 19,
            FaceCategory::LineNormal => 20,
            FaceCategory::PointLight => 25,
            FaceCategory::PointEmitter => 26,
        }
    }

    /// Flag word paired with this category's type code.
    pub fn flag_word(self) -> u16 {
        match self {
            FaceCategory::LineSprite => 22,
            FaceCategory::FaceTranslucent => 2,
            FaceCategory::FaceTexturedDedicated => 8194,
            FaceCategory::FaceColorFlatShaded => 3,
            FaceCategory::FaceTexturedAtlas => 8194,
            FaceCategory::FaceColorSmoothShaded => 16386,
            FaceCategory::LineNormal => 32770,
            FaceCategory::PointLight => 2,
            FaceCategory::PointEmitter => 2,
        }
    }

    /// Vertex-group name that assigns this category directly.
    pub fn group_name(self) -> &'static str {
        match self {
            FaceCategory::LineSprite => "lineSprite",
            FaceCategory::FaceTranslucent => "faceTranslucent",
            FaceCategory::FaceTexturedDedicated => "faceTexturedDedicated",
            FaceCategory::FaceColorFlatShaded => "faceColorFlatShaded",
            FaceCategory::FaceTexturedAtlas => "faceTexturedAtlas",
            FaceCategory::FaceColorSmoothShaded => "faceColorSmoothShaded",
            FaceCategory::LineNormal => "lineNormal",
            FaceCategory::PointLight => "pointLight",
            FaceCategory::PointEmitter => "pointEmitter",
        }
    }

    pub fn from_group_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.group_name() == name)
    }

    /// Whether faces of this category carry real UV coordinates.
    /// All other categories emit zeroed UV pairs.
    pub fn requires_uv(self) -> bool {
        matches!(
            self,
            FaceCategory::FaceTexturedDedicated | FaceCategory::FaceTexturedAtlas
        )
    }
}

/// User-declared override binding a group name to an explicit category,
/// texture file, and texture/color index. Bypasses palette lookup entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAssignment {
    pub category: FaceCategory,
    #[serde(default)]
    pub texture_file: u8,
    pub index: u32,
}

/// Group-name keyed special assignment table.
pub type SpecialGroups = hashbrown::HashMap<String, SpecialAssignment>;

/// Resolved face attributes ready for record emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: FaceCategory,
    /// Color or texture index, written both as a 4-byte field and as the
    /// 1-byte color field (low byte) of the FACE record.
    pub index: u32,
    pub texture_file: u8,
}

impl Classification {
    pub fn flags(&self) -> u16 {
        self.category.flag_word()
    }

    pub fn type_code(&self) -> u8 {
        self.category.type_code()
    }
}

/// Classify a face from the group memberships of its first emitted vertex.
///
/// Rules are evaluated over the groups in stored order; the first group that
/// names a registry category or a special assignment wins. The `unshaded`
/// group only moves the palette search start and is honored wherever it
/// appears, before or after the category group. Faces matching nothing fall
/// back to flat-shaded color.
///
/// `first_loop_color` is the face's first-loop vertex color (after winding
/// reversal), consulted only when no special assignment applies.
pub fn classify(
    groups: &[String],
    first_loop_color: Option<[f32; 3]>,
    palette: &Palette,
    specials: &SpecialGroups,
) -> Result<Classification> {
    let mut search_start = 0;
    let mut category = FaceCategory::FaceColorFlatShaded;
    let mut special: Option<SpecialAssignment> = None;
    let mut matched = false;

    for name in groups {
        if name.as_str() == UNSHADED_GROUP {
            search_start = UNSHADED_RANGE_START;
            continue;
        }
        if matched {
            continue;
        }
        if let Some(found) = FaceCategory::from_group_name(name) {
            category = found;
            matched = true;
            continue;
        }
        if let Some(&assignment) = specials.get(name.as_str()) {
            category = assignment.category;
            special = Some(assignment);
            matched = true;
        }
    }

    let (index, texture_file) = match special {
        Some(assignment) => (assignment.index, assignment.texture_file),
        None => {
            let color = first_loop_color.ok_or_else(|| {
                ExportError::UnsupportedFace(format!(
                    "category {:?} needs a vertex color and the face has none",
                    category
                ))
            })?;
            let rgb = quantize_color(color)?;
            (palette.index_of(rgb, search_start)? as u32, 0)
        }
    };

    Ok(Classification {
        category,
        index,
        texture_file,
    })
}

/// Scale float channels to 8-bit palette channels via `round(255 * c)`.
fn quantize_color(color: [f32; 3]) -> Result<Rgb> {
    let mut rgb = [0u8; 3];
    for (out, &channel) in rgb.iter_mut().zip(&color) {
        let scaled = (255.0 * channel as f64).round();
        if !(0.0..=255.0).contains(&scaled) {
            return Err(ExportError::Range(format!(
                "vertex color channel {} outside [0, 1]",
                channel
            )));
        }
        *out = scaled as u8;
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_palette() -> Palette {
        // 256 entries; a marker color at 10 duplicated at 250 so the
        // unshaded range can be told apart from a normal lookup.
        let mut text = String::from("GIMP Palette\nName: test\n#\n");
        for i in 0..256u32 {
            if i == 10 || i == 250 {
                text.push_str("9 9 9\n");
            } else {
                text.push_str(&format!("{} 0 0\n", i % 256));
            }
        }
        Palette::parse(&text).unwrap()
    }

    fn color_999() -> Option<[f32; 3]> {
        Some([9.0 / 255.0, 9.0 / 255.0, 9.0 / 255.0])
    }

    #[test]
    fn registry_pairs_are_fixed() {
        let expected: [(FaceCategory, u8, u16); 9] = [
            (FaceCategory::LineSprite, 2, 22),
            (FaceCategory::FaceTranslucent, 11, 2),
            (FaceCategory::FaceTexturedDedicated, 13, 8194),
            (FaceCategory::FaceColorFlatShaded, 15, 3),
            (FaceCategory::FaceTexturedAtlas, 18, 8194),
            (FaceCategory::FaceColorSmoothShaded, 19, 16386),
            (FaceCategory::LineNormal, 20, 32770),
            (FaceCategory::PointLight, 25, 2),
            (FaceCategory::PointEmitter, 26, 2),
        ];
        for (category, code, flags) in expected {
            assert_eq!(category.type_code(), code);
            assert_eq!(category.flag_word(), flags);
            assert_eq!(
                FaceCategory::from_group_name(category.group_name()),
                Some(category)
            );
        }
    }

    #[test]
    fn default_is_flat_shaded() {
        let palette = test_palette();
        let result = classify(&[], color_999(), &palette, &SpecialGroups::new()).unwrap();
        assert_eq!(result.category, FaceCategory::FaceColorFlatShaded);
        assert_eq!(result.index, 10);
        assert_eq!(result.texture_file, 0);
    }

    #[test]
    fn registry_group_sets_category() {
        let palette = test_palette();
        let groups = vec!["faceColorSmoothShaded".to_string()];
        let result = classify(&groups, color_999(), &palette, &SpecialGroups::new()).unwrap();
        assert_eq!(result.category, FaceCategory::FaceColorSmoothShaded);
        assert_eq!(result.flags(), 16386);
    }

    #[test]
    fn first_matching_group_wins() {
        let palette = test_palette();
        let groups = vec![
            "lineNormal".to_string(),
            "faceTranslucent".to_string(),
        ];
        let result = classify(&groups, color_999(), &palette, &SpecialGroups::new()).unwrap();
        assert_eq!(result.category, FaceCategory::LineNormal);
    }

    #[test]
    fn special_assignment_bypasses_palette() {
        let palette = test_palette();
        let mut specials = SpecialGroups::new();
        specials.insert(
            "gTex78".to_string(),
            SpecialAssignment {
                category: FaceCategory::FaceTexturedDedicated,
                texture_file: 0,
                index: 78,
            },
        );
        let groups = vec!["gTex78".to_string()];
        // No vertex color at all: the special index must still resolve.
        let result = classify(&groups, None, &palette, &specials).unwrap();
        assert_eq!(result.category, FaceCategory::FaceTexturedDedicated);
        assert_eq!(result.index, 78);
    }

    #[test]
    fn unshaded_moves_search_start_without_changing_category() {
        let palette = test_palette();
        let groups = vec![UNSHADED_GROUP.to_string()];
        let result = classify(&groups, color_999(), &palette, &SpecialGroups::new()).unwrap();
        assert_eq!(result.category, FaceCategory::FaceColorFlatShaded);
        assert_eq!(result.index, 250);
        assert!((UNSHADED_RANGE_START..=255).contains(&(result.index as usize)));
    }

    #[test]
    fn unshaded_combines_with_a_category_group_in_either_order() {
        let palette = test_palette();
        for groups in [
            vec![
                UNSHADED_GROUP.to_string(),
                "faceColorSmoothShaded".to_string(),
            ],
            vec![
                "faceColorSmoothShaded".to_string(),
                UNSHADED_GROUP.to_string(),
            ],
        ] {
            let result = classify(&groups, color_999(), &palette, &SpecialGroups::new()).unwrap();
            assert_eq!(result.category, FaceCategory::FaceColorSmoothShaded);
            assert_eq!(
                result.index, 250,
                "unshaded must restrict the palette range regardless of group order"
            );
        }
    }

    #[test]
    fn palette_miss_is_fatal() {
        let palette = test_palette();
        let missing = Some([10.0 / 255.0, 200.0 / 255.0, 30.0 / 255.0]);
        assert!(matches!(
            classify(&[], missing, &palette, &SpecialGroups::new()),
            Err(ExportError::ColorNotFound(10, 200, 30))
        ));
    }

    #[test]
    fn missing_color_without_special_is_unsupported() {
        let palette = test_palette();
        assert!(matches!(
            classify(&[], None, &palette, &SpecialGroups::new()),
            Err(ExportError::UnsupportedFace(_))
        ));
    }
}
