//! Mesh encoder: assembles one OBJX record in a single sequential pass.
//!
//! Emission order is fixed: header with a size placeholder, vertex table
//! (synthetic origin first), one FACE record per polygon, then the size
//! backpatch over the placeholder. The backpatch is always the last action;
//! any earlier error aborts the encode with nothing committed.

use std::io::Write;

use crate::config::ExportConfig;
use crate::coords::{to_spatial, to_texture};
use crate::error::{ExportError, Result};
use crate::face::classify;
use crate::formats::{
    face_record_size, FACE_TAG, NAME_BLOCK_SIZE, OBJX_TAG, OPAQUE_BLOCK_SIZE, OPAQUE_SENTINEL,
    SIZE_FIELD_OFFSET,
};
use crate::mesh::{Face, Loop, Mesh};
use crate::palette::Palette;

/// Encode a mesh into a standalone OBJX record.
///
/// The same mesh and configuration always produce byte-identical output.
pub fn encode_mesh(mesh: &Mesh, config: &ExportConfig, palette: &Palette) -> Result<Vec<u8>> {
    let vertex_count = mesh.vertices.len() + 1; // synthetic origin is vertex 0
    if vertex_count > u16::MAX as usize {
        return Err(ExportError::Range(format!(
            "{} vertices exceed the 16-bit vertex count field",
            mesh.vertices.len()
        )));
    }
    if mesh.faces.len() > u16::MAX as usize {
        return Err(ExportError::Range(format!(
            "{} faces exceed the 16-bit face count field",
            mesh.faces.len()
        )));
    }

    let mut out = Vec::new();
    write_header(&mut out, mesh, config, vertex_count as u16)?;

    write_vertex(&mut out, config.origin, config.spatial_scale)?;
    for vertex in &mesh.vertices {
        write_vertex(&mut out, vertex.position, config.spatial_scale)?;
    }

    for (face_index, face) in mesh.faces.iter().enumerate() {
        write_face(&mut out, mesh, face_index, face, config, palette)?;
    }

    // The stored size excludes the opaque 12-byte block by format convention.
    let stored = out.len() - OPAQUE_BLOCK_SIZE;
    if stored > u32::MAX as usize {
        return Err(ExportError::Range(format!(
            "record length {} exceeds the 32-bit size field",
            stored
        )));
    }
    out[SIZE_FIELD_OFFSET..SIZE_FIELD_OFFSET + 4]
        .copy_from_slice(&(stored as u32).to_le_bytes());

    tracing::info!(
        "Encoded {:?}: {} vertices, {} faces, {} bytes",
        mesh.name,
        vertex_count,
        mesh.faces.len(),
        out.len()
    );

    Ok(out)
}

/// Encode a mesh and write the record to `w`.
pub fn write_mesh<W: Write>(
    w: &mut W,
    mesh: &Mesh,
    config: &ExportConfig,
    palette: &Palette,
) -> Result<()> {
    let bytes = encode_mesh(mesh, config, palette)?;
    w.write_all(&bytes)?;
    Ok(())
}

fn write_header(
    out: &mut Vec<u8>,
    mesh: &Mesh,
    config: &ExportConfig,
    vertex_count: u16,
) -> Result<()> {
    if !mesh.name.is_ascii() {
        return Err(ExportError::Config(format!(
            "mesh name {:?} is not ASCII",
            mesh.name
        )));
    }
    if mesh.name.len() >= NAME_BLOCK_SIZE {
        return Err(ExportError::Range(format!(
            "mesh name {:?} exceeds the {}-byte name block",
            mesh.name,
            NAME_BLOCK_SIZE
        )));
    }

    out.extend_from_slice(OBJX_TAG);
    out.extend_from_slice(&0u32.to_le_bytes()); // size, backpatched last
    out.extend_from_slice(&vertex_count.to_le_bytes());
    out.extend_from_slice(&(mesh.faces.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // attributes
    out.extend_from_slice(&config.collision);
    out.push(0);
    out.extend_from_slice(&0u32.to_le_bytes()); // y radius

    let mut name_block = [0u8; NAME_BLOCK_SIZE];
    name_block[..mesh.name.len()].copy_from_slice(mesh.name.as_bytes());
    out.extend_from_slice(&name_block);

    // Meaningful only when spliced into an archive; see formats.rs.
    out.extend_from_slice(OPAQUE_SENTINEL);
    Ok(())
}

fn write_vertex(out: &mut Vec<u8>, position: [f32; 3], scale: f64) -> Result<()> {
    for component in to_spatial(position, scale)? {
        out.extend_from_slice(&component.to_le_bytes());
    }
    Ok(())
}

fn write_face(
    out: &mut Vec<u8>,
    mesh: &Mesh,
    face_index: usize,
    face: &Face,
    config: &ExportConfig,
    palette: &Palette,
) -> Result<()> {
    let n = face.vertices.len();
    if n == 0 {
        return Err(ExportError::UnsupportedFace(format!(
            "face {} has no vertices",
            face_index
        )));
    }
    if face.loops.len() != n {
        return Err(ExportError::UnsupportedFace(format!(
            "face {} has {} loops for {} vertices",
            face_index,
            face.loops.len(),
            n
        )));
    }
    if n > u16::MAX as usize {
        return Err(ExportError::Range(format!(
            "face {} has {} vertices, exceeding the 16-bit count field",
            face_index, n
        )));
    }

    // The target winding convention is opposite the authoring tool's.
    let indices: Vec<usize> = face.vertices.iter().rev().copied().collect();
    let loops: Vec<Loop> = face.loops.iter().rev().copied().collect();

    for &index in &indices {
        if index >= mesh.vertices.len() {
            return Err(ExportError::UnsupportedFace(format!(
                "face {} references vertex {} of {}",
                face_index,
                index,
                mesh.vertices.len()
            )));
        }
    }

    let first_vertex = &mesh.vertices[indices[0]];
    let class = classify(
        &first_vertex.groups,
        loops[0].color,
        palette,
        &config.special_groups,
    )?;

    out.extend_from_slice(FACE_TAG);
    out.extend_from_slice(&(face_record_size(n) as u32).to_le_bytes());
    out.extend_from_slice(&(n as u16).to_le_bytes());
    out.extend_from_slice(&class.flags().to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // is_light: zero in every observed mesh
    out.extend_from_slice(&class.index.to_le_bytes());
    out.push(class.type_code());
    out.push(class.index as u8); // low byte of the same value
    out.push(class.texture_file);

    for &index in &indices {
        // +1 because the synthetic origin occupies slot 0.
        out.extend_from_slice(&((index + 1) as u16).to_le_bytes());
    }

    if class.category.requires_uv() {
        for (corner, lp) in loops.iter().enumerate() {
            let uv = lp.uv.ok_or_else(|| {
                ExportError::UnsupportedFace(format!(
                    "face {} is textured but corner {} has no UV",
                    face_index, corner
                ))
            })?;
            for component in to_texture(uv[0], uv[1], config.texture_scale)? {
                out.extend_from_slice(&component.to_le_bytes());
            }
        }
    } else {
        for _ in 0..n {
            out.extend_from_slice(&[0u8; 8]);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{FaceCategory, SpecialAssignment};
    use crate::formats::{FaceHeader, ObjxHeader, VERTEX_ENTRY_SIZE};
    use crate::mesh::Vertex;

    fn test_palette() -> Palette {
        let mut text = String::from("GIMP Palette\nName: test\n#\n");
        for i in 0..=255u32 {
            text.push_str(&format!("{} {} {}\n", i, i, i));
        }
        Palette::parse(&text).unwrap()
    }

    fn gray(value: u8) -> Option<[f32; 3]> {
        let c = value as f32 / 255.0;
        Some([c, c, c])
    }

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new("tri");
        mesh.vertices = vec![
            Vertex::new([0.0, 0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0]),
            Vertex::new([0.0, 1.0, 2.0]),
        ];
        mesh.faces = vec![Face {
            vertices: vec![0, 1, 2],
            loops: vec![
                Loop { color: gray(7), uv: None },
                Loop { color: gray(7), uv: None },
                Loop { color: gray(7), uv: None },
            ],
        }];
        mesh
    }

    fn encode_triangle() -> Vec<u8> {
        encode_mesh(&triangle_mesh(), &ExportConfig::default(), &test_palette()).unwrap()
    }

    #[test]
    fn header_counts_and_name() {
        let bytes = encode_triangle();
        let header = ObjxHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.vertex_count, 4); // 3 input + origin
        assert_eq!(header.face_count, 1);
        assert_eq!(header.name, "tri");
        assert_eq!(header.collision_bytes(), [100, 100, 45, 0]);
        assert_eq!(&bytes[112..124], b"DEADDEADDEAD");
    }

    #[test]
    fn size_backpatch_excludes_opaque_block() {
        let bytes = encode_triangle();
        let header = ObjxHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.size as usize, bytes.len() - OPAQUE_BLOCK_SIZE);
    }

    #[test]
    fn vertex_table_starts_with_origin_and_permutes_axes() {
        let config = ExportConfig {
            origin: [1.0, 2.0, 3.0],
            spatial_scale: 100.0,
            ..ExportConfig::default()
        };
        let bytes = encode_mesh(&triangle_mesh(), &config, &test_palette()).unwrap();

        let read_i32 = |offset: usize| {
            i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
        };
        // Origin: (1,2,3) with scale 100 -> (100, 300, 200).
        assert_eq!(read_i32(ObjxHeader::SIZE), 100);
        assert_eq!(read_i32(ObjxHeader::SIZE + 4), 300);
        assert_eq!(read_i32(ObjxHeader::SIZE + 8), 200);
        // Input vertex 2 at table slot 3: (0,1,2) -> (0, 200, 100).
        let slot = ObjxHeader::SIZE + 3 * VERTEX_ENTRY_SIZE;
        assert_eq!(read_i32(slot), 0);
        assert_eq!(read_i32(slot + 4), 200);
        assert_eq!(read_i32(slot + 8), 100);
    }

    #[test]
    fn face_record_reverses_winding() {
        let bytes = encode_triangle();
        let face_offset = ObjxHeader::SIZE + 4 * VERTEX_ENTRY_SIZE;
        let header = FaceHeader::from_bytes(&bytes[face_offset..]).unwrap();
        assert_eq!(header.vertex_count, 3);
        assert_eq!(header.size as usize, face_record_size(3));

        let index_at = |i: usize| {
            let offset = face_offset + FaceHeader::SIZE + 2 * i;
            u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
        };
        // Authored [0,1,2] -> emitted [2,1,0], then +1 for the origin slot.
        assert_eq!([index_at(0), index_at(1), index_at(2)], [3, 2, 1]);
    }

    #[test]
    fn flat_color_face_has_paired_flags_and_zero_uvs() {
        let bytes = encode_triangle();
        let face_offset = ObjxHeader::SIZE + 4 * VERTEX_ENTRY_SIZE;
        let header = FaceHeader::from_bytes(&bytes[face_offset..]).unwrap();
        assert_eq!(header.type_code, 15);
        assert_eq!(header.flags, 3);
        assert_eq!(header.is_light, 0);
        assert_eq!(header.group, 7);
        assert_eq!(header.color_index, 7);
        assert_eq!(header.texture_file, 0);

        let uv_offset = face_offset + FaceHeader::SIZE + 2 * 3;
        assert!(bytes[uv_offset..uv_offset + 8 * 3].iter().all(|&b| b == 0));
        assert_eq!(face_offset + face_record_size(3), bytes.len());
    }

    #[test]
    fn every_category_emits_its_registered_pair() {
        let palette = test_palette();
        for category in FaceCategory::ALL {
            let mut mesh = triangle_mesh();
            mesh.vertices[2].groups = vec![category.group_name().to_string()];
            if category.requires_uv() {
                for lp in &mut mesh.faces[0].loops {
                    lp.uv = Some([0.5, 0.5]);
                }
            }
            let bytes = encode_mesh(&mesh, &ExportConfig::default(), &palette).unwrap();
            let face_offset = ObjxHeader::SIZE + 4 * VERTEX_ENTRY_SIZE;
            let header = FaceHeader::from_bytes(&bytes[face_offset..]).unwrap();
            assert_eq!(header.type_code, category.type_code());
            assert_eq!(header.flags, category.flag_word());
        }
    }

    #[test]
    fn textured_face_emits_scaled_uvs() {
        let mut mesh = triangle_mesh();
        mesh.vertices[2].groups = vec!["gTex78".to_string()];
        mesh.faces[0].loops = vec![
            Loop { color: None, uv: Some([0.0, 0.0]) },
            Loop { color: None, uv: Some([0.5, 1.0]) },
            Loop { color: None, uv: Some([1.0, 0.25]) },
        ];
        let mut config = ExportConfig::default();
        config.special_groups.insert(
            "gTex78".to_string(),
            SpecialAssignment {
                category: FaceCategory::FaceTexturedDedicated,
                texture_file: 0,
                index: 78,
            },
        );
        let bytes = encode_mesh(&mesh, &config, &test_palette()).unwrap();

        let face_offset = ObjxHeader::SIZE + 4 * VERTEX_ENTRY_SIZE;
        let header = FaceHeader::from_bytes(&bytes[face_offset..]).unwrap();
        assert_eq!(header.group, 78);
        assert_eq!(header.color_index, 78);

        // Loops were reversed with the winding: the first emitted UV pair is
        // the authored last, (1.0, 0.25) -> (65536, 16384).
        let uv_offset = face_offset + FaceHeader::SIZE + 2 * 3;
        let read_i32 = |offset: usize| {
            i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
        };
        assert_eq!(read_i32(uv_offset), 65_536);
        assert_eq!(read_i32(uv_offset + 4), 16_384);
    }

    #[test]
    fn textured_face_without_uv_fails() {
        let mut mesh = triangle_mesh();
        mesh.vertices[2].groups = vec!["faceTexturedAtlas".to_string()];
        let result = encode_mesh(&mesh, &ExportConfig::default(), &test_palette());
        assert!(matches!(result, Err(ExportError::UnsupportedFace(_))));
    }

    #[test]
    fn palette_miss_aborts_the_encode() {
        let mut mesh = triangle_mesh();
        for lp in &mut mesh.faces[0].loops {
            lp.color = Some([1.0, 0.0, 0.5]);
        }
        let result = encode_mesh(&mesh, &ExportConfig::default(), &test_palette());
        assert!(matches!(result, Err(ExportError::ColorNotFound(..))));
    }

    #[test]
    fn out_of_bounds_vertex_index_fails() {
        let mut mesh = triangle_mesh();
        mesh.faces[0].vertices = vec![0, 1, 9];
        let result = encode_mesh(&mesh, &ExportConfig::default(), &test_palette());
        assert!(matches!(result, Err(ExportError::UnsupportedFace(_))));
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode_triangle(), encode_triangle());
    }

    #[test]
    fn oversized_name_fails() {
        let mut mesh = triangle_mesh();
        mesh.name = "x".repeat(NAME_BLOCK_SIZE);
        let result = encode_mesh(&mesh, &ExportConfig::default(), &test_palette());
        assert!(matches!(result, Err(ExportError::Range(_))));
    }
}
