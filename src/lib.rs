//! maxis-export library
//!
//! Encodes polygon meshes into the OBJX/FACE binary container used by
//! SimCopter and Streets of SimCity, and scans existing `sim3d#.max`
//! archives to recover the same structured fields for auditing.

pub mod archive;
pub mod config;
pub mod coords;
pub mod encode;
pub mod error;
pub mod face;
pub mod formats;
pub mod mesh;
pub mod palette;
pub mod scan;

// Re-export the encoding surface
pub use config::ExportConfig;
pub use encode::{encode_mesh, write_mesh};
pub use error::{ExportError, Result};
pub use face::{classify, Classification, FaceCategory, SpecialAssignment, SpecialGroups};
pub use mesh::{Face, Loop, Mesh, Vertex};
pub use palette::{Palette, Rgb, UNSHADED_RANGE_START};

// Re-export the scanning/editing surface
pub use archive::{extract_object, replace_object};
pub use formats::{FaceHeader, ObjxHeader, FACE_TAG, OBJX_TAG};
pub use scan::{ArchiveScanner, FaceRecord, ObjxRecord};
