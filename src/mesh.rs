//! Read-only mesh data model handed to the encoder.
//!
//! This mirrors what the authoring tool exposes: positions, polygons with
//! their authored winding, per-vertex group membership, and per-loop vertex
//! colors and UV coordinates. The encoder never mutates it.

/// One authoring-space vertex with its vertex-group memberships.
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    /// Group names in their stored order; classification reads these from a
    /// face's first emitted vertex.
    pub groups: Vec<String>,
}

impl Vertex {
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            groups: Vec::new(),
        }
    }
}

/// Per-corner attributes aligned 1:1 with a face's vertex index list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loop {
    pub color: Option<[f32; 3]>,
    pub uv: Option<[f32; 2]>,
}

/// One polygon: vertex indices in authored winding plus aligned loops.
#[derive(Debug, Clone, Default)]
pub struct Face {
    pub vertices: Vec<usize>,
    pub loops: Vec<Loop>,
}

/// A polygon mesh as supplied by the authoring tool.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }
}
