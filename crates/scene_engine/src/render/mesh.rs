//! Mesh representation for 3D models
//!
//! Geometry arrives as face-indexed data ([`MeshData`]): flat arrays of
//! positions, normals and texture coordinates plus a list of polygon faces
//! whose index lists point into those arrays. Indices are 1-based and an
//! index of 0 means "not bound for this vertex".
//!
//! # Compilation
//!
//! A [`Mesh`] walks its faces exactly once, at construction, and hands the
//! resulting command sequence to the backend as a compiled list:
//!
//! ```text
//! FrontFaceCcw, EnableTexturing,
//!   BeginPolygon, [Normal] [TexCoord] Vertex, ..., EndPolygon,   (per face)
//! DisableTexturing
//! ```
//!
//! Every frame afterwards only replays the handle. Faces are always treated
//! as counter-clockwise front-facing; clockwise input is not reordered and
//! will render inside-out.
//!
//! # Ownership
//!
//! The compiled handle belongs to exactly one `Mesh`. [`Mesh::free`] gives it
//! back to the backend; freeing twice or drawing a freed mesh is an error.

use crate::render::api::{DrawApi, DrawCommand, ListHandle};
use crate::render::{RenderError, RenderResult};

/// A polygon as three parallel 1-based index lists
///
/// `texcoord_indices` and `normal_indices` use 0 for vertices that carry no
/// texture coordinate or normal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    /// Position indices, one per polygon vertex
    pub vertex_indices: Vec<usize>,
    /// Texture coordinate indices, 0 when absent
    pub texcoord_indices: Vec<usize>,
    /// Normal indices, 0 when absent
    pub normal_indices: Vec<usize>,
}

impl Face {
    /// Face referencing positions only
    pub fn from_vertices(vertex_indices: Vec<usize>) -> Self {
        let len = vertex_indices.len();
        Self {
            vertex_indices,
            texcoord_indices: vec![0; len],
            normal_indices: vec![0; len],
        }
    }

    /// Number of polygon vertices
    pub fn len(&self) -> usize {
        self.vertex_indices.len()
    }

    /// Whether the face has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }
}

/// Raw face-indexed geometry, as produced by the OBJ parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates
    pub texcoords: Vec<[f32; 2]>,
    /// Polygon faces
    pub faces: Vec<Face>,
}

impl MeshData {
    /// Total number of vertex references across all faces
    pub fn vertex_reference_count(&self) -> usize {
        self.faces.iter().map(Face::len).sum()
    }

    /// Check every face before anything is compiled
    ///
    /// A face needs at least three vertices, parallel index lists of equal
    /// length, and indices inside their attribute arrays. Index 0 is only
    /// allowed for normals and texture coordinates.
    pub fn validate(&self) -> RenderResult<()> {
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(RenderError::MalformedFace {
                    face: face_index,
                    reason: format!("needs at least 3 vertices, has {}", face.len()),
                });
            }
            if face.texcoord_indices.len() != face.len() || face.normal_indices.len() != face.len() {
                return Err(RenderError::MalformedFace {
                    face: face_index,
                    reason: format!(
                        "index lists differ in length ({} vertices, {} texcoords, {} normals)",
                        face.len(),
                        face.texcoord_indices.len(),
                        face.normal_indices.len()
                    ),
                });
            }

            for &index in &face.vertex_indices {
                if index == 0 || index > self.vertices.len() {
                    return Err(RenderError::IndexOutOfRange {
                        face: face_index,
                        attribute: "vertex",
                        index,
                        len: self.vertices.len(),
                    });
                }
            }
            check_optional(face_index, "texcoord", &face.texcoord_indices, self.texcoords.len())?;
            check_optional(face_index, "normal", &face.normal_indices, self.normals.len())?;
        }
        Ok(())
    }

    /// Walk all faces into the command sequence a compiled list replays
    pub fn compile_commands(&self) -> RenderResult<Vec<DrawCommand>> {
        self.validate()?;

        let mut commands = Vec::with_capacity(3 + 2 * self.faces.len() + 3 * self.vertex_reference_count());
        commands.push(DrawCommand::FrontFaceCcw);
        commands.push(DrawCommand::EnableTexturing);

        for face in &self.faces {
            commands.push(DrawCommand::BeginPolygon);
            for corner in 0..face.len() {
                let normal = face.normal_indices[corner];
                if normal > 0 {
                    commands.push(DrawCommand::Normal(self.normals[normal - 1]));
                }
                let texcoord = face.texcoord_indices[corner];
                if texcoord > 0 {
                    commands.push(DrawCommand::TexCoord(self.texcoords[texcoord - 1]));
                }
                commands.push(DrawCommand::Vertex(self.vertices[face.vertex_indices[corner] - 1]));
            }
            commands.push(DrawCommand::EndPolygon);
        }

        commands.push(DrawCommand::DisableTexturing);
        Ok(commands)
    }
}

fn check_optional(face: usize, attribute: &'static str, indices: &[usize], len: usize) -> RenderResult<()> {
    match indices.iter().find(|&&index| index > len) {
        Some(&index) => Err(RenderError::IndexOutOfRange {
            face,
            attribute,
            index,
            len,
        }),
        None => Ok(()),
    }
}

/// Geometry compiled once into a replayable backend list
#[derive(Debug)]
pub struct Mesh {
    data: MeshData,
    handle: Option<ListHandle>,
}

impl Mesh {
    /// Compile `data` into a backend list
    ///
    /// Validation happens before the backend sees anything, so a malformed
    /// face leaves no compiled list behind.
    pub fn new(data: MeshData, api: &mut dyn DrawApi) -> RenderResult<Self> {
        let commands = data.compile_commands()?;
        let handle = api.compile_list(&commands)?;
        log::info!(
            "Compiled mesh: {} faces, {} vertex references, {} commands",
            data.faces.len(),
            data.vertex_reference_count(),
            commands.len()
        );
        Ok(Self {
            data,
            handle: Some(handle),
        })
    }

    /// Replay the compiled list under the current matrices
    pub fn build(&self, api: &mut dyn DrawApi) -> RenderResult<()> {
        let handle = self.handle.ok_or(RenderError::UseAfterRelease("mesh"))?;
        api.call_list(handle)
    }

    /// Release the compiled list
    ///
    /// Returns [`RenderError::DoubleFree`] when the mesh was already freed.
    pub fn free(&mut self, api: &mut dyn DrawApi) -> RenderResult<()> {
        let handle = self.handle.take().ok_or(RenderError::DoubleFree("mesh"))?;
        log::debug!("Releasing mesh list {:?}", handle);
        api.delete_list(handle)
    }

    /// The compiled list, or `None` after [`free`](Self::free)
    pub fn handle(&self) -> Option<ListHandle> {
        self.handle
    }

    /// Whether the compiled list is still held
    pub fn is_compiled(&self) -> bool {
        self.handle.is_some()
    }

    /// The geometry this mesh was compiled from
    pub fn data(&self) -> &MeshData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ObjLoader;
    use crate::render::RecordingBackend;

    fn triangle() -> MeshData {
        ObjLoader::parse_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n").unwrap()
    }

    #[test]
    fn test_triangle_compiles_without_attribute_bindings() {
        let commands = triangle().compile_commands().unwrap();

        assert_eq!(
            commands,
            vec![
                DrawCommand::FrontFaceCcw,
                DrawCommand::EnableTexturing,
                DrawCommand::BeginPolygon,
                DrawCommand::Vertex([0.0, 0.0, 0.0]),
                DrawCommand::Vertex([1.0, 0.0, 0.0]),
                DrawCommand::Vertex([1.0, 1.0, 0.0]),
                DrawCommand::EndPolygon,
                DrawCommand::DisableTexturing,
            ]
        );
    }

    #[test]
    fn test_attributes_bound_before_position() {
        let data = ObjLoader::parse_str(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0.5 0.5\nvn 0 0 1\nf 1/1/1 2//1 3/1\n",
        )
        .unwrap();
        let commands = data.compile_commands().unwrap();

        assert_eq!(
            &commands[2..11],
            &[
                DrawCommand::BeginPolygon,
                DrawCommand::Normal([0.0, 0.0, 1.0]),
                DrawCommand::TexCoord([0.5, 0.5]),
                DrawCommand::Vertex([0.0, 0.0, 0.0]),
                DrawCommand::Normal([0.0, 0.0, 1.0]),
                DrawCommand::Vertex([1.0, 0.0, 0.0]),
                DrawCommand::TexCoord([0.5, 0.5]),
                DrawCommand::Vertex([1.0, 1.0, 0.0]),
                DrawCommand::EndPolygon,
            ]
        );
    }

    #[test]
    fn test_out_of_range_index_compiles_nothing() {
        let mut data = triangle();
        data.faces.push(Face {
            vertex_indices: vec![1, 2, 3],
            texcoord_indices: vec![0, 0, 0],
            normal_indices: vec![0, 4, 0],
        });
        let mut api = RecordingBackend::new();

        let err = Mesh::new(data, &mut api).unwrap_err();
        assert_eq!(
            err,
            RenderError::IndexOutOfRange {
                face: 1,
                attribute: "normal",
                index: 4,
                len: 0,
            }
        );
        assert_eq!(api.compiled_list_count(), 0);
    }

    #[test]
    fn test_degenerate_faces_are_rejected() {
        let mut data = triangle();
        data.faces[0] = Face::from_vertices(vec![1, 2]);
        assert!(matches!(data.validate(), Err(RenderError::MalformedFace { face: 0, .. })));

        data.faces[0] = Face {
            vertex_indices: vec![1, 2, 3],
            texcoord_indices: vec![0],
            normal_indices: vec![0, 0, 0],
        };
        assert!(matches!(data.validate(), Err(RenderError::MalformedFace { .. })));

        data.faces[0] = Face::from_vertices(vec![0, 1, 2]);
        assert!(matches!(data.validate(), Err(RenderError::IndexOutOfRange { attribute: "vertex", .. })));
    }

    #[test]
    fn test_build_replays_and_free_guards_double_release() {
        let mut api = RecordingBackend::new();
        let mut mesh = Mesh::new(triangle(), &mut api).unwrap();
        let handle = mesh.handle().unwrap();

        mesh.build(&mut api).unwrap();
        assert_eq!(api.compiled_commands(handle).map(<[DrawCommand]>::len), Some(8));

        mesh.free(&mut api).unwrap();
        assert!(!mesh.is_compiled());
        assert_eq!(api.compiled_list_count(), 0);

        assert_eq!(mesh.free(&mut api), Err(RenderError::DoubleFree("mesh")));
        assert_eq!(mesh.build(&mut api), Err(RenderError::UseAfterRelease("mesh")));
    }
}
