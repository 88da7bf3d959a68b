//! OBJ file loader for 3D models
//!
//! Only the geometry subset is understood: `v`, `vn`, `vt` and `f`. Face
//! tokens may be `v`, `v/t`, `v//n` or `v/t/n`; a missing texcoord or normal
//! component is recorded as index 0. Every other keyword (`o`, `g`, `s`,
//! `usemtl`, `mtllib`, ...) is skipped. Indices stay 1-based, exactly as the
//! mesh compiler expects them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::assets::AssetError;
use crate::render::{Face, MeshData};

/// Stateless OBJ parser
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return its face-indexed geometry
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading OBJ from {:?}", path);
        let file = File::open(path)?;
        let data = Self::parse_reader(BufReader::new(file))?;
        log::info!(
            "Loaded {:?}: {} vertices, {} normals, {} texcoords, {} faces",
            path,
            data.vertices.len(),
            data.normals.len(),
            data.texcoords.len(),
            data.faces.len()
        );
        Ok(data)
    }

    /// Parse OBJ text held in memory
    pub fn parse_str(source: &str) -> Result<MeshData, AssetError> {
        Self::parse_reader(source.as_bytes())
    }

    /// Parse OBJ text from any buffered reader
    ///
    /// The first malformed line aborts parsing; no partial geometry is returned.
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<MeshData, AssetError> {
        let mut data = MeshData::default();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            let args: Vec<&str> = parts.collect();

            match keyword {
                "v" => data.vertices.push(parse_floats::<3>(&args, line_number, "vertex")?),
                "vn" => data.normals.push(parse_floats::<3>(&args, line_number, "normal")?),
                "vt" => data.texcoords.push(parse_floats::<2>(&args, line_number, "texcoord")?),
                "f" => data.faces.push(parse_face(&args, line_number)?),
                _ => {
                    // Ignore other commands
                }
            }
        }

        if data.faces.is_empty() {
            log::warn!("OBJ source contains no faces");
        }

        Ok(data)
    }
}

/// Parse the first `N` arguments as floats; extra components (e.g. `w`) are ignored
fn parse_floats<const N: usize>(args: &[&str], line: usize, what: &str) -> Result<[f32; N], AssetError> {
    if args.len() < N {
        return Err(AssetError::Parse {
            line,
            message: format!("{} needs {} components, found {}", what, N, args.len()),
        });
    }

    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = token.parse().map_err(|_| AssetError::Parse {
            line,
            message: format!("invalid {} component '{}'", what, token),
        })?;
    }
    Ok(out)
}

fn parse_face(args: &[&str], line: usize) -> Result<Face, AssetError> {
    if args.len() < 3 {
        return Err(AssetError::Parse {
            line,
            message: format!("face needs at least 3 vertices, found {}", args.len()),
        });
    }

    let mut face = Face::default();
    for token in args {
        let (vertex, texcoord, normal) = parse_face_token(token, line)?;
        face.vertex_indices.push(vertex);
        face.texcoord_indices.push(texcoord);
        face.normal_indices.push(normal);
    }
    Ok(face)
}

/// Split `v`, `v/t`, `v//n` or `v/t/n` into `(v, t, n)` with 0 for absent parts
fn parse_face_token(token: &str, line: usize) -> Result<(usize, usize, usize), AssetError> {
    let fields: Vec<&str> = token.split('/').collect();
    if fields.len() > 3 {
        return Err(AssetError::Parse {
            line,
            message: format!("face vertex '{}' has too many components", token),
        });
    }

    let index_at = |position: usize| -> Result<usize, AssetError> {
        match fields.get(position) {
            None | Some(&"") => Ok(0),
            Some(field) => field.parse::<usize>().map_err(|_| AssetError::Parse {
                line,
                message: format!("invalid index '{}' in face vertex '{}'", field, token),
            }),
        }
    };

    let vertex = index_at(0)?;
    if vertex == 0 {
        return Err(AssetError::Parse {
            line,
            message: format!("face vertex '{}' is missing its position index", token),
        });
    }

    Ok((vertex, index_at(1)?, index_at(2)?))
}
