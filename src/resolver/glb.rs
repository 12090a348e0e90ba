//! Bounding boxes of glTF models, read straight from the container's JSON.
//!
//! Only accessor `min`/`max` and the node hierarchy are needed, so no buffer data is
//! decoded.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_furniture::Bounds;
use serde::Deserialize;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const CHUNK_JSON: u32 = 0x4e4f_534a;

#[derive(Debug, thiserror::Error)]
pub enum GlbError {
    #[error("file is too short to be a GLB container")]
    Truncated,
    #[error("unsupported GLB container version {0}")]
    Version(u32),
    #[error("first GLB chunk is not JSON")]
    MissingJson,
    #[error("glTF JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model contains no positioned geometry")]
    NoGeometry,
    #[error("node {0} is reached more than once; the node hierarchy must be a tree")]
    NodeGraph(usize),
}

#[derive(Deserialize)]
struct Document {
    scene: Option<usize>,
    #[serde(default)]
    scenes: Vec<SceneDef>,
    #[serde(default)]
    nodes: Vec<NodeDef>,
    #[serde(default)]
    meshes: Vec<MeshDef>,
    #[serde(default)]
    accessors: Vec<AccessorDef>,
}

#[derive(Deserialize)]
struct SceneDef {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Deserialize)]
struct NodeDef {
    mesh: Option<usize>,
    #[serde(default)]
    children: Vec<usize>,
    matrix: Option<[f32; 16]>,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
}

impl NodeDef {
    fn local_matrix(&self) -> Mat4 {
        if let Some(m) = self.matrix {
            return Mat4::from_cols_array(&m);
        }
        Mat4::from_scale_rotation_translation(
            self.scale.map(Vec3::from).unwrap_or(Vec3::ONE),
            self.rotation.map(Quat::from_array).unwrap_or(Quat::IDENTITY),
            self.translation.map(Vec3::from).unwrap_or(Vec3::ZERO),
        )
    }
}

#[derive(Deserialize)]
struct MeshDef {
    #[serde(default)]
    primitives: Vec<PrimitiveDef>,
}

#[derive(Deserialize)]
struct PrimitiveDef {
    #[serde(default)]
    attributes: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct AccessorDef {
    min: Option<Vec<f32>>,
    max: Option<Vec<f32>>,
}

/// Compute the bounds of the default scene of a `.glb` or `.gltf` file
pub fn model_bounds(bytes: &[u8]) -> Result<Bounds, GlbError> {
    let json = if bytes.starts_with(GLB_MAGIC) {
        glb_json_chunk(bytes)?
    } else {
        bytes
    };
    let document: Document = serde_json::from_slice(json)?;
    document_bounds(&document)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, GlbError> {
    let slice = bytes.get(offset..offset + 4).ok_or(GlbError::Truncated)?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn glb_json_chunk(bytes: &[u8]) -> Result<&[u8], GlbError> {
    let version = read_u32(bytes, 4)?;
    if version != 2 {
        return Err(GlbError::Version(version));
    }
    let chunk_length = read_u32(bytes, 12)? as usize;
    if read_u32(bytes, 16)? != CHUNK_JSON {
        return Err(GlbError::MissingJson);
    }
    bytes.get(20..20 + chunk_length).ok_or(GlbError::Truncated)
}

fn document_bounds(document: &Document) -> Result<Bounds, GlbError> {
    let roots: Vec<usize> = match document
        .scene
        .and_then(|i| document.scenes.get(i))
        .or_else(|| document.scenes.first())
    {
        Some(scene) => scene.nodes.clone(),
        None => {
            // No scene list: every node nobody claims as a child is a root
            let mut is_child = vec![false; document.nodes.len()];
            for node in &document.nodes {
                for &child in &node.children {
                    if let Some(flag) = is_child.get_mut(child) {
                        *flag = true;
                    }
                }
            }
            (0..document.nodes.len()).filter(|&i| !is_child[i]).collect()
        }
    };

    let mut bounds = Bounds::EMPTY;
    let mut visited = vec![false; document.nodes.len()];
    let mut stack: Vec<(usize, Mat4)> = roots.into_iter().map(|i| (i, Mat4::IDENTITY)).collect();
    while let Some((index, parent)) = stack.pop() {
        let Some(node) = document.nodes.get(index) else {
            continue;
        };
        if std::mem::replace(&mut visited[index], true) {
            return Err(GlbError::NodeGraph(index));
        }
        let world = parent * node.local_matrix();

        if let Some(mesh) = node.mesh.and_then(|m| document.meshes.get(m)) {
            for primitive in &mesh.primitives {
                if let Some(local) = primitive
                    .attributes
                    .get("POSITION")
                    .and_then(|&a| document.accessors.get(a))
                    .and_then(accessor_bounds)
                {
                    bounds = bounds.union(transform_bounds(&local, &world));
                }
            }
        }

        for &child in &node.children {
            stack.push((child, world));
        }
    }

    if bounds.is_empty() {
        return Err(GlbError::NoGeometry);
    }
    Ok(bounds)
}

fn accessor_bounds(accessor: &AccessorDef) -> Option<Bounds> {
    let min = accessor.min.as_ref()?;
    let max = accessor.max.as_ref()?;
    if min.len() < 3 || max.len() < 3 {
        return None;
    }
    Some(Bounds::new(
        Vec3::new(min[0], min[1], min[2]),
        Vec3::new(max[0], max[1], max[2]),
    ))
}

fn transform_bounds(bounds: &Bounds, matrix: &Mat4) -> Bounds {
    let mut out = Bounds::EMPTY;
    for i in 0..8 {
        let corner = Vec3::new(
            if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
            if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
            if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
        );
        out = out.include_point(matrix.transform_point3(corner));
    }
    out
}

/// Wrap a glTF JSON document into a GLB container
#[cfg(test)]
pub(crate) fn pack_glb(json: &str) -> Vec<u8> {
    let mut chunk = json.as_bytes().to_vec();
    while chunk.len() % 4 != 0 {
        chunk.push(b' ');
    }
    let total = 12 + 8 + chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(GLB_MAGIC);
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&chunk);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_NODE: &str = r#"{
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0, "translation": [0, 1, 0], "scale": [2, 2, 2]}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "accessors": [{"min": [-0.5, -0.5, -0.5], "max": [0.5, 0.5, 0.5]}]
    }"#;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn reads_bounds_from_glb() {
        let bounds = model_bounds(&pack_glb(CUBE_NODE)).expect("valid glb");
        assert!(approx(bounds.min, Vec3::new(-1.0, 0.0, -1.0)));
        assert!(approx(bounds.max, Vec3::new(1.0, 2.0, 1.0)));
    }

    #[test]
    fn accepts_plain_gltf_json() {
        let bounds = model_bounds(CUBE_NODE.as_bytes()).expect("valid gltf");
        assert!(approx(bounds.size(), Vec3::splat(2.0)));
    }

    #[test]
    fn child_nodes_inherit_parent_transform() {
        let json = r#"{
            "nodes": [
                {"children": [1], "scale": [10, 10, 10]},
                {"mesh": 0, "translation": [1, 0, 0]}
            ],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{"min": [0, 0, 0], "max": [1, 1, 1]}]
        }"#;
        let bounds = model_bounds(json.as_bytes()).expect("valid gltf");
        assert!(approx(bounds.min, Vec3::new(10.0, 0.0, 0.0)));
        assert!(approx(bounds.max, Vec3::new(20.0, 10.0, 10.0)));
    }

    #[test]
    fn rejects_truncated_and_empty_models() {
        assert!(matches!(model_bounds(b"glTF\x02\x00"), Err(GlbError::Truncated)));
        assert!(matches!(
            model_bounds(br#"{"nodes": [{}]}"#),
            Err(GlbError::NoGeometry)
        ));
        assert!(matches!(model_bounds(b"not json"), Err(GlbError::Json(_))));
    }

    #[test]
    fn rejects_node_cycles() {
        let json = r#"{
            "scenes": [{"nodes": [0]}],
            "nodes": [
                {"children": [1]},
                {"mesh": 0, "children": [0]}
            ],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{"min": [0, 0, 0], "max": [1, 1, 1]}]
        }"#;
        assert!(matches!(model_bounds(&pack_glb(json)), Err(GlbError::NodeGraph(0))));

        let self_loop = r#"{"scenes": [{"nodes": [0]}], "nodes": [{"children": [0]}]}"#;
        assert!(matches!(model_bounds(self_loop.as_bytes()), Err(GlbError::NodeGraph(0))));
    }

    #[test]
    fn rejects_shared_children() {
        // Each level points at the next one twice; walking it as a tree would be exponential
        let levels: Vec<String> = (0..40)
            .map(|i| format!(r#"{{"mesh": 0, "children": [{next}, {next}]}}"#, next = i + 1))
            .chain(std::iter::once(r#"{"mesh": 0}"#.to_string()))
            .collect();
        let json = format!(
            r#"{{"scenes": [{{"nodes": [0]}}], "nodes": [{}],
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
                "accessors": [{{"min": [0, 0, 0], "max": [1, 1, 1]}}]}}"#,
            levels.join(",")
        );
        assert!(matches!(model_bounds(json.as_bytes()), Err(GlbError::NodeGraph(_))));
    }
}
