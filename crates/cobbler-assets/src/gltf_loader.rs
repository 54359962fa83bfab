use std::collections::HashSet;
use std::path::Path;

use cobbler_core::{Color, Transform};
use cobbler_scene::{
    Material, MaterialKind, MaterialSlots, MeshGeometry, NodeId, SceneGraph, SceneNode, Surface,
    SurfaceMaterial,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AssetError;

/// Mesh `extras` key marking a multi-material surface and giving its slot size
pub const TRIANGLES_PER_SLOT_KEY: &str = "triangles_per_slot";

/// How a glTF file is turned into a scene graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Mesh names to treat as multi-material surfaces even when the file
    /// carries no `triangles_per_slot` extras
    pub multi_material_meshes: Vec<String>,
    /// Slot size for meshes listed in `multi_material_meshes`
    pub default_triangles_per_slot: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            multi_material_meshes: Vec::new(),
            default_triangles_per_slot: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MeshExtras {
    triangles_per_slot: Option<u32>,
}

/// Load a glTF 2.0 file (.gltf or .glb) into a scene graph.
///
/// Uses the default scene (or the first one). Every mesh primitive becomes a
/// surface with its own material instance; multi-primitive meshes get one
/// child node per primitive unless the mesh is a multi-material surface, in
/// which case the primitives are merged and their materials become slots.
pub fn load_gltf_scene(path: &Path, options: &LoadOptions) -> Result<SceneGraph, AssetError> {
    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| AssetError::GltfLoadFailed(path.to_path_buf(), e.to_string()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::GltfLoadFailed(path.to_path_buf(), "no scenes found".into()))?;

    let mut graph = SceneGraph::new();
    let mut visited = HashSet::new();
    let roots: Vec<_> = scene.nodes().collect();
    let mut stack: Vec<(gltf::Node, Option<NodeId>)> =
        roots.into_iter().rev().map(|node| (node, None)).collect();

    while let Some((node, parent)) = stack.pop() {
        if !visited.insert(node.index()) {
            warn!("glTF node {} is referenced twice, skipping", node.index());
            continue;
        }

        let (translation, rotation, scale) = node.transform().decomposed();
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node{}", node.index()));
        let scene_node =
            SceneNode::new(name).with_transform(Transform::from_trs(translation, rotation, scale));

        let id = match parent {
            Some(parent) => graph.add_child(parent, scene_node),
            None => Some(graph.add_root(scene_node)),
        };
        let Some(id) = id else {
            continue;
        };

        if let Some(mesh) = node.mesh() {
            attach_mesh(&mut graph, id, &mesh, &buffers, options);
        }

        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
    }

    if graph.surfaces().is_empty() {
        return Err(AssetError::EmptyScene(path.to_path_buf()));
    }

    debug!(
        "glTF '{}': {} nodes, {} surfaces",
        path.display(),
        graph.len(),
        graph.surfaces().len()
    );

    Ok(graph)
}

fn attach_mesh(
    graph: &mut SceneGraph,
    id: NodeId,
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    options: &LoadOptions,
) {
    let mesh_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh{}", mesh.index()));

    let primitives: Vec<(MeshGeometry, Material)> = mesh
        .primitives()
        .filter_map(|primitive| {
            let geometry = read_geometry(&primitive, buffers)?;
            Some((geometry, convert_material(&primitive.material())))
        })
        .collect();

    if primitives.is_empty() {
        debug!("Mesh '{}' has no triangle primitives", mesh_name);
        return;
    }

    if let Some(triangles_per_slot) = slot_size_for(mesh, &mesh_name, options) {
        let mut geometry = MeshGeometry::empty();
        let mut materials = Vec::with_capacity(primitives.len());
        for (part, material) in primitives {
            geometry.append(&part);
            materials.push(material);
        }
        debug!(
            "Mesh '{}' merged into {} slots of {} triangles",
            mesh_name,
            materials.len(),
            triangles_per_slot
        );
        let surface = Surface::new(
            geometry,
            SurfaceMaterial::Slots(MaterialSlots::new(materials, triangles_per_slot)),
        );
        if let Some(node) = graph.node_mut(id) {
            node.surface = Some(surface);
        }
        return;
    }

    if primitives.len() == 1 {
        if let Some((geometry, material)) = primitives.into_iter().next() {
            if let Some(node) = graph.node_mut(id) {
                node.surface = Some(Surface::new(geometry, SurfaceMaterial::Single(material)));
            }
        }
        return;
    }

    for (index, (geometry, material)) in primitives.into_iter().enumerate() {
        let child = SceneNode::new(format!("{}.primitive{}", mesh_name, index))
            .with_surface(Surface::new(geometry, SurfaceMaterial::Single(material)));
        graph.add_child(id, child);
    }
}

/// Slot size from the mesh's extras, falling back to the configured list
fn slot_size_for(mesh: &gltf::Mesh, mesh_name: &str, options: &LoadOptions) -> Option<u32> {
    let from_extras = mesh
        .extras()
        .as_ref()
        .and_then(|raw| serde_json::from_str::<MeshExtras>(raw.get()).ok())
        .and_then(|extras| extras.triangles_per_slot);

    match from_extras {
        Some(0) => {
            warn!(
                "Mesh '{}' declares {} = 0, treating it as single-material",
                mesh_name, TRIANGLES_PER_SLOT_KEY
            );
            None
        }
        Some(n) => Some(n),
        None if options.multi_material_meshes.iter().any(|m| m == mesh_name)
            && options.default_triangles_per_slot > 0 =>
        {
            Some(options.default_triangles_per_slot)
        }
        None => None,
    }
}

fn read_geometry(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<MeshGeometry> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        debug!("Skipping non-triangle primitive ({:?})", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from_array).collect();
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|idx| idx.into_u32().collect())
        .unwrap_or_default();

    Some(MeshGeometry::new(positions, indices))
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    Material {
        name: material.name().map(str::to_string),
        color: Color::rgba(r, g, b, a),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
        env_intensity: 1.0,
        double_sided: material.double_sided(),
        kind: MaterialKind::Imported,
        needs_update: false,
    }
}
