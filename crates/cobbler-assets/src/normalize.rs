//! Material normalization
//!
//! Source assets arrive with whatever shading their authors picked. Before
//! recoloring, every surface material is replaced by a fresh material that
//! keeps the authored base color but uses fixed physical parameters, so a
//! given palette color looks the same on every region of the model.

use cobbler_scene::{Material, MaterialKind, SceneGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Fixed shading parameters applied to every material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeParams {
    pub roughness: f32,
    pub metalness: f32,
    /// Environment-map reflection intensity
    pub env_intensity: f32,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            roughness: 0.3,
            metalness: 0.2,
            env_intensity: 1.5,
        }
    }
}

impl NormalizeParams {
    /// A new normalized material carrying over what the asset authored that
    /// recoloring depends on (name, base color, sidedness)
    pub fn apply(&self, source: &Material) -> Material {
        Material {
            name: source.name.clone(),
            color: source.color,
            roughness: self.roughness,
            metalness: self.metalness,
            env_intensity: self.env_intensity,
            double_sided: source.double_sided,
            kind: MaterialKind::Normalized,
            needs_update: true,
        }
    }
}

/// Counts from one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub surfaces: usize,
    pub materials: usize,
    /// Surfaces left untouched because they had no material binding
    pub unbound_surfaces: usize,
}

/// Replace every surface material with a normalized one and enable shadow
/// casting and receiving. Running it again yields identical materials.
pub fn normalize(graph: &mut SceneGraph, params: &NormalizeParams) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for id in graph.surfaces() {
        let Some(surface) = graph.node_mut(id).and_then(|node| node.surface.as_mut()) else {
            continue;
        };
        report.surfaces += 1;
        surface.cast_shadow = true;
        surface.receive_shadow = true;

        match surface.material.as_ref() {
            Some(binding) => {
                let normalized = binding.map_materials(|m| params.apply(m));
                report.materials += normalized.len();
                surface.material = Some(normalized);
            }
            None => {
                debug!("Surface on node {:?} has no material, leaving it as is", id);
                report.unbound_surfaces += 1;
            }
        }
    }

    info!(
        "Normalized {} materials on {} surfaces",
        report.materials, report.surfaces
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobbler_core::Color;
    use cobbler_scene::{MaterialSlots, MeshGeometry, SceneNode, Surface, SurfaceMaterial};
    use glam::Vec3;

    fn authored(color: Color, roughness: f32, metalness: f32) -> Material {
        Material {
            roughness,
            metalness,
            env_intensity: 0.4,
            ..Material::imported(color)
        }
    }

    fn sample() -> SceneGraph {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(SceneNode::new("root").with_surface(Surface::new(
            MeshGeometry::cuboid(Vec3::ONE),
            SurfaceMaterial::Single(authored(Color::from_hex(0x336699), 0.9, 0.0)),
        )));
        graph.add_child(
            root,
            SceneNode::new("panels").with_surface(Surface::new(
                MeshGeometry::quad_strip(2),
                SurfaceMaterial::Slots(MaterialSlots::new(
                    vec![
                        authored(Color::from_hex(0xFF0000), 0.0, 1.0),
                        authored(Color::from_hex(0x00FF00), 0.5, 0.5),
                    ],
                    2,
                )),
            )),
        );
        graph.add_child(root, SceneNode::new("bare").with_surface(Surface::bare(MeshGeometry::cuboid(Vec3::ONE))));
        graph
    }

    fn all_materials(graph: &SceneGraph) -> Vec<Material> {
        graph
            .material_refs()
            .into_iter()
            .map(|r| graph.material(r).unwrap().clone())
            .collect()
    }

    #[test]
    fn fixed_parameters_and_preserved_colors() {
        let mut graph = sample();
        let before: Vec<Color> = all_materials(&graph).iter().map(|m| m.color).collect();
        let params = NormalizeParams::default();

        let report = normalize(&mut graph, &params);
        assert_eq!(report.surfaces, 3);
        assert_eq!(report.materials, 3);
        assert_eq!(report.unbound_surfaces, 1);

        let after = all_materials(&graph);
        assert_eq!(after.len(), before.len());
        for (material, color) in after.iter().zip(before) {
            assert_eq!(material.kind, MaterialKind::Normalized);
            assert_eq!(material.roughness, 0.3);
            assert_eq!(material.metalness, 0.2);
            assert_eq!(material.env_intensity, 1.5);
            assert_eq!(material.color, color);
        }
    }

    #[test]
    fn every_surface_casts_and_receives_shadows() {
        let mut graph = sample();
        normalize(&mut graph, &NormalizeParams::default());
        for id in graph.surfaces() {
            let surface = graph.node(id).unwrap().surface.as_ref().unwrap();
            assert!(surface.cast_shadow && surface.receive_shadow);
        }
    }

    #[test]
    fn normalizing_twice_matches_once() {
        let params = NormalizeParams::default();
        let mut once = sample();
        normalize(&mut once, &params);
        let mut twice = sample();
        normalize(&mut twice, &params);
        normalize(&mut twice, &params);
        assert_eq!(once, twice);
    }

    #[test]
    fn slot_shape_is_preserved() {
        let mut graph = sample();
        normalize(&mut graph, &NormalizeParams::default());
        let panels = graph.traverse()[1];
        let surface = graph.node(panels).unwrap().surface.as_ref().unwrap();
        let Some(SurfaceMaterial::Slots(slots)) = &surface.material else {
            panic!("expected slots to survive normalization");
        };
        assert_eq!(slots.triangles_per_slot, 2);
        assert_eq!(slots.materials.len(), 2);
    }
}
