//! Pick-and-paint: recolor the surface under a click and reframe on it

use cobbler_core::Color;
use cobbler_scene::{nearest_hit, MaterialRef, NodeId, SceneGraph};
use tracing::{debug, info, warn};

use crate::camera::OrbitCamera;
use crate::input::PointerEvent;

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintOutcome {
    /// No usable pointer coordinates; nothing happened
    Rejected,
    /// The ray hit no visible surface
    Missed,
    /// One material took the selected color and the camera is reframing
    Painted {
        target: MaterialRef,
        triangle: usize,
        distance: f32,
    },
    /// A surface was hit but its material binding could not be resolved
    /// for the hit triangle; nothing was changed
    UnexpectedMaterialShape { node: NodeId },
    /// The model has not finished loading
    NotReady,
}

impl PaintOutcome {
    pub fn is_painted(&self) -> bool {
        matches!(self, PaintOutcome::Painted { .. })
    }
}

/// Running totals, for session summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub painted: u32,
    pub missed: u32,
    pub rejected: u32,
    pub unexpected: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PaintController {
    stats: PaintStats,
}

impl PaintController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Paint whatever lies under `event` with `selected`.
    ///
    /// Only the color of one existing material changes. On success the
    /// material is flagged for re-upload and the camera starts framing the
    /// hit node's subtree.
    pub fn handle_click(
        &mut self,
        event: &PointerEvent,
        selected: Color,
        graph: &mut SceneGraph,
        camera: &mut OrbitCamera,
    ) -> PaintOutcome {
        let outcome = paint(event, selected, graph, camera);
        match outcome {
            PaintOutcome::Painted { .. } => self.stats.painted += 1,
            PaintOutcome::Missed => self.stats.missed += 1,
            PaintOutcome::Rejected => self.stats.rejected += 1,
            PaintOutcome::UnexpectedMaterialShape { .. } => self.stats.unexpected += 1,
            PaintOutcome::NotReady => {}
        }
        outcome
    }
}

fn paint(event: &PointerEvent, selected: Color, graph: &mut SceneGraph, camera: &mut OrbitCamera) -> PaintOutcome {
    let (Some(ndc), Some(aspect)) = (event.to_ndc(), event.aspect()) else {
        debug!("Ignoring click without usable coordinates");
        return PaintOutcome::Rejected;
    };
    let Some(ray) = camera.ray_from_ndc(ndc, aspect) else {
        debug!("Could not build a pick ray for {:?}", ndc);
        return PaintOutcome::Rejected;
    };
    let Some(hit) = nearest_hit(graph, &ray) else {
        debug!("Click at {:?} hit nothing", ndc);
        return PaintOutcome::Missed;
    };

    let slot = graph
        .node(hit.node)
        .and_then(|node| node.surface.as_ref())
        .and_then(|surface| surface.material.as_ref())
        .and_then(|binding| binding.resolve_slot(hit.triangle));
    let Some(slot) = slot else {
        warn!(
            "Hit triangle {} on node {:?} has no resolvable material",
            hit.triangle, hit.node
        );
        return PaintOutcome::UnexpectedMaterialShape { node: hit.node };
    };

    let target = MaterialRef {
        node: hit.node,
        slot: slot.index(),
    };
    let Some(material) = graph.material_mut(target) else {
        warn!("Material {:?} vanished before it could be painted", target);
        return PaintOutcome::UnexpectedMaterialShape { node: hit.node };
    };
    material.set_color(selected);

    let name = graph.node(hit.node).map(|n| n.name.as_str()).unwrap_or_default();
    info!("Painted '{}' slot {:?} {}", name, target.slot, selected);

    camera.fit_to_box(&graph.world_bounds(hit.node), aspect);

    PaintOutcome::Painted {
        target,
        triangle: hit.triangle,
        distance: hit.distance,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use cobbler_core::{Transform, Vec2, Vec3};
    use cobbler_scene::{Material, MaterialSlots, MeshGeometry, SceneNode, Surface, SurfaceMaterial};

    pub(crate) const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    pub(crate) fn center_click() -> PointerEvent {
        PointerEvent::new(VIEWPORT * 0.5, VIEWPORT)
    }

    /// Camera at `eye.z` looking straight down -Z at `(eye.x, eye.y, 0)`
    pub(crate) fn straight_camera(eye: Vec3) -> OrbitCamera {
        OrbitCamera::new(CameraConfig {
            initial_position: eye,
            initial_target: Vec3::new(eye.x, eye.y, 0.0),
            min_distance: 0.1,
            max_distance: 10.0,
            ..Default::default()
        })
    }

    /// Four slots of two triangles each, one color per slot
    pub(crate) fn slot_colors() -> Vec<Color> {
        vec![
            Color::from_hex(0x111111),
            Color::from_hex(0x222222),
            Color::from_hex(0x333333),
            Color::from_hex(0x444444),
        ]
    }

    pub(crate) fn strip_scene() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let materials = slot_colors().into_iter().map(Material::imported).collect();
        let strip = graph.add_root(SceneNode::new("panels").with_surface(Surface::new(
            MeshGeometry::quad_strip(4),
            SurfaceMaterial::Slots(MaterialSlots::new(materials, 2)),
        )));
        graph.take_dirty_materials();
        (graph, strip)
    }

    fn cube_scene() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let cube = graph.add_root(SceneNode::new("toe").with_surface(Surface::new(
            MeshGeometry::cuboid(Vec3::ONE),
            SurfaceMaterial::Single(Material::imported(Color::WHITE)),
        )));
        graph.take_dirty_materials();
        (graph, cube)
    }

    fn colors(graph: &SceneGraph) -> Vec<Color> {
        graph
            .material_refs()
            .into_iter()
            .map(|r| graph.material(r).unwrap().color)
            .collect()
    }

    #[test]
    fn single_material_hit_changes_that_material() {
        let (mut graph, cube) = cube_scene();
        let mut camera = straight_camera(Vec3::new(0.2, 0.1, 3.0));
        let mut painter = PaintController::new();

        let outcome = painter.handle_click(&center_click(), Color::RED, &mut graph, &mut camera);
        let PaintOutcome::Painted { target, distance, .. } = outcome else {
            panic!("expected a paint, got {:?}", outcome);
        };
        assert_eq!(target, MaterialRef { node: cube, slot: None });
        assert!((distance - 2.5).abs() < 1e-4);
        assert_eq!(graph.material(target).unwrap().color, Color::RED);
        assert_eq!(graph.take_dirty_materials(), vec![target]);
        assert!(camera.is_transitioning());
        assert_eq!(painter.stats().painted, 1);
    }

    #[test]
    fn slot_hit_changes_only_that_slot() {
        // (2.3, 0.7) lies in the upper-left half of quad 2: triangle 5
        let (mut graph, strip) = strip_scene();
        let mut camera = straight_camera(Vec3::new(2.3, 0.7, 3.0));
        let selected: Color = "#CC0000".parse().unwrap();

        let outcome = PaintController::new().handle_click(&center_click(), selected, &mut graph, &mut camera);
        let PaintOutcome::Painted { target, triangle, .. } = outcome else {
            panic!("expected a paint, got {:?}", outcome);
        };
        assert_eq!(triangle, 5);
        assert_eq!(target, MaterialRef { node: strip, slot: Some(2) });

        let mut expected = slot_colors();
        expected[2] = selected;
        assert_eq!(colors(&graph), expected);
        assert_eq!(graph.take_dirty_materials(), vec![target]);

        // Stored linear, like an imported base color factor
        let painted = graph.material(target).unwrap().color;
        assert!((painted.r - 0.6038).abs() < 1e-3);
        assert_eq!(painted.to_hex_string(), "#CC0000");
    }

    #[test]
    fn miss_mutates_nothing() {
        let (mut graph, _) = cube_scene();
        let before = graph.clone();
        let mut camera = straight_camera(Vec3::new(0.2, 0.1, 3.0));
        let corner = PointerEvent::new(Vec2::ZERO, VIEWPORT);

        let outcome = PaintController::new().handle_click(&corner, Color::RED, &mut graph, &mut camera);
        assert_eq!(outcome, PaintOutcome::Missed);
        assert_eq!(graph, before);
        assert!(!camera.is_transitioning());
    }

    #[test]
    fn click_without_coordinates_is_rejected() {
        let (mut graph, _) = cube_scene();
        let before = graph.clone();
        let mut camera = straight_camera(Vec3::new(0.2, 0.1, 3.0));
        let mut painter = PaintController::new();
        let event = PointerEvent {
            position: None,
            viewport: VIEWPORT,
        };

        assert_eq!(painter.handle_click(&event, Color::RED, &mut graph, &mut camera), PaintOutcome::Rejected);
        assert_eq!(graph, before);
        assert_eq!(painter.stats().rejected, 1);
    }

    #[test]
    fn unbound_surface_is_unexpected_shape() {
        let mut graph = SceneGraph::new();
        let bare = graph.add_root(SceneNode::new("bare").with_surface(Surface::bare(MeshGeometry::cuboid(Vec3::ONE))));
        let before = graph.clone();
        let mut camera = straight_camera(Vec3::new(0.2, 0.1, 3.0));

        let outcome = PaintController::new().handle_click(&center_click(), Color::RED, &mut graph, &mut camera);
        assert_eq!(outcome, PaintOutcome::UnexpectedMaterialShape { node: bare });
        assert_eq!(graph, before);
        assert!(!camera.is_transitioning());
    }

    #[test]
    fn slot_out_of_range_is_unexpected_shape() {
        let mut graph = SceneGraph::new();
        let strip = graph.add_root(SceneNode::new("short").with_surface(Surface::new(
            MeshGeometry::quad_strip(4),
            SurfaceMaterial::Slots(MaterialSlots::new(vec![Material::imported(Color::WHITE)], 2)),
        )));
        graph.take_dirty_materials();
        let mut camera = straight_camera(Vec3::new(2.3, 0.7, 3.0));

        let outcome = PaintController::new().handle_click(&center_click(), Color::RED, &mut graph, &mut camera);
        assert_eq!(outcome, PaintOutcome::UnexpectedMaterialShape { node: strip });
        assert!(graph.take_dirty_materials().is_empty());
    }

    #[test]
    fn nearest_surface_wins() {
        let (mut graph, back) = cube_scene();
        let front = graph.add_root(
            SceneNode::new("front")
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 1.5)))
                .with_surface(Surface::new(
                    MeshGeometry::cuboid(Vec3::ONE),
                    SurfaceMaterial::Single(Material::imported(Color::WHITE)),
                )),
        );
        let mut camera = straight_camera(Vec3::new(0.2, 0.1, 5.0));

        let outcome = PaintController::new().handle_click(&center_click(), Color::RED, &mut graph, &mut camera);
        assert!(matches!(outcome, PaintOutcome::Painted { target, .. } if target.node == front));

        let back_material = MaterialRef { node: back, slot: None };
        assert_eq!(graph.material(back_material).unwrap().color, Color::WHITE);
        assert_eq!(graph.take_dirty_materials(), vec![MaterialRef { node: front, slot: None }]);
    }

    #[test]
    fn reframe_targets_hit_node_bounds() {
        let (mut graph, _) = cube_scene();
        let mut camera = straight_camera(Vec3::new(0.2, 0.1, 3.0));
        PaintController::new().handle_click(&center_click(), Color::RED, &mut graph, &mut camera);
        assert!(camera.desired_pose().target.abs_diff_eq(Vec3::ZERO, 1e-5));
    }
}
