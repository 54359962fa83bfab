//! CPU ray casting against scene surfaces
//!
//! Rays are tested in each surface's local space (bounding box first, then
//! every triangle) so that node transforms never have to be baked into the
//! geometry. Because the ray direction is normalized in world space and the
//! local ray is derived with the inverse affine transform, the local hit
//! parameter equals the world-space distance.

use glam::{Mat4, Vec3};
use tracing::trace;

use crate::graph::{NodeId, SceneGraph};

const DET_EPSILON: f32 = 1e-10;
const MIN_DISTANCE: f32 = 1e-6;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized. Returns `None` for a zero
    /// or non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        origin.is_finite().then_some(Self { origin, direction })
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// One ray/triangle intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Node owning the hit surface
    pub node: NodeId,
    /// World-space distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Triangle index within the surface geometry
    pub triangle: usize,
}

/// All intersections of `ray` with visible surfaces, nearest first.
/// Equal distances keep traversal order.
pub fn intersect_all(graph: &SceneGraph, ray: &Ray) -> Vec<RayHit> {
    let mut hits = Vec::new();
    let mut stack: Vec<(NodeId, Mat4)> = graph
        .roots()
        .iter()
        .rev()
        .map(|&root| (root, Mat4::IDENTITY))
        .collect();

    while let Some((id, parent_world)) = stack.pop() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if !node.visible {
            continue;
        }
        let world = parent_world * node.transform.matrix();
        if let Some(surface) = &node.surface {
            intersect_surface(id, surface, &world, ray, &mut hits);
        }
        stack.extend(node.children.iter().rev().map(|&child| (child, world)));
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest intersection, if any
pub fn nearest_hit(graph: &SceneGraph, ray: &Ray) -> Option<RayHit> {
    intersect_all(graph, ray).into_iter().next()
}

fn intersect_surface(
    id: NodeId,
    surface: &crate::graph::Surface,
    world: &Mat4,
    ray: &Ray,
    hits: &mut Vec<RayHit>,
) {
    if world.determinant().abs() < DET_EPSILON {
        trace!("Skipping degenerate transform on node {:?}", id);
        return;
    }
    let inverse = world.inverse();
    let local_origin = inverse.transform_point3(ray.origin);
    let local_direction = inverse.transform_vector3(ray.direction);

    if surface
        .geometry
        .local_bounds()
        .ray_hit(local_origin, local_direction)
        .is_none()
    {
        return;
    }

    let double_sided = surface
        .material
        .as_ref()
        .map(|m| m.double_sided())
        .unwrap_or(false);

    for (triangle, corners) in surface.geometry.triangles() {
        if let Some(distance) = intersect_triangle(local_origin, local_direction, corners, !double_sided) {
            hits.push(RayHit {
                node: id,
                distance,
                point: ray.at(distance),
                triangle,
            });
        }
    }
}

/// Möller–Trumbore. Counter-clockwise triangles face the viewer; with
/// `cull_back_faces` rays arriving from behind are ignored.
fn intersect_triangle(origin: Vec3, direction: Vec3, [a, b, c]: [Vec3; 3], cull_back_faces: bool) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);

    if cull_back_faces {
        if det < DET_EPSILON {
            return None;
        }
    } else if det.abs() < DET_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > MIN_DISTANCE).then_some(t)
}
