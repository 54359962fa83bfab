//! Triangle geometry and simple generators

use glam::Vec3;

use crate::bounds::Aabb;

/// Triangle-list geometry in the owning node's local space.
/// When `indices` is empty every three consecutive positions form a triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    /// Create an empty geometry
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        if self.is_indexed() {
            self.indices.len() / 3
        } else {
            self.positions.len() / 3
        }
    }

    /// Corners of triangle `index`, or `None` if out of range or the index
    /// buffer points past the vertex data
    pub fn triangle(&self, index: usize) -> Option<[Vec3; 3]> {
        if index >= self.triangle_count() {
            return None;
        }
        let base = index * 3;
        if self.is_indexed() {
            let corner = |k: usize| self.positions.get(self.indices[base + k] as usize).copied();
            Some([corner(0)?, corner(1)?, corner(2)?])
        } else {
            Some([
                self.positions[base],
                self.positions[base + 1],
                self.positions[base + 2],
            ])
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = (usize, [Vec3; 3])> + '_ {
        (0..self.triangle_count()).filter_map(move |i| self.triangle(i).map(|t| (i, t)))
    }

    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Append another geometry, offsetting its indices. Non-indexed inputs are
    /// indexed on the fly so the result stays a single triangle list.
    pub fn append(&mut self, other: &MeshGeometry) {
        if !self.is_indexed() && !self.positions.is_empty() {
            self.indices = (0..self.positions.len() as u32).collect();
        }
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        if other.is_indexed() {
            self.indices.extend(other.indices.iter().map(|i| i + offset));
        } else {
            self.indices.extend((0..other.positions.len() as u32).map(|i| i + offset));
        }
    }

    /// Axis-aligned box centered at the origin, outward counter-clockwise
    /// winding, two triangles per face (12 total)
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        // (normal, u, v) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let center = normal * h;
            let u = u * h;
            let v = v * h;
            let base = positions.len() as u32;
            positions.extend([center - u - v, center + u - v, center + u + v, center - u + v]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { positions, indices }
    }

    /// Row of `quads` unit quads along +X in the XY plane, facing +Z.
    /// Quad `i` owns triangles `2i` and `2i + 1`.
    pub fn quad_strip(quads: u32) -> Self {
        let mut positions = Vec::with_capacity(quads as usize * 4);
        let mut indices = Vec::with_capacity(quads as usize * 6);
        for i in 0..quads {
            let x = i as f32;
            let base = positions.len() as u32;
            positions.extend([
                Vec3::new(x, 0.0, 0.0),
                Vec3::new(x + 1.0, 0.0, 0.0),
                Vec3::new(x + 1.0, 1.0, 0.0),
                Vec3::new(x, 1.0, 0.0),
            ]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { positions, indices }
    }
}
