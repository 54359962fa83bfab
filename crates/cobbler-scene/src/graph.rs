//! Scene graph
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are addressed by
//! [`NodeId`]. The graph is built once at load time; afterwards only
//! material colors change, nodes are never added or removed.

use cobbler_core::Transform;
use glam::Mat4;

use crate::bounds::Aabb;
use crate::material::{Material, MaterialRef, SurfaceMaterial};
use crate::mesh::MeshGeometry;

/// Index of a node inside its [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Renderable mesh attached to a node
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub geometry: MeshGeometry,
    /// `None` when the asset shipped no usable material binding
    pub material: Option<SurfaceMaterial>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Surface {
    pub fn new(geometry: MeshGeometry, material: SurfaceMaterial) -> Self {
        Self {
            geometry,
            material: Some(material),
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    /// Surface without any material binding
    pub fn bare(geometry: MeshGeometry) -> Self {
        Self {
            geometry,
            material: None,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// A node in the loaded model's hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub surface: Option<Surface>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            visible: true,
            children: Vec::new(),
            parent: None,
            surface: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }
}

/// Arena-backed node hierarchy of one loaded model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node
    pub fn add_root(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        self.nodes.push(node);
        self.roots.push(id);
        id
    }

    /// Add a node under `parent`. Returns `None` if the parent does not exist.
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() {
            return None;
        }
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order walk: roots in insertion order, children in
    /// order. This is the traversal order picking ties resolve to.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Node ids under `id` (inclusive), in traversal order
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            order.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Ids of every node that carries a surface, in traversal order
    pub fn surfaces(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(|n| n.surface.is_some()))
            .collect()
    }

    /// Local-to-world matrix of a node (identity for unknown ids)
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.node(id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent.and_then(|p| self.node(p));
        }
        matrix
    }

    /// World-space bounds of a node's geometry and all its descendants
    pub fn world_bounds(&self, id: NodeId) -> Aabb {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| {
                let surface = self.node(n)?.surface.as_ref()?;
                Some(surface.geometry.local_bounds().transformed(&self.world_matrix(n)))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }

    /// World-space bounds of the whole graph
    pub fn bounds(&self) -> Aabb {
        self.roots
            .iter()
            .map(|&root| self.world_bounds(root))
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }

    pub fn material(&self, target: MaterialRef) -> Option<&Material> {
        self.node(target.node)?
            .surface
            .as_ref()?
            .material
            .as_ref()?
            .get(target.slot)
    }

    pub fn material_mut(&mut self, target: MaterialRef) -> Option<&mut Material> {
        self.node_mut(target.node)?
            .surface
            .as_mut()?
            .material
            .as_mut()?
            .get_mut(target.slot)
    }

    /// Every material in traversal order
    pub fn material_refs(&self) -> Vec<MaterialRef> {
        self.surfaces()
            .into_iter()
            .flat_map(|node| {
                let binding = self.node(node).and_then(|n| n.surface.as_ref()?.material.as_ref());
                binding
                    .map(|b| {
                        b.materials()
                            .into_iter()
                            .map(|(slot, _)| MaterialRef { node, slot })
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Collect materials flagged for re-upload and clear their flags
    pub fn take_dirty_materials(&mut self) -> Vec<MaterialRef> {
        let mut dirty = Vec::new();
        for target in self.material_refs() {
            if let Some(material) = self.material_mut(target) {
                if material.needs_update {
                    material.needs_update = false;
                    dirty.push(target);
                }
            }
        }
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialSlots;
    use cobbler_core::Color;
    use glam::Vec3;

    fn sample() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(
            SceneNode::new("root").with_transform(Transform::from_position(Vec3::new(10.0, 0.0, 0.0))),
        );
        let sole = graph
            .add_child(
                root,
                SceneNode::new("sole").with_surface(Surface::new(
                    MeshGeometry::cuboid(Vec3::ONE),
                    SurfaceMaterial::Single(Material::imported(Color::WHITE)),
                )),
            )
            .unwrap();
        let laces = graph
            .add_child(
                root,
                SceneNode::new("laces").with_surface(Surface::new(
                    MeshGeometry::quad_strip(2),
                    SurfaceMaterial::Slots(MaterialSlots::new(
                        vec![Material::default(), Material::default()],
                        2,
                    )),
                )),
            )
            .unwrap();
        (graph, root, sole, laces)
    }

    #[test]
    fn test_traversal_order_is_preorder() {
        let (graph, root, sole, laces) = sample();
        assert_eq!(graph.traverse(), vec![root, sole, laces]);
        assert_eq!(graph.surfaces(), vec![sole, laces]);
        assert_eq!(graph.node(sole).unwrap().parent, Some(root));
    }

    #[test]
    fn test_world_bounds_include_parent_transform() {
        let (graph, root, sole, _) = sample();
        let sole_bounds = graph.world_bounds(sole);
        assert_eq!(sole_bounds.center(), Vec3::new(10.0, 0.0, 0.0));
        let all = graph.world_bounds(root);
        assert_eq!(all.max.x, 12.0);
        assert_eq!(all, graph.bounds());
    }

    #[test]
    fn test_material_refs_cover_every_slot() {
        let (graph, _, sole, laces) = sample();
        assert_eq!(
            graph.material_refs(),
            vec![
                MaterialRef { node: sole, slot: None },
                MaterialRef { node: laces, slot: Some(0) },
                MaterialRef { node: laces, slot: Some(1) },
            ]
        );
    }

    #[test]
    fn test_take_dirty_clears_flags() {
        let (mut graph, _, _, laces) = sample();
        let target = MaterialRef { node: laces, slot: Some(1) };
        graph.material_mut(target).unwrap().set_color(Color::RED);

        assert_eq!(graph.take_dirty_materials(), vec![target]);
        assert!(graph.take_dirty_materials().is_empty());
    }

    #[test]
    fn test_add_child_to_missing_parent() {
        let mut graph = SceneGraph::new();
        assert!(graph.add_child(NodeId(3), SceneNode::new("orphan")).is_none());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_dangling_child_is_skipped() {
        let (mut graph, root, sole, laces) = sample();
        graph.node_mut(root).unwrap().children.push(NodeId(42));
        graph.roots.push(NodeId(43));

        assert_eq!(graph.traverse(), vec![root, sole, laces]);
        assert_eq!(graph.surfaces(), vec![sole, laces]);
        assert_eq!(graph.material_refs().len(), 3);
        assert_eq!(graph.take_dirty_materials(), vec![]);
        assert_eq!(graph.world_bounds(root), graph.bounds());
    }
}
