//! Surface materials
//!
//! A surface carries either one material or an ordered list of material
//! slots, where each slot covers a fixed number of consecutive triangles.
//! Both shapes resolve through [`SurfaceMaterial::resolve_slot`] so callers
//! never need to type-test the representation.

use cobbler_core::Color;

use crate::graph::NodeId;

/// Where a material came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// As authored in the source asset
    Imported,
    /// Rewritten with the configurator's fixed shading parameters
    Normalized,
}

/// Physically-based surface material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    /// Base color (linear factors as stored in the asset)
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    /// Environment-map reflection intensity
    pub env_intensity: f32,
    pub double_sided: bool,
    pub kind: MaterialKind,
    /// Set when the renderer must re-upload this material
    pub needs_update: bool,
}

impl Default for Material {
    /// The glTF default material: white, fully metallic, fully rough
    fn default() -> Self {
        Self {
            name: None,
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 1.0,
            env_intensity: 1.0,
            double_sided: false,
            kind: MaterialKind::Imported,
            needs_update: false,
        }
    }
}

impl Material {
    /// Imported material with the given base color
    pub fn imported(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_normalized(&self) -> bool {
        self.kind == MaterialKind::Normalized
    }

    /// Overwrite the RGB channels and flag the material for re-upload.
    /// Alpha is left as authored.
    pub fn set_color(&mut self, color: Color) {
        self.color = self.color.with_rgb_of(&color);
        self.needs_update = true;
    }
}

/// Ordered per-triangle-range materials of a multi-material surface
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSlots {
    pub materials: Vec<Material>,
    /// Consecutive triangles covered by each slot. Asset metadata, never
    /// assumed; zero means the mapping is unknown.
    pub triangles_per_slot: u32,
}

impl MaterialSlots {
    pub fn new(materials: Vec<Material>, triangles_per_slot: u32) -> Self {
        Self {
            materials,
            triangles_per_slot,
        }
    }

    /// Slot covering `triangle`, if the mapping is defined and in range
    pub fn slot_for_triangle(&self, triangle: usize) -> Option<usize> {
        if self.triangles_per_slot == 0 {
            return None;
        }
        let slot = triangle / self.triangles_per_slot as usize;
        (slot < self.materials.len()).then_some(slot)
    }
}

/// Tagged material binding of a surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceMaterial {
    Single(Material),
    Slots(MaterialSlots),
}

/// Resolved slot for a hit: the single material, or one entry of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSlot {
    Single,
    Slot(usize),
}

impl ResolvedSlot {
    pub fn index(&self) -> Option<usize> {
        match self {
            ResolvedSlot::Single => None,
            ResolvedSlot::Slot(i) => Some(*i),
        }
    }
}

impl SurfaceMaterial {
    /// Resolve which material a hit on `triangle` refers to
    pub fn resolve_slot(&self, triangle: usize) -> Option<ResolvedSlot> {
        match self {
            SurfaceMaterial::Single(_) => Some(ResolvedSlot::Single),
            SurfaceMaterial::Slots(slots) => slots.slot_for_triangle(triangle).map(ResolvedSlot::Slot),
        }
    }

    pub fn get(&self, slot: Option<usize>) -> Option<&Material> {
        match (self, slot) {
            (SurfaceMaterial::Single(m), None) => Some(m),
            (SurfaceMaterial::Slots(s), Some(i)) => s.materials.get(i),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, slot: Option<usize>) -> Option<&mut Material> {
        match (self, slot) {
            (SurfaceMaterial::Single(m), None) => Some(m),
            (SurfaceMaterial::Slots(s), Some(i)) => s.materials.get_mut(i),
            _ => None,
        }
    }

    /// Every material with its slot index (`None` for single)
    pub fn materials(&self) -> Vec<(Option<usize>, &Material)> {
        match self {
            SurfaceMaterial::Single(m) => vec![(None, m)],
            SurfaceMaterial::Slots(s) => s.materials.iter().enumerate().map(|(i, m)| (Some(i), m)).collect(),
        }
    }

    pub fn materials_mut(&mut self) -> Vec<(Option<usize>, &mut Material)> {
        match self {
            SurfaceMaterial::Single(m) => vec![(None, m)],
            SurfaceMaterial::Slots(s) => s
                .materials
                .iter_mut()
                .enumerate()
                .map(|(i, m)| (Some(i), m))
                .collect(),
        }
    }

    /// Replace every material with `f(old)`, keeping the shape of the binding
    pub fn map_materials(&self, mut f: impl FnMut(&Material) -> Material) -> SurfaceMaterial {
        match self {
            SurfaceMaterial::Single(m) => SurfaceMaterial::Single(f(m)),
            SurfaceMaterial::Slots(s) => SurfaceMaterial::Slots(MaterialSlots {
                materials: s.materials.iter().map(f).collect(),
                triangles_per_slot: s.triangles_per_slot,
            }),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SurfaceMaterial::Single(_) => 1,
            SurfaceMaterial::Slots(s) => s.materials.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Back faces are pickable when any material renders them
    pub fn double_sided(&self) -> bool {
        match self {
            SurfaceMaterial::Single(m) => m.double_sided,
            SurfaceMaterial::Slots(s) => s.materials.iter().any(|m| m.double_sided),
        }
    }
}

/// Address of one material in a scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialRef {
    pub node: NodeId,
    /// Slot index for multi-material surfaces
    pub slot: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_slots() -> SurfaceMaterial {
        SurfaceMaterial::Slots(MaterialSlots::new(
            (0..4).map(|_| Material::imported(Color::WHITE)).collect(),
            2,
        ))
    }

    #[test]
    fn test_single_resolves_for_any_triangle() {
        let single = SurfaceMaterial::Single(Material::default());
        assert_eq!(single.resolve_slot(0), Some(ResolvedSlot::Single));
        assert_eq!(single.resolve_slot(999), Some(ResolvedSlot::Single));
    }

    #[test]
    fn test_slots_use_floor_division() {
        let slots = four_slots();
        assert_eq!(slots.resolve_slot(0), Some(ResolvedSlot::Slot(0)));
        assert_eq!(slots.resolve_slot(1), Some(ResolvedSlot::Slot(0)));
        assert_eq!(slots.resolve_slot(5), Some(ResolvedSlot::Slot(2)));
        assert_eq!(slots.resolve_slot(7), Some(ResolvedSlot::Slot(3)));
        assert_eq!(slots.resolve_slot(8), None);
    }

    #[test]
    fn test_zero_slot_size_is_unresolvable() {
        let slots = SurfaceMaterial::Slots(MaterialSlots::new(vec![Material::default()], 0));
        assert_eq!(slots.resolve_slot(0), None);
    }

    #[test]
    fn test_set_color_marks_dirty_and_keeps_alpha() {
        let mut material = Material::imported(Color::rgba(1.0, 1.0, 1.0, 0.25));
        material.set_color(Color::from_hex(0xCC0000));
        assert!(material.needs_update);
        assert_eq!(material.color.a, 0.25);
        assert_eq!(material.color.to_hex_string(), "#CC0000");
    }

    #[test]
    fn test_get_rejects_mismatched_slot() {
        let single = SurfaceMaterial::Single(Material::default());
        assert!(single.get(Some(0)).is_none());
        assert!(four_slots().get(None).is_none());
        assert!(four_slots().get(Some(3)).is_some());
    }
}
