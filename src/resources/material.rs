use bitflags::bitflags;
use glam::Vec4;
use uuid::Uuid;

use crate::errors::{ForgeError, Result};
use crate::resources::texture::Texture;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFeatures: u32 {
        const USE_MAP           = 1 << 0;
        const USE_NORMAL_MAP    = 1 << 1;
        const USE_ROUGHNESS_MAP = 1 << 2;
        const USE_METALNESS_MAP = 1 << 3;
        const USE_EMISSIVE_MAP  = 1 << 4;
        const USE_AO_MAP        = 1 << 5;
    }
}

/// Texture slot of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Map,
    NormalMap,
    RoughnessMap,
    MetalnessMap,
    AoMap,
    EmissiveMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 6] = [
        TextureSlot::Map,
        TextureSlot::NormalMap,
        TextureSlot::RoughnessMap,
        TextureSlot::MetalnessMap,
        TextureSlot::AoMap,
        TextureSlot::EmissiveMap,
    ];

    fn feature(self) -> MaterialFeatures {
        match self {
            TextureSlot::Map => MaterialFeatures::USE_MAP,
            TextureSlot::NormalMap => MaterialFeatures::USE_NORMAL_MAP,
            TextureSlot::RoughnessMap => MaterialFeatures::USE_ROUGHNESS_MAP,
            TextureSlot::MetalnessMap => MaterialFeatures::USE_METALNESS_MAP,
            TextureSlot::AoMap => MaterialFeatures::USE_AO_MAP,
            TextureSlot::EmissiveMap => MaterialFeatures::USE_EMISSIVE_MAP,
        }
    }
}

// ============================================================================
// Specific materials
// ============================================================================

/// Unlit material with an optional color map.
#[derive(Debug, Clone)]
pub struct MeshBasicMaterial {
    pub color: Vec4,
    pub map: Option<Texture>,
}

impl MeshBasicMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self { color, map: None }
    }
}

impl Default for MeshBasicMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

/// Metallic-roughness PBR material.
#[derive(Debug, Clone)]
pub struct MeshStandardMaterial {
    pub color: Vec4,
    pub roughness: f32,
    pub metalness: f32,

    pub map: Option<Texture>,
    pub normal_map: Option<Texture>,
    pub roughness_map: Option<Texture>,
    pub metalness_map: Option<Texture>,
    pub ao_map: Option<Texture>,
    pub emissive_map: Option<Texture>,
}

impl MeshStandardMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            roughness: 1.0,
            metalness: 1.0,
            map: None,
            normal_map: None,
            roughness_map: None,
            metalness_map: None,
            ao_map: None,
            emissive_map: None,
        }
    }

    fn slot(&self, slot: TextureSlot) -> Option<&Texture> {
        match slot {
            TextureSlot::Map => self.map.as_ref(),
            TextureSlot::NormalMap => self.normal_map.as_ref(),
            TextureSlot::RoughnessMap => self.roughness_map.as_ref(),
            TextureSlot::MetalnessMap => self.metalness_map.as_ref(),
            TextureSlot::AoMap => self.ao_map.as_ref(),
            TextureSlot::EmissiveMap => self.emissive_map.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: TextureSlot) -> &mut Option<Texture> {
        match slot {
            TextureSlot::Map => &mut self.map,
            TextureSlot::NormalMap => &mut self.normal_map,
            TextureSlot::RoughnessMap => &mut self.roughness_map,
            TextureSlot::MetalnessMap => &mut self.metalness_map,
            TextureSlot::AoMap => &mut self.ao_map,
            TextureSlot::EmissiveMap => &mut self.emissive_map,
        }
    }
}

impl Default for MeshStandardMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

// ============================================================================
// Material data enum
// ============================================================================

#[derive(Debug, Clone)]
pub enum MaterialData {
    Basic(MeshBasicMaterial),
    Standard(MeshStandardMaterial),
}

impl MaterialData {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "MeshBasicMaterial",
            Self::Standard(_) => "MeshStandardMaterial",
        }
    }

    #[must_use]
    pub fn get_features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        match self {
            Self::Basic(m) => {
                if m.map.is_some() {
                    features |= MaterialFeatures::USE_MAP;
                }
            }
            Self::Standard(m) => {
                for slot in TextureSlot::ALL {
                    if m.slot(slot).is_some() {
                        features |= slot.feature();
                    }
                }
            }
        }
        features
    }
}

// ============================================================================
// Material wrapper
// ============================================================================

#[derive(Debug, Clone)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<String>,

    pub data: MaterialData,

    // Render states
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,

    version: u64,
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            data,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            version: 0,
        }
    }

    #[must_use]
    pub fn new_basic(color: Vec4) -> Self {
        Self::from(MeshBasicMaterial::new(color))
    }

    #[must_use]
    pub fn new_standard(color: Vec4) -> Self {
        Self::from(MeshStandardMaterial::new(color))
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    #[must_use]
    pub fn is_standard(&self) -> bool {
        matches!(self.data, MaterialData::Standard(_))
    }

    #[must_use]
    pub fn as_standard(&self) -> Option<&MeshStandardMaterial> {
        match &self.data {
            MaterialData::Standard(m) => Some(m),
            MaterialData::Basic(_) => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut MeshStandardMaterial> {
        match &mut self.data {
            MaterialData::Standard(m) => Some(m),
            MaterialData::Basic(_) => None,
        }
    }

    #[must_use]
    pub fn get_features(&self) -> MaterialFeatures {
        self.data.get_features()
    }

    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<&Texture> {
        match &self.data {
            MaterialData::Standard(m) => m.slot(slot),
            MaterialData::Basic(m) if slot == TextureSlot::Map => m.map.as_ref(),
            MaterialData::Basic(_) => None,
        }
    }

    /// Assigns a texture to a slot of a standard material.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: Texture) -> Result<()> {
        let type_name = self.data.type_name();
        let Some(standard) = self.as_standard_mut() else {
            return Err(ForgeError::UnsupportedMaterial(format!(
                "{type_name} has no {slot:?} slot"
            )));
        };
        *standard.slot_mut(slot) = Some(texture);
        self.mark_dirty();
        Ok(())
    }

    /// Every assigned texture, in slot order.
    pub fn textures_mut(&mut self) -> impl Iterator<Item = &mut Texture> {
        let slots: Vec<&mut Option<Texture>> = match &mut self.data {
            MaterialData::Basic(m) => vec![&mut m.map],
            MaterialData::Standard(m) => vec![
                &mut m.map,
                &mut m.normal_map,
                &mut m.roughness_map,
                &mut m.metalness_map,
                &mut m.ao_map,
                &mut m.emissive_map,
            ],
        };
        slots.into_iter().filter_map(Option::as_mut)
    }

    /// Clamps to `[0, 1]`; anything below one renders transparent.
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
        self.mark_dirty();
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new_standard(Vec4::ONE)
    }
}

impl From<MeshBasicMaterial> for Material {
    fn from(data: MeshBasicMaterial) -> Self {
        Self::new(MaterialData::Basic(data))
    }
}

impl From<MeshStandardMaterial> for Material {
    fn from(data: MeshStandardMaterial) -> Self {
        Self::new(MaterialData::Standard(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_material_rejects_texture_slots() {
        let mut mat = Material::new_basic(Vec4::ONE);
        let err = mat.set_texture(TextureSlot::NormalMap, Texture::new("n"));
        assert!(matches!(err, Err(ForgeError::UnsupportedMaterial(_))));
        assert!(mat.texture(TextureSlot::NormalMap).is_none());
    }

    #[test]
    fn features_follow_assigned_slots() {
        let mut mat = Material::new_standard(Vec4::ONE);
        mat.set_texture(TextureSlot::Map, Texture::new("a")).unwrap();
        mat.set_texture(TextureSlot::AoMap, Texture::new("ao")).unwrap();
        assert_eq!(
            mat.get_features(),
            MaterialFeatures::USE_MAP | MaterialFeatures::USE_AO_MAP
        );
        assert_eq!(mat.textures_mut().count(), 2);
    }

    #[test]
    fn opacity_is_clamped() {
        let mut mat = Material::default();
        mat.set_opacity(1.7);
        assert_eq!(mat.opacity, 1.0);
        assert!(!mat.transparent);
        mat.set_opacity(-0.2);
        assert_eq!(mat.opacity, 0.0);
        assert!(mat.transparent);
    }
}
