use std::sync::Arc;

use glam::{Mat3, Vec2};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureSampler {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

impl TextureSampler {
    #[must_use]
    pub fn repeat() -> Self {
        Self {
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
    pub center: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::new(0.5, 0.5),
        }
    }
}

impl TextureTransform {
    /// 3x3 UV transform: rotation and repeat about `center`, then `offset`.
    #[must_use]
    pub fn get_matrix(&self) -> Mat3 {
        Mat3::from_translation(self.offset + self.center)
            * Mat3::from_scale(self.repeat)
            * Mat3::from_angle(self.rotation)
            * Mat3::from_translation(-self.center)
    }
}

/// Encoded image payload as found in the source asset (PNG/JPEG bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub mime_type: Option<String>,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,

    /// `None` for placeholder textures created without pixel data.
    pub source: Option<ImageSource>,

    pub sampler: TextureSampler,
    pub transform: TextureTransform,

    version: u64,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            source: None,
            sampler: TextureSampler::default(),
            transform: TextureTransform::default(),
            version: 0,
        }
    }

    #[must_use]
    pub fn from_encoded(name: &str, bytes: Vec<u8>, mime_type: Option<&str>) -> Self {
        Self {
            source: Some(ImageSource {
                mime_type: mime_type.map(str::to_string),
                bytes: Arc::new(bytes),
            }),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Sets repeat wrapping on both axes.
    pub fn set_repeat_wrapping(&mut self) {
        self.sampler = TextureSampler::repeat();
        self.needs_update();
    }

    pub fn set_repeat(&mut self, repeat: Vec2) {
        self.transform.repeat = repeat;
        self.needs_update();
    }
}
