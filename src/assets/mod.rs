//! Asset intake and output.
//!
//! - [`AssetLoader`]: bytes in, [`ParsedAsset`] out (glTF/GLB via [`GltfLoader`])
//! - [`LoadQueue`]: parses off-thread, registers in request order
//! - [`ExportRequest`] / [`Exporter`]: what an encoder needs to write a model

pub mod export;
pub mod loader;
pub mod loaders;
pub mod queue;

pub use export::{ExportRequest, Exporter, default_export_filename, normalize_filename};
pub use loader::{AssetLoader, ParsedAsset};
#[cfg(feature = "gltf")]
pub use loaders::GltfLoader;
pub use queue::{LoadOutcome, LoadQueue, LoadReport, LoadSender, Ticket};

use crate::errors::{ForgeError, Result};
use crate::resources::Texture;

/// Guesses the image MIME type from the file signature.
#[must_use]
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

    if bytes.starts_with(PNG) {
        Some("image/png")
    } else if bytes.starts_with(JPEG) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Wraps an encoded image file as a texture ready for a material slot.
///
/// Fails with [`ForgeError::Load`] when the bytes are not PNG, JPEG or WebP.
pub fn load_texture_from_bytes(name: &str, bytes: Vec<u8>) -> Result<Texture> {
    let Some(mime) = sniff_image_mime(&bytes) else {
        let err = ForgeError::Load {
            name: name.to_string(),
            reason: "not a PNG, JPEG or WebP image".to_string(),
        };
        log::warn!("{err}");
        return Err(err);
    };
    let mut texture = Texture::from_encoded(name, bytes, Some(mime));
    texture.set_repeat_wrapping();
    Ok(texture)
}
