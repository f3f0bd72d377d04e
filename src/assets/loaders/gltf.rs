//! glTF 2.0 / GLB loader.
//!
//! Parses a binary GLB or a self-contained `.gltf` (buffers and images as
//! base64 data URIs) into a [`Scene`]. External file references cannot be
//! resolved from a byte slice and are rejected.
//!
//! Loading runs in four passes:
//! 1. buffers and encoded images
//! 2. materials (textures are cloned into the slots that use them)
//! 3. nodes: create, link, tag joints as bones, attach mesh primitives
//! 4. animation channels into [`AnimationClip`]s

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use glam::{Quat, Vec2, Vec3, Vec4};
use rustc_hash::FxHashSet;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::assets::loader::{AssetLoader, ParsedAsset};
use crate::errors::{ForgeError, Result};
use crate::resources::{Geometry, Material, Mesh, Texture, TextureSampler, TextureSlot, WrapMode};
use crate::scene::{Node, NodeHandle, NodeKind, Scene};

/// Name given to the group node that holds the default glTF scene.
pub const SCENE_ROOT_NAME: &str = "Scene";

/// Stateless glTF/GLB parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfLoader;

impl GltfLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AssetLoader for GltfLoader {
    fn parse(&self, bytes: &[u8], name: &str) -> Result<ParsedAsset> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let buffers = load_buffers(&gltf, name)?;

        let mut ctx = LoadContext {
            name,
            buffers,
            textures: Vec::new(),
            materials: Vec::new(),
            scene: Scene::new(),
            node_mapping: Vec::with_capacity(gltf.nodes().count()),
        };

        ctx.load_textures(&gltf);
        ctx.load_materials(&gltf);
        let root = ctx.load_nodes(&gltf)?;
        let clips = ctx.load_animations(&gltf);

        log::info!(
            "Parsed '{}': {} nodes, {} meshes, {} clips",
            name,
            ctx.scene.nodes.len(),
            ctx.scene.meshes.len(),
            clips.len()
        );

        Ok(ParsedAsset {
            scene: ctx.scene,
            root,
            clips,
        })
    }
}

fn load_error(name: &str, reason: impl Into<String>) -> ForgeError {
    let err = ForgeError::Load {
        name: name.to_string(),
        reason: reason.into(),
    };
    log::warn!("{err}");
    err
}

/// Decodes a `data:<mime>;base64,<payload>` URI. `None` for anything else.
fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    Some(BASE64.decode(payload).map_err(ForgeError::from))
}

fn load_buffers(gltf: &gltf::Gltf, name: &str) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::with_capacity(gltf.buffers().count());
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| load_error(name, "missing GLB binary chunk"))?,
            gltf::buffer::Source::Uri(uri) => match decode_data_uri(uri) {
                Some(decoded) => decoded?,
                None => {
                    return Err(load_error(
                        name,
                        format!("external buffer '{uri}' is not supported, embed it or use GLB"),
                    ));
                }
            },
        };
        if data.len() < buffer.length() {
            return Err(load_error(
                name,
                format!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                ),
            ));
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

fn wrap_mode(mode: gltf::texture::WrappingMode) -> WrapMode {
    match mode {
        gltf::texture::WrappingMode::ClampToEdge => WrapMode::ClampToEdge,
        gltf::texture::WrappingMode::MirroredRepeat => WrapMode::MirroredRepeat,
        gltf::texture::WrappingMode::Repeat => WrapMode::Repeat,
    }
}

struct LoadContext<'a> {
    name: &'a str,
    buffers: Vec<Vec<u8>>,
    /// Indexed by glTF texture index. `None` when the image could not be read.
    textures: Vec<Option<Texture>>,
    /// Indexed by glTF material index.
    materials: Vec<Material>,
    scene: Scene,
    /// glTF node index -> scene handle
    node_mapping: Vec<NodeHandle>,
}

impl LoadContext<'_> {
    fn buffer(&self, buffer: gltf::Buffer<'_>) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(Vec::as_slice)
    }

    // ========================================================================
    // Textures & materials
    // ========================================================================

    fn load_textures(&mut self, gltf: &gltf::Gltf) {
        for texture in gltf.textures() {
            let image = texture.source();
            let encoded = match image.source() {
                gltf::image::Source::View { view, mime_type } => {
                    let start = view.offset();
                    let end = start + view.length();
                    self.buffers
                        .get(view.buffer().index())
                        .and_then(|b| b.get(start..end))
                        .map(|bytes| (bytes.to_vec(), Some(mime_type)))
                }
                gltf::image::Source::Uri { uri, mime_type } => match decode_data_uri(uri) {
                    Some(Ok(bytes)) => Some((bytes, mime_type)),
                    Some(Err(e)) => {
                        log::warn!("'{}': image {} is not valid base64: {e}", self.name, image.index());
                        None
                    }
                    None => {
                        log::warn!("'{}': external image '{uri}' skipped", self.name);
                        None
                    }
                },
            };

            let tex = encoded.map(|(bytes, mime_type)| {
                let tex_name = texture
                    .name()
                    .map_or_else(|| format!("Texture_{}", texture.index()), str::to_string);
                let sampler = texture.sampler();
                let mut tex = Texture::from_encoded(&tex_name, bytes, mime_type);
                tex.sampler = TextureSampler {
                    wrap_u: wrap_mode(sampler.wrap_s()),
                    wrap_v: wrap_mode(sampler.wrap_t()),
                };
                tex
            });
            self.textures.push(tex);
        }
    }

    fn texture(&self, index: usize) -> Option<Texture> {
        self.textures.get(index).cloned().flatten()
    }

    fn load_materials(&mut self, gltf: &gltf::Gltf) {
        for material in gltf.materials() {
            let pbr = material.pbr_metallic_roughness();
            let mut mat = Material::new_standard(Vec4::from_array(pbr.base_color_factor()));
            mat.name = material.name().map(str::to_string);
            mat.double_sided = material.double_sided();

            let mut slots: Vec<(TextureSlot, usize)> = Vec::new();
            if let Some(info) = pbr.base_color_texture() {
                slots.push((TextureSlot::Map, info.texture().index()));
            }
            if let Some(info) = pbr.metallic_roughness_texture() {
                slots.push((TextureSlot::RoughnessMap, info.texture().index()));
                slots.push((TextureSlot::MetalnessMap, info.texture().index()));
            }
            if let Some(info) = material.normal_texture() {
                slots.push((TextureSlot::NormalMap, info.texture().index()));
            }
            if let Some(info) = material.occlusion_texture() {
                slots.push((TextureSlot::AoMap, info.texture().index()));
            }
            if let Some(info) = material.emissive_texture() {
                slots.push((TextureSlot::EmissiveMap, info.texture().index()));
            }

            if let Some(standard) = mat.as_standard_mut() {
                standard.roughness = pbr.roughness_factor();
                standard.metalness = pbr.metallic_factor();
            }
            for (slot, index) in slots {
                if let Some(tex) = self.texture(index) {
                    // Standard material: cannot fail.
                    let _ = mat.set_texture(slot, tex);
                }
            }

            if material.alpha_mode() == gltf::material::AlphaMode::Blend {
                mat.transparent = true;
            }

            self.materials.push(mat);
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    fn load_nodes(&mut self, gltf: &gltf::Gltf) -> Result<NodeHandle> {
        // 1. Create every node as a temporary root
        for node in gltf.nodes() {
            let node_name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
            let mut engine_node = Node::new(&node_name);
            let (t, r, s) = node.transform().decomposed();
            engine_node.transform.position = Vec3::from_array(t);
            engine_node.transform.rotation = Quat::from_array(r);
            engine_node.transform.scale = Vec3::from_array(s);
            let handle = self.scene.add_node(engine_node);
            self.node_mapping.push(handle);
        }

        // 2. Hierarchy
        for node in gltf.nodes() {
            let parent = self.node_mapping[node.index()];
            for child in node.children() {
                self.scene.attach(self.node_mapping[child.index()], parent)?;
            }
        }

        let root = self.scene.add_node(Node::new(SCENE_ROOT_NAME));
        let default_scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or_else(|| load_error(self.name, "file contains no scene"))?;
        for node in default_scene.nodes() {
            self.scene.attach(self.node_mapping[node.index()], root)?;
        }

        // Nodes outside the default scene are dropped
        let stray: Vec<NodeHandle> = self
            .scene
            .root_nodes
            .iter()
            .copied()
            .filter(|&h| h != root)
            .collect();
        for handle in stray {
            self.scene.remove_node(handle);
        }

        // 3. Joints
        let joints: FxHashSet<usize> = gltf
            .skins()
            .flat_map(|skin| skin.joints().map(|j| j.index()).collect::<Vec<_>>())
            .collect();
        for &index in &joints {
            if let Some(node) = self
                .node_mapping
                .get(index)
                .and_then(|&h| self.scene.get_node_mut(h))
            {
                node.kind = NodeKind::Bone;
            }
        }

        // 4. Meshes
        for node in gltf.nodes() {
            let handle = self.node_mapping[node.index()];
            if !self.scene.nodes.contains_key(handle) {
                continue;
            }
            if let Some(mesh) = node.mesh() {
                self.attach_mesh(&mesh, handle, node.skin().is_some(), joints.contains(&node.index()))?;
            }
        }

        Ok(root)
    }

    fn attach_mesh(
        &mut self,
        mesh: &gltf::Mesh<'_>,
        handle: NodeHandle,
        skinned: bool,
        is_joint: bool,
    ) -> Result<()> {
        let base_name = mesh
            .name()
            .map_or_else(|| self.scene.nodes[handle].name.clone(), str::to_string);

        let mut built = Vec::new();
        for primitive in mesh.primitives() {
            if let Some(m) = self.build_mesh(&primitive, &base_name)? {
                built.push(m);
            }
        }

        let kind = |key| {
            if skinned {
                NodeKind::SkinnedMesh(key)
            } else {
                NodeKind::Mesh(key)
            }
        };

        // A single primitive lives on the node itself unless the node is a joint
        if built.len() == 1 && !is_joint {
            if let Some(m) = built.pop() {
                let key = self.scene.meshes.insert(m);
                self.scene.nodes[handle].kind = kind(key);
            }
            return Ok(());
        }

        for (i, m) in built.into_iter().enumerate() {
            let sub_name = format!("{base_name}_{i}");
            let key = self.scene.meshes.insert(m);
            self.scene
                .add_to_parent(Node::with_kind(&sub_name, kind(key)), handle);
        }
        Ok(())
    }

    fn build_mesh(&self, primitive: &gltf::Primitive<'_>, name: &str) -> Result<Option<Mesh>> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "'{}': primitive of '{name}' uses {:?}, only triangle lists are loaded",
                self.name,
                primitive.mode()
            );
            return Ok(None);
        }

        let reader = primitive.reader(|buffer| self.buffer(buffer));
        let Some(positions) = reader.read_positions() else {
            log::warn!("'{}': primitive of '{name}' has no positions", self.name);
            return Ok(None);
        };

        let mut geometry = Geometry::from_positions(positions.map(Vec3::from_array).collect());

        if let Some(iter) = reader.read_indices() {
            geometry.set_indices(iter.into_u32().collect())?;
        }
        match reader.read_normals() {
            Some(iter) => geometry.set_normals(iter.map(Vec3::from_array).collect())?,
            None => geometry.compute_vertex_normals(),
        }
        if let Some(iter) = reader.read_tex_coords(0) {
            geometry.set_uvs(iter.into_f32().map(Vec2::from_array).collect())?;
        }
        if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
            geometry.set_skin(
                joints.into_u16().collect(),
                weights.into_f32().map(Vec4::from_array).collect(),
            )?;
        }
        geometry.compute_bounding_volume();

        let material = primitive
            .material()
            .index()
            .and_then(|i| self.materials.get(i).cloned())
            .unwrap_or_default();

        Ok(Some(Mesh::new(geometry, material).with_name(name)))
    }

    // ========================================================================
    // Animations
    // ========================================================================

    fn load_animations(&self, gltf: &gltf::Gltf) -> Vec<AnimationClip> {
        let mut animations = Vec::new();

        for anim in gltf.animations() {
            let mut tracks = Vec::new();

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| self.buffer(buffer));
                let target = channel.target();
                let gltf_node = target.node();
                let node_name = gltf_node
                    .name()
                    .map_or_else(|| format!("Node_{}", gltf_node.index()), str::to_string);

                let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs())
                else {
                    continue;
                };
                let times: Vec<f32> = inputs.collect();

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let (target, data) = match outputs {
                    gltf::animation::util::ReadOutputs::Translations(iter) => (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    gltf::animation::util::ReadOutputs::Rotations(iter) => (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    gltf::animation::util::ReadOutputs::Scales(iter) => (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                        log::debug!("'{}': morph weight track on '{node_name}' skipped", self.name);
                        continue;
                    }
                };

                tracks.push(Track {
                    meta: TrackMeta { node_name, target },
                    data,
                });
            }

            let clip_name = anim
                .name()
                .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
            animations.push(AnimationClip::new(clip_name, tracks));
        }

        animations
    }
}
