use anyhow::{Context, Result};
use gltf::animation::util::ReadOutputs;
use glam::{Quat, Vec3};
use std::path::Path;
use std::sync::Arc;

use crate::animation::{AnimationClip, Channel, ChannelOutputs, Interpolation};
use crate::scene::Transform;
use crate::types::{smooth_normals, MeshData, Vertex};

/// Base colour used when a primitive has no material
const DEFAULT_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// One node of a decoded asset; children are indices into the same list
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<usize>,
    pub children: Vec<usize>,
}

/// Everything read out of a glTF file, not yet attached to a scene
#[derive(Debug, Clone, Default)]
pub struct DecodedAsset {
    pub nodes: Vec<NodeDesc>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Arc<MeshData>>,
    pub clips: Vec<AnimationClip>,
}

/// Loads a glTF/GLB file into nodes, meshes and animation clips
pub fn decode_asset(path: impl AsRef<Path>) -> Result<DecodedAsset> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF {:?}: {} nodes, {} meshes, {} animations",
        path,
        document.nodes().count(),
        document.meshes().count(),
        document.animations().count()
    );

    let meshes = document
        .meshes()
        .map(|mesh| decode_mesh(&mesh, &buffers).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;

    let nodes: Vec<NodeDesc> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            NodeDesc {
                name: node.name().map(str::to_string),
                transform: Transform {
                    translation: Vec3::from_array(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from_array(scale),
                },
                mesh: node.mesh().map(|m| m.index()),
                children: node.children().map(|c| c.index()).collect(),
            }
        })
        .collect();

    let roots = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => top_level_nodes(&nodes),
    };

    let clips = document
        .animations()
        .map(|animation| decode_animation(&animation, &buffers))
        .collect();

    Ok(DecodedAsset {
        nodes,
        roots,
        meshes,
        clips,
    })
}

/// Nodes that are nobody's child
fn top_level_nodes(nodes: &[NodeDesc]) -> Vec<usize> {
    (0..nodes.len())
        .filter(|&i| !nodes.iter().any(|n| n.children.contains(&i)))
        .collect()
}

/// Merges all triangle primitives of a glTF mesh
fn decode_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<MeshData> {
    let mut data = MeshData {
        name: mesh.name().map(str::to_string),
        vertices: Vec::new(),
        indices: Vec::new(),
        base_color: DEFAULT_COLOR,
    };

    for (i, primitive) in mesh.primitives().enumerate() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        // from this primitive's faces only
        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => smooth_normals(&positions, &indices),
        };

        let base = data.vertices.len() as u32;
        data.indices.extend(indices.into_iter().map(|i| base + i));
        data.vertices.extend(
            positions
                .into_iter()
                .zip(normals)
                .map(|(p, n)| Vertex::new(p, n)),
        );

        if i == 0 {
            data.base_color = primitive.material().pbr_metallic_roughness().base_color_factor();
        }
    }

    log::debug!("Decoded mesh {:?}: {} triangles", data.name, data.triangle_count());
    Ok(data)
}

/// Reads the TRS channels of an animation; morph weights are ignored
fn decode_animation(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> AnimationClip {
    let mut channels = Vec::new();

    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));

        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let outputs = match reader.read_outputs() {
            Some(ReadOutputs::Translations(values)) => {
                ChannelOutputs::Translations(values.map(Vec3::from_array).collect())
            }
            Some(ReadOutputs::Rotations(values)) => {
                ChannelOutputs::Rotations(values.into_f32().map(Quat::from_array).collect())
            }
            Some(ReadOutputs::Scales(values)) => {
                ChannelOutputs::Scales(values.map(Vec3::from_array).collect())
            }
            Some(ReadOutputs::MorphTargetWeights(_)) | None => continue,
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        channels.push(Channel {
            target_node: channel.target().node().index(),
            inputs: inputs.collect(),
            outputs,
            interpolation,
        });
    }

    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));
    let clip = AnimationClip::new(name, channels);
    log::debug!("Animation {:?}: {:.2}s, {} channels", clip.name, clip.duration, clip.channels.len());
    clip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(children: Vec<usize>) -> NodeDesc {
        NodeDesc {
            name: None,
            transform: Transform::IDENTITY,
            mesh: None,
            children,
        }
    }

    #[test]
    fn top_level_nodes_skips_children() {
        let nodes = vec![node(vec![1]), node(vec![]), node(vec![])];
        assert_eq!(top_level_nodes(&nodes), vec![0, 2]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = decode_asset("does/not/exist.gltf").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load glTF file"));
    }
}
