use glam::{EulerRot, Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::sync::Arc;

use crate::loaders::DecodedAsset;
use crate::traits::SceneGraph;
use crate::types::MeshData;

/// Stable id of a scene node; never reused within one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u32);

impl NodeHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Local translation / rotation / scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Rotation with its X Euler angle (XYZ order) replaced
    pub fn with_euler_x(&self, angle: f32) -> Self {
        let (_, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Self {
            rotation: Quat::from_euler(EulerRot::XYZ, angle, y, z),
            ..*self
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub local: Transform,
    pub mesh: Option<Arc<MeshData>>,
    pub parent: Option<NodeHandle>,
    pub children: Vec<NodeHandle>,
}

impl SceneNode {
    fn new(name: Option<String>, local: Transform) -> Self {
        Self {
            name,
            local,
            mesh: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Matches the node name, its mesh name, or either with whitespace
    /// replaced by underscores
    pub fn answers_to(&self, name: &str) -> bool {
        let mesh_name = self.mesh.as_ref().and_then(|m| m.name.as_deref());
        [self.name.as_deref(), mesh_name]
            .into_iter()
            .flatten()
            .any(|candidate| candidate == name || candidate == sanitize_name(name))
    }
}

/// Node names as animation tooling writes them
pub fn sanitize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// An asset subtree attached to the scene
#[derive(Debug, Clone)]
pub struct AttachedAsset {
    pub root: NodeHandle,
    /// Scene handle for each node of the decoded asset, by asset node index
    pub nodes: Vec<NodeHandle>,
}

/// A mesh ready to draw with its world matrix
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub handle: NodeHandle,
    pub mesh: Arc<MeshData>,
    pub world: Mat4,
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeHandle, SceneNode>,
    roots: Vec<NodeHandle>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: SceneNode) -> NodeHandle {
        let handle = NodeHandle(self.next_id);
        self.next_id += 1;
        self.nodes.insert(handle, node);
        handle
    }

    fn link(&mut self, parent: NodeHandle, child: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// Depth-first search below (and including) `root`
    pub fn find_named(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let node = self.nodes.get(&handle)?;
            if node.answers_to(name) {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        let mut node = self.nodes.get(&handle)?;
        let mut world = node.local.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            world = node.local.matrix() * world;
        }
        Some(world)
    }

    /// World-space bounds of every mesh vertex
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.mesh_instances()
            .iter()
            .flat_map(|instance| {
                instance
                    .mesh
                    .vertices
                    .iter()
                    .map(move |v| instance.world.transform_point3(Vec3::from_array(v.position)))
            })
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }

    /// All meshes in the scene with their world transforms
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut instances = Vec::new();
        let mut stack: Vec<(NodeHandle, Mat4)> =
            self.roots.iter().map(|&r| (r, Mat4::IDENTITY)).collect();

        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&handle) else {
                continue;
            };
            let world = parent_world * node.local.matrix();
            if let Some(mesh) = &node.mesh {
                instances.push(MeshInstance {
                    handle,
                    mesh: mesh.clone(),
                    world,
                });
            }
            stack.extend(node.children.iter().map(|&c| (c, world)));
        }

        instances
    }
}

impl SceneGraph for Scene {
    fn attach(&mut self, asset: &DecodedAsset, root_transform: Transform) -> AttachedAsset {
        let root = self.insert(SceneNode::new(Some("asset root".to_string()), root_transform));

        let nodes: Vec<NodeHandle> = asset
            .nodes
            .iter()
            .map(|desc| {
                let mut node = SceneNode::new(desc.name.clone(), desc.transform);
                node.mesh = desc.mesh.and_then(|i| asset.meshes.get(i).cloned());
                self.insert(node)
            })
            .collect();

        for (index, desc) in asset.nodes.iter().enumerate() {
            for &child in &desc.children {
                if let Some(&child_handle) = nodes.get(child) {
                    self.link(nodes[index], child_handle);
                }
            }
        }
        for &r in &asset.roots {
            if let Some(&handle) = nodes.get(r) {
                self.link(root, handle);
            }
        }

        self.roots.push(root);
        AttachedAsset { root, nodes }
    }

    fn detach(&mut self, root: NodeHandle) -> usize {
        self.roots.retain(|&r| r != root);
        if let Some(parent) = self.nodes.get(&root).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|&c| c != root);
            }
        }

        let mut removed = 0;
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.nodes.remove(&handle) {
                removed += 1;
                stack.extend(node.children);
            }
        }
        removed
    }

    fn attached_roots(&self) -> usize {
        self.roots.len()
    }

    fn find_named(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        Scene::find_named(self, root, name)
    }

    fn local_transform(&self, handle: NodeHandle) -> Option<Transform> {
        self.nodes.get(&handle).map(|n| n.local)
    }

    fn set_local_transform(&mut self, handle: NodeHandle, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.local = transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::NodeDesc;

    fn two_level_asset() -> DecodedAsset {
        DecodedAsset {
            nodes: vec![
                NodeDesc {
                    name: Some("Body".into()),
                    transform: Transform {
                        translation: Vec3::new(0.0, 1.0, 0.0),
                        ..Transform::IDENTITY
                    },
                    mesh: None,
                    children: vec![1],
                },
                NodeDesc {
                    name: Some("TOP_surface".into()),
                    transform: Transform::IDENTITY,
                    mesh: Some(0),
                    children: vec![],
                },
            ],
            roots: vec![0],
            meshes: vec![Arc::new(MeshData::default())],
            clips: vec![],
        }
    }

    #[test]
    fn attach_builds_hierarchy_under_new_root() {
        let mut scene = Scene::new();
        let attached = scene.attach(&two_level_asset(), Transform::IDENTITY);

        assert_eq!(scene.roots(), &[attached.root]);
        assert_eq!(scene.node_count(), 3);
        let body = scene.node(attached.nodes[0]).unwrap();
        assert_eq!(body.parent, Some(attached.root));
        assert_eq!(body.children, vec![attached.nodes[1]]);
    }

    #[test]
    fn detach_removes_whole_subtree() {
        let mut scene = Scene::new();
        let a = scene.attach(&two_level_asset(), Transform::IDENTITY);
        let b = scene.attach(&two_level_asset(), Transform::IDENTITY);

        assert_eq!(scene.detach(a.root), 3);
        assert_eq!(scene.roots(), &[b.root]);
        assert!(!scene.contains(a.nodes[1]));
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn lookup_accepts_sanitized_names() {
        let mut scene = Scene::new();
        let attached = scene.attach(&two_level_asset(), Transform::IDENTITY);

        assert_eq!(scene.find_named(attached.root, "TOP surface"), Some(attached.nodes[1]));
        assert_eq!(scene.find_named(attached.root, "BOTTOM surface"), None);
    }

    #[test]
    fn world_matrix_composes_root_transform() {
        let mut scene = Scene::new();
        let root_transform = Transform {
            translation: Vec3::new(2.0, 0.0, 0.0),
            scale: Vec3::splat(2.0),
            ..Transform::IDENTITY
        };
        let attached = scene.attach(&two_level_asset(), root_transform);

        let world = scene.world_matrix(attached.nodes[1]).unwrap();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(2.0, 2.0, 0.0)).length() < 1e-5);

        let instances = scene.mesh_instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].handle, attached.nodes[1]);
    }

    #[test]
    fn euler_x_replacement_keeps_other_axes() {
        let rest = Transform {
            rotation: Quat::from_euler(EulerRot::XYZ, 0.0, 0.5, 0.0),
            ..Transform::IDENTITY
        };
        let rotated = rest.with_euler_x(-0.25);
        let (x, y, _) = rotated.rotation.to_euler(EulerRot::XYZ);
        assert!((x + 0.25).abs() < 1e-5);
        assert!((y - 0.5).abs() < 1e-5);
    }
}
