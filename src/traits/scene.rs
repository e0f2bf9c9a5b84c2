use crate::loaders::DecodedAsset;
use crate::scene::{AttachedAsset, NodeHandle, Transform};

/// Scene-graph container the model lifecycle attaches assets into
pub trait SceneGraph {
    /// Insert the asset's node tree below a new root node
    fn attach(&mut self, asset: &DecodedAsset, root_transform: Transform) -> AttachedAsset;

    /// Remove a root and everything below it, returns the removed node count
    fn detach(&mut self, root: NodeHandle) -> usize;

    /// Number of asset roots currently attached
    fn attached_roots(&self) -> usize;

    /// Typed name lookup below `root`; absence is not an error
    fn find_named(&self, root: NodeHandle, name: &str) -> Option<NodeHandle>;

    fn local_transform(&self, handle: NodeHandle) -> Option<Transform>;

    fn set_local_transform(&mut self, handle: NodeHandle, transform: Transform);
}
