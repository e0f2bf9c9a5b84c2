pub mod gltf;
pub mod worker;

pub use gltf::{decode_asset, DecodedAsset, NodeDesc};
pub use worker::{decode_request, load_async, AssetLoader};
