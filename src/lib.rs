pub mod animation;
pub mod camera;
pub mod catalog;
pub mod cli;
pub mod controls;
pub mod frame;
pub mod input;
pub mod lifecycle;
pub mod loaders;
pub mod playback;
pub mod renderer;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod traits;
pub mod types;

pub use catalog::{AssetCatalog, AssetDescriptor, AssetScale};
pub use lifecycle::{LifecycleStatus, LoadCompletion, LoadOutcome, LoadRequest, ModelLifecycle};
pub use playback::{GateTransition, PlaybackGate};
pub use scroll::{ScrollMapper, ScrollOutputs};
pub use session::ViewerSession;
