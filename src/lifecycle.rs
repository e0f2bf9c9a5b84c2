use anyhow::{anyhow, Result};

use crate::animation::{AnimationClip, AnimationDriver};
use crate::catalog::{AssetCatalog, AssetDescriptor};
use crate::loaders::DecodedAsset;
use crate::scene::{NodeHandle, Transform};
use crate::traits::SceneGraph;

/// Sub-mesh singled out for the scroll-driven rotation
pub const TARGET_MESH_NAME: &str = "TOP surface";

/// Work order for the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub generation: u64,
    pub descriptor: AssetDescriptor,
}

/// Result of a decode, tagged with the generation that asked for it
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub model_id: String,
    pub result: Result<DecodedAsset>,
}

impl LoadCompletion {
    pub fn failed(request: &LoadRequest, error: anyhow::Error) -> Self {
        Self {
            generation: request.generation,
            model_id: request.descriptor.id.clone(),
            result: Err(error),
        }
    }
}

/// The model currently attached to the scene
#[derive(Debug)]
pub struct LoadedModel {
    pub id: String,
    pub root: NodeHandle,
    pub nodes: Vec<NodeHandle>,
    pub target_mesh: Option<NodeHandle>,
    /// Rest transform of the target mesh, restored on rewind
    pub target_rest: Transform,
    pub driver: Option<AnimationDriver>,
}

impl LoadedModel {
    pub fn clip(&self) -> Option<&AnimationClip> {
        self.driver.as_ref().map(AnimationDriver::clip)
    }

    pub fn clip_duration(&self) -> Option<f32> {
        self.driver.as_ref().map(AnimationDriver::duration)
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Attached {
        id: String,
        has_clip: bool,
        has_target_mesh: bool,
    },
    /// A newer request superseded this completion; nothing was attached
    Stale { id: String, generation: u64 },
    Failed { id: String, error: anyhow::Error },
}

/// What the lifecycle manager is doing right now
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleStatus {
    Empty,
    Loading { id: String },
    Ready { id: String },
    Failed { id: String, message: String },
}

/// Owns the single loaded model and serialises loads by generation
pub struct ModelLifecycle {
    catalog: AssetCatalog,
    generation: u64,
    pending: Option<String>,
    current: Option<LoadedModel>,
    last_failure: Option<(String, String)>,
}

impl ModelLifecycle {
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            catalog,
            generation: 0,
            pending: None,
            current: None,
            last_failure: None,
        }
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current(&self) -> Option<&LoadedModel> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut LoadedModel> {
        self.current.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn status(&self) -> LifecycleStatus {
        if let Some(id) = &self.pending {
            return LifecycleStatus::Loading { id: id.clone() };
        }
        if let Some(model) = &self.current {
            return LifecycleStatus::Ready { id: model.id.clone() };
        }
        match &self.last_failure {
            Some((id, message)) => LifecycleStatus::Failed {
                id: id.clone(),
                message: message.clone(),
            },
            None => LifecycleStatus::Empty,
        }
    }

    /// Tear down the current model and issue a load for `id`
    ///
    /// An id missing from the catalog leaves everything untouched.
    pub fn request<S: SceneGraph>(&mut self, id: &str, scene: &mut S) -> Result<LoadRequest> {
        let descriptor = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown model id: {:?}", id))?;

        self.teardown(scene);
        self.generation += 1;
        self.pending = Some(descriptor.id.clone());
        self.last_failure = None;
        log::info!("Requesting model {:?} (generation {})", descriptor.id, self.generation);

        Ok(LoadRequest {
            generation: self.generation,
            descriptor,
        })
    }

    /// Detach the current model and drop its animation driver
    pub fn teardown<S: SceneGraph>(&mut self, scene: &mut S) {
        if let Some(mut model) = self.current.take() {
            if let Some(driver) = model.driver.as_mut() {
                driver.stop(scene);
            }
            let removed = scene.detach(model.root);
            log::debug!("Detached model {:?} ({} nodes)", model.id, removed);
        }
    }

    /// Accept a finished decode
    pub fn complete<S: SceneGraph>(&mut self, completion: LoadCompletion, scene: &mut S) -> LoadOutcome {
        let LoadCompletion {
            generation,
            model_id,
            result,
        } = completion;

        if generation != self.generation || self.pending.as_deref() != Some(model_id.as_str()) {
            log::debug!(
                "Discarding stale load of {:?} (generation {}, current {})",
                model_id,
                generation,
                self.generation
            );
            return LoadOutcome::Stale { id: model_id, generation };
        }
        self.pending = None;

        let asset = match result {
            Ok(asset) => asset,
            Err(error) => {
                log::error!("Failed to load model {:?}: {:#}", model_id, error);
                self.last_failure = Some((model_id.clone(), format!("{:#}", error)));
                return LoadOutcome::Failed { id: model_id, error };
            }
        };

        let Some(descriptor) = self.catalog.get(&model_id).cloned() else {
            let error = anyhow!("Model {:?} vanished from the catalog", model_id);
            self.last_failure = Some((model_id.clone(), error.to_string()));
            return LoadOutcome::Failed { id: model_id, error };
        };

        let model = Self::attach(&descriptor, asset, scene);
        let outcome = LoadOutcome::Attached {
            id: model.id.clone(),
            has_clip: model.driver.is_some(),
            has_target_mesh: model.target_mesh.is_some(),
        };
        self.current = Some(model);
        outcome
    }

    fn attach<S: SceneGraph>(descriptor: &AssetDescriptor, mut asset: DecodedAsset, scene: &mut S) -> LoadedModel {
        let root_transform = Transform {
            translation: descriptor.placement(),
            scale: descriptor.scale.to_vec3(),
            ..Transform::IDENTITY
        };
        let attached = scene.attach(&asset, root_transform);

        let target_mesh = scene.find_named(attached.root, TARGET_MESH_NAME);
        let target_rest = target_mesh
            .and_then(|h| scene.local_transform(h))
            .unwrap_or_default();
        if target_mesh.is_none() {
            log::debug!("Model {:?} has no {:?} mesh; rotation disabled", descriptor.id, TARGET_MESH_NAME);
        }

        let preferred = descriptor.preferred_clip();
        let clip = AnimationClip::select(&asset.clips, preferred).map(|c| c.name.clone());
        let driver = clip.and_then(|name| {
            let index = asset.clips.iter().position(|c| c.name == name)?;
            let clip = asset.clips.swap_remove(index);
            if clip.name != preferred {
                log::info!("Clip {:?} not found in {:?}, using {:?}", preferred, descriptor.id, clip.name);
            }
            Some(AnimationDriver::bind(clip, &attached.nodes, scene))
        });
        if driver.is_none() {
            log::info!("Model {:?} has no animation clips", descriptor.id);
        }

        log::info!("Attached model {:?}", descriptor.id);
        LoadedModel {
            id: descriptor.id.clone(),
            root: attached.root,
            nodes: attached.nodes,
            target_mesh,
            target_rest,
            driver,
        }
    }
}
