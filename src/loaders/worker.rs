use anyhow::anyhow;
use futures::channel::{mpsc, oneshot};
use std::thread;

use super::gltf::decode_asset;
use crate::lifecycle::{LoadCompletion, LoadRequest};

/// Decode the file named by a request on the calling thread
pub fn decode_request(request: &LoadRequest) -> LoadCompletion {
    LoadCompletion {
        generation: request.generation,
        model_id: request.descriptor.id.clone(),
        result: decode_asset(&request.descriptor.source_path),
    }
}

/// Decode on a worker thread and resolve once it finishes
pub async fn load_async(request: LoadRequest) -> LoadCompletion {
    let (sender, receiver) = oneshot::channel();
    let fallback = request.clone();

    let spawned = thread::Builder::new()
        .name(format!("asset-load-{}", request.generation))
        .spawn(move || {
            let _ = sender.send(decode_request(&request));
        });
    if let Err(e) = spawned {
        return LoadCompletion::failed(&fallback, anyhow!("Failed to spawn loader thread: {}", e));
    }

    match receiver.await {
        Ok(completion) => completion,
        Err(_) => LoadCompletion::failed(&fallback, anyhow!("Loader thread exited without a result")),
    }
}

/// Runs decodes off the event-loop thread
///
/// Completions are collected with `drain` once per frame; nothing is ever
/// cancelled, stale results are filtered by the lifecycle's generation check.
pub struct AssetLoader {
    sender: mpsc::UnboundedSender<LoadCompletion>,
    receiver: mpsc::UnboundedReceiver<LoadCompletion>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn(&mut self, request: LoadRequest) {
        let sender = self.sender.clone();
        let fallback = request.clone();
        self.in_flight += 1;

        let spawned = thread::Builder::new()
            .name(format!("asset-load-{}", request.generation))
            .spawn(move || {
                let completion = decode_request(&request);
                if sender.unbounded_send(completion).is_err() {
                    log::debug!("Loader channel closed before {:?} finished", request.descriptor.id);
                }
            });

        if let Err(e) = spawned {
            let completion = LoadCompletion::failed(&fallback, anyhow!("Failed to spawn loader thread: {}", e));
            let _ = self.sender.unbounded_send(completion);
        }
    }

    /// Completions that arrived since the last call; never blocks
    pub fn drain(&mut self) -> Vec<LoadCompletion> {
        let mut completions = Vec::new();
        while let Ok(Some(completion)) = self.receiver.try_next() {
            completions.push(completion);
        }
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}
