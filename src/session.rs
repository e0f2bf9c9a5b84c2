use anyhow::Result;
use std::ops::RangeInclusive;

use crate::camera::OrbitCamera;
use crate::catalog::AssetCatalog;
use crate::controls::{ControlEvent, ControlKey, ControlPanel, ControlValue};
use crate::input::ViewerInput;
use crate::lifecycle::{LifecycleStatus, LoadCompletion, LoadOutcome, LoadRequest, ModelLifecycle};
use crate::playback::{GateTransition, PlaybackGate};
use crate::scene::Scene;
use crate::scroll::{ScrollMapper, ScrollOutputs};
use crate::traits::SceneGraph;

pub const VIEWER_GROUP: &str = "Viewer";
pub const DEFAULT_PAGE_LENGTH: f32 = 4.0;
pub const SCALE_RANGE: RangeInclusive<f32> = 0.1..=5.0;

/// All viewer state, handed by `&mut` to every event handler
pub struct ViewerSession {
    scene: Scene,
    lifecycle: ModelLifecycle,
    scroll: ScrollMapper,
    gate: PlaybackGate,
    camera: OrbitCamera,
    panel: ControlPanel,
    asset_group: Option<String>,
    animation_time: f32,
    mesh_rotation_x: f32,
    scale_factor: f32,
}

impl ViewerSession {
    pub fn new(catalog: AssetCatalog, viewport_height: f32, page_length: f32) -> Self {
        let mut panel = ControlPanel::new();
        let options: Vec<String> = catalog.ids().map(str::to_string).collect();
        let first = options.first().cloned().unwrap_or_default();
        panel.add_group(VIEWER_GROUP).choice(ControlKey::Model, "Model", &first, options);

        Self {
            scene: Scene::new(),
            lifecycle: ModelLifecycle::new(catalog),
            scroll: ScrollMapper::new(viewport_height, page_length),
            gate: PlaybackGate::new(),
            camera: OrbitCamera::new(),
            panel,
            asset_group: None,
            animation_time: 0.0,
            mesh_rotation_x: 0.0,
            scale_factor: 1.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn lifecycle(&self) -> &ModelLifecycle {
        &self.lifecycle
    }

    pub fn status(&self) -> LifecycleStatus {
        self.lifecycle.status()
    }

    pub fn scroll(&self) -> &ScrollMapper {
        &self.scroll
    }

    pub fn gate(&self) -> &PlaybackGate {
        &self.gate
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    /// Clip time currently posed on the model
    pub fn animation_time(&self) -> f32 {
        self.animation_time
    }

    /// X rotation currently applied to the target mesh
    pub fn mesh_rotation_x(&self) -> f32 {
        self.mesh_rotation_x
    }

    fn clip_duration(&self) -> Option<f32> {
        self.lifecycle.current().and_then(|m| m.clip_duration())
    }

    /// Mapper outputs for the current scroll position, gated or not
    pub fn scroll_outputs(&self) -> ScrollOutputs {
        self.scroll.outputs(self.clip_duration())
    }

    /// Swap to another catalog model; the returned request goes to the loader
    pub fn select_model(&mut self, id: &str) -> Result<LoadRequest> {
        let request = self.lifecycle.request(id, &mut self.scene)?;

        if let Some(group) = self.asset_group.take() {
            self.panel.remove_group(&group);
        }
        self.gate.reset();
        self.animation_time = 0.0;
        self.mesh_rotation_x = 0.0;
        self.scale_factor = 1.0;

        let options = self.lifecycle.catalog().ids().map(str::to_string).collect();
        self.panel.set_value(
            ControlKey::Model,
            ControlValue::Choice {
                selected: id.to_string(),
                options,
            },
        );
        Ok(request)
    }

    pub fn on_load_complete(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let outcome = self.lifecycle.complete(completion, &mut self.scene);

        if let LoadOutcome::Attached { id, .. } = &outcome {
            self.panel
                .add_group(id)
                .toggle(ControlKey::ScrollPlayback, "Scroll animation", false)
                .slider(ControlKey::Scale, "Scale", 1.0, SCALE_RANGE);
            self.asset_group = Some(id.clone());
            self.frame_model();
        }
        outcome
    }

    /// Page scroll by `delta` pixels
    pub fn on_scroll(&mut self, delta: f32) {
        self.scroll.scroll_by(delta);
        self.apply_scroll();
    }

    pub fn scroll_to(&mut self, offset: f32) {
        self.scroll.scroll_to(offset);
        self.apply_scroll();
    }

    /// New viewport height; a clamped offset counts as a scroll
    ///
    /// A zero height (minimised window) is ignored so the offset survives.
    pub fn on_resize(&mut self, viewport_height: f32) {
        if !(viewport_height > 0.0) {
            return;
        }
        self.relayout(|scroll| scroll.set_viewport_height(viewport_height));
    }

    pub fn set_page_length(&mut self, page_length: f32) {
        self.relayout(|scroll| scroll.set_page_length(page_length));
    }

    fn relayout(&mut self, change: impl FnOnce(&mut ScrollMapper)) {
        let before = self.scroll.offset();
        change(&mut self.scroll);
        if self.scroll.offset() != before {
            self.apply_scroll();
        }
    }

    pub fn set_playback_enabled(&mut self, enabled: bool) -> GateTransition {
        let transition = self.gate.set_enabled(enabled);
        match transition {
            GateTransition::Enabled => self.apply_scroll(),
            GateTransition::Disabled => self.rewind(),
            GateTransition::Unchanged => {}
        }
        self.panel.set_value(ControlKey::ScrollPlayback, ControlValue::Toggle(enabled));
        transition
    }

    /// Multiplier on the catalog scale of the current model
    pub fn set_scale_factor(&mut self, factor: f32) {
        let factor = factor.clamp(*SCALE_RANGE.start(), *SCALE_RANGE.end());
        let Some(model) = self.lifecycle.current() else {
            return;
        };
        let Some(descriptor) = self.lifecycle.catalog().get(&model.id) else {
            return;
        };
        let root = model.root;
        let scale = descriptor.scale.to_vec3() * factor;

        if let Some(mut transform) = self.scene.local_transform(root) {
            transform.scale = scale;
            self.scene.set_local_transform(root, transform);
        }
        self.scale_factor = factor;
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Route a UI change; a model choice yields a load request
    pub fn handle_control(&mut self, event: ControlEvent) -> Option<LoadRequest> {
        match event {
            ControlEvent::Chose(ControlKey::Model, id) if self.is_showing(&id) => {
                log::debug!("{} already selected", id);
                None
            }
            ControlEvent::Chose(ControlKey::Model, id) => match self.select_model(&id) {
                Ok(request) => Some(request),
                Err(e) => {
                    log::warn!("Ignoring model selection: {:#}", e);
                    None
                }
            },
            ControlEvent::Toggled(ControlKey::ScrollPlayback, enabled) => {
                self.set_playback_enabled(enabled);
                None
            }
            ControlEvent::Slid(ControlKey::Scale, factor) => {
                self.set_scale_factor(factor);
                None
            }
            other => {
                log::debug!("Unhandled control event {:?}", other);
                None
            }
        }
    }

    /// Loading or showing `id`; a failed load of it can be retried
    fn is_showing(&self, id: &str) -> bool {
        match self.status() {
            LifecycleStatus::Loading { id: current } | LifecycleStatus::Ready { id: current } => current == id,
            LifecycleStatus::Empty | LifecycleStatus::Failed { .. } => false,
        }
    }

    pub fn apply_input(&mut self, input: ViewerInput) {
        match input {
            ViewerInput::Scroll(pixels) => self.on_scroll(pixels),
            ViewerInput::ScrollPages(pages) => self.on_scroll(pages * self.scroll.viewport_height()),
            ViewerInput::ScrollToStart => self.scroll_to(0.0),
            ViewerInput::ScrollToEnd => self.scroll_to(self.scroll.max_extent()),
            ViewerInput::Orbit { dx, dy } => self.camera.rotate(dx, dy),
            ViewerInput::Zoom(steps) => self.camera.zoom(steps),
            ViewerInput::TogglePlayback => {
                if self.lifecycle.current().is_some() {
                    self.set_playback_enabled(!self.gate.is_enabled());
                }
            }
        }
    }

    /// Render-loop bookkeeping; makes no playback decisions
    pub fn on_frame(&mut self, delta: f32) {
        self.scroll.refresh_extent();
        self.camera.advance(delta);
    }

    fn apply_scroll(&mut self) {
        let duration = self.clip_duration();
        let outputs = self.scroll.outputs(duration);
        if let Some(fraction) = self.gate.admit(outputs.fraction) {
            self.apply_pose(ScrollOutputs::from_fraction(fraction, duration));
        }
    }

    fn rewind(&mut self) {
        self.apply_pose(ScrollOutputs::from_fraction(0.0, self.clip_duration()));
    }

    /// Pose the clip and the target mesh; inert without a clip
    fn apply_pose(&mut self, outputs: ScrollOutputs) {
        let Some(model) = self.lifecycle.current_mut() else {
            return;
        };
        let Some(driver) = model.driver.as_mut() else {
            return;
        };

        driver.set_time(outputs.animation_time, &mut self.scene);
        self.animation_time = driver.time();

        if let Some(target) = model.target_mesh {
            let base = if driver.drives(target) {
                self.scene.local_transform(target).unwrap_or(model.target_rest)
            } else {
                model.target_rest
            };
            self.scene.set_local_transform(target, base.with_euler_x(outputs.mesh_rotation_x));
            self.mesh_rotation_x = outputs.mesh_rotation_x;
        }
    }

    /// Point the camera at the bounds of the loaded model
    fn frame_model(&mut self) {
        let Some((min, max)) = self.scene.bounds() else {
            return;
        };
        let center = (min + max) * 0.5;
        let radius = ((max - min).length() * 0.5).max(0.1);

        self.camera.target = center;
        self.camera.distance = radius / (self.camera.fov * 0.5).sin() * 1.2;
        log::debug!("Framed model: center {:?}, radius {:.2}", center, radius);
    }
}

/// Current pose summary for the overlay
pub fn describe_pose(session: &ViewerSession) -> String {
    let outputs = session.scroll_outputs();
    format!(
        "progress {:>5.1}%  time {:.2}s  rot {:.1}°",
        outputs.fraction * 100.0,
        session.animation_time(),
        session.mesh_rotation_x().to_degrees()
    )
}
