use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::types::CameraUniform;

pub const ROTATE_SPEED: f32 = 0.005;
pub const ZOOM_SPEED: f32 = 0.1;
/// Fraction of velocity kept after one 60 Hz frame
pub const DAMPING: f32 = 0.9;
pub const MIN_DISTANCE: f32 = 0.5;
pub const MAX_DISTANCE: f32 = 50.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const REFERENCE_HZ: f32 = 60.0;

/// Orbit camera with inertia, looking at `target`
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            target: Vec3::new(0.0, 0.5, 0.0),
            yaw: 0.0,
            pitch: 0.3,
            distance: 5.0,
            fov: 45f32.to_radians(),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target - self.forward() * self.distance
    }

    /// Unit vector from the eye towards the target
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            -self.yaw.sin() * self.pitch.cos(),
            -self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Queue a drag in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw_velocity -= dx * ROTATE_SPEED;
        self.pitch_velocity += dy * ROTATE_SPEED;
    }

    /// Queue a zoom in wheel steps; positive moves closer
    pub fn zoom(&mut self, steps: f32) {
        self.zoom_velocity -= steps * ZOOM_SPEED;
    }

    pub fn is_moving(&self) -> bool {
        self.yaw_velocity.abs() > 1e-5 || self.pitch_velocity.abs() > 1e-5 || self.zoom_velocity.abs() > 1e-5
    }

    /// Integrate velocities over `delta` seconds and damp them
    pub fn advance(&mut self, delta: f32) {
        let delta = delta.max(0.0);
        let frames = delta * REFERENCE_HZ;

        self.yaw += self.yaw_velocity * frames;
        self.pitch = (self.pitch + self.pitch_velocity * frames).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = (self.distance * (1.0 + self.zoom_velocity * frames)).clamp(MIN_DISTANCE, MAX_DISTANCE);

        let keep = DAMPING.powf(frames);
        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.position(), self.target, Vec3::Y);
        let projection = Mat4::perspective_rh(self.fov, aspect.max(1e-3), 0.05, 500.0);
        projection * view
    }

    pub fn to_uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection(aspect).to_cols_array_2d(),
            eye: self.position().to_array(),
            _pad: 0.0,
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}
