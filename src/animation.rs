use glam::{Quat, Vec3, Vec4};

use crate::scene::{NodeHandle, Transform};
use crate::traits::SceneGraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Outputs hold (in-tangent, value, out-tangent) per keyframe
    CubicSpline,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChannelOutputs {
    Translations(Vec<Vec3>),
    Rotations(Vec<Quat>),
    Scales(Vec<Vec3>),
}

impl ChannelOutputs {
    fn len(&self) -> usize {
        match self {
            ChannelOutputs::Translations(v) | ChannelOutputs::Scales(v) => v.len(),
            ChannelOutputs::Rotations(v) => v.len(),
        }
    }

    fn get(&self, index: usize) -> Vec4 {
        match self {
            ChannelOutputs::Translations(v) | ChannelOutputs::Scales(v) => v[index].extend(0.0),
            ChannelOutputs::Rotations(v) => Vec4::from(v[index]),
        }
    }
}

/// Keyframes driving one property of one node
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Index into the decoded asset's node list
    pub target_node: usize,
    pub inputs: Vec<f32>,
    pub outputs: ChannelOutputs,
    pub interpolation: Interpolation,
}

impl Channel {
    fn value_at(&self, key: usize) -> Vec4 {
        match self.interpolation {
            Interpolation::CubicSpline => self.outputs.get(key * 3 + 1),
            _ => self.outputs.get(key),
        }
    }

    fn is_well_formed(&self) -> bool {
        let per_key = if self.interpolation == Interpolation::CubicSpline { 3 } else { 1 };
        !self.inputs.is_empty() && self.outputs.len() >= self.inputs.len() * per_key
    }

    /// Sampled value as a Vec4 (xyz for vectors, xyzw for quaternions)
    fn sample_raw(&self, time: f32) -> Option<Vec4> {
        if !self.is_well_formed() {
            return None;
        }
        let last = self.inputs.len() - 1;
        if time <= self.inputs[0] {
            return Some(self.value_at(0));
        }
        if time >= self.inputs[last] {
            return Some(self.value_at(last));
        }

        let next = self.inputs.partition_point(|&k| k <= time).clamp(1, last);
        let prev = next - 1;
        let dt = self.inputs[next] - self.inputs[prev];
        let f = if dt > 0.0 { (time - self.inputs[prev]) / dt } else { 0.0 };

        let (a, b) = (self.value_at(prev), self.value_at(next));
        let rotation = matches!(self.outputs, ChannelOutputs::Rotations(_));

        Some(match self.interpolation {
            Interpolation::Step => a,
            Interpolation::Linear if rotation => {
                Vec4::from(Quat::from_vec4(a).slerp(Quat::from_vec4(b), f))
            }
            Interpolation::Linear => a.lerp(b, f),
            Interpolation::CubicSpline => {
                let out_tangent = self.outputs.get(prev * 3 + 2) * dt;
                let in_tangent = self.outputs.get(next * 3) * dt;
                let (f2, f3) = (f * f, f * f * f);
                a * (2.0 * f3 - 3.0 * f2 + 1.0)
                    + out_tangent * (f3 - 2.0 * f2 + f)
                    + b * (-2.0 * f3 + 3.0 * f2)
                    + in_tangent * (f3 - f2)
            }
        })
    }

    /// Write this channel's value at `time` into `transform`
    pub fn apply(&self, time: f32, transform: &mut Transform) {
        let Some(value) = self.sample_raw(time) else {
            return;
        };
        match self.outputs {
            ChannelOutputs::Translations(_) => transform.translation = value.truncate(),
            ChannelOutputs::Scales(_) => transform.scale = value.truncate(),
            ChannelOutputs::Rotations(_) => {
                transform.rotation = Quat::from_vec4(value).normalize();
            }
        }
    }
}

/// Named, timed set of channels
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .flat_map(|c| c.inputs.iter().copied())
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Clip named `preferred`, else the first one
    pub fn select<'a>(clips: &'a [AnimationClip], preferred: &str) -> Option<&'a AnimationClip> {
        clips.iter().find(|c| c.name == preferred).or_else(|| clips.first())
    }
}

/// Plays one clip onto attached scene nodes at an explicit time
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    clip: AnimationClip,
    /// Scene node for each channel, `None` when the target was not attached
    bindings: Vec<Option<NodeHandle>>,
    rest: Vec<(NodeHandle, Transform)>,
    time: f32,
}

impl AnimationDriver {
    /// Bind `clip` to the scene nodes of an attached asset
    pub fn bind<S: SceneGraph>(clip: AnimationClip, nodes: &[NodeHandle], scene: &S) -> Self {
        let bindings: Vec<Option<NodeHandle>> = clip
            .channels
            .iter()
            .map(|c| nodes.get(c.target_node).copied())
            .collect();

        let mut rest: Vec<(NodeHandle, Transform)> = Vec::new();
        for handle in bindings.iter().flatten() {
            if rest.iter().any(|(h, _)| h == handle) {
                continue;
            }
            if let Some(transform) = scene.local_transform(*handle) {
                rest.push((*handle, transform));
            }
        }

        Self {
            clip,
            bindings,
            rest,
            time: 0.0,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Whether any channel writes to `handle`
    pub fn drives(&self, handle: NodeHandle) -> bool {
        self.bindings.contains(&Some(handle))
    }

    /// Pose every bound node for `time`, clamped to the clip
    pub fn set_time<S: SceneGraph>(&mut self, time: f32, scene: &mut S) {
        self.time = if time.is_finite() { time.clamp(0.0, self.clip.duration) } else { 0.0 };

        for (handle, rest) in &self.rest {
            let mut pose = *rest;
            for (channel, binding) in self.clip.channels.iter().zip(&self.bindings) {
                if *binding == Some(*handle) {
                    channel.apply(self.time, &mut pose);
                }
            }
            scene.set_local_transform(*handle, pose);
        }
    }

    /// Restore rest poses and rewind
    pub fn stop<S: SceneGraph>(&mut self, scene: &mut S) {
        self.time = 0.0;
        for (handle, rest) in &self.rest {
            scene.set_local_transform(*handle, *rest);
        }
    }
}
