/// What a call to `set_enabled` changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    Enabled,
    /// Animation time and target rotation must rewind to rest
    Disabled,
    Unchanged,
}

/// Switch between scroll-driven playback and a rewound rest pose
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackGate {
    enabled: bool,
    time_fraction: f32,
}

impl PlaybackGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last fraction applied while enabled, 0 after a rewind
    pub fn time_fraction(&self) -> f32 {
        self.time_fraction
    }

    pub fn set_enabled(&mut self, enabled: bool) -> GateTransition {
        match (self.enabled, enabled) {
            (false, true) => {
                self.enabled = true;
                GateTransition::Enabled
            }
            (true, false) => {
                self.enabled = false;
                self.time_fraction = 0.0;
                GateTransition::Disabled
            }
            _ => GateTransition::Unchanged,
        }
    }

    /// Pass a freshly mapped fraction through the gate
    ///
    /// Returns the clamped fraction to apply, or `None` while disabled.
    pub fn admit(&mut self, fraction: f32) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        self.time_fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        Some(self.time_fraction)
    }

    /// Back to (disabled, 0); used whenever the model changes
    pub fn reset(&mut self) {
        self.enabled = false;
        self.time_fraction = 0.0;
    }
}
