use std::f32::consts::FRAC_PI_2;

/// Smallest extent the offset is divided by
pub const EXTENT_EPSILON: f32 = 1e-6;

/// Progress through the scrollable extent, always in [0, 1]
///
/// Content shorter than the viewport (extent <= 0) maps to 0.
pub fn progress_fraction(offset: f32, extent: f32) -> f32 {
    if !(extent > 0.0) || !offset.is_finite() {
        return 0.0;
    }
    (offset / extent.max(EXTENT_EPSILON)).clamp(0.0, 1.0)
}

/// Clip time for a progress fraction, 0 without a clip
pub fn animation_time(fraction: f32, duration: Option<f32>) -> f32 {
    duration.map_or(0.0, |d| fraction * d)
}

/// Rotation about X applied to the target mesh
pub fn mesh_rotation_x(fraction: f32) -> f32 {
    -fraction * FRAC_PI_2
}

/// Everything derived from one scroll position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOutputs {
    pub fraction: f32,
    pub animation_time: f32,
    pub mesh_rotation_x: f32,
}

impl ScrollOutputs {
    pub fn from_fraction(fraction: f32, duration: Option<f32>) -> Self {
        Self {
            fraction,
            animation_time: animation_time(fraction, duration),
            mesh_rotation_x: mesh_rotation_x(fraction),
        }
    }
}

/// Virtual document scroll state
///
/// The document is `page_length` viewports tall; the scrollable extent is
/// content height minus viewport height and changes with every resize.
#[derive(Debug, Clone)]
pub struct ScrollMapper {
    offset: f32,
    page_length: f32,
    viewport_height: f32,
    max_extent: f32,
}

impl ScrollMapper {
    pub fn new(viewport_height: f32, page_length: f32) -> Self {
        let mut mapper = Self {
            offset: 0.0,
            page_length,
            viewport_height,
            max_extent: 0.0,
        };
        mapper.refresh_extent();
        mapper
    }

    pub fn content_height(&self) -> f32 {
        self.viewport_height * self.page_length
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn max_extent(&self) -> f32 {
        self.max_extent
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Recompute the scrollable extent from the current layout
    ///
    /// Idempotent; the offset is pulled back inside the new extent.
    pub fn refresh_extent(&mut self) {
        let extent = self.content_height() - self.viewport_height;
        self.max_extent = if extent.is_finite() { extent.max(0.0) } else { 0.0 };
        self.offset = self.offset.clamp(0.0, self.max_extent);
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(0.0);
        self.refresh_extent();
    }

    pub fn set_page_length(&mut self, page_length: f32) {
        self.page_length = page_length.max(0.0);
        self.refresh_extent();
    }

    pub fn scroll_by(&mut self, delta: f32) {
        if delta.is_finite() {
            self.scroll_to(self.offset + delta);
        }
    }

    pub fn scroll_to(&mut self, offset: f32) {
        if offset.is_finite() {
            self.offset = offset.clamp(0.0, self.max_extent);
        }
    }

    pub fn fraction(&self) -> f32 {
        progress_fraction(self.offset, self.max_extent)
    }

    pub fn outputs(&self, duration: Option<f32>) -> ScrollOutputs {
        ScrollOutputs::from_fraction(self.fraction(), duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_zero_extent() {
        assert_eq!(progress_fraction(120.0, 0.0), 0.0);
        assert_eq!(progress_fraction(-5.0, -10.0), 0.0);
        assert_eq!(progress_fraction(f32::NAN, 100.0), 0.0);
    }

    #[test]
    fn fraction_clamped() {
        assert_eq!(progress_fraction(-10.0, 100.0), 0.0);
        assert_eq!(progress_fraction(150.0, 100.0), 1.0);
        assert_eq!(progress_fraction(25.0, 100.0), 0.25);
    }

    #[test]
    fn no_clip_means_zero_time() {
        assert_eq!(animation_time(0.7, None), 0.0);
        assert_eq!(animation_time(0.5, Some(4.0)), 2.0);
    }

    #[test]
    fn extent_follows_viewport() {
        let mut mapper = ScrollMapper::new(600.0, 4.0);
        assert_eq!(mapper.max_extent(), 1800.0);

        mapper.scroll_to(1800.0);
        assert_eq!(mapper.fraction(), 1.0);

        mapper.set_viewport_height(300.0);
        assert_eq!(mapper.max_extent(), 900.0);
        assert_eq!(mapper.offset(), 900.0);
    }

    #[test]
    fn page_shorter_than_viewport() {
        let mut mapper = ScrollMapper::new(600.0, 0.5);
        assert_eq!(mapper.max_extent(), 0.0);
        mapper.scroll_by(400.0);
        assert_eq!(mapper.offset(), 0.0);
        assert_eq!(mapper.fraction(), 0.0);
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut mapper = ScrollMapper::new(500.0, 3.0);
        mapper.scroll_to(250.0);
        let before = mapper.outputs(Some(2.0));
        mapper.refresh_extent();
        mapper.refresh_extent();
        assert_eq!(mapper.outputs(Some(2.0)), before);
    }
}
