//! Window surface dimensions, normalized across platforms.
//!
//! Wayland may report a 0×0 window before the compositor assigns a size, and
//! HiDPI displays change the scale factor at runtime. [`SurfaceWrapper`]
//! always reports physical pixels, clamped to at least 1×1.

/// Smallest dimension ever handed to wgpu.
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    /// Width over height, used as the camera aspect ratio.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Tracks the physical size and scale factor of the window surface.
#[derive(Debug)]
pub struct SurfaceWrapper {
    size: PhysicalSize,
    scale_factor: f64,
}

impl SurfaceWrapper {
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            size: clamp(physical_width, physical_height),
            scale_factor,
        }
    }

    /// Record a resize. Returns the new size only if it differs from the old.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<PhysicalSize> {
        let size = clamp(physical_width, physical_height);
        if size == self.size {
            return None;
        }
        self.size = size;
        Some(size)
    }

    /// Record a DPI change; the physical size changes with it.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<PhysicalSize> {
        self.scale_factor = scale_factor;
        self.handle_resize(physical_width, physical_height)
    }

    pub fn physical_size(&self) -> PhysicalSize {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.size.aspect_ratio()
    }
}

fn clamp(width: u32, height: u32) -> PhysicalSize {
    PhysicalSize {
        width: width.max(MIN_SURFACE_DIMENSION),
        height: height.max(MIN_SURFACE_DIMENSION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_surface_handled_gracefully() {
        let mut wrapper = SurfaceWrapper::new(0, 0, 1.0);
        assert_eq!(
            wrapper.physical_size(),
            PhysicalSize {
                width: 1,
                height: 1
            }
        );

        let size = wrapper.handle_resize(1024, 768).unwrap();
        assert_eq!(size.width, 1024);
        assert!((wrapper.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_event_on_same_dimensions() {
        let mut wrapper = SurfaceWrapper::new(1920, 1080, 1.0);
        assert!(wrapper.handle_resize(1920, 1080).is_none());
        // Minimizing to 0×0 still changes the clamped size.
        assert!(wrapper.handle_resize(0, 0).is_some());
        assert!(wrapper.handle_resize(0, 0).is_none());
    }

    #[test]
    fn test_scale_factor_change_updates_physical_size() {
        let mut wrapper = SurfaceWrapper::new(1024, 768, 1.0);
        let size = wrapper.handle_scale_factor_changed(2.0, 2048, 1536).unwrap();
        assert_eq!(size.width, 2048);
        assert_eq!(wrapper.scale_factor(), 2.0);
        assert_eq!(wrapper.physical_size().height, 1536);
    }

    #[test]
    fn test_aspect_ratio_of_clamped_surface() {
        let wrapper = SurfaceWrapper::new(800, 0, 1.0);
        assert_eq!(wrapper.aspect_ratio(), 800.0);
    }
}
