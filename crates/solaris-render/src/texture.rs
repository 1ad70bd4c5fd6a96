//! Body textures: decoding, upload, caching and the fallback checkerboard.
//!
//! [`TextureManager`] hands out [`Arc<ManagedTexture>`]s with a ready-to-bind
//! bind group (texture at binding 0, sampler at binding 1). Every texture is
//! `Rgba8UnormSrgb`, sampled linearly and repeated in both directions.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Format of every texture this manager creates.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Cache key of the fallback texture.
const FALLBACK_NAME: &str = "<fallback>";

/// A GPU texture with its view and bind group.
pub struct ManagedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Creates and caches body textures.
pub struct TextureManager {
    textures: HashMap<String, Arc<ManagedTexture>>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            textures: HashMap::new(),
            sampler,
            bind_group_layout,
        }
    }

    /// Upload tightly packed RGBA8 pixels. Returns the cached texture if
    /// `name` was created before.
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Arc<ManagedTexture>, TextureError> {
        if let Some(existing) = self.textures.get(name) {
            return Ok(Arc::clone(existing));
        }

        validate(rgba, width, height)?;
        Ok(self.upload(device, queue, name, rgba, width, height))
    }

    /// Create the GPU texture and bind group for already validated pixels.
    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Arc<ManagedTexture> {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}-bind-group")),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let managed = Arc::new(ManagedTexture {
            texture,
            view,
            bind_group,
            dimensions: (width, height),
        });
        self.textures.insert(name.to_string(), Arc::clone(&managed));
        log::info!("Created texture '{name}' ({width}x{height})");
        managed
    }

    /// Decode an image file (PNG or JPEG) and upload it.
    pub fn load_file(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Arc<ManagedTexture>, TextureError> {
        let name = path.to_string_lossy();
        if let Some(existing) = self.textures.get(name.as_ref()) {
            return Ok(Arc::clone(existing));
        }
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        self.create_texture(device, queue, &name, image.as_raw(), width, height)
    }

    /// Magenta checkerboard used when a texture is missing or unreadable.
    pub fn fallback(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Arc<ManagedTexture> {
        if let Some(existing) = self.textures.get(FALLBACK_NAME) {
            return Arc::clone(existing);
        }
        let pixels = checkerboard(64, [255, 0, 255, 255], [32, 32, 32, 255]);
        self.upload(device, queue, FALLBACK_NAME, &pixels, 64, 64)
    }

    /// Load `path`, or return the fallback when there is no path or it fails.
    pub fn load_or_fallback(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: Option<&Path>,
    ) -> Arc<ManagedTexture> {
        let Some(path) = path else {
            return self.fallback(device, queue);
        };
        match self.load_file(device, queue, path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Using fallback texture for {}: {e}", path.display());
                self.fallback(device, queue)
            }
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn validate(rgba: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: rgba.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// RGBA8 checkerboard of `size`×`size` texels in 8×8 cells.
pub fn checkerboard(size: u32, color_a: [u8; 4], color_b: [u8; 4]) -> Vec<u8> {
    let cell = (size / 8).max(1);
    image::RgbaImage::from_fn(size, size, |x, y| {
        if ((x / cell) + (y / cell)).is_multiple_of(2) {
            image::Rgba(color_a)
        } else {
            image::Rgba(color_b)
        }
    })
    .into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::tests::create_test_device;

    #[test]
    fn test_checkerboard_layout() {
        let a = [255, 0, 255, 255];
        let b = [0, 0, 0, 255];
        let pixels = checkerboard(16, a, b);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        let texel = |x: usize, y: usize| &pixels[(y * 16 + x) * 4..(y * 16 + x) * 4 + 4];
        assert_eq!(texel(0, 0), a);
        assert_eq!(texel(2, 0), b);
        assert_eq!(texel(2, 2), a);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            validate(&[], 0, 4),
            Err(TextureError::ZeroDimensions { .. })
        ));
        assert!(matches!(
            validate(&[0; 12], 2, 2),
            Err(TextureError::DataSizeMismatch {
                actual: 12,
                expected: 16,
                ..
            })
        ));
        assert!(validate(&[0; 16], 2, 2).is_ok());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let missing = Path::new("/nonexistent/earth.jpg");
        assert!(matches!(
            manager.load_file(&device, &queue, missing),
            Err(TextureError::Decode(_))
        ));

        let texture = manager.load_or_fallback(&device, &queue, Some(missing));
        assert_eq!(texture.dimensions, (64, 64));
        let again = manager.load_or_fallback(&device, &queue, None);
        assert!(Arc::ptr_eq(&texture, &again));
    }

    #[test]
    fn test_load_png_from_disk() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon.png");
        image::RgbaImage::from_pixel(8, 4, image::Rgba([200, 200, 200, 255]))
            .save(&path)
            .unwrap();

        let mut manager = TextureManager::new(&device);
        let texture = manager.load_file(&device, &queue, &path).unwrap();
        assert_eq!(texture.dimensions, (8, 4));
        let cached = manager.load_file(&device, &queue, &path).unwrap();
        assert!(Arc::ptr_eq(&texture, &cached));
        assert_eq!(manager.len(), 1);
    }
}
