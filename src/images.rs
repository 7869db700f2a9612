use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use log::{debug, warn};
use tokio::sync::Semaphore;

use crate::error::ImageError;
use crate::transport::{parse_url, HttpTransport};

/// Which of a recipe's two photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Small,
    Large,
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSize::Small => f.write_str("small"),
            ImageSize::Large => f.write_str("large"),
        }
    }
}

/// A decoded photo, cheap to clone
#[derive(Clone)]
pub struct LoadedImage {
    image: Arc<DynamicImage>,
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Load status of one recipe photo
#[derive(Debug, Clone, Default)]
pub enum ImageState {
    /// Nothing loaded yet, or there is nothing to load
    #[default]
    Placeholder,
    Loaded(LoadedImage),
    /// The fetch or decode failed
    Failed,
}

impl ImageState {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageState::Placeholder)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ImageState::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageState::Placeholder => "placeholder",
            ImageState::Loaded(_) => "loaded",
            ImageState::Failed => "failed",
        }
    }
}

/// Decode raw bytes as a JPEG or PNG photo.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage, ImageError> {
    let image = image::load_from_memory(bytes)?;
    Ok(LoadedImage {
        image: Arc::new(image),
    })
}

/// Downloads and decodes recipe photos with a cap on concurrent requests
#[derive(Clone)]
pub struct ImageLoader {
    transport: Arc<dyn HttpTransport>,
    permits: Arc<Semaphore>,
}

impl ImageLoader {
    /// `max_concurrent` is clamped to at least one.
    pub fn new(transport: Arc<dyn HttpTransport>, max_concurrent: usize) -> Self {
        Self {
            transport,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Load the photo at `url`.
    ///
    /// An absent or unparseable URL stays a placeholder without touching the
    /// network. Fetch and decode failures become `ImageState::Failed`.
    pub async fn load_image(&self, url: Option<&str>) -> ImageState {
        let Some(raw) = url else {
            return ImageState::Placeholder;
        };

        let url = match parse_url(raw) {
            Ok(url) => url,
            Err(e) => {
                debug!("Not loading image: {}", e);
                return ImageState::Placeholder;
            }
        };

        match self.fetch_and_decode(&url).await {
            Ok(image) => {
                debug!(
                    "Loaded {}x{} image from {}",
                    image.width(),
                    image.height(),
                    url
                );
                ImageState::Loaded(image)
            }
            Err(e) => {
                warn!("Image {} failed: {}", url, e);
                ImageState::Failed
            }
        }
    }

    async fn fetch_and_decode(&self, url: &reqwest::Url) -> Result<LoadedImage, ImageError> {
        let bytes = {
            let _permit = self.permits.acquire().await?;
            self.transport.get(url).await?
        };

        tokio::task::spawn_blocking(move || decode_image(&bytes)).await?
    }
}

impl fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoader")
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}
