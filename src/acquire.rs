//! Image acquisition: turning a deferred source into decoded pixels.
//!
//! This is the only place a split suspends. [`ImageAcquirer`] is the seam;
//! [`DefaultAcquirer`] handles every [`ImageSource`] variant:
//!
//! | Source | How |
//! |---|---|
//! | `Path` | `tokio::fs::read`, then decode |
//! | `Bytes` | decode, format guessed from content |
//! | `DataUrl` | base64 payload, then decode |
//! | `Url` | `reqwest` GET, then decode |
//! | `Decoded` | used as-is |

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Malformed data URL: {0}")]
    DataUrl(String),
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Fetching {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// File on the local filesystem.
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` URL.
    DataUrl(String),
    /// Remote `http://` or `https://` URL.
    Url(String),
    /// Already decoded bitmap.
    Decoded(DynamicImage),
}

impl ImageSource {
    /// Classify a string the way an `<img src>` would: data URL, remote URL,
    /// or else a filesystem path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("data:") {
            ImageSource::DataUrl(trimmed.to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Url(trimmed.to_string())
        } else {
            ImageSource::Path(PathBuf::from(input))
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Path(_) => "path",
            ImageSource::Bytes(_) => "bytes",
            ImageSource::DataUrl(_) => "data-url",
            ImageSource::Url(_) => "url",
            ImageSource::Decoded(_) => "decoded",
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(path: &std::path::Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        ImageSource::Decoded(image)
    }
}

impl From<RgbaImage> for ImageSource {
    fn from(image: RgbaImage) -> Self {
        ImageSource::Decoded(DynamicImage::ImageRgba8(image))
    }
}

/// Resolves an [`ImageSource`] into a decoded, pixel-addressable image.
#[async_trait]
pub trait ImageAcquirer: Send + Sync {
    async fn acquire(&self, source: ImageSource) -> Result<DynamicImage, AcquisitionError>;
}

/// Acquirer for local files, in-memory bytes, data URLs, and http(s) URLs.
///
/// See the [module docs](self) for the per-source strategy.
#[derive(Debug, Clone, Default)]
pub struct DefaultAcquirer {
    client: reqwest::Client,
}

impl DefaultAcquirer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AcquisitionError> {
        let fetch_err = |source| AcquisitionError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url: url.to_string(),
                status,
            });
        }
        let bytes = response.bytes().await.map_err(fetch_err)?;
        debug!(url, bytes = bytes.len(), "fetched image");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageAcquirer for DefaultAcquirer {
    async fn acquire(&self, source: ImageSource) -> Result<DynamicImage, AcquisitionError> {
        info!(source = source.kind(), "acquiring image");

        let bytes = match source {
            ImageSource::Decoded(image) => return Ok(image),
            ImageSource::Bytes(bytes) => bytes,
            ImageSource::DataUrl(url) => decode_data_url(&url)?,
            ImageSource::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| AcquisitionError::Io { path, source })?,
            ImageSource::Url(url) => self.fetch(&url).await?,
        };

        decode_bytes(&bytes)
    }
}

/// Decode encoded image bytes, guessing the format from the content.
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, AcquisitionError> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;
    debug!(
        width = image.width(),
        height = image.height(),
        "decoded image"
    );
    Ok(image)
}

/// Extract the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, AcquisitionError> {
    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])
        .ok_or_else(|| AcquisitionError::DataUrl("missing 'data:' scheme".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AcquisitionError::DataUrl("missing ',' separator".into()))?;

    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|p| p.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(AcquisitionError::DataUrl(
            "only base64-encoded data URLs are supported".into(),
        ));
    }

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(payload)
        .map_err(|e| AcquisitionError::DataUrl(format!("invalid base64 payload: {e}")))
}
