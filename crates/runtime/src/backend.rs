use image::{imageops, imageops::FilterType, DynamicImage, RgbaImage};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

use crate::frontend::registry::Operation;
use crate::operations::OperationError;
use crate::values::{Detections, Image};

// Raw body of a remote resource
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Everything the operations need from the outside world: image codecs,
/// the network, vision models and a display. The interpreter only ever
/// talks to one of these.
pub trait Backend {
    fn decode(&mut self, path: &Path) -> Result<Image, OperationError>;
    fn encode(&mut self, image: &Image, path: &Path) -> Result<(), OperationError>;
    fn resize(&mut self, image: &Image, width: u32, height: u32) -> Result<Image, OperationError>;
    fn fetch(&mut self, url: &str) -> Result<Fetched, OperationError>;

    /// Every object found in the image, unfiltered
    fn detect(&mut self, image: &Image) -> Result<Detections, OperationError>;
    fn segment(&mut self, image: &Image, prompt: &str) -> Result<Detections, OperationError>;
    /// Best matching label among `labels`
    fn classify(&mut self, image: &Image, labels: &[String]) -> Result<String, OperationError>;

    fn display(&mut self, image: &Image) -> Result<(), OperationError>;
}

/// Backend built on the `image` crate and plain HTTP. No model weights ship
/// with it, so the model operations report themselves as unavailable.
#[derive(Debug, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        LocalBackend
    }
}

fn to_rgba(image: &Image) -> Result<RgbaImage, OperationError> {
    RgbaImage::from_raw(image.width(), image.height(), image.pixels().to_vec())
        .ok_or_else(|| OperationError::Codec("pixel buffer doesn't match image size".into()))
}

fn from_rgba(buffer: RgbaImage) -> Result<Image, OperationError> {
    let (width, height) = buffer.dimensions();

    Image::from_rgba(width, height, buffer.into_raw())
        .ok_or_else(|| OperationError::Codec("pixel buffer doesn't match image size".into()))
}

impl Backend for LocalBackend {
    fn decode(&mut self, path: &Path) -> Result<Image, OperationError> {
        let decoded = image::open(path)
            .map_err(|e| OperationError::Codec(format!("{}: {}", path.display(), e)))?;

        from_rgba(decoded.to_rgba8())
    }

    fn encode(&mut self, image: &Image, path: &Path) -> Result<(), OperationError> {
        let rgba = DynamicImage::ImageRgba8(to_rgba(image)?);

        // Jpeg has no alpha channel
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

        let result = match is_jpeg {
            true => DynamicImage::ImageRgb8(rgba.to_rgb8()).save(path),
            false => rgba.save(path),
        };

        result.map_err(|e| OperationError::Codec(format!("{}: {}", path.display(), e)))
    }

    fn resize(&mut self, image: &Image, width: u32, height: u32) -> Result<Image, OperationError> {
        let resized = imageops::resize(
            &to_rgba(image)?,
            width.max(1),
            height.max(1),
            FilterType::Triangle,
        );

        from_rgba(resized)
    }

    fn fetch(&mut self, url: &str) -> Result<Fetched, OperationError> {
        debug!("GET {}", url);

        let response = ureq::get(url)
            .call()
            .map_err(|e| OperationError::Network(e.to_string()))?;

        let content_type = response.content_type().to_string();
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| OperationError::Network(e.to_string()))?;

        Ok(Fetched {
            bytes,
            content_type,
        })
    }

    fn detect(&mut self, _image: &Image) -> Result<Detections, OperationError> {
        Err(OperationError::ModelUnavailable(Operation::Detect))
    }

    fn segment(&mut self, _image: &Image, _prompt: &str) -> Result<Detections, OperationError> {
        Err(OperationError::ModelUnavailable(Operation::Segment))
    }

    fn classify(&mut self, _image: &Image, _labels: &[String]) -> Result<String, OperationError> {
        Err(OperationError::ModelUnavailable(Operation::Classify))
    }

    // Without a window system we write the picture out and point at it
    fn display(&mut self, image: &Image) -> Result<(), OperationError> {
        let file = tempfile::Builder::new()
            .prefix("visualscript-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OperationError::Io(e.to_string()))?;

        let (_, path) = file.keep().map_err(|e| OperationError::Io(e.to_string()))?;

        self.encode(image, &path)?;
        warn!("No display available, image written to {}", path.display());

        Ok(())
    }
}
