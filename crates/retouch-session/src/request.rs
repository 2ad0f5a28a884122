//! Wire contract with the remote image-processing service.
//!
//! A request is a multipart form with two parts:
//!
//! - [`IMAGE_FIELD`]: the raw bytes of the current image, sent with its
//!   file name and content type;
//! - [`OPTIONS_FIELD`]: the [`FilterOptions`] encoded as JSON text.
//!
//! A successful response carries the processed image as the body. The
//! client treats it as [`RESULT_MIME`] and names it [`RESULT_FILENAME`].

use std::sync::Arc;

use crate::types::{FilterOptions, ImageBlob};

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the JSON-encoded options.
pub const OPTIONS_FIELD: &str = "options";

/// Endpoint path served alongside the page.
pub const DEFAULT_ENDPOINT: &str = "/api/edit";

/// File name given to images returned by the service.
pub const RESULT_FILENAME: &str = "edited.png";

/// Content type assumed for images returned by the service.
pub const RESULT_MIME: &str = "image/png";

/// One fully-built processing request.
///
/// Holds its own copy of the options, so edits made while the request is
/// in flight are not observed by it.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    image: ImageBlob,
    options: FilterOptions,
    options_json: String,
}

impl ProcessRequest {
    /// Build a request from an image and an options snapshot.
    ///
    /// The options are clamped to their documented ranges before encoding.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if the options cannot be serialized.
    pub fn new(image: ImageBlob, options: FilterOptions) -> Result<Self, serde_json::Error> {
        let options = options.clamped();
        let options_json = serde_json::to_string(&options)?;
        Ok(Self {
            image,
            options,
            options_json,
        })
    }

    /// The image to upload as the [`IMAGE_FIELD`] part.
    #[must_use]
    pub const fn image(&self) -> &ImageBlob {
        &self.image
    }

    /// The options snapshot this request was built from.
    #[must_use]
    pub const fn options(&self) -> FilterOptions {
        self.options
    }

    /// JSON text for the [`OPTIONS_FIELD`] part.
    #[must_use]
    pub fn options_json(&self) -> &str {
        &self.options_json
    }
}

/// Wrap a successful response body as the session's next image.
#[must_use]
pub fn response_image(body: impl Into<Arc<[u8]>>) -> ImageBlob {
    ImageBlob::new(body, RESULT_FILENAME, RESULT_MIME)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_image() -> ImageBlob {
        ImageBlob::new(vec![1, 2, 3, 4], "cat.jpg", "image/jpeg")
    }

    #[test]
    fn options_json_is_parseable_and_complete() {
        let options = FilterOptions {
            brightness: 150.0,
            rotate: 270,
            flip: true,
            ..FilterOptions::default()
        };
        let request = ProcessRequest::new(sample_image(), options).unwrap();
        let decoded: FilterOptions = serde_json::from_str(request.options_json()).unwrap();
        assert_eq!(decoded, options);
    }

    #[test]
    fn request_keeps_image_reference() {
        let image = sample_image();
        let request = ProcessRequest::new(image.clone(), FilterOptions::default()).unwrap();
        assert!(request.image().ptr_eq(&image));
        assert_eq!(request.image().name(), "cat.jpg");
        assert_eq!(request.image().mime(), "image/jpeg");
    }

    #[test]
    fn request_encodes_clamped_options() {
        let options = FilterOptions {
            grayscale: 250.0,
            ..FilterOptions::default()
        };
        let request = ProcessRequest::new(sample_image(), options).unwrap();
        assert!((request.options().grayscale - 100.0).abs() < f64::EPSILON);
        assert!(request.options_json().contains("\"grayscale\":100.0"));
    }

    #[test]
    fn response_image_is_png() {
        let image = response_image(vec![9, 9]);
        assert_eq!(image.name(), "edited.png");
        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.bytes(), &[9, 9]);
    }
}
