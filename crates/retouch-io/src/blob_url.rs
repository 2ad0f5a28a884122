//! Blob URL creation for displaying session images.
//!
//! Wraps image bytes in a `Blob` and exposes them through an object URL
//! usable as an `<img src>`. [`BlobUrl`] revokes its URL when dropped, so
//! replacing the preview image releases the previous one.

use retouch_session::ImageBlob;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur while creating a preview URL.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for PreviewError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Copy `bytes` into a new `Blob` with the given content type.
///
/// # Errors
///
/// Returns the browser exception if the `Blob` cannot be constructed.
pub fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<web_sys::Blob, JsValue> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
}

/// An object URL for an image, revoked on drop.
#[derive(Debug, PartialEq, Eq)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// Create an object URL for `image`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::JsError`] if Blob or URL creation fails.
    pub fn new(image: &ImageBlob) -> Result<Self, PreviewError> {
        let blob = bytes_to_blob(image.bytes(), image.mime())?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for BlobUrl {
    fn drop(&mut self) {
        let _ = web_sys::Url::revoke_object_url(&self.0);
    }
}
