//! Shared types for the edit session and the processing service contract.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// MIME type used when the format of a loaded file cannot be determined.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// The adjustable filter parameters sent with every processing request.
///
/// Serialized as a flat JSON object with the field names below, which is
/// the `options` part of the request (see [`crate::request`]).
///
/// Fields are public so callers can build a full option set at once, but
/// the session only ever mutates them through [`FilterOptions::set`],
/// which enforces the documented ranges. [`FilterOptions::clamped`] is
/// applied again when a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Brightness in percent. 100 leaves the image unchanged.
    pub brightness: f64,

    /// Contrast in percent. 100 leaves the image unchanged.
    pub contrast: f64,

    /// Grayscale amount in percent. 0 keeps full color.
    pub grayscale: f64,

    /// Accumulated clockwise rotation in degrees.
    ///
    /// Grows by [`FilterOptions::ROTATION_STEP`] per rotate action and is
    /// never reduced modulo 360; the service receives the raw total.
    pub rotate: i64,

    /// Whether the image is mirrored horizontally.
    pub flip: bool,
}

impl FilterOptions {
    pub const DEFAULT_BRIGHTNESS: f64 = 100.0;
    pub const DEFAULT_CONTRAST: f64 = 100.0;
    pub const DEFAULT_GRAYSCALE: f64 = 0.0;
    pub const DEFAULT_ROTATE: i64 = 0;
    pub const DEFAULT_FLIP: bool = false;

    /// Degrees added by one rotate action.
    pub const ROTATION_STEP: i64 = 90;

    /// Read one scalar field.
    #[must_use]
    pub const fn get(&self, option: FilterOption) -> f64 {
        match option {
            FilterOption::Brightness => self.brightness,
            FilterOption::Contrast => self.contrast,
            FilterOption::Grayscale => self.grayscale,
        }
    }

    /// Write one scalar field, clamped to the option's range.
    ///
    /// Non-finite values are rejected and leave the field unchanged.
    /// Returns the stored value, or `None` when the input was rejected.
    pub fn set(&mut self, option: FilterOption, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let range = option.range();
        let stored = value.clamp(*range.start(), *range.end());
        match option {
            FilterOption::Brightness => self.brightness = stored,
            FilterOption::Contrast => self.contrast = stored,
            FilterOption::Grayscale => self.grayscale = stored,
        }
        Some(stored)
    }

    /// Add one rotation step. Saturates instead of overflowing.
    pub const fn rotate_clockwise(&mut self) {
        self.rotate = self.rotate.saturating_add(Self::ROTATION_STEP);
    }

    /// Copy of `self` with every scalar field forced into its range.
    ///
    /// Non-finite fields fall back to their defaults.
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut out = self;
        for option in FilterOption::ALL {
            if out.set(option, self.get(option)).is_none() {
                out.set(option, option.default_value());
            }
        }
        out
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            brightness: Self::DEFAULT_BRIGHTNESS,
            contrast: Self::DEFAULT_CONTRAST,
            grayscale: Self::DEFAULT_GRAYSCALE,
            rotate: Self::DEFAULT_ROTATE,
            flip: Self::DEFAULT_FLIP,
        }
    }
}

/// Names the scalar fields of [`FilterOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOption {
    Brightness,
    Contrast,
    Grayscale,
}

impl FilterOption {
    /// All scalar options in display order.
    pub const ALL: [Self; 3] = [Self::Brightness, Self::Contrast, Self::Grayscale];

    /// Field name as it appears in the serialized options.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Grayscale => "grayscale",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Grayscale => "Grayscale",
        }
    }

    /// Accepted values, in percent.
    #[must_use]
    pub const fn range(self) -> RangeInclusive<f64> {
        match self {
            Self::Brightness | Self::Contrast => 0.0..=200.0,
            Self::Grayscale => 0.0..=100.0,
        }
    }

    #[must_use]
    pub const fn default_value(self) -> f64 {
        match self {
            Self::Brightness => FilterOptions::DEFAULT_BRIGHTNESS,
            Self::Contrast => FilterOptions::DEFAULT_CONTRAST,
            Self::Grayscale => FilterOptions::DEFAULT_GRAYSCALE,
        }
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterOption {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.name() == s)
            .ok_or_else(|| UnknownOption(s.to_owned()))
    }
}

/// Returned when parsing a [`FilterOption`] from an unrecognized name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter option: {0:?}")]
pub struct UnknownOption(pub String);

/// An image held by the session: raw file bytes plus file metadata.
///
/// The bytes are never decoded or validated. Clones share the same
/// allocation, so [`ImageBlob::ptr_eq`] can tell whether two handles refer
/// to the very same image rather than merely equal bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    bytes: Arc<[u8]>,
    name: String,
    mime: String,
}

impl ImageBlob {
    #[must_use]
    pub fn new(bytes: impl Into<Arc<[u8]>>, name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            name: name.into(),
            mime: mime.into(),
        }
    }

    /// Wrap bytes read from a user-selected file.
    ///
    /// The MIME type is sniffed from the leading bytes, then from the file
    /// extension, and falls back to [`UNKNOWN_MIME`]. Nothing is rejected:
    /// unrecognized content is held as-is.
    #[must_use]
    pub fn from_file(bytes: impl Into<Arc<[u8]>>, name: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let name = name.into();
        let mime = sniff_mime(&bytes, &name);
        Self::new(bytes, name, mime)
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether both handles share one allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Best-effort MIME type for a file's content.
fn sniff_mime(bytes: &[u8], name: &str) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    name.rsplit_once('.')
        .and_then(|(_, ext)| image::ImageFormat::from_extension(ext))
        .map_or(UNKNOWN_MIME, |format| format.to_mime_type())
}

/// Failure reported by a [`ProcessingService`](crate::ProcessingService).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service answered with a non-OK status. The body is ignored.
    #[error("service responded with status {0}")]
    Status(u16),

    /// The request never produced a response (network fault, bad URL,
    /// unreadable body).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request was abandoned through its cancel token.
    #[error("request was cancelled")]
    Cancelled,
}

/// Errors surfaced to the user by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Apply or download was invoked before any image was loaded.
    #[error("no image loaded")]
    MissingImage,

    /// Apply was invoked while a previous request is still outstanding.
    #[error("a processing request is already in flight")]
    Busy,

    /// The filter options could not be encoded for the request.
    #[error("failed to encode filter options: {0}")]
    Encode(#[from] serde_json::Error),

    /// The processing service failed. The session image is unchanged.
    #[error("image processing failed: {0}")]
    Processing(#[source] ServiceError),
}
