//! retouch-io: Browser I/O and Dioxus component library.
//!
//! Handles file uploads, Blob-URL previews, Blob downloads, blocking
//! notifications, the `fetch`-based processing service, and provides the
//! UI components for the retouch web application.

pub mod blob_url;
pub mod components;
pub mod download;
pub mod handle;
pub mod notify;
pub mod service;

pub use blob_url::BlobUrl;
pub use components::{ActionBar, FileUpload, FilterControls, ImagePreview};
pub use handle::SignalSession;
pub use service::FetchService;
