//! retouch-session: Edit-session state and request coordination (sans-IO).
//!
//! Holds the one image being edited and the filter options chosen for
//! it, and coordinates round trips to a remote image-processing service:
//! the current image and an options snapshot go out, the processed image
//! comes back and replaces the current one, so edits chain.
//!
//! This crate has **no I/O dependencies**. The service is reached through
//! the [`ProcessingService`] trait; the browser implementation lives in
//! `retouch-io` and a native one in `retouch-cli`.

pub mod cancel;
pub mod coordinator;
pub mod request;
pub mod session;
pub mod types;

pub use cancel::CancelToken;
pub use coordinator::{Coordinator, ExportAction, ProcessingService, SessionHandle, download};
pub use request::{ProcessRequest, response_image};
pub use session::{ApplyOutcome, Command, EditSession, PendingApply, RequestState};
pub use types::{FilterOption, FilterOptions, ImageBlob, ServiceError, SessionError, UnknownOption};
