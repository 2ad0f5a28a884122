//! Dioxus UI components for retouch.
//!
//! Provides the file upload zone, filter sliders with rotate and flip
//! buttons, the image preview, and the apply/download action bar.

mod actions;
mod controls;
mod preview;
mod upload;

pub use actions::ActionBar;
pub use controls::FilterControls;
pub use preview::ImagePreview;
pub use upload::FileUpload;
