//! Blocking user notifications and console error reporting.
//!
//! Failures of user-triggered actions are shown with `window.alert`, and
//! their underlying cause is written to the devtools console. All
//! functions silently no-op outside a browser.

use retouch_session::SessionError;

/// Shown when apply is clicked before an image is loaded.
pub const APPLY_WITHOUT_IMAGE: &str = "Please upload an image first!";

/// Shown when download is clicked before an image is loaded.
pub const DOWNLOAD_WITHOUT_IMAGE: &str = "No image to download!";

/// Shown when the processing service fails.
pub const PROCESSING_FAILED: &str = "Error editing image!";

/// Shown when apply is clicked while a request is outstanding.
pub const STILL_PROCESSING: &str = "Still processing the previous edit.";

/// Shown when the browser refuses to start a download.
pub const DOWNLOAD_FAILED: &str = "Download failed!";

/// User-facing text for a failed apply.
#[must_use]
pub const fn apply_failure_message(err: &SessionError) -> &'static str {
    match err {
        SessionError::MissingImage => APPLY_WITHOUT_IMAGE,
        SessionError::Busy => STILL_PROCESSING,
        SessionError::Encode(_) | SessionError::Processing(_) => PROCESSING_FAILED,
    }
}

/// User-facing text for a failed download.
#[must_use]
pub const fn download_failure_message(err: &SessionError) -> &'static str {
    match err {
        SessionError::MissingImage => DOWNLOAD_WITHOUT_IMAGE,
        _ => DOWNLOAD_FAILED,
    }
}

/// Show a blocking alert dialog.
pub fn alert(message: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let _ = window.alert_with_message(message);
}

/// Log an error with context to the devtools console.
pub fn log_error(context: &str, err: &dyn std::error::Error) {
    if web_sys::window().is_none() {
        return;
    }
    web_sys::console::error_1(&format!("{context}: {err}").into());
}

/// Log the cause and alert the user about a failed apply.
pub fn apply_failed(err: &SessionError) {
    log_error("apply failed", err);
    alert(apply_failure_message(err));
}

/// Log the cause and alert the user about a failed download.
pub fn download_failed(err: &SessionError) {
    log_error("download failed", err);
    alert(download_failure_message(err));
}
