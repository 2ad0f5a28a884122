//! Turns the session's state into a processing request and applies the
//! result, and prepares exports of the current image.

use std::cell::RefCell;

use crate::cancel::CancelToken;
use crate::request::ProcessRequest;
use crate::session::{ApplyOutcome, EditSession};
use crate::types::{ImageBlob, ServiceError, SessionError};

/// File stem used for downloads.
pub const EXPORT_STEM: &str = "edited-image";

/// The remote image-processing endpoint.
///
/// Implementations perform exactly one request/response exchange per call
/// and map any non-OK status to [`ServiceError::Status`]. They may consult
/// `cancel` and return [`ServiceError::Cancelled`] early.
#[allow(async_fn_in_trait)] // futures stay on one thread
pub trait ProcessingService {
    async fn process(
        &self,
        request: &ProcessRequest,
        cancel: &CancelToken,
    ) -> Result<ImageBlob, ServiceError>;
}

/// Interior-mutable access to an [`EditSession`].
///
/// [`Coordinator::apply`] only borrows the session inside `update`, never
/// across the service call, so UI events keep mutating it while a request
/// is in flight.
pub trait SessionHandle {
    fn update<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> R;
}

impl SessionHandle for RefCell<EditSession> {
    fn update<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> R {
        f(&mut *self.borrow_mut())
    }
}

/// Drives processing requests against a [`ProcessingService`].
#[derive(Debug)]
pub struct Coordinator<S> {
    service: S,
}

impl<S: ProcessingService> Coordinator<S> {
    #[must_use]
    pub const fn new(service: S) -> Self {
        Self { service }
    }

    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Send the current image and options to the service and fold the
    /// response back into the session.
    ///
    /// No service call is made when the preconditions fail.
    ///
    /// # Errors
    ///
    /// - [`SessionError::MissingImage`] if no image is loaded.
    /// - [`SessionError::Busy`] if a request is already in flight.
    /// - [`SessionError::Processing`] if the service failed; the image is
    ///   left unchanged.
    #[allow(clippy::future_not_send)]
    pub async fn apply<H>(&self, session: &H) -> Result<ApplyOutcome, SessionError>
    where
        H: SessionHandle + ?Sized,
    {
        let pending = session.update(EditSession::begin_apply)?;
        let result = self
            .service
            .process(pending.request(), pending.cancel_token())
            .await;
        session.update(|session| session.finish_apply(pending, result))
    }
}

/// A save action for the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportAction {
    filename: String,
    image: ImageBlob,
}

impl ExportAction {
    /// Suggested download file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Content type of the exported bytes.
    #[must_use]
    pub fn mime(&self) -> &str {
        self.image.mime()
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.image.bytes()
    }

    /// The exported image, sharing bytes with the session.
    #[must_use]
    pub const fn image(&self) -> &ImageBlob {
        &self.image
    }
}

/// Prepare a download of the session's current image.
///
/// Purely an export: the service is not contacted.
///
/// # Errors
///
/// Returns [`SessionError::MissingImage`] if no image is loaded.
pub fn download(session: &EditSession) -> Result<ExportAction, SessionError> {
    let image = session
        .current_image()
        .cloned()
        .ok_or(SessionError::MissingImage)?;
    let filename = format!("{EXPORT_STEM}.{}", extension_for_mime(image.mime()));
    Ok(ExportAction { filename, image })
}

/// File extension for an image content type, defaulting to `png`.
fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "png",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::request::response_image;
    use crate::session::Command;

    /// Replies with a fixed result and counts calls.
    struct FixedService {
        reply: Result<Vec<u8>, ServiceError>,
        calls: Cell<usize>,
    }

    impl FixedService {
        fn ok(bytes: &[u8]) -> Self {
            Self {
                reply: Ok(bytes.to_vec()),
                calls: Cell::new(0),
            }
        }

        fn err(err: ServiceError) -> Self {
            Self {
                reply: Err(err),
                calls: Cell::new(0),
            }
        }
    }

    impl ProcessingService for FixedService {
        async fn process(
            &self,
            _request: &ProcessRequest,
            _cancel: &CancelToken,
        ) -> Result<ImageBlob, ServiceError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone().map(response_image)
        }
    }

    fn session_with(bytes: &[u8], mime: &str) -> RefCell<EditSession> {
        let mut session = EditSession::new();
        session.dispatch(Command::LoadImage(Some(ImageBlob::new(
            bytes.to_vec(),
            "input",
            mime,
        ))));
        RefCell::new(session)
    }

    #[test]
    fn apply_without_image_never_calls_service() {
        let coordinator = Coordinator::new(FixedService::ok(b"out"));
        let session = RefCell::new(EditSession::new());

        let result = pollster::block_on(coordinator.apply(&session));

        assert!(matches!(result, Err(SessionError::MissingImage)));
        assert_eq!(coordinator.service().calls.get(), 0);
    }

    #[test]
    fn apply_success_replaces_image() {
        let coordinator = Coordinator::new(FixedService::ok(b"processed"));
        let session = session_with(b"original", "image/png");

        let outcome = pollster::block_on(coordinator.apply(&session)).unwrap();

        let current = session.borrow().current_image().cloned().unwrap();
        assert_eq!(current.bytes(), b"processed");
        assert_eq!(outcome, ApplyOutcome::Applied(current));
        assert_eq!(coordinator.service().calls.get(), 1);
        assert!(!session.borrow().is_requesting());
    }

    #[test]
    fn apply_failure_keeps_image_reference() {
        let coordinator = Coordinator::new(FixedService::err(ServiceError::Status(503)));
        let session = session_with(b"original", "image/png");
        let before = session.borrow().current_image().cloned().unwrap();

        let result = pollster::block_on(coordinator.apply(&session));

        assert!(matches!(
            result,
            Err(SessionError::Processing(ServiceError::Status(503)))
        ));
        assert!(session.borrow().current_image().unwrap().ptr_eq(&before));
        assert!(!session.borrow().is_requesting());
    }

    #[test]
    fn download_references_current_bytes() {
        let session = session_with(b"pixels", "image/png");
        let session = session.borrow();

        let export = download(&session).unwrap();

        assert_eq!(export.filename(), "edited-image.png");
        assert_eq!(export.mime(), "image/png");
        assert_eq!(export.bytes(), b"pixels");
        assert!(export.image().ptr_eq(session.current_image().unwrap()));
    }

    #[test]
    fn download_uses_extension_of_current_format() {
        let session = session_with(b"jpeg", "image/jpeg");
        let export = download(&session.borrow()).unwrap();
        assert_eq!(export.filename(), "edited-image.jpg");
    }

    #[test]
    fn download_without_image_fails() {
        let session = EditSession::new();
        assert!(matches!(download(&session), Err(SessionError::MissingImage)));
    }

    #[test]
    fn unknown_mime_exports_as_png() {
        assert_eq!(extension_for_mime("application/octet-stream"), "png");
    }
}
