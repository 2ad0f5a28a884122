//! The edit session: one replaceable image plus the current filter options.
//!
//! All UI mutation goes through [`EditSession::dispatch`]. Processing is
//! split into two synchronous halves, [`EditSession::begin_apply`] and
//! [`EditSession::finish_apply`], so the session is never borrowed while
//! the service call is suspended. [`crate::Coordinator`] composes them.
//!
//! # Request lifecycle
//!
//! ```text
//! Idle --begin_apply--> Requesting --finish_apply--> Idle
//! ```
//!
//! While `Requesting`, a second `begin_apply` fails with
//! [`SessionError::Busy`]. Loading a new image during a request bumps the
//! image generation, and the late response is discarded as
//! [`ApplyOutcome::Superseded`].

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::request::ProcessRequest;
use crate::types::{FilterOption, FilterOptions, ImageBlob, ServiceError, SessionError};

/// A single UI mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A file was picked. `None` means the picker closed empty.
    LoadImage(Option<ImageBlob>),
    SetBrightness(f64),
    SetContrast(f64),
    SetGrayscale(f64),
    SetOption(FilterOption, f64),
    RotateClockwise,
    ToggleFlip,
}

/// Whether a processing request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Requesting,
}

/// How a finished request affected the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response replaced the session image; this is the new image.
    Applied(ImageBlob),
    /// A different image was loaded while the request was in flight, so
    /// the response was dropped.
    Superseded,
    /// The request was cancelled; the response, if any, was dropped.
    Cancelled,
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    cancel: CancelToken,
}

/// A request handed out by [`EditSession::begin_apply`].
///
/// Must be returned to [`EditSession::finish_apply`] with the service
/// result. Deliberately not `Clone`.
#[derive(Debug)]
pub struct PendingApply {
    id: u64,
    generation: u64,
    request: ProcessRequest,
    cancel: CancelToken,
}

impl PendingApply {
    #[must_use]
    pub const fn request(&self) -> &ProcessRequest {
        &self.request
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// Client-held state for one image-editing interaction.
#[derive(Debug, Default)]
pub struct EditSession {
    current_image: Option<ImageBlob>,
    options: FilterOptions,
    in_flight: Option<InFlight>,
    image_generation: u64,
    next_request_id: u64,
}

impl EditSession {
    /// A fresh session: default options, no image, idle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current_image(&self) -> Option<&ImageBlob> {
        self.current_image.as_ref()
    }

    #[must_use]
    pub const fn options(&self) -> &FilterOptions {
        &self.options
    }

    #[must_use]
    pub const fn request_state(&self) -> RequestState {
        if self.in_flight.is_some() {
            RequestState::Requesting
        } else {
            RequestState::Idle
        }
    }

    #[must_use]
    pub const fn is_requesting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Incremented every time the image is replaced.
    #[must_use]
    pub const fn image_generation(&self) -> u64 {
        self.image_generation
    }

    /// Apply one UI mutation.
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::LoadImage(file) => self.load_image(file),
            Command::SetBrightness(value) => self.set_option(FilterOption::Brightness, value),
            Command::SetContrast(value) => self.set_option(FilterOption::Contrast, value),
            Command::SetGrayscale(value) => self.set_option(FilterOption::Grayscale, value),
            Command::SetOption(option, value) => self.set_option(option, value),
            Command::RotateClockwise => self.increment_rotation(),
            Command::ToggleFlip => self.toggle_flip(),
        }
    }

    /// Replace the current image with a freshly picked file.
    ///
    /// `None` is a no-op. The bytes are held as-is.
    pub fn load_image(&mut self, file: Option<ImageBlob>) {
        let Some(image) = file else {
            return;
        };
        debug!(name = image.name(), bytes = image.len(), "image loaded");
        self.replace_image(image);
    }

    /// Update one scalar option, clamped to its range.
    ///
    /// Non-finite input is ignored with a warning.
    pub fn set_option(&mut self, option: FilterOption, value: f64) {
        if self.options.set(option, value).is_none() {
            warn!(%option, value, "ignoring non-finite option value");
        }
    }

    /// Add 90 degrees of rotation. Never wraps at 360.
    pub const fn increment_rotation(&mut self) {
        self.options.rotate_clockwise();
    }

    pub const fn toggle_flip(&mut self) {
        self.options.flip = !self.options.flip;
    }

    /// Copy of the current options, unaffected by later mutation.
    #[must_use]
    pub const fn snapshot_options(&self) -> FilterOptions {
        self.options
    }

    /// Start a processing request.
    ///
    /// # Errors
    ///
    /// - [`SessionError::MissingImage`] if no image is loaded.
    /// - [`SessionError::Busy`] if a request is already outstanding.
    /// - [`SessionError::Encode`] if the options cannot be serialized.
    pub fn begin_apply(&mut self) -> Result<PendingApply, SessionError> {
        let image = self
            .current_image
            .clone()
            .ok_or(SessionError::MissingImage)?;
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }

        let request = ProcessRequest::new(image, self.snapshot_options())?;
        let id = self.next_request_id;
        self.next_request_id += 1;
        let cancel = CancelToken::new();
        self.in_flight = Some(InFlight {
            id,
            cancel: cancel.clone(),
        });

        debug!(
            request = id,
            generation = self.image_generation,
            options = request.options_json(),
            "processing request started"
        );

        Ok(PendingApply {
            id,
            generation: self.image_generation,
            request,
            cancel,
        })
    }

    /// Settle a request started by [`begin_apply`](Self::begin_apply).
    ///
    /// On success the session image is replaced by the service output
    /// (unless the request was superseded or cancelled). Options are never
    /// touched, so further edits stack on top of the processed image.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Processing`] if the service failed. The
    /// session image is left unchanged.
    pub fn finish_apply(
        &mut self,
        pending: PendingApply,
        result: Result<ImageBlob, ServiceError>,
    ) -> Result<ApplyOutcome, SessionError> {
        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.id == pending.id)
        {
            self.in_flight = None;
        }

        if pending.cancel.is_cancelled() || matches!(result, Err(ServiceError::Cancelled)) {
            debug!(request = pending.id, "processing request cancelled");
            return Ok(ApplyOutcome::Cancelled);
        }

        let image = result.map_err(|err| {
            warn!(request = pending.id, error = %err, "processing request failed");
            SessionError::Processing(err)
        })?;

        if pending.generation != self.image_generation {
            debug!(
                request = pending.id,
                started = pending.generation,
                current = self.image_generation,
                "discarding response for a replaced image"
            );
            return Ok(ApplyOutcome::Superseded);
        }

        debug!(request = pending.id, bytes = image.len(), "processing request applied");
        self.replace_image(image.clone());
        Ok(ApplyOutcome::Applied(image))
    }

    /// Cancel the outstanding request, if any, and release the in-flight
    /// guard so a new request can start immediately.
    ///
    /// Returns `true` if a request was cancelled.
    pub fn cancel_request(&mut self) -> bool {
        self.in_flight.take().is_some_and(|in_flight| {
            debug!(request = in_flight.id, "cancelling processing request");
            in_flight.cancel.cancel();
            true
        })
    }

    fn replace_image(&mut self, image: ImageBlob) {
        self.current_image = Some(image);
        self.image_generation += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::response_image;

    fn image(tag: u8) -> ImageBlob {
        ImageBlob::new(vec![tag; 8], format!("i{tag}.png"), "image/png")
    }

    fn loaded(tag: u8) -> EditSession {
        let mut session = EditSession::new();
        session.dispatch(Command::LoadImage(Some(image(tag))));
        session
    }

    // --- Mutation ---

    #[test]
    fn new_session_is_empty_and_idle() {
        let session = EditSession::new();
        assert!(session.current_image().is_none());
        assert_eq!(*session.options(), FilterOptions::default());
        assert_eq!(session.request_state(), RequestState::Idle);
        assert_eq!(session.image_generation(), 0);
    }

    #[test]
    fn load_none_is_a_no_op() {
        let mut session = loaded(1);
        let before = session.current_image().cloned().unwrap();
        session.dispatch(Command::LoadImage(None));
        assert!(session.current_image().unwrap().ptr_eq(&before));
        assert_eq!(session.image_generation(), 1);
    }

    #[test]
    fn load_replaces_image_and_keeps_options() {
        let mut session = loaded(1);
        session.dispatch(Command::SetContrast(80.0));
        session.dispatch(Command::LoadImage(Some(image(2))));
        assert_eq!(session.current_image(), Some(&image(2)));
        assert!((session.options().contrast - 80.0).abs() < f64::EPSILON);
        assert_eq!(session.image_generation(), 2);
    }

    #[test]
    fn set_option_is_last_write_wins() {
        let mut session = EditSession::new();
        let writes = [
            (FilterOption::Brightness, 10.0),
            (FilterOption::Grayscale, 40.0),
            (FilterOption::Brightness, 180.0),
            (FilterOption::Contrast, 55.0),
            (FilterOption::Grayscale, 5.0),
        ];
        for (option, value) in writes {
            session.dispatch(Command::SetOption(option, value));
        }
        let options = session.snapshot_options();
        assert!((options.brightness - 180.0).abs() < f64::EPSILON);
        assert!((options.contrast - 55.0).abs() < f64::EPSILON);
        assert!((options.grayscale - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn named_setters_match_set_option() {
        let mut a = EditSession::new();
        let mut b = EditSession::new();
        a.dispatch(Command::SetBrightness(120.0));
        a.dispatch(Command::SetContrast(90.0));
        a.dispatch(Command::SetGrayscale(30.0));
        b.dispatch(Command::SetOption(FilterOption::Brightness, 120.0));
        b.dispatch(Command::SetOption(FilterOption::Contrast, 90.0));
        b.dispatch(Command::SetOption(FilterOption::Grayscale, 30.0));
        assert_eq!(a.snapshot_options(), b.snapshot_options());
    }

    #[test]
    fn non_finite_option_is_ignored() {
        let mut session = EditSession::new();
        session.dispatch(Command::SetBrightness(130.0));
        session.dispatch(Command::SetBrightness(f64::NAN));
        assert!((session.options().brightness - 130.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rotation_accumulates_without_normalizing() {
        let mut session = EditSession::new();
        for n in 1..=9 {
            session.dispatch(Command::RotateClockwise);
            assert_eq!(session.options().rotate, 90 * n);
        }
    }

    #[test]
    fn toggle_flip_alternates() {
        let mut session = EditSession::new();
        session.dispatch(Command::ToggleFlip);
        assert!(session.options().flip);
        session.dispatch(Command::ToggleFlip);
        assert!(!session.options().flip);
    }

    #[test]
    fn snapshot_is_detached_from_later_edits() {
        let mut session = EditSession::new();
        session.dispatch(Command::SetBrightness(150.0));
        let snapshot = session.snapshot_options();
        session.dispatch(Command::SetBrightness(20.0));
        session.dispatch(Command::RotateClockwise);
        assert!((snapshot.brightness - 150.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.rotate, 0);
    }

    // --- Apply lifecycle ---

    #[test]
    fn begin_apply_without_image_fails() {
        let mut session = EditSession::new();
        assert!(matches!(
            session.begin_apply(),
            Err(SessionError::MissingImage)
        ));
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn begin_apply_snapshots_image_and_options() {
        let mut session = loaded(1);
        session.dispatch(Command::SetBrightness(120.0));
        session.dispatch(Command::RotateClockwise);
        let pending = session.begin_apply().unwrap();

        session.dispatch(Command::SetBrightness(10.0));

        let request = pending.request();
        assert!(request.image().ptr_eq(session.current_image().unwrap()));
        assert!((request.options().brightness - 120.0).abs() < f64::EPSILON);
        assert_eq!(request.options().rotate, 90);
        assert_eq!(session.request_state(), RequestState::Requesting);
    }

    #[test]
    fn second_begin_apply_is_busy() {
        let mut session = loaded(1);
        let _pending = session.begin_apply().unwrap();
        assert!(matches!(session.begin_apply(), Err(SessionError::Busy)));
    }

    #[test]
    fn finish_apply_success_replaces_image_and_keeps_options() {
        let mut session = loaded(1);
        session.dispatch(Command::SetBrightness(120.0));
        session.dispatch(Command::RotateClockwise);
        let pending = session.begin_apply().unwrap();
        let returned = response_image(vec![42; 3]);

        let outcome = session.finish_apply(pending, Ok(returned.clone())).unwrap();

        assert_eq!(outcome, ApplyOutcome::Applied(returned.clone()));
        assert!(session.current_image().unwrap().ptr_eq(&returned));
        assert_eq!(session.options().rotate, 90);
        assert!((session.options().brightness - 120.0).abs() < f64::EPSILON);
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn finish_apply_failure_leaves_image_untouched() {
        let mut session = loaded(1);
        let before = session.current_image().cloned().unwrap();
        let pending = session.begin_apply().unwrap();

        let err = session
            .finish_apply(pending, Err(ServiceError::Status(500)))
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Processing(ServiceError::Status(500))
        ));
        assert!(session.current_image().unwrap().ptr_eq(&before));
        assert_eq!(session.image_generation(), 1);
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn failure_allows_retry() {
        let mut session = loaded(1);
        let pending = session.begin_apply().unwrap();
        let _ = session.finish_apply(pending, Err(ServiceError::Transport("reset".into())));
        assert!(session.begin_apply().is_ok());
    }

    #[test]
    fn response_for_replaced_image_is_superseded() {
        let mut session = loaded(1);
        let pending = session.begin_apply().unwrap();
        session.dispatch(Command::LoadImage(Some(image(2))));

        let outcome = session
            .finish_apply(pending, Ok(response_image(vec![3])))
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Superseded);
        assert_eq!(session.current_image(), Some(&image(2)));
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn cancelled_request_releases_guard_and_drops_response() {
        let mut session = loaded(1);
        let before = session.current_image().cloned().unwrap();
        let pending = session.begin_apply().unwrap();

        assert!(session.cancel_request());
        assert!(pending.cancel_token().is_cancelled());
        assert_eq!(session.request_state(), RequestState::Idle);

        let outcome = session
            .finish_apply(pending, Ok(response_image(vec![3])))
            .unwrap();
        assert_eq!(outcome, ApplyOutcome::Cancelled);
        assert!(session.current_image().unwrap().ptr_eq(&before));
    }

    #[test]
    fn stale_finish_does_not_release_a_newer_request() {
        let mut session = loaded(1);
        let first = session.begin_apply().unwrap();
        session.cancel_request();
        let _second = session.begin_apply().unwrap();

        let _ = session.finish_apply(first, Ok(response_image(vec![3])));

        assert_eq!(session.request_state(), RequestState::Requesting);
    }

    #[test]
    fn service_reported_cancellation_is_not_an_error() {
        let mut session = loaded(1);
        let pending = session.begin_apply().unwrap();
        let outcome = session
            .finish_apply(pending, Err(ServiceError::Cancelled))
            .unwrap();
        assert_eq!(outcome, ApplyOutcome::Cancelled);
    }

    #[test]
    fn cancel_without_request_is_false() {
        let mut session = loaded(1);
        assert!(!session.cancel_request());
    }
}
