//! Session access through a Dioxus signal.

use dioxus::prelude::*;
use retouch_session::{EditSession, SessionHandle};

/// An [`EditSession`] owned by a component signal.
///
/// Every update goes through `Signal::write`, so components reading the
/// session re-render after each command or request transition.
#[derive(Clone, Copy, PartialEq)]
pub struct SignalSession(pub Signal<EditSession>);

impl SessionHandle for SignalSession {
    fn update<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> R {
        let mut signal = self.0;
        let mut session = signal.write();
        f(&mut *session)
    }
}
