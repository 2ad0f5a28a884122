use std::rc::Rc;

use dioxus::prelude::*;
use retouch_io::{
    ActionBar, BlobUrl, FetchService, FileUpload, FilterControls, ImagePreview, SignalSession,
    download, notify,
};
use retouch_session::{ApplyOutcome, Command, Coordinator, EditSession, ImageBlob};

fn main() {
    dioxus::launch(app);
}

/// Object URL for the preview, or `None` if the browser refused one.
fn preview_url(image: &ImageBlob) -> Option<Rc<BlobUrl>> {
    match BlobUrl::new(image) {
        Ok(url) => Some(Rc::new(url)),
        Err(e) => {
            notify::log_error("preview failed", &e);
            None
        }
    }
}

/// Root application component.
///
/// Owns the page's single [`EditSession`] in a signal and wires the
/// upload, controls, preview, and action components to it. The preview
/// URL is refreshed whenever the session image is replaced.
fn app() -> Element {
    let mut session = use_signal(EditSession::new);
    let handle = SignalSession(session);
    let coordinator = use_hook(|| Rc::new(Coordinator::new(FetchService::default())));
    let mut preview = use_signal(|| Option::<Rc<BlobUrl>>::None);

    let on_upload = move |image: ImageBlob| {
        preview.set(preview_url(&image));
        session.write().dispatch(Command::LoadImage(Some(image)));
    };

    let on_command = move |command: Command| {
        session.write().dispatch(command);
    };

    let on_apply = move |()| {
        let coordinator = Rc::clone(&coordinator);
        spawn(async move {
            match coordinator.apply(&handle).await {
                Ok(ApplyOutcome::Applied(image)) => preview.set(preview_url(&image)),
                Ok(ApplyOutcome::Superseded | ApplyOutcome::Cancelled) => {}
                Err(err) => notify::apply_failed(&err),
            }
        });
    };

    let on_cancel = move |()| {
        session.write().cancel_request();
    };

    let on_download = move |()| {
        let export = retouch_session::download(&session.read());
        match export {
            Ok(export) => {
                if let Err(err) = download::save(&export) {
                    notify::log_error("download failed", &err);
                    notify::alert(notify::DOWNLOAD_FAILED);
                }
            }
            Err(err) => notify::download_failed(&err),
        }
    };

    let options = *session.read().options();
    let processing = session.read().is_requesting();

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        div { class: "page",
            header { class: "page-header",
                h1 { "retouch" }
                p { class: "text-secondary",
                    "Adjust filters, apply them on the server, and keep editing the result"
                }
            }

            main { class: "page-body",
                div { class: "column column-wide",
                    ImagePreview { url: preview(), processing }
                }

                div { class: "column",
                    FileUpload { on_upload }
                    FilterControls { options, on_command }
                    ActionBar {
                        processing,
                        on_apply,
                        on_cancel,
                        on_download,
                    }
                }
            }
        }
    }
}
