//! File upload component with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use retouch_session::ImageBlob;

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with the picked file. Not called when the picker closes
    /// without a selection.
    on_upload: EventHandler<ImageBlob>,
}

/// A drag-and-drop zone with a file picker button.
///
/// The picker suggests image files, but whatever file arrives is read and
/// forwarded as-is; the processing service decides what it accepts.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut filename = use_signal(|| Option::<String>::None);
    let mut error = use_signal(|| Option::<String>::None);

    // Shared by the picker and drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        match file.read_bytes().await {
            Ok(bytes) => {
                filename.set(Some(name.clone()));
                error.set(None);
                props.on_upload.call(ImageBlob::from_file(bytes.to_vec(), name));
            }
            Err(e) => {
                error.set(Some(format!("Failed to read file: {e}")));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "upload-zone upload-zone-active"
    } else {
        "upload-zone"
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref name) = filename() {
                p { class: "text-success", "Loaded: {name}" }
            }

            if let Some(ref err) = error() {
                p { class: "text-error", "{err}" }
            }

            p { class: "text-secondary", "Drop an image here or " }

            label { class: "btn btn-primary",
                input {
                    r#type: "file",
                    accept: "image/*",
                    class: "hidden",
                    onchange: handle_files,
                }
                "Choose File"
            }
        }
    }
}
