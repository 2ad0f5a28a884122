//! Preview of the session's current image.

use std::rc::Rc;

use dioxus::prelude::*;

use crate::blob_url::BlobUrl;

/// Props for the [`ImagePreview`] component.
#[derive(Props, Clone)]
pub struct ImagePreviewProps {
    /// Object URL of the current image. `None` shows the placeholder.
    #[props(!optional)]
    url: Option<Rc<BlobUrl>>,
    /// Whether a processing request is outstanding.
    processing: bool,
}

impl PartialEq for ImagePreviewProps {
    fn eq(&self, other: &Self) -> bool {
        let urls_eq = match (&self.url, &other.url) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        urls_eq && self.processing == other.processing
    }
}

/// Shows the current image, dimmed with a notice while processing.
///
/// The rotation and flip chosen in the controls are not simulated here;
/// the preview always shows the bytes the session holds.
#[component]
pub fn ImagePreview(props: ImagePreviewProps) -> Element {
    let Some(url) = props.url else {
        return rsx! {
            div { class: "preview preview-empty",
                p { class: "text-placeholder", "Upload an image to get started" }
            }
        };
    };
    let src = url.as_str().to_owned();
    let image_class = if props.processing {
        "preview-image preview-busy"
    } else {
        "preview-image"
    };

    rsx! {
        div { class: "preview",
            img { class: "{image_class}", src: "{src}", alt: "Preview" }
            if props.processing {
                p { class: "preview-status", "Processing..." }
            }
        }
    }
}
