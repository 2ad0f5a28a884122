//! Apply, cancel, and download buttons.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdDownload, LdWand, LdX};

/// Props for the [`ActionBar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ActionBarProps {
    /// Whether a request is outstanding. Swaps apply for cancel.
    processing: bool,
    on_apply: EventHandler<()>,
    on_cancel: EventHandler<()>,
    on_download: EventHandler<()>,
}

/// The apply and download buttons.
///
/// Both stay enabled without an image so the click can explain what is
/// missing. While a request is in flight, apply is replaced by a cancel
/// button that abandons it.
#[component]
pub fn ActionBar(props: ActionBarProps) -> Element {
    let on_apply = props.on_apply;
    let on_cancel = props.on_cancel;
    let on_download = props.on_download;

    rsx! {
        div { class: "button-row",
            if props.processing {
                button {
                    class: "btn",
                    title: "Abandon the running request",
                    onclick: move |_| on_cancel.call(()),
                    Icon { width: 16, height: 16, icon: LdX }
                    span { "Cancel" }
                }
            } else {
                button {
                    class: "btn btn-primary",
                    onclick: move |_| on_apply.call(()),
                    Icon { width: 16, height: 16, icon: LdWand }
                    span { "Apply Filters" }
                }
            }
            button {
                class: "btn",
                onclick: move |_| on_download.call(()),
                Icon { width: 16, height: 16, icon: LdDownload }
                span { "Download" }
            }
        }
    }
}
