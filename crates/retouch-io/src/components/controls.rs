//! Filter parameter controls.
//!
//! One range slider per scalar option plus the rotate and flip buttons.
//! Every input is forwarded as a [`Command`] without debouncing, in the
//! order the browser delivers it.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdArrowLeftRight, LdRotateCw};
use retouch_session::{Command, FilterOption, FilterOptions};

/// Props for the [`FilterControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FilterControlsProps {
    /// Current options (read-only).
    options: FilterOptions,
    /// Fired for every slider movement and button press.
    on_command: EventHandler<Command>,
}

/// Sliders for brightness, contrast, and grayscale, and buttons for
/// rotate-by-90 and flip.
#[component]
pub fn FilterControls(props: FilterControlsProps) -> Element {
    let options = props.options;
    let on_command = props.on_command;
    let rotate = options.rotate;
    let flip_label = if options.flip { "On" } else { "Off" };

    rsx! {
        div { class: "panel controls",
            for option in FilterOption::ALL {
                {render_slider(option, options.get(option), move |v: f64| {
                    on_command.call(Command::SetOption(option, v));
                })}
            }

            div { class: "button-row",
                button {
                    class: "btn",
                    title: "Rotate 90° clockwise",
                    onclick: move |_| on_command.call(Command::RotateClockwise),
                    Icon { width: 16, height: 16, icon: LdRotateCw }
                    span { "Rotate" }
                    span { class: "badge tabular", "{rotate}°" }
                }
                button {
                    class: "btn",
                    title: "Mirror horizontally",
                    onclick: move |_| on_command.call(Command::ToggleFlip),
                    Icon { width: 16, height: 16, icon: LdArrowLeftRight }
                    span { "Flip" }
                    span { class: "badge", "{flip_label}" }
                }
            }
        }
    }
}

/// Render a labeled range slider for one option.
fn render_slider(option: FilterOption, value: f64, on_input: impl Fn(f64) + 'static) -> Element {
    let id = option.name();
    let label = option.label();
    let range = option.range();
    let min = *range.start();
    let max = *range.end();
    let display = format!("{value:.0}%");

    rsx! {
        div { class: "slider",
            div { class: "slider-header",
                label { r#for: "{id}", "{label}" }
                span { class: "text-secondary tabular", "{display}" }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "{min}",
                max: "{max}",
                step: "1",
                value: "{value}",
                oninput: move |e| {
                    match e.value().parse::<f64>() {
                        Ok(v) => on_input(v),
                        Err(err) => {
                            web_sys::console::warn_1(
                                &format!("slider parse failure: {err:?} from {:?}", e.value())
                                    .into(),
                            );
                        }
                    }
                },
            }
        }
    }
}
