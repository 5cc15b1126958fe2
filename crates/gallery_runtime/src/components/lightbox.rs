use leptos::*;

use crate::{
    reducer::GalleryAction,
    runtime_context::use_gallery_runtime,
    viewer::{format_file_size, position_label},
};

#[derive(Debug, Clone, PartialEq)]
struct LightboxView {
    name: String,
    url: String,
    position: String,
    file_size: String,
    modified: Option<String>,
    has_prev: bool,
    has_next: bool,
}

#[component]
/// Full-screen viewer for the open item with keyboard navigation, zoom, and pan.
pub(super) fn Lightbox() -> impl IntoView {
    let runtime = use_gallery_runtime();
    let state = runtime.state;
    let current = create_memo(move |_| {
        state.with(|gallery| {
            let index = gallery.navigation.open_index()?;
            let item = gallery.collection.get(index)?;
            let len = gallery.collection.len();
            Some(LightboxView {
                name: item.display_name().to_string(),
                url: gallery.urls_for(item).display_url,
                position: position_label(index, len),
                file_size: item.byte_size.map(format_file_size).unwrap_or_default(),
                modified: item
                    .last_modified
                    .map(|modified| modified.format("%Y-%m-%d %H:%M UTC").to_string()),
                has_prev: gallery.navigation.has_prev(),
                has_next: gallery.navigation.has_next(len),
            })
        })
    });
    let transform = Signal::derive(move || state.with(|gallery| gallery.viewer.css_transform()));
    let zoom_label = Signal::derive(move || state.with(|gallery| gallery.viewer.zoom_label()));
    let cursor = Signal::derive(move || {
        state.with(|gallery| {
            if gallery.viewer.is_dragging() {
                "grabbing"
            } else if gallery.viewer.zoom > 1.0 {
                "grab"
            } else {
                "zoom-in"
            }
        })
    });

    let keyboard_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || current.get_untracked().is_none() {
            return;
        }
        let action = match ev.key().as_str() {
            "Escape" => GalleryAction::CloseLightbox,
            "ArrowLeft" => GalleryAction::PrevItem,
            "ArrowRight" => GalleryAction::NextItem,
            _ => return,
        };
        ev.prevent_default();
        ev.stop_propagation();
        runtime.dispatch_action(action);
    });
    on_cleanup(move || keyboard_listener.remove());

    let end_drag = move |_| runtime.dispatch_action(GalleryAction::ViewerDragEnd);

    view! {
        <Show when=move || current.with(Option::is_some) fallback=|| ()>
            <div
                class="gallery-lightbox"
                role="dialog"
                aria-modal="true"
                aria-label=move || {
                    current.with(|view| {
                        view.as_ref()
                            .map(|view| format!("Image viewer: {}", view.name))
                            .unwrap_or_default()
                    })
                }
                on:click=move |ev| {
                    if ev.target() == ev.current_target() {
                        runtime.dispatch_action(GalleryAction::CloseLightbox);
                    }
                }
            >
                <header class="gallery-lightbox-header">
                    <div class="gallery-lightbox-title">
                        <h2>{move || current.with(|view| view.as_ref().map(|view| view.name.clone()))}</h2>
                        <span>{move || current.with(|view| view.as_ref().map(|view| view.position.clone()))}</span>
                        <span>{move || current.with(|view| view.as_ref().map(|view| view.file_size.clone()))}</span>
                        <span>
                            {move || current.with(|view| view.as_ref().and_then(|view| view.modified.clone()))}
                        </span>
                    </div>
                    <div class="gallery-lightbox-actions">
                        <Show when=move || zoom_label.get().is_some() fallback=|| ()>
                            <span class="gallery-zoom-label">{move || zoom_label.get()}</span>
                        </Show>
                        <button
                            type="button"
                            on:click=move |_| runtime.dispatch_action(GalleryAction::OpenOriginal)
                        >
                            "Open original"
                        </button>
                        <button
                            type="button"
                            aria-label="Close viewer"
                            on:click=move |_| runtime.dispatch_action(GalleryAction::CloseLightbox)
                        >
                            "×"
                        </button>
                    </div>
                </header>
                <button
                    type="button"
                    class="gallery-lightbox-prev"
                    aria-label="Previous image"
                    disabled=move || !current.with(|view| view.as_ref().is_some_and(|view| view.has_prev))
                    on:click=move |_| runtime.dispatch_action(GalleryAction::PrevItem)
                >
                    "‹"
                </button>
                <div class="gallery-lightbox-stage">
                    <img
                        src=move || current.with(|view| view.as_ref().map(|view| view.url.clone()))
                        alt=move || current.with(|view| view.as_ref().map(|view| view.name.clone()))
                        draggable="false"
                        style=move || format!(
                            "transform:{};cursor:{};",
                            transform.get(),
                            cursor.get()
                        )
                        on:wheel=move |ev| {
                            ev.prevent_default();
                            runtime.dispatch_action(GalleryAction::ViewerWheel { delta_y: ev.delta_y() });
                        }
                        on:click=move |_| runtime.dispatch_action(GalleryAction::ViewerToggleZoom)
                        on:pointerdown=move |ev| {
                            runtime.dispatch_action(GalleryAction::ViewerDragStart {
                                x: f64::from(ev.client_x()),
                                y: f64::from(ev.client_y()),
                            });
                        }
                        on:pointermove=move |ev| {
                            if state.with_untracked(|gallery| gallery.viewer.is_dragging()) {
                                runtime.dispatch_action(GalleryAction::ViewerDragMove {
                                    x: f64::from(ev.client_x()),
                                    y: f64::from(ev.client_y()),
                                });
                            }
                        }
                        on:pointerup=end_drag
                        on:pointerleave=end_drag
                        on:pointercancel=end_drag
                    />
                </div>
                <button
                    type="button"
                    class="gallery-lightbox-next"
                    aria-label="Next image"
                    disabled=move || !current.with(|view| view.as_ref().is_some_and(|view| view.has_next))
                    on:click=move |_| runtime.dispatch_action(GalleryAction::NextItem)
                >
                    "›"
                </button>
            </div>
        </Show>
    }
}
