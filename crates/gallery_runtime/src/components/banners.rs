use leptos::*;

use crate::{reducer::GalleryAction, runtime_context::use_gallery_runtime};

#[component]
/// Expiry banner with the refresh button. Listing and refresh errors are shown separately.
pub(super) fn CredentialBanner() -> impl IntoView {
    let runtime = use_gallery_runtime();
    let state = runtime.state;
    let visible = Signal::derive(move || state.with(|gallery| !gallery.credential.is_active()));
    let refreshing = Signal::derive(move || state.with(|gallery| gallery.credential.is_refreshing()));
    let fetch_pending = Signal::derive(move || state.with(|gallery| gallery.in_flight.is_some()));
    let refresh_error = Signal::derive(move || {
        state.with(|gallery| {
            gallery
                .credential
                .refresh_error()
                .map(|err| err.to_string())
        })
    });

    view! {
        <Show when=move || visible.get() fallback=|| ()>
            <div class="gallery-banner" role="alert" data-ui-kind="credential-banner">
                <p>"Access to the image store has expired."</p>
                <Show when=move || refresh_error.get().is_some() fallback=|| ()>
                    <p class="gallery-banner-detail">
                        "Refreshing access failed: " {move || refresh_error.get().unwrap_or_default()}
                    </p>
                </Show>
                <button
                    type="button"
                    disabled=move || refreshing.get() || fetch_pending.get()
                    on:click=move |_| runtime.dispatch_action(GalleryAction::RefreshCredential)
                >
                    {move || if refreshing.get() { "Refreshing…" } else { "Refresh access" }}
                </button>
            </div>
        </Show>
    }
}

#[component]
/// Full-page error for a failed initial load.
pub(super) fn InitialLoadError() -> impl IntoView {
    let runtime = use_gallery_runtime();
    let message = Signal::derive(move || {
        runtime.state.with(|gallery| {
            gallery
                .load_failure
                .as_ref()
                .map(|failure| failure.error.to_string())
                .unwrap_or_default()
        })
    });

    view! {
        <div class="gallery-error" role="alert">
            <h2>"Could not load images"</h2>
            <p>{move || message.get()}</p>
            <button
                type="button"
                on:click=move |_| runtime.dispatch_action(GalleryAction::RetryLoad)
            >
                "Try again"
            </button>
        </div>
    }
}

#[component]
/// Boundary indicator below the grid: spinner while the next page loads, inline retry when it
/// failed. Prior pages stay rendered.
pub(super) fn LoadMoreStatus() -> impl IntoView {
    let runtime = use_gallery_runtime();
    let state = runtime.state;
    let loading = Signal::derive(move || {
        state.with(|gallery| gallery.collection.initial_loaded() && gallery.in_flight.is_some())
    });
    let failure = Signal::derive(move || {
        state.with(|gallery| {
            gallery
                .load_failure
                .as_ref()
                .filter(|failure| !failure.during_initial_load)
                .map(|failure| failure.error.to_string())
        })
    });
    let exhausted = Signal::derive(move || {
        state.with(|gallery| {
            gallery.collection.initial_loaded()
                && !gallery.collection.has_more()
                && gallery.in_flight.is_none()
        })
    });

    view! {
        <div class="gallery-load-more" aria-live="polite">
            {move || {
                if let Some(message) = failure.get() {
                    view! {
                        <div class="gallery-load-more-error" role="alert">
                            <span>{format!("Loading more images failed: {message}")}</span>
                            <button
                                type="button"
                                on:click=move |_| runtime.dispatch_action(GalleryAction::RetryLoad)
                            >
                                "Retry"
                            </button>
                        </div>
                    }
                    .into_view()
                } else if loading.get() {
                    view! { <div class="gallery-load-more-spinner" role="status">"Loading more…"</div> }
                        .into_view()
                } else if exhausted.get() {
                    view! { <div class="gallery-load-more-end">"All images loaded"</div> }.into_view()
                } else {
                    ().into_view()
                }
            }}
        </div>
    }
}
