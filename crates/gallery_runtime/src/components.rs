//! Gallery UI composition: grid, image cards, lightbox, and status banners.

mod banners;
mod grid;
mod image_card;
mod lightbox;

use leptos::*;

use self::{
    banners::{CredentialBanner, InitialLoadError},
    grid::GalleryGrid,
    lightbox::Lightbox,
};

use crate::reducer::GalleryAction;

pub use crate::runtime_context::{use_gallery_runtime, GalleryProvider, GalleryRuntimeContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellBody {
    InitialLoading,
    InitialError,
    AwaitingCredential,
    Empty,
    Grid,
}

#[component]
/// Top-level gallery view. Starts the session and switches between loading, error, empty, and grid
/// bodies.
pub fn GalleryShell() -> impl IntoView {
    let runtime = use_gallery_runtime();
    let state = runtime.state;

    runtime.dispatch_action(GalleryAction::SessionStarted);

    let body = create_memo(move |_| {
        state.with(|gallery| {
            if gallery
                .load_failure
                .as_ref()
                .is_some_and(|failure| failure.during_initial_load)
            {
                ShellBody::InitialError
            } else if !gallery.collection.initial_loaded() && !gallery.credential.is_active() {
                ShellBody::AwaitingCredential
            } else if !gallery.collection.initial_loaded() {
                ShellBody::InitialLoading
            } else if gallery.collection.is_empty() {
                ShellBody::Empty
            } else {
                ShellBody::Grid
            }
        })
    });
    let item_count = Signal::derive(move || state.with(|gallery| gallery.collection.len()));

    view! {
        <div class="gallery-shell" data-ui-kind="gallery-root">
            <header class="gallery-header">
                <h1>"Gallery"</h1>
                <span class="gallery-count" aria-live="polite">
                    {move || match item_count.get() {
                        1 => "1 image".to_string(),
                        count => format!("{count} images"),
                    }}
                </span>
                <button
                    type="button"
                    class="gallery-reload"
                    on:click=move |_| runtime.dispatch_action(GalleryAction::Reload)
                >
                    "Reload"
                </button>
            </header>
            <CredentialBanner />
            {move || match body.get() {
                ShellBody::InitialLoading => view! {
                    <div class="gallery-status" role="status">"Loading images…"</div>
                }
                .into_view(),
                ShellBody::InitialError => view! { <InitialLoadError /> }.into_view(),
                ShellBody::AwaitingCredential => ().into_view(),
                ShellBody::Empty => view! {
                    <div class="gallery-status" role="status">"No images found."</div>
                }
                .into_view(),
                ShellBody::Grid => view! { <GalleryGrid /> }.into_view(),
            }}
            <Lightbox />
        </div>
    }
}
