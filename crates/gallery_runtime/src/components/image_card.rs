use leptos::*;

use crate::{
    card::{is_activation_key, CardImageState},
    host::grid_cell_dom_id,
    model::ItemUrls,
    reducer::GalleryAction,
    runtime_context::use_gallery_runtime,
};

#[derive(Debug, Clone, PartialEq)]
struct CardView {
    name: String,
    urls: ItemUrls,
}

#[component]
/// One grid tile. Lazily loads the thumbnail, falls back to the full image, then to a placeholder.
pub(super) fn ImageCard(index: usize) -> impl IntoView {
    let runtime = use_gallery_runtime();
    let state = runtime.state;
    let card = create_memo(move |_| {
        state.with(|gallery| {
            gallery.collection.get(index).map(|item| CardView {
                name: item.display_name().to_string(),
                urls: gallery.urls_for(item),
            })
        })
    });
    let has_thumbnail = card.with_untracked(|view| {
        view.as_ref()
            .is_some_and(|view| view.urls.thumb_url.is_some())
    });
    let image = create_rw_signal(CardImageState::new(has_thumbnail));
    let urls = create_memo(move |_| card.with(|view| view.as_ref().map(|view| view.urls.clone())));
    create_effect(move |previous: Option<Option<ItemUrls>>| {
        let current = urls.get();
        if previous.is_some_and(|previous| previous != current) {
            let has_thumbnail = current
                .as_ref()
                .is_some_and(|urls| urls.thumb_url.is_some());
            image.update(|state| state.restart(has_thumbnail));
        }
        current
    });
    let roving_focus =
        Signal::derive(move || state.with(|gallery| gallery.grid_focus.unwrap_or(0) == index));

    let open = move || runtime.dispatch_action(GalleryAction::OpenItem { index });
    let name = Signal::derive(move || {
        card.with(|view| view.as_ref().map(|view| view.name.clone()).unwrap_or_default())
    });

    view! {
        <div
            id=grid_cell_dom_id(index)
            class="gallery-card"
            role="button"
            tabindex=move || if roving_focus.get() { "0" } else { "-1" }
            aria-label=move || format!("View image {}", name.get())
            data-loading=move || image.get().loading.to_string()
            on:click=move |_| open()
            on:keydown=move |ev| {
                if is_activation_key(&ev.key()) {
                    ev.prevent_default();
                    open();
                }
            }
            on:focus=move |_| runtime.dispatch_action(GalleryAction::GridFocused { index })
        >
            {move || {
                let current = card.with(|view| {
                    view.as_ref().and_then(|view| {
                        image
                            .get()
                            .current_url(&view.urls.display_url, view.urls.thumb_url.as_deref())
                            .map(str::to_string)
                    })
                });
                match current {
                    Some(src) => view! {
                        <img
                            src=src
                            alt=move || name.get()
                            loading="lazy"
                            decoding="async"
                            on:load=move |_| image.update(|state| state.on_load())
                            on:error=move |_| image.update(|state| state.on_error())
                        />
                    }
                    .into_view(),
                    None => view! {
                        <div class="gallery-card-error" aria-hidden="true">"Image unavailable"</div>
                    }
                    .into_view(),
                }
            }}
            <Show when=move || image.get().loading fallback=|| ()>
                <div class="gallery-card-skeleton" aria-hidden="true"></div>
            </Show>
        </div>
    }
}
