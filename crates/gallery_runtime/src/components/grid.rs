//! Virtualized grid surface and the load-more sentinel.

use leptos::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

use super::{banners::LoadMoreStatus, image_card::ImageCard};
use crate::{
    host::GRID_SCROLL_DOM_ID,
    reducer::GalleryAction,
    runtime_context::{use_gallery_runtime, GalleryRuntimeContext},
    virtualizer::{GridKey, ViewportMetrics},
};
#[cfg(target_arch = "wasm32")]
use crate::load_more::{SENTINEL_ROOT_MARGIN, SENTINEL_THRESHOLD};

fn measure(element: &web_sys::Element) -> ViewportMetrics {
    ViewportMetrics {
        scroll_top: f64::from(element.scroll_top()),
        viewport_height: f64::from(element.client_height()),
        viewport_width: f64::from(element.client_width()),
    }
}

fn report_viewport(runtime: GalleryRuntimeContext, element: &web_sys::Element) {
    let metrics = measure(element);
    if runtime
        .state
        .with_untracked(|gallery| gallery.viewport_needs_update(metrics))
    {
        runtime.dispatch_action(GalleryAction::ViewportChanged { metrics });
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RenderRow {
    index: usize,
    start: f64,
    size: f64,
    first_item: usize,
    end_item: usize,
    column_count: usize,
}

#[component]
/// Scroll container rendering only the rows near the viewport.
pub(super) fn GalleryGrid() -> impl IntoView {
    let runtime = use_gallery_runtime();
    let state = runtime.state;
    let scroller = create_node_ref::<html::Div>();
    let sentinel = create_node_ref::<html::Div>();

    let rows = create_memo(move |_| {
        state.with(|gallery| {
            let column_count = gallery.virtualizer.column_count;
            let total = gallery.collection.len();
            gallery
                .visible_rows()
                .into_iter()
                .map(|row| {
                    let range = row.item_range(column_count, total);
                    RenderRow {
                        index: row.index,
                        start: row.start,
                        size: row.size,
                        first_item: range.start,
                        end_item: range.end,
                        column_count,
                    }
                })
                .collect::<Vec<_>>()
        })
    });
    let total_height = Signal::derive(move || {
        state.with(|gallery| gallery.virtualizer.total_height(gallery.collection.len()))
    });
    let column_count = Signal::derive(move || state.with(|gallery| gallery.virtualizer.column_count));

    scroller.on_load(move |element| {
        report_viewport(runtime, &element);
    });

    let resize_listener = window_event_listener(ev::resize, move |_| {
        if let Some(element) = scroller.get_untracked() {
            report_viewport(runtime, &element);
        }
    });
    on_cleanup(move || resize_listener.remove());

    install_sentinel_observer(runtime, scroller, sentinel);

    view! {
        <div
            id=GRID_SCROLL_DOM_ID
            class="gallery-scroll"
            node_ref=scroller
            role="grid"
            aria-label="Images"
            aria-colcount=move || column_count.get().to_string()
            on:scroll=move |_| {
                if let Some(element) = scroller.get_untracked() {
                    report_viewport(runtime, &element);
                }
            }
            on:keydown=move |ev| {
                if let Some(key) = GridKey::from_key(&ev.key()) {
                    ev.prevent_default();
                    runtime.dispatch_action(GalleryAction::GridKey { key });
                }
            }
        >
            <div
                class="gallery-virtual-space"
                style=move || format!("position:relative;height:{}px;", total_height.get())
            >
                <For
                    each=move || rows.get()
                    key=|row| (row.index, row.first_item, row.end_item, row.column_count)
                    let:row
                >
                    <div
                        class="gallery-row"
                        role="row"
                        style=format!(
                            "position:absolute;top:{}px;left:0;right:0;height:{}px;display:grid;grid-template-columns:repeat({}, minmax(0, 1fr));",
                            row.start,
                            row.size,
                            row.column_count,
                        )
                    >
                        {(row.first_item..row.end_item)
                            .map(|index| view! { <ImageCard index=index /> })
                            .collect_view()}
                    </div>
                </For>
            </div>
            <div class="gallery-sentinel" node_ref=sentinel aria-hidden="true"></div>
            <LoadMoreStatus />
        </div>
    }
}

/// Observes the sentinel against the scroll container and re-observes whenever the trigger is
/// re-armed, so a sentinel that stayed visible reports a fresh transition.
fn install_sentinel_observer(
    runtime: GalleryRuntimeContext,
    scroller: NodeRef<html::Div>,
    sentinel: NodeRef<html::Div>,
) {
    #[cfg(target_arch = "wasm32")]
    {
        let observer = store_value(None::<web_sys::IntersectionObserver>);
        let arm_epoch = create_memo(move |_| {
            runtime
                .state
                .with(|gallery| gallery.trigger.arm_epoch())
        });

        create_effect(move |_| {
            let _ = arm_epoch.get();
            let (Some(root), Some(target)) = (scroller.get(), sentinel.get()) else {
                return;
            };
            let existing = observer.with_value(|observer| observer.clone());
            match existing {
                Some(observer) => {
                    observer.unobserve(&target);
                    observer.observe(&target);
                }
                None => {
                    let Some(created) = create_observer(runtime, &root) else {
                        logging::warn!("gallery sentinel observer could not be created");
                        return;
                    };
                    created.observe(&target);
                    observer.set_value(Some(created));
                }
            }
        });

        on_cleanup(move || {
            observer.with_value(|observer| {
                if let Some(observer) = observer {
                    observer.disconnect();
                }
            });
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (runtime, scroller, sentinel);
}

#[cfg(target_arch = "wasm32")]
fn create_observer(
    runtime: GalleryRuntimeContext,
    root: &web_sys::Element,
) -> Option<web_sys::IntersectionObserver> {
    let callback = Closure::<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>::new(
        move |entries: js_sys::Array, _observer: web_sys::IntersectionObserver| {
            let latest = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<web_sys::IntersectionObserverEntry>().ok())
                .last();
            if let Some(entry) = latest {
                runtime.dispatch_action(GalleryAction::SentinelVisibility {
                    visible: entry.is_intersecting(),
                });
            }
        },
    );
    let init = web_sys::IntersectionObserverInit::new();
    init.set_root(Some(root));
    init.set_root_margin(SENTINEL_ROOT_MARGIN);
    init.set_threshold(&JsValue::from_f64(SENTINEL_THRESHOLD));
    let observer =
        web_sys::IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .ok()?;
    callback.forget();
    Some(observer)
}
