use leptos::{logging, spawn_local};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

use crate::host::GalleryHostContext;

/// DOM id of the grid scroll container.
pub(crate) const GRID_SCROLL_DOM_ID: &str = "gallery-scroll";

/// DOM id of one grid cell.
pub(crate) fn grid_cell_dom_id(index: usize) -> String {
    format!("gallery-cell-{index}")
}

pub(super) fn open_original(
    host: GalleryHostContext,
    container: Option<String>,
    key: String,
    fallback_url: String,
) {
    spawn_local(async move {
        let url = match container.as_deref() {
            Some(container) => match host.url_service().mint_url(container, &key).await {
                Ok(url) => url,
                Err(err) => {
                    logging::warn!("minting url for `{key}` failed, using display url: {err}");
                    fallback_url
                }
            },
            None => fallback_url,
        };
        if let Err(err) = gallery_host_web::open_in_new_tab(&url).await {
            logging::warn!("open original failed for `{key}`: {err}");
        }
    });
}

pub(super) fn set_body_scroll_locked(locked: bool) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(body) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.body())
        else {
            return;
        };
        let style = body.style();
        let result = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(|_| ())
        };
        if result.is_err() {
            logging::warn!("updating body scroll lock failed");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = locked;
}

pub(super) fn focus_grid_cell(index: usize, row_start_px: f64) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let cell_id = grid_cell_dom_id(index);
        if document.get_element_by_id(&cell_id).is_none() {
            // Row is virtualized away; scroll it in so the next render realizes the cell.
            if let Some(scroller) = document.get_element_by_id(GRID_SCROLL_DOM_ID) {
                scroller.set_scroll_top(row_start_px as i32);
            }
        }
        let callback = Closure::once_into_js(move || {
            let Some(element) = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(&cell_id))
            else {
                return;
            };
            let Ok(element) = element.dyn_into::<web_sys::HtmlElement>() else {
                return;
            };
            element.scroll_into_view_with_bool(false);
            let _ = element.focus();
        });
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0);
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (index, row_start_px);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cell_ids_are_index_based() {
        assert_eq!(grid_cell_dom_id(12), "gallery-cell-12");
    }
}
