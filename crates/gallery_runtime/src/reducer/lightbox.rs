//! Reducer helpers for lightbox navigation and the zoom/pan viewer.

use crate::{
    model::GalleryState,
    reducer::{focus_effect, GalleryAction, GalleryEffect, ReducerError},
    viewer::ViewerTransform,
};

fn ensure_open(state: &GalleryState) -> Result<(), ReducerError> {
    if state.navigation.is_open() {
        Ok(())
    } else {
        Err(ReducerError::NothingOpen)
    }
}

pub(super) fn reduce_lightbox(
    state: &mut GalleryState,
    action: GalleryAction,
    effects: &mut Vec<GalleryEffect>,
) -> Result<(), ReducerError> {
    match action {
        GalleryAction::OpenItem { index } => {
            let was_open = state.navigation.is_open();
            state.navigation.open(index, &state.collection)?;
            state.viewer = ViewerTransform::default();
            state.grid_focus = Some(index);
            if !was_open {
                effects.push(GalleryEffect::SetBodyScrollLocked(true));
            }
        }
        GalleryAction::NextItem => {
            ensure_open(state)?;
            if state.navigation.next(&state.collection) {
                state.viewer = ViewerTransform::default();
            }
        }
        GalleryAction::PrevItem => {
            ensure_open(state)?;
            if state.navigation.prev(&state.collection) {
                state.viewer = ViewerTransform::default();
            }
        }
        GalleryAction::CloseLightbox => {
            let Some(index) = state.navigation.open_index() else {
                return Err(ReducerError::NothingOpen);
            };
            state.navigation.close();
            state.viewer = ViewerTransform::default();
            state.grid_focus = Some(index);
            effects.push(GalleryEffect::SetBodyScrollLocked(false));
            effects.push(focus_effect(state, index));
        }
        GalleryAction::ViewerWheel { delta_y } => {
            ensure_open(state)?;
            state.viewer.wheel(delta_y);
        }
        GalleryAction::ViewerToggleZoom => {
            ensure_open(state)?;
            state.viewer.toggle_zoom();
        }
        GalleryAction::ViewerDragStart { x, y } => {
            ensure_open(state)?;
            state.viewer.begin_drag(x, y);
        }
        GalleryAction::ViewerDragMove { x, y } => {
            if state.navigation.is_open() {
                state.viewer.drag_to(x, y);
            }
        }
        GalleryAction::ViewerDragEnd => {
            state.viewer.end_drag();
        }
        GalleryAction::OpenOriginal => {
            let item = state.open_item().ok_or(ReducerError::NothingOpen)?;
            let urls = state.urls_for(item);
            effects.push(GalleryEffect::OpenOriginal {
                container: item.container.clone(),
                key: item.key.clone(),
                fallback_url: urls.display_url,
            });
        }
        _ => {}
    }
    Ok(())
}
