//! Runtime provider and context wiring for the gallery view.
//!
//! This module owns the long-lived reducer container and the runtime effect queue. UI composition
//! stays in [`crate::components`].
#![allow(clippy::clone_on_copy)]

use gallery_host::GalleryHostServices;
use leptos::*;

use crate::{
    effect_executor,
    host::GalleryHostContext,
    model::GalleryState,
    reducer::{reduce_gallery, GalleryAction, GalleryEffect, ReducerError},
};

#[derive(Clone, Copy)]
/// Leptos context for reading gallery state and dispatching [`GalleryAction`] values.
pub struct GalleryRuntimeContext {
    /// Host service bundle for executing runtime side effects.
    pub host: StoredValue<GalleryHostContext>,
    /// Reactive gallery session state.
    pub state: RwSignal<GalleryState>,
    /// Queue of runtime effects emitted by the reducer and drained by the executor.
    pub effects: RwSignal<Vec<GalleryEffect>>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<GalleryAction>,
}

impl GalleryRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: GalleryAction) {
        self.dispatch.call(action);
    }
}

#[component]
/// Provides [`GalleryRuntimeContext`] to descendant components.
pub fn GalleryProvider(
    /// Injected service bundle assembled by the entry layer.
    host_services: GalleryHostServices,
    children: Children,
) -> impl IntoView {
    let retry = host_services.retry;
    let host = store_value(GalleryHostContext::new(host_services));
    let state = create_rw_signal(GalleryState::with_retry_policy(retry));
    let effects = create_rw_signal(Vec::<GalleryEffect>::new());

    let dispatch = Callback::new(move |action: GalleryAction| {
        let mut gallery = state.get_untracked();
        let previous = gallery.clone();

        match reduce_gallery(&mut gallery, action) {
            Ok(new_effects) => {
                if gallery != previous {
                    state.set(gallery);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => log_reducer_error(&err),
        }
    });

    let runtime = GalleryRuntimeContext {
        host,
        state,
        effects,
        dispatch,
    };

    provide_context(runtime.clone());

    effect_executor::install(runtime);

    children().into_view()
}

/// Stale completions are expected after a reload and only surface in debug builds.
fn log_reducer_error(err: &ReducerError) {
    match err {
        ReducerError::StaleCompletion { .. } => {
            logging::debug_warn!("gallery reducer: {err}");
        }
        _ => {
            logging::warn!("gallery reducer error: {err}");
        }
    }
}

/// Returns the current [`GalleryRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`GalleryProvider`].
pub fn use_gallery_runtime() -> GalleryRuntimeContext {
    use_context::<GalleryRuntimeContext>().expect("GalleryRuntimeContext not provided")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reducer_errors_are_logged_without_panicking() {
        let errors = [
            ReducerError::StaleCompletion { generation: 3 },
            ReducerError::FetchInFlight,
            ReducerError::CredentialNotExpired,
        ];
        for err in &errors {
            log_reducer_error(err);
        }
    }
}
