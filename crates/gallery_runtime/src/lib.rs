//! Gallery session runtime: collection accumulator, viewport virtualizer, load-more trigger,
//! navigation, credential expiry handling, the reducer, and the Leptos UI built on top of them.
//!
//! All session state lives in [`GalleryState`] and changes only through [`reduce_gallery`]. Side
//! effects leave the reducer as [`GalleryEffect`] values and are executed by the host layer against
//! the injected [`gallery_host::GalleryHostServices`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod card;
pub mod collection;
pub mod components;
pub mod credential;
mod effect_executor;
mod host;
pub mod load_more;
pub mod model;
pub mod navigation;
pub mod reducer;
mod runtime_context;
pub mod viewer;
pub mod virtualizer;

pub use collection::Collection;
pub use components::{use_gallery_runtime, GalleryProvider, GalleryRuntimeContext, GalleryShell};
pub use credential::CredentialState;
pub use model::{FetchTicket, GalleryState, ItemUrls, LoadFailure};
pub use navigation::NavigationState;
pub use reducer::{reduce_gallery, GalleryAction, GalleryEffect, ReducerError};
pub use virtualizer::{ViewportMetrics, Virtualizer};
