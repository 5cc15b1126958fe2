use gallery_host_web::gallery_services_from_build_env;
use gallery_runtime::{GalleryProvider, GalleryShell};
use leptos::*;
use leptos_meta::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Gallery" />
        <Meta name="description" content="Browse the images held in a blob-storage container." />

        <main class="site-root">
            <GalleryEntry />
        </main>
    }
}

#[component]
pub fn GalleryEntry() -> impl IntoView {
    view! {
        <GalleryProvider host_services=gallery_services_from_build_env()>
            <GalleryShell />
        </GalleryProvider>
    }
}
