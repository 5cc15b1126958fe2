//! Browser fetch/window bridge for the gallery proxy adapters.
//!
//! This module contains the WASM/JS interop layer and a non-WASM fallback shim.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Raw HTTP response captured by the bridge before status interpretation.
pub struct BridgeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::*;
    use js_sys::Promise;
    use serde::de::DeserializeOwned;
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen(inline_js = r#"
export async function jsGalleryFetch(method, url, body) {
  const init = { method, headers: { 'Accept': 'application/json' } };
  if (body !== undefined && body !== null) {
    init.headers['Content-Type'] = 'application/json';
    init.body = body;
  }
  const response = await fetch(url, init);
  const text = await response.text();
  return { status: response.status, body: text };
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsGalleryFetch)]
        fn js_gallery_fetch(method: &str, url: &str, body: Option<String>) -> Promise;
    }

    async fn await_promise(promise: Promise) -> Result<JsValue, String> {
        JsFuture::from(promise).await.map_err(js_error_to_string)
    }

    fn js_error_to_string(err: JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    async fn promise_to_json<T: DeserializeOwned>(promise: Promise) -> Result<T, String> {
        let value = await_promise(promise).await?;
        from_value(value).map_err(|e| e.to_string())
    }

    pub async fn fetch_text(
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<BridgeResponse, String> {
        promise_to_json(js_gallery_fetch(method, url, body)).await
    }

    pub async fn open_in_new_tab(url: &str) -> Result<(), String> {
        let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
        window
            .open_with_url_and_target_and_features(url, "_blank", "noopener,noreferrer")
            .map(|_| ())
            .map_err(js_error_to_string)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    fn unsupported() -> String {
        "Browser fetch APIs are only available when compiled for wasm32".to_string()
    }

    pub async fn fetch_text(
        _method: &str,
        _url: &str,
        _body: Option<String>,
    ) -> Result<BridgeResponse, String> {
        Err(unsupported())
    }

    pub async fn open_in_new_tab(_url: &str) -> Result<(), String> {
        Err(unsupported())
    }
}

/// Issues an HTTP request and returns the status and body text.
pub async fn fetch_text(
    method: &str,
    url: &str,
    body: Option<String>,
) -> Result<BridgeResponse, String> {
    imp::fetch_text(method, url, body).await
}

/// Opens `url` in a new browser tab without giving it a handle to this page.
///
/// # Errors
///
/// Returns an error when no browser window is available or the call is rejected.
pub async fn open_in_new_tab(url: &str) -> Result<(), String> {
    imp::open_in_new_tab(url).await
}
