//! Processing service reached with the browser `fetch` API.
//!
//! Posts the request as `multipart/form-data` (the image as a file part,
//! the options as a text part) and reads the whole response body as the
//! processed image. The browser keeps running the event loop while the
//! request is outstanding.

use retouch_session::request::{DEFAULT_ENDPOINT, IMAGE_FIELD, OPTIONS_FIELD};
use retouch_session::{
    CancelToken, ImageBlob, ProcessRequest, ProcessingService, ServiceError, response_image,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::blob_url::bytes_to_blob;

/// A [`ProcessingService`] backed by `window.fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchService {
    endpoint: String,
}

impl FetchService {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for FetchService {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ProcessingService for FetchService {
    async fn process(
        &self,
        request: &ProcessRequest,
        cancel: &CancelToken,
    ) -> Result<ImageBlob, ServiceError> {
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let form = build_form(request).map_err(transport)?;
        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);

        let window =
            web_sys::window().ok_or_else(|| ServiceError::Transport("no global window".into()))?;
        let response = JsFuture::from(window.fetch_with_str_and_init(&self.endpoint, &init))
            .await
            .map_err(transport)?;
        let response: web_sys::Response = response.dyn_into().map_err(transport)?;

        if !response.ok() {
            return Err(ServiceError::Status(response.status()));
        }

        let buffer = JsFuture::from(response.array_buffer().map_err(transport)?)
            .await
            .map_err(transport)?;

        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        Ok(response_image(js_sys::Uint8Array::new(&buffer).to_vec()))
    }
}

/// Build the two-part form body for `request`.
fn build_form(request: &ProcessRequest) -> Result<web_sys::FormData, JsValue> {
    let image = request.image();
    let form = web_sys::FormData::new()?;
    let blob = bytes_to_blob(image.bytes(), image.mime())?;
    form.append_with_blob_and_filename(IMAGE_FIELD, &blob, image.name())?;
    form.append_with_str(OPTIONS_FIELD, request.options_json())?;
    Ok(form)
}

#[allow(clippy::needless_pass_by_value)]
fn transport(value: JsValue) -> ServiceError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    ServiceError::Transport(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_matches_page_route() {
        assert_eq!(FetchService::default().endpoint(), "/api/edit");
    }
}
