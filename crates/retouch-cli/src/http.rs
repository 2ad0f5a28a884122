//! Processing service reached over HTTP with `reqwest`.

use reqwest::multipart::{Form, Part};
use retouch_session::request::{IMAGE_FIELD, OPTIONS_FIELD};
use retouch_session::{
    CancelToken, ImageBlob, ProcessRequest, ProcessingService, ServiceError, response_image,
};
use tracing::debug;

/// A [`ProcessingService`] that posts each request as a multipart form.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpService {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ProcessingService for HttpService {
    async fn process(
        &self,
        request: &ProcessRequest,
        cancel: &CancelToken,
    ) -> Result<ImageBlob, ServiceError> {
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let image = request.image();
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_owned())
            .mime_str(image.mime())
            .map_err(transport)?;
        let form = Form::new()
            .part(IMAGE_FIELD, part)
            .text(OPTIONS_FIELD, request.options_json().to_owned());

        debug!(endpoint = %self.endpoint, bytes = image.len(), "posting image");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport)?;

        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        Ok(response_image(body.to_vec()))
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}
