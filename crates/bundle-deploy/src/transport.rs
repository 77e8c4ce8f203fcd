//! HTTP transport for uploads.
//!
//! `Transport` is the seam between the deploy call and the network, so
//! the deploy logic can be exercised with a recording mock. `HttpTransport`
//! is the `reqwest` implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use hyper::ext::ReasonPhrase;
use reqwest::Body;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::DeployError;
use crate::types::{HttpResponse, PartBody, UploadRequest};

const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";

/// Sends an assembled upload and returns the full response.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, DeployError>> + Send + '_>>;
}

/// Client settings for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportConfig {
    /// Whole-request deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// `reqwest` transport. Builds a fresh client for every upload.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Self {
        Self { config }
    }

    fn client(&self) -> Result<reqwest::Client, DeployError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = &self.config.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        Ok(builder.build()?)
    }

    async fn send(&self, request: UploadRequest) -> Result<HttpResponse, DeployError> {
        let form = build_form(&request).await?;
        let client = self.client()?;

        let resp = client
            .post(request.target.clone())
            .header(AUTHORIZATION, request.authorization.as_str())
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let status_line = status_line(&resp);
        let content_types = resp
            .headers()
            .get_all(CONTENT_TYPE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>();

        debug!(
            status = status.as_u16(),
            content_types = ?content_types,
            "deploy response received"
        );

        let body = resp.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_line,
            content_types,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, DeployError>> + Send + '_>> {
        Box::pin(self.send(request))
    }
}

/// Rebuilds the status line, keeping the server's own reason phrase.
///
/// hyper only records the phrase when it differs from the canonical one.
fn status_line(resp: &reqwest::Response) -> String {
    let status = resp.status();
    let reason = match resp.extensions().get::<ReasonPhrase>() {
        Some(phrase) => Some(String::from_utf8_lossy(phrase.as_bytes()).into_owned()),
        None => status.canonical_reason().map(str::to_string),
    };
    match reason {
        Some(reason) => format!("{:?} {} {reason}", resp.version(), status.as_u16()),
        None => format!("{:?} {}", resp.version(), status.as_u16()),
    }
}

/// Converts upload parts into a multipart form, streaming file parts.
async fn build_form(request: &UploadRequest) -> Result<Form, DeployError> {
    let mut form = Form::new();
    for part in &request.parts {
        let body = match &part.body {
            PartBody::Text(value) => Part::text(value.clone()).mime_str(TEXT_PLAIN)?,
            PartBody::File {
                path,
                file_name,
                content_type,
            } => {
                let file = tokio::fs::File::open(path).await?;
                let length = file.metadata().await?.len();
                debug!(part = %part.name, bytes = length, "bundle opened");
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
                    .file_name(file_name.clone())
                    .mime_str(content_type)?
            }
        };
        form = form.part(part.name.clone(), body);
    }
    Ok(form)
}
