//! Cloud Storage export source — downloads objects via the JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::channels::ExportSource;
use crate::error::TransferError;

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// Reads export objects from a Cloud Storage bucket.
pub struct GcsExportSource {
    bucket: String,
    access_token: Option<SecretString>,
    base_url: String,
    client: reqwest::Client,
}

impl GcsExportSource {
    pub fn new(
        bucket: impl Into<String>,
        access_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, TransferError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransferError::RequestFailed {
                object: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            bucket: bucket.into(),
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point at a different endpoint (emulators, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Media download URL for `object`. The object name is a single
    /// percent-encoded path segment, so `/` becomes `%2F`.
    pub fn media_url(&self, object: &str) -> Result<Url, TransferError> {
        let request_failed = |reason: String| TransferError::RequestFailed {
            object: object.to_string(),
            reason,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| request_failed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| request_failed(format!("base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", object]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

#[async_trait]
impl ExportSource for GcsExportSource {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn fetch(&self, object: &str) -> Result<Vec<u8>, TransferError> {
        let url = self.media_url(object)?;
        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| TransferError::RequestFailed {
                object: object.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransferError::NotFound {
                object: object.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransferError::Status {
                object: object.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransferError::RequestFailed {
                object: object.to_string(),
                reason: e.to_string(),
            })?;
        debug!(bucket = %self.bucket, object, bytes = bytes.len(), "Downloaded export");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn source(server: &MockServer, token: Option<&str>) -> GcsExportSource {
        GcsExportSource::new(
            "pubsite_prod_rev_123",
            token.map(|t| SecretString::from(t.to_string())),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.uri())
    }

    #[test]
    fn media_url_encodes_object_as_one_segment() {
        let src = GcsExportSource::new("bucket", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            src.media_url("reviews/reviews_com.example_202401.csv")
                .unwrap()
                .as_str(),
            "https://storage.googleapis.com/storage/v1/b/bucket/o/reviews%2Freviews_com.example_202401.csv?alt=media"
        );
    }

    #[tokio::test]
    async fn downloads_object_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/pubsite_prod_rev_123/o/reviews%2Freviews_app_202401.csv"))
            .and(query_param("alt", "media"))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFE, b'a', 0]))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = source(&server, Some("ya29.token"))
            .fetch("reviews/reviews_app_202401.csv")
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xFE, b'a', 0]);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server, None).fetch("reviews/x.csv").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound { ref object } if object == "reviews/x.csv"));
    }

    #[tokio::test]
    async fn auth_failure_is_a_transfer_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = source(&server, None).fetch("reviews/x.csv").await.unwrap_err();
        assert!(matches!(err, TransferError::Status { status: 403, .. }));
    }
}
