use chat_api_shim_core::{
    config::ChatApiConfig,
    credential_header::{API_ACCESS_TOKEN, API_ACCESS_TOKEN_UNDERSCORE},
    normalize_layer::{NormalizeCredentialHeader, NormalizeCredentialHeaderLayer},
    sanitization::Sanitize,
};
use http::{HeaderMap, HeaderValue, Method};
use reqwest::{Client, Request, Response};
use snafu::{ResultExt, Snafu};
use tower::{Layer, ServiceExt};
use tracing::{debug, instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use url::Url;

use crate::tracing::add_current_context_to_client_request;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to create HTTP client"))]
    CreateHttpClient { source: reqwest::Error },

    #[snafu(display("The configured API access token is not a valid HTTP header value"))]
    ParseApiAccessToken {
        source: http::header::InvalidHeaderValue,
    },

    #[snafu(display(
        "Failed to join the requested path {requested_path:?} to the chat platform endpoint {endpoint}"
    ))]
    JoinRequestPathToEndpoint {
        source: url::ParseError,
        requested_path: String,
        endpoint: Url,
    },

    #[snafu(display("Failed to build request"))]
    BuildRequest { source: reqwest::Error },

    #[snafu(display("Failed to send request to {url}"))]
    SendRequest { source: reqwest::Error, url: Url },
}

/// Thin client for the chat platform API.
///
/// All requests go through a [`NormalizeCredentialHeader`] wrapped around the HTTP client, so the
/// credential header is rewritten exactly at the point of transmission.
pub struct ChatApiClient {
    endpoint: Url,
    api_access_token: Option<HeaderValue>,
    default_headers: HeaderMap,
    http_client: NormalizeCredentialHeader<Client>,
}

impl ChatApiClient {
    #[instrument(name = "ChatApiClient::new")]
    pub fn new(config: &ChatApiConfig) -> Result<Self, Error> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.ignore_cert)
            .timeout(config.request_timeout)
            .build()
            .context(CreateHttpClientSnafu)?;

        let api_access_token = config
            .api_access_token
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .context(ParseApiAccessTokenSnafu)?
            .map(|mut token| {
                token.set_sensitive(true);
                token
            });

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_access_token,
            default_headers: config.default_headers.clone(),
            http_client: NormalizeCredentialHeaderLayer::new().layer(http_client),
        })
    }

    /// Sends a request to `path` (relative to the configured endpoint) and returns the response as
    /// is, regardless of the status code.
    #[instrument(skip(self, body))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, Error> {
        let request = self.build_request(method, path, body.as_ref())?;
        let url = request.url().clone();
        debug!(headers = ?request.headers().sanitize(), "Built request");

        self.http_client
            .clone()
            .oneshot(request)
            .await
            .context(SendRequestSnafu { url })
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Request, Error> {
        // A leading slash would replace any path prefix the endpoint has
        let url = self
            .endpoint
            .join(path.trim_start_matches('/'))
            .context(JoinRequestPathToEndpointSnafu {
                requested_path: path,
                endpoint: self.endpoint.clone(),
            })?;

        let mut builder = self
            .http_client
            .get_ref()
            .request(method, url)
            .headers(self.default_headers.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let mut request = builder.build().context(BuildRequestSnafu)?;
        if let Some(api_access_token) = &self.api_access_token {
            // The dedicated setting wins over any credential in the default headers. The
            // underscore name is the one the platform documents, it is renamed on transmission.
            let headers = request.headers_mut();
            headers.remove(API_ACCESS_TOKEN);
            headers.insert(API_ACCESS_TOKEN_UNDERSCORE, api_access_token.clone());
        }
        add_current_context_to_client_request(
            tracing::Span::current().context(),
            request.headers_mut(),
        );

        Ok(request)
    }
}
