use std::{fmt::Debug, fs::File, path::PathBuf, time::Duration};

use http::HeaderMap;
use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use url::Url;

use crate::sanitization::Sanitize;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to read configuration file at {config_file:?}"))]
    ReadConfigFile {
        source: std::io::Error,
        config_file: PathBuf,
    },

    #[snafu(display("Failed to parse configuration file at {config_file:?}"))]
    ParseConfigFile {
        source: serde_yaml::Error,
        config_file: PathBuf,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub chat_api: ChatApiConfig,
    pub tracing: Option<TracingConfig>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatApiConfig {
    /// Base URL of the chat platform, request paths are joined onto it.
    pub endpoint: Url,

    pub api_access_token: Option<String>,

    #[serde(default)]
    pub ignore_cert: bool,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Headers added to every request, e.g. `accept`.
    #[serde(default, with = "http_serde::header_map")]
    pub default_headers: HeaderMap,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Debug for ChatApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatApiConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "api_access_token",
                &self.api_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("ignore_cert", &self.ignore_cert)
            .field("request_timeout", &self.request_timeout)
            .field("default_headers", &self.default_headers.sanitize())
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(rename = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<Url>,

    #[serde(rename = "OTEL_EXPORTER_OTLP_PROTOCOL")]
    pub otlp_protocol: Option<opentelemetry_otlp::Protocol>,
}

impl Config {
    /// Using [`std::fs::File`] over `tokio::fs::File`, as [`serde_yaml::from_reader`] does not support
    /// async yet (?). Should not matter, as we only read the config once during startup.
    pub fn read_from_file(config_file: &PathBuf) -> Result<Self, Error> {
        let config_file_content =
            File::open(config_file).context(ReadConfigFileSnafu { config_file })?;

        serde_yaml::from_reader(config_file_content).context(ParseConfigFileSnafu { config_file })
    }
}
