use chat_api_shim_core::config::{self, Config};
use clap::Parser;
use main_error::MainError;
use opentelemetry::global::shutdown_tracer_provider;
use snafu::{ResultExt, Snafu, ensure};

use crate::{args::Args, chat_client::ChatApiClient};

mod args;
mod chat_client;
mod tracing;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to set up tracing"))]
    SetUpTracing { source: tracing::Error },

    #[snafu(display("Failed to read configuration"))]
    ReadConfig { source: config::Error },

    #[snafu(display("Failed to parse request body as JSON"))]
    ParseRequestBody { source: serde_json::Error },

    #[snafu(display("Failed to create chat platform client"))]
    CreateChatApiClient { source: chat_client::Error },

    #[snafu(display("Failed to send request to the chat platform"))]
    SendRequest { source: chat_client::Error },

    #[snafu(display("Failed to read response body"))]
    ReadResponseBody { source: reqwest::Error },

    #[snafu(display("The chat platform responded with status {status}"))]
    UnsuccessfulResponse { status: reqwest::StatusCode },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let args = Args::parse();

    let config = Config::read_from_file(&args.config_file).context(ReadConfigSnafu)?;
    tracing::init(config.tracing.as_ref()).context(SetUpTracingSnafu)?;

    // MainError prints the whole error chain on exit
    let result = run(&args, &config).await;
    shutdown_tracer_provider();

    Ok(result?)
}

async fn run(args: &Args, config: &Config) -> Result<(), Error> {
    let body: Option<serde_json::Value> = args
        .data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context(ParseRequestBodySnafu)?;

    let client = ChatApiClient::new(&config.chat_api).context(CreateChatApiClientSnafu)?;
    let response = client
        .request(args.method.clone(), &args.path, body)
        .await
        .context(SendRequestSnafu)?;

    let status = response.status();
    let body = response.text().await.context(ReadResponseBodySnafu)?;
    // The body is printed in any case, error responses usually explain what went wrong
    println!("{body}");

    ensure!(status.is_success(), UnsuccessfulResponseSnafu { status });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_is_reported_once() {
        let err = Error::ReadConfig {
            source: config::Error::ReadConfigFile {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
                config_file: "config.yaml".into(),
            },
        };

        let report = format!("{:?}", MainError::from(err));
        assert_eq!(report.matches("No such file").count(), 1, "{report}");
        assert!(report.contains(r#"Failed to read configuration file at "config.yaml""#));
    }
}
