use chat_api_shim_core::config::TracingConfig;
use opentelemetry::{
    Context, KeyValue, global,
    trace::{TraceError, TracerProvider},
};
use opentelemetry_http::HeaderInjector;
use opentelemetry_otlp::{TonicExporterBuilder, WithExportConfig};
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    trace::{self, RandomIdGenerator, Sampler},
};
use snafu::{ResultExt, Snafu};
use tracing::{level_filters::LevelFilter, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

const SERVICE_NAME: &str = "chat-api-shim";

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to install tokio batch runtime"))]
    InstallTokioBatchRuntime { source: TraceError },

    #[snafu(display("Failed to set global tracing subscriber"))]
    SetGlobalTracingSubscriber { source: SetGlobalDefaultError },
}

pub fn init(tracing_config: Option<&TracingConfig>) -> Result<(), Error> {
    let env_filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    // stdout is reserved for the response body
    let console_output_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter_layer);
    let mut layers = vec![console_output_layer.boxed()];

    if let Some(tracing_config) = tracing_config
        && tracing_config.enabled
    {
        let env_filter_layer = EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .from_env_lossy();
        layers.push(
            tracing_opentelemetry::layer()
                .with_error_records_to_exceptions(true)
                .with_tracer(otel_tracer(tracing_config)?)
                .with_filter(env_filter_layer)
                .boxed(),
        );
    }

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layers))
        .context(SetGlobalTracingSubscriberSnafu)?;
    global::set_text_map_propagator(TraceContextPropagator::new());

    Ok(())
}

fn otel_tracer(tracing_config: &TracingConfig) -> Result<trace::Tracer, Error> {
    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter(tracing_config))
        .with_trace_config(
            trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    SERVICE_NAME,
                )])),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .context(InstallTokioBatchRuntimeSnafu)?;

    global::set_tracer_provider(provider.clone());
    Ok(provider.tracer(SERVICE_NAME))
}

fn exporter(tracing_config: &TracingConfig) -> TonicExporterBuilder {
    let mut exporter = opentelemetry_otlp::new_exporter().tonic();
    if let Some(endpoint) = &tracing_config.otlp_endpoint {
        exporter = exporter.with_endpoint(endpoint.as_str());
    }
    if let Some(protocol) = tracing_config.otlp_protocol {
        exporter = exporter.with_protocol(protocol);
    }

    // In case endpoint and protocol are not set here, they will still be read from the env vars
    // OTEL_EXPORTER_OTLP_ENDPOINT and OTEL_EXPORTER_OTLP_PROTOCOL

    exporter
}

/// Adds the `traceparent` (and friends) headers, so that the request can be correlated on the
/// platform side.
pub fn add_current_context_to_client_request(
    context: Context,
    headers: &mut reqwest::header::HeaderMap,
) {
    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&context, &mut HeaderInjector(headers));
    });
}
