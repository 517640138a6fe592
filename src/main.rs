use metrics_exporter_statsd::StatsdBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Request counters and timings go to StatsD when a host is configured;
    // otherwise the recorder stays a no-op.
    if let Ok(host) = std::env::var("STATSD_HOST") {
        let port = std::env::var("STATSD_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8125);
        let recorder = StatsdBuilder::from(&host, port).build(Some("resources_api"))?;
        metrics::set_global_recorder(recorder)
            .map_err(|err| anyhow::anyhow!("failed to install metrics recorder: {err}"))?;
    }

    resources_api::cli::run().await
}
