use std::sync::Arc;

use tracing::{error, info, warn};

use healthcheck::config::Config;
use healthcheck::pause::{FilePauseStore, MemoryPauseStore, PauseStore};
use healthcheck::probe::{Backends, HttpCorePinger, StaticSites};
use healthcheck::registry::{OutputRegistry, ProbeRegistry};
use healthcheck::{Healthcheck, Server};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        e
    })?;

    healthcheck::logging::init(&config.logging)?;

    info!(version = healthcheck::VERSION, "Starting healthcheck server...");
    config.log_summary();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let pause_store: Arc<dyn PauseStore> = match config.server.pause_file {
        Some(ref path) => Arc::new(FilePauseStore::new(path)),
        None => Arc::new(MemoryPauseStore::new()),
    };

    let mut backends = Backends::new();
    if !config.server.solr_cores.is_empty() {
        let sites = StaticSites::from_endpoints(&config.server.solr_cores)?;
        backends = backends
            .with_solr_sites(Arc::new(sites))
            .with_solr_pinger(Arc::new(HttpCorePinger::new()));
    }
    info!(backends = ?backends.configured(), "Backends configured");

    let engine = Healthcheck::new(
        &config,
        ProbeRegistry::with_defaults(),
        OutputRegistry::with_defaults(),
        pause_store,
        backends,
    );
    if let Err(e) = engine.check_probes() {
        error!(
            error = %e,
            registered = ?engine.registered_probes(),
            "Probe configuration is invalid, requests will fail"
        );
    } else if engine.applicable_probes().is_empty() {
        warn!(
            probes = ?engine.config().probes,
            "No configured probe has a backend, every healthcheck will report success without checking anything"
        );
    }

    let server = Server::new(config.server.clone(), engine);

    tokio::select! {
        result = server.bind_and_run() => {
            if let Err(e) = result {
                error!(error = %e, "Server error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
