mod cli;

use crate::cli::{RuleSourceArg, CLI};
use clap::Parser;
use signpost_core::RuleLookup;
use signpost_gateway::state::upstream_client;
use signpost_gateway::{App, AppState};
use signpost_resolver::{ResolverConfig, ResolverService};
use signpost_storage::{InMemoryRuleLookup, SanityConfig, SanityRuleLookup};
use signpost_telemetry::TelemetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;

    let _telemetry = signpost_telemetry::init(
        TelemetryConfig::builder()
            .format(config.log_format.into())
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        rule_source = %config.rule_source,
        upstream_url = %config.upstream_url,
        log_format = %config.log_format,
        "starting signpost gateway"
    );

    let resolver_config = ResolverConfig::builder()
        .lookup_timeout(Duration::from_millis(config.lookup_timeout_ms))
        .build();

    match config.rule_source {
        RuleSourceArg::Sanity => {
            let sanity = SanityConfig::builder()
                .project_id(config.sanity_project_id.clone())
                .dataset(config.sanity_dataset.clone())
                .api_version(config.sanity_api_version.clone())
                .token(config.sanity_token.clone())
                .use_cdn(config.sanity_use_cdn)
                .timeout(Duration::from_millis(config.lookup_timeout_ms))
                .build();
            let lookup = SanityRuleLookup::new(sanity)?;
            run_server(&config, lookup, resolver_config).await?;
        }
        RuleSourceArg::File => {
            let path = config
                .rules_file
                .as_deref()
                .ok_or("rules file is required when rule source is file")?;
            let lookup = InMemoryRuleLookup::from_json_file(path)?;
            if lookup.is_empty() {
                warn!(path = %path.display(), "rules file contains no rules");
            }
            info!(path = %path.display(), rules = lookup.len(), "loaded redirect rules");
            run_server(&config, lookup, resolver_config).await?;
        }
    }

    Ok(())
}

async fn run_server<L: RuleLookup>(
    config: &CLI,
    lookup: L,
    resolver_config: ResolverConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = Arc::new(ResolverService::with_config(lookup, resolver_config));
    let client = upstream_client(Duration::from_millis(config.upstream_timeout_ms))?;

    let mut state = AppState::new(resolver, client, config.upstream_url.clone());
    if let Some(origin) = &config.public_origin {
        state = state.with_public_origin(origin.as_str());
    }

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("signpost gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
