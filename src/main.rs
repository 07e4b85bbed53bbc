use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use vakit::domain::model::ErrorSeverity;
use vakit::utils::{logger, validation::Validate};
use vakit::{
    AladhanClient, AttemptOutcome, CliConfig, Collaborators, ResolutionCoordinator,
    ResolutionState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let engine_config = match cli.engine_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    logger::init_logger(cli.verbose, engine_config.logging.format);
    tracing::info!("Starting vakit");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
        tracing::debug!("Engine config: {:?}", engine_config);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let mut settings = engine_config.to_settings();
    if let Some(method) = cli.method {
        settings.method = method;
    }
    if let Some(country) = &cli.country {
        settings.country = country.clone();
    }

    let client = AladhanClient::with_timeout(&engine_config.api.base_url, engine_config.api_timeout())
        .context("failed to build HTTP client")?;
    let device = Arc::new(cli.device());

    let coordinator = ResolutionCoordinator::new(
        Collaborators {
            permission: device.clone(),
            position: device.clone(),
            places: device,
            schedule: Arc::new(client),
        },
        settings,
    );

    let mut transitions = coordinator.subscribe();
    let watcher = tokio::spawn(async move {
        while transitions.changed().await.is_ok() {
            let state = transitions.borrow_and_update().clone();
            if state.is_in_flight() {
                tracing::debug!("⏳ {}", state.name());
            } else {
                tracing::debug!("{}", state.name());
            }
        }
    });

    let outcome = match &cli.city {
        Some(city) => coordinator.search_city(city).await,
        None => coordinator.start_auto_locate().await,
    };
    watcher.abort();

    let state = match outcome {
        AttemptOutcome::Committed(state) => state,
        AttemptOutcome::Superseded => coordinator.state(),
    };

    if !state.is_terminal() {
        anyhow::bail!("resolution ended in non-terminal state {}", state.name());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    match state {
        ResolutionState::Resolved { schedule, place } => {
            if !cli.json {
                println!("📍 {}", place.display_label());
                for (name, time) in schedule.iter() {
                    println!("  {:<8} {}", name, time);
                }
                if let Some((name, time)) = schedule.next_after(Local::now().time()) {
                    println!("⏭  Next: {} at {}", name, time.format("%H:%M"));
                }
            }
            Ok(())
        }
        ResolutionState::SearchFailed { reason } => {
            tracing::error!(
                "❌ Resolution failed: {:?} (Severity: {:?}, retryable: {})",
                reason,
                reason.severity(),
                reason.is_retryable()
            );
            eprintln!("❌ {}", reason.user_friendly_message());
            eprintln!("💡 {}", reason.recovery_suggestion());

            let exit_code = match reason.severity() {
                ErrorSeverity::Low => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 3,
            };
            std::process::exit(exit_code);
        }
        _ => Ok(()),
    }
}
