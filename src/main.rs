//! secrets-to-env - Lambda extension entry point.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use secrets_to_env::cli::Cli;
use secrets_to_env::core::config::{self, Config};
use secrets_to_env::core::constants::LOG_VAR;
use secrets_to_env::core::lifecycle::RuntimeApiClient;
use secrets_to_env::core::secrets::AwsSecretsManager;
use secrets_to_env::core::signal;
use secrets_to_env::runner;

fn main() {
    let cli = Cli::parse();

    // JSON lines on stderr; the host forwards them to the function's log stream
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("secrets_to_env=debug")
        } else {
            EnvFilter::new("secrets_to_env=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create runtime");
            std::process::exit(1);
        }
    };

    let code = rt.block_on(start(cli));
    std::process::exit(code);
}

async fn start(cli: Cli) -> i32 {
    let config = match Config::from_env(cli.options()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return 1;
        }
    };

    let cancel = CancellationToken::new();
    let _signals = signal::spawn_listener(cancel.clone());

    let store = AwsSecretsManager::from_env().await;
    let api = RuntimeApiClient::from_config(&config);

    match runner::run(&config, &store, api, config::process_vars(), &cancel).await {
        Ok(reason) => {
            info!(?reason, "extension stopped");
            0
        }
        Err(e) => {
            error!(error = %e, "fatal");
            1
        }
    }
}
