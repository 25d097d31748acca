// GymDesk - Session command-line client

use tracing::{error, info};

use gymdesk_app::{build_authenticator, run, Command};
use gymdesk_auth::AuthError;
use gymdesk_common::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration [{}]: {}", e.error_code(), e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.rust_log)),
        )
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    info!(provider = %config.auth_provider, "Starting GymDesk session client");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let auth = build_authenticator(&config)?;

    match run(&auth, command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            let code = e
                .downcast_ref::<AuthError>()
                .map(AuthError::code)
                .unwrap_or("COMMAND_FAILED");
            error!(code, error = %e, "Command failed");
            Err(e)
        }
    }
}
