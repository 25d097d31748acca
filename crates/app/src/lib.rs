//! GymDesk session composition root
//!
//! Builds the single `Authenticator` for a running client from configuration
//! and interprets the command-line verbs against it.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use gymdesk_auth::{Authenticator, FileStore, RegisterRequest, SessionStore};
use gymdesk_common::Config;
use gymdesk_gateway::{mock, AuthServiceFactory, GatewayConfig};

/// Create the application's authenticator: gateway + file-backed session
pub fn build_authenticator(config: &Config) -> Result<Arc<Authenticator>, anyhow::Error> {
    let service = AuthServiceFactory::create(GatewayConfig::from(config))
        .context("Failed to create user service gateway")?;

    let storage = Arc::new(FileStore::new(&config.session_store_path));
    let session = SessionStore::new(storage);

    let authenticator = Authenticator::new(service, session);
    tracing::info!(
        state = %authenticator.state(),
        session_store = %config.session_store_path.display(),
        "Authenticator ready"
    );

    Ok(Arc::new(authenticator))
}

/// Command-line verbs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { identifier: String, password: String },
    Logout,
    Refresh,
    Register(RegisterRequest),
    WhoAmI,
    Can { capability: String },
    DemoAccounts,
}

pub const USAGE: &str = "usage: gymdesk <command>

commands:
  login <email-or-username> <password>
  logout
  refresh
  register <username> <email> <password> <name...>
  whoami
  can <capability>
  demo-accounts";

impl Command {
    /// Parse arguments after the program name
    pub fn parse(args: &[String]) -> Result<Self, anyhow::Error> {
        let (verb, rest) = args.split_first().ok_or_else(|| anyhow!(USAGE))?;

        let command = match (verb.as_str(), rest) {
            ("login", [identifier, password]) => Command::Login {
                identifier: identifier.clone(),
                password: password.clone(),
            },
            ("logout", []) => Command::Logout,
            ("refresh", []) => Command::Refresh,
            ("register", [username, email, password, name @ ..]) if !name.is_empty() => {
                Command::Register(RegisterRequest {
                    username: username.clone(),
                    email: email.clone(),
                    password: password.clone(),
                    name: name.join(" "),
                    phone: None,
                })
            }
            ("whoami", []) => Command::WhoAmI,
            ("can", [capability]) => Command::Can {
                capability: capability.clone(),
            },
            ("demo-accounts", []) => Command::DemoAccounts,
            _ => bail!(USAGE),
        };

        Ok(command)
    }
}

/// Run one command, returning the text to print
pub async fn run(auth: &Authenticator, command: Command) -> Result<String, anyhow::Error> {
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let record = auth.login(&identifier, &password).await?;
            Ok(format!(
                "Signed in as {} ({}, {})",
                record.user.name, record.user.email, record.user.role
            ))
        }
        Command::Logout => {
            auth.logout().await?;
            Ok("Signed out".to_string())
        }
        Command::Refresh => {
            match auth.refresh_token().await {
                Err(e) if e.is_unauthenticated() => return Ok("Not signed in".to_string()),
                result => result?,
            };
            let claims = auth
                .current_claims()
                .ok_or_else(|| anyhow!("Refreshed credential was rejected"))?;
            Ok(match claims.expires_at() {
                Some(expiry) => format!("Session refreshed until {}", expiry.to_rfc3339()),
                None => "Session refreshed".to_string(),
            })
        }
        Command::Register(request) => {
            let response = auth.register(&request).await?;
            Ok(response
                .message
                .unwrap_or_else(|| format!("Registered {}", request.username)))
        }
        Command::WhoAmI => {
            // Decoding first ends a stale session before the profile is read
            let Some(claims) = auth.current_claims() else {
                return Ok("Not signed in".to_string());
            };
            let user = auth
                .get_current_user()
                .ok_or_else(|| anyhow!("Session has no user profile"))?;
            let permissions: Vec<&str> = user.permissions.iter().map(String::as_str).collect();
            Ok(format!(
                "{} <{}> role={} permissions=[{}] expires={}",
                user.name,
                user.email,
                user.role,
                permissions.join(", "),
                claims
                    .expires_at()
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| claims.exp.to_string())
            ))
        }
        Command::Can { capability } => {
            auth.end_if_expired();
            let allowed = auth.has_permission(&capability);
            Ok(format!(
                "{}: {}",
                capability,
                if allowed { "allowed" } else { "denied" }
            ))
        }
        Command::DemoAccounts => Ok(mock::demo_accounts()
            .iter()
            .map(|account| {
                format!(
                    "{:<6} {:<15} {}",
                    account.role.to_string(),
                    account.email,
                    account.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
