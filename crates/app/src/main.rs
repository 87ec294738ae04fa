mod cli;
mod config;
mod http;
mod jobs;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::ConfigError;
use crate::http::middleware::admin_auth::{issue_token, AdminAuthError};
use crate::http::HttpError;
use crate::jobs::JobError;
use crate::wiring::WiringError;
use shopsearch_infra::db::run_migrations;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("db error: {0}")]
    Db(#[from] shopsearch_infra::db::DbPoolError),
    #[error("admin auth error: {0}")]
    AdminAuth(#[from] AdminAuthError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("job error: {0}")]
    Jobs(#[from] JobError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = config::AppConfig::from_env()?;

    if let Some(days) = cli.issue_admin_token {
        if days <= 0 {
            return Err(AppError::InvalidCli(
                "issue-admin-token needs a positive number of days".to_string(),
            ));
        }
        let secret = config
            .admin_token_secret
            .as_deref()
            .ok_or(AdminAuthError::MissingConfig)?;
        let token = issue_token(secret, days.saturating_mul(SECONDS_PER_DAY))?;
        println!("{token}");
        return Ok(());
    }

    let state = wiring::build_state(config)?;
    if let Some(pool) = state.db.as_ref() {
        run_migrations(pool).await?;
    }

    if cli.skip_rebuild {
        info!("initial index build skipped");
    } else if let Err(err) = jobs::tasks::index_refresh::run(&state).await {
        warn!(error = %err, "initial index build failed; serving an empty index");
    }

    let addr = state.config.http_addr;
    let http_state = state.clone();
    let api = tokio::spawn(async move {
        info!(%addr, "http server starting");
        http::serve(addr, http_state).await
    });

    let worker = (cli.mode.run_worker() && !state.config.refresh_interval.is_zero()).then(|| {
        let worker_state = state.clone();
        tokio::spawn(async move {
            info!("refresh scheduler starting");
            jobs::start(worker_state).await
        })
    });

    let shutdown = shutdown_signal();

    match worker {
        Some(worker) => {
            tokio::select! {
                _ = shutdown => {
                    info!("shutdown signal received");
                }
                res = api => {
                    res??;
                }
                res = worker => {
                    res??;
                }
            }
        }
        None => {
            tokio::select! {
                _ = shutdown => {
                    info!("shutdown signal received");
                }
                res = api => {
                    res??;
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
