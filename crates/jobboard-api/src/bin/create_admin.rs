//! Seed an admin account.
//!
//! Exits successfully when the email is already registered, so it is safe to
//! run on every deploy.

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jobboard_api::services::{SeedOutcome, UserService};
use jobboard_store::{DocumentStore, StoreBackend};

#[derive(Debug, Parser)]
#[command(name = "create-admin", about = "Create the job board admin account", version)]
struct Args {
    /// Admin email address
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@test.com")]
    email: String,

    /// Admin password
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123", hide_env_values = true)]
    password: String,

    /// Display name
    #[arg(long, env = "ADMIN_NAME", default_value = "Admin User")]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = DocumentStore::from_env().context("failed to configure document store")?;
    if store.backend() == StoreBackend::Memory {
        warn!("STORE_BACKEND is memory; the admin account will not outlive this process");
    }
    store.ping().await.context("document store is unreachable")?;

    let users = UserService::new(store);
    let outcome = match users.seed_admin(&args.name, &args.email, &args.password).await {
        Ok(outcome) => outcome,
        Err(e) => bail!("failed to create admin: {e}"),
    };

    match outcome {
        SeedOutcome::Created(admin) => {
            info!(user_id = %admin.id, email = %admin.email, role = %admin.role, "Admin user created");
        }
        SeedOutcome::AlreadyExists(existing) => {
            info!(email = %existing.email, role = %existing.role, "Admin user already exists");
        }
    }

    Ok(())
}
