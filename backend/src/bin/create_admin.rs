//! Create an administrator account, or promote an existing one.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use catalog::cli::resolve_database_url;
use catalog::domain::{AccountsService, RegistrationInput, RegistrationRequest};
use catalog::outbound::credentials::Argon2Hasher;
use catalog::outbound::persistence::{
    DbPool, DieselUploadLedger, DieselUserRepository, PoolConfig, run_migrations,
};
use clap::Parser;
use color_eyre::eyre::WrapErr;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

/// `create-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-admin",
    about = "Create an administrator account or promote an existing one",
    version
)]
struct CliArgs {
    /// Display name for a newly created account.
    #[arg(long = "name", value_name = "name")]
    display_name: String,
    /// Account email; an existing account with this email is promoted.
    #[arg(long, value_name = "email")]
    email: String,
    /// Password for a newly created account.
    #[arg(long, env = "CATALOG_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

fn registration(args: &CliArgs, password: &str) -> color_eyre::Result<RegistrationRequest> {
    RegistrationRequest::try_new(RegistrationInput {
        display_name: &args.display_name,
        email: &args.email,
        password,
        confirm_password: password,
        avatar_ref: None,
    })
    .wrap_err("invalid administrator details")
}

async fn run(args: CliArgs) -> color_eyre::Result<()> {
    let password = Zeroizing::new(args.password.clone());
    let request = registration(&args, &password)?;
    let database_url = resolve_database_url(args.database_url)?;
    run_migrations(&database_url)
        .await
        .wrap_err("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;

    let accounts = AccountsService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(Argon2Hasher::new()),
        Arc::new(DieselUploadLedger::new(pool)),
    );
    let outcome = accounts
        .create_admin(request)
        .await
        .wrap_err("create administrator")?;

    let action = if outcome.created { "created" } else { "promoted" };
    println!("{action} administrator {} <{}>", outcome.user.display_name(), outcome.user.email());
    Ok(())
}
