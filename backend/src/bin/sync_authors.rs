//! Associate registered users with projects whose author text names them.
//!
//! Runs the additive author reconciliation pass over every project and prints
//! one line per processed project followed by a summary.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use catalog::cli::resolve_database_url;
use catalog::domain::AuthorSyncService;
use catalog::outbound::persistence::{
    DbPool, DieselProjectRepository, DieselUserRepository, PoolConfig, run_migrations,
};
use clap::Parser;
use color_eyre::eyre::WrapErr;
use tokio::runtime::Builder;

/// `sync-authors` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sync-authors",
    about = "Link projects to registered users named in their author text",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Only print the summary, not one line per project.
    #[arg(long)]
    quiet: bool,
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

async fn run(args: CliArgs) -> color_eyre::Result<()> {
    let database_url = resolve_database_url(args.database_url)?;
    run_migrations(&database_url)
        .await
        .wrap_err("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(2))
        .await
        .wrap_err("create database pool")?;

    let service = AuthorSyncService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselProjectRepository::new(pool)),
    );
    let report = service.run().await.wrap_err("author sync failed")?;

    if !args.quiet {
        for line in &report.lines {
            println!("{line}");
        }
    }
    println!("associations_created={}", report.associations_created);
    println!(
        "submissions_with_no_match={}",
        report.submissions_with_no_match
    );
    Ok(())
}
