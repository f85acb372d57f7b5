//! rolectl - inspect the role catalog and run access checks
//!
//! Exit codes: 0 allowed or valid, 1 denied, 2 error.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use unified_roles::cli::{Cli, Command};
use unified_roles::utils::logging::init_tracing;
use unified_roles::{
    Config, EnvOverrides, InMemoryUserStore, RoleCatalog, TracingAuditSink, UnifiedRoleService,
};

const EXIT_DENIED: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_DENIED),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let overrides = EnvOverrides::from_env().context("invalid environment configuration")?;
    let base = match &cli.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    Ok(base.with_overrides(overrides)?)
}

/// Ok(true) allow, Ok(false) deny
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli).await?;

    match cli.command {
        Command::Validate => {
            let catalog = RoleCatalog::from_config(&config.rbac.catalog)?;
            println!(
                "configuration valid: cache_ttl={}s store_timeout={}ms context={}",
                config.rbac.cache_ttl_secs, config.rbac.store_timeout_ms, config.rbac.default_context
            );
            for (role, level) in catalog.roles() {
                println!(
                    "  {:<16} level {:>3}  {} permissions",
                    role,
                    level,
                    catalog.permissions_for(role).len()
                );
            }
            println!("  {} distinct permissions", catalog.all_permissions().len());
            Ok(true)
        }
        Command::Permissions { role } => {
            let catalog = RoleCatalog::from_config(&config.rbac.catalog)?;
            if !catalog.contains_role(role) {
                anyhow::bail!("role '{}' is not defined in the catalog", role);
            }
            if role.is_admin() {
                println!("# admin is granted every well-formed permission");
            }
            for permission in catalog.permissions_for(role) {
                println!("{}", permission);
            }
            Ok(true)
        }
        Command::Check {
            users,
            user,
            permission,
            min_role,
            context,
        } => {
            let content = tokio::fs::read_to_string(&users)
                .await
                .with_context(|| format!("reading {}", users.display()))?;
            let store = Arc::new(InMemoryUserStore::from_yaml(&content)?);

            let service =
                UnifiedRoleService::from_config(&config.rbac, store, Arc::new(TracingAuditSink))?;
            let scope =
                service.scoped(context.unwrap_or_else(|| config.rbac.default_context.clone()));

            let allowed = match (permission, min_role) {
                (Some(permission), _) => scope.has_permission(&user, &permission).await?,
                (None, Some(required)) => scope.has_minimum_role(&user, required).await?,
                (None, None) => anyhow::bail!("either --permission or --min-role is required"),
            };

            println!("{}", if allowed { "allow" } else { "deny" });
            Ok(allowed)
        }
    }
}
