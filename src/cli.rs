//! Command line interface for `rolectl`

use crate::auth::rbac::Role;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rolectl", version, about = "Inspect the role catalog and run access checks")]
pub struct Cli {
    /// Engine configuration file (YAML); defaults plus environment otherwise
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the configuration and print the catalog
    Validate,
    /// List the permissions a role holds
    Permissions {
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    /// Run one access decision against a user file
    #[command(group(
        ArgGroup::new("query")
            .required(true)
            .args(["permission", "min_role"]),
    ))]
    Check {
        /// YAML file of the form `users: { <id>: <role> }`
        #[arg(long)]
        users: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        permission: Option<String>,
        #[arg(long, value_parser = parse_role)]
        min_role: Option<Role>,
        /// Feature area recorded in the audit event
        #[arg(long)]
        context: Option<String>,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse()
}
