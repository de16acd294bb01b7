use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::application::dto::OutputFormat;

/// Track container image builds, their SBOMs and CVE findings, and
/// per-tenant SLA compliance
#[derive(Parser, Debug)]
#[command(name = "image-lifecycle")]
#[command(version)]
#[command(about = "Build lifecycle tracking for multi-tenant container images", long_about = None)]
pub struct Args {
    /// Path to a config file (defaults to ./image-lifecycle.config.yml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides IMAGE_LIFECYCLE_DATABASE and the config file)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log filter for stderr diagnostics, e.g. info or image_lifecycle=debug
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Output format: json or markdown
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a pending build for a tenant and signal the builder
    RequestBuild {
        /// Tenant namespace the build belongs to
        #[arg(short, long)]
        tenant: String,

        /// Trigger source: api, webhook, or a lowercase integration name
        #[arg(long, default_value = "api")]
        trigger: String,

        /// Identity recorded in the audit trail
        #[arg(long)]
        actor: Option<String>,
    },

    /// Apply a builder's completion report to a pending build
    CompleteBuild {
        /// Build event ID
        id: i64,

        /// JSON completion payload file, or - for stdin
        #[arg(short, long, value_name = "FILE")]
        payload: String,
    },

    /// Mark a pending build as failed
    FailBuild {
        /// Build event ID
        id: i64,

        /// Why the build failed
        #[arg(short, long)]
        reason: String,
    },

    /// Show one build event
    ShowBuild {
        /// Build event ID
        id: i64,
    },

    /// List a tenant's build events, newest first
    ListBuilds {
        #[arg(short, long)]
        tenant: String,
    },

    /// Inspect images
    #[command(subcommand)]
    Images(ImagesCommand),

    /// Manage tenants
    #[command(subcommand)]
    Customers(CustomersCommand),

    /// Evaluate and inspect SLA violations
    #[command(subcommand)]
    Sla(SlaCommand),

    /// Inspect the audit trail
    #[command(subcommand)]
    Audit(AuditCommand),
}

#[derive(Subcommand, Debug)]
pub enum ImagesCommand {
    /// List images, optionally for one tenant
    List {
        #[arg(short, long)]
        tenant: Option<String>,
    },
    /// Show an image with its SBOM records and CVE findings
    Show {
        /// Image ID
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomersCommand {
    /// List registered tenants
    List,
    /// Show one tenant
    Show {
        /// Tenant namespace
        namespace: String,
    },
    /// Register a tenant
    Add(AddCustomerArgs),
}

#[derive(ClapArgs, Debug)]
pub struct AddCustomerArgs {
    /// Tenant namespace
    pub namespace: String,

    /// Display name
    #[arg(short, long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub contact: String,

    /// SLA tier: premium, standard, or any other label (exempt)
    #[arg(long, default_value = "")]
    pub tier: String,
}

#[derive(Subcommand, Debug)]
pub enum SlaCommand {
    /// Run one SLA sweep over every tenant
    Evaluate,
    /// Run SLA sweeps on the configured interval until interrupted
    Watch {
        /// Override the sweep interval in seconds
        #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// List a tenant's SLA violations
    List {
        #[arg(short, long)]
        tenant: String,

        /// Only show violations that are still active
        #[arg(long)]
        active: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// List a tenant's audit entries in insertion order
    List {
        #[arg(short, long)]
        tenant: String,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_build() {
        let args = Args::try_parse_from([
            "image-lifecycle",
            "request-build",
            "--tenant",
            "acme",
            "--trigger",
            "webhook",
        ])
        .unwrap();

        match args.command {
            Command::RequestBuild {
                tenant,
                trigger,
                actor,
            } => {
                assert_eq!(tenant, "acme");
                assert_eq!(trigger, "webhook");
                assert!(actor.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "image-lifecycle",
            "images",
            "show",
            "4",
            "--format",
            "md",
            "--database",
            "state.db",
        ])
        .unwrap();

        assert_eq!(args.format, Some(OutputFormat::Markdown));
        assert_eq!(args.database, Some(PathBuf::from("state.db")));
        assert!(matches!(args.command, Command::Images(ImagesCommand::Show { id: 4 })));
    }

    #[test]
    fn test_parse_complete_build_requires_payload() {
        let result = Args::try_parse_from(["image-lifecycle", "complete-build", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_format() {
        let result = Args::try_parse_from(["image-lifecycle", "--format", "xml", "sla", "evaluate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_customers_add() {
        let args = Args::try_parse_from([
            "image-lifecycle",
            "customers",
            "add",
            "acme",
            "--name",
            "Acme Corp",
            "--tier",
            "premium",
        ])
        .unwrap();

        match args.command {
            Command::Customers(CustomersCommand::Add(add)) => {
                assert_eq!(add.namespace, "acme");
                assert_eq!(add.name, "Acme Corp");
                assert_eq!(add.contact, "");
                assert_eq!(add.tier, "premium");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_watch_interval_must_be_positive() {
        let result = Args::try_parse_from(["image-lifecycle", "sla", "watch", "--interval", "0"]);
        assert!(result.is_err());
    }
}
