//! CLI argument parsing with clap derive

use std::ffi::OsString;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, ClusterFlags, OutputFlags};
use crate::commands;
use crate::infra::config::YamlTemplateStore;

/// Disposable debugging pods for Kubernetes
#[derive(Parser)]
#[command(
    name = "testpod",
    version,
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Kubeconfig to use
    #[arg(long, global = true, env = "KUBECONFIG", value_name = "PATH")]
    pub kubeconfig: Option<OsString>,

    /// Use the kubeconfig in place instead of a temporary copy
    #[arg(long, global = true)]
    pub no_temp_kubeconfig: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Arguments for the default `run` command
    #[command(flatten)]
    pub run: commands::run::RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a testpod, open a shell in it, and delete it on exit (default)
    Run(commands::run::RunArgs),

    /// Open a shell in an existing testpod
    Enter(commands::enter::EnterArgs),

    /// List testpods
    List(commands::list::ListArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            kubeconfig,
            no_temp_kubeconfig,
            quiet,
            no_color,
            verbose: _,
            run,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags { no_color, quiet },
            cluster: ClusterFlags {
                kubeconfig,
                no_temp_kubeconfig,
            },
        })?;

        match command.unwrap_or(Command::Run(run)) {
            Command::Run(args) => {
                let store = YamlTemplateStore::from_env()?;
                if !args.needs_cluster() {
                    return commands::run::dry_run(&args, &store, &app.managed_by);
                }
                let session = app.open_cluster()?;
                let reporter = app.reporter();
                let result = commands::run::run(
                    &app.output,
                    &reporter,
                    &args,
                    &store,
                    &app.managed_by,
                    &session.gateway,
                    commands::ctrl_c(),
                )
                .await;
                session.close(&reporter);
                result
            }
            Command::Enter(args) => {
                let store = YamlTemplateStore::from_env()?;
                let session = app.open_cluster()?;
                let reporter = app.reporter();
                let result = commands::enter::run(
                    &reporter,
                    &args,
                    &store,
                    &app.managed_by,
                    &session.gateway,
                )
                .await;
                session.close(&reporter);
                result
            }
            Command::List(args) => {
                let session = app.open_cluster()?;
                let result = commands::list::run(&args, &app.managed_by, &session.gateway).await;
                session.close(&app.reporter());
                result
            }
        }
    }
}
