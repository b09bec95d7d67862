// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! osc main entry point - CLI and commands.

use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use osc::client::{ClientConfig, ConfigOverrides, OpenShiftClient};
use osc::config::{self, Config, EnvPaths, LoadingRules};
use osc::error::LoginError;
use osc::login::{switch_project, LoginFlow, LoginOptions, LoginSummary};
use osc::prompt::TerminalPrompter;
use osc::telemetry::{init_telemetry, TelemetryConfig};

/// osc version string.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Value shown instead of secrets in `config view`.
const REDACTED: &str = "REDACTED";

/// osc - OpenShift command-line client.
#[derive(Parser)]
#[command(name = "osc")]
#[command(author, version, about = "OpenShift command-line client", long_about = None)]
struct Cli {
    /// Path to the config file to use
    #[arg(long, global = true)]
    config: Option<String>,

    /// Server URL
    #[arg(long, global = true)]
    server: Option<String>,

    /// Context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Namespace (project) to use
    #[arg(short = 'n', long, global = true)]
    namespace: Option<String>,

    /// Bearer token for authentication
    #[arg(long, global = true)]
    token: Option<String>,

    /// Skip server certificate verification
    #[arg(long, global = true)]
    insecure_skip_tls_verify: bool,

    /// Path to a certificate authority file
    #[arg(long, global = true)]
    certificate_authority: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to a server and save the credentials
    Login {
        /// User name
        #[arg(short, long, default_value = "")]
        username: String,

        /// Password
        #[arg(short, long, default_value = "")]
        password: String,

        /// Project to use after logging in
        #[arg(long, default_value = "")]
        project: String,
    },

    /// Show the current project, or switch to another one
    Project {
        /// Project to switch to
        name: Option<String>,
    },

    /// Show the user the current token belongs to
    Whoami,

    /// Inspect the merged configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the merged configuration
    View {
        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "yaml")]
        output: OutputFormat,

        /// Show tokens instead of redacting them
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server: self.server.clone(),
            context: self.context.clone(),
            namespace: self.namespace.clone(),
            token: self.token.clone(),
            insecure_skip_tls_verify: self.insecure_skip_tls_verify.then_some(true),
            certificate_authority: self.certificate_authority.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_telemetry(&TelemetryConfig::from_verbosity(cli.verbose))?;

    let env = EnvPaths::from_process();
    let rules = config::loading_rules(&env, cli.config.as_deref());

    match &cli.command {
        Commands::Login {
            username,
            password,
            project,
        } => {
            let options = LoginOptions {
                username: username.clone(),
                password: password.clone(),
                server: cli.server.clone().unwrap_or_default(),
                context: cli.context.clone().unwrap_or_default(),
                project: project.clone(),
            };
            let mut overrides = cli.overrides();
            // Login handles these itself.
            overrides.server = None;
            overrides.context = None;

            let summary = LoginFlow::new(rules, overrides, Arc::new(TerminalPrompter::new()), options)
                .with_store_fallback(env.default_store_path())
                .run()
                .await?;
            print_login_summary(&summary);
        }
        Commands::Project { name } => {
            let client = resolve_client(&rules, &cli.overrides())?;
            match name {
                Some(name) => {
                    let project = switch_project(
                        &rules,
                        env.default_store_path().as_deref(),
                        &client,
                        name,
                    )
                    .await?;
                    println!(
                        "Now using project {} on server {}.",
                        project.bright_white().bold(),
                        client.host.bright_blue()
                    );
                }
                None => println!(
                    "Using project {} on server {}.",
                    client.namespace.bright_white().bold(),
                    client.host.bright_blue()
                ),
            }
        }
        Commands::Whoami => {
            let client = resolve_client(&rules, &cli.overrides())?;
            let user = OpenShiftClient::new(&client)?.whoami().await?;
            println!("{}", user.username());
        }
        Commands::Config { action } => match action {
            ConfigAction::View { output, raw } => {
                let (mut merged, errors) = rules.load().into_parts();
                if let Some(errors) = errors {
                    eprintln!("{} {}", "warning:".yellow().bold(), errors);
                }
                if !raw {
                    redact(&mut merged);
                }
                match output {
                    OutputFormat::Yaml => {
                        let bytes = config::encode(&merged)?;
                        print!("{}", String::from_utf8_lossy(&bytes));
                    }
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&merged)?);
                    }
                }
            }
        },
        Commands::Version => {
            println!("osc {}", VERSION);
        }
    }

    Ok(())
}

fn resolve_client(rules: &LoadingRules, overrides: &ConfigOverrides) -> anyhow::Result<ClientConfig> {
    let (merged, errors) = rules.load().into_parts();
    if let Some(errors) = errors {
        tracing::warn!(error = %errors, "some config files could not be loaded");
    }
    Ok(ClientConfig::resolve(&merged, overrides)?)
}

fn redact(config: &mut Config) {
    for auth_info in config.auth_infos.values_mut() {
        if !auth_info.token.is_empty() {
            auth_info.token = REDACTED.to_string();
        }
    }
}

fn print_login_summary(summary: &LoginSummary) {
    let auth = &summary.auth;
    if auth.new_auth {
        println!("{}", "Login successful.".green().bold());
    }
    println!(
        "Logged into {} as {}.",
        summary.server.bright_blue(),
        auth.username.bright_white().bold()
    );

    let project = &summary.project;
    match project.projects.len() {
        0 => println!("\n{}", LoginError::NoProjects.to_string().yellow()),
        1 => println!("\nUsing project {}.", project.project_in_use.bright_white().bold()),
        _ => {
            println!("\nYou have access to the following projects and can switch between them with 'osc project <projectname>':\n");
            for name in &project.projects {
                if *name == project.project_in_use {
                    println!("  * {} (current)", name.bright_white().bold());
                } else {
                    println!("  * {}", name);
                }
            }
            println!("\nUsing project {}.", project.project_in_use.bright_white().bold());
        }
    }

    println!(
        "{}",
        format!("Config saved to {}", summary.config_path.display()).dimmed()
    );
}
