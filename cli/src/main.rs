mod declaration;
mod policy;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tri_core::{Node, NodeKind, Outline, ValidationPolicy, Validator, apply_all_defaults};

use crate::declaration::{Settings, declare};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "tri-demo", version)]
#[command(about = "Declare, validate and resolve a sample command line specification")]
struct Cli {
    /// YAML file overriding the validation limits.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
    /// Increase log output (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the declaration and report the result.
    Check,
    /// Print a summary of the declared application.
    Outline(FormatArgs),
    /// Apply declared defaults and print the resulting settings.
    Defaults(FormatArgs),
    /// Print the effective validation policy as YAML.
    Policy(PolicyArgs),
    /// Apply defaults and run a command's action.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct FormatArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct PolicyArgs {
    /// Write the policy to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Command to run (defaults to the declared default command).
    name: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_policy(cli.policy.as_ref()).and_then(|policy| match cli.command {
        Command::Check => run_check(&policy),
        Command::Outline(args) => run_outline(&policy, args),
        Command::Defaults(args) => run_defaults(&policy, args),
        Command::Policy(args) => run_policy(&policy, args),
        Command::Run(args) => run_command(&policy, args),
    });

    match result {
        Ok(0) => {}
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_policy(path: Option<&PathBuf>) -> Result<ValidationPolicy, String> {
    policy::load_or_default(path.map(PathBuf::as_path)).map_err(|e| match path {
        Some(p) => format!("failed to load policy {}: {e}", p.display()),
        None => e.to_string(),
    })
}

/// Declares the tree and validates it. Nothing else runs on an invalid tree.
fn declare_checked(policy: &ValidationPolicy, settings: &Settings) -> Result<Node, String> {
    let tree = declare(settings);
    Validator::new(policy.clone())
        .validate(&tree)
        .map_err(|e| format!("invalid declaration: {e}"))?;
    Ok(tree)
}

/// Declares, validates and applies defaults.
fn resolve(policy: &ValidationPolicy, settings: &Settings) -> Result<Node, String> {
    let tree = declare_checked(policy, settings)?;
    apply_all_defaults(&tree).map_err(|e| format!("applying defaults failed: {e}"))?;
    Ok(tree)
}

fn run_check(policy: &ValidationPolicy) -> Result<i32, String> {
    let tree = declare_checked(policy, &Settings::default())?;
    let outline = Outline::from_tree(&tree);
    println!(
        "{} {}: declaration is valid ({} commands)",
        outline.name,
        outline.version.as_deref().unwrap_or("unversioned"),
        outline.commands.len()
    );
    Ok(0)
}

fn run_outline(policy: &ValidationPolicy, args: FormatArgs) -> Result<i32, String> {
    let tree = declare_checked(policy, &Settings::default())?;
    println!("{}", render(&Outline::from_tree(&tree), args.format)?);
    Ok(0)
}

fn run_defaults(policy: &ValidationPolicy, args: FormatArgs) -> Result<i32, String> {
    let settings = Settings::default();
    resolve(policy, &settings)?;
    println!("{}", render(&settings.snapshot(), args.format)?);
    Ok(0)
}

fn run_policy(policy: &ValidationPolicy, args: PolicyArgs) -> Result<i32, String> {
    match args.output {
        Some(path) => {
            policy::save(policy, &path)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Wrote policy to {}", path.display());
        }
        None => println!("{}", render(policy, OutputFormat::Yaml)?),
    }
    Ok(0)
}

fn run_command(policy: &ValidationPolicy, args: RunArgs) -> Result<i32, String> {
    let settings = Settings::default();
    let tree = resolve(policy, &settings)?;

    let name = match args.name {
        Some(name) => name,
        None => tree
            .text(NodeKind::DefaultCommand)
            .ok_or("no command given and no default command declared")?
            .to_string(),
    };
    let command = tree
        .find_command(&name)
        .ok_or_else(|| format!("unknown command '{name}'"))?;
    let action = command
        .action()
        .ok_or_else(|| format!("command '{name}' has no action"))?;

    info!(command = %name, "running");
    Ok(action.run(&tree))
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}
