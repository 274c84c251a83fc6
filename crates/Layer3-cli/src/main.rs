//! Community Hub CLI - Main entry point

mod demo;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hub_core::{HubConfig, HubContext, InstallReport, Props};
use hub_foundation::HUB_CONFIG_FILE;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Community Hub - plugin registry and event bus demo shell
#[derive(Parser, Debug)]
#[command(name = "hub")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file to use instead of the global/project hub.json
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scripted session across all demo plugins
    Demo,
    /// List registered plugins
    Plugins,
    /// Install plugins (dependencies are installed first)
    Install {
        /// Plugin IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Install and render a single plugin
    Render {
        /// Plugin ID
        id: String,

        /// Props as a JSON object
        #[arg(short, long)]
        props: Option<String>,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the project hub.json
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config = match &args.config {
        Some(path) => HubConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HubConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load {}: {}", HUB_CONFIG_FILE, e);
            HubConfig::default()
        }),
    };

    let ctx = HubContext::new(config);
    demo::register_all(&ctx)?;

    match args.command.unwrap_or(Command::Demo) {
        Command::Demo => run_demo(&ctx),
        Command::Plugins => list_plugins_cmd(&ctx),
        Command::Install { ids } => install_cmd(&ctx, &ids),
        Command::Render { id, props } => render_cmd(&ctx, &id, props.as_deref()),
        Command::Config { save } => config_cmd(&ctx, save),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_demo(ctx: &HubContext) -> anyhow::Result<()> {
    let report = ctx.install_configured();
    print_report(&report);

    let emitted = demo::run_script(ctx)?;
    info!(emitted, "Scripted session finished");

    println!();
    print_navigation(ctx);

    let mut props = Props::new();
    props.insert("user".into(), Value::from("ada"));

    for plugin in ctx.registry().installed_plugins() {
        if let Some(tab) = ctx.themed_plugin(&plugin.id)? {
            println!();
            match tab.render(&props) {
                Ok(output) => println!("{}", output),
                Err(e) => eprintln!("✗ {} failed to render: {}", plugin.id, e),
            }
        }
    }

    println!();
    println!(
        "{} events emitted, {} kept in history, {} listeners attached",
        ctx.bus().emission_count(),
        ctx.bus().history().len(),
        ctx.bus().listener_count(None)
    );
    Ok(())
}

fn list_plugins_cmd(ctx: &HubContext) -> anyhow::Result<()> {
    let registry = ctx.registry();
    println!(
        "{:<6} {:<16} {:<12} {:<10} DEPENDENCIES",
        "ORDER", "ID", "STATE", "LISTENERS"
    );
    for plugin in registry.all_plugins() {
        let deps = if plugin.dependencies.is_empty() {
            "-".to_string()
        } else {
            plugin.dependencies.join(", ")
        };
        println!(
            "{:<6} {:<16} {:<12} {:<10} {}",
            plugin.order,
            plugin.id,
            registry.state(&plugin.id).to_string(),
            ctx.bus().owned_listener_count(&plugin.id),
            deps
        );
    }
    Ok(())
}

fn install_cmd(ctx: &HubContext, ids: &[String]) -> anyhow::Result<()> {
    let report = ctx.install_many(ids);
    print_report(&report);
    print_navigation(ctx);
    report.into_result()?;
    Ok(())
}

fn render_cmd(ctx: &HubContext, id: &str, props: Option<&str>) -> anyhow::Result<()> {
    let props: Props = match props {
        Some(raw) => serde_json::from_str(raw).context("Props must be a JSON object")?,
        None => Props::new(),
    };

    ctx.install(id)?;
    let tab = ctx
        .themed_plugin(id)?
        .with_context(|| format!("Plugin '{}' is not installed", id))?;
    println!("{}", tab.render(&props)?);
    Ok(())
}

fn config_cmd(ctx: &HubContext, save: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(ctx.config())?);
    if save {
        let path = ctx.config().save_project()?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_report(report: &InstallReport) {
    for id in &report.installed {
        println!("✓ installed {}", id);
    }
    for (id, err) in &report.failed {
        println!("✗ {} could not be installed: {}", id, err);
    }
}

fn print_navigation(ctx: &HubContext) {
    let tabs: Vec<String> = ctx
        .registry()
        .installed_plugins()
        .iter()
        .map(|p| format!("{} {}", p.icon, p.name))
        .collect();
    if tabs.is_empty() {
        println!("No plugins installed.");
    } else {
        println!("{}", tabs.join("  │  "));
    }
}
