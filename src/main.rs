//! Houdini - Entry Point

use clap::Parser;
use houdini::model::AppError;
use houdini::scenario::{run_scenario, Scenario, ScenarioReport};
use std::path::PathBuf;
use tracing::info;

/// Houdini - replay toggle and accordion scenarios against an in-memory page
#[derive(Parser, Debug)]
#[command(name = "houdini")]
#[command(version)]
#[command(about = "Replay a toggle/accordion scenario and print the resulting markup")]
pub struct Args {
    /// Path to the scenario TOML file
    pub scenario: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Force accordion mode
    #[arg(long)]
    pub accordion: bool,

    /// Collapse other accordion panels when one opens
    #[arg(long)]
    pub collapse_others: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → Scenario Options → CLI Args
    let config_file = houdini::config::load_config_with_precedence(args.config.clone())?;
    let merged = houdini::config::merge_config(config_file);
    let with_env = houdini::config::apply_env_overrides(merged);

    houdini::logging::init(&with_env.log_file_path)?;

    let scenario = Scenario::load(&args.scenario)?;
    let config = {
        let mut layered = with_env;
        layered.toggle = scenario.resolve_config(layered.toggle);

        // Flags only override when explicitly set
        let accordion_override = args.accordion.then_some(true);
        let collapse_others_override = args.collapse_others.then_some(true);
        houdini::config::apply_cli_overrides(layered, accordion_override, collapse_others_override)
    };

    info!(
        scenario = %args.scenario.display(),
        config = ?config,
        "Configuration loaded and resolved"
    );

    let report = run_scenario(&scenario, config.toggle)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    Ok(())
}

/// Human-readable report: final markup, then one line per notification.
fn format_report(report: &ScenarioReport) -> String {
    let mut out = report.markup.clone();
    out.push('\n');
    for event in &report.events {
        let name = event.kind.event_name();
        match &event.content {
            Some(id) => out.push_str(&format!("{} #{}\n", name, id)),
            None => out.push_str(&format!("{}\n", name)),
        }
    }
    out
}
