//! faust-td: run the UI builder against a Faust UI description and print
//! the resulting parameters, rename table and panel layout.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use faust_td::host::{ParameterSet, RenameRow, RenameTable, WidgetTree};
use faust_td::legalize::{legal_chan_name, legal_parname_prefix};
use faust_td::parameter::Parameter;
use faust_td::{BuildError, BuildReport, BuilderConfig, UiBuilder};

#[derive(Parser)]
#[command(name = "faust-td")]
#[command(about = "Map Faust UI descriptions onto TouchDesigner parameters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build parameters and panel from a JSON or XML UI description
    Build {
        /// UI description file written by the Faust compiler
        file: PathBuf,

        /// Builder config (defaults to ~/.faust-td/builder.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treat the operator as polyphonic
        #[arg(short, long)]
        polyphony: bool,

        /// Expose per-voice controls instead of grouping voices
        #[arg(long)]
        ungroup_voices: bool,

        /// Keep the /TD/ group in exported addresses
        #[arg(long)]
        keep_td_prefix: bool,

        /// Skip the widget panel, build parameters only
        #[arg(long)]
        params_only: bool,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Show the parameter and channel names a label legalizes to
    Legalize {
        /// Labels to legalize
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    report: BuildReport,
    parameters: Vec<&'a Parameter>,
    renames: &'a [RenameRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<Vec<String>>,
}

fn load_config(path: Option<&Path>) -> Result<BuilderConfig, BuildError> {
    match path {
        Some(path) => BuilderConfig::load_from(path),
        None => Ok(BuilderConfig::load().unwrap_or_default()),
    }
}

fn run(cli: Cli) -> Result<(), BuildError> {
    match cli.command {
        Commands::Build {
            file,
            config,
            polyphony,
            ungroup_voices,
            keep_td_prefix,
            params_only,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.polyphony |= polyphony;
            if ungroup_voices {
                config.group_voices = false;
            }
            if keep_td_prefix {
                config.strip_td_prefix = false;
            }

            let text = std::fs::read_to_string(&file)
                .map_err(|e| BuildError::parse(format!("{}: {e}", file.display()), 0, 0))?;

            let mut params = ParameterSet::new();
            let mut tree = WidgetTree::new();
            let mut renames = RenameTable::new();
            let mut builder = UiBuilder::new(config);
            let panel = if params_only { None } else { Some(&mut tree) };
            let report = builder.build_ui(&text, &mut params, panel, &mut renames)?;

            let output = BuildOutput {
                report,
                parameters: params.parameters().collect(),
                renames: &renames.rows,
                layout: (!params_only).then(|| tree.outline()),
            };
            let rendered = if json {
                serde_json::to_string_pretty(&output).map_err(|e| BuildError::host(e.to_string()))?
            } else {
                serde_yaml::to_string(&output).map_err(|e| BuildError::host(e.to_string()))?
            };
            println!("{rendered}");
        }
        Commands::Legalize { labels } => {
            for label in labels {
                println!(
                    "{label}\t{}\t{}",
                    legal_parname_prefix(&label),
                    legal_chan_name(&label)
                );
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("faust-td: {e}");
        std::process::exit(1);
    }
}
