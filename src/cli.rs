//! Command-line interface.
//!
//! Parses arguments, loads configuration, turns the request into session
//! commands and renders the resulting events. Folder and file arguments
//! stand in for the pickers of a graphical front end.

use crate::category::CategoryKey;
use crate::config::Config;
use crate::exporter::default_destination;
use crate::output::OutputFormatter;
use crate::session::{Command, Event, Session};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Sort images into resolution and sharpness categories.
#[derive(Debug, Parser)]
#[command(name = "imgsort", version, about)]
pub struct Cli {
    /// Configuration file (defaults to .imgsortrc.toml, then ~/.config/imgsort/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Categorize images and print them grouped by category
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Print the categories as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Categorize images and save one category as a ZIP archive
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Category to export, e.g. "1080p (Clear)"
        #[arg(short, long)]
        category: CategoryKey,

        /// Archive path (defaults to "<category>.zip"; ".zip" is added if missing)
        #[arg(short, long, value_name = "ZIP")]
        output: Option<PathBuf>,
    },
}

/// Which images to analyze, and how.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Analyze every file directly inside this folder
    #[arg(long, value_name = "DIR", conflicts_with = "files")]
    pub folder: Option<PathBuf>,

    /// Image files to analyze, in order
    #[arg(value_name = "FILE", required_unless_present = "folder")]
    pub files: Vec<PathBuf>,

    /// Laplacian variance below which an image counts as blurry
    #[arg(long, value_name = "VARIANCE")]
    pub threshold: Option<f64>,
}

impl InputArgs {
    /// The analysis command these arguments describe.
    pub fn analyze_command(&self) -> Command {
        match &self.folder {
            Some(dir) => Command::AnalyzeFolder(dir.clone()),
            None => Command::AnalyzeFiles(crate::selection::explicit_files(self.files.iter())),
        }
    }
}

/// Runs a parsed command line.
///
/// # Errors
///
/// Fails on invalid configuration, an unreadable folder, or an archive
/// that cannot be written. A missing or empty category is only a warning.
pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Error loading configuration")?;

    match cli.command {
        CliCommand::Analyze { input, json } => {
            let mut session = open_session(&mut config, &input, !json)?;
            let event = session.dispatch(input.analyze_command())?;

            if json {
                let rendered = OutputFormatter::categories_json(session.categories())
                    .context("Error rendering JSON")?;
                println!("{}", rendered);
            } else {
                render(&event);
                OutputFormatter::categories(session.categories());
                if !session.categories().is_empty() {
                    OutputFormatter::summary_table(session.categories());
                }
            }
        }
        CliCommand::Export {
            input,
            category,
            output,
        } => {
            let mut session = open_session(&mut config, &input, true)?;
            render(&session.dispatch(input.analyze_command())?);

            let destination = output.unwrap_or_else(|| default_destination(&category));
            let event = session
                .dispatch(Command::Export {
                    category,
                    destination,
                })
                .with_context(|| format!("Error exporting {}", category))?;
            render(&event);
        }
    }

    Ok(())
}

fn open_session(config: &mut Config, input: &InputArgs, progress: bool) -> Result<Session> {
    if let Some(threshold) = input.threshold {
        config.analysis.blur_threshold = threshold;
    }
    let session = Session::from_config(config).context("Invalid configuration")?;
    Ok(session.with_progress(progress))
}

/// Prints the user-facing line for an event.
pub fn render(event: &Event) {
    match event {
        Event::Analyzed {
            inputs,
            images,
            categories,
        } => OutputFormatter::info(&format!(
            "Analyzed {} file(s): {} image(s) in {} categor{}",
            inputs,
            images,
            categories,
            if *categories == 1 { "y" } else { "ies" }
        )),
        Event::Exported(report) => OutputFormatter::export_report(report),
        Event::Warning(message) => OutputFormatter::warning(message),
    }
}
