mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hm_core::model::{Color, Shape};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hm", about = "Create, inspect, and edit Hephaestus mind maps")]
struct Cli {
    /// JSON file with editor settings (layout, curves, theme)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Node fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct NodeFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Comma-separated keywords
    #[arg(long)]
    pub keywords: Option<String>,
    /// `#RGB` or `#RRGGBB`
    #[arg(long, value_parser = parse_color)]
    pub color: Option<Color>,
    /// oval, rectangle, or triangle
    #[arg(long, value_parser = parse_shape)]
    pub shape: Option<Shape>,
    /// Path to an image shown in the node
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Write an empty mind map
    New {
        file: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Summarize nodes and connections
    Info { file: PathBuf },
    /// Report structural problems without changing the file
    Lint { file: PathBuf },
    /// Add a root node, or a child when --parent is given
    Add {
        file: PathBuf,
        #[arg(long)]
        parent: Option<String>,
        #[command(flatten)]
        fields: NodeFields,
    },
    /// Change fields of an existing node
    Edit {
        file: PathBuf,
        id: String,
        #[command(flatten)]
        fields: NodeFields,
    },
    /// Connect two nodes
    Link {
        file: PathBuf,
        source: String,
        target: String,
    },
    /// Remove the first connection between two nodes
    Unlink {
        file: PathBuf,
        source: String,
        target: String,
    },
    /// Delete a node and its connections
    Remove { file: PathBuf, id: String },
    /// Export the map as SVG
    Svg {
        file: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).ok_or_else(|| format!("`{s}` is not a #RGB or #RRGGBB color"))
}

fn parse_shape(s: &str) -> Result<Shape, String> {
    Shape::parse(s).ok_or_else(|| format!("`{s}` is not oval, rectangle, or triangle"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::New { file, force } => commands::new_map(&file, force),
        Command::Info { file } => commands::info(&file, config),
        Command::Lint { file } => commands::lint(&file),
        Command::Add {
            file,
            parent,
            fields,
        } => commands::add(&file, parent.as_deref(), fields, config),
        Command::Edit { file, id, fields } => commands::edit(&file, &id, fields, config),
        Command::Link {
            file,
            source,
            target,
        } => commands::link(&file, &source, &target, config),
        Command::Unlink {
            file,
            source,
            target,
        } => commands::unlink(&file, &source, &target, config),
        Command::Remove { file, id } => commands::remove(&file, &id, config),
        Command::Svg { file, output } => commands::svg(&file, output.as_deref(), config),
    }
}
