//! splitviz: render decision-tree splits as thumbnail graphs.
//!
//! Run: `splitviz split --parent 1,2 --left 1 --right 2 --feature 0 -o split.svg`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use splitviz::config::{FeatureNames, LabelNames, TreeJob, VizConfig};
use splitviz::figure::Output;
use splitviz::source::DirectorySource;
use splitviz::viz::{SplitVisualizer, TreeVisualizer};

/// splitviz: decision-tree split visualizer
#[derive(Parser, Debug)]
#[command(name = "splitviz")]
#[command(author = "PAIML Team")]
#[command(version)]
#[command(about = "Render decision-tree splits as graphs of sample thumbnails", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory of `{index}.png` thumbnails (overrides the config)
    #[arg(short, long, global = true)]
    images: Option<PathBuf>,

    /// Feature names in feature-id order (overrides the config)
    #[arg(long, value_delimiter = ',', global = true)]
    features: Option<Vec<String>>,

    /// Class names in label order (overrides the config)
    #[arg(long, value_delimiter = ',', global = true)]
    labels: Option<Vec<String>>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one split: a parent node and its two children
    Split {
        /// Samples at the parent node
        #[arg(long, value_delimiter = ',', required = true)]
        parent: Vec<usize>,

        /// Samples sent left (feature present)
        #[arg(long, value_delimiter = ',', required = true)]
        left: Vec<usize>,

        /// Samples sent right (feature absent)
        #[arg(long, value_delimiter = ',', required = true)]
        right: Vec<usize>,

        /// Feature id tested by the split
        #[arg(long)]
        feature: usize,

        /// Output file (.svg or .png)
        #[arg(short, long, default_value = "split.svg")]
        output: PathBuf,
    },

    /// Render a multi-level tree described by a YAML job file
    Tree {
        /// Job file with `root`, `labels` and `levels`
        #[arg(long)]
        job: PathBuf,

        /// Output file (.svg or .png)
        #[arg(short, long, default_value = "tree.svg")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => VizConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VizConfig::default(),
    };
    if let Some(dir) = cli.images {
        config.image_dir = dir;
    }
    if let Some(names) = cli.features {
        config.feature_names = FeatureNames::new(names);
    }
    if let Some(names) = cli.labels {
        config.label_names = LabelNames::new(names);
    }
    let source = DirectorySource::new(config.image_dir.clone());
    log::debug!(
        "reading thumbnails from {}, {} feature names, {} label names",
        source.root().display(),
        config.feature_names.len(),
        config.label_names.len()
    );

    match cli.command {
        Command::Split {
            parent,
            left,
            right,
            feature,
            output,
        } => {
            let scene = SplitVisualizer::new(source, config)
                .render(&parent, &left, &right, feature)
                .context("rendering split")?;
            scene.figure().present(&Output::from_path(&output))?;
        }
        Command::Tree { job, output } => {
            let job = TreeJob::load(&job)
                .with_context(|| format!("loading tree job {}", job.display()))?;
            let scene = TreeVisualizer::new(source, config)
                .render(&job.root, &job.labels, &job.levels)
                .context("rendering tree")?;
            scene.figure().present(&Output::from_path(&output))?;
        }
    }

    Ok(())
}
