//! Command-line demonstration of `linked_tree`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use linked_tree::{Forest, NodeIndex, SerialError, TextFormat, TreeError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Build, print, and serialize linked trees
#[derive(Parser)]
#[command(name = "linked-tree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a three-level example tree, save it as text, and load it back
    Demo {
        /// Text format to save the tree in (ron, json)
        #[arg(short, long, default_value = "ron")]
        format: TextFormat,
    },

    /// Merge paths into a single tree and print it
    Merge {
        /// Paths to merge, like `a/b/c`
        #[arg(required = true)]
        paths: Vec<String>,

        /// Separator between path segments
        #[arg(short, long, default_value = "/")]
        separator: String,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("Serialization error: {0}")]
    Serial(#[from] SerialError),
    #[error("Path '{0}' has no segments")]
    EmptyPath(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Demo { format } => run_demo(format),
        Commands::Merge { paths, separator } => run_merge(&paths, &separator),
    }
}

fn run_demo(format: TextFormat) -> Result<(), CliError> {
    let mut forest = Forest::new();
    let root = build_demo_tree(&mut forest)?;
    info!(nodes = forest.len(), "built demo tree");

    let rule = "=".repeat(52);
    print!("{}", forest.outline(root));
    println!("{}", rule);
    let text = forest.write_tree(root, format)?;
    println!("{}", text);
    println!("{}", rule);

    let reloaded = forest.read_tree(&text, format)?;
    print!("{}", forest.outline(reloaded));
    println!("{}", forest.write_tree(reloaded, format)?);
    Ok(())
}

/// Root, with three children that each have three children, the first of which has a child.
fn build_demo_tree(forest: &mut Forest<String>) -> Result<NodeIndex, TreeError> {
    let root = forest.new_node("Root".to_owned());
    for i in 1..=3 {
        let child = forest.add_child_value(root, format!("Child {}", i))?;
        for j in 1..=3 {
            let grandchild = forest.add_child_value(child, format!("Child {}-{}", i, j))?;
            if j == 1 {
                forest.add_child_value(grandchild, format!("Child {}-{}-1", i, j))?;
            }
        }
    }
    Ok(root)
}

fn run_merge(paths: &[String], separator: &str) -> Result<(), CliError> {
    let mut forest = Forest::new();
    let mut root = None;
    for path in paths {
        let mut segments = path
            .split(separator)
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_owned())
            .collect::<Vec<_>>();
        let leaf = segments
            .pop()
            .ok_or_else(|| CliError::EmptyPath(path.clone()))?;
        root = Some(forest.merge_path(root, segments, leaf)?);
    }
    if let Some(root) = root {
        print!("{}", forest.outline(root));
    }
    Ok(())
}
