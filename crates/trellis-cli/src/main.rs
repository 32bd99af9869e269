//! Trellis CLI - Command-line interface for the topic graph
//!
//! Thin front end over a sled-backed topic graph: create topics, wire
//! them together, and inspect the hierarchy and attached resources.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version)]
#[command(about = "Topic graph over your content library", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the graph database
    #[arg(long, global = true, default_value = ".trellis")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Link kind as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Child,
    Rating,
    Reference,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a topic (no-op if it already exists)
    Add {
        /// Topic name
        name: String,
    },

    /// List all registered topics
    List,

    /// Link a topic to another topic or to a resource URI
    Link {
        /// Source topic name
        from: String,

        /// Target: a topic name, or a resource URI like "document/abc"
        to: String,

        /// Link kind; omit for an untyped "related" link
        #[arg(short, long)]
        kind: Option<KindArg>,

        /// Free-form comment shown alongside the link
        #[arg(short, long)]
        comment: Option<String>,

        /// Quoted passage
        #[arg(short, long)]
        quote: Option<String>,

        /// Numeric score
        #[arg(short, long)]
        rate: Option<f32>,
    },

    /// Attach a child topic, creating it if needed
    AddChild {
        /// Parent topic name
        parent: String,

        /// Child topic name
        child: String,
    },

    /// Remove the relation between two topics
    Unlink {
        /// Source topic name
        from: String,

        /// Linked topic name
        to: String,
    },

    /// Show a topic's children
    Children {
        /// Topic name
        name: String,
    },

    /// Show a topic's parents
    Parents {
        /// Topic name
        name: String,
    },

    /// Show topics related by untyped links
    Related {
        /// Topic name
        name: String,
    },

    /// Show resources attached to a topic
    Resources {
        /// Topic name
        name: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Duplicate a topic's relations onto another topic
    Merge {
        /// Source topic name
        from: String,

        /// Target topic name
        into: String,
    },

    /// Delete a topic (its links are not cascade-deleted)
    Delete {
        /// Topic name
        name: String,
    },

    /// Show graph statistics
    Stats,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Add { name } => commands::add(&cli.db, &name),
        Commands::List => commands::list(&cli.db),
        Commands::Link {
            from,
            to,
            kind,
            comment,
            quote,
            rate,
        } => commands::link(&cli.db, &from, &to, kind, comment, quote, rate),
        Commands::AddChild { parent, child } => commands::add_child(&cli.db, &parent, &child),
        Commands::Unlink { from, to } => commands::unlink(&cli.db, &from, &to),
        Commands::Children { name } => commands::children(&cli.db, &name),
        Commands::Parents { name } => commands::parents(&cli.db, &name),
        Commands::Related { name } => commands::related(&cli.db, &name),
        Commands::Resources { name, json } => commands::resources(&cli.db, &name, json),
        Commands::Merge { from, into } => commands::merge(&cli.db, &from, &into),
        Commands::Delete { name } => commands::delete(&cli.db, &name),
        Commands::Stats => commands::stats(&cli.db),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
