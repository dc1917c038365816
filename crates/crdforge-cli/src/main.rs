//! crdforge CLI - materialize Kubernetes manifests from CRD schemas

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;

mod commands;
mod display;
mod exit_codes;

#[derive(Parser)]
#[command(name = "crdforge")]
#[command(author = "crdforge Contributors")]
#[command(version)]
#[command(about = "Materialize Kubernetes manifests from CRD schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a manifest and print it
    Render {
        /// CRD file or directory to load schemas from
        #[arg(long)]
        crd: PathBuf,

        /// Resource kind (may be omitted when exactly one CRD is loaded)
        #[arg(short = 'k', long)]
        kind: Option<String>,

        /// CRD version (defaults to the storage version)
        #[arg(long)]
        version: Option<String>,

        /// Configuration file(s) to merge, in order
        #[arg(short = 'f', long = "config")]
        config: Vec<PathBuf>,

        /// Set values on the command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Write the manifest to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration against a CRD schema
    Validate {
        /// CRD file or directory to load schemas from
        #[arg(long)]
        crd: PathBuf,

        /// Resource kind (may be omitted when exactly one CRD is loaded)
        #[arg(short = 'k', long)]
        kind: Option<String>,

        /// CRD version (defaults to the storage version)
        #[arg(long)]
        version: Option<String>,

        /// Configuration file(s) to merge, in order
        #[arg(short = 'f', long = "config")]
        config: Vec<PathBuf>,

        /// Set values on the command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Synthesize a manifest and store it as a snapshot
    Apply {
        /// CRD file or directory to load schemas from
        #[arg(long)]
        crd: PathBuf,

        /// Resource kind (may be omitted when exactly one CRD is loaded)
        #[arg(short = 'k', long)]
        kind: Option<String>,

        /// CRD version (defaults to the storage version)
        #[arg(long)]
        version: Option<String>,

        /// Configuration file(s) to merge, in order
        #[arg(short = 'f', long = "config")]
        config: Vec<PathBuf>,

        /// Set values on the command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Snapshot address (defaults to <kind>/<metadata.name>)
        #[arg(long)]
        address: Option<String>,

        /// State directory
        #[arg(long, default_value = ".crdforge/state")]
        state_dir: PathBuf,
    },

    /// Remove a stored snapshot
    Delete {
        /// Snapshot address
        address: String,

        /// State directory
        #[arg(long, default_value = ".crdforge/state")]
        state_dir: PathBuf,
    },

    /// List stored snapshots
    List {
        /// State directory
        #[arg(long, default_value = ".crdforge/state")]
        state_dir: PathBuf,
    },

    /// Print one stored snapshot
    Show {
        /// Snapshot address
        address: String,

        /// State directory
        #[arg(long, default_value = ".crdforge/state")]
        state_dir: PathBuf,

        /// Print the full snapshot record as JSON instead of the manifest
        #[arg(long)]
        json: bool,
    },

    /// Print the compiled attribute tree of a CRD version
    Schema {
        /// CRD file or directory to load schemas from
        #[arg(long)]
        crd: PathBuf,

        /// Resource kind (may be omitted when exactly one CRD is loaded)
        #[arg(short = 'k', long)]
        kind: Option<String>,

        /// CRD version (defaults to the storage version)
        #[arg(long)]
        version: Option<String>,
    },
}

fn main() -> Result<()> {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    match cli.command {
        Commands::Render {
            crd,
            kind,
            version,
            config,
            set,
            output,
        } => commands::render::run(
            &crd,
            kind.as_deref(),
            version.as_deref(),
            &config,
            &set,
            output.as_deref(),
        ),

        Commands::Validate {
            crd,
            kind,
            version,
            config,
            set,
            json,
        } => commands::validate::run(&crd, kind.as_deref(), version.as_deref(), &config, &set, json),

        Commands::Apply {
            crd,
            kind,
            version,
            config,
            set,
            address,
            state_dir,
        } => commands::apply::run(
            &crd,
            kind.as_deref(),
            version.as_deref(),
            &config,
            &set,
            address.as_deref(),
            &state_dir,
        ),

        Commands::Delete { address, state_dir } => commands::delete::run(&address, &state_dir),

        Commands::List { state_dir } => commands::list::run(&state_dir),

        Commands::Show {
            address,
            state_dir,
            json,
        } => commands::show::run(&address, &state_dir, json),

        Commands::Schema { crd, kind, version } => {
            commands::schema::run(&crd, kind.as_deref(), version.as_deref())
        }
    }
}
