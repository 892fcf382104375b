//! camrig - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use camrig::loader::discover::find_sources;
use camrig::loader::{classify_source, SourceLoader};
use camrig::repl::Repl;
use camrig::script::value::Value;
use camrig::util::logger;
use camrig::util::opener::open_with_default_app;
use camrig::util::session;
use camrig::{eval_str, run_file, NAME, VERSION};

/// Support toolkit for camera-rig calibration workflows
#[derive(Parser, Debug)]
#[command(name = "camrig")]
#[command(version = VERSION)]
#[command(about = "Loads and runs rig scripts", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a rig source file or package
    Run {
        /// Source to run
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Load sources and report their module contents
    Inspect {
        /// Source file, package or directory to scan
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate rig code from the command line
    Eval {
        /// Code to evaluate
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Start an interactive session
    Repl,

    /// Open a file with the system default application
    Open {
        /// File to open
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logger::init_debug();
    } else {
        logger::init();
    }

    match args.command {
        Commands::Run { path } => {
            run_file(&path)?;
        }
        Commands::Inspect { path, json } => {
            inspect(&path, json)?;
        }
        Commands::Eval { code } => {
            let value = eval_str(&code).context("failed to evaluate code")?;
            if !matches!(value, Value::Unit) {
                println!("{}", value.repr());
            }
        }
        Commands::Repl => {
            Repl::new()?.run()?;
        }
        Commands::Open { path } => {
            open_with_default_app(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
        }
        Commands::Version => {
            println!("{NAME} {VERSION}");
            println!(
                "{}@{} at {}",
                *session::USERNAME,
                *session::HOSTNAME,
                session::formatted_time()
            );
        }
    }

    Ok(())
}

/// Load one source, or every source under a directory, and print the report.
fn inspect(path: &Path, json: bool) -> Result<()> {
    let mut loader = SourceLoader::new();

    let sources = if classify_source(path).is_none() && path.is_dir() {
        find_sources(path)
    } else {
        vec![path.to_path_buf()]
    };

    for source in &sources {
        loader
            .load(source)
            .with_context(|| format!("failed to load {}", source.display()))?;
    }

    let reports = loader.reports();
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        match &report.path {
            Some(path) => println!("{} [{}] {}", report.name, report.kind, path.display()),
            None => println!("{} [{}]", report.name, report.kind),
        }
        for binding in &report.bindings {
            println!("  {}: {} = {}", binding.name, binding.type_name, binding.value);
        }
    }
    Ok(())
}
