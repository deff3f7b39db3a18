use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};

mod init;
mod manifest;
mod run;

use manifest::Manifest;

#[derive(Clone, Debug)]
pub struct Context {
    pub manifest_dir: PathBuf,
    pub manifest: Manifest,
}

impl Context {
    pub fn new(manifest_dir: PathBuf, manifest: Manifest) -> Self {
        Context {
            manifest_dir,
            manifest,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Kirana - Storefront and payment server CLI", long_about = None)]
struct Opts {
    /// Path to the storefront.yaml manifest file (default: ./storefront.yaml)
    #[arg(
        long = "manifest-path",
        short = 'm',
        global = true,
        default_value = "./storefront.yaml"
    )]
    manifest_path: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Initialize Kirana with your payment gateway credentials
    Init(init::InitCommand),
    /// Start the local storefront server
    Run(run::RunCommand),
}

#[tokio::main]
async fn main() {
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            process::exit(e.exit_code());
        }
    };

    // Get the directory containing the manifest file
    let manifest_dir = opts
        .manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    // Skip environment and manifest loading for init command
    let is_init_command = matches!(opts.command, Command::Init(_));

    if !is_init_command {
        // Load environment variables from .env file in manifest directory
        load_env_file(&manifest_dir);
    }

    // Load manifest from storefront.yaml file (skip for init command)
    let manifest = if is_init_command {
        Manifest::default()
    } else {
        match Manifest::load(&opts.manifest_path) {
            Ok(manifest) => {
                eprintln!("✓ Loaded manifest from {}", opts.manifest_path.display());
                manifest
            }
            Err(e) => {
                eprintln!("Warning: {}", e);
                eprintln!("Using default configuration...");
                Manifest::default()
            }
        }
    };

    let ctx = Context::new(manifest_dir, manifest);

    if let Err(e) = handle_command(opts, &ctx).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Load environment variables from .env file in the manifest directory
fn load_env_file(manifest_path: &Path) {
    // Construct path to .env file in the manifest directory
    let env_file_path = manifest_path.join(".env");

    match dotenvy::from_path(&env_file_path) {
        Ok(_) => {
            eprintln!("✓ Loaded environment from {}", env_file_path.display());
        }
        Err(e) if e.not_found() => {
            // .env file not found is fine, just continue silently
        }
        Err(e) => {
            eprintln!(
                "Warning: Failed to load .env file at {}: {}",
                env_file_path.display(),
                e
            );
        }
    }
}

async fn handle_command(opts: Opts, ctx: &Context) -> Result<(), String> {
    match opts.command {
        Command::Init(cmd) => cmd.execute(ctx).await,
        Command::Run(cmd) => cmd.execute(ctx).await,
    }
}
