use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use boardcfg_core::{BoardDescriptor, RegistryError};
use boardcfg_loader::{
    build_registry, bundle, load_board_dir, load_board_file, LoadError, RejectReason,
};
use clap::Parser;
use log::{error, info};

/// Validate board definitions and optionally bundle them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board files, board directories or `.bin` bundles
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Write accepted boards to a bundle file
    #[arg(short, long)]
    bundle: Option<PathBuf>,

    /// Only report problems
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let mut failed = false;
    let mut boards = Vec::new();
    for path in &args.paths {
        match load(path) {
            Ok((mut loaded, errors)) => {
                boards.append(&mut loaded);
                for e in &errors {
                    error!("{}", e);
                }
                failed |= !errors.is_empty();
            }
            Err(e) => {
                error!("{}", e);
                failed = true;
            }
        }
    }

    let (registry, rejected) = build_registry(boards);

    for rejection in &rejected {
        match &rejection.reason {
            RejectReason::Registry(RegistryError::ValidationFailed(errors)) => {
                error!("{}: {} validation errors", rejection.identifier, errors.len());
                for e in errors {
                    error!("  {}", e);
                }
            }
            _ => error!("{}", rejection),
        }
    }

    for board in &registry {
        info!(
            "{}: {} ({})",
            board.identifier,
            board.board_name().unwrap_or_default(),
            board.mcu_name().unwrap_or("any MCU")
        );
    }
    info!("{} boards accepted, {} rejected", registry.len(), rejected.len());

    if let Some(out) = &args.bundle {
        let accepted: Vec<BoardDescriptor> = registry.iter().cloned().collect();
        let written = bundle::encode(&accepted)
            .map_err(|e| e.to_string())
            .and_then(|bytes| fs::write(out, bytes).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!("Wrote bundle {}", out.display()),
            Err(e) => {
                error!("{}: {}", out.display(), e);
                failed = true;
            }
        }
    }

    if failed || !rejected.is_empty() {
        exit(1);
    }
}

/// Boards from one command-line path, plus files under it that failed
fn load(path: &Path) -> Result<(Vec<BoardDescriptor>, Vec<LoadError>), LoadError> {
    if path.is_dir() {
        return load_board_dir(path);
    }
    if path.extension().is_some_and(|ext| ext == "bin") {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok((bundle::decode(&bytes)?, Vec::new()));
    }
    load_board_file(path).map(|board| (vec![board], Vec::new()))
}
