mod config;
mod embeddings;
mod logging;
mod vector;

use std::ffi::{OsStr, OsString};

use anyhow::Context;

fn main() {
    // Usage check runs before logging so a bare invocation has no side effects.
    let args: Vec<OsString> = std::env::args_os().collect();
    let Some(text) = args.get(1) else {
        println!("{}", config::USAGE);
        std::process::exit(1);
    };

    // File logging is best effort; generation does not depend on it.
    let _logger = match logging::init_logging() {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e:#}");
            None
        }
    };

    if let Err(e) = real_main(text, args.len().saturating_sub(2)) {
        eprintln!("Error: {e:#}");
        log::error!("Fatal error: {:?}", e);
        log::logger().flush();
        std::process::exit(1);
    }
}

fn real_main(text: &OsStr, extra_args: usize) -> anyhow::Result<()> {
    if extra_args > 0 {
        log::warn!("Ignoring {} extra argument(s)", extra_args);
    }

    let text = text.to_str().context("text argument is not valid UTF-8")?;

    let json = vector::generate_vector(text)?;
    println!("{json}");

    log::info!("Embedding written to stdout");
    Ok(())
}
