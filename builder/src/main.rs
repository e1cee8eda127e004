// Licensed under the Apache-2.0 license

use clap::Parser;
use ec_image_builder::{build, Manifest, Sha2Crypto};
use std::path::PathBuf;

/// Assembles an EC firmware package from a build manifest.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct ImgGen {
    /// Path to the manifest TOML file
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Log each build stage
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let cli = ImgGen::parse();
    let level = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();

    let result = Manifest::load(&cli.manifest).and_then(|manifest| build(&manifest, &Sha2Crypto));
    result.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    });
}
