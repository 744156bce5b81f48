//! yaconfig
//!
//! Resolves layered YAML configuration and prints the result.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use yaconfig::cli::{Cli, key_segments};
use yaconfig::config::env::branch_from_tokens;
use yaconfig::config::{ConfigResolver, sniff};
use yaconfig::format::{OutputFormat, render_map, render_value};
use yaconfig::logging::{LogTarget, init_logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut builder = ConfigResolver::builder().with_name(cli.name.as_str());
    if !cli.paths.is_empty() {
        builder = builder.with_paths(cli.paths.iter().cloned());
    }
    if let Some(base_dir) = &cli.base_dir {
        builder = builder.with_base_dir(base_dir.clone());
    }
    if let Some(package) = &cli.package {
        builder = builder.with_package(package.as_str());
    }
    if cli.no_env {
        builder = builder.without_environment();
    }

    let mut resolver = builder.build()?;

    // --set values land on top of everything, merged like any other layer
    for (key, raw) in &cli.assignments {
        let tokens = key_segments(key);
        if tokens.is_empty() {
            warn!("Ignoring assignment with empty key path: {}", key);
            continue;
        }
        resolver.update(&branch_from_tokens(&tokens, sniff(raw)));
    }

    if let Some(keyword) = &cli.check_folders {
        for created in resolver.check_folders(keyword, cli.create)? {
            info!("Created folder {}", created.display());
        }
    }

    let format = OutputFormat::from(cli.format);
    let output = match &cli.get {
        Some(key) => render_value(resolver.lookup(key)?, format),
        None => render_map(&resolver, format),
    };
    print!("{}", output);

    Ok(())
}
