use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod enrich;
mod fetch;
mod pipeline;
mod publish;
mod render;
mod staging;
mod templates;
mod upload;
mod util;

#[cfg(test)]
mod test_support;

use cli::{BuildArgs, Command, ConfigArgs, RootArgs, SourceArgs, UploadArgs};
use config::{
    config_json, resolve_config, validate_config, validate_output_location, SiteConfig,
};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Build(args) => cmd_build(args),
        Command::Upload(args) => cmd_upload(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = std::env::var("SHOWROOM_LOG").unwrap_or_else(|_| {
        if verbose {
            "showroom=debug".to_string()
        } else {
            "showroom=info".to_string()
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}

fn load_site_config(source: &SourceArgs) -> Result<SiteConfig> {
    resolve_config(&source.source, source.config.as_deref())
}

/// A fatal build failure is logged, not returned: the process still exits 0.
fn cmd_build(args: BuildArgs) -> Result<()> {
    let mut config = load_site_config(&args.source)?;
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(site_url) = args.site_url {
        config.site_url = site_url;
    }
    validate_config(&config)?;
    validate_output_location(&config, &args.source.source)?;

    let build_date = chrono::Local::now().date_naive();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = match pipeline::run_build(&config, &args.source.source, build_date, &mut rng) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!("build failed: {err:#}");
            return Ok(());
        }
    };

    if args.json {
        print_json(&report)?;
    } else {
        println!(
            "Built {} cars ({} sold) into {}",
            report.items, report.sold, report.output_dir
        );
        for step in report.steps.iter().filter(|step| !step.ok) {
            println!(
                "  {:?} failed: {}",
                step.step,
                step.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    Ok(())
}

fn cmd_upload(args: UploadArgs) -> Result<()> {
    let mut config = load_site_config(&args.source)?;
    if let Some(bucket) = args.bucket {
        config.upload.bucket = bucket;
    }
    if let Some(endpoint) = args.endpoint {
        config.upload.endpoint = endpoint;
    }
    validate_config(&config)?;

    let token = std::env::var(&config.upload.token_env).ok();
    let objects = upload::run_upload(
        &args.source.source,
        &config.upload,
        token.as_deref(),
        args.dry_run,
    )?;
    for object in &objects {
        let line = serde_json::to_string(object).context("serialize upload result")?;
        println!("{line}");
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    let config = load_site_config(&args.source)?;
    validate_config(&config)?;
    println!("{}", config_json(&config)?);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
