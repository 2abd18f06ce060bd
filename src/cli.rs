//! CLI argument parsing for the site build and bucket upload.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "showroom",
    version,
    about = "Static inventory site builder and bucket uploader",
    after_help = "Commands:\n  build   Fetch the inventory and render the site into the output dir\n  upload  Upload site sources to the storage bucket\n  config  Print the effective configuration as JSON\n\nExamples:\n  showroom build --source ./website\n  showroom build --source ./website --out public --json\n  showroom upload --source ./website --dry-run\n  showroom config --source ./website",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log at debug level (overridden by SHOWROOM_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the inventory and render the static site.
    Build(BuildArgs),
    /// Upload site sources to the storage bucket.
    Upload(UploadArgs),
    /// Print the effective configuration as JSON.
    Config(ConfigArgs),
}

/// Where the site sources and config live.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Site source root holding templates, static dirs and showroom.json
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub source: PathBuf,

    /// Config file to use instead of <source>/showroom.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Fetch the inventory and render the static site")]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory, relative to the source root
    #[arg(long, value_name = "DIR")]
    pub out: Option<String>,

    /// Inventory API URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Public site URL used in the sitemap and templates
    #[arg(long, value_name = "URL")]
    pub site_url: Option<String>,

    /// Seed for featured car selection, for reproducible builds
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Upload site sources to the storage bucket")]
pub struct UploadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Bucket name
    #[arg(long, value_name = "NAME")]
    pub bucket: Option<String>,

    /// Storage API endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// List the files that would be uploaded without sending them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the effective configuration as JSON")]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
