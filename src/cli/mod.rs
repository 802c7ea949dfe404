use crate::constants::files;
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "container-digest")]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "Reads a TOML file of container images and prints the sha256 digest of each \
                  requested architecture, keyed by registry, repository, tag and architecture."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the containers TOML file
    #[arg(long, value_name = "PATH", default_value = files::CONTAINERS)]
    pub containers: PathBuf,

    /// Path to the registry credentials TOML file (ignored if missing)
    #[arg(long, value_name = "PATH", env = "CONTAINER_DIGEST_AUTH", default_value = files::AUTHENTICATION)]
    pub auth: PathBuf,

    /// Path to the output file (standard output if not given)
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Emit raw digests instead of full `registry/repository@digest` references
    #[arg(long)]
    pub digests_only: bool,

    /// Emit a bare Nix attribute set instead of a `{pkgs, ...}:` function
    #[arg(long)]
    pub nix_bare: bool,

    /// Fail when a manifest list has no entry for a requested architecture
    /// instead of falling back to the manifest list digest
    #[arg(long)]
    pub strict_platform: bool,

    /// Registry host to reach over plain HTTP (may be repeated)
    #[arg(long = "insecure-registry", value_name = "HOST")]
    pub insecure_registries: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the manifest type, digest and platforms of one image
    Inspect {
        /// Image reference (e.g., docker.io/library/busybox:latest)
        image: String,
    },

    /// Show version information
    Version,
}
