use anyhow::{Context, Result};
use clap::Parser;
use container_digest::{
    auth::{DockerConfigKeychain, Keychain, MultiKeychain},
    cli::{Cli, Commands},
    config::{AuthFile, ContainersConfig},
    output::{serialize, write_output, RenderOptions},
    registry::RegistryClient,
    resolve::DigestResolver,
    results::expand_references,
    service::{inspect, DigestService},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        None => run_digest(&cli).await?,
        Some(Commands::Inspect { image }) => run_inspect(&cli, image).await?,
        Some(Commands::Version) => {
            println!("container-digest {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn run_digest(cli: &Cli) -> Result<()> {
    let containers = ContainersConfig::load(&cli.containers)
        .context("error loading containers config")?;
    let images = containers
        .image_specs()
        .context("error loading containers config")?;
    debug!(
        "Loaded {} image(s) from {}",
        images.len(),
        cli.containers.display()
    );

    let client = registry_client(cli, &containers)?;
    let service = DigestService::new(DigestResolver::new(client).strict(cli.strict_platform));

    let digests = service
        .aggregate(&images)
        .await
        .context("error fetching container digests")?;

    let results = if cli.digests_only {
        digests
    } else {
        expand_references(&digests)
    };

    let payload = serialize(
        &results,
        cli.output_format,
        RenderOptions {
            nix_bare: cli.nix_bare,
        },
    )
    .with_context(|| format!("error encoding results to {} format", cli.output_format))?;

    if let Some(path) = &cli.output {
        info!("Writing {} output to {}", cli.output_format, path.display());
    }
    write_output(cli.output.as_deref(), &payload, cli.output_format)
}

async fn run_inspect(cli: &Cli, image: &str) -> Result<()> {
    // Only labels come from the containers file here, so it may be absent
    let containers = if cli.containers.exists() {
        ContainersConfig::load(&cli.containers).context("error loading containers config")?
    } else {
        ContainersConfig::default()
    };
    let image = containers.expand_label(image);
    let client = registry_client(cli, &containers)?;

    let report = inspect(&client, &image).await?;
    println!("{}", report);
    Ok(())
}

/// Registry client using `authentication.toml` first, then the Docker config
fn registry_client(cli: &Cli, containers: &ContainersConfig) -> Result<RegistryClient> {
    let credentials = AuthFile::load(&cli.auth)
        .context("error loading authentication config")?
        .keychain(containers)
        .context("error loading authentication config")?;
    if credentials.is_empty() {
        debug!("No static credentials, falling back to Docker config");
    }

    let keychains: Vec<Box<dyn Keychain>> =
        vec![Box::new(credentials), Box::new(DockerConfigKeychain::new())];
    Ok(RegistryClient::with_insecure_registries(
        Box::new(MultiKeychain::new(keychains)),
        cli.insecure_registries.clone(),
    ))
}
