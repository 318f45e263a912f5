use anyhow::Result;
use clap::Parser;
use foundry_pack::ci::CiPlatform;
use foundry_pack::commands::{self, config::Config};
use foundry_pack::config::DEFAULT_CONFIG_FILE;
use foundry_pack::manifest::DEFAULT_PACKAGE_FILE;
use foundry_pack::package::{DEFAULT_OUT_DIR, DEFAULT_PACK_DIR, PackageOptions};
use std::path::PathBuf;

/// foundry-pack - Foundry VTT module packaging tool
///
/// Link a build into the Foundry user data directory for local testing, and
/// bake release manifests and zip archives for distribution.
///
/// Inside CI the manifest version and download links are derived from the
/// pipeline environment (GitLab CI or GitHub Actions).
///
/// Examples:
///   foundry-pack link --manifest src/module.json
///   foundry-pack release --manifest src/module.json
#[derive(Parser, Debug)]
#[command(author, version = env!("FOUNDRY_PACK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to foundryconfig.json (also via FOUNDRY_CONFIG)
    #[arg(
        long = "config",
        env = "FOUNDRY_CONFIG",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_FILE,
        global = true
    )]
    config: PathBuf,

    /// CI platform whose variables and URL scheme to use
    #[arg(
        long = "ci-platform",
        env = "FOUNDRY_PACK_CI_PLATFORM",
        value_enum,
        default_value_t = CiPlatform::Gitlab,
        global = true
    )]
    ci_platform: CiPlatform,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Symlink the build output into the Foundry user data directory
    Link(LinkArgs),

    /// Remove the build from the Foundry user data directory
    Unlink(UnlinkArgs),

    /// Write the release manifest into the build output
    Manifest(PackArgs),

    /// Zip the build output into the pack directory
    Package(PackArgs),

    /// Write the release manifest, then zip the build output
    Release(PackArgs),
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Source manifest (module.json or system.json)
    #[arg(long, short, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Build output directory
    #[arg(long = "out-dir", short, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct UnlinkArgs {
    /// Source manifest (module.json or system.json)
    #[arg(long, short, value_name = "PATH")]
    pub manifest: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PackArgs {
    /// Source manifest (module.json or system.json)
    #[arg(long, short, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Build output directory
    #[arg(long = "out-dir", short, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Directory receiving the zip archives
    #[arg(long = "pack-dir", short, value_name = "DIR", default_value = DEFAULT_PACK_DIR)]
    pub pack_dir: PathBuf,

    /// package.json providing version, homepage, bugs and license
    #[arg(long = "package-json", value_name = "PATH", default_value = DEFAULT_PACKAGE_FILE)]
    pub package_json: PathBuf,
}

impl From<PackArgs> for PackageOptions {
    fn from(args: PackArgs) -> Self {
        PackageOptions::new(args.manifest)
            .with_out_dir(args.out_dir)
            .with_pack_dir(args.pack_dir)
            .with_package_json(args.package_json)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::new(foundry_pack::runtime::RealRuntime, cli.config, cli.ci_platform);

    match cli.command {
        Commands::Link(args) => commands::link(config, &args.manifest, &args.out_dir).await?,
        Commands::Unlink(args) => commands::unlink(config, &args.manifest).await?,
        Commands::Manifest(args) => commands::manifest(config, args.into()).await?,
        Commands::Package(args) => commands::package(config, args.into()).await?,
        Commands::Release(args) => commands::release(config, args.into()).await?,
    }
    Ok(())
}
