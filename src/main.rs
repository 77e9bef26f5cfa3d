use anyhow::Result;
use clap::Parser;
use module_extractor::commands::{ExtractOptions, extract};
use module_extractor::config::DEFAULT_TIMEOUT_SECS;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// module-extractor - Module Installation Utility
///
/// Extracts Magento modules from ZIP artifacts into the correct app space.
/// The target directory (app/code/<Vendor>/<Module>) is derived from each
/// artifact's etc/module.xml.
///
/// Examples:
///   module-extractor /path/to/magento https://url.to/artifact1.zip /path/to/artifact2.zip
#[derive(Parser, Debug)]
#[command(author, version = env!("MODULE_EXTRACTOR_VERSION"), about)]
struct Cli {
    /// Path to the target Magento installation (defaults to the current directory)
    #[arg(value_name = "BASE_PATH", env = "MODULE_EXTRACTOR_ROOT")]
    base_path: Option<PathBuf>,

    /// Paths or URLs of module artifacts to install
    #[arg(value_name = "ARTIFACT")]
    artifacts: Vec<OsString>,

    /// Timeout for each artifact download, in seconds
    #[arg(
        long,
        value_name = "SECS",
        env = "MODULE_EXTRACTOR_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Locators that are not valid UTF-8 are kept, lossily converted, so they
/// fail as their own artifact instead of aborting argument parsing.
fn artifact_locators(artifacts: Vec<OsString>) -> Vec<String> {
    artifacts
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(cli.verbose)))
        .init();

    let options = ExtractOptions {
        base_path: cli.base_path,
        artifacts: artifact_locators(cli.artifacts),
        timeout: Duration::from_secs(cli.timeout),
        json: cli.json,
    };

    let ok = extract(module_extractor::runtime::RealRuntime, options).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
