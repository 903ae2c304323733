//! yagopherd
//!
//! Resolves the daemon's configuration once at startup and hands the
//! immutable result to the server.

use anyhow::Result;
use tracing::{debug, error, info};
use yagopherd::cli::Cli;
use yagopherd::config::{self, Registry, ResolvedConfig};
use yagopherd::logging::{self, LogTarget};

fn main() -> Result<()> {
    let registry = match Registry::discover() {
        Ok(registry) => registry,
        Err(e) => {
            // Logging flags are not parsed yet; report on stderr
            logging::init(&LogTarget::Stderr, false)?;
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let cli = Cli::parse(&registry);

    logging::init(&LogTarget::parse(&cli.log.log), cli.log.verbose)?;

    let config = match config::resolve(&registry, cli.settings) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    report(&config);
    Ok(())
}

/// Log the effective settings and where each one came from.
fn report(config: &ResolvedConfig) {
    info!(
        gopherroot = %config.gopherroot().display(),
        listen = %config.listen_addr(),
        test_mode = config.test_mode(),
        "Configuration resolved"
    );
    for (name, tier) in config.sources() {
        debug!(setting = name, source = %tier, "Setting source");
    }
    match serde_yaml::to_string(config) {
        Ok(dump) => debug!("Effective configuration:\n{}", dump),
        Err(e) => debug!(error = %e, "Could not render configuration"),
    }
}
