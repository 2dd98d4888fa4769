// # livedns-updater
//
// One-shot binary: find the public address, and if it moved since the last
// successful run, point every managed A record of the LiveDNS zone at it.
// Intended to be started periodically by cron or a systemd timer.
//
// This is a THIN integration layer. Reconciliation lives in livedns-core,
// the SOAP protocol in livedns-provider and the IP lookup in livedns-ip-http.
//
// ## Configuration
//
// Account and host list come from a JSON file, searched in order:
// 1. `LIVEDNS_CONFIG` (explicit path)
// 2. `./config.json` (accepted with a warning)
// 3. `~/.liveDnsUpdater/config.json`
//
// Environment variables:
// - `LIVEDNS_CONFIG`: Explicit config file path
// - `LIVEDNS_STATE_PATH`: IP state file (default `~/.liveDnsUpdater/.iprecord`)
// - `LIVEDNS_MODE`: `live` (default) or `dry-run`
// - `LIVEDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// mkdir -p ~/.liveDnsUpdater
// cat > ~/.liveDnsUpdater/config.json <<EOF
// { "username": "me", "password": "secret", "domain": "example.com",
//   "requiredHosts": ["", "www", "vpn"] }
// EOF
//
// LIVEDNS_MODE=dry-run livedns-updater
// ```

use anyhow::Result;
use livedns_core::config::{self, ConfigLocation, RunConfig};
use livedns_core::hostname::display_host;
use livedns_core::state::FileStateStore;
use livedns_core::{HostOutcome, RunReport, Updater};
use livedns_ip_http::HttpIpSource;
use livedns_provider::LiveDnsProvider;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (per-host failures are logged, not fatal)
/// - 1: Configuration or startup error
/// - 2: Runtime error (IP service or zone listing unreachable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdaterExitCode {
    /// Run completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error before reconciliation could start
    RuntimeError = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process-level settings read from the environment
struct Settings {
    config_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    dry_run: bool,
    log_level: Level,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        let log_level = match env::var("LIVEDNS_LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "LIVEDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let dry_run = match env::var("LIVEDNS_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "live" => false,
            "dry-run" => true,
            other => anyhow::bail!(
                "LIVEDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            config_path: non_empty_path("LIVEDNS_CONFIG"),
            state_path: non_empty_path("LIVEDNS_STATE_PATH"),
            dry_run,
            log_level,
        })
    }
}

fn non_empty_path(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Locate and parse the run configuration
fn load_run_config(settings: &Settings) -> Result<RunConfig> {
    let working_dir = env::current_dir()?;
    let home = dirs::home_dir();

    let location =
        config::locate_config_file(settings.config_path.as_deref(), &working_dir, home.as_deref())?;

    if let ConfigLocation::WorkingDirectory(path) = &location {
        warn!(
            "Using {}. Keeping credentials next to the executable is discouraged; \
            move the file to ~/{}/{}",
            path.display(),
            config::CONFIG_DIR_NAME,
            config::CONFIG_FILE_NAME
        );
    }

    let run_config = RunConfig::load(location.path())?;
    info!(
        "Configuration loaded from {}: domain {}, {} required host(s)",
        location.path().display(),
        run_config.domain(),
        run_config.required_hosts.len()
    );
    Ok(run_config)
}

/// Wire the production components together
fn build_updater(settings: &Settings, run_config: RunConfig) -> Result<Updater> {
    let state_path = match &settings.state_path {
        Some(path) => path.clone(),
        None => {
            let home = dirs::home_dir().ok_or_else(|| {
                anyhow::anyhow!("Cannot determine home directory; set LIVEDNS_STATE_PATH")
            })?;
            config::default_state_path(&home)
        }
    };

    let provider = LiveDnsProvider::new(livedns_provider::LIVEDNS_ENDPOINT, settings.dry_run)?;
    if settings.dry_run {
        warn!("LiveDNS provider running in DRY-RUN mode - no changes will be made");
    }

    let ip_source = HttpIpSource::new(run_config.ip_service_url.clone())?;
    info!("IP state file: {}", state_path.display());

    Ok(Updater::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(FileStateStore::new(state_path)),
        run_config,
    )?)
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    let run_config = match load_run_config(&settings) {
        Ok(run_config) => run_config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    let updater = match build_updater(&settings, run_config) {
        Ok(updater) => updater,
        Err(e) => {
            error!("Startup error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdaterExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match updater.run_once().await {
            Ok(report) => {
                log_report(&report, updater.config().domain());
                UpdaterExitCode::Completed
            }
            Err(e) => {
                error!("Run aborted: {}", e);
                UpdaterExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Summarize a finished run
fn log_report(report: &RunReport, domain: &str) {
    match report {
        RunReport::Unchanged { ip } => {
            tracing::debug!("IP unchanged ({}), nothing to do", ip);
        }
        RunReport::Reconciled {
            previous,
            current_ip,
            results,
            persisted,
        } => {
            let failed = report.failed_hosts();
            info!(
                "Reconciled {} host(s) from {} to {}: {} succeeded, {} failed",
                results.len(),
                previous.ip,
                current_ip,
                results.len() - failed.len(),
                failed.len()
            );
            for result in failed {
                let reason = match &result.outcome {
                    HostOutcome::CreateFailed { reason } => reason.as_str(),
                    HostOutcome::OperationError { error } => error.as_str(),
                    _ => "",
                };
                warn!(
                    "{} was not updated: {}",
                    display_host(&result.host, domain),
                    reason
                );
            }
            if !persisted {
                warn!("IP state not advanced; the next run will reconcile again");
            }
        }
    }
}
