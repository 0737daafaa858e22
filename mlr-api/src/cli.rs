//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use mlr_common::config::ConfigOverrides;

/// Command-line arguments for mlr-api
///
/// Each option falls back to its `MLR_*` environment variable, then to the
/// TOML file, then to the compiled default.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mlr-api")]
#[command(about = "REST API for the music label registry")]
#[command(version)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "MLR_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MLR_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "MLR_DATABASE")]
    pub database: Option<PathBuf>,

    /// TOML config file (default: <config_dir>/mlr/mlr.toml)
    #[arg(short, long, env = "MLR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or full tracing filter directive
    #[arg(long, env = "MLR_LOG")]
    pub log_level: Option<String>,
}

impl Args {
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host,
            port: self.port,
            database: self.database,
            log_level: self.log_level,
        }
    }
}

/// Expand a bare level into per-crate directives
///
/// `"debug"` becomes `mlr_api=debug,mlr_common=debug,tower_http=debug`; a
/// value that already contains directives is used as given.
pub fn log_filter(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("mlr_api={level},mlr_common={level},tower_http={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_expands_per_crate() {
        assert_eq!(
            log_filter("debug"),
            "mlr_api=debug,mlr_common=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_directive_passes_through() {
        assert_eq!(log_filter("mlr_api=trace"), "mlr_api=trace");
    }

    #[test]
    fn test_flags_become_overrides() {
        let args = Args::try_parse_from(["mlr-api", "--port", "8080", "-d", "/tmp/x.db"]).unwrap();
        let overrides = args.into_overrides();
        assert_eq!(overrides.port, Some(8080));
        assert_eq!(overrides.database, Some(PathBuf::from("/tmp/x.db")));
    }
}
