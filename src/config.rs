use crate::storage::DurabilityMode;
use crate::web::StatusPolicy;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "service-versions")]
#[command(about = "Tracks current, rollback and history versions of deployed services")]
pub struct AppConfig {
    /// Address the HTTP listener binds to
    #[arg(long, env = "SERVICE_VERSIONS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Directory holding one sub-directory of records per service
    #[arg(long, env = "SERVICE_VERSIONS_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// `sync` fsyncs every save, `async` leaves flushing to the OS
    #[arg(long, env = "SERVICE_VERSIONS_DURABILITY", default_value_t = DurabilityMode::Sync)]
    pub durability: DurabilityMode,

    /// `legacy` answers every failure with 500, `precise` uses 404/400 where they apply
    #[arg(long, env = "SERVICE_VERSIONS_STATUS_POLICY", default_value_t = StatusPolicy::Legacy)]
    pub status_policy: StatusPolicy,

    /// Keep records in memory only
    #[arg(long, env = "SERVICE_VERSIONS_EPHEMERAL")]
    pub ephemeral: bool,
}

impl AppConfig {
    pub fn for_testing(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            data_dir: data_dir.into(),
            durability: DurabilityMode::Async,
            status_policy: StatusPolicy::Legacy,
            ephemeral: false,
        }
    }

    pub fn with_status_policy(mut self, status_policy: StatusPolicy) -> Self {
        self.status_policy = status_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::try_parse_from(["service-versions"]).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.durability, DurabilityMode::Sync);
        assert_eq!(config.status_policy, StatusPolicy::Legacy);
        assert!(!config.ephemeral);
    }

    #[test]
    fn test_flags() {
        let config = AppConfig::try_parse_from([
            "service-versions",
            "--bind",
            "127.0.0.1:9090",
            "--data-dir",
            "/var/lib/versions",
            "--durability",
            "async",
            "--status-policy",
            "precise",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 9090);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/versions"));
        assert_eq!(config.durability, DurabilityMode::Async);
        assert_eq!(config.status_policy, StatusPolicy::Precise);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(
            AppConfig::try_parse_from(["service-versions", "--status-policy", "strict"]).is_err()
        );
    }
}
