//! Command-line configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::collectors::{CollectorConfig, DEFAULT_SYS_CLASS_NET};
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(name = "sriov-vfstats", version, about = "Collect per-VF statistics from SR-IOV network devices")]
pub struct Args {
    /// Enable the sysfs collector
    #[arg(long = "collector.sysfs", default_value_t = true, action = ArgAction::Set)]
    pub sysfs: bool,

    /// Enable the netlink collector
    #[arg(long = "collector.netlink", default_value_t = true, action = ArgAction::Set)]
    pub netlink: bool,

    /// Root of the network device tree
    #[arg(long = "path.sysclassnet", default_value = DEFAULT_SYS_CLASS_NET)]
    pub sys_class_net: PathBuf,

    /// Collector priority, comma separated
    #[arg(long = "collector.vfstatspriority", default_value = "sysfs,netlink")]
    pub priority: String,

    /// Only collect these PFs, comma separated or repeated
    #[arg(long = "pf", value_delimiter = ',')]
    pub pfs: Vec<String>,

    /// Seconds between collection cycles, 0 runs once
    #[arg(long, default_value_t = 0)]
    pub interval: u64,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Validated configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub collectors: CollectorConfig,
    pub priority: Vec<String>,
    pub pfs: Vec<String>,
    pub interval: Option<Duration>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let sys_class_net = resolve_path(&args.sys_class_net)?;
        let priority = split_list(&args.priority);
        if priority.is_empty() {
            return Err(ConfigError::EmptyPriority);
        }
        let pfs = args
            .pfs
            .iter()
            .map(|pf| pf.trim().to_string())
            .filter(|pf| !pf.is_empty())
            .collect();

        Ok(Self {
            collectors: CollectorConfig {
                sysfs_enabled: args.sysfs,
                netlink_enabled: args.netlink,
                sys_class_net,
            },
            priority,
            pfs,
            interval: (args.interval > 0).then(|| Duration::from_secs(args.interval)),
            log_file: args.log_file,
        })
    }
}

/// Comma separated list with surrounding whitespace trimmed per item.
/// Empty items are kept so they reach the selector as unknown collectors.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Resolve symlinks so later probes see the real tree.
fn resolve_path(path: &Path) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|source| ConfigError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sriov-vfstats").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn split_list_trims_items() {
        assert_eq!(split_list(" sysfs , netlink"), vec!["sysfs", "netlink"]);
        assert_eq!(split_list("sysfs,,netlink"), vec!["sysfs", "", "netlink"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert!(args.sysfs);
        assert!(args.netlink);
        assert_eq!(args.sys_class_net, PathBuf::from("/sys/class/net/"));
        assert_eq!(args.priority, "sysfs,netlink");
        assert_eq!(args.interval, 0);
    }

    #[test]
    fn builds_config_from_flags() {
        let root = tempfile::tempdir().unwrap();
        let root_arg = root.path().to_string_lossy().into_owned();
        let args = parse(&[
            "--collector.sysfs",
            "false",
            "--path.sysclassnet",
            &root_arg,
            "--collector.vfstatspriority",
            "netlink, sysfs",
            "--pf",
            "ens1f0,ens2f0",
            "--interval",
            "30",
        ]);

        let config = Config::from_args(args).unwrap();
        assert!(!config.collectors.sysfs_enabled);
        assert!(config.collectors.netlink_enabled);
        assert_eq!(config.collectors.sys_class_net, root.path().canonicalize().unwrap());
        assert_eq!(config.priority, vec!["netlink", "sysfs"]);
        assert_eq!(config.pfs, vec!["ens1f0", "ens2f0"]);
        assert_eq!(config.interval, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_missing_root_and_empty_priority() {
        let args = parse(&["--path.sysclassnet", "/nonexistent/path/12345"]);
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::InvalidPath { .. })
        ));

        let root = tempfile::tempdir().unwrap();
        let root_arg = root.path().to_string_lossy().into_owned();
        let args = parse(&["--path.sysclassnet", &root_arg, "--collector.vfstatspriority", " "]);
        assert!(matches!(Config::from_args(args), Err(ConfigError::EmptyPriority)));
    }
}
