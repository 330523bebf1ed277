use crate::model::StatMap;
use crate::vfstats::VfStatsSource;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub mod netlink;
pub mod sysfs;

use netlink::NetlinkReader;
use sysfs::SysfsReader;

pub const DEFAULT_SYS_CLASS_NET: &str = "/sys/class/net/";

/// Strategies that know how to read VF statistics for a PF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectorKind {
    Sysfs,
    Netlink,
}

impl CollectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectorKind::Sysfs => "sysfs",
            CollectorKind::Netlink => "netlink",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCollector(pub String);

impl FromStr for CollectorKind {
    type Err = UnknownCollector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sysfs" => Ok(CollectorKind::Sysfs),
            "netlink" => Ok(CollectorKind::Netlink),
            other => Err(UnknownCollector(other.to_string())),
        }
    }
}

/// Which strategies may be used and where the device tree lives.
/// Read once before collection starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorConfig {
    pub sysfs_enabled: bool,
    pub netlink_enabled: bool,
    pub sys_class_net: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sysfs_enabled: true,
            netlink_enabled: true,
            sys_class_net: PathBuf::from(DEFAULT_SYS_CLASS_NET),
        }
    }
}

impl CollectorConfig {
    fn is_enabled(&self, kind: CollectorKind) -> bool {
        match kind {
            CollectorKind::Sysfs => self.sysfs_enabled,
            CollectorKind::Netlink => self.netlink_enabled,
        }
    }
}

/// A reader bound to one PF for one collection cycle.
/// New drivers are supported by adding a variant here.
#[derive(Clone, Debug)]
pub enum VfStatReader {
    Netlink(NetlinkReader),
    Sysfs(SysfsReader),
}

impl VfStatReader {
    pub fn kind(&self) -> CollectorKind {
        match self {
            VfStatReader::Netlink(_) => CollectorKind::Netlink,
            VfStatReader::Sysfs(_) => CollectorKind::Sysfs,
        }
    }

    /// Statistics for one VF of `pf`. An empty map means no data this cycle.
    pub fn read_stats(&self, pf: &str, vf: &str) -> StatMap {
        match self {
            VfStatReader::Netlink(r) => r.read_stats(vf),
            VfStatReader::Sysfs(r) => r.read_stats(pf, vf),
        }
    }
}

/// Pick the reader for `pf` from `priority`, first match wins.
///
/// Disabled strategies and PFs without sysfs support fall through to the next
/// entry. An unrecognized entry stops the search and yields `None`, so a typo
/// in the list silently disables every strategy after it.
// TODO: skip unrecognized entries instead of halting once callers no longer
// depend on the fail-closed behaviour.
pub fn select_reader(
    pf: &str,
    priority: &[String],
    config: &CollectorConfig,
    source: &dyn VfStatsSource,
) -> Option<VfStatReader> {
    for name in priority {
        let kind = match name.parse::<CollectorKind>() {
            Ok(kind) => kind,
            Err(UnknownCollector(name)) => {
                warn!(pf, collector = %name, "collector not supported");
                return None;
            }
        };

        if !config.is_enabled(kind) {
            debug!(pf, collector = %kind, "collector disabled");
            continue;
        }

        match kind {
            CollectorKind::Sysfs => {
                if sysfs::pf_supports_sysfs(&config.sys_class_net, pf) {
                    info!(pf, "using sysfs collector");
                    return Some(VfStatReader::Sysfs(SysfsReader::for_root(
                        &config.sys_class_net,
                    )));
                }
                info!(pf, "pf does not support sysfs collector");
            }
            CollectorKind::Netlink => {
                info!(pf, "using netlink collector");
                return Some(VfStatReader::Netlink(NetlinkReader::new(
                    source.vf_stats(pf),
                )));
            }
        }
    }
    None
}
