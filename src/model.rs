use serde::Serialize;
use std::collections::BTreeMap;

// --- Statistic map ---

/// Counter name → value for a single VF. Key sets depend on the collector
/// and on the host, callers must not assume a fixed schema.
pub type StatMap = BTreeMap<String, i64>;

// --- Structured per-PF data (rtnetlink) ---

/// Counters the kernel reports for one VF in `IFLA_VF_STATS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VfCounters {
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub broadcast: u64,
    pub multicast: u64,
    pub rx_dropped: u64,
    pub tx_dropped: u64,
}

impl VfCounters {
    /// Project the counters under their exported names.
    pub fn to_stat_map(&self) -> StatMap {
        [
            ("tx_bytes", self.tx_bytes),
            ("rx_bytes", self.rx_bytes),
            ("tx_packets", self.tx_packets),
            ("rx_packets", self.rx_packets),
            ("tx_dropped", self.tx_dropped),
            ("rx_dropped", self.rx_dropped),
            ("rx_broadcast", self.broadcast),
            ("rx_multicast", self.multicast),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), clamp_counter(value)))
        .collect()
    }
}

/// Kernel counters are unsigned; the statistic map is signed.
fn clamp_counter(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// VF records fetched for one PF, ordered by VF index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerPf {
    pub pf: String,
    pub vfs: Vec<VfCounters>,
}

impl PerPf {
    pub fn empty(pf: &str) -> Self {
        Self {
            pf: pf.to_string(),
            vfs: Vec::new(),
        }
    }
}

// --- Devices handed to a collection cycle ---

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalFunction {
    pub name: String,
    pub vfs: Vec<String>,
}

// --- Collection output ---

/// One exported record: the statistic map of one (PF, VF) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VfSample {
    pub pf: String,
    pub vf: String,
    pub collector: &'static str,
    pub stats: StatMap,
}
