use crate::model::{PerPf, StatMap};
use tracing::debug;

/// Reads VF statistics from per-PF data already fetched over rtnetlink.
/// Works for any driver that fills in `IFLA_VF_STATS`.
#[derive(Clone, Debug)]
pub struct NetlinkReader {
    data: PerPf,
}

impl NetlinkReader {
    pub fn new(data: PerPf) -> Self {
        Self { data }
    }

    /// All eight counters of VF `vf`, or an empty map when `vf` is not a
    /// valid index into the fetched records.
    pub fn read_stats(&self, vf: &str) -> StatMap {
        let id: usize = match vf.parse() {
            Ok(id) => id,
            Err(e) => {
                debug!(pf = %self.data.pf, vf, error = %e, "invalid VF id");
                return StatMap::new();
            }
        };
        match self.data.vfs.get(id) {
            Some(counters) => counters.to_stat_map(),
            None => {
                debug!(
                    pf = %self.data.pf,
                    vf = id,
                    known = self.data.vfs.len(),
                    "VF index out of range"
                );
                StatMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VfCounters;

    fn reader_with_vf2() -> NetlinkReader {
        let mut vfs = vec![VfCounters::default(); 3];
        vfs[2] = VfCounters {
            tx_bytes: 1000,
            rx_bytes: 2000,
            tx_packets: 10,
            rx_packets: 20,
            tx_dropped: 0,
            rx_dropped: 1,
            broadcast: 5,
            multicast: 3,
        };
        NetlinkReader::new(PerPf {
            pf: "ens1f0".into(),
            vfs,
        })
    }

    #[test]
    fn projects_all_counters_of_the_indexed_vf() {
        let stats = reader_with_vf2().read_stats("2");
        let expected: StatMap = [
            ("tx_bytes", 1000),
            ("rx_bytes", 2000),
            ("tx_packets", 10),
            ("rx_packets", 20),
            ("tx_dropped", 0),
            ("rx_dropped", 1),
            ("rx_broadcast", 5),
            ("rx_multicast", 3),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        assert_eq!(stats, expected);
    }

    #[test]
    fn malformed_id_gives_empty_map() {
        let reader = reader_with_vf2();
        assert!(reader.read_stats("not-a-number").is_empty());
        assert!(reader.read_stats("-1").is_empty());
        assert!(reader.read_stats("").is_empty());
    }

    #[test]
    fn out_of_range_id_gives_empty_map() {
        assert!(reader_with_vf2().read_stats("3").is_empty());
        assert!(NetlinkReader::new(PerPf::empty("ens1f0")).read_stats("0").is_empty());
    }

    #[test]
    fn repeated_reads_are_identical() {
        let reader = reader_with_vf2();
        assert_eq!(reader.read_stats("2"), reader.read_stats("2"));
    }
}
