//! One collection cycle: pick a reader per PF, read every VF.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::collectors::{CollectorConfig, select_reader};
use crate::model::{PhysicalFunction, VfSample};
use crate::vfstats::VfStatsSource;

/// Samples for every VF of every PF that has a usable reader. VFs whose
/// reader returned nothing are left out.
pub fn collect(
    pfs: &[PhysicalFunction],
    priority: &[String],
    config: &CollectorConfig,
    source: &dyn VfStatsSource,
) -> Vec<VfSample> {
    let mut samples = Vec::new();
    for pf in pfs {
        let Some(reader) = select_reader(&pf.name, priority, config, source) else {
            info!(pf = %pf.name, "no collector available, skipping");
            continue;
        };
        let collector = reader.kind().as_str();
        for vf in &pf.vfs {
            let stats = reader.read_stats(&pf.name, vf);
            if stats.is_empty() {
                debug!(pf = %pf.name, vf = %vf, collector, "no stats");
                continue;
            }
            samples.push(VfSample {
                pf: pf.name.clone(),
                vf: vf.clone(),
                collector,
                stats,
            });
        }
    }
    samples
}

#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    #[serde(flatten)]
    sample: &'a VfSample,
}

/// Write samples as JSON lines, all stamped with the cycle time.
pub fn write_json_lines<W: Write>(
    out: &mut W,
    at: DateTime<Utc>,
    samples: &[VfSample],
) -> io::Result<()> {
    let timestamp = at.to_rfc3339();
    for sample in samples {
        let record = Record {
            timestamp: timestamp.clone(),
            sample,
        };
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}
