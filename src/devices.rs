//! SR-IOV capable PFs and their VFs, as listed under the device root.

use crate::model::PhysicalFunction;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Every PF under `root` that reports `device/sriov_totalvfs`, sorted by name.
/// VF ids are `0..sriov_numvfs` in decimal. When `only` is non-empty, PFs
/// not named in it are ignored.
pub fn discover(root: &Path, only: &[String]) -> Vec<PhysicalFunction> {
    let entries = match fs::read_dir(root) {
        Ok(e) => e,
        Err(e) => {
            debug!(path = %root.display(), error = %e, "cannot list device root");
            return Vec::new();
        }
    };

    let mut pfs: Vec<PhysicalFunction> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !only.is_empty() && !only.contains(&name) {
                return None;
            }
            let device = entry.path().join("device");
            if !device.join("sriov_totalvfs").exists() {
                return None;
            }
            let numvfs = read_u32(&device.join("sriov_numvfs"))?;
            Some(PhysicalFunction {
                name,
                vfs: (0..numvfs).map(|i| i.to_string()).collect(),
            })
        })
        .collect();

    pfs.sort_by(|a, b| a.name.cmp(&b.name));
    pfs
}

fn read_u32(path: &Path) -> Option<u32> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot read VF count");
            return None;
        }
    };
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "invalid VF count");
            None
        }
    }
}
