use crate::model::StatMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Relative to the device root; `%s` slots take the PF name then the VF id.
pub const STATS_TEMPLATE: &str = "%s/device/sriov/%s/stats/";

/// Reads VF statistics from drivers that keep one file per counter under a
/// single per-VF directory (i40e, ice).
#[derive(Clone, Debug)]
pub struct SysfsReader {
    root: PathBuf,
    stats_template: String,
}

impl SysfsReader {
    /// `template` is relative to `root` and holds two `%s` placeholders,
    /// PF name first, VF id second. `root` itself is never substituted.
    pub fn new(root: &Path, template: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            stats_template: template.into(),
        }
    }

    /// Reader for the standard layout under `root` (normally `/sys/class/net`).
    pub fn for_root(root: &Path) -> Self {
        Self::new(root, STATS_TEMPLATE)
    }

    pub fn stats_dir(&self, pf: &str, vf: &str) -> PathBuf {
        self.root
            .join(fill_template(&self.stats_template, &[pf, vf]))
    }

    /// One entry per counter file that could be read and parsed. Symlinks,
    /// unreadable files and non-numeric contents are skipped individually.
    pub fn read_stats(&self, pf: &str, vf: &str) -> StatMap {
        let dir = self.stats_dir(pf, vf);
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "error reading stats directory");
                return StatMap::new();
            }
        };

        entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "error reading directory entry");
                    None
                }
            })
            .filter_map(|entry| read_counter(&entry))
            .collect()
    }
}

fn read_counter(entry: &fs::DirEntry) -> Option<(String, i64)> {
    let path = entry.path();
    // file_type() does not follow links.
    match entry.file_type() {
        Ok(ft) if ft.is_symlink() => {
            debug!(path = %path.display(), "cannot read symlink");
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            debug!(path = %path.display(), error = %e, "error reading file type");
            return None;
        }
    }

    let name = entry.file_name().to_string_lossy().into_owned();
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "error reading file");
            return None;
        }
    };
    match raw.trim().parse::<i64>() {
        Ok(value) => Some((name, value)),
        Err(e) => {
            debug!(file = %name, error = %e, "error parsing file");
            None
        }
    }
}

/// Whether the PF exposes the per-VF sysfs tree. Anything other than a
/// definite "not found" counts as present.
pub fn pf_supports_sysfs(root: &Path, pf: &str) -> bool {
    !matches!(root.join(pf).join("device/sriov").try_exists(), Ok(false))
}

/// Replace each `%s` in order; placeholders inside substituted values are
/// left alone.
fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut args = args.iter();
    let mut parts = template.split("%s").peekable();
    while let Some(part) = parts.next() {
        out.push_str(part);
        if parts.peek().is_some() {
            out.push_str(args.next().copied().unwrap_or(""));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn template_fills_positionally() {
        assert_eq!(
            fill_template("/sys/class/net/%s/device/sriov/%s/stats/", &["ens1f0", "3"]),
            "/sys/class/net/ens1f0/device/sriov/3/stats/"
        );
        assert_eq!(fill_template("%s-%s", &["%s", "x"]), "%s-x");
        assert_eq!(fill_template("no-slots", &["a"]), "no-slots");
    }

    #[test]
    fn for_root_builds_standard_layout() {
        let reader = SysfsReader::for_root(Path::new("/sys/class/net"));
        assert_eq!(
            reader.stats_dir("ens1f0", "0"),
            PathBuf::from("/sys/class/net/ens1f0/device/sriov/0/stats/")
        );
    }

    #[test]
    fn placeholders_in_root_are_left_alone() {
        let root = tempfile::tempdir().unwrap();
        let odd_root = root.path().join("net%s");
        let stats = odd_root.join("ens1f0/device/sriov/2/stats");
        fs::create_dir_all(&stats).unwrap();
        fs::write(stats.join("tx_packets"), "5\n").unwrap();

        let reader = SysfsReader::for_root(&odd_root);
        assert_eq!(reader.stats_dir("ens1f0", "2"), stats);
        assert_eq!(
            reader.read_stats("ens1f0", "2"),
            StatMap::from([("tx_packets".to_string(), 5)])
        );
    }

    #[test]
    fn bad_entries_are_skipped_individually() {
        let root = tempfile::tempdir().unwrap();
        let stats = root.path().join("ens1f0/device/sriov/0/stats");
        fs::create_dir_all(&stats).unwrap();
        fs::write(stats.join("tx_bytes"), "100\n").unwrap();
        fs::write(stats.join("rx_bytes"), "abc").unwrap();
        symlink(stats.join("tx_bytes"), stats.join("link_stat")).unwrap();

        let reader = SysfsReader::for_root(root.path());
        let map = reader.read_stats("ens1f0", "0");
        assert_eq!(map, StatMap::from([("tx_bytes".to_string(), 100)]));
    }

    #[test]
    fn nested_directories_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        let stats = root.path().join("ens1f0/device/sriov/1/stats");
        fs::create_dir_all(stats.join("queues")).unwrap();
        fs::write(stats.join("rx_packets"), "  -42 \n").unwrap();

        let map = SysfsReader::for_root(root.path()).read_stats("ens1f0", "1");
        assert_eq!(map, StatMap::from([("rx_packets".to_string(), -42)]));
    }

    #[test]
    fn missing_directory_gives_empty_map() {
        let root = tempfile::tempdir().unwrap();
        let reader = SysfsReader::for_root(root.path());
        assert!(reader.read_stats("ens1f0", "0").is_empty());
    }

    #[test]
    fn sysfs_probe() {
        let root = tempfile::tempdir().unwrap();
        assert!(!pf_supports_sysfs(root.path(), "ens1f0"));
        fs::create_dir_all(root.path().join("ens1f0/device/sriov")).unwrap();
        assert!(pf_supports_sysfs(root.path(), "ens1f0"));
    }
}
