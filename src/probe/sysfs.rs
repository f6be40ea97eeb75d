//! Derivation of a patch set from sysfs block-device entries.
//!
//! SATA slots (`sata<N>`) whose `device/syno_block_info` reports the ahci
//! driver yield PCIe-root and ATA-port patches for `/internal_slot@<N>`;
//! NVMe namespaces (`nvme<A>n<B>`) yield a PCIe-root patch for
//! `/nvme_slot@<A+1>`. Everything else is skipped with a note.

use crate::dts::Patch;
use crate::probe::properties::read_properties;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device {device}: missing property '{key}' in syno_block_info")]
    MissingProperty { device: String, key: String },

    #[error("device {device}: invalid ata_port_no '{value}'")]
    InvalidPort { device: String, value: String },

    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Patches derived from one probe run, plus the devices that were skipped.
#[derive(Debug, Default)]
pub struct ProbeReport {
    pub patches: Vec<Patch>,
    pub skipped: Vec<String>,
}

/// Scan the block-device directory (normally `/sys/block`) and build the
/// patch set. The root is a parameter so tests can point it at a temp tree.
pub fn probe_block_devices(sys_block: &Path) -> Result<ProbeReport, ProbeError> {
    let mut report = ProbeReport::default();

    for entry in WalkDir::new(sys_block)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ProbeError::Scan {
            path: sys_block.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if let Some(num) = parse_sata_name(&name) {
            probe_sata(&mut report, entry.path(), &name, num)?;
        } else if let Some((adapter, _namespace)) = parse_nvme_name(&name) {
            probe_nvme(&mut report, entry.path(), &name, adapter)?;
        } else {
            report.skipped.push(format!("{name}: unsupported device"));
        }
    }

    Ok(report)
}

fn probe_sata(
    report: &mut ProbeReport,
    device: &Path,
    name: &str,
    num: u32,
) -> Result<(), ProbeError> {
    let info_path = device.join("device").join("syno_block_info");
    let info = read_properties(&info_path).map_err(|source| ProbeError::Io {
        path: info_path,
        source,
    })?;

    if info.get("driver").map(String::as_str) != Some("ahci") {
        report.skipped.push(format!("{name}: not ahci"));
        return Ok(());
    }

    let pcie_path = info
        .get("pciepath")
        .ok_or_else(|| ProbeError::MissingProperty {
            device: name.to_string(),
            key: "pciepath".to_string(),
        })?;
    let port_raw = info
        .get("ata_port_no")
        .ok_or_else(|| ProbeError::MissingProperty {
            device: name.to_string(),
            key: "ata_port_no".to_string(),
        })?;
    let port: u32 = port_raw
        .trim()
        .parse()
        .map_err(|_| ProbeError::InvalidPort {
            device: name.to_string(),
            value: port_raw.clone(),
        })?;

    report.patches.push(Patch::new(
        format!("/internal_slot@{num}/ahci/pcie_root"),
        format!("\"{pcie_path}\""),
    ));
    report.patches.push(Patch::new(
        format!("/internal_slot@{num}/ahci/ata_port"),
        format!("<0x{port:02x}>"),
    ));
    Ok(())
}

fn probe_nvme(
    report: &mut ProbeReport,
    device: &Path,
    name: &str,
    adapter: u32,
) -> Result<(), ProbeError> {
    let info_path = device.join("device").join("syno_block_info");
    let info = read_properties(&info_path).map_err(|source| ProbeError::Io {
        path: info_path,
        source,
    })?;

    let pcie_path = info
        .get("pciepath")
        .ok_or_else(|| ProbeError::MissingProperty {
            device: name.to_string(),
            key: "pciepath".to_string(),
        })?;

    // Slot numbering is one-based while nvme adapters count from zero.
    report.patches.push(Patch::new(
        format!("/nvme_slot@{}/pcie_root", adapter + 1),
        format!("\"{pcie_path}\""),
    ));
    Ok(())
}

fn parse_sata_name(name: &str) -> Option<u32> {
    name.strip_prefix("sata")?.parse().ok()
}

/// `nvme<A>n<B>` with both fields numeric, e.g. `nvme0n1`.
fn parse_nvme_name(name: &str) -> Option<(u32, u32)> {
    let rest = name.strip_prefix("nvme")?;
    let split = rest.find('n')?;
    let adapter = rest[..split].parse().ok()?;
    let namespace = rest[split + 1..].parse().ok()?;
    Some((adapter, namespace))
}
