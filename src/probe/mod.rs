//! sysfs device probing: turns block-device metadata into path/value patch
//! pairs for the slot nodes of a device tree.

pub mod properties;
pub mod sysfs;

pub use properties::{parse_properties, read_properties};
pub use sysfs::{probe_block_devices, ProbeError, ProbeReport};
