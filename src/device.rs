//! Device descriptor used as the dispatch discriminator throughout the
//! codec, tables, and validator.

use thiserror::Error;

/// The V3D hardware revisions this crate knows how to encode and decode.
///
/// `ver` elsewhere in the crate is the raw `major * 10 + minor` value; this
/// enum is the validated, closed set of revisions the tables actually cover.
pub const RECOGNIZED_VERSIONS: [u8; 5] = [33, 40, 41, 42, 71];

#[derive(Debug, Error)]
pub enum DeviceInfoError {
    #[error("vpm_size must be positive, got {0}")]
    NonPositiveVpmSize(i32),
    #[error("qpu_count must be positive, got {0}")]
    NonPositiveQpuCount(i32),
}

/// Features of the V3D chip needed to pack, unpack, assemble, and validate
/// its shader instructions.
///
/// Ports from driver/compiler code typically carry one of these per GPU;
/// here it is a plain value threaded through every table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Simple V3D version: major * 10 + minor.
    pub ver: u8,
    /// V3D revision number.
    pub rev: u8,
    /// Size of the VPM, in bytes.
    pub vpm_size: i32,
    /// NSLC * QUPS from the core's IDENT registers.
    pub qpu_count: i32,
    /// Whether the hardware has physical accumulator registers.
    pub has_accumulators: bool,
}

impl DeviceInfo {
    pub fn new(
        ver: u8,
        rev: u8,
        vpm_size: i32,
        qpu_count: i32,
        has_accumulators: bool,
    ) -> Result<Self, DeviceInfoError> {
        if vpm_size <= 0 {
            return Err(DeviceInfoError::NonPositiveVpmSize(vpm_size));
        }
        if qpu_count <= 0 {
            return Err(DeviceInfoError::NonPositiveQpuCount(qpu_count));
        }
        Ok(DeviceInfo {
            ver,
            rev,
            vpm_size,
            qpu_count,
            has_accumulators,
        })
    }

    /// True from V3D 7.1 onward, where mux selectors are replaced by
    /// per-operand raddrs and the opcode descriptor tables switch from
    /// mux masks to a 64-bit raddr mask.
    pub fn is_v71(&self) -> bool {
        self.ver >= 71
    }

    pub fn is_at_least(&self, ver: u8) -> bool {
        self.ver >= ver
    }

    /// Whether `ver` is one of the revisions the tables were built against.
    /// Unrecognized versions fall back to v3.3 behavior for signal maps but
    /// may produce incorrect encodings elsewhere, per the external interface
    /// contract.
    pub fn is_recognized_version(&self) -> bool {
        RECOGNIZED_VERSIONS.contains(&self.ver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(matches!(
            DeviceInfo::new(42, 0, 0, 16, true),
            Err(DeviceInfoError::NonPositiveVpmSize(0))
        ));
        assert!(matches!(
            DeviceInfo::new(42, 0, 1024, 0, true),
            Err(DeviceInfoError::NonPositiveQpuCount(0))
        ));
    }

    #[test]
    fn v71_dispatch() {
        let d = DeviceInfo::new(71, 0, 1024, 8, false).unwrap();
        assert!(d.is_v71());
        let d = DeviceInfo::new(42, 0, 1024, 8, true).unwrap();
        assert!(!d.is_v71());
        assert!(d.is_at_least(40));
    }

    #[test]
    fn recognizes_known_versions() {
        for ver in RECOGNIZED_VERSIONS {
            assert!(DeviceInfo::new(ver, 0, 1024, 8, true)
                .unwrap()
                .is_recognized_version());
        }
        assert!(!DeviceInfo::new(50, 0, 1024, 8, true)
            .unwrap()
            .is_recognized_version());
    }
}
