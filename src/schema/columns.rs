//! Column names of the mzparquet peak table, in schema order.

/// Native scan number from the instrument
pub const SCAN: &str = "scan";
/// MS level (1 for survey scans, 2 for MS/MS, etc.)
pub const LEVEL: &str = "level";
/// Retention time in minutes
pub const RT: &str = "rt";
/// Mass-to-charge ratio (MS:1000040)
pub const MZ: &str = "mz";
/// Peak intensity (MS:1000042)
pub const INTENSITY: &str = "intensity";
/// Ion mobility (MS:1002476), reserved and always null
pub const ION_MOBILITY: &str = "ion_mobility";
/// Lower bound of the isolation window (absolute m/z)
pub const ISOLATION_LOWER: &str = "isolation_lower";
/// Upper bound of the isolation window (absolute m/z)
pub const ISOLATION_UPPER: &str = "isolation_upper";
/// Scan number of the precursor scan
pub const PRECURSOR_SCAN: &str = "precursor_scan";
/// Precursor m/z for MS2+ scans
pub const PRECURSOR_MZ: &str = "precursor_mz";
/// Precursor charge state
pub const PRECURSOR_CHARGE: &str = "precursor_charge";

/// All columns in schema order.
pub const ALL: [&str; 11] = [
    SCAN,
    LEVEL,
    RT,
    MZ,
    INTENSITY,
    ION_MOBILITY,
    ISOLATION_LOWER,
    ISOLATION_UPPER,
    PRECURSOR_SCAN,
    PRECURSOR_MZ,
    PRECURSOR_CHARGE,
];
