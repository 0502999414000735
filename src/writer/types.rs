use super::config::Precision;

/// A numeric value that is stored as either `Float32` or `UInt32` depending on
/// the configured [`Precision`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    /// Single-precision floating point value
    Float(f32),
    /// Unsigned integer value
    Unsigned(u32),
}

impl Quantity {
    /// Narrow a double-precision value into the representation selected by `precision`.
    ///
    /// Both paths round half to even: the `f32` cast is IEEE-754
    /// round-to-nearest-ties-to-even, and the integer path uses
    /// [`f64::round_ties_even`] before saturating into `[0, u32::MAX]`.
    pub fn narrow(value: f64, precision: Precision) -> Self {
        match precision {
            Precision::Float => Quantity::Float(value as f32),
            Precision::Integer => Quantity::Unsigned(round_to_u32(value)),
        }
    }

    /// Value as `f32`.
    pub fn as_f32(self) -> f32 {
        match self {
            Quantity::Float(v) => v,
            Quantity::Unsigned(v) => v as f32,
        }
    }

    /// Value as `u32`, rounding half to even if it is a float.
    pub fn as_u32(self) -> u32 {
        match self {
            Quantity::Float(v) => round_to_u32(v as f64),
            Quantity::Unsigned(v) => v,
        }
    }
}

/// Round half to even and saturate into the `u32` range. NaN maps to zero.
pub fn round_to_u32(value: f64) -> u32 {
    // `as` saturates at both ends and maps NaN to 0
    value.round_ties_even() as u32
}

/// One peak of one scan: the unit written to the mzparquet table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRow {
    /// Native scan number
    pub scan: u32,
    /// MS level
    pub level: u32,
    /// Retention time in minutes
    pub rt: f32,
    /// Peak m/z
    pub mz: f32,
    /// Peak intensity
    pub intensity: Quantity,
    /// Reserved, always `None`
    pub ion_mobility: Option<f32>,
    /// Isolation window lower bound
    pub isolation_lower: Option<f32>,
    /// Isolation window upper bound
    pub isolation_upper: Option<f32>,
    /// Scan number of the precursor scan
    pub precursor_scan: Option<u32>,
    /// Precursor m/z
    pub precursor_mz: Option<f32>,
    /// Precursor charge
    pub precursor_charge: Option<Quantity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_to_u32(0.5), 0);
        assert_eq!(round_to_u32(1.5), 2);
        assert_eq!(round_to_u32(2.5), 2);
        assert_eq!(round_to_u32(2.6), 3);
    }

    #[test]
    fn test_round_saturates() {
        assert_eq!(round_to_u32(-12.0), 0);
        assert_eq!(round_to_u32(1e12), u32::MAX);
        assert_eq!(round_to_u32(f64::NAN), 0);
    }

    #[test]
    fn test_narrow_by_precision() {
        assert_eq!(
            Quantity::narrow(1234.5, Precision::Float),
            Quantity::Float(1234.5)
        );
        assert_eq!(
            Quantity::narrow(1234.5, Precision::Integer),
            Quantity::Unsigned(1234)
        );
        assert_eq!(Quantity::Unsigned(3).as_f32(), 3.0);
        assert_eq!(Quantity::Float(3.5).as_u32(), 4);
    }
}
