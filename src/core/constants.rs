//! Propagation model defaults and solver parameters

/// Path-loss exponent of the ideal free-space relation (dB form, 10·2)
pub const IDEAL_PATH_LOSS_EXPONENT: f64 = 20.0;

/// Path-loss exponent measured for the lossier indoor deployment
pub const INDOOR_PATH_LOSS_EXPONENT: f64 = 28.0;

/// Signal strength observed at 1 m from an access point (dBm)
///
/// Follows from the transmit power `P` as `10·log10(P / 4π)` at `D = 1`.
pub const DEFAULT_RSSI_AT_ONE_METER: f64 = -32.0;

/// Number of reference points the closed-form solver consumes
pub const REQUIRED_REFERENCE_POINTS: usize = 3;

/// Below this magnitude a solver denominator is treated as zero
pub const DEFAULT_DEGENERACY_EPSILON: f64 = 1e-9;
