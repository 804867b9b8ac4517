//! Input limits, enforced consistently at the I/O boundary.

/// Maximum size of any input file or stream, in bytes (1 GiB).
///
/// Whole messages live in memory; anything larger is rejected up front with
/// a typed error before a proportional allocation is attempted.
pub const MAX_INPUT_SIZE: u64 = 1 << 30;
