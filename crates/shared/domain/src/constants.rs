//! Domain-level constants.
//!
//! These constants define the stored names of student types and the
//! authentication role format.

// =============================================================================
// Student Types
// =============================================================================

/// Regular (undergraduate) student
pub const TYPE_STUDENT: &str = "STUDENT";

/// Master's programme student
pub const TYPE_MASTER: &str = "MASTER";

/// Doctoral student
pub const TYPE_PHD: &str = "PHD";

/// All valid student type names
pub const VALID_STUDENT_TYPES: &[&str] = &[TYPE_STUDENT, TYPE_MASTER, TYPE_PHD];

// =============================================================================
// Authentication
// =============================================================================

/// Prefix applied to a role name to form a granted authority
pub const ROLE_PREFIX: &str = "ROLE_";

/// Argon2 hash checked against when a login names an unknown user.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$q0Ua7cQ2X2m1a2zv4c6n0m3kQhQmJZr1B5i5cO2cV3w";

// =============================================================================
// Dates
// =============================================================================

/// Months per year (for years-of-studying cutoff calculation)
pub const MONTHS_PER_YEAR: u32 = 12;
