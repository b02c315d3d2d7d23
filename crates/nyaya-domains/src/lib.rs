pub mod forms;
pub mod rights;

use nyaya_core::{catalog::RightsCatalog, GuidanceResult};

/// The built-in rights library, validated.
pub fn seed_catalog() -> GuidanceResult<RightsCatalog> {
    RightsCatalog::new(rights::seed_records())
}
