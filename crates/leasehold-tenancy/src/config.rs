//! Tenancy coordinator configuration.

/// Occupancy cap applied to apartments created without an explicit
/// `max_occupants`.
pub const DEFAULT_MAX_OCCUPANTS: u32 = 3;

/// Configuration for the tenancy coordinator.
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Undo already-committed steps when a later write of a multi-step
    /// operation fails (default: true). When false, partial writes are
    /// left in place and only logged.
    pub compensate_failed_writes: bool,
    /// `max_occupants` for new apartments that do not specify one
    /// (default: 3). Capacity checks always read the apartment's own
    /// value.
    pub default_max_occupants: u32,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            compensate_failed_writes: true,
            default_max_occupants: DEFAULT_MAX_OCCUPANTS,
        }
    }
}
