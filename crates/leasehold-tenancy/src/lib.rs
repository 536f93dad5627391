//! Leasehold Tenancy — assignment of users to apartments, lease
//! lifecycle, and keeping apartment occupancy consistent with the
//! tenancy records.

pub mod apartments;
mod compensation;
pub mod config;
pub mod lease;
pub mod service;
pub mod validation;

pub use apartments::OccupancyReport;
pub use config::{DEFAULT_MAX_OCCUPANTS, TenancyConfig};
pub use lease::{CreateLease, LeaseDetails, UpdateLease};
pub use service::{AssignTenant, Residence, TenancyCoordinator, TenantDetails};
