//! SurrealDB repository implementations.

mod apartment;
mod tenancy;
mod user;

pub use apartment::SurrealApartmentRepository;
pub use tenancy::SurrealTenancyRepository;
pub use user::SurrealUserRepository;
