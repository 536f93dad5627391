//! Domain models for Leasehold.
//!
//! These are the core types shared across all crates.

pub mod apartment;
pub mod tenancy;
pub mod user;
