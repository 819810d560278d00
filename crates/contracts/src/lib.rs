//! Shared types and client-side logic of the PhilGEPS dashboard: chip filters,
//! pagination, the contracts search dashboard and the CSV export use case.
//!
//! Everything here is plain Rust without browser bindings; the `frontend`
//! crate supplies the network and storage adapters.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod usecases;
