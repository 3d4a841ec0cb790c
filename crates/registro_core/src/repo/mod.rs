//! Repository layer abstractions and storage implementations.
//!
//! # Responsibility
//! - Define the data access contract for the registro collection.
//! - Keep locking and id allocation details out of the service layer.
//!
//! # Invariants
//! - Repository writes must enforce `RegistroDraft::validate()` before
//!   mutating state.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   internal failures.

pub mod registro_repo;
