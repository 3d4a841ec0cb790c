//! Domain model for the registro collection.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the write-payload validation rules.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `RegistroId`.
//! - Deletion is a hard removal; ids are never handed out again.

pub mod registro;
