//! Core domain logic for the registro service.
//! This crate is the single source of truth for record-store invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::registro::{
    parse_registro_id, Registro, RegistroDraft, RegistroFields, RegistroId,
    RegistroValidationError,
};
pub use repo::registro_repo::{
    InMemoryRegistroRepository, RegistroRepository, RepoError, RepoResult,
};
pub use service::registro_service::{
    RegistroList, RegistroService, RegistroServiceError, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
