//! Registro use-case service.
//!
//! # Responsibility
//! - Provide the list/get/create/update/delete entry points used by the
//!   HTTP layer.
//! - Resolve caller-supplied id text before reaching the repository.
//! - Emit one metadata-only log line per mutation.
//!
//! # Invariants
//! - Id text that does not parse as an integer resolves to `NotFound`, never
//!   to a parse error.
//! - Service APIs never bypass repository validation.
//! - Log lines never contain field values (names, emails, phones).

use crate::model::registro::{
    parse_registro_id, Registro, RegistroDraft, RegistroId, RegistroValidationError,
};
use crate::repo::registro_repo::{RegistroRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, RegistroServiceError>;

/// Service error for registro use-cases.
#[derive(Debug)]
pub enum RegistroServiceError {
    /// No record matches the requested id text.
    NotFound(String),
    /// Write payload failed validation.
    Validation(RegistroValidationError),
    /// Store failure that must not leak to callers.
    Internal(String),
}

impl Display for RegistroServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(raw_id) => write!(f, "registro not found: `{raw_id}`"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Internal(details) => write!(f, "internal store failure: {details}"),
        }
    }
}

impl Error for RegistroServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistroServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id.to_string()),
            RepoError::Validation(err) => Self::Validation(err),
            other @ RepoError::LockPoisoned => Self::Internal(other.to_string()),
        }
    }
}

/// Snapshot of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistroList {
    /// Records in insertion order.
    pub items: Vec<Registro>,
    pub count: usize,
}

/// Use-case service wrapper for registro CRUD operations.
pub struct RegistroService<R: RegistroRepository> {
    repo: R,
}

impl<R: RegistroRepository> RegistroService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Returns every record with its count.
    pub fn list_all(&self) -> ServiceResult<RegistroList> {
        let items = self.repo.list_registros().map_err(log_internal("list"))?;
        let count = items.len();
        Ok(RegistroList { items, count })
    }

    /// Looks up one record by caller-supplied id text.
    pub fn get_by_id(&self, raw_id: &str) -> ServiceResult<Registro> {
        let id = resolve_id(raw_id)?;
        self.repo
            .get_registro(id)
            .map_err(log_internal("get"))?
            .ok_or_else(|| RegistroServiceError::NotFound(raw_id.to_string()))
    }

    /// Creates a record from a caller payload.
    ///
    /// # Contract
    /// - Validation runs before any state change.
    /// - Returns the stored record including its assigned id.
    pub fn create(&self, draft: &RegistroDraft) -> ServiceResult<Registro> {
        match self.repo.create_registro(draft) {
            Ok(registro) => {
                info!(
                    "event=registro_create module=service status=ok id={}",
                    registro.id
                );
                Ok(registro)
            }
            Err(err) => Err(log_failure("registro_create", "-", err)),
        }
    }

    /// Replaces the mutable fields of an existing record.
    ///
    /// # Contract
    /// - Unknown id is reported before payload validation.
    /// - `id` and `created_at` are preserved; `updated_at` is refreshed.
    pub fn update(&self, raw_id: &str, draft: &RegistroDraft) -> ServiceResult<Registro> {
        let id = resolve_id(raw_id)?;
        match self.repo.update_registro(id, draft) {
            Ok(registro) => {
                info!("event=registro_update module=service status=ok id={id}");
                Ok(registro)
            }
            Err(err) => Err(log_failure("registro_update", raw_id, err)),
        }
    }

    /// Removes one record and returns it.
    pub fn delete_one(&self, raw_id: &str) -> ServiceResult<Registro> {
        let id = resolve_id(raw_id)?;
        match self.repo.delete_registro(id) {
            Ok(registro) => {
                info!("event=registro_delete module=service status=ok id={id}");
                Ok(registro)
            }
            Err(err) => Err(log_failure("registro_delete", raw_id, err)),
        }
    }

    /// Clears the collection and returns how many records were removed.
    ///
    /// Succeeds on an empty store with a count of zero.
    pub fn delete_all(&self) -> ServiceResult<usize> {
        match self.repo.delete_all_registros() {
            Ok(removed) => {
                info!("event=registro_delete_all module=service status=ok removed={removed}");
                Ok(removed)
            }
            Err(err) => Err(log_failure("registro_delete_all", "-", err)),
        }
    }
}

fn resolve_id(raw_id: &str) -> ServiceResult<RegistroId> {
    parse_registro_id(raw_id).ok_or_else(|| RegistroServiceError::NotFound(raw_id.to_string()))
}

fn log_failure(event: &str, raw_id: &str, err: RepoError) -> RegistroServiceError {
    let err = RegistroServiceError::from(err);
    match &err {
        RegistroServiceError::Internal(details) => error!(
            "event={event} module=service status=error error_code=internal error={details}"
        ),
        RegistroServiceError::NotFound(_) => {
            warn!("event={event} module=service status=error error_code=not_found id={raw_id}")
        }
        RegistroServiceError::Validation(validation) => warn!(
            "event={event} module=service status=error error_code=validation error={validation}"
        ),
    }
    err
}

fn log_internal(operation: &'static str) -> impl Fn(RepoError) -> RegistroServiceError {
    move |err| {
        let err = RegistroServiceError::from(err);
        error!("event=registro_{operation} module=service status=error error={err}");
        err
    }
}
