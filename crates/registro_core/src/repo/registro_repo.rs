//! Registro repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the ordered registro collection.
//! - Allocate ids from a monotonically increasing counter.
//!
//! # Invariants
//! - Insertion order is display order; updates keep the record in place.
//! - The counter starts at 1, advances exactly once per successful create and
//!   is never rewound by deletes.
//! - A failed operation leaves the collection and the counter untouched.
//! - All operations run under one lock, so no caller observes a partially
//!   applied mutation.

use crate::model::registro::{Registro, RegistroDraft, RegistroId, RegistroValidationError};
use chrono::Utc;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

const FIRST_REGISTRO_ID: RegistroId = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for registro storage operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RegistroValidationError),
    NotFound(RegistroId),
    /// A previous holder of the store lock panicked mid-operation.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "registro not found: {id}"),
            Self::LockPoisoned => write!(f, "registro store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<RegistroValidationError> for RepoError {
    fn from(value: RegistroValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for registro CRUD operations.
pub trait RegistroRepository {
    fn list_registros(&self) -> RepoResult<Vec<Registro>>;
    fn get_registro(&self, id: RegistroId) -> RepoResult<Option<Registro>>;
    fn create_registro(&self, draft: &RegistroDraft) -> RepoResult<Registro>;
    fn update_registro(&self, id: RegistroId, draft: &RegistroDraft) -> RepoResult<Registro>;
    fn delete_registro(&self, id: RegistroId) -> RepoResult<Registro>;
    fn delete_all_registros(&self) -> RepoResult<usize>;
    /// Id the next successful create will receive.
    fn next_id(&self) -> RepoResult<RegistroId>;
}

struct StoreState {
    registros: Vec<Registro>,
    next_id: RegistroId,
}

impl StoreState {
    fn position(&self, id: RegistroId) -> Option<usize> {
        self.registros.iter().position(|registro| registro.id == id)
    }
}

/// Process-memory registro repository.
///
/// Nothing survives the process; the store is built empty and owned by
/// whoever constructs it.
pub struct InMemoryRegistroRepository {
    state: Mutex<StoreState>,
}

impl InMemoryRegistroRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                registros: Vec::new(),
                next_id: FIRST_REGISTRO_ID,
            }),
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl Default for InMemoryRegistroRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistroRepository for InMemoryRegistroRepository {
    fn list_registros(&self) -> RepoResult<Vec<Registro>> {
        Ok(self.lock()?.registros.clone())
    }

    fn get_registro(&self, id: RegistroId) -> RepoResult<Option<Registro>> {
        let state = self.lock()?;
        Ok(state
            .registros
            .iter()
            .find(|registro| registro.id == id)
            .cloned())
    }

    fn create_registro(&self, draft: &RegistroDraft) -> RepoResult<Registro> {
        let fields = draft.validate()?;

        let mut state = self.lock()?;
        let registro = Registro::new(state.next_id, fields, Utc::now());
        state.next_id += 1;
        state.registros.push(registro.clone());

        Ok(registro)
    }

    fn update_registro(&self, id: RegistroId, draft: &RegistroDraft) -> RepoResult<Registro> {
        let mut state = self.lock()?;
        let index = state.position(id).ok_or(RepoError::NotFound(id))?;

        // Existence wins over payload errors.
        let fields = draft.validate()?;

        let registro = &mut state.registros[index];
        registro.apply(fields, Utc::now());
        Ok(registro.clone())
    }

    fn delete_registro(&self, id: RegistroId) -> RepoResult<Registro> {
        let mut state = self.lock()?;
        let index = state.position(id).ok_or(RepoError::NotFound(id))?;
        Ok(state.registros.remove(index))
    }

    fn delete_all_registros(&self) -> RepoResult<usize> {
        let mut state = self.lock()?;
        let removed = state.registros.len();
        state.registros.clear();
        Ok(removed)
    }

    fn next_id(&self) -> RepoResult<RegistroId> {
        Ok(self.lock()?.next_id)
    }
}
