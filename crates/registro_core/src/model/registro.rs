//! Registro domain model.
//!
//! # Responsibility
//! - Define the canonical record kept by the store.
//! - Define the caller payload for writes and its validation rules.
//!
//! # Invariants
//! - `id` is assigned by the store, never reused and never mutated.
//! - `created_at` is set once at creation.
//! - `updated_at` is `None` until the first successful update.
//! - Writes only accept `RegistroFields`, which can only be obtained through
//!   `RegistroDraft::validate()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned numeric identifier.
pub type RegistroId = u64;

/// Canonical record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registro {
    pub id: RegistroId,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    /// Serialized as `createdAt` (RFC 3339).
    pub created_at: DateTime<Utc>,
    /// Serialized as `updatedAt`; omitted until the record is modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Registro {
    /// Builds a freshly created record from validated fields.
    pub fn new(id: RegistroId, fields: RegistroFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            nombre: fields.nombre,
            email: fields.email,
            telefono: fields.telefono,
            created_at,
            updated_at: None,
        }
    }

    /// Replaces every mutable field as one unit.
    ///
    /// `id` and `created_at` are left untouched.
    pub fn apply(&mut self, fields: RegistroFields, updated_at: DateTime<Utc>) {
        self.nombre = fields.nombre;
        self.email = fields.email;
        self.telefono = fields.telefono;
        self.updated_at = Some(updated_at);
    }

    /// Returns whether the record went through at least one update.
    pub fn is_modified(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Unvalidated caller payload for create and update.
///
/// Missing keys, `null` and empty strings are all treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistroDraft {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

impl RegistroDraft {
    /// Convenience constructor for fully populated drafts.
    pub fn new(
        nombre: impl Into<String>,
        email: impl Into<String>,
        telefono: impl Into<String>,
    ) -> Self {
        Self {
            nombre: Some(nombre.into()),
            email: Some(email.into()),
            telefono: Some(telefono.into()),
        }
    }

    /// Validates the draft into writable fields.
    ///
    /// # Errors
    /// - `MissingFields` when any field is absent or empty. Checked first and
    ///   reported once for all three fields.
    /// - `InvalidEmail` when `email` has no `@`.
    pub fn validate(&self) -> Result<RegistroFields, RegistroValidationError> {
        let (Some(nombre), Some(email), Some(telefono)) = (
            present(&self.nombre),
            present(&self.email),
            present(&self.telefono),
        ) else {
            return Err(RegistroValidationError::MissingFields);
        };

        if !email.contains('@') {
            return Err(RegistroValidationError::InvalidEmail);
        }

        Ok(RegistroFields {
            nombre: nombre.to_string(),
            email: email.to_string(),
            telefono: telefono.to_string(),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Validated mutable fields of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistroFields {
    nombre: String,
    email: String,
    telefono: String,
}

impl RegistroFields {
    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn telefono(&self) -> &str {
        &self.telefono
    }
}

/// Validation failures for write payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistroValidationError {
    /// One or more of `nombre`, `email`, `telefono` is absent or empty.
    MissingFields,
    /// `email` does not contain `@`.
    InvalidEmail,
}

impl Display for RegistroValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "nombre, email and telefono are required"),
            Self::InvalidEmail => write!(f, "email must contain `@`"),
        }
    }
}

impl Error for RegistroValidationError {}

/// Parses caller-supplied id text by its leading integer.
///
/// Leading whitespace and one optional sign are skipped, then the run of
/// ASCII digits is read and anything after it ignored (`"1abc"` and `"1.5"`
/// both read as 1). Text with no leading digits, negative values and values
/// beyond `RegistroId` yield `None`, which callers treat as "no such record"
/// rather than as a distinct error.
pub fn parse_registro_id(raw: &str) -> Option<RegistroId> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = unsigned
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }

    let value = unsigned[..digits_len].parse::<RegistroId>().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}
