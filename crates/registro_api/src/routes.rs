//! Registro HTTP handlers.
//!
//! Handlers stay thin: resolve inputs, call the service, wrap the result in
//! an `Envelope`. All invariants live in `registro_core`.

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use log::debug;
use registro_core::{Registro, RegistroDraft};
use serde_json::{json, Value};

pub const MSG_CREATED: &str = "Registro creado exitosamente";
pub const MSG_UPDATED: &str = "Registro actualizado exitosamente";
pub const MSG_DELETED: &str = "Registro eliminado exitosamente";

type ApiResult<T> = Result<T, ApiError>;

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "API de Registros - Actividad 3 Flutter",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api/registros": "Obtener todos los registros",
            "GET /api/registros/:id": "Obtener un registro por ID",
            "POST /api/registros": "Crear nuevo registro",
            "PUT /api/registros/:id": "Actualizar registro",
            "DELETE /api/registros/:id": "Eliminar registro",
            "DELETE /api/registros": "Eliminar todos los registros"
        }
    }))
}

pub async fn list_registros(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Registro>>>> {
    let list = state.service.list_all()?;
    Ok(Json(Envelope::data(list.items).with_count(list.count)))
}

pub async fn get_registro(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Envelope<Registro>>> {
    Ok(Json(Envelope::data(state.service.get_by_id(&raw_id)?)))
}

pub async fn create_registro(
    State(state): State<AppState>,
    body: Result<Json<RegistroDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Registro>>)> {
    let draft = draft_from_body(body)?;
    let registro = state.service.create(&draft)?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(registro).with_message(MSG_CREATED)),
    ))
}

pub async fn update_registro(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<RegistroDraft>, JsonRejection>,
) -> ApiResult<Json<Envelope<Registro>>> {
    let draft = draft_from_body(body)?;
    let registro = state.service.update(&raw_id, &draft)?;
    Ok(Json(Envelope::data(registro).with_message(MSG_UPDATED)))
}

pub async fn delete_registro(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Envelope<Registro>>> {
    let registro = state.service.delete_one(&raw_id)?;
    Ok(Json(Envelope::data(registro).with_message(MSG_DELETED)))
}

pub async fn delete_all_registros(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<()>>> {
    let removed = state.service.delete_all()?;
    Ok(Json(
        Envelope::message(format!("{removed} registro(s) eliminado(s)")).with_count(removed),
    ))
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Resolves the request body into a draft.
///
/// A body sent without a JSON content type, or whose fields are not strings,
/// reads as an empty payload so validation reports the missing fields after
/// any not-found check. A body that is not parseable JSON fails the request
/// before the store is consulted.
fn draft_from_body(
    body: Result<Json<RegistroDraft>, JsonRejection>,
) -> ApiResult<RegistroDraft> {
    let rejection = match body {
        Ok(Json(draft)) => return Ok(draft),
        Err(rejection) => rejection,
    };

    match rejection {
        JsonRejection::MissingJsonContentType(_) | JsonRejection::JsonDataError(_) => {
            debug!(
                "event=body_rejected module=api status=error status_code={} error={}",
                rejection.status().as_u16(),
                rejection.body_text()
            );
            Ok(RegistroDraft::default())
        }
        other => Err(ApiError::Internal(format!(
            "unreadable request body: {}",
            other.body_text()
        ))),
    }
}
