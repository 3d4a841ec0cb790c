//! HTTP surface for the registro store.
//!
//! # Responsibility
//! - Map verbs and paths onto `RegistroService` operations.
//! - Render every outcome as an `Envelope` with the matching status code.
//! - Own the outer boundary: CORS, panic capture and request logging.
//!
//! # Invariants
//! - The store is constructed once by the caller and shared by reference.
//! - Unmatched method/path pairs yield the route-not-found envelope.
//! - Panics inside handlers become the generic 500 envelope.

#![deny(unsafe_code)]

pub mod envelope;
pub mod error;
pub mod routes;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::info;
use registro_core::{InMemoryRegistroRepository, RegistroService};
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

pub use envelope::Envelope;
pub use error::ApiError;

pub const REGISTROS_PATH: &str = "/api/registros";
const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

pub type SharedRegistroService = Arc<RegistroService<InMemoryRegistroRepository>>;

/// Router state: a handle to the single process-wide store.
#[derive(Clone)]
pub struct AppState {
    pub service: SharedRegistroService,
}

impl AppState {
    pub fn new(service: SharedRegistroService) -> Self {
        Self { service }
    }

    /// State backed by a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(RegistroService::new(
            InMemoryRegistroRepository::new(),
        )))
    }
}

pub fn build_router(state: AppState) -> Router {
    finish_router(registro_routes(), state)
}

/// Collection and item paths also answer with a trailing slash.
fn registro_routes() -> Router<AppState> {
    let collection = get(routes::list_registros)
        .post(routes::create_registro)
        .delete(routes::delete_all_registros)
        .fallback(routes::route_not_found);
    let item = get(routes::get_registro)
        .put(routes::update_registro)
        .delete(routes::delete_registro)
        .fallback(routes::route_not_found);

    Router::new()
        .route("/", get(routes::index).fallback(routes::route_not_found))
        .route(REGISTROS_PATH, collection.clone())
        .route(&format!("{REGISTROS_PATH}/"), collection)
        .route(&format!("{REGISTROS_PATH}/:id"), item.clone())
        .route(&format!("{REGISTROS_PATH}/:id/"), item)
}

fn finish_router(router: Router<AppState>, state: AppState) -> Router {
    router
        .fallback(routes::route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `config.listen` and serves until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.listen).await?;
    let local_addr = listener.local_addr()?;
    info!(
        "event=server_listen module=api status=ok addr={local_addr} collection={REGISTROS_PATH}"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=api method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    // The panic hook installed by `registro_core::logging` has already
    // recorded the sanitized payload.
    error::internal_error_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn ana() -> Value {
        json!({ "nombre": "Ana", "email": "ana@x.com", "telefono": "123" })
    }

    #[tokio::test]
    async fn walkthrough_over_http() {
        let app = build_router(AppState::in_memory());

        let (status, body) = send(&app, Method::POST, "/api/registros", Some(ana())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], routes::MSG_CREATED);
        assert_eq!(body["data"]["id"], 1);
        assert!(body["data"]["createdAt"].is_string());
        assert!(body["data"].get("updatedAt").is_none());

        let (status, body) = send(&app, Method::POST, "/api/registros", Some(ana())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 2);

        let (status, body) = send(&app, Method::DELETE, "/api/registros/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], routes::MSG_DELETED);
        assert_eq!(body["data"]["id"], 1);

        let (status, body) = send(&app, Method::GET, "/api/registros", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["id"], 2);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/registros",
            Some(json!({ "nombre": "", "email": "b@x.com", "telefono": "456" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], error::MSG_MISSING_FIELDS);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/registros",
            Some(json!({ "nombre": "B", "email": "bad-email", "telefono": "456" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], error::MSG_INVALID_EMAIL);

        let (status, body) = send(&app, Method::PUT, "/api/registros/99", Some(ana())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], error::MSG_NOT_FOUND);
    }

    #[tokio::test]
    async fn get_by_id_handles_missing_and_non_numeric_ids() {
        let app = build_router(AppState::in_memory());
        send(&app, Method::POST, "/api/registros", Some(ana())).await;

        let (status, body) = send(&app, Method::GET, "/api/registros/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nombre"], "Ana");
        assert!(body.get("message").is_none());

        for uri in ["/api/registros/2", "/api/registros/abc"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], error::MSG_NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn update_replaces_fields_and_stamps_updated_at() {
        let app = build_router(AppState::in_memory());
        let (_, created) = send(&app, Method::POST, "/api/registros", Some(ana())).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/registros/1",
            Some(json!({ "nombre": "Ana", "email": "ana@y.com", "telefono": "999" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], routes::MSG_UPDATED);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["email"], "ana@y.com");
        assert_eq!(body["data"]["createdAt"], created["data"]["createdAt"]);
        assert!(body["data"]["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn update_checks_existence_before_payload() {
        let app = build_router(AppState::in_memory());
        send(&app, Method::POST, "/api/registros", Some(ana())).await;

        let (status, _) = send(&app, Method::PUT, "/api/registros/7", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::PUT, "/api/registros/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], error::MSG_MISSING_FIELDS);
    }

    #[tokio::test]
    async fn unreadable_body_is_reported_as_missing_fields() {
        let app = build_router(AppState::in_memory());

        let (status, body) = send(&app, Method::POST, "/api/registros", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], error::MSG_MISSING_FIELDS);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/registros",
            Some(json!({ "nombre": 5, "email": "a@x.com", "telefono": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], error::MSG_MISSING_FIELDS);

        let (_, listed) = send(&app, Method::GET, "/api/registros", None).await;
        assert_eq!(listed["count"], 0);
    }

    #[tokio::test]
    async fn delete_all_reports_count_even_when_empty() {
        let app = build_router(AppState::in_memory());

        let (status, body) = send(&app, Method::DELETE, "/api/registros", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "message": "0 registro(s) eliminado(s)", "count": 0 })
        );

        send(&app, Method::POST, "/api/registros", Some(ana())).await;
        send(&app, Method::POST, "/api/registros", Some(ana())).await;
        let (_, body) = send(&app, Method::DELETE, "/api/registros", None).await;
        assert_eq!(body["count"], 2);

        let (_, body) = send(&app, Method::POST, "/api/registros", Some(ana())).await;
        assert_eq!(body["data"]["id"], 3);
    }

    #[tokio::test]
    async fn delete_missing_returns_not_found() {
        let app = build_router(AppState::in_memory());
        let (status, body) = send(&app, Method::DELETE, "/api/registros/3", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], error::MSG_NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_routes_and_methods_return_route_not_found() {
        let app = build_router(AppState::in_memory());

        for (method, uri) in [
            (Method::GET, "/api/otros"),
            (Method::PATCH, "/api/registros"),
            (Method::POST, "/api/registros/1"),
        ] {
            let (status, body) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(
                body,
                json!({ "success": false, "message": error::MSG_ROUTE_NOT_FOUND })
            );
        }
    }

    #[tokio::test]
    async fn id_path_reads_leading_integer() {
        let app = build_router(AppState::in_memory());
        send(&app, Method::POST, "/api/registros", Some(ana())).await;

        for uri in [
            "/api/registros/1abc",
            "/api/registros/1.5",
            "/api/registros/%201",
        ] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["data"]["id"], 1, "{uri}");
        }
    }

    #[tokio::test]
    async fn malformed_json_body_is_internal_error() {
        let app = build_router(AppState::in_memory());
        send(&app, Method::POST, "/api/registros", Some(ana())).await;

        for (method, uri) in [
            (Method::POST, "/api/registros"),
            (Method::PUT, "/api/registros/1"),
            (Method::PUT, "/api/registros/99"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{bad json"))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(
                body,
                json!({ "success": false, "message": error::MSG_INTERNAL })
            );
        }

        let (_, listed) = send(&app, Method::GET, "/api/registros", None).await;
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["data"][0]["email"], "ana@x.com");
    }

    #[tokio::test]
    async fn trailing_slash_paths_reach_the_same_handlers() {
        let app = build_router(AppState::in_memory());

        let (status, body) = send(&app, Method::POST, "/api/registros/", Some(ana())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 1);

        let (status, body) = send(&app, Method::GET, "/api/registros/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);

        let (status, body) = send(&app, Method::GET, "/api/registros/1/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nombre"], "Ana");
    }

    #[test]
    fn default_config_listens_on_port_3000() {
        assert_eq!(ServerConfig::default().listen.port(), 3000);
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let app = build_router(AppState::in_memory());
        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "API de Registros - Actividad 3 Flutter");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["endpoints"].as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn handler_panic_becomes_internal_error_envelope() {
        async fn boom() -> &'static str {
            panic!("handler blew up")
        }

        let app = finish_router(
            registro_routes().route("/boom", get(boom)),
            AppState::in_memory(),
        );
        let (status, body) = send(&app, Method::GET, "/boom", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "message": error::MSG_INTERNAL }));
    }

    #[tokio::test]
    async fn cors_preflight_is_accepted() {
        let app = build_router(AppState::in_memory());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/registros")
            .header("origin", "http://localhost:8080")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
