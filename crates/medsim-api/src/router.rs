//! Method and path dispatch onto the simulated backend.
//!
//! Paths are relative to the API root and accepted with or without a
//! leading `/api/` and a trailing slash:
//!
//! | method | path | operation |
//! |---|---|---|
//! | `GET` | `{collection}` | list |
//! | `GET` | `{collection}/{id}` | get one |
//! | `POST` | `{collection}` | create |
//! | `PUT` | `{collection}/{id}` | update |
//! | `PUT` | `appointments/{id}/cancel` | cancel appointment |
//! | `DELETE` | `records/{id}` | delete record |

use axum::http::{HeaderValue, Method, header};
use medsim_core::{EntityKind, IdRef};
use medsim_db_memory::{ListParams, SimulatedBackend};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::response::ApiResponse;

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Collection(EntityKind),
    Item(EntityKind, IdRef),
    CancelAppointment(IdRef),
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, ApiError> {
        let trimmed = path.trim_matches('/');
        let trimmed = trimmed
            .strip_prefix("api/")
            .or_else(|| (trimmed == "api").then_some(""))
            .unwrap_or(trimmed);
        let segments: Vec<&str> = trimmed.split('/').collect();

        match segments.as_slice() {
            [collection] => Ok(Route::Collection(parse_kind(collection)?)),
            [collection, id] if !id.is_empty() => {
                Ok(Route::Item(parse_kind(collection)?, IdRef::from(*id)))
            }
            ["appointments", id, "cancel"] if !id.is_empty() => {
                Ok(Route::CancelAppointment(IdRef::from(*id)))
            }
            _ => Err(route_not_found(path)),
        }
    }
}

fn parse_kind(collection: &str) -> Result<EntityKind, ApiError> {
    collection.parse().map_err(|_| route_not_found(collection))
}

fn route_not_found(path: &str) -> ApiError {
    ApiError::not_found(format!("No route for '{path}'"))
}

/// Request values handed over by the transport.
#[derive(Debug, Clone, Default)]
pub struct SimRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl SimRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Owns the backend and answers requests one at a time.
#[derive(Debug, Clone, Default)]
pub struct SimRouter {
    backend: SimulatedBackend,
}

impl SimRouter {
    pub fn new(backend: SimulatedBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &SimulatedBackend {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut SimulatedBackend {
        &mut self.backend
    }

    /// Dispatches a request, rendering failures as `{message}` bodies.
    pub fn handle(&mut self, request: SimRequest) -> ApiResponse<Value> {
        let method = request.method.clone();
        let path = request.path.clone();
        match self.dispatch(request) {
            Ok(response) => {
                tracing::debug!(%method, %path, status = %response.status, "request handled");
                response
            }
            Err(err) => {
                let status = err.status_code();
                tracing::debug!(%method, %path, %status, error = %err, "request failed");
                ApiResponse::new(Value::from(err.to_body()), status)
            }
        }
    }

    pub fn dispatch(&mut self, request: SimRequest) -> Result<ApiResponse<Value>, ApiError> {
        let route = Route::parse(&request.path)?;

        match (request.method, route) {
            (Method::GET, Route::Collection(kind)) => {
                let params = ListParams::from_pairs(request.query);
                Ok(ApiResponse::ok(self.backend.list(kind, &params).into_body()))
            }
            (Method::GET, Route::Item(kind, id)) => {
                Ok(ApiResponse::ok(self.backend.get_one(kind, &id)?))
            }
            (Method::POST, Route::Collection(kind)) => {
                let created = self.backend.create(kind, body_fields(request.body));
                let mut response = ApiResponse::created(created);
                let location = response
                    .value
                    .get("id")
                    .and_then(Value::as_u64)
                    .and_then(|id| {
                        HeaderValue::from_str(&format!("/api/{}/{id}", kind.collection())).ok()
                    });
                if let Some(location) = location {
                    response = response.with_header(header::LOCATION, location);
                }
                Ok(response)
            }
            (Method::PUT, Route::Item(kind, id)) => {
                let patch = body_fields(request.body);
                Ok(ApiResponse::ok(self.backend.update(kind, &id, &patch)?))
            }
            (Method::PUT, Route::CancelAppointment(id)) => {
                Ok(ApiResponse::ok(self.backend.cancel_appointment(&id)?))
            }
            (Method::DELETE, Route::Item(EntityKind::Record, id)) => {
                Ok(ApiResponse::ok(self.backend.delete_record(&id)?))
            }
            (method, _) => Err(ApiError::method_not_allowed(format!(
                "Method {method} not allowed on '{}'",
                request.path
            ))),
        }
    }
}

/// Attributes carried by a write body. Anything but a JSON object contributes none.
fn body_fields(body: Option<Value>) -> Map<String, Value> {
    match body {
        Some(Value::Object(fields)) => fields,
        Some(other) if !other.is_null() => {
            tracing::debug!(body = %other, "ignoring non-object request body");
            Map::new()
        }
        _ => Map::new(),
    }
}
