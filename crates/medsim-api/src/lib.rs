//! Request routing for the MedSim simulated backend.
//!
//! [`SimRouter`] maps a method, path, query and body onto backend operations
//! and selects the status code. Failures render as `{"message": "..."}`.
//! Both [`ApiResponse`] and [`ApiError`] implement axum's `IntoResponse`.

pub mod error;
pub mod response;
pub mod router;

pub use error::{ApiError, ErrorBody};
pub use response::ApiResponse;
pub use router::{Route, SimRequest, SimRouter};
