//! In-memory backend for the MedSim request simulator.
//!
//! Holds the patient, appointment and record collections, runs the list
//! query pipeline (facets, date range, search, pagination) and attaches the
//! derived attributes that read responses carry.
//!
//! # Example
//!
//! ```
//! use medsim_core::{EntityKind, IdRef};
//! use medsim_db_memory::{ListParams, SimulatedBackend};
//!
//! let backend = SimulatedBackend::default();
//! let page = backend.list(EntityKind::Patient, &ListParams::default().with_search("john"));
//! assert_eq!(page.total, 1);
//!
//! let appointment = backend.get_one(EntityKind::Appointment, &IdRef::from("101")).unwrap();
//! assert_eq!(appointment["patientName"], "John Smith");
//! ```

pub mod backend;
pub mod enrich;
pub mod factory;
pub mod query;
pub mod seed;
pub mod storage;

pub use backend::{ListPage, SimulatedBackend};
pub use factory::{BackendConfig, create_backend};
pub use query::{DEFAULT_LIMIT, ListParams, QueryConfig, QueryFilter, QueryResult, SearchQuery, SearchScope};
pub use storage::EntityStore;
