use std::sync::Arc;

use crate::enrich;
use crate::query::{ListParams, QueryConfig, QueryResult, SearchQuery};
use crate::storage::EntityStore;
use medsim_core::{AppointmentStatus, Clock, CoreError, EntityKind, IdRef, Result, SystemClock};
use serde_json::{Map, Value, json};

/// One page of a list read, already enriched for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub kind: EntityKind,
    pub rows: Vec<Value>,
    pub total: usize,
}

impl ListPage {
    /// `{"<collection>": [...], "total": n}`
    pub fn into_body(self) -> Value {
        let mut body = Map::with_capacity(2);
        body.insert(self.kind.collection().to_string(), Value::Array(self.rows));
        body.insert("total".to_string(), Value::from(self.total));
        Value::Object(body)
    }
}

/// The simulated backend: store, query pipeline and enrichment behind one
/// set of operations.
///
/// Writes take `&mut self`; a caller sharing the backend across tasks must
/// serialise access to it.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    store: EntityStore,
    clock: Arc<dyn Clock>,
    query: QueryConfig,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(EntityStore::seeded())
    }
}

impl SimulatedBackend {
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            query: QueryConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query
    }

    /// Reloads the fixture dataset.
    pub fn reset(&mut self) {
        self.store.reset();
    }

    /// Runs the query pipeline without enrichment.
    pub fn search(&self, kind: EntityKind, params: &ListParams) -> QueryResult {
        SearchQuery::from_params(kind, params, &self.query).execute(&self.store)
    }

    /// List read. Appointment and record rows gain `patientName`; patient
    /// rows are returned as stored.
    pub fn list(&self, kind: EntityKind, params: &ListParams) -> ListPage {
        let result = self.search(kind, params);
        let rows = result
            .rows
            .iter()
            .map(|row| match kind {
                EntityKind::Patient => row.to_value(),
                EntityKind::Appointment | EntityKind::Record => {
                    enrich::with_patient_name(&self.store, row)
                }
            })
            .collect();
        ListPage {
            kind,
            rows,
            total: result.total,
        }
    }

    /// Single read. Patients gain `recentRecords` and `upcomingAppointments`
    /// relative to the backend clock; the other kinds gain `patientName`.
    pub fn get_one(&self, kind: EntityKind, id: &IdRef) -> Result<Value> {
        let entity = self
            .store
            .find_by_id(kind, id)
            .inspect_err(|err| log_failure("read", kind, id, err))?;
        Ok(match kind {
            EntityKind::Patient => enrich::patient_detail(&self.store, entity, self.clock.now()),
            EntityKind::Appointment | EntityKind::Record => {
                enrich::with_patient_name(&self.store, entity)
            }
        })
    }

    /// Appends `data` under a fresh id. No field validation takes place.
    pub fn create(&mut self, kind: EntityKind, data: Map<String, Value>) -> Value {
        self.store.create(kind, data).to_value()
    }

    /// Shallow-merges `patch` onto an existing row.
    pub fn update(
        &mut self,
        kind: EntityKind,
        id: &IdRef,
        patch: &Map<String, Value>,
    ) -> Result<Value> {
        match self.store.replace(kind, id, patch) {
            Ok(updated) => Ok(updated.to_value()),
            Err(err) => {
                log_failure("update", kind, id, &err);
                Err(err)
            }
        }
    }

    /// Sets an appointment's status to `Cancelled`.
    pub fn cancel_appointment(&mut self, id: &IdRef) -> Result<Value> {
        let mut patch = Map::new();
        patch.insert(
            "status".to_string(),
            Value::from(String::from(AppointmentStatus::Cancelled)),
        );
        self.update(EntityKind::Appointment, id, &patch)
    }

    /// Removes a record, answering with a confirmation body.
    pub fn delete_record(&mut self, id: &IdRef) -> Result<Value> {
        let removed = self
            .store
            .remove(EntityKind::Record, id)
            .inspect_err(|err| log_failure("delete", EntityKind::Record, id, err))?;
        Ok(json!({
            "message": "Record deleted successfully",
            "id": removed.id(),
        }))
    }
}

/// Caller mistakes log at `warn`, anything else at `error`.
fn log_failure(operation: &str, kind: EntityKind, id: &IdRef, err: &CoreError) {
    let category = err.category();
    if err.is_client_error() {
        tracing::warn!(
            operation,
            kind = %kind,
            id = %id,
            %category,
            error = %err,
            "backend operation failed"
        );
    } else {
        tracing::error!(
            operation,
            kind = %kind,
            id = %id,
            %category,
            error = %err,
            "backend operation failed"
        );
    }
}
