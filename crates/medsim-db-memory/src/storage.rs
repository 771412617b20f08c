use crate::seed;
use medsim_core::{CoreError, Entity, EntityKind, IdRef, Result};
use serde_json::{Map, Value};

/// In-memory holder of the three simulated collections.
///
/// Rows keep insertion order: creates append, updates write back at the
/// found index, deletes remove in place. Ids are unique per collection and
/// assigned as one greater than the current maximum.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    patients: Vec<Entity>,
    appointments: Vec<Entity>,
    records: Vec<Entity>,
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the fixture dataset.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.reset();
        store
    }

    /// Discards all rows and reloads the fixture dataset.
    pub fn reset(&mut self) {
        self.patients = seed::patients();
        self.appointments = seed::appointments();
        self.records = seed::records();
        tracing::debug!(
            patients = self.patients.len(),
            appointments = self.appointments.len(),
            records = self.records.len(),
            "entity store seeded"
        );
    }

    /// Discards all rows.
    pub fn clear(&mut self) {
        self.patients.clear();
        self.appointments.clear();
        self.records.clear();
    }

    pub fn collection(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Patient => &self.patients,
            EntityKind::Appointment => &self.appointments,
            EntityKind::Record => &self.records,
        }
    }

    fn collection_mut(&mut self, kind: EntityKind) -> &mut Vec<Entity> {
        match kind {
            EntityKind::Patient => &mut self.patients,
            EntityKind::Appointment => &mut self.appointments,
            EntityKind::Record => &mut self.records,
        }
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.collection(kind).len()
    }

    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.collection(kind).is_empty()
    }

    /// `max(existing ids) + 1`, or `1` for an empty collection.
    ///
    /// Recomputed on every call.
    pub fn next_id(&self, kind: EntityKind) -> u64 {
        self.collection(kind)
            .iter()
            .map(Entity::id)
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn position(&self, kind: EntityKind, id: &IdRef) -> Option<usize> {
        self.collection(kind).iter().position(|e| e.matches_id(id))
    }

    pub fn find_by_id(&self, kind: EntityKind, id: impl Into<IdRef>) -> Result<&Entity> {
        let id = id.into();
        self.collection(kind)
            .iter()
            .find(|e| e.matches_id(&id))
            .ok_or_else(|| CoreError::entity_not_found(kind, id.as_str()))
    }

    /// Resolves a `patientId` foreign key. Orphans yield `None`.
    pub fn find_patient(&self, patient_ref: &IdRef) -> Option<&Entity> {
        self.patients.iter().find(|p| p.matches_id(patient_ref))
    }

    /// Shallow-merges `patch` onto the row addressed by `id`, in place.
    pub fn replace(
        &mut self,
        kind: EntityKind,
        id: impl Into<IdRef>,
        patch: &Map<String, Value>,
    ) -> Result<&Entity> {
        let id = id.into();
        let index = self
            .position(kind, &id)
            .ok_or_else(|| CoreError::entity_not_found(kind, id.as_str()))?;
        let row = &mut self.collection_mut(kind)[index];
        row.merge(patch);
        tracing::info!(kind = %kind, id = row.id(), "entity updated");
        Ok(&*row)
    }

    /// Adds a row at the end of its collection.
    pub fn append(&mut self, kind: EntityKind, entity: Entity) -> &Entity {
        let rows = self.collection_mut(kind);
        rows.push(entity);
        let row = &rows[rows.len() - 1];
        tracing::info!(kind = %kind, id = row.id(), "entity appended");
        row
    }

    /// Assigns the next id to `data` and appends it. A caller-supplied `id` is discarded.
    pub fn create(&mut self, kind: EntityKind, data: Map<String, Value>) -> &Entity {
        let id = self.next_id(kind);
        self.append(kind, Entity::new(id, data))
    }

    /// Removes the row addressed by `id`, keeping the order of the others.
    pub fn remove(&mut self, kind: EntityKind, id: impl Into<IdRef>) -> Result<Entity> {
        let id = id.into();
        let index = self
            .position(kind, &id)
            .ok_or_else(|| CoreError::entity_not_found(kind, id.as_str()))?;
        let removed = self.collection_mut(kind).remove(index);
        tracing::info!(kind = %kind, id = removed.id(), "entity removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_next_id_empty_collection_is_one() {
        let store = EntityStore::new();
        for kind in EntityKind::ALL {
            assert_eq!(store.next_id(kind), 1);
        }
    }

    #[test]
    fn test_next_id_follows_maximum_not_length() {
        let mut store = EntityStore::new();
        store.append(EntityKind::Record, Entity::new(201, Map::new()));
        store.append(EntityKind::Record, Entity::new(5, Map::new()));
        assert_eq!(store.next_id(EntityKind::Record), 202);
    }

    #[test]
    fn test_create_yields_strictly_increasing_ids() {
        let mut store = EntityStore::seeded();
        let before: Vec<u64> = store.collection(EntityKind::Patient).iter().map(Entity::id).collect();

        let mut ids = Vec::new();
        for n in 0..5 {
            let created = store.create(EntityKind::Patient, fields(json!({"firstName": format!("P{n}")})));
            ids.push(created.id());
        }

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| !before.contains(id)));
    }

    #[test]
    fn test_create_ignores_caller_id() {
        let mut store = EntityStore::seeded();
        let created = store.create(EntityKind::Patient, fields(json!({"id": 1, "firstName": "Dup"})));
        assert_eq!(created.id(), 3);
        assert_eq!(store.len(EntityKind::Patient), 3);
    }

    #[test]
    fn test_find_by_id_accepts_number_or_string() {
        let store = EntityStore::seeded();
        assert_eq!(store.find_by_id(EntityKind::Patient, 1_u64).unwrap().id(), 1);
        assert_eq!(store.find_by_id(EntityKind::Patient, "2").unwrap().id(), 2);

        let err = store.find_by_id(EntityKind::Patient, "9999").unwrap_err();
        assert!(matches!(err, CoreError::EntityNotFound { kind: EntityKind::Patient, .. }));
    }

    #[test]
    fn test_replace_in_place_preserves_position_and_fields() {
        let mut store = EntityStore::seeded();
        let updated = store
            .replace(EntityKind::Patient, 1_u64, &fields(json!({"rank": "E-6"})))
            .unwrap();
        assert_eq!(updated.str_field("rank"), Some("E-6"));
        assert_eq!(updated.str_field("firstName"), Some("John"));

        let order: Vec<u64> = store.collection(EntityKind::Patient).iter().map(Entity::id).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_replace_missing_leaves_store_untouched() {
        let mut store = EntityStore::seeded();
        let snapshot = store.collection(EntityKind::Appointment).to_vec();
        assert!(store.replace(EntityKind::Appointment, 77_u64, &Map::new()).is_err());
        assert_eq!(store.collection(EntityKind::Appointment), snapshot.as_slice());
    }

    #[test]
    fn test_remove_keeps_order_of_others() {
        let mut store = EntityStore::seeded();
        store.create(EntityKind::Record, fields(json!({"patientId": 2})));
        let removed = store.remove(EntityKind::Record, 202_u64).unwrap();
        assert_eq!(removed.id(), 202);

        let order: Vec<u64> = store.collection(EntityKind::Record).iter().map(Entity::id).collect();
        assert_eq!(order, vec![201, 203]);
        assert!(store.remove(EntityKind::Record, 202_u64).is_err());
    }

    #[test]
    fn test_reset_restores_fixtures() {
        let mut store = EntityStore::seeded();
        store.clear();
        assert!(store.is_empty(EntityKind::Patient));
        store.reset();
        assert_eq!(store.len(EntityKind::Patient), 2);
        assert_eq!(store.len(EntityKind::Appointment), 2);
        assert_eq!(store.len(EntityKind::Record), 2);
    }

    #[test]
    fn test_find_patient_orphan() {
        let store = EntityStore::seeded();
        assert!(store.find_patient(&IdRef::from(1_u64)).is_some());
        assert!(store.find_patient(&IdRef::from("42")).is_none());
    }
}
