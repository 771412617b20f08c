use crate::storage::EntityStore;
use medsim_core::{Entity, EntityKind, Timestamp};
use serde::{Deserialize, Serialize};

/// Default page size when `limit` is absent or unusable.
pub const DEFAULT_LIMIT: usize = 10;

/// Pipeline knobs that are not carried by the request itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when the request has no usable `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Optional upper bound applied to every requested `limit`.
    #[serde(default)]
    pub max_limit: Option<usize>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

/// Recognised list parameters. Every field is optional; unknown keys are ignored.
///
/// | key | effect |
/// |---|---|
/// | `limit` | page size, default [`QueryConfig::default_limit`] |
/// | `offset` | rows skipped before the page, default `0` |
/// | `search` | case-insensitive substring match (see [`QueryFilter::Search`]) |
/// | `status` | exact match on `status` (appointments, records) |
/// | `type` | exact match on `type` (records) |
/// | `fromDate`, `toDate` | inclusive range on `date`, only when both are given |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl ListParams {
    /// Builds parameters from raw query-string pairs.
    ///
    /// Empty values count as absent. `limit`/`offset` keep their leading
    /// digits (`"10abc"` is 10); negative or non-numeric values fall back to
    /// the default.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "limit" => params.limit = parse_window(value),
                "offset" => params.offset = parse_window(value),
                "search" => params.search = Some(value.to_string()),
                "status" => params.status = Some(value.to_string()),
                "type" => params.record_type = Some(value.to_string()),
                "fromDate" => params.from_date = Some(value.to_string()),
                "toDate" => params.to_date = Some(value.to_string()),
                _ => {}
            }
        }
        params
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn with_date_range(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_date = Some(from.into());
        self.to_date = Some(to.into());
        self
    }

    pub fn with_pagination(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

/// Leading-integer parse; `None` for negative or digit-less input.
fn parse_window(raw: &str) -> Option<usize> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<usize>().unwrap_or(usize::MAX);
    if negative && value > 0 {
        return None;
    }
    Some(value)
}

/// What a `search` term is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchScope {
    /// The patient's own full name or id.
    Patient,
    /// The related patient's full name or id.
    RelatedPatient,
    /// The related patient's full name or id, or the row's `type`.
    RelatedPatientOrType,
}

impl SearchScope {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Patient => Self::Patient,
            EntityKind::Appointment => Self::RelatedPatient,
            EntityKind::Record => Self::RelatedPatientOrType,
        }
    }
}

/// One conjunctive predicate of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryFilter {
    /// Exact match on a string attribute (facet).
    Exact { field: String, value: String },
    /// Inclusive range on a date attribute. An unparseable bound is stored as
    /// `None` and the filter then matches nothing.
    DateRange {
        field: String,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    },
    /// Case-insensitive substring match. Rows of related collections whose
    /// `patientId` resolves to no patient never match.
    Search { term: String, scope: SearchScope },
}

impl QueryFilter {
    pub fn date_range(field: impl Into<String>, start: &str, end: &str) -> Self {
        Self::DateRange {
            field: field.into(),
            start: Timestamp::parse_lenient(start),
            end: Timestamp::parse_lenient(end),
        }
    }

    /// Check if a row matches this filter. `store` resolves related patients.
    pub fn matches(&self, entity: &Entity, store: &EntityStore) -> bool {
        match self {
            QueryFilter::Exact { field, value } => self.match_exact(entity, field, value),
            QueryFilter::DateRange { field, start, end } => {
                self.match_date_range(entity, field, start.as_ref(), end.as_ref())
            }
            QueryFilter::Search { term, scope } => self.match_search(entity, store, term, *scope),
        }
    }

    fn match_exact(&self, entity: &Entity, field: &str, value: &str) -> bool {
        entity.str_field(field) == Some(value)
    }

    fn match_date_range(
        &self,
        entity: &Entity,
        field: &str,
        start: Option<&Timestamp>,
        end: Option<&Timestamp>,
    ) -> bool {
        let (Some(start), Some(end)) = (start, end) else {
            return false;
        };
        let Some(date) = entity.str_field(field).and_then(Timestamp::parse_lenient) else {
            return false;
        };
        &date >= start && &date <= end
    }

    fn match_search(
        &self,
        entity: &Entity,
        store: &EntityStore,
        term: &str,
        scope: SearchScope,
    ) -> bool {
        let needle = term.to_lowercase();
        let patient_matches = |patient: &Entity| {
            patient.full_name().to_lowercase().contains(&needle)
                || patient.id().to_string().contains(term)
        };

        match scope {
            SearchScope::Patient => patient_matches(entity),
            SearchScope::RelatedPatient | SearchScope::RelatedPatientOrType => {
                let Some(patient) = entity.patient_ref().and_then(|r| store.find_patient(&r))
                else {
                    return false;
                };
                patient_matches(patient)
                    || (scope == SearchScope::RelatedPatientOrType
                        && entity
                            .str_field("type")
                            .is_some_and(|t| t.to_lowercase().contains(&needle)))
            }
        }
    }
}

/// Query result with pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Number of rows satisfying every filter, independent of the window
    pub total: usize,
    /// Rows in this page, in store order
    pub rows: Vec<Entity>,
    pub offset: usize,
    pub limit: usize,
    /// Whether there are more rows after this page
    pub has_more: bool,
}

impl QueryResult {
    pub fn new(total: usize, rows: Vec<Entity>, offset: usize, limit: usize) -> Self {
        let has_more = offset.saturating_add(rows.len()) < total;
        Self {
            total,
            rows,
            offset,
            limit,
            has_more,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, Vec::new(), 0, 0)
    }
}

/// A filter list plus a pagination window over one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub kind: EntityKind,
    pub filters: Vec<QueryFilter>,
    pub offset: usize,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            filters: Vec::new(),
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Translates list parameters into filters for `kind`.
    ///
    /// Filters are added facets first, then the date range, then search. Only
    /// the parameters meaningful for `kind` are used.
    pub fn from_params(kind: EntityKind, params: &ListParams, config: &QueryConfig) -> Self {
        let mut query = Self::new(kind);

        let facets: Vec<(&str, &Option<String>)> = match kind {
            EntityKind::Patient => Vec::new(),
            EntityKind::Appointment => vec![("status", &params.status)],
            EntityKind::Record => vec![("status", &params.status), ("type", &params.record_type)],
        };
        for (field, value) in facets {
            if let Some(value) = value {
                query = query.with_filter(QueryFilter::Exact {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        if kind != EntityKind::Patient {
            if let (Some(from), Some(to)) = (&params.from_date, &params.to_date) {
                query = query.with_filter(QueryFilter::date_range("date", from, to));
            }
        }

        if let Some(term) = &params.search {
            query = query.with_filter(QueryFilter::Search {
                term: term.clone(),
                scope: SearchScope::for_kind(kind),
            });
        }

        let mut limit = params.limit.unwrap_or(config.default_limit);
        if let Some(max) = config.max_limit {
            limit = limit.min(max);
        }
        query.with_pagination(params.offset.unwrap_or(0), limit)
    }

    pub fn with_filter(mut self, filter: QueryFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_pagination(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Check if a row matches all filters in this query
    pub fn matches(&self, entity: &Entity, store: &EntityStore) -> bool {
        self.filters.iter().all(|filter| filter.matches(entity, store))
    }

    /// Filters the collection in store order, counts, then slices the window.
    pub fn execute(&self, store: &EntityStore) -> QueryResult {
        let matched: Vec<&Entity> = store
            .collection(self.kind)
            .iter()
            .filter(|entity| self.matches(entity, store))
            .collect();
        let total = matched.len();
        let rows: Vec<Entity> = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();

        tracing::debug!(
            kind = %self.kind,
            filters = self.filters.len(),
            total,
            returned = rows.len(),
            offset = self.offset,
            limit = self.limit,
            "query executed"
        );

        QueryResult::new(total, rows, self.offset, self.limit)
    }
}
