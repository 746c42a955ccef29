use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::Fields;

/// A condition on a single record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCondition {
    /// The field equals this value.
    Eq(String, Value),

    /// The field equals any of these values.
    In(String, Vec<Value>),
}

impl FieldCondition {
    fn matches(&self, fields: &Fields) -> bool {
        match self {
            FieldCondition::Eq(field, expected) => fields.get(field) == Some(expected),
            FieldCondition::In(field, candidates) => fields
                .get(field)
                .is_some_and(|value| candidates.contains(value)),
        }
    }
}

/// Builder for filtering records within one collection.
///
/// All conditions must hold. Results are ordered by creation time.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Field conditions, all of which must match.
    pub conditions: Vec<FieldCondition>,

    /// Only records created at or after this timestamp.
    pub created_from: Option<DateTime<Utc>>,

    /// Only records created at or before this timestamp.
    pub created_to: Option<DateTime<Utc>>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,

    /// Number of records to skip.
    pub offset: Option<usize>,
}

impl RecordFilter {
    /// Creates a filter matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field` to equal `value`.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(FieldCondition::Eq(field.into(), value.into()));
        self
    }

    /// Requires `field` to equal one of `values`.
    pub fn field_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(FieldCondition::In(
            field.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Restricts to records created at or after this timestamp.
    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    /// Restricts to records created at or before this timestamp.
    pub fn created_to(mut self, to: DateTime<Utc>) -> Self {
        self.created_to = Some(to);
        self
    }

    /// Restricts to records created within `[from, to]`.
    pub fn created_between(self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from(from).created_to(to)
    }

    /// Limits the number of records returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many records before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Tests a record against the field and time conditions.
    ///
    /// Paging (`limit`/`offset`) is applied by the store afterwards.
    pub fn matches(&self, fields: &Fields, created: DateTime<Utc>) -> bool {
        if let Some(from) = self.created_from
            && created < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && created > to
        {
            return false;
        }
        self.conditions.iter().all(|c| c.matches(fields))
    }
}
