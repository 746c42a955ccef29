use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::record::{CREATED_FIELD, UPDATED_FIELD, record_id};
use crate::{
    Collection, FieldCondition, Fields, RecordFilter, RecordId, RecordStore, Replaced, Result,
    StoreError,
};

/// PostgreSQL-backed record store implementation.
///
/// All collections share one `records` table; each record's fields are kept
/// in a JSONB document next to its store-assigned timestamps.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_fields(row: PgRow) -> Result<Fields> {
        let data: Value = row.try_get("data")?;
        let created: DateTime<Utc> = row.try_get("created")?;
        let updated: DateTime<Utc> = row.try_get("updated")?;

        let mut fields = match data {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        };
        fields.insert(CREATED_FIELD.to_string(), serde_json::to_value(created)?);
        fields.insert(UPDATED_FIELD.to_string(), serde_json::to_value(updated)?);
        Ok(fields)
    }

    fn document(mut fields: Fields) -> Value {
        fields.remove(CREATED_FIELD);
        fields.remove(UPDATED_FIELD);
        Value::Object(fields)
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, collection: Collection, fields: Fields) -> Result<Fields> {
        let id = record_id(collection, &fields)?;

        let row = sqlx::query(
            r#"
            INSERT INTO records (collection, id, data, created, updated)
            VALUES ($1, $2, $3, now(), now())
            RETURNING data, created, updated
            "#,
        )
        .bind(collection.as_str())
        .bind(id.as_uuid())
        .bind(Self::document(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Duplicate { collection, id };
            }
            StoreError::Database(e)
        })?;

        Self::row_to_fields(row)
    }

    async fn replace(&self, collection: Collection, fields: Fields) -> Result<Replaced> {
        let id = record_id(collection, &fields)?;

        let row = sqlx::query(
            r#"
            WITH previous AS (
                SELECT collection, id, data, created, updated
                FROM records
                WHERE collection = $1 AND id = $2
                FOR UPDATE
            )
            UPDATE records r SET data = $3, updated = now()
            FROM previous p
            WHERE r.collection = p.collection AND r.id = p.id
            RETURNING r.data, r.created, r.updated,
                p.data AS previous_data, p.updated AS previous_updated
            "#,
        )
        .bind(collection.as_str())
        .bind(id.as_uuid())
        .bind(Self::document(fields))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound { collection, id });
        };

        let previous_data: Value = row.try_get("previous_data")?;
        let mut previous = match previous_data {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        };
        let created: DateTime<Utc> = row.try_get("created")?;
        let previous_updated: DateTime<Utc> = row.try_get("previous_updated")?;
        previous.insert(CREATED_FIELD.to_string(), serde_json::to_value(created)?);
        previous.insert(UPDATED_FIELD.to_string(), serde_json::to_value(previous_updated)?);

        Ok(Replaced {
            previous,
            current: Self::row_to_fields(row)?,
        })
    }

    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Fields>> {
        let row = sqlx::query(
            r#"
            SELECT data, created, updated
            FROM records
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_fields).transpose()
    }

    async fn find_by_filter(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Vec<Fields>> {
        let mut sql = String::from("SELECT data, created, updated FROM records WHERE collection = $1");
        let mut param_count = 1;

        // Build dynamic query
        for condition in &filter.conditions {
            match condition {
                FieldCondition::Eq(..) => {
                    sql.push_str(&format!(
                        " AND data -> ${} = ${}",
                        param_count + 1,
                        param_count + 2
                    ));
                }
                FieldCondition::In(..) => {
                    sql.push_str(&format!(
                        " AND ${} @> jsonb_build_array(data -> ${})",
                        param_count + 2,
                        param_count + 1
                    ));
                }
            }
            param_count += 2;
        }
        if filter.created_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created >= ${param_count}"));
        }
        if filter.created_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created <= ${param_count}"));
        }

        sql.push_str(" ORDER BY created ASC, seq ASC");

        if filter.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if filter.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Build and execute query with parameters
        let mut query = sqlx::query(&sql).bind(collection.as_str());

        for condition in &filter.conditions {
            query = match condition {
                FieldCondition::Eq(field, value) => query.bind(field.as_str()).bind(value.clone()),
                FieldCondition::In(field, values) => query
                    .bind(field.as_str())
                    .bind(Value::Array(values.clone())),
            };
        }
        if let Some(from) = filter.created_from {
            query = query.bind(from);
        }
        if let Some(to) = filter.created_to {
            query = query.bind(to);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(paging_bound(collection, "limit", limit)?);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(paging_bound(collection, "offset", offset)?);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_fields).collect()
    }
}

/// Converts a paging value to the `BIGINT` Postgres expects.
fn paging_bound(collection: Collection, name: &str, value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| StoreError::Validation {
        collection,
        message: format!("{name} {value} is out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_bound_accepts_bigint_range() {
        assert_eq!(paging_bound(Collection::Event, "limit", 50).unwrap(), 50);
        assert_eq!(paging_bound(Collection::Event, "offset", 0).unwrap(), 0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn paging_bound_rejects_values_past_bigint() {
        let err = paging_bound(Collection::Event, "limit", usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation {
                collection: Collection::Event,
                ..
            }
        ));
    }
}
