//! Generic Postgres-backed repository.
//!
//! Row decoding and insert/update statement shaping are supplied per entity
//! (a [`ScanFn`], an [`InsertBuilder`] and an [`UpdateBuilder`]); everything
//! else (filters, sorting, pagination, counting, error mapping) is shared.

pub mod category;

use crate::domain::entity::FieldValue;
use crate::domain::repository::{
    Filter, FilterOperator, ListOptions, RepoError, RepoResult, Repository, Sort,
};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use std::marker::PhantomData;

/// Builds an entity from a result row.
pub type ScanFn<E> = fn(&PgRow) -> Result<E, sqlx::Error>;

pub trait InsertBuilder<E>: Send + Sync {
    /// `INSERT` statement text with `$n` placeholders. The repository appends
    /// `RETURNING <id column>`.
    fn build_query(&self, table: &str) -> String;

    /// Bind values in placeholder order.
    fn extract_values(&self, entity: &E) -> Vec<FieldValue>;

    /// Writes a storage-generated id back into the entity.
    fn assign_id(&self, _entity: &mut E, _row: &PgRow) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

pub trait UpdateBuilder<E>: Send + Sync {
    /// `SET` assignments such as `name = $1`, numbered from `$1`. The id is
    /// bound after the last assignment value.
    fn build_assignments(&self, table: &str) -> Vec<String>;

    /// Bind values in placeholder order.
    fn extract_values(&self, entity: &E) -> Vec<FieldValue>;
}

const UNIQUE_VIOLATION: &str = "23505";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned());
            match code.as_deref() {
                Some(UNIQUE_VIOLATION) => RepoError::Conflict(db.message().to_string()),
                Some(INVALID_TEXT_REPRESENTATION) => RepoError::Validation(db.message().to_string()),
                _ => RepoError::Persistence(sqlx::Error::Database(db)),
            }
        }
        other => RepoError::Persistence(other),
    }
}

/// `NULL` is bound as untyped text; statements cast where the column needs it.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: FieldValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FieldValue::Null => query.bind(Option::<String>::None),
        FieldValue::Text(s) => query.bind(s),
        FieldValue::Int(n) => query.bind(n),
        FieldValue::Bool(b) => query.bind(b),
        FieldValue::Uuid(u) => query.bind(u),
        FieldValue::Timestamp(t) => query.bind(t),
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Null => builder.push_bind(Option::<String>::None),
        FieldValue::Text(s) => builder.push_bind(s),
        FieldValue::Int(n) => builder.push_bind(n),
        FieldValue::Bool(b) => builder.push_bind(b),
        FieldValue::Uuid(u) => builder.push_bind(u),
        FieldValue::Timestamp(t) => builder.push_bind(t),
    };
}

pub struct PgRepository<E, I> {
    pool: PgPool,
    table: String,
    id_column: String,
    columns: Vec<&'static str>,
    column_types: HashMap<&'static str, &'static str>,
    scan: ScanFn<E>,
    insert: Box<dyn InsertBuilder<E>>,
    update: Box<dyn UpdateBuilder<E>>,
    _id: PhantomData<fn() -> I>,
}

impl<E, I> PgRepository<E, I> {
    /// `columns` is both the select list and the allow-list for filter and
    /// sort columns.
    pub fn new(
        pool: PgPool,
        table: impl Into<String>,
        columns: &[&'static str],
        scan: ScanFn<E>,
        insert: impl InsertBuilder<E> + 'static,
        update: impl UpdateBuilder<E> + 'static,
    ) -> Self {
        Self {
            pool,
            table: table.into(),
            id_column: "id".to_string(),
            columns: columns.to_vec(),
            column_types: HashMap::new(),
            scan,
            insert: Box::new(insert),
            update: Box::new(update),
            _id: PhantomData,
        }
    }

    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Declares a Postgres type that text filter values are cast to
    /// (e.g. `uuid`), as query strings always arrive as text.
    pub fn with_column_type(mut self, column: &'static str, sql_type: &'static str) -> Self {
        self.column_types.insert(column, sql_type);
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn check_column(&self, column: &str) -> RepoResult<()> {
        if self.columns.contains(&column) {
            Ok(())
        } else {
            Err(RepoError::validation(format!("column not allowed: {}", column)))
        }
    }

    fn select_prefix(&self) -> String {
        format!("SELECT {} FROM {}", self.columns.join(", "), self.table)
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> RepoResult<()> {
        if filter.is_empty() {
            return Ok(());
        }
        builder.push(" WHERE ");
        let mut first = true;
        for condition in &filter.conditions {
            self.check_column(&condition.field)?;
            if !first {
                builder.push(" AND ");
            }
            first = false;
            builder.push(&condition.field);
            match &condition.operator {
                FilterOperator::Eq(value) => {
                    builder.push(" = ");
                    push_value(builder, value.clone());
                    if let (FieldValue::Text(_), Some(sql_type)) =
                        (value, self.column_types.get(condition.field.as_str()))
                    {
                        builder.push("::").push(*sql_type);
                    }
                }
                FilterOperator::IsNull => {
                    builder.push(" IS NULL");
                }
                FilterOperator::IsNotNull => {
                    builder.push(" IS NOT NULL");
                }
            }
        }
        if let Some(raw) = &filter.raw {
            let parts: Vec<&str> = raw.sql.split('?').collect();
            if parts.len() != raw.args.len() + 1 {
                return Err(RepoError::validation(format!(
                    "raw predicate expects {} arguments, got {}",
                    parts.len() - 1,
                    raw.args.len()
                )));
            }
            if !first {
                builder.push(" AND ");
            }
            builder.push("(");
            for (idx, part) in parts.iter().enumerate() {
                builder.push(*part);
                if let Some(arg) = raw.args.get(idx) {
                    push_value(builder, arg.clone());
                }
            }
            builder.push(")");
        }
        Ok(())
    }

    fn push_order_by(&self, builder: &mut QueryBuilder<'_, Postgres>, sorts: &[Sort]) -> RepoResult<()> {
        builder.push(" ORDER BY ");
        for sort in sorts {
            self.check_column(&sort.field)?;
            builder
                .push(&sort.field)
                .push(" ")
                .push(sort.direction.as_sql())
                .push(", ");
        }
        // Deterministic pagination when primary keys tie.
        builder.push(&self.id_column).push(" ASC");
        Ok(())
    }
}

#[async_trait]
impl<E, I> Repository<E, I> for PgRepository<E, I>
where
    E: Send + Sync + 'static,
    I: Clone + Into<FieldValue> + Send + Sync + 'static,
{
    async fn create(&self, entity: &mut E) -> RepoResult<()> {
        let sql = format!(
            "{} RETURNING {}",
            self.insert.build_query(&self.table),
            self.id_column
        );
        let mut query = sqlx::query(&sql);
        for value in self.insert.extract_values(entity) {
            query = bind_value(query, value);
        }
        let row = query.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;
        self.insert.assign_id(entity, &row).map_err(map_sqlx_error)?;
        tracing::debug!(table = %self.table, "inserted row");
        Ok(())
    }

    async fn get_by_id(&self, id: &I) -> RepoResult<E> {
        let mut builder = QueryBuilder::new(self.select_prefix());
        builder.push(" WHERE ").push(&self.id_column).push(" = ");
        push_value(&mut builder, id.clone().into());
        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;
        (self.scan)(&row).map_err(map_sqlx_error)
    }

    async fn update(&self, id: &I, entity: &mut E) -> RepoResult<()> {
        let assignments = self.update.build_assignments(&self.table);
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            self.table,
            assignments.join(", "),
            self.id_column,
            assignments.len() + 1
        );
        let mut query = sqlx::query(&sql);
        for value in self.update.extract_values(entity) {
            query = bind_value(query, value);
        }
        query = bind_value(query, id.clone().into());
        let result = query.execute(&self.pool).await.map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        tracing::debug!(table = %self.table, "updated row");
        Ok(())
    }

    async fn delete(&self, id: &I) -> RepoResult<()> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("DELETE FROM ");
        builder
            .push(&self.table)
            .push(" WHERE ")
            .push(&self.id_column)
            .push(" = ");
        push_value(&mut builder, id.clone().into());
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, opts: &ListOptions) -> RepoResult<(Vec<E>, i64)> {
        let mut builder = QueryBuilder::new(self.select_prefix());
        self.push_where(&mut builder, &opts.filter)?;
        self.push_order_by(&mut builder, &opts.sorts)?;
        if let Some(page) = opts.pagination {
            builder
                .push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.offset);
        }
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let items = rows
            .iter()
            .map(|row| (self.scan)(row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqlx_error)?;

        let total = if opts.skip_count {
            0
        } else {
            self.count(&opts.filter).await?
        };
        Ok((items, total))
    }

    async fn count(&self, filter: &Filter) -> RepoResult<i64> {
        let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.table));
        self.push_where(&mut builder, filter)?;
        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.try_get::<i64, _>(0).map_err(map_sqlx_error)
    }

    async fn exists(&self, id: &I) -> RepoResult<bool> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        builder
            .push(&self.table)
            .push(" WHERE ")
            .push(&self.id_column)
            .push(" = ");
        push_value(&mut builder, id.clone().into());
        builder.push(")");
        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.try_get::<bool, _>(0).map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::RawPredicate;

    struct Dummy;

    struct NoopInsert;
    impl InsertBuilder<Dummy> for NoopInsert {
        fn build_query(&self, table: &str) -> String {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        }
        fn extract_values(&self, _entity: &Dummy) -> Vec<FieldValue> {
            Vec::new()
        }
    }

    struct NoopUpdate;
    impl UpdateBuilder<Dummy> for NoopUpdate {
        fn build_assignments(&self, _table: &str) -> Vec<String> {
            Vec::new()
        }
        fn extract_values(&self, _entity: &Dummy) -> Vec<FieldValue> {
            Vec::new()
        }
    }

    fn scan(_row: &PgRow) -> Result<Dummy, sqlx::Error> {
        Ok(Dummy)
    }

    fn repo() -> PgRepository<Dummy, i64> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        PgRepository::new(pool, "things", &["id", "name", "owner_id", "deleted_at"], scan, NoopInsert, NoopUpdate)
            .with_column_type("owner_id", "uuid")
    }

    #[tokio::test]
    async fn builds_where_and_order_clauses() {
        let repo = repo();
        let filter = Filter::new()
            .eq("name", "a")
            .eq("owner_id", "0190b7a2-0000-7000-8000-000000000000")
            .is_null("deleted_at")
            .with_raw(RawPredicate::new("length(name) > ?", vec![FieldValue::Int(3)]));
        let mut builder = QueryBuilder::new(repo.select_prefix());
        repo.push_where(&mut builder, &filter).unwrap();
        repo.push_order_by(&mut builder, &[Sort::desc("name")]).unwrap();
        assert_eq!(
            builder.sql(),
            "SELECT id, name, owner_id, deleted_at FROM things WHERE name = $1 AND owner_id = $2::uuid \
             AND deleted_at IS NULL AND (length(name) > $3) ORDER BY name DESC, id ASC"
        );
    }

    #[tokio::test]
    async fn rejects_columns_outside_allow_list() {
        let repo = repo();
        let mut builder = QueryBuilder::new(repo.select_prefix());
        let err = repo
            .push_where(&mut builder, &Filter::new().eq("name; DROP TABLE things", "x"))
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let mut builder = QueryBuilder::new(repo.select_prefix());
        let err = repo
            .push_order_by(&mut builder, &[Sort::asc("password")])
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn raw_predicate_argument_count_must_match() {
        let repo = repo();
        let mut builder = QueryBuilder::new(repo.select_prefix());
        let filter = Filter::new().with_raw(RawPredicate::new("a = ? AND b = ?", vec![FieldValue::Int(1)]));
        assert!(repo.push_where(&mut builder, &filter).is_err());
    }
}
