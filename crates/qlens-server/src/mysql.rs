//! MySQL plan and catalog collaborator
//!
//! Plans come from `EXPLAIN FORMAT=TREE` and `EXPLAIN ANALYZE`, both of which
//! print the indented `->` text the analyzer parses. Catalog rows come from
//! `information_schema`.

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, Pool};
use qlens_core::{
    ColumnInfo, ColumnKey, IndexColumn, PlanFetcher, PlanMode, QlensError, Result, SchemaFetcher,
};

const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_KEY, COLUMN_DEFAULT, EXTRA
     FROM information_schema.COLUMNS
     WHERE TABLE_SCHEMA = COALESCE(?, DATABASE()) AND TABLE_NAME = ?
     ORDER BY ORDINAL_POSITION";

const INDEXES_QUERY: &str = "SELECT INDEX_NAME, INDEX_TYPE, NON_UNIQUE, COLUMN_NAME, SEQ_IN_INDEX
     FROM information_schema.STATISTICS
     WHERE TABLE_SCHEMA = COALESCE(?, DATABASE()) AND TABLE_NAME = ?
     ORDER BY INDEX_NAME, SEQ_IN_INDEX";

type ColumnRow = (String, String, String, String, Option<String>, String);
type IndexRow = (String, String, i64, Option<String>, u32);

/// Answers plan and catalog lookups from a MySQL connection pool
#[derive(Clone)]
pub struct MysqlCollaborator {
    pool: Pool,
}

impl MysqlCollaborator {
    /// Creates a pool for `url`; connections are opened on first use
    pub fn connect(url: &str) -> Result<Self> {
        let opts = Opts::from_url(url)
            .map_err(|e| QlensError::Configuration(format!("invalid MySQL URL: {e}")))?;
        tracing::info!(
            host = %opts.ip_or_hostname(),
            port = opts.tcp_port(),
            database = ?opts.db_name(),
            "configured MySQL pool"
        );
        Ok(Self {
            pool: Pool::new(opts),
        })
    }

    /// Closes every pooled connection
    pub async fn disconnect(self) -> Result<()> {
        self.pool
            .disconnect()
            .await
            .map_err(|e| QlensError::Connection(format!("Failed to close MySQL pool: {e}")))
    }

    async fn get_conn(&self) -> Result<Conn> {
        self.pool
            .get_conn()
            .await
            .map_err(|e| QlensError::Connection(format!("Failed to get MySQL connection: {e}")))
    }
}

#[async_trait]
impl PlanFetcher for MysqlCollaborator {
    #[tracing::instrument(skip(self, sql), fields(mode = %mode))]
    async fn fetch_plan(&self, sql: &str, mode: PlanMode) -> Result<String> {
        let statement = explain_statement(sql, mode);
        let mut conn = self.get_conn().await?;
        let lines: Vec<String> = conn
            .query(statement)
            .await
            .map_err(|e| QlensError::Query(e.to_string()))?;
        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl SchemaFetcher for MysqlCollaborator {
    #[tracing::instrument(skip(self))]
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let (schema, name) = split_table_name(table);
        let mut conn = self.get_conn().await?;
        let rows: Vec<ColumnRow> = conn
            .exec(COLUMNS_QUERY, (schema, name))
            .await
            .map_err(|e| QlensError::Schema(format!("Failed to load columns for {table}: {e}")))?;

        Ok(rows.into_iter().map(column_from_row).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_indexes(&self, table: &str) -> Result<Vec<IndexColumn>> {
        let (schema, name) = split_table_name(table);
        let mut conn = self.get_conn().await?;
        let rows: Vec<IndexRow> = conn
            .exec(INDEXES_QUERY, (schema, name))
            .await
            .map_err(|e| QlensError::Schema(format!("Failed to load indexes for {table}: {e}")))?;

        Ok(rows.into_iter().map(index_from_row).collect())
    }
}

fn explain_statement(sql: &str, mode: PlanMode) -> String {
    let sql = sql.trim().trim_end_matches(';');
    match mode {
        PlanMode::Estimated => format!("EXPLAIN FORMAT=TREE {sql}"),
        PlanMode::Actual => format!("EXPLAIN ANALYZE {sql}"),
    }
}

/// Splits `schema.table` into its parts; a bare name uses the current database
fn split_table_name(table: &str) -> (Option<String>, String) {
    match table.split_once('.') {
        Some((schema, name)) if !schema.is_empty() && !name.is_empty() => {
            (Some(schema.to_string()), name.to_string())
        }
        _ => (None, table.to_string()),
    }
}

fn column_from_row((name, data_type, nullable, key, default_value, extra): ColumnRow) -> ColumnInfo {
    ColumnInfo {
        name,
        data_type,
        nullable: nullable.eq_ignore_ascii_case("YES"),
        key: ColumnKey::from_mysql(&key),
        default_value,
        extra,
    }
}

fn index_from_row((index_name, index_type, non_unique, column_name, seq_in_index): IndexRow) -> IndexColumn {
    IndexColumn {
        index_name,
        index_type,
        is_unique: non_unique == 0,
        column_name,
        seq_in_index,
    }
}
