//! Collaborator traits for plan and catalog retrieval
//!
//! The analysis pipeline never opens database connections itself. Whatever
//! hosts it passes these capabilities into the session explicitly.

use async_trait::async_trait;

use crate::{ColumnInfo, IndexColumn, PlanMode, Result, TableSchema};

/// Produces raw plan text for a SQL statement
#[async_trait]
pub trait PlanFetcher: Send + Sync {
    /// Return the indentation-formatted plan for `sql` in the requested mode
    async fn fetch_plan(&self, sql: &str, mode: PlanMode) -> Result<String>;
}

/// Produces column and index metadata for a table
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Get columns for a table, in ordinal order
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Get index rows for a table, ordered by index name then sequence
    async fn get_indexes(&self, table: &str) -> Result<Vec<IndexColumn>>;

    /// Get both columns and indexes for a table
    async fn get_table_schema(&self, table: &str) -> Result<TableSchema> {
        let columns = self.get_columns(table).await?;
        let indexes = self.get_indexes(table).await?;
        Ok(TableSchema::new(table)
            .with_columns(columns)
            .with_indexes(indexes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QlensError;
    use pretty_assertions::assert_eq;

    struct FixedCatalog;

    #[async_trait]
    impl SchemaFetcher for FixedCatalog {
        async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
            if table == "missing" {
                return Err(QlensError::Schema(format!("unknown table {table}")));
            }
            Ok(vec![ColumnInfo::new("id", "bigint").not_null()])
        }

        async fn get_indexes(&self, _table: &str) -> Result<Vec<IndexColumn>> {
            Ok(vec![IndexColumn::new("PRIMARY", "id", 1).unique()])
        }
    }

    #[tokio::test]
    async fn test_default_table_schema_combines_both_lookups() {
        let schema = FixedCatalog
            .get_table_schema("wp_posts")
            .await
            .expect("schema");

        assert_eq!(schema.table, "wp_posts");
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.indexes.len(), 1);
    }

    #[tokio::test]
    async fn test_default_table_schema_propagates_errors() {
        let err = FixedCatalog
            .get_table_schema("missing")
            .await
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Schema error: unknown table missing");
    }
}
