//! Catalog metadata records supplied by a `SchemaFetcher`

use serde::{Deserialize, Serialize};

/// Role a column plays in the table's keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    #[default]
    None,
    /// Part of the primary key
    Primary,
    /// First column of a unique index
    Unique,
    /// First column of a non-unique index
    Multiple,
}

impl ColumnKey {
    /// Parses the MySQL `COLUMN_KEY` flag (`PRI`, `UNI`, `MUL` or empty)
    pub fn from_mysql(flag: &str) -> Self {
        match flag.trim().to_uppercase().as_str() {
            "PRI" => Self::Primary,
            "UNI" => Self::Unique,
            "MUL" => Self::Multiple,
            _ => Self::None,
        }
    }

    /// Short flag shown in schema dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Primary => "PRI",
            Self::Unique => "UNI",
            Self::Multiple => "MUL",
        }
    }
}

/// Column information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub key: ColumnKey,
    pub default_value: Option<String>,
    /// Free-form extra attributes such as `auto_increment`
    #[serde(default)]
    pub extra: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            key: ColumnKey::None,
            default_value: None,
            extra: String::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_key(mut self, key: ColumnKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// One column of one index, in the shape of a `SHOW INDEX` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub index_name: String,
    pub index_type: String,
    pub is_unique: bool,
    /// Indexed column; absent for functional index parts
    pub column_name: Option<String>,
    /// 1-based position of the column within the index
    pub seq_in_index: u32,
}

impl IndexColumn {
    pub fn new(index_name: impl Into<String>, column_name: impl Into<String>, seq_in_index: u32) -> Self {
        Self {
            index_name: index_name.into(),
            index_type: "BTREE".to_string(),
            is_unique: false,
            column_name: Some(column_name.into()),
            seq_in_index,
        }
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.index_name == "PRIMARY"
    }
}

/// Columns and index rows of a single table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexColumn>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnInfo>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<IndexColumn>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Distinct index names in first-seen order
    pub fn index_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for index in &self.indexes {
            if !names.contains(&index.index_name.as_str()) {
                names.push(&index.index_name);
            }
        }
        names
    }
}
