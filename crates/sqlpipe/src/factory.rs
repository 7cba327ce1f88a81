//! Derive fresh statement builders from a shared template.

use crate::builder::{
    AlterTableBuilder, CreateTableBuilder, DeleteBuilder, DropTableBuilder, InsertBuilder,
    SelectBuilder, TruncateBuilder, UpdateBuilder,
};
use crate::config::SqlConfig;
use crate::dialect::Dialect;
use std::sync::Arc;

/// A template holding a dialect and configuration.
///
/// Every builder it returns starts empty and shares only those two values,
/// so one factory can serve many independent statements (including one per
/// thread) without any cross-contamination.
///
/// ```ignore
/// let sql = SqlFactory::from_config(SqlConfig::from_toml_str("dialect = \"mysql\"")?);
/// let mut users = sql.select();
/// users.select(["id"])?.from(["users"])?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlFactory {
    dialect: Arc<dyn Dialect>,
    config: Arc<SqlConfig>,
}

impl SqlFactory {
    /// Create a factory with the default configuration.
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, SqlConfig::default())
    }

    /// Create a factory with an explicit dialect, ignoring `config.dialect`.
    pub fn with_config(dialect: Arc<dyn Dialect>, config: SqlConfig) -> Self {
        Self {
            dialect,
            config: Arc::new(config),
        }
    }

    /// Create a factory whose dialect is chosen by `config.dialect`.
    pub fn from_config(config: SqlConfig) -> Self {
        let dialect = config.dialect.dialect();
        Self::with_config(dialect, config)
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    pub fn select(&self) -> SelectBuilder {
        SelectBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn insert(&self) -> InsertBuilder {
        InsertBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn update(&self) -> UpdateBuilder {
        UpdateBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn create_table(&self) -> CreateTableBuilder {
        CreateTableBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn alter_table(&self) -> AlterTableBuilder {
        AlterTableBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn drop_table(&self) -> DropTableBuilder {
        DropTableBuilder::with_config(self.dialect.clone(), self.config.clone())
    }

    pub fn truncate(&self) -> TruncateBuilder {
        TruncateBuilder::with_config(self.dialect.clone(), self.config.clone())
    }
}
