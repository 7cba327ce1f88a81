use crate::dialect::DialectKind;
use crate::error::{SqlError, SqlResult};
use serde::Deserialize;
use std::path::Path;

/// Builder configuration, loadable from TOML.
///
/// ```toml
/// dialect = "mysql"
/// delete_without_where = "error"
/// max_logged_sql_length = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    /// Dialect used by builders derived from this configuration.
    pub dialect: DialectKind,
    pub delete_without_where: DangerousDmlPolicy,
    pub update_without_where: DangerousDmlPolicy,
    pub truncate: DangerousDmlPolicy,
    pub drop_table: DangerousDmlPolicy,
    /// Whether rendered statements are emitted as tracing events.
    pub log_sql: bool,
    /// Byte cap for logged SQL; `None` logs the full statement.
    pub max_logged_sql_length: Option<usize>,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            dialect: DialectKind::default(),
            delete_without_where: DangerousDmlPolicy::Allow,
            update_without_where: DangerousDmlPolicy::Allow,
            truncate: DangerousDmlPolicy::Allow,
            drop_table: DangerousDmlPolicy::Allow,
            log_sql: true,
            max_logged_sql_length: Some(200),
        }
    }
}

impl SqlConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlError::configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        toml::from_str(&raw).map_err(|e| {
            SqlError::configuration(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Set the dialect.
    pub fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    /// Configure how DELETE without WHERE is handled.
    pub fn delete_without_where(mut self, policy: DangerousDmlPolicy) -> Self {
        self.delete_without_where = policy;
        self
    }

    /// Configure how UPDATE without WHERE is handled.
    pub fn update_without_where(mut self, policy: DangerousDmlPolicy) -> Self {
        self.update_without_where = policy;
        self
    }

    /// Configure how TRUNCATE is handled.
    pub fn truncate_policy(mut self, policy: DangerousDmlPolicy) -> Self {
        self.truncate = policy;
        self
    }

    /// Configure how DROP TABLE is handled.
    pub fn drop_table_policy(mut self, policy: DangerousDmlPolicy) -> Self {
        self.drop_table = policy;
        self
    }

    /// Reject every dangerous statement.
    pub fn strict(mut self) -> Self {
        self.delete_without_where = DangerousDmlPolicy::Error;
        self.update_without_where = DangerousDmlPolicy::Error;
        self.truncate = DangerousDmlPolicy::Error;
        self.drop_table = DangerousDmlPolicy::Error;
        self
    }

    /// Enable or disable statement logging.
    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    /// Cap logged SQL at `max_bytes`.
    pub fn max_logged_sql_length(mut self, max_bytes: Option<usize>) -> Self {
        self.max_logged_sql_length = max_bytes;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DangerousDmlPolicy {
    #[default]
    Allow,
    Warn,
    Error,
}

pub(crate) fn handle_dangerous_dml(
    policy: DangerousDmlPolicy,
    rule: &str,
    sql: &str,
) -> SqlResult<()> {
    match policy {
        DangerousDmlPolicy::Allow => Ok(()),
        DangerousDmlPolicy::Warn => {
            tracing::warn!(target: "sqlpipe.policy", rule, sql, "dangerous statement");
            Ok(())
        }
        DangerousDmlPolicy::Error => Err(SqlError::invalid_argument(format!(
            "SQL policy violation: {rule}: {sql}"
        ))),
    }
}
