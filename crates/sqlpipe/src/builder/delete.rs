//! DELETE statement builder.

use super::{ordered, table_name, Direction};
use crate::config::{handle_dangerous_dml, SqlConfig};
use crate::dialect::{Dialect, Feature};
use crate::error::SqlResult;
use crate::keyword::Keyword;
use crate::node::Node;
use crate::statement::{pipe, Statement, StatementBuilder, StatementKind};
use crate::vocab::Aliasable;
use std::sync::Arc;

/// DELETE builder.
///
/// Pipeline: DELETE FROM, WHERE, ORDER BY, LIMIT, RETURNING.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    stmt: Statement,
}

impl DeleteBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Delete, dialect, config),
        }
    }

    /// Set the target table, replacing any earlier one.
    pub fn from(&mut self, table: &str) -> SqlResult<&mut Self> {
        let table = table_name("DELETE FROM", table)?;
        self.stmt.section(Keyword::DeleteFrom).clear().push(table);
        Ok(self)
    }

    pub fn and_where<I>(&mut self, conditions: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.stmt
            .push_conditions(Keyword::Where, Keyword::And, conditions)?;
        Ok(self)
    }

    pub fn or_where<I>(&mut self, conditions: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.stmt
            .push_conditions(Keyword::Where, Keyword::Or, conditions)?;
        Ok(self)
    }

    pub fn order_by(
        &mut self,
        column: impl Into<Aliasable>,
        direction: Direction,
    ) -> SqlResult<&mut Self> {
        let node = ordered(column, direction)?;
        self.stmt.section(Keyword::OrderBy).join(", ").push(node);
        self.stmt.require(Feature::DmlOrderLimit);
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.stmt.update_limit(|l| l.limit = Some(limit));
        self.stmt.require(Feature::DmlOrderLimit);
        self
    }

    pub fn returning<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Aliasable>,
    {
        self.stmt.push_list(Keyword::Returning, columns)?;
        self.stmt.require(Feature::Returning);
        Ok(self)
    }
}

impl StatementBuilder for DeleteBuilder {
    fn statement(&self) -> &Statement {
        &self.stmt
    }

    fn statement_mut(&mut self) -> &mut Statement {
        &mut self.stmt
    }

    fn pipeline(&self) -> SqlResult<Node> {
        let stmt = &self.stmt;
        stmt.check_features()?;
        Ok(pipe([
            stmt.pipe_section(Keyword::DeleteFrom, true)?,
            stmt.pipe_section(Keyword::Where, false)?,
            stmt.pipe_section(Keyword::OrderBy, false)?,
            stmt.pipe_bare(Keyword::Limit, false)?,
            stmt.pipe_section(Keyword::Returning, false)?,
        ]))
    }

    fn check(&self, sql: &str) -> SqlResult<()> {
        if self.stmt.has_content(Keyword::Where) {
            return Ok(());
        }
        handle_dangerous_dml(
            self.stmt.config().delete_without_where,
            "DELETE without WHERE",
            sql,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DangerousDmlPolicy;
    use crate::dialect::{MySql, Postgres, Sqlite};
    use crate::error::SqlError;
    use crate::vocab::{in_list, lt};

    #[test]
    fn delete_with_conditions() {
        let mut qb = DeleteBuilder::new(Arc::new(Sqlite));
        qb.from("sessions")
            .unwrap()
            .and_where([lt("expires_at", 1_700_000_000).unwrap()])
            .unwrap()
            .or_where([in_list("user_id", vec![3, 4]).unwrap()])
            .unwrap()
            .returning(["id"])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"DELETE FROM "sessions" WHERE ("expires_at" < 1700000000) OR ("user_id" IN (3,4)) RETURNING "id""#
        );
    }

    #[test]
    fn mysql_limit() {
        let mut qb = DeleteBuilder::new(Arc::new(MySql));
        qb.from("logs")
            .unwrap()
            .and_where([lt("id", 100).unwrap()])
            .unwrap()
            .order_by("id", Direction::Desc)
            .unwrap()
            .limit(50);
        assert_eq!(
            qb.to_sql().unwrap(),
            "DELETE FROM `logs` WHERE (`id` < 100) ORDER BY `id` DESC LIMIT 50"
        );
    }

    #[test]
    fn order_and_limit_rejected_on_sqlite_and_postgres() {
        for dialect in [Arc::new(Sqlite) as Arc<dyn Dialect>, Arc::new(Postgres)] {
            let mut qb = DeleteBuilder::new(dialect);
            qb.from("logs")
                .unwrap()
                .order_by("id", Direction::Desc)
                .unwrap()
                .limit(10);
            let err = qb.to_sql().unwrap_err();
            assert!(err.is_unsupported());
            assert!(err.to_string().contains("ORDER BY/LIMIT"));
        }
    }

    #[test]
    fn table_is_required() {
        let qb = DeleteBuilder::new(Arc::new(MySql));
        assert_eq!(
            qb.to_sql().unwrap_err(),
            SqlError::invalid_argument("DELETE FROM requires a table")
        );
        assert!(DeleteBuilder::new(Arc::new(MySql)).from("").is_err());
    }

    #[test]
    fn delete_without_where_policy() {
        let mut qb = DeleteBuilder::new(Arc::new(MySql));
        qb.from("users").unwrap();
        assert_eq!(qb.to_sql().unwrap(), "DELETE FROM `users`");

        let strict = Arc::new(SqlConfig::new().strict());
        let mut qb = DeleteBuilder::with_config(Arc::new(MySql), strict);
        qb.from("users").unwrap();
        let err = qb.to_sql().unwrap_err();
        assert!(err.to_string().contains("DELETE without WHERE"));
    }

    #[test]
    fn warn_policy_still_renders() {
        let config = Arc::new(SqlConfig::new().delete_without_where(DangerousDmlPolicy::Warn));
        let mut qb = DeleteBuilder::with_config(Arc::new(MySql), config);
        qb.from("users").unwrap();
        assert_eq!(qb.to_sql().unwrap(), "DELETE FROM `users`");
    }
}
