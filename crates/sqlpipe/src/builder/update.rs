//! UPDATE statement builder.

use super::{ordered, Direction};
use crate::config::{handle_dangerous_dml, SqlConfig};
use crate::dialect::{Dialect, Feature};
use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::{Node, NodeKind};
use crate::statement::{pipe, Statement, StatementBuilder, StatementKind};
use crate::vocab::{identifier, Aliasable, Operand};
use std::sync::Arc;

/// UPDATE builder.
///
/// Pipeline: UPDATE, SET, WHERE, ORDER BY, LIMIT, RETURNING. An UPDATE
/// without WHERE is subject to [`SqlConfig::update_without_where`].
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    stmt: Statement,
}

impl UpdateBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Update, dialect, config),
        }
    }

    /// Set the target table, replacing any earlier one.
    pub fn table(&mut self, table: impl Into<Aliasable>) -> SqlResult<&mut Self> {
        let table = table.into();
        if table.is_blank() {
            return Err(SqlError::invalid_argument("UPDATE requires a table"));
        }
        self.stmt
            .section(Keyword::Update)
            .clear()
            .push(table.into_node());
        Ok(self)
    }

    /// Append `<column> = <value>`.
    pub fn set(&mut self, column: &str, value: impl Into<Operand>) -> SqlResult<&mut Self> {
        if column.trim().is_empty() {
            return Err(SqlError::invalid_argument("SET column cannot be blank"));
        }
        let assignment = Node::new(NodeKind::Condition)
            .with(identifier(column))
            .with("=")
            .with(value.into().into_scalar("SET value")?);
        self.stmt.section(Keyword::Set).join(", ").push(assignment);
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

impl StatementBuilder for UpdateBuilder {
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
            stmt.pipe_section(Keyword::Update, true)?,
            stmt.pipe_section(Keyword::Set, true)?,
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
            self.stmt.config().update_without_where,
            "UPDATE without WHERE",
            sql,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DangerousDmlPolicy;
    use crate::dialect::{MySql, Postgres};
    use crate::vocab::{eq, raw};

    #[test]
    fn update_with_where() {
        let mut qb = UpdateBuilder::new(Arc::new(Postgres));
        qb.table("users")
            .unwrap()
            .set("name", "bob")
            .unwrap()
            .set("visits", raw("visits + 1"))
            .unwrap()
            .set("deleted_at", None::<String>)
            .unwrap()
            .and_where([eq("id", 7).unwrap()])
            .unwrap()
            .returning(["id"])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"UPDATE "users" SET "name" = 'bob', "visits" = visits + 1, "deleted_at" = NULL WHERE ("id" = 7) RETURNING "id""#
        );
    }

    #[test]
    fn mysql_order_and_limit() {
        let mut qb = UpdateBuilder::new(Arc::new(MySql));
        qb.table("jobs")
            .unwrap()
            .set("claimed", true)
            .unwrap()
            .and_where([eq("claimed", false).unwrap()])
            .unwrap()
            .order_by("id", Direction::Asc)
            .unwrap()
            .limit(1);
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `jobs` SET `claimed` = 1 WHERE (`claimed` = 0) ORDER BY `id` ASC LIMIT 1"
        );
    }

    #[test]
    fn order_and_limit_rejected_on_postgres() {
        let mut qb = UpdateBuilder::new(Arc::new(Postgres));
        qb.table("jobs")
            .unwrap()
            .set("claimed", true)
            .unwrap()
            .and_where([eq("claimed", false).unwrap()])
            .unwrap();
        let plain = qb.clone();
        qb.limit(1);
        assert!(qb.to_sql().unwrap_err().is_unsupported());

        let mut ordered = plain.clone();
        ordered.order_by("id", Direction::Asc).unwrap();
        assert!(ordered.to_sql().unwrap_err().is_unsupported());

        qb.set_dialect(Arc::new(MySql));
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `jobs` SET `claimed` = 1 WHERE (`claimed` = 0) LIMIT 1"
        );
        assert!(plain.to_sql().is_ok());
    }

    #[test]
    fn set_is_required() {
        let mut qb = UpdateBuilder::new(Arc::new(MySql));
        qb.table("users").unwrap();
        assert_eq!(
            qb.to_sql().unwrap_err(),
            SqlError::invalid_argument("SET requires at least one assignment")
        );
        assert!(qb.set(" ", 1).is_err());
        assert!(qb.set("ids", vec![1, 2]).is_err());
    }

    #[test]
    fn update_without_where_policy() {
        let config = Arc::new(SqlConfig::new().update_without_where(DangerousDmlPolicy::Error));
        let mut qb = UpdateBuilder::with_config(Arc::new(MySql), config);
        qb.table("users").unwrap().set("active", false).unwrap();
        assert!(qb.to_sql().unwrap_err().is_invalid_argument());

        qb.and_where([eq("id", 1).unwrap()]).unwrap();
        assert!(qb.to_sql().is_ok());
    }
}
