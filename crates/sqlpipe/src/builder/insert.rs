//! INSERT statement builder.

use super::{column_names, table_name, SelectBuilder};
use crate::config::SqlConfig;
use crate::dialect::{Dialect, Feature};
use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::{Child, Node, NodeKind};
use crate::statement::{pipe, Statement, StatementBuilder, StatementKind};
use crate::vocab::{Aliasable, Operand};
use std::sync::Arc;

/// INSERT builder: `INSERT INTO t (cols) VALUES (...), (...) [RETURNING ...]`
/// or `INSERT INTO t (cols) SELECT ...`.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    stmt: Statement,
}

impl InsertBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Insert, dialect, config),
        }
    }

    /// Set the target table, replacing any earlier one.
    pub fn into_table(&mut self, table: &str) -> SqlResult<&mut Self> {
        let table = table_name("INSERT INTO", table)?;
        self.stmt.section(Keyword::InsertInto).clear().push(table);
        Ok(self)
    }

    /// Set the column list, replacing any earlier one.
    ///
    /// Rows added afterwards must have the same arity.
    pub fn columns<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let columns = column_names("INSERT", columns)?;
        if let Some(arity) = self.row_arity() {
            if arity != columns.len() {
                return Err(SqlError::invalid_argument(format!(
                    "INSERT has rows of {arity} values but {} columns",
                    columns.len()
                )));
            }
        }
        self.stmt
            .section(Keyword::Column)
            .clear()
            .join(", ")
            .wrap("(", ")")
            .append(columns);
        Ok(self)
    }

    /// Append one row of values.
    ///
    /// Values are quoted literals, NULL, or nodes used as-is.
    pub fn values<I>(&mut self, row: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        if self.stmt.has_content(Keyword::Select) {
            return Err(SqlError::invalid_argument(
                "INSERT cannot combine VALUES with SELECT",
            ));
        }
        let items = row
            .into_iter()
            .map(Into::<Operand>::into)
            .map(|v| v.into_scalar("INSERT value"))
            .collect::<SqlResult<Vec<Node>>>()?;
        if items.is_empty() {
            return Err(SqlError::invalid_argument(
                "VALUES row requires at least one value",
            ));
        }
        let expected = self.column_count().or_else(|| self.row_arity());
        if let Some(expected) = expected {
            if expected != items.len() {
                return Err(SqlError::invalid_argument(format!(
                    "VALUES row has {} values, expected {expected}",
                    items.len()
                )));
            }
        }
        let row = Node::new(NodeKind::List)
            .with_all(items)
            .separated(", ")
            .wrapped("(", ")");
        self.stmt.section(Keyword::Values).join(", ").push(row);
        Ok(self)
    }

    /// Insert the rows produced by a SELECT instead of literal values.
    pub fn select(&mut self, query: &SelectBuilder) -> SqlResult<&mut Self> {
        if self.stmt.has_content(Keyword::Values) {
            return Err(SqlError::invalid_argument(
                "INSERT cannot combine VALUES with SELECT",
            ));
        }
        let node = query.pipeline()?;
        self.stmt.absorb_features(query.statement());
        self.stmt.section(Keyword::Select).clear().push(node);
        Ok(self)
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

    fn column_count(&self) -> Option<usize> {
        self.stmt
            .peek(Keyword::Column)
            .filter(|n| !n.is_empty())
            .map(Node::len)
    }

    fn row_arity(&self) -> Option<usize> {
        self.stmt
            .peek(Keyword::Values)
            .and_then(|rows| rows.children().first())
            .and_then(|row| match row {
                Child::Node(n) => Some(n.len()),
                _ => None,
            })
    }
}

impl StatementBuilder for InsertBuilder {
    fn statement(&self) -> &Statement {
        &self.stmt
    }

    fn statement_mut(&mut self) -> &mut Statement {
        &mut self.stmt
    }

    fn pipeline(&self) -> SqlResult<Node> {
        let stmt = &self.stmt;
        stmt.check_features()?;

        let source = if stmt.has_content(Keyword::Select) {
            stmt.pipe_bare(Keyword::Select, true)?
        } else {
            stmt.pipe_section(Keyword::Values, true)?
        };

        Ok(pipe([
            stmt.pipe_section(Keyword::InsertInto, true)?,
            stmt.pipe_bare(Keyword::Column, false)?,
            source,
            stmt.pipe_section(Keyword::Returning, false)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};
    use crate::value::Value;
    use crate::vocab::{condition, raw};

    #[test]
    fn multi_row_insert() {
        let mut qb = InsertBuilder::new(Arc::new(MySql));
        qb.into_table("users")
            .unwrap()
            .columns(["name", "active"])
            .unwrap()
            .values([Value::from("alice"), Value::from(true)])
            .unwrap()
            .values([Value::from("o'brien"), Value::Null])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "INSERT INTO `users` (`name`, `active`) VALUES ('alice', 1), ('o''brien', NULL)"
        );
    }

    #[test]
    fn row_arity_is_checked() {
        let mut qb = InsertBuilder::new(Arc::new(MySql));
        qb.into_table("t").unwrap().columns(["a", "b"]).unwrap();
        let err = qb.values([1]).unwrap_err();
        assert!(err.is_invalid_argument());

        let mut qb = InsertBuilder::new(Arc::new(MySql));
        qb.into_table("t").unwrap().values([1, 2]).unwrap();
        assert!(qb.values([1, 2, 3]).is_err());
        assert!(qb.columns(["only"]).is_err());
        assert!(qb.values(Vec::<i32>::new()).is_err());
    }

    #[test]
    fn expressions_as_values() {
        let mut qb = InsertBuilder::new(Arc::new(Postgres));
        qb.into_table("events")
            .unwrap()
            .columns(["kind", "at"])
            .unwrap()
            .values([Operand::from("login"), raw("NOW()").into()])
            .unwrap()
            .returning(["id"])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"INSERT INTO "events" ("kind", "at") VALUES ('login', NOW()) RETURNING "id""#
        );
    }

    #[test]
    fn returning_unsupported_on_mysql() {
        let mut qb = InsertBuilder::new(Arc::new(MySql));
        qb.into_table("t")
            .unwrap()
            .values([1])
            .unwrap()
            .returning(["id"])
            .unwrap();
        assert!(qb.to_sql().unwrap_err().is_unsupported());
    }

    #[test]
    fn insert_select() {
        let mut source = SelectBuilder::new(Arc::new(Postgres));
        source
            .select(["name"])
            .unwrap()
            .from(["staging"])
            .unwrap()
            .and_where([condition("valid", "=", true).unwrap()])
            .unwrap();

        let mut qb = InsertBuilder::new(Arc::new(Postgres));
        qb.into_table("users")
            .unwrap()
            .columns(["name"])
            .unwrap()
            .select(&source)
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"INSERT INTO "users" ("name") SELECT "name" FROM "staging" WHERE ("valid" = TRUE)"#
        );
        assert!(qb.values(["x"]).is_err());
    }

    #[test]
    fn required_parts() {
        let mut qb = InsertBuilder::new(Arc::new(MySql));
        qb.columns(["a"]).unwrap().values([1]).unwrap();
        assert_eq!(
            qb.to_sql().unwrap_err(),
            SqlError::invalid_argument("INSERT INTO requires a table")
        );

        let mut qb = InsertBuilder::new(Arc::new(MySql));
        qb.into_table("t").unwrap();
        assert_eq!(
            qb.to_sql().unwrap_err(),
            SqlError::invalid_argument("VALUES requires at least one row")
        );
    }

    #[test]
    fn list_values_rejected() {
        let mut qb = InsertBuilder::new(Arc::new(MySql));
        let err = qb.values([Operand::from(vec![1, 2])]).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
