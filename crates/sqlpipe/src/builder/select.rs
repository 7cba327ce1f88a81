//! SELECT statement builder.

use super::{column_names, ordered, Direction, JoinKind};
use crate::config::SqlConfig;
use crate::dialect::{Dialect, Feature, Fragment, LockMode};
use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::{Node, NodeKind};
use crate::statement::{pipe, Statement, StatementBuilder, StatementKind};
use crate::vocab::{all_of, identifier, parenthesize, Aliasable};
use std::sync::Arc;

/// SELECT builder.
///
/// Clauses may be added in any order; the rendered statement always follows
/// DESCRIBE, EXPLAIN, WITH, SELECT, FROM, JOIN, WHERE, GROUP BY, HAVING,
/// ORDER BY, LIMIT, WINDOW, UNION, LOCK.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    stmt: Statement,
}

impl SelectBuilder {
    /// Create a SELECT builder with the default configuration.
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Select, dialect, config),
        }
    }

    // ==================== Prefixes ====================

    /// Prefix the statement with DESCRIBE.
    pub fn describe(&mut self) -> &mut Self {
        self.stmt
            .section(Keyword::Describe)
            .clear()
            .push(Keyword::Describe);
        self
    }

    /// Prefix the statement with EXPLAIN [ANALYZE].
    pub fn explain(&mut self, analyze: bool) -> &mut Self {
        let section = self.stmt.section(Keyword::Explain);
        section.clear().push(Keyword::Explain);
        if analyze {
            section.push(Keyword::Analyze);
        }
        self
    }

    /// Add a common table expression: `WITH <name> AS (<query>)`.
    pub fn with(&mut self, name: &str, query: &SelectBuilder) -> SqlResult<&mut Self> {
        if name.trim().is_empty() {
            return Err(SqlError::invalid_argument("WITH requires a name"));
        }
        let cte = Node::default()
            .with(identifier(name))
            .with(Keyword::As)
            .with(query.as_subquery()?);
        self.stmt.absorb_features(&query.stmt);
        self.stmt.require(Feature::Cte);
        self.stmt.section(Keyword::With).join(", ").push(cte);
        Ok(self)
    }

    /// Like [`SelectBuilder::with`], rendering `WITH RECURSIVE`.
    pub fn with_recursive(&mut self, name: &str, query: &SelectBuilder) -> SqlResult<&mut Self> {
        self.with(name, query)?;
        self.stmt
            .section(Keyword::Recursive)
            .clear()
            .push(Keyword::Recursive);
        Ok(self)
    }

    // ==================== SELECT / FROM ====================

    /// Append SELECT columns.
    ///
    /// Each item is a column name, a node, or an `(alias, source)` pair.
    pub fn select<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Aliasable>,
    {
        self.stmt.push_list(Keyword::Select, columns)?;
        Ok(self)
    }

    /// Render `SELECT DISTINCT`.
    pub fn distinct(&mut self) -> &mut Self {
        self.stmt
            .section(Keyword::Distinct)
            .clear()
            .push(Keyword::Distinct);
        self
    }

    /// Append FROM tables.
    pub fn from<I>(&mut self, tables: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Aliasable>,
    {
        self.stmt.push_list(Keyword::From, tables)?;
        Ok(self)
    }

    // ==================== JOIN ====================

    /// Append `<kind> <table> ON (<conditions>)`.
    ///
    /// Conditions are AND-joined. CROSS JOIN takes none; every other kind
    /// needs at least one.
    pub fn join<I>(
        &mut self,
        kind: JoinKind,
        table: impl Into<Aliasable>,
        on: I,
    ) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut clause = self.join_head(kind, table.into())?;
        let conditions: Vec<Node> = on.into_iter().filter(|c| !c.is_empty()).collect();
        match (kind, conditions.is_empty()) {
            (JoinKind::Cross, true) => {}
            (JoinKind::Cross, false) => {
                return Err(SqlError::invalid_argument(
                    "CROSS JOIN does not take ON conditions",
                ));
            }
            (_, true) => {
                return Err(SqlError::invalid_argument(format!(
                    "{} requires at least one ON condition",
                    kind.keyword()
                )));
            }
            (_, false) => {
                clause.push(Keyword::On).push(all_of(conditions));
            }
        }
        self.push_join(kind, clause);
        Ok(self)
    }

    /// Append `<kind> <table> USING (<columns>)`.
    pub fn join_using<I>(
        &mut self,
        kind: JoinKind,
        table: impl Into<Aliasable>,
        columns: I,
    ) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if kind == JoinKind::Cross {
            return Err(SqlError::invalid_argument("CROSS JOIN does not take USING"));
        }
        let mut clause = self.join_head(kind, table.into())?;
        let columns = column_names("USING", columns)?;
        clause.push(Keyword::Using).push(
            Node::new(NodeKind::List)
                .with_all(columns)
                .separated(", ")
                .wrapped("(", ")"),
        );
        self.push_join(kind, clause);
        Ok(self)
    }

    fn push_join(&mut self, kind: JoinKind, clause: Node) {
        if kind == JoinKind::Full {
            self.stmt.require(Feature::FullJoin);
        }
        self.stmt.section(Keyword::Join).push(clause);
    }

    fn join_head(&self, kind: JoinKind, table: Aliasable) -> SqlResult<Node> {
        if table.is_blank() {
            return Err(SqlError::invalid_argument(format!(
                "{} requires a table",
                kind.keyword()
            )));
        }
        Ok(Node::new(NodeKind::Group)
            .with(kind.keyword())
            .with(table.into_node()))
    }

    pub fn inner_join<I>(&mut self, table: impl Into<Aliasable>, on: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join<I>(&mut self, table: impl Into<Aliasable>, on: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join<I>(&mut self, table: impl Into<Aliasable>, on: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.join(JoinKind::Right, table, on)
    }

    /// FULL OUTER JOIN. Rejected at render by dialects without it.
    pub fn full_join<I>(&mut self, table: impl Into<Aliasable>, on: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.join(JoinKind::Full, table, on)
    }

    pub fn cross_join(&mut self, table: impl Into<Aliasable>) -> SqlResult<&mut Self> {
        self.join(JoinKind::Cross, table, Vec::new())
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    /// Add a WHERE group, AND-ed with earlier groups.
    pub fn and_where<I>(&mut self, conditions: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.stmt
            .push_conditions(Keyword::Where, Keyword::And, conditions)?;
        Ok(self)
    }

    /// Add a WHERE group, OR-ed with earlier groups.
    pub fn or_where<I>(&mut self, conditions: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.stmt
            .push_conditions(Keyword::Where, Keyword::Or, conditions)?;
        Ok(self)
    }

    pub fn group_by<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Aliasable>,
    {
        self.stmt.push_list(Keyword::GroupBy, columns)?;
        Ok(self)
    }

    /// Add a HAVING group, AND-ed with earlier groups.
    pub fn and_having<I>(&mut self, conditions: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.stmt
            .push_conditions(Keyword::Having, Keyword::And, conditions)?;
        Ok(self)
    }

    /// Add a HAVING group, OR-ed with earlier groups.
    pub fn or_having<I>(&mut self, conditions: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = Node>,
    {
        self.stmt
            .push_conditions(Keyword::Having, Keyword::Or, conditions)?;
        Ok(self)
    }

    // ==================== ORDER BY / LIMIT ====================

    pub fn order_by<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Aliasable>,
    {
        self.stmt.push_list(Keyword::OrderBy, columns)?;
        Ok(self)
    }

    pub fn order_by_asc(&mut self, column: impl Into<Aliasable>) -> SqlResult<&mut Self> {
        self.order_by_direction(column, Direction::Asc)
    }

    pub fn order_by_desc(&mut self, column: impl Into<Aliasable>) -> SqlResult<&mut Self> {
        self.order_by_direction(column, Direction::Desc)
    }

    fn order_by_direction(
        &mut self,
        column: impl Into<Aliasable>,
        direction: Direction,
    ) -> SqlResult<&mut Self> {
        let node = ordered(column, direction)?;
        self.stmt.section(Keyword::OrderBy).join(", ").push(node);
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.stmt.update_limit(|l| l.limit = Some(limit));
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.stmt.update_limit(|l| l.offset = Some(offset));
        self
    }

    /// LIMIT/OFFSET for a 1-based page.
    pub fn paginate(&mut self, page: u64, per_page: u64) -> SqlResult<&mut Self> {
        if page == 0 {
            return Err(SqlError::invalid_argument("page must be >= 1"));
        }
        if per_page == 0 {
            return Err(SqlError::invalid_argument("per_page must be >= 1"));
        }
        let offset = (page - 1).saturating_mul(per_page);
        self.stmt.update_limit(|l| {
            l.limit = Some(per_page);
            l.offset = Some(offset);
        });
        Ok(self)
    }

    // ==================== WINDOW / UNION / LOCK ====================

    /// Add a named window: `<name> AS (<definition>)`.
    pub fn window(&mut self, name: &str, definition: Node) -> SqlResult<&mut Self> {
        if name.trim().is_empty() {
            return Err(SqlError::invalid_argument("WINDOW requires a name"));
        }
        if definition.is_empty() {
            return Err(SqlError::invalid_argument("WINDOW requires a definition"));
        }
        let window = Node::default()
            .with(identifier(name))
            .with(Keyword::As)
            .with(parenthesize(definition));
        self.stmt.section(Keyword::Window).join(", ").push(window);
        Ok(self)
    }

    pub fn union(&mut self, other: &SelectBuilder) -> SqlResult<&mut Self> {
        self.push_union(Keyword::Union, other)
    }

    pub fn union_all(&mut self, other: &SelectBuilder) -> SqlResult<&mut Self> {
        self.push_union(Keyword::UnionAll, other)
    }

    fn push_union(&mut self, keyword: Keyword, other: &SelectBuilder) -> SqlResult<&mut Self> {
        let query = other.pipeline()?;
        self.stmt.absorb_features(&other.stmt);
        self.stmt
            .section(Keyword::Union)
            .push(Node::default().with(keyword).with(query));
        Ok(self)
    }

    /// Add a row lock (`FOR UPDATE`, `FOR SHARE`), replacing any earlier one.
    pub fn lock(&mut self, mode: LockMode) -> &mut Self {
        self.stmt.require(Feature::RowLocking);
        self.stmt
            .section(Keyword::Lock)
            .clear()
            .push(Fragment::Lock(mode));
        self
    }

    // ==================== Composition ====================

    /// The statement as a parenthesized node, for FROM, IN or CTE use.
    ///
    /// The node carries no dialect: it is quoted by whichever statement
    /// renders it.
    pub fn as_subquery(&self) -> SqlResult<Node> {
        Ok(parenthesize(self.pipeline()?))
    }
}

impl StatementBuilder for SelectBuilder {
    fn statement(&self) -> &Statement {
        &self.stmt
    }

    fn statement_mut(&mut self) -> &mut Statement {
        &mut self.stmt
    }

    fn pipeline(&self) -> SqlResult<Node> {
        let stmt = &self.stmt;
        stmt.check_features()?;

        let with = if stmt.has_content(Keyword::Recursive) {
            Node::default().with(Keyword::With).with(Keyword::Recursive)
        } else {
            Node::keyword(Keyword::With)
        };
        let select = if stmt.has_content(Keyword::Distinct) {
            Node::default().with(Keyword::Select).with(Keyword::Distinct)
        } else {
            Node::keyword(Keyword::Select)
        };

        Ok(pipe([
            stmt.pipe_bare(Keyword::Describe, false)?,
            stmt.pipe_bare(Keyword::Explain, false)?,
            stmt.pipe_section_as(Keyword::With, with, false)?,
            stmt.pipe_section_as(Keyword::Select, select, true)?,
            stmt.pipe_section(Keyword::From, false)?,
            stmt.pipe_bare(Keyword::Join, false)?,
            stmt.pipe_section(Keyword::Where, false)?,
            stmt.pipe_section(Keyword::GroupBy, false)?,
            stmt.pipe_section(Keyword::Having, false)?,
            stmt.pipe_section(Keyword::OrderBy, false)?,
            stmt.pipe_bare(Keyword::Limit, false)?,
            stmt.pipe_section(Keyword::Window, false)?,
            stmt.pipe_bare(Keyword::Union, false)?,
            stmt.pipe_bare(Keyword::Lock, false)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres, Sqlite};
    use crate::vocab::{condition, count, on, raw};

    fn mysql() -> SelectBuilder {
        SelectBuilder::new(Arc::new(MySql))
    }

    #[test]
    fn end_to_end_select() {
        let mut qb = mysql();
        qb.select(["id", "name"])
            .unwrap()
            .from(["users"])
            .unwrap()
            .and_where([condition("active", "=", true).unwrap()])
            .unwrap()
            .order_by(["name"])
            .unwrap()
            .limit(10);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT `id`, `name` FROM `users` WHERE (`active` = 1) ORDER BY `name` LIMIT 10"
        );
    }

    #[test]
    fn clause_order_is_independent_of_call_order() {
        let mut a = mysql();
        a.limit(10)
            .order_by(["name"])
            .unwrap()
            .and_where([condition("active", "=", true).unwrap()])
            .unwrap()
            .from(["users"])
            .unwrap()
            .select(["id", "name"])
            .unwrap();

        let mut b = mysql();
        b.select(["id", "name"])
            .unwrap()
            .from(["users"])
            .unwrap()
            .and_where([condition("active", "=", true).unwrap()])
            .unwrap()
            .order_by(["name"])
            .unwrap()
            .limit(10);

        assert_eq!(a.to_sql().unwrap(), b.to_sql().unwrap());
    }

    #[test]
    fn select_is_required() {
        let mut qb = mysql();
        qb.from(["users"]).unwrap();
        let err = qb.to_sql().unwrap_err();
        assert_eq!(
            err,
            SqlError::invalid_argument("SELECT requires at least one column")
        );
    }

    #[test]
    fn from_without_tables_fails() {
        let err = mysql().from(Vec::<&str>::new()).unwrap_err();
        assert_eq!(
            err,
            SqlError::invalid_argument("FROM requires at least one table")
        );
    }

    #[test]
    fn aliased_columns_and_tables() {
        let mut qb = mysql();
        qb.select([Aliasable::from("u.id"), ("total", count("*")).into()])
            .unwrap()
            .from([("u", "users")])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT `u`.`id`, (COUNT(*)) AS `total` FROM `users` AS `u`"
        );
    }

    #[test]
    fn distinct_select() {
        let mut qb = mysql();
        qb.distinct().select(["city"]).unwrap().from(["users"]).unwrap();
        assert_eq!(qb.to_sql().unwrap(), "SELECT DISTINCT `city` FROM `users`");
    }

    #[test]
    fn where_groups_and_or() {
        let mut qb = mysql();
        qb.select(["*"])
            .unwrap()
            .from(["t"])
            .unwrap()
            .and_where([raw("c1")])
            .unwrap()
            .and_where([raw("c2")])
            .unwrap()
            .or_where([raw("c3"), raw("c4")])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM `t` WHERE (c1) AND (c2) OR (c3 AND c4)"
        );
    }

    #[test]
    fn joins_accumulate() {
        let mut qb = SelectBuilder::new(Arc::new(Postgres));
        qb.select(["u.id"])
            .unwrap()
            .from([("u", "users")])
            .unwrap()
            .inner_join(("o", "orders"), [on("o.user_id", "u.id")])
            .unwrap()
            .left_join(
                "profiles",
                [
                    on("profiles.user_id", "u.id"),
                    condition("profiles.visible", "=", true).unwrap(),
                ],
            )
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            concat!(
                r#"SELECT "u"."id" FROM "users" AS "u" "#,
                r#"INNER JOIN "orders" AS "o" ON ("o"."user_id" = "u"."id") "#,
                r#"LEFT JOIN "profiles" ON ("profiles"."user_id" = "u"."id" AND "profiles"."visible" = TRUE)"#
            )
        );
    }

    #[test]
    fn join_validation() {
        let mut qb = mysql();
        assert!(qb.inner_join("orders", Vec::new()).unwrap_err().is_invalid_argument());
        assert!(qb
            .join(JoinKind::Cross, "orders", [raw("1 = 1")])
            .unwrap_err()
            .is_invalid_argument());
        assert!(qb
            .join_using(JoinKind::Inner, "orders", Vec::<&str>::new())
            .unwrap_err()
            .is_invalid_argument());
        assert!(qb.inner_join("", [raw("x")]).is_err());
    }

    #[test]
    fn join_using_and_cross() {
        let mut qb = mysql();
        qb.select(["*"])
            .unwrap()
            .from(["a"])
            .unwrap()
            .join_using(JoinKind::Left, "b", ["id", "tenant_id"])
            .unwrap()
            .cross_join("c")
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM `a` LEFT JOIN `b` USING (`id`, `tenant_id`) CROSS JOIN `c`"
        );
    }

    #[test]
    fn full_join_needs_dialect_support() {
        let mut qb = mysql();
        qb.select(["*"])
            .unwrap()
            .from(["a"])
            .unwrap()
            .full_join("b", [on("a.id", "b.id")])
            .unwrap();
        assert!(qb.to_sql().unwrap_err().is_unsupported());

        qb.set_dialect(Arc::new(Postgres));
        assert!(qb.to_sql().unwrap().contains("FULL OUTER JOIN"));
    }

    #[test]
    fn group_by_having() {
        let mut qb = mysql();
        qb.select([Aliasable::from("status"), ("n", count("*")).into()])
            .unwrap()
            .from(["orders"])
            .unwrap()
            .group_by(["status"])
            .unwrap()
            .and_having([condition(count("*"), ">", 5).unwrap()])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT `status`, (COUNT(*)) AS `n` FROM `orders` GROUP BY `status` HAVING ((COUNT(*)) > 5)"
        );
    }

    #[test]
    fn order_directions() {
        let mut qb = mysql();
        qb.select(["*"])
            .unwrap()
            .from(["t"])
            .unwrap()
            .order_by_desc("created_at")
            .unwrap()
            .order_by_asc("id")
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM `t` ORDER BY `created_at` DESC, `id` ASC"
        );
        assert!(qb.order_by_asc(" ").is_err());
    }

    #[test]
    fn quote_in_column_name_cannot_close_identifier() {
        let mut qb = SelectBuilder::new(Arc::new(Postgres));
        qb.select(["id"])
            .unwrap()
            .from(["users"])
            .unwrap()
            .order_by([r#""x" FROM secrets; --"#])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"SELECT "id" FROM "users" ORDER BY """x"" FROM secrets; --""#
        );

        let mut qb = mysql();
        qb.select(["`a` UNION SELECT pw FROM u -- `"])
            .unwrap()
            .from(["t"])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT ```a`` UNION SELECT pw FROM u -- ``` FROM `t`"
        );
    }

    #[test]
    fn limit_offset_per_dialect() {
        let mut qb = mysql();
        qb.select(["*"]).unwrap().from(["t"]).unwrap().paginate(3, 20).unwrap();
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `t` LIMIT 40, 20");

        qb.set_dialect(Arc::new(Sqlite));
        assert_eq!(qb.to_sql().unwrap(), r#"SELECT * FROM "t" LIMIT 20 OFFSET 40"#);

        assert!(qb.paginate(0, 10).is_err());
        assert!(qb.paginate(1, 0).is_err());
    }

    #[test]
    fn offset_alone() {
        let mut qb = SelectBuilder::new(Arc::new(Postgres));
        qb.select(["*"]).unwrap().from(["t"]).unwrap().offset(5);
        assert_eq!(qb.to_sql().unwrap(), r#"SELECT * FROM "t" OFFSET 5"#);
    }

    #[test]
    fn subquery_in_from_and_condition() {
        let mut inner = mysql();
        inner
            .select(["user_id"])
            .unwrap()
            .from(["orders"])
            .unwrap();

        let mut qb = SelectBuilder::new(Arc::new(Postgres));
        qb.select(["*"])
            .unwrap()
            .from(["users"])
            .unwrap()
            .and_where([condition("id", "IN", inner.as_subquery().unwrap()).unwrap()])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"SELECT * FROM "users" WHERE ("id" IN (SELECT "user_id" FROM "orders"))"#
        );
    }

    #[test]
    fn cte_union_window_lock() {
        let mut recent = mysql();
        recent
            .select(["id"])
            .unwrap()
            .from(["orders"])
            .unwrap()
            .and_where([raw("created_at > NOW() - INTERVAL 1 DAY")])
            .unwrap();

        let mut archived = mysql();
        archived.select(["id"]).unwrap().from(["archive"]).unwrap();

        let mut qb = mysql();
        qb.with("recent", &recent)
            .unwrap()
            .select(["id"])
            .unwrap()
            .from(["recent"])
            .unwrap()
            .window("w", raw("PARTITION BY id"))
            .unwrap()
            .union_all(&archived)
            .unwrap()
            .lock(LockMode::ForShare);

        assert_eq!(
            qb.to_sql().unwrap(),
            concat!(
                "WITH `recent` AS (SELECT `id` FROM `orders` WHERE (created_at > NOW() - INTERVAL 1 DAY)) ",
                "SELECT `id` FROM `recent` WINDOW `w` AS (PARTITION BY id) ",
                "UNION ALL SELECT `id` FROM `archive` LOCK IN SHARE MODE"
            )
        );
    }

    #[test]
    fn recursive_cte_and_explain() {
        let mut seed = SelectBuilder::new(Arc::new(Postgres));
        seed.select([raw("1")]).unwrap();

        let mut qb = SelectBuilder::new(Arc::new(Postgres));
        qb.explain(true)
            .with_recursive("n", &seed)
            .unwrap()
            .select(["*"])
            .unwrap()
            .from(["n"])
            .unwrap();
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"EXPLAIN ANALYZE WITH RECURSIVE "n" AS (SELECT 1) SELECT * FROM "n""#
        );
    }

    #[test]
    fn row_locks_rejected_on_sqlite() {
        let mut qb = SelectBuilder::new(Arc::new(Sqlite));
        qb.select(["*"]).unwrap().from(["t"]).unwrap().lock(LockMode::ForUpdate);
        assert!(qb.to_sql().unwrap_err().is_unsupported());
    }

    #[test]
    fn union_carries_nested_features() {
        let mut locked = SelectBuilder::new(Arc::new(Postgres));
        locked.select(["*"]).unwrap().from(["b"]).unwrap().lock(LockMode::ForUpdate);

        let mut qb = SelectBuilder::new(Arc::new(Sqlite));
        qb.select(["*"]).unwrap().from(["a"]).unwrap();
        qb.union(&locked).unwrap();
        assert!(qb.to_sql().unwrap_err().is_unsupported());
    }
}
