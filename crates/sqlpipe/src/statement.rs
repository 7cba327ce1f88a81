//! The section pipeline shared by every statement builder.
//!
//! A [`Statement`] owns a map of clause keyword to section node. Builders push
//! content into sections in any order; rendering walks the builder's fixed
//! pipeline, so the output clause order never depends on call order.

use crate::bindings::Bindings;
use crate::config::SqlConfig;
use crate::dialect::{Dialect, Feature, Fragment, Limit};
use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::{Child, Node, NodeKind};
use crate::value::Value;
use crate::vocab::Aliasable;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The statement a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    AlterTable,
    DropTable,
    Truncate,
}

impl StatementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => Keyword::Select.as_str(),
            StatementKind::Insert => Keyword::Insert.as_str(),
            StatementKind::Update => Keyword::Update.as_str(),
            StatementKind::Delete => Keyword::Delete.as_str(),
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::DropTable => "DROP TABLE",
            StatementKind::Truncate => Keyword::Truncate.as_str(),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildState {
    /// Sections are accumulating.
    #[default]
    Building,
    /// The pipeline has been rendered and cached.
    Rendered,
}

/// Rendered SQL together with the bindings collected alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub bindings: Bindings,
}

/// Section map, bindings and render configuration of one statement.
#[derive(Debug, Clone)]
pub struct Statement {
    kind: StatementKind,
    dialect: Arc<dyn Dialect>,
    config: Arc<SqlConfig>,
    sections: HashMap<Keyword, Node>,
    /// Optional syntax used so far, checked against the dialect at render.
    features: Vec<Feature>,
    bindings: Bindings,
    state: BuildState,
    cache: Option<String>,
}

impl Statement {
    pub fn new(kind: StatementKind, dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            kind,
            dialect,
            config,
            sections: HashMap::new(),
            features: Vec::new(),
            bindings: Bindings::new(),
            state: BuildState::Building,
            cache: None,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Swap the dialect. Only output rendered afterwards is affected.
    pub fn set_dialect(&mut self, dialect: Arc<dyn Dialect>) {
        self.invalidate();
        self.dialect = dialect;
    }

    fn invalidate(&mut self) {
        self.state = BuildState::Building;
        self.cache = None;
    }

    // ==================== Sections ====================

    /// The section for `key`, created empty on first access.
    pub fn section(&mut self, key: Keyword) -> &mut Node {
        self.invalidate();
        let kind = self.kind;
        self.sections.entry(key).or_insert_with(|| {
            tracing::trace!(target: "sqlpipe.section", statement = %kind, section = %key, "created section");
            Node::new(NodeKind::Group)
        })
    }

    /// The section for `key` if it was ever created.
    pub fn peek(&self, key: Keyword) -> Option<&Node> {
        self.sections.get(&key)
    }

    /// `true` when the section exists and would render text.
    pub fn has_content(&self, key: Keyword) -> bool {
        self.peek(key).is_some_and(|n| !n.is_empty())
    }

    /// Render `key` prefixed by its own keyword.
    pub fn pipe_section(&self, key: Keyword, required: bool) -> SqlResult<Node> {
        self.pipe_section_as(key, Node::keyword(key), required)
    }

    /// Render `key` prefixed by `prefix`.
    ///
    /// An empty optional section yields an empty node that its parent skips;
    /// an empty required section fails.
    pub fn pipe_section_as(&self, key: Keyword, prefix: Node, required: bool) -> SqlResult<Node> {
        match self.peek(key) {
            Some(section) if !section.is_empty() => Ok(Node::new(NodeKind::Section)
                .with(prefix)
                .with(section)),
            _ if required => Err(SqlError::invalid_argument(required_message(self.kind, key))),
            _ => Ok(Node::new(NodeKind::Section)),
        }
    }

    /// Render `key` with no prefix, for sections that carry their own keywords.
    pub fn pipe_bare(&self, key: Keyword, required: bool) -> SqlResult<Node> {
        match self.peek(key) {
            Some(section) if !section.is_empty() => {
                Ok(Node::new(NodeKind::Section).with(section))
            }
            _ if required => Err(SqlError::invalid_argument(required_message(self.kind, key))),
            _ => Ok(Node::new(NodeKind::Section)),
        }
    }

    // ==================== Features ====================

    /// Record that the statement now uses `feature`.
    pub fn require(&mut self, feature: Feature) {
        self.invalidate();
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
    }

    /// Forget a previously recorded feature.
    pub fn release(&mut self, feature: Feature) {
        self.invalidate();
        self.features.retain(|f| *f != feature);
    }

    /// Record every feature used by `other`, e.g. a nested subquery.
    pub fn absorb_features(&mut self, other: &Statement) {
        for feature in &other.features {
            self.require(*feature);
        }
    }

    /// Fail with [`SqlError::Unsupported`] for the first recorded feature
    /// the dialect lacks.
    pub fn check_features(&self) -> SqlResult<()> {
        self.features
            .iter()
            .try_for_each(|feature| self.dialect.require(*feature))
    }

    // ==================== Aggregation helpers ====================

    /// Append one condition group to `key`.
    ///
    /// The group's own conditions are AND-joined and parenthesized; `connective`
    /// is placed before it unless the section is still empty.
    pub fn push_conditions(
        &mut self,
        key: Keyword,
        connective: Keyword,
        conditions: impl IntoIterator<Item = Node>,
    ) -> SqlResult<()> {
        let conditions: Vec<Node> = conditions.into_iter().filter(|c| !c.is_empty()).collect();
        if conditions.is_empty() {
            return Err(SqlError::invalid_argument(format!(
                "{key} requires at least one condition"
            )));
        }
        let group = Node::new(NodeKind::Group)
            .with_all(conditions)
            .separated(" AND ")
            .wrapped("(", ")");
        let section = self.section(key);
        if !section.is_empty() {
            section.push(connective);
        }
        section.push(group);
        Ok(())
    }

    /// Append comma-separated aliasable items to `key`.
    pub fn push_list<I>(&mut self, key: Keyword, items: I) -> SqlResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Aliasable>,
    {
        let nodes = aliasable_list(key, items)?;
        self.section(key).join(", ").append(nodes);
        Ok(())
    }

    /// Edit the deferred LIMIT/OFFSET fragment held by the LIMIT section.
    pub fn update_limit(&mut self, edit: impl FnOnce(&mut Limit)) {
        let children = self.section(Keyword::Limit).children_mut();
        if !matches!(children.first(), Some(Child::Fragment(Fragment::Limit(_)))) {
            children.clear();
            children.push(Child::Fragment(Fragment::Limit(Limit::default())));
        }
        if let Some(Child::Fragment(Fragment::Limit(limit))) = children.first_mut() {
            edit(limit);
        }
    }

    /// The current LIMIT/OFFSET, if any was set.
    pub fn limit(&self) -> Option<Limit> {
        match self.peek(Keyword::Limit)?.children().first() {
            Some(Child::Fragment(Fragment::Limit(limit))) if !limit.is_empty() => Some(*limit),
            _ => None,
        }
    }

    // ==================== Bindings ====================

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> SqlResult<()> {
        self.invalidate();
        self.bindings.bind(name, value)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        self.invalidate();
        &mut self.bindings
    }

    // ==================== Rendering ====================

    /// Render a pipeline node with the current dialect.
    pub fn render(&self, pipeline: &Node) -> String {
        pipeline.render(self.dialect())
    }

    /// The cached SQL of the last [`Statement::commit`], if still valid.
    pub fn cached(&self) -> Option<&str> {
        match self.state {
            BuildState::Rendered => self.cache.as_deref(),
            BuildState::Building => None,
        }
    }

    /// Record `sql` as the rendered form, emitting the render event.
    pub fn commit(&mut self, sql: String) -> String {
        if self.config.log_sql {
            let logged = truncate_for_log(&sql, self.config.max_logged_sql_length);
            tracing::debug!(
                target: "sqlpipe.sql",
                dialect = self.dialect.name(),
                statement = %self.kind,
                bindings = self.bindings.len(),
                sql = %logged,
                "rendered statement"
            );
        }
        self.state = BuildState::Rendered;
        self.cache = Some(sql.clone());
        sql
    }

    /// Drop every section and binding.
    pub fn reset(&mut self) {
        self.sections.clear();
        self.features.clear();
        self.bindings.clear();
        self.invalidate();
    }
}

/// Error text for an empty required section.
fn required_message(kind: StatementKind, key: Keyword) -> String {
    match key {
        Keyword::Select => "SELECT requires at least one column".to_string(),
        Keyword::From => "FROM requires at least one table".to_string(),
        Keyword::Set => "SET requires at least one assignment".to_string(),
        Keyword::Values => "VALUES requires at least one row".to_string(),
        Keyword::InsertInto | Keyword::Update | Keyword::DeleteFrom => {
            format!("{key} requires a table")
        }
        Keyword::Table => format!("{kind} requires a table"),
        Keyword::Alter => "ALTER TABLE requires at least one action".to_string(),
        _ => format!("{key} requires content"),
    }
}

/// Normalize aliasable items into nodes, rejecting empty lists and blank names.
pub(crate) fn aliasable_list<I>(key: Keyword, items: I) -> SqlResult<Vec<Node>>
where
    I: IntoIterator,
    I::Item: Into<Aliasable>,
{
    let items: Vec<Aliasable> = items.into_iter().map(Into::into).collect();
    if items.is_empty() {
        return Err(SqlError::invalid_argument(match key {
            Keyword::Select => "SELECT requires at least one column".to_string(),
            Keyword::From => "FROM requires at least one table".to_string(),
            _ => format!("{key} requires at least one item"),
        }));
    }
    if items.iter().any(Aliasable::is_blank) {
        return Err(SqlError::invalid_argument(format!(
            "{key} items cannot be blank"
        )));
    }
    Ok(items.into_iter().map(Aliasable::into_node).collect())
}

/// Cut `sql` to `max_bytes` on a char boundary, marking the cut.
pub(crate) fn truncate_for_log(sql: &str, max_bytes: Option<usize>) -> String {
    match max_bytes {
        Some(max) if sql.len() > max => {
            let mut end = max;
            while end > 0 && !sql.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &sql[..end])
        }
        _ => sql.to_string(),
    }
}

/// Shared surface of every statement builder.
///
/// Implementors supply access to their [`Statement`] and a pipeline; rendering,
/// caching, bindings and reset come for free.
pub trait StatementBuilder {
    fn statement(&self) -> &Statement;

    fn statement_mut(&mut self) -> &mut Statement;

    /// The fixed, statement-specific sequence of piped sections.
    fn pipeline(&self) -> SqlResult<Node>;

    /// Reject a rendered statement before it is handed out.
    fn check(&self, _sql: &str) -> SqlResult<()> {
        Ok(())
    }

    /// Render without touching the build state.
    fn to_sql(&self) -> SqlResult<String> {
        if let Some(sql) = self.statement().cached() {
            return Ok(sql.to_string());
        }
        let sql = self.statement().render(&self.pipeline()?);
        self.check(&sql)?;
        Ok(sql)
    }

    /// Render, cache and log the statement.
    fn build(&mut self) -> SqlResult<BuiltQuery> {
        let sql = match self.statement().cached() {
            Some(sql) => sql.to_string(),
            None => {
                let sql = self.to_sql()?;
                self.statement_mut().commit(sql)
            }
        };
        Ok(BuiltQuery {
            sql,
            bindings: self.statement().bindings().clone(),
        })
    }

    fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> SqlResult<&mut Self>
    where
        Self: Sized,
    {
        self.statement_mut().bind(name, value)?;
        Ok(self)
    }

    fn set_dialect(&mut self, dialect: Arc<dyn Dialect>) -> &mut Self
    where
        Self: Sized,
    {
        self.statement_mut().set_dialect(dialect);
        self
    }

    fn bindings(&self) -> &Bindings {
        self.statement().bindings()
    }

    fn state(&self) -> BuildState {
        self.statement().state()
    }

    /// Return to an empty, building state.
    fn reset(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.statement_mut().reset();
        self
    }
}

/// Join sections of a pipeline with single spaces.
pub(crate) fn pipe(sections: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Pipe).with_all(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};
    use crate::vocab::{condition, raw};

    fn statement() -> Statement {
        Statement::new(
            StatementKind::Select,
            Arc::new(MySql),
            Arc::new(SqlConfig::default()),
        )
    }

    #[test]
    fn sections_are_created_lazily_and_reused() {
        let mut stmt = statement();
        assert!(stmt.peek(Keyword::From).is_none());
        stmt.section(Keyword::From).push("a");
        stmt.section(Keyword::From).push("b");
        assert_eq!(stmt.peek(Keyword::From).map(Node::len), Some(2));
        assert_eq!(stmt.peek(Keyword::From).map(Node::kind), Some(NodeKind::Group));
    }

    #[test]
    fn optional_empty_section_vanishes() {
        let mut stmt = statement();
        stmt.section(Keyword::Where);
        let node = stmt.pipe_section(Keyword::Where, false).unwrap();
        assert!(node.is_empty());
        assert_eq!(stmt.render(&node), "");
    }

    #[test]
    fn required_empty_section_fails() {
        let stmt = statement();
        let err = stmt.pipe_section(Keyword::From, true).unwrap_err();
        assert_eq!(
            err,
            SqlError::invalid_argument("FROM requires at least one table")
        );
    }

    #[test]
    fn section_is_prefixed_by_keyword() {
        let mut stmt = statement();
        stmt.push_list(Keyword::From, ["users", "orders"]).unwrap();
        let node = stmt.pipe_section(Keyword::From, true).unwrap();
        assert_eq!(stmt.render(&node), "FROM `users`, `orders`");
    }

    #[test]
    fn condition_groups_use_connectives() {
        let mut stmt = statement();
        stmt.push_conditions(Keyword::Where, Keyword::And, [raw("a = 1"), raw("b = 2")])
            .unwrap();
        stmt.push_conditions(Keyword::Where, Keyword::Or, [condition("c", "=", 3).unwrap()])
            .unwrap();
        let node = stmt.pipe_section(Keyword::Where, false).unwrap();
        assert_eq!(stmt.render(&node), "WHERE (a = 1 AND b = 2) OR (`c` = 3)");
    }

    #[test]
    fn empty_condition_group_rejected() {
        let mut stmt = statement();
        let err = stmt
            .push_conditions(Keyword::Where, Keyword::And, Vec::new())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn aliasable_list_rejects_empty_and_blank() {
        let mut stmt = statement();
        assert!(stmt.push_list(Keyword::From, Vec::<&str>::new()).is_err());
        assert!(stmt.push_list(Keyword::From, [""]).is_err());
    }

    #[test]
    fn limit_fragment_is_updated_in_place() {
        let mut stmt = statement();
        stmt.update_limit(|l| l.limit = Some(10));
        stmt.update_limit(|l| l.offset = Some(20));
        assert_eq!(
            stmt.limit(),
            Some(Limit {
                limit: Some(10),
                offset: Some(20)
            })
        );
        let node = stmt.pipe_bare(Keyword::Limit, false).unwrap();
        assert_eq!(stmt.render(&node), "LIMIT 20, 10");
    }

    #[test]
    fn pipe_joins_with_single_spaces() {
        let mut stmt = statement();
        stmt.push_list(Keyword::Select, ["id"]).unwrap();
        let node = pipe([
            stmt.pipe_section(Keyword::Select, true).unwrap(),
            stmt.pipe_section(Keyword::From, false).unwrap(),
            stmt.pipe_section(Keyword::Where, false).unwrap(),
        ]);
        assert_eq!(stmt.render(&node), "SELECT `id`");
    }

    #[test]
    fn dialect_swap_changes_later_output_only() {
        let mut stmt = statement();
        stmt.push_list(Keyword::Select, ["id"]).unwrap();
        let node = stmt.pipe_section(Keyword::Select, true).unwrap();
        let before = stmt.render(&node);
        stmt.set_dialect(Arc::new(Postgres));
        let after = stmt.render(&node);
        assert_eq!(before, "SELECT `id`");
        assert_eq!(after, r#"SELECT "id""#);
    }

    #[test]
    fn commit_caches_until_mutation() {
        let mut stmt = statement();
        stmt.commit("SELECT 1".to_string());
        assert_eq!(stmt.state(), BuildState::Rendered);
        assert_eq!(stmt.cached(), Some("SELECT 1"));

        stmt.bind("id", 1).unwrap();
        assert_eq!(stmt.state(), BuildState::Building);
        assert_eq!(stmt.cached(), None);
    }

    #[test]
    fn reset_clears_sections_and_bindings() {
        let mut stmt = statement();
        stmt.push_list(Keyword::From, ["users"]).unwrap();
        stmt.bind("id", 1).unwrap();
        stmt.reset();
        assert!(stmt.peek(Keyword::From).is_none());
        assert!(stmt.bindings().is_empty());
    }

    #[test]
    fn recorded_features_are_checked_against_dialect() {
        let mut stmt = statement();
        stmt.require(Feature::Cte);
        assert!(stmt.check_features().is_ok());

        stmt.require(Feature::Returning);
        let err = stmt.check_features().unwrap_err();
        assert!(err.is_unsupported());

        stmt.release(Feature::Returning);
        assert!(stmt.check_features().is_ok());
        stmt.set_dialect(Arc::new(Postgres));
        stmt.require(Feature::Returning);
        assert!(stmt.check_features().is_ok());
    }

    #[test]
    fn log_truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("SELECT 1", Some(100)), "SELECT 1");
        assert_eq!(truncate_for_log("SELECT 'é'", Some(9)), "SELECT '...");
        assert_eq!(truncate_for_log("SELECT 1", None), "SELECT 1");
    }
}
