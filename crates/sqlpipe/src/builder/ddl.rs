//! DDL builders: CREATE TABLE, ALTER TABLE, DROP TABLE and TRUNCATE.

use super::{column_names, table_name};
use crate::config::{handle_dangerous_dml, SqlConfig};
use crate::dialect::{Dialect, Feature};
use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::{Child, Node, NodeKind};
use crate::statement::{pipe, Statement, StatementBuilder, StatementKind};
use crate::value::Value;
use crate::vocab::{identifier, raw};
use std::sync::Arc;

// ==================== Column / constraint definitions ====================

/// One column of a CREATE TABLE or ALTER TABLE ... ADD COLUMN.
///
/// ```ignore
/// let id = ColumnDef::new("id", "BIGINT").not_null().primary_key();
/// let created = ColumnDef::new("created_at", "TIMESTAMP").default_expr("CURRENT_TIMESTAMP");
/// ```
#[derive(Debug, Clone)]
pub struct ColumnDef {
    name: String,
    sql_type: String,
    not_null: bool,
    default: Option<Node>,
    primary_key: bool,
    unique: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            default: None,
            primary_key: false,
            unique: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// DEFAULT with a literal quoted by the dialect.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(Node::new(NodeKind::Value).with(Child::Value(value.into())));
        self
    }

    /// DEFAULT with raw SQL, e.g. `CURRENT_TIMESTAMP`.
    pub fn default_expr(mut self, sql: impl Into<String>) -> Self {
        self.default = Some(raw(sql));
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn into_node(self) -> SqlResult<Node> {
        if self.name.trim().is_empty() {
            return Err(SqlError::invalid_argument("column name cannot be blank"));
        }
        if self.sql_type.trim().is_empty() {
            return Err(SqlError::invalid_argument(format!(
                "column {} requires a type",
                self.name
            )));
        }
        let mut node = Node::default();
        node.push(identifier(self.name)).push(raw(self.sql_type));
        if self.not_null {
            node.push(Keyword::NotNull);
        }
        if let Some(default) = self.default {
            node.push(Keyword::Default).push(default);
        }
        if self.primary_key {
            node.push(Keyword::PrimaryKey);
        }
        if self.unique {
            node.push(Keyword::Unique);
        }
        Ok(node)
    }
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        table: String,
        references: Vec<String>,
    },
}

impl TableConstraint {
    pub fn primary_key<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        TableConstraint::PrimaryKey(columns.into_iter().map(Into::into).collect())
    }

    pub fn unique<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        TableConstraint::Unique(columns.into_iter().map(Into::into).collect())
    }

    pub fn foreign_key<I, R>(columns: I, table: impl Into<String>, references: R) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        TableConstraint::ForeignKey {
            columns: columns.into_iter().map(Into::into).collect(),
            table: table.into(),
            references: references.into_iter().map(Into::into).collect(),
        }
    }

    /// Render, optionally as `CONSTRAINT <name> ...`.
    fn to_node(&self, name: Option<&str>) -> SqlResult<Node> {
        let mut node = Node::default();
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(SqlError::invalid_argument("constraint name cannot be blank"));
            }
            node.push(Keyword::Constraint).push(identifier(name));
        }
        match self {
            TableConstraint::PrimaryKey(columns) => {
                node.push(Keyword::PrimaryKey)
                    .push(column_list("PRIMARY KEY", columns)?);
            }
            TableConstraint::Unique(columns) => {
                node.push(Keyword::Unique)
                    .push(column_list("UNIQUE", columns)?);
            }
            TableConstraint::ForeignKey {
                columns,
                table,
                references,
            } => {
                if columns.len() != references.len() {
                    return Err(SqlError::invalid_argument(format!(
                        "FOREIGN KEY has {} columns but references {}",
                        columns.len(),
                        references.len()
                    )));
                }
                node.push(Keyword::ForeignKey)
                    .push(column_list("FOREIGN KEY", columns)?)
                    .push(Keyword::References)
                    .push(table_name("REFERENCES", table)?)
                    .push(column_list("REFERENCES", references)?);
            }
        }
        Ok(node)
    }
}

fn column_list(what: &str, columns: &[String]) -> SqlResult<Node> {
    Ok(Node::new(NodeKind::List)
        .with_all(column_names(what, columns.iter().cloned())?)
        .separated(", ")
        .wrapped("(", ")"))
}

/// Set a flag section to exactly `keyword`.
fn set_flag(stmt: &mut Statement, keyword: Keyword) {
    stmt.section(keyword).clear().push(keyword);
}

macro_rules! impl_statement_builder {
    ($builder:ty) => {
        impl StatementBuilder for $builder {
            fn statement(&self) -> &Statement {
                &self.stmt
            }

            fn statement_mut(&mut self) -> &mut Statement {
                &mut self.stmt
            }

            fn pipeline(&self) -> SqlResult<Node> {
                self.stmt.check_features()?;
                self.pipe_sections()
            }

            fn check(&self, sql: &str) -> SqlResult<()> {
                self.check_policy(sql)
            }
        }
    };
}

// ==================== CREATE TABLE ====================

/// `CREATE [TEMPORARY] TABLE [IF NOT EXISTS] <t> (<columns>, <constraints>)`
#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    stmt: Statement,
}

impl CreateTableBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::CreateTable, dialect, config),
        }
    }

    pub fn table(&mut self, table: &str) -> SqlResult<&mut Self> {
        let table = table_name("CREATE TABLE", table)?;
        self.stmt.section(Keyword::Table).clear().push(table);
        Ok(self)
    }

    pub fn temporary(&mut self) -> &mut Self {
        set_flag(&mut self.stmt, Keyword::Temporary);
        self
    }

    pub fn if_not_exists(&mut self) -> &mut Self {
        set_flag(&mut self.stmt, Keyword::IfNotExists);
        self.stmt.require(Feature::IfNotExists);
        self
    }

    pub fn column(&mut self, column: ColumnDef) -> SqlResult<&mut Self> {
        let node = column.into_node()?;
        self.stmt.section(Keyword::Column).join(", ").push(node);
        Ok(self)
    }

    pub fn primary_key<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.constraint(None, TableConstraint::primary_key(columns))
    }

    pub fn unique<I>(&mut self, columns: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.constraint(None, TableConstraint::unique(columns))
    }

    pub fn foreign_key<I, R>(
        &mut self,
        columns: I,
        table: &str,
        references: R,
    ) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.constraint(None, TableConstraint::foreign_key(columns, table, references))
    }

    /// Add a table constraint, optionally named.
    pub fn constraint(
        &mut self,
        name: Option<&str>,
        constraint: TableConstraint,
    ) -> SqlResult<&mut Self> {
        let node = constraint.to_node(name)?;
        self.stmt.section(Keyword::Constraint).join(", ").push(node);
        Ok(self)
    }

    fn pipe_sections(&self) -> SqlResult<Node> {
        let stmt = &self.stmt;
        if !stmt.has_content(Keyword::Column) {
            return Err(SqlError::invalid_argument(
                "CREATE TABLE requires at least one column",
            ));
        }
        let definitions = Node::new(NodeKind::List)
            .with(stmt.pipe_bare(Keyword::Column, true)?)
            .with(stmt.pipe_bare(Keyword::Constraint, false)?)
            .separated(", ")
            .wrapped("(", ")");

        Ok(pipe([
            Node::keyword(Keyword::Create),
            stmt.pipe_bare(Keyword::Temporary, false)?,
            Node::keyword(Keyword::Table),
            stmt.pipe_bare(Keyword::IfNotExists, false)?,
            stmt.pipe_bare(Keyword::Table, true)?,
            definitions,
        ]))
    }

    fn check_policy(&self, _sql: &str) -> SqlResult<()> {
        Ok(())
    }
}

impl_statement_builder!(CreateTableBuilder);

// ==================== ALTER TABLE ====================

/// `ALTER TABLE <t> <action>, <action>, ...`
#[derive(Debug, Clone)]
pub struct AlterTableBuilder {
    stmt: Statement,
}

impl AlterTableBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::AlterTable, dialect, config),
        }
    }

    pub fn table(&mut self, table: &str) -> SqlResult<&mut Self> {
        let table = table_name("ALTER TABLE", table)?;
        self.stmt.section(Keyword::Table).clear().push(table);
        Ok(self)
    }

    fn action(&mut self, action: Node) -> &mut Self {
        self.stmt.section(Keyword::Alter).join(", ").push(action);
        self
    }

    pub fn add_column(&mut self, column: ColumnDef) -> SqlResult<&mut Self> {
        let def = column.into_node()?;
        Ok(self.action(
            Node::default()
                .with(Keyword::Add)
                .with(Keyword::Column)
                .with(def),
        ))
    }

    pub fn drop_column(&mut self, name: &str) -> SqlResult<&mut Self> {
        let column = blank_checked("DROP COLUMN", name)?;
        Ok(self.action(
            Node::default()
                .with(Keyword::Drop)
                .with(Keyword::Column)
                .with(column),
        ))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> SqlResult<&mut Self> {
        let from = blank_checked("RENAME COLUMN", from)?;
        let to = blank_checked("RENAME COLUMN", to)?;
        Ok(self.action(
            Node::default()
                .with(Keyword::Rename)
                .with(Keyword::Column)
                .with(from)
                .with(Keyword::To)
                .with(to),
        ))
    }

    pub fn rename_to(&mut self, table: &str) -> SqlResult<&mut Self> {
        let table = table_name("RENAME TO", table)?;
        Ok(self.action(
            Node::default()
                .with(Keyword::Rename)
                .with(Keyword::To)
                .with(table),
        ))
    }

    pub fn add_constraint(
        &mut self,
        name: &str,
        constraint: TableConstraint,
    ) -> SqlResult<&mut Self> {
        let node = constraint.to_node(Some(name))?;
        Ok(self.action(Node::default().with(Keyword::Add).with(node)))
    }

    pub fn drop_constraint(&mut self, name: &str) -> SqlResult<&mut Self> {
        let name = blank_checked("DROP CONSTRAINT", name)?;
        Ok(self.action(
            Node::default()
                .with(Keyword::Drop)
                .with(Keyword::Constraint)
                .with(name),
        ))
    }

    fn pipe_sections(&self) -> SqlResult<Node> {
        let stmt = &self.stmt;
        Ok(pipe([
            Node::default().with(Keyword::Alter).with(Keyword::Table),
            stmt.pipe_bare(Keyword::Table, true)?,
            stmt.pipe_bare(Keyword::Alter, true)?,
        ]))
    }

    fn check_policy(&self, _sql: &str) -> SqlResult<()> {
        Ok(())
    }
}

impl_statement_builder!(AlterTableBuilder);

fn blank_checked(what: &str, name: &str) -> SqlResult<Node> {
    if name.trim().is_empty() {
        return Err(SqlError::invalid_argument(format!(
            "{what} requires a name"
        )));
    }
    Ok(identifier(name))
}

// ==================== DROP TABLE ====================

/// `DROP TABLE [IF EXISTS] <t>, ... [CASCADE | RESTRICT]`
#[derive(Debug, Clone)]
pub struct DropTableBuilder {
    stmt: Statement,
}

impl DropTableBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::DropTable, dialect, config),
        }
    }

    pub fn tables<I>(&mut self, tables: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tables: Vec<String> = tables.into_iter().map(Into::into).collect();
        if tables.is_empty() {
            return Err(SqlError::invalid_argument(
                "DROP TABLE requires at least one table",
            ));
        }
        let tables = tables
            .iter()
            .map(|t| table_name("DROP TABLE", t))
            .collect::<SqlResult<Vec<Node>>>()?;
        self.stmt.section(Keyword::Table).join(", ").append(tables);
        Ok(self)
    }

    pub fn if_exists(&mut self) -> &mut Self {
        set_flag(&mut self.stmt, Keyword::IfExists);
        self
    }

    /// Append CASCADE, replacing RESTRICT.
    pub fn cascade(&mut self) -> &mut Self {
        self.stmt.require(Feature::DropCascade);
        self.stmt
            .section(Keyword::Cascade)
            .clear()
            .push(Keyword::Cascade);
        self
    }

    /// Append RESTRICT, replacing CASCADE.
    pub fn restrict(&mut self) -> &mut Self {
        self.stmt.release(Feature::DropCascade);
        self.stmt
            .section(Keyword::Cascade)
            .clear()
            .push(Keyword::Restrict);
        self
    }

    fn pipe_sections(&self) -> SqlResult<Node> {
        let stmt = &self.stmt;
        Ok(pipe([
            Node::default().with(Keyword::Drop).with(Keyword::Table),
            stmt.pipe_bare(Keyword::IfExists, false)?,
            stmt.pipe_bare(Keyword::Table, true)?,
            stmt.pipe_bare(Keyword::Cascade, false)?,
        ]))
    }

    fn check_policy(&self, sql: &str) -> SqlResult<()> {
        handle_dangerous_dml(self.stmt.config().drop_table, "DROP TABLE", sql)
    }
}

impl_statement_builder!(DropTableBuilder);

// ==================== TRUNCATE ====================

/// `TRUNCATE TABLE <t>`
#[derive(Debug, Clone)]
pub struct TruncateBuilder {
    stmt: Statement,
}

impl TruncateBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, Arc::new(SqlConfig::default()))
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: Arc<SqlConfig>) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Truncate, dialect, config),
        }
    }

    pub fn table(&mut self, table: &str) -> SqlResult<&mut Self> {
        let table = table_name("TRUNCATE", table)?;
        self.stmt.section(Keyword::Table).clear().push(table);
        Ok(self)
    }

    fn pipe_sections(&self) -> SqlResult<Node> {
        self.stmt.dialect().require(Feature::Truncate)?;
        Ok(pipe([
            Node::default().with(Keyword::Truncate).with(Keyword::Table),
            self.stmt.pipe_bare(Keyword::Table, true)?,
        ]))
    }

    fn check_policy(&self, sql: &str) -> SqlResult<()> {
        handle_dangerous_dml(self.stmt.config().truncate, "TRUNCATE", sql)
    }
}

impl_statement_builder!(TruncateBuilder);
