//! # sqlpipe
//!
//! A composable expression-tree SQL builder with pluggable dialects.
//!
//! ## Features
//!
//! - **Expression tree**: [`Node`]s hold ordered children, a separator, a wrap
//!   and decorators; rendering is pure and depth-first
//! - **Section pipeline**: clauses accumulate in named sections and always
//!   render in the statement's fixed clause order
//! - **Dialects**: MySQL, PostgreSQL and SQLite quoting, boolean literals,
//!   LIMIT/OFFSET syntax and feature flags; swap the dialect before render
//! - **Safe defaults**: operators come from an allow-list, identifiers and
//!   values are always quoted, DELETE/UPDATE without WHERE can be refused
//!
//! ## Example
//!
//! ```ignore
//! use sqlpipe::{condition, SqlFactory, SqlConfig, StatementBuilder};
//!
//! let sql = SqlFactory::from_config(SqlConfig::new());
//!
//! let mut users = sql.select();
//! users
//!     .select(["id", "name"])?
//!     .from(["users"])?
//!     .and_where([condition("active", "=", true)?])?
//!     .order_by(["name"])?
//!     .limit(10);
//!
//! let query = users.build()?;
//! assert_eq!(
//!     query.sql,
//!     r#"SELECT "id", "name" FROM "users" WHERE ("active" = TRUE) ORDER BY "name" LIMIT 10"#
//! );
//! # Ok::<(), sqlpipe::SqlError>(())
//! ```

pub mod bindings;
pub mod builder;
pub mod config;
pub mod dialect;
pub mod error;
pub mod factory;
pub mod keyword;
pub mod node;
pub mod statement;
pub mod value;
pub mod vocab;

pub use bindings::Bindings;
pub use builder::{
    AlterTableBuilder, ColumnDef, CreateTableBuilder, DeleteBuilder, Direction, DropTableBuilder,
    InsertBuilder, JoinKind, SelectBuilder, TableConstraint, TruncateBuilder, UpdateBuilder,
};
pub use config::{DangerousDmlPolicy, SqlConfig};
pub use dialect::{Dialect, DialectKind, DriverDialect, Feature, LockMode, MySql, Postgres, Sqlite};
pub use error::{SqlError, SqlResult};
pub use factory::SqlFactory;
pub use keyword::Keyword;
pub use node::{Child, Decorator, IntoChild, Node, NodeKind};
pub use statement::{BuildState, BuiltQuery, Statement, StatementBuilder, StatementKind};
pub use value::Value;
pub use vocab::{
    alias, all_of, any_of, avg, case_when, case_when_else, compare, condition, count, eq, func,
    gt, gte, identifier, in_list, is_not_null, is_null, keyword, like, lt, lte, max, min, ne, not,
    on, operator, raw, sum, value, Aliasable, Operand, Operator, Target,
};
