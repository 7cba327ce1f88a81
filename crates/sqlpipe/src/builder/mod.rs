//! Statement builders.
//!
//! Each builder wraps one [`Statement`](crate::statement::Statement), exposes
//! clause operations that push into its sections, and declares the fixed
//! order in which those sections are piped.
//!
//! # Usage
//!
//! ```ignore
//! use sqlpipe::builder::SelectBuilder;
//! use sqlpipe::{condition, dialect::MySql, StatementBuilder};
//! use std::sync::Arc;
//!
//! let mut qb = SelectBuilder::new(Arc::new(MySql));
//! qb.select(["id", "name"])?
//!     .from(["users"])?
//!     .and_where([condition("active", "=", true)?])?
//!     .order_by(["name"])?
//!     .limit(10);
//! assert_eq!(
//!     qb.to_sql()?,
//!     "SELECT `id`, `name` FROM `users` WHERE (`active` = 1) ORDER BY `name` LIMIT 10"
//! );
//! # Ok::<(), sqlpipe::SqlError>(())
//! ```

mod ddl;
mod delete;
mod insert;
mod select;
mod update;

pub use ddl::{AlterTableBuilder, ColumnDef, CreateTableBuilder, DropTableBuilder, TableConstraint, TruncateBuilder};
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::Node;
use crate::vocab::{identifier, Aliasable};

/// Join flavours accepted by [`SelectBuilder::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub const fn keyword(self) -> Keyword {
        match self {
            JoinKind::Inner => Keyword::InnerJoin,
            JoinKind::Left => Keyword::LeftJoin,
            JoinKind::Right => Keyword::RightJoin,
            JoinKind::Full => Keyword::FullJoin,
            JoinKind::Cross => Keyword::CrossJoin,
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn keyword(self) -> Keyword {
        match self {
            Direction::Asc => Keyword::Asc,
            Direction::Desc => Keyword::Desc,
        }
    }
}

/// `<column> ASC|DESC`
pub(crate) fn ordered(column: impl Into<Aliasable>, direction: Direction) -> SqlResult<Node> {
    let column = column.into();
    if column.is_blank() {
        return Err(SqlError::invalid_argument("ORDER BY column cannot be blank"));
    }
    Ok(Node::default()
        .with(column.into_node())
        .with(direction.keyword()))
}

/// Validate and quote a plain list of column names.
pub(crate) fn column_names<I>(what: &str, columns: I) -> SqlResult<Vec<Node>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    if columns.is_empty() {
        return Err(SqlError::invalid_argument(format!(
            "{what} requires at least one column"
        )));
    }
    if columns.iter().any(|c| c.trim().is_empty()) {
        return Err(SqlError::invalid_argument(format!(
            "{what} column names cannot be blank"
        )));
    }
    Ok(columns.into_iter().map(identifier).collect())
}

/// Validate a single table name.
pub(crate) fn table_name(what: &str, table: &str) -> SqlResult<Node> {
    if table.trim().is_empty() {
        return Err(SqlError::invalid_argument(format!("{what} requires a table")));
    }
    Ok(identifier(table))
}
