//! SQL vocabulary: node constructors that stamp meaning onto the tree.
//!
//! Every helper returns a new node; none of them mutate their inputs.
//!
//! # Example
//! ```ignore
//! use sqlpipe::{condition, in_list, identifier, dialect::MySql};
//!
//! let adult = condition("age", ">", 18)?;
//! assert_eq!(adult.render(&MySql), "`age` > 18");
//!
//! let ids = in_list("id", vec![1, 2, 3])?;
//! assert_eq!(ids.render(&MySql), "`id` IN (1,2,3)");
//! # Ok::<(), sqlpipe::SqlError>(())
//! ```

use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::node::{Child, Decorator, Node, NodeKind};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

// ==================== Operators ====================

/// The comparison operator allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Gt,
    Lte,
    Gte,
    /// `<>`
    Ne,
    /// `!=`
    BangNe,
    Like,
    In,
    Is,
    IsNot,
}

impl Operator {
    pub const ALL: &'static [Operator] = &[
        Operator::Eq,
        Operator::Lt,
        Operator::Gt,
        Operator::Lte,
        Operator::Gte,
        Operator::Ne,
        Operator::BangNe,
        Operator::Like,
        Operator::In,
        Operator::Is,
        Operator::IsNot,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Ne => "<>",
            Operator::BangNe => "!=",
            Operator::Like => Keyword::Like.as_str(),
            Operator::In => Keyword::In.as_str(),
            Operator::Is => Keyword::Is.as_str(),
            Operator::IsNot => Keyword::IsNot.as_str(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = SqlError;

    /// Word operators match case-insensitively and with any inner spacing.
    fn from_str(s: &str) -> SqlResult<Self> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| SqlError::invalid_operator(s))
    }
}

// ==================== Operand conversions ====================

/// The left side of a condition, or the source of an alias/function.
#[derive(Debug, Clone)]
pub enum Target {
    /// A column (or table) name, rendered as an identifier.
    Column(String),
    /// An arbitrary expression.
    Node(Node),
}

impl Target {
    /// Identifier for names; nodes parenthesized.
    fn into_grouped(self) -> Node {
        match self {
            Target::Column(name) => identifier(name),
            Target::Node(node) => parenthesize(node),
        }
    }

    /// Identifier for names; nodes as-is.
    fn into_plain(self) -> Node {
        match self {
            Target::Column(name) => identifier(name),
            Target::Node(node) => node,
        }
    }
}

impl From<&str> for Target {
    fn from(v: &str) -> Self {
        Target::Column(v.to_string())
    }
}

impl From<String> for Target {
    fn from(v: String) -> Self {
        Target::Column(v)
    }
}

impl From<&String> for Target {
    fn from(v: &String) -> Self {
        Target::Column(v.clone())
    }
}

impl From<Node> for Target {
    fn from(v: Node) -> Self {
        Target::Node(v)
    }
}

/// The right side of a condition.
#[derive(Debug, Clone)]
pub enum Operand {
    /// NULL renders as the keyword, numbers raw, everything else quoted.
    Value(Value),
    /// Parenthesized, comma-joined, each item quoted.
    List(Vec<Value>),
    /// Used as-is.
    Node(Node),
}

impl Operand {
    fn into_node(self) -> SqlResult<Node> {
        match self {
            Operand::Value(Value::Null) => Ok(keyword(Keyword::Null)),
            Operand::Value(v) => Ok(value(v)),
            Operand::List(items) if items.is_empty() => Err(SqlError::invalid_argument(
                "value list must contain at least one item",
            )),
            Operand::List(items) => Ok(Node::new(NodeKind::List)
                .with_all(items)
                .separated(",")
                .wrapped("(", ")")),
            Operand::Node(node) => Ok(node),
        }
    }

    /// Scalars quoted, nodes as-is; lists rejected.
    pub(crate) fn into_scalar(self, role: &str) -> SqlResult<Node> {
        match self {
            Operand::List(_) => Err(SqlError::invalid_argument(format!(
                "{role} must be a single value or expression"
            ))),
            other => other.into_node(),
        }
    }

    /// Like [`Operand::into_scalar`] but nodes are parenthesized.
    fn into_term(self, role: &str) -> SqlResult<Node> {
        match self {
            Operand::Node(node) => Ok(parenthesize(node)),
            other => other.into_scalar(role),
        }
    }
}

macro_rules! impl_operand_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Value(Value::from(v))
            }
        })*
    };
}

impl_operand_scalar!(
    bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, char, &str, String, &String
);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Value(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(v: [T; N]) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Node> for Operand {
    fn from(v: Node) -> Self {
        Operand::Node(v)
    }
}

/// One entry of an aliasable list (SELECT columns, FROM tables, ORDER BY...).
#[derive(Debug, Clone)]
pub enum Aliasable {
    /// Rendered as an identifier.
    Name(String),
    /// Rendered as-is.
    Node(Node),
    /// `{alias: source}`, rendered as `source AS alias`.
    Aliased { alias: String, source: Target },
}

impl Aliasable {
    pub fn aliased(alias: impl Into<String>, source: impl Into<Target>) -> Self {
        Aliasable::Aliased {
            alias: alias.into(),
            source: source.into(),
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        match self {
            Aliasable::Name(name) => name.trim().is_empty(),
            Aliasable::Node(node) => node.is_empty(),
            Aliasable::Aliased { alias, .. } => alias.trim().is_empty(),
        }
    }

    pub fn into_node(self) -> Node {
        match self {
            Aliasable::Name(name) => identifier(name),
            Aliasable::Node(node) => node,
            Aliasable::Aliased { alias: a, source } => alias(a, source),
        }
    }
}

impl From<&str> for Aliasable {
    fn from(v: &str) -> Self {
        Aliasable::Name(v.to_string())
    }
}

impl From<String> for Aliasable {
    fn from(v: String) -> Self {
        Aliasable::Name(v)
    }
}

impl From<&String> for Aliasable {
    fn from(v: &String) -> Self {
        Aliasable::Name(v.clone())
    }
}

impl From<Node> for Aliasable {
    fn from(v: Node) -> Self {
        Aliasable::Node(v)
    }
}

/// `(alias, source)` mirrors a one-entry `{alias: source}` mapping.
impl<A: Into<String>, S: Into<Target>> From<(A, S)> for Aliasable {
    fn from((alias, source): (A, S)) -> Self {
        Aliasable::aliased(alias, source)
    }
}

// ==================== Constructors ====================

/// Wrap in parentheses unless already wrapped.
pub(crate) fn parenthesize(node: Node) -> Node {
    if node.is_wrapped_in("(", ")") {
        node
    } else {
        Node::new(NodeKind::Group).with(node).wrapped("(", ")")
    }
}

/// A keyword, rendered verbatim.
pub fn keyword(keyword: Keyword) -> Node {
    Node::keyword(keyword)
}

/// Raw SQL text, never quoted.
///
/// **Warning**: bypasses quoting. Only use with trusted text.
pub fn raw(sql: impl Into<String>) -> Node {
    Node::default().with(Child::Raw(sql.into()))
}

/// A quoted identifier; `schema.table` parts are quoted independently.
pub fn identifier(name: impl Into<String>) -> Node {
    Node::new(NodeKind::Identifier)
        .with(Child::Raw(name.into()))
        .decorated(Decorator::QuoteIdentifier)
}

/// A literal value quoted by the dialect.
pub fn value(v: impl Into<Value>) -> Node {
    Node::new(NodeKind::Value).with(Child::Value(v.into()))
}

/// An operator from the allow-list.
pub fn operator(op: &str) -> SqlResult<Node> {
    let op: Operator = op.parse()?;
    Ok(operator_node(op))
}

fn operator_node(op: Operator) -> Node {
    Node::new(NodeKind::Operator).with(op.as_str())
}

/// `<expr> AS <alias>`; node expressions are parenthesized.
pub fn alias(alias: impl Into<String>, expr: impl Into<Target>) -> Node {
    Node::new(NodeKind::Alias)
        .with(expr.into().into_grouped())
        .with(Keyword::As)
        .with(identifier(alias))
}

/// `<left> <op> <right>` with `op` parsed from the allow-list.
///
/// `left` is an identifier, or a parenthesized node. `right` follows
/// [`Operand`]: NULL keyword, raw numbers, quoted text, parenthesized lists,
/// or a node as-is.
pub fn condition(
    left: impl Into<Target>,
    op: &str,
    right: impl Into<Operand>,
) -> SqlResult<Node> {
    compare(left, op.parse()?, right)
}

/// [`condition`] with an already-typed operator.
pub fn compare(
    left: impl Into<Target>,
    op: Operator,
    right: impl Into<Operand>,
) -> SqlResult<Node> {
    let right = right.into().into_node()?;
    Ok(Node::new(NodeKind::Condition)
        .with(left.into().into_grouped())
        .with(operator_node(op))
        .with(right))
}

/// `<column> IN (<values>)`.
pub fn in_list(column: impl Into<Target>, values: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::In, values)
}

/// `<column> LIKE <pattern>`.
pub fn like(column: impl Into<Target>, pattern: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Like, pattern)
}

pub fn eq(column: impl Into<Target>, v: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Eq, v)
}

pub fn ne(column: impl Into<Target>, v: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Ne, v)
}

pub fn gt(column: impl Into<Target>, v: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Gt, v)
}

pub fn gte(column: impl Into<Target>, v: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Gte, v)
}

pub fn lt(column: impl Into<Target>, v: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Lt, v)
}

pub fn lte(column: impl Into<Target>, v: impl Into<Operand>) -> SqlResult<Node> {
    compare(column, Operator::Lte, v)
}

/// `<column> IS NULL`
pub fn is_null(column: impl Into<Target>) -> Node {
    Node::new(NodeKind::Condition)
        .with(column.into().into_grouped())
        .with(operator_node(Operator::Is))
        .with(Keyword::Null)
}

/// `<column> IS NOT NULL`
pub fn is_not_null(column: impl Into<Target>) -> Node {
    Node::new(NodeKind::Condition)
        .with(column.into().into_grouped())
        .with(operator_node(Operator::IsNot))
        .with(Keyword::Null)
}

/// Column-to-column equality, as used in JOIN ... ON.
pub fn on(left: impl Into<String>, right: impl Into<String>) -> Node {
    Node::new(NodeKind::Condition)
        .with(identifier(left))
        .with(operator_node(Operator::Eq))
        .with(identifier(right))
}

/// `NOT (<expr>)`
pub fn not(expr: Node) -> Node {
    Node::new(NodeKind::Condition)
        .with(Keyword::Not)
        .with(parenthesize(expr))
}

/// Conditions joined with AND, parenthesized.
pub fn all_of(conditions: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Group)
        .with_all(conditions)
        .separated(" AND ")
        .wrapped("(", ")")
}

/// Conditions joined with OR, parenthesized.
pub fn any_of(conditions: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Group)
        .with_all(conditions)
        .separated(" OR ")
        .wrapped("(", ")")
}

/// `CASE WHEN <condition> THEN <then> END`
pub fn case_when(condition: impl Into<Target>, then: impl Into<Operand>) -> SqlResult<Node> {
    build_case(condition.into(), then.into(), None)
}

/// `CASE WHEN <condition> THEN <then> ELSE <otherwise> END`
pub fn case_when_else(
    condition: impl Into<Target>,
    then: impl Into<Operand>,
    otherwise: impl Into<Operand>,
) -> SqlResult<Node> {
    build_case(condition.into(), then.into(), Some(otherwise.into()))
}

fn build_case(condition: Target, then: Operand, otherwise: Option<Operand>) -> SqlResult<Node> {
    let mut node = Node::new(NodeKind::Group);
    node.push(Keyword::When)
        .push(condition.into_grouped())
        .push(Keyword::Then)
        .push(then.into_term("CASE THEN")?);
    if let Some(otherwise) = otherwise {
        node.push(Keyword::Else).push(otherwise.into_term("CASE ELSE")?);
    }
    node.wrap(format!("{} ", Keyword::Case), format!(" {}", Keyword::End));
    Ok(node)
}

/// `<NAME>(<column>)`; names are quoted identifiers, nodes used as-is.
///
/// The function name must match `[A-Za-z_][A-Za-z0-9_]*`.
pub fn func(name: &str, column: impl Into<Target>) -> SqlResult<Node> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(SqlError::invalid_argument(format!(
            "invalid function name '{name}'"
        )));
    }
    Ok(call(name, column.into()))
}

fn call(name: &str, column: Target) -> Node {
    Node::new(NodeKind::Group)
        .with(column.into_plain())
        .wrapped(format!("{}(", name.to_ascii_uppercase()), ")")
}

pub fn count(column: impl Into<Target>) -> Node {
    call("COUNT", column.into())
}

pub fn sum(column: impl Into<Target>) -> Node {
    call("SUM", column.into())
}

pub fn avg(column: impl Into<Target>) -> Node {
    call("AVG", column.into())
}

pub fn min(column: impl Into<Target>) -> Node {
    call("MIN", column.into())
}

pub fn max(column: impl Into<Target>) -> Node {
    call("MAX", column.into())
}
