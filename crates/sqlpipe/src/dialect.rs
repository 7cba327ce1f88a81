//! Backend-specific quoting and syntax rules.
//!
//! A [`Dialect`] is a stateless descriptor consulted only while rendering. The
//! expression tree never stores quoted text, so swapping the dialect of a
//! builder changes every identifier and literal rendered afterwards without
//! touching strings that were already produced.
//!
//! # Example
//! ```ignore
//! use sqlpipe::dialect::{Dialect, MySql, Postgres};
//!
//! assert_eq!(MySql.quote_identifier("public.users"), "`public`.`users`");
//! assert_eq!(Postgres.quote_identifier("public.users"), r#""public"."users""#);
//! ```

use crate::error::{SqlError, SqlResult};
use crate::keyword::Keyword;
use crate::value::Value;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Optional syntax a dialect may or may not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    IfNotExists,
    Returning,
    Cte,
    FullJoin,
    RowLocking,
    Truncate,
    DropCascade,
    /// ORDER BY and LIMIT on UPDATE/DELETE.
    DmlOrderLimit,
}

impl Feature {
    pub const fn as_str(self) -> &'static str {
        match self {
            Feature::IfNotExists => "IF NOT EXISTS",
            Feature::Returning => "RETURNING",
            Feature::Cte => "WITH (common table expressions)",
            Feature::FullJoin => "FULL OUTER JOIN",
            Feature::RowLocking => "row locking clauses",
            Feature::Truncate => "TRUNCATE",
            Feature::DropCascade => "DROP ... CASCADE",
            Feature::DmlOrderLimit => "ORDER BY/LIMIT in UPDATE and DELETE",
        }
    }
}

/// LIMIT/OFFSET values, rendered by [`Dialect::limit_clause`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Limit {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

/// Row locking modes for SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    ForUpdate,
    ForShare,
}

/// Dialect-dependent syntax carried inside a dialect-free expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    Limit(Limit),
    Lock(LockMode),
}

/// Quoting and syntax rules for one database backend.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Short lowercase backend name (used in errors and logs).
    fn name(&self) -> &'static str;

    /// Character used to delimit identifiers.
    fn identifier_quote(&self) -> char;

    /// Character used to delimit string literals.
    fn value_quote(&self) -> char {
        '\''
    }

    /// Literal text for a boolean.
    fn bool_literal(&self, value: bool) -> &'static str;

    /// Whether the backend accepts `feature`.
    fn supports(&self, feature: Feature) -> bool;

    /// Fail with [`SqlError::Unsupported`] unless `feature` is supported.
    fn require(&self, feature: Feature) -> SqlResult<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(SqlError::Unsupported {
                dialect: self.name(),
                feature: feature.as_str(),
            })
        }
    }

    /// Escape and delimit a string literal.
    fn quote_string(&self, raw: &str) -> String {
        let q = self.value_quote();
        let mut out = String::with_capacity(raw.len() + 2);
        out.push(q);
        for ch in raw.chars() {
            if ch == q {
                out.push(q);
            }
            out.push(ch);
        }
        out.push(q);
        out
    }

    /// Render a scalar as a literal.
    ///
    /// NULL and numbers are emitted raw, booleans use [`Dialect::bool_literal`],
    /// text goes through [`Dialect::quote_string`].
    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b).to_string(),
            Value::Int(n) => n.to_string(),
            Value::UInt(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            Value::Float(n) => self.quote_string(&n.to_string()),
            Value::Text(s) => self.quote_string(s),
        }
    }

    /// Quote a possibly qualified identifier (`schema.table.column`).
    ///
    /// Each dot-separated part is quoted independently. Well-formed quoted
    /// parts (inner quotes doubled) and `*` are left untouched, so quoting is
    /// idempotent. Any other quote character is escaped by doubling.
    fn quote_identifier(&self, ident: &str) -> String {
        let q = self.identifier_quote();
        let mut out = String::with_capacity(ident.len() + 4);
        for (i, part) in split_qualified(ident, q).into_iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            push_identifier_part(&mut out, part, q);
        }
        out
    }

    /// Render LIMIT/OFFSET.
    fn limit_clause(&self, limit: &Limit) -> String {
        match (limit.limit, limit.offset) {
            (Some(n), Some(m)) => format!("{} {n} {} {m}", Keyword::Limit, Keyword::Offset),
            (Some(n), None) => format!("{} {n}", Keyword::Limit),
            (None, Some(m)) => format!("{} {m}", Keyword::Offset),
            (None, None) => String::new(),
        }
    }

    /// Render a row locking clause.
    fn lock_clause(&self, mode: LockMode) -> String {
        match mode {
            LockMode::ForUpdate => Keyword::ForUpdate.to_string(),
            LockMode::ForShare => Keyword::ForShare.to_string(),
        }
    }

    /// Resolve a deferred fragment.
    fn render_fragment(&self, fragment: &Fragment) -> String {
        match fragment {
            Fragment::Limit(limit) => self.limit_clause(limit),
            Fragment::Lock(mode) => self.lock_clause(*mode),
        }
    }
}

/// One dot-separated part of a qualified identifier.
#[derive(Debug, PartialEq, Eq)]
enum IdentPart<'a> {
    /// A well-formed quoted segment, kept verbatim.
    Quoted(&'a str),
    /// Anything else, quoted with embedded quotes doubled.
    Bare(&'a str),
}

/// Split on `.` outside well-formed quoted segments.
///
/// A segment counts as quoted only when it opens with the quote character,
/// every inner quote is doubled, and the closing quote is followed by `.` or
/// the end of input. Otherwise the text up to the next `.` is a bare part.
fn split_qualified(ident: &str, quote: char) -> Vec<IdentPart<'_>> {
    let mut parts = Vec::new();
    let mut start = 0;
    loop {
        let rest = &ident[start..];
        if let Some(len) = quoted_segment_len(rest, quote) {
            parts.push(IdentPart::Quoted(&rest[..len]));
            if len == rest.len() {
                break;
            }
            start += len + 1;
            continue;
        }
        match rest.find('.') {
            Some(dot) => {
                parts.push(IdentPart::Bare(&rest[..dot]));
                start += dot + 1;
            }
            None => {
                parts.push(IdentPart::Bare(rest));
                break;
            }
        }
    }
    parts
}

/// Byte length of a well-formed quoted segment at the start of `s`.
fn quoted_segment_len(s: &str, quote: char) -> Option<usize> {
    let mut chars = s.char_indices().peekable();
    match chars.next() {
        Some((_, c)) if c == quote => {}
        _ => return None,
    }
    while let Some((i, ch)) = chars.next() {
        if ch != quote {
            continue;
        }
        if matches!(chars.peek(), Some(&(_, next)) if next == quote) {
            chars.next();
            continue;
        }
        let end = i + ch.len_utf8();
        return match s[end..].chars().next() {
            None | Some('.') => Some(end),
            Some(_) => None,
        };
    }
    None
}

fn push_identifier_part(out: &mut String, part: IdentPart<'_>, quote: char) {
    let bare = match part {
        IdentPart::Quoted(text) => {
            out.push_str(text);
            return;
        }
        IdentPart::Bare("*") => {
            out.push('*');
            return;
        }
        IdentPart::Bare(text) => text,
    };
    out.push(quote);
    for ch in bare.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
}

/// MySQL / MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn supports(&self, feature: Feature) -> bool {
        !matches!(feature, Feature::Returning | Feature::FullJoin)
    }

    fn quote_string(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len() + 2);
        out.push('\'');
        for ch in raw.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                '\0' => out.push_str("\\0"),
                c => out.push(c),
            }
        }
        out.push('\'');
        out
    }

    fn limit_clause(&self, limit: &Limit) -> String {
        match (limit.limit, limit.offset) {
            (Some(n), Some(m)) => format!("{} {m}, {n}", Keyword::Limit),
            (Some(n), None) => format!("{} {n}", Keyword::Limit),
            (None, Some(m)) => format!("{} {m}, {}", Keyword::Limit, u64::MAX),
            (None, None) => String::new(),
        }
    }

    fn lock_clause(&self, mode: LockMode) -> String {
        match mode {
            LockMode::ForUpdate => Keyword::ForUpdate.to_string(),
            LockMode::ForShare => Keyword::LockInShareMode.to_string(),
        }
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn supports(&self, feature: Feature) -> bool {
        !matches!(feature, Feature::DmlOrderLimit)
    }
}

/// SQLite 3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn supports(&self, feature: Feature) -> bool {
        !matches!(
            feature,
            Feature::RowLocking
                | Feature::Truncate
                | Feature::DropCascade
                | Feature::DmlOrderLimit
        )
    }

    fn limit_clause(&self, limit: &Limit) -> String {
        match (limit.limit, limit.offset) {
            (Some(n), Some(m)) => format!("{} {n} {} {m}", Keyword::Limit, Keyword::Offset),
            (Some(n), None) => format!("{} {n}", Keyword::Limit),
            (None, Some(m)) => format!("{} -1 {} {m}", Keyword::Limit, Keyword::Offset),
            (None, None) => String::new(),
        }
    }
}

/// The built-in dialects, selectable by name from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "mariadb")]
    MySql,
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DialectKind {
    /// Instantiate the dialect.
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::MySql => Arc::new(MySql),
            DialectKind::Postgres => Arc::new(Postgres),
            DialectKind::Sqlite => Arc::new(Sqlite),
        }
    }
}

impl FromStr for DialectKind {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            other => Err(SqlError::configuration(format!(
                "unknown dialect '{other}'"
            ))),
        }
    }
}

/// A string-escaping primitive supplied by a live connection or driver.
pub trait ValueQuoter: Send + Sync {
    /// Escape and delimit `raw` as a string literal.
    fn quote(&self, raw: &str) -> String;
}

impl<F> ValueQuoter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn quote(&self, raw: &str) -> String {
        self(raw)
    }
}

/// A dialect whose string escaping is delegated to a driver.
///
/// Every other rule comes from the wrapped dialect.
#[derive(Clone)]
pub struct DriverDialect {
    inner: Arc<dyn Dialect>,
    quoter: Arc<dyn ValueQuoter>,
}

impl DriverDialect {
    pub fn new(inner: Arc<dyn Dialect>, quoter: impl ValueQuoter + 'static) -> Self {
        Self {
            inner,
            quoter: Arc::new(quoter),
        }
    }
}

impl fmt::Debug for DriverDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverDialect")
            .field("inner", &self.inner)
            .field("quoter", &"<dyn ValueQuoter>")
            .finish()
    }
}

impl Dialect for DriverDialect {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn identifier_quote(&self) -> char {
        self.inner.identifier_quote()
    }

    fn value_quote(&self) -> char {
        self.inner.value_quote()
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        self.inner.bool_literal(value)
    }

    fn supports(&self, feature: Feature) -> bool {
        self.inner.supports(feature)
    }

    fn quote_string(&self, raw: &str) -> String {
        self.quoter.quote(raw)
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.inner.quote_identifier(ident)
    }

    fn limit_clause(&self, limit: &Limit) -> String {
        self.inner.limit_clause(limit)
    }

    fn lock_clause(&self, mode: LockMode) -> String {
        self.inner.lock_clause(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_quoted_per_part() {
        assert_eq!(MySql.quote_identifier("a.b"), "`a`.`b`");
        assert_eq!(Postgres.quote_identifier("a.b"), r#""a"."b""#);
        assert_eq!(Sqlite.quote_identifier("users"), r#""users""#);
    }

    #[test]
    fn identifier_quoting_is_idempotent() {
        let once = MySql.quote_identifier("schema.table.col");
        assert_eq!(MySql.quote_identifier(&once), once);

        let once = Postgres.quote_identifier("public.users");
        assert_eq!(Postgres.quote_identifier(&once), once);
    }

    #[test]
    fn malformed_quoted_identifier_is_escaped() {
        assert_eq!(
            Postgres.quote_identifier(r#""x" FROM secrets; --""#),
            r#""""x"" FROM secrets; --""""#
        );
        assert_eq!(
            MySql.quote_identifier("`a` UNION SELECT pw FROM u -- `"),
            "```a`` UNION SELECT pw FROM u -- ```"
        );
        assert_eq!(Postgres.quote_identifier(r#""a"b""#), r#""""a""b""""#);
        assert_eq!(MySql.quote_identifier("`open"), "```open`");
    }

    #[test]
    fn doubled_inner_quotes_stay_quoted() {
        let once = Postgres.quote_identifier(r#"we"ird"#);
        assert_eq!(once, r#""we""ird""#);
        assert_eq!(Postgres.quote_identifier(&once), once);

        let once = MySql.quote_identifier("s.we`ird");
        assert_eq!(once, "`s`.`we``ird`");
        assert_eq!(MySql.quote_identifier(&once), once);
    }

    #[test]
    fn stray_quote_keeps_qualifier_split() {
        assert_eq!(Postgres.quote_identifier(r#"a"b.c"#), r#""a""b"."c""#);
        assert_eq!(MySql.quote_identifier("t.`c"), "`t`.```c`");
    }

    #[test]
    fn identifier_star_and_mixed_parts() {
        assert_eq!(MySql.quote_identifier("u.*"), "`u`.*");
        assert_eq!(
            Postgres.quote_identifier(r#"public."User.Table".id"#),
            r#""public"."User.Table"."id""#
        );
    }

    #[test]
    fn identifier_escapes_embedded_quote() {
        assert_eq!(MySql.quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(Postgres.quote_identifier("a\"b"), r#""a""b""#);
    }

    #[test]
    fn values_per_dialect() {
        assert_eq!(MySql.quote_value(&Value::Bool(true)), "1");
        assert_eq!(Postgres.quote_value(&Value::Bool(false)), "FALSE");
        assert_eq!(Sqlite.quote_value(&Value::Null), "NULL");
        assert_eq!(Postgres.quote_value(&Value::Int(-3)), "-3");
        assert_eq!(Postgres.quote_value(&Value::Text("it's".into())), "'it''s'");
        assert_eq!(MySql.quote_value(&Value::Text(r"a\b".into())), r"'a\\b'");
    }

    #[test]
    fn non_finite_floats_are_quoted() {
        assert_eq!(Postgres.quote_value(&Value::Float(f64::NAN)), "'NaN'");
        assert_eq!(Postgres.quote_value(&Value::Float(1.5)), "1.5");
    }

    #[test]
    fn limit_token_order() {
        let both = Limit {
            limit: Some(10),
            offset: Some(20),
        };
        assert_eq!(MySql.limit_clause(&both), "LIMIT 20, 10");
        assert_eq!(Postgres.limit_clause(&both), "LIMIT 10 OFFSET 20");
        assert_eq!(Sqlite.limit_clause(&both), "LIMIT 10 OFFSET 20");

        let offset_only = Limit {
            limit: None,
            offset: Some(5),
        };
        assert_eq!(Postgres.limit_clause(&offset_only), "OFFSET 5");
        assert_eq!(Sqlite.limit_clause(&offset_only), "LIMIT -1 OFFSET 5");
        assert_eq!(
            MySql.limit_clause(&offset_only),
            "LIMIT 5, 18446744073709551615"
        );
        assert_eq!(Postgres.limit_clause(&Limit::default()), "");
    }

    #[test]
    fn feature_flags() {
        assert!(MySql.require(Feature::Returning).unwrap_err().is_unsupported());
        assert!(Postgres.require(Feature::Returning).is_ok());
        assert!(!Sqlite.supports(Feature::Truncate));
        assert!(Sqlite.supports(Feature::Cte));
        assert!(MySql.supports(Feature::DmlOrderLimit));
        assert!(!Postgres.supports(Feature::DmlOrderLimit));
        assert!(!Sqlite.supports(Feature::DmlOrderLimit));
    }

    #[test]
    fn lock_clauses_use_keyword_text() {
        assert_eq!(
            Postgres.lock_clause(LockMode::ForShare),
            Keyword::ForShare.as_str()
        );
        assert_eq!(
            MySql.lock_clause(LockMode::ForShare),
            Keyword::LockInShareMode.as_str()
        );
        assert_eq!(Sqlite.lock_clause(LockMode::ForUpdate), "FOR UPDATE");
    }

    #[test]
    fn dialect_kind_parsing() {
        assert_eq!("PostgreSQL".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert_eq!("mariadb".parse::<DialectKind>().unwrap(), DialectKind::MySql);
        assert!("oracle".parse::<DialectKind>().unwrap_err().is_configuration());
        assert_eq!(DialectKind::Sqlite.dialect().name(), "sqlite");
    }

    #[test]
    fn driver_quoter_replaces_string_escaping_only() {
        let d = DriverDialect::new(Arc::new(MySql), |raw: &str| format!("X'{raw}'"));
        assert_eq!(d.quote_value(&Value::Text("ab".into())), "X'ab'");
        assert_eq!(d.quote_value(&Value::Int(1)), "1");
        assert_eq!(d.quote_identifier("t"), "`t`");
        assert_eq!(d.name(), "mysql");
    }
}
