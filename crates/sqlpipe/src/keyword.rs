//! The closed SQL keyword vocabulary.
//!
//! Keywords are the contract between the vocabulary helpers and the statement
//! builders: section keys are keywords, and every keyword renders verbatim in
//! upper case.

use std::fmt;

macro_rules! keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// A SQL keyword.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keyword {
            $($variant),*
        }

        impl Keyword {
            /// Every keyword, in declaration order.
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),*];

            /// The upper-case SQL text of this keyword.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),*
                }
            }
        }
    };
}

keywords! {
    // Query clauses
    Describe => "DESCRIBE",
    Explain => "EXPLAIN",
    Analyze => "ANALYZE",
    With => "WITH",
    Recursive => "RECURSIVE",
    Select => "SELECT",
    Distinct => "DISTINCT",
    From => "FROM",
    Join => "JOIN",
    InnerJoin => "INNER JOIN",
    LeftJoin => "LEFT JOIN",
    RightJoin => "RIGHT JOIN",
    FullJoin => "FULL OUTER JOIN",
    CrossJoin => "CROSS JOIN",
    On => "ON",
    Using => "USING",
    Where => "WHERE",
    GroupBy => "GROUP BY",
    Having => "HAVING",
    OrderBy => "ORDER BY",
    Asc => "ASC",
    Desc => "DESC",
    Limit => "LIMIT",
    Offset => "OFFSET",
    Window => "WINDOW",
    Union => "UNION",
    UnionAll => "UNION ALL",
    Lock => "LOCK",
    ForUpdate => "FOR UPDATE",
    ForShare => "FOR SHARE",
    LockInShareMode => "LOCK IN SHARE MODE",
    As => "AS",

    // Expressions
    Case => "CASE",
    When => "WHEN",
    Then => "THEN",
    Else => "ELSE",
    End => "END",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    Null => "NULL",
    In => "IN",
    Like => "LIKE",
    Is => "IS",
    IsNot => "IS NOT",

    // DML
    Insert => "INSERT",
    InsertInto => "INSERT INTO",
    Values => "VALUES",
    Update => "UPDATE",
    Set => "SET",
    Delete => "DELETE",
    DeleteFrom => "DELETE FROM",
    Returning => "RETURNING",

    // DDL
    Create => "CREATE",
    Temporary => "TEMPORARY",
    Alter => "ALTER",
    Drop => "DROP",
    Truncate => "TRUNCATE",
    Table => "TABLE",
    Add => "ADD",
    Column => "COLUMN",
    Constraint => "CONSTRAINT",
    Rename => "RENAME",
    To => "TO",
    IfExists => "IF EXISTS",
    IfNotExists => "IF NOT EXISTS",
    Cascade => "CASCADE",
    Restrict => "RESTRICT",
    PrimaryKey => "PRIMARY KEY",
    ForeignKey => "FOREIGN KEY",
    References => "REFERENCES",
    Unique => "UNIQUE",
    NotNull => "NOT NULL",
    Default => "DEFAULT",
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_render_upper_case() {
        for kw in Keyword::ALL {
            let text = kw.as_str();
            assert_eq!(text, text.to_ascii_uppercase(), "{kw:?}");
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn multi_word_keywords() {
        assert_eq!(Keyword::GroupBy.to_string(), "GROUP BY");
        assert_eq!(Keyword::IfNotExists.as_str(), "IF NOT EXISTS");
    }
}
