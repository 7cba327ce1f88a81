//! The expression tree.
//!
//! A [`Node`] holds ordered children, a join separator, an optional wrap
//! (prefix/suffix), a semantic [`NodeKind`] and a list of output
//! [`Decorator`]s. Rendering walks the tree depth-first:
//!
//! 1. render each child (nodes recurse, scalars go through the dialect)
//! 2. apply item decorators to each rendered child
//! 3. join the non-empty child output with the separator
//! 4. apply the wrap
//! 5. apply node decorators in registration order
//!
//! A node whose body renders empty produces the empty string, so empty
//! optional pieces vanish from their parent without leaving stray
//! separators behind.
//!
//! # Example
//! ```ignore
//! use sqlpipe::{Node, NodeKind, dialect::Postgres};
//!
//! let list = Node::new(NodeKind::List)
//!     .with(1)
//!     .with(2)
//!     .separated(",")
//!     .wrapped("(", ")");
//! assert_eq!(list.render(&Postgres), "(1,2)");
//! ```

use crate::dialect::{Dialect, Fragment};
use crate::keyword::Keyword;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Semantic tag of a node. Descriptive only: it never changes rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Untyped,
    Pipe,
    Section,
    List,
    Group,
    Identifier,
    Keyword,
    Value,
    Operator,
    Alias,
    Condition,
}

/// One child of a node.
#[derive(Debug, Clone)]
pub enum Child {
    /// A nested node.
    Node(Node),
    /// Text emitted verbatim.
    Raw(String),
    /// A scalar rendered with [`Dialect::quote_value`].
    Value(Value),
    /// Dialect-dependent syntax resolved at render.
    Fragment(Fragment),
}

impl Child {
    fn is_empty(&self) -> bool {
        match self {
            Child::Node(n) => n.is_empty(),
            Child::Raw(s) => s.is_empty(),
            Child::Value(_) => false,
            Child::Fragment(Fragment::Limit(limit)) => limit.is_empty(),
            Child::Fragment(Fragment::Lock(_)) => false,
        }
    }

    fn render(&self, dialect: &dyn Dialect) -> String {
        match self {
            Child::Node(n) => n.render(dialect),
            Child::Raw(s) => s.clone(),
            Child::Value(v) => dialect.quote_value(v),
            Child::Fragment(f) => dialect.render_fragment(f),
        }
    }
}

/// A string transform applied to rendered output.
#[derive(Clone)]
pub enum Decorator {
    /// Quote as a (possibly qualified) identifier.
    QuoteIdentifier,
    /// Quote as a string literal.
    QuoteValue,
    /// Caller-supplied transform.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl Decorator {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Decorator::Custom(Arc::new(f))
    }

    fn apply(&self, text: &str, dialect: &dyn Dialect) -> String {
        match self {
            Decorator::QuoteIdentifier => dialect.quote_identifier(text),
            Decorator::QuoteValue => dialect.quote_string(text),
            Decorator::Custom(f) => f(text),
        }
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decorator::QuoteIdentifier => f.write_str("QuoteIdentifier"),
            Decorator::QuoteValue => f.write_str("QuoteValue"),
            Decorator::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Conversion into an optional child; `None` items are skipped by [`Node::push`].
pub trait IntoChild {
    fn into_child(self) -> Option<Child>;
}

impl IntoChild for Child {
    fn into_child(self) -> Option<Child> {
        Some(self)
    }
}

impl IntoChild for Node {
    fn into_child(self) -> Option<Child> {
        Some(Child::Node(self))
    }
}

impl IntoChild for &Node {
    fn into_child(self) -> Option<Child> {
        Some(Child::Node(self.clone()))
    }
}

impl IntoChild for &str {
    fn into_child(self) -> Option<Child> {
        Some(Child::Raw(self.to_string()))
    }
}

impl IntoChild for String {
    fn into_child(self) -> Option<Child> {
        Some(Child::Raw(self))
    }
}

impl IntoChild for Value {
    fn into_child(self) -> Option<Child> {
        Some(Child::Value(self))
    }
}

impl IntoChild for Keyword {
    fn into_child(self) -> Option<Child> {
        Some(Child::Node(Node::keyword(self)))
    }
}

impl IntoChild for Fragment {
    fn into_child(self) -> Option<Child> {
        Some(Child::Fragment(self))
    }
}

impl<T: IntoChild> IntoChild for Option<T> {
    fn into_child(self) -> Option<Child> {
        self.and_then(IntoChild::into_child)
    }
}

macro_rules! impl_into_child_scalar {
    ($($t:ty),*) => {
        $(impl IntoChild for $t {
            fn into_child(self) -> Option<Child> {
                Some(Child::Value(Value::from(self)))
            }
        })*
    };
}

impl_into_child_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// A node of the query expression tree.
#[derive(Debug, Clone, Default)]
pub struct Node {
    children: Vec<Child>,
    /// `None` joins with a single space.
    separator: Option<String>,
    wrap: Option<(String, String)>,
    kind: NodeKind,
    decorators: Vec<Decorator>,
    item_decorators: Vec<Decorator>,
}

impl Node {
    /// Create an empty node with the given tag.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// A keyword node: the raw keyword text, never quoted.
    pub fn keyword(keyword: Keyword) -> Self {
        Self::new(NodeKind::Keyword).with(keyword.as_str())
    }

    // ==================== Mutation ====================

    /// Append one item. `None` items are skipped.
    pub fn push(&mut self, item: impl IntoChild) -> &mut Self {
        if let Some(child) = item.into_child() {
            self.children.push(child);
        }
        self
    }

    /// Append every item in order, skipping `None`s.
    pub fn append<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoChild,
    {
        self.children
            .extend(items.into_iter().filter_map(IntoChild::into_child));
        self
    }

    /// Set the separator placed between this node's own children.
    pub fn join(&mut self, separator: impl Into<String>) -> &mut Self {
        self.separator = Some(separator.into());
        self
    }

    /// Set the delimiters placed around the joined body.
    pub fn wrap(&mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> &mut Self {
        self.wrap = Some((prefix.into(), suffix.into()));
        self
    }

    /// Wrap with the same delimiter on both sides.
    pub fn wrap_symmetric(&mut self, delimiter: impl Into<String>) -> &mut Self {
        let d = delimiter.into();
        self.wrap = Some((d.clone(), d));
        self
    }

    /// Stamp the semantic tag.
    pub fn tag(&mut self, kind: NodeKind) -> &mut Self {
        self.kind = kind;
        self
    }

    /// Add a transform over this node's whole output.
    pub fn decorate(&mut self, decorator: Decorator) -> &mut Self {
        self.decorators.push(decorator);
        self
    }

    /// Add a transform applied to each child's output before joining.
    pub fn decorate_item(&mut self, decorator: Decorator) -> &mut Self {
        self.item_decorators.push(decorator);
        self
    }

    /// Remove all children, keeping the render rules.
    pub fn clear(&mut self) -> &mut Self {
        self.children.clear();
        self
    }

    // ==================== Consuming variants ====================

    pub fn with(mut self, item: impl IntoChild) -> Self {
        self.push(item);
        self
    }

    pub fn with_all<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoChild,
    {
        self.append(items);
        self
    }

    pub fn separated(mut self, separator: impl Into<String>) -> Self {
        self.join(separator);
        self
    }

    pub fn wrapped(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.wrap(prefix, suffix);
        self
    }

    pub fn tagged(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn decorated(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// A fresh node with the same render rules and no children.
    ///
    /// The clone shares decorators, wrap, separator and tag with `self` but
    /// none of its children, so pushing into either leaves the other intact.
    pub fn prototype(&self) -> Self {
        Self {
            children: Vec::new(),
            separator: self.separator.clone(),
            wrap: self.wrap.clone(),
            kind: self.kind,
            decorators: self.decorators.clone(),
            item_decorators: self.item_decorators.clone(),
        }
    }

    // ==================== Inspection ====================

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Child> {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// `true` when no child would render any text.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Child::is_empty)
    }

    /// `true` when the node is wrapped in exactly `prefix`/`suffix`.
    pub fn is_wrapped_in(&self, prefix: &str, suffix: &str) -> bool {
        matches!(&self.wrap, Some((p, s)) if p == prefix && s == suffix)
    }

    // ==================== Rendering ====================

    /// Render this node and its subtree.
    ///
    /// Pure: repeated calls with the same dialect yield the same string.
    pub fn render(&self, dialect: &dyn Dialect) -> String {
        let separator = self.separator.as_deref().unwrap_or(" ");
        let mut body = String::new();
        for child in &self.children {
            let mut text = child.render(dialect);
            if text.is_empty() {
                continue;
            }
            for decorator in &self.item_decorators {
                text = decorator.apply(&text, dialect);
            }
            if !body.is_empty() {
                body.push_str(separator);
            }
            body.push_str(&text);
        }
        if body.is_empty() {
            return body;
        }

        if let Some((prefix, suffix)) = &self.wrap {
            body.insert_str(0, prefix);
            body.push_str(suffix);
        }
        for decorator in &self.decorators {
            body = decorator.apply(&body, dialect);
        }
        body
    }
}
