//! The typed, immutable AST produced by the parser.
//!
//! Every node is a value-typed tagged variant; recursive subtrees are boxed
//! rather than shared, so there is exactly one owner per node and cycles are
//! impossible by construction.

use serde::{Deserialize, Serialize};

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[serde(rename = "self")]
    SelfAxis,
    Parent,
    Child,
    Ancestor,
    Descendant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Tag,
    Text,
    NodeId,
    ParentId,
    SiblingPos,
    MaxDepth,
    DocOrder,
    Attribute,
    AttributesMap,
}

/// A path reference to a node property: `<qualifier>.<axis>.<field>`, with
/// `axis` defaulting to `self` and `qualifier` defaulting to none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub axis: Axis,
    pub field_kind: FieldKind,
    /// Only set when `field_kind == Attribute`.
    pub attribute: Option<String>,
    /// Source/tag alias prefix, e.g. `div` in `div.attributes.class`.
    pub qualifier: Option<String>,
    pub span: Span,
}

impl Operand {
    pub fn new(axis: Axis, field_kind: FieldKind, span: Span) -> Self {
        Self {
            axis,
            field_kind,
            attribute: None,
            qualifier: None,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalarExpr {
    StringLit { value: String, span: Span },
    NumberLit { value: i64, span: Span },
    NullLit { span: Span },
    SelfRef { span: Span },
    Operand(Operand),
    FunctionCall {
        name: String,
        args: Vec<ScalarExpr>,
        span: Span,
    },
}

impl ScalarExpr {
    pub fn span(&self) -> Span {
        match self {
            ScalarExpr::StringLit { span, .. }
            | ScalarExpr::NumberLit { span, .. }
            | ScalarExpr::NullLit { span }
            | ScalarExpr::SelfRef { span }
            | ScalarExpr::FunctionCall { span, .. } => *span,
            ScalarExpr::Operand(operand) => operand.span,
        }
    }

    /// The legacy string mirror used to populate `CompareExpr::rhs_values`:
    /// only literals stringify, everything else is `None`.
    pub fn literal_string(&self) -> Option<String> {
        match self {
            ScalarExpr::StringLit { value, .. } => Some(value.clone()),
            ScalarExpr::NumberLit { value, .. } => Some(value.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Regex,
    Like,
    In,
    Contains,
    ContainsAll,
    ContainsAny,
    HasDirectText,
    IsNull,
    IsNotNull,
}

/// A comparison predicate. Carries both the structured `lhs_expr` tree and a
/// convenience mirror (`lhs` as a bare `Operand`, `rhs_values` as stringified
/// literals) so executors written against either shape work unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareExpr {
    pub lhs_expr: ScalarExpr,
    pub lhs: Option<Operand>,
    pub op: CompareOp,
    pub rhs_expr: Option<ScalarExpr>,
    pub rhs_expr_list: Vec<ScalarExpr>,
    pub rhs_values: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Compare(Box<CompareExpr>),
    Exists {
        axis: Axis,
        where_expr: Option<Box<Expr>>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Binary { span, .. } => *span,
            Expr::Compare(cmp) => cmp.span,
            Expr::Exists { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expr: ScalarExpr,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sink {
    Csv { path: String },
    Parquet { path: String },
    Json { path: String },
    Ndjson { path: String },
    List,
    Table,
}

/// Depth argument accepted by a SELECT-list `INNER_HTML`/`RAW_INNER_HTML`
/// item. Unlike the scalar-function form used inside expressions, the
/// select-list form only accepts a literal depth, never `MAX_DEPTH` — see
/// DESIGN.md for this resolved ambiguity.
pub type InnerHtmlDepth = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfidfStopwords {
    None,
    English,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregate {
    Count { tag: String },
    Summarize,
    Tfidf {
        tags: Vec<String>,
        all_tags: bool,
        top_terms: Option<u64>,
        min_df: Option<u64>,
        max_df: Option<u64>,
        stopwords: Option<TfidfStopwords>,
    },
}

/// The constrained expression sub-grammar accepted inside
/// `PROJECT(tag) AS (alias: expr, …)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectExpr {
    StringLit {
        value: String,
        span: Span,
    },
    NumberLit {
        value: i64,
        span: Span,
    },
    NullLit {
        span: Span,
    },
    AliasRef {
        name: String,
        span: Span,
    },
    Text {
        tag: String,
        where_expr: Option<Box<Expr>>,
        span: Span,
    },
    Attr {
        tag: String,
        attribute: String,
        where_expr: Option<Box<Expr>>,
        span: Span,
    },
    Coalesce {
        args: Vec<ProjectExpr>,
        span: Span,
    },
    /// Any other recognised function, including the synthesised
    /// `__CMP_EQ`/`__CMP_NE`/`__CMP_LT`/`__CMP_LE`/`__CMP_GT`/`__CMP_GE`/
    /// `__CMP_LIKE` comparison-chain calls the executor relies on.
    FunctionCall {
        name: String,
        args: Vec<ProjectExpr>,
        span: Span,
    },
}

impl ProjectExpr {
    pub fn span(&self) -> Span {
        match self {
            ProjectExpr::StringLit { span, .. }
            | ProjectExpr::NumberLit { span, .. }
            | ProjectExpr::NullLit { span }
            | ProjectExpr::AliasRef { span, .. }
            | ProjectExpr::Text { span, .. }
            | ProjectExpr::Attr { span, .. }
            | ProjectExpr::Coalesce { span, .. }
            | ProjectExpr::FunctionCall { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectField {
    pub alias: String,
    pub expr: ProjectExpr,
}

/// One item of a `SELECT` list. See SPEC_FULL.md §3 for the 10 kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectItem {
    Star {
        span: Span,
    },
    TagOnly {
        tag: String,
        span: Span,
    },
    Field {
        tag: String,
        field: String,
        span: Span,
    },
    TextFunction {
        tag: String,
        direct: bool,
        span: Span,
    },
    InnerHtmlFunction {
        tag: String,
        depth: Option<InnerHtmlDepth>,
        raw: bool,
        span: Span,
    },
    ScalarProjection {
        expr: ScalarExpr,
        alias: String,
        span: Span,
    },
    Aggregate {
        aggregate: Aggregate,
        span: Span,
    },
    Flatten {
        tag: String,
        depth: usize,
        aliases: Vec<String>,
        text_only: bool,
        span: Span,
    },
    Project {
        tag: String,
        fields: Vec<ProjectField>,
        span: Span,
    },
    Trim {
        inner: Box<SelectItem>,
        span: Span,
    },
}

impl SelectItem {
    pub fn span(&self) -> Span {
        match self {
            SelectItem::Star { span }
            | SelectItem::TagOnly { span, .. }
            | SelectItem::Field { span, .. }
            | SelectItem::TextFunction { span, .. }
            | SelectItem::InnerHtmlFunction { span, .. }
            | SelectItem::ScalarProjection { span, .. }
            | SelectItem::Aggregate { span, .. }
            | SelectItem::Flatten { span, .. }
            | SelectItem::Project { span, .. }
            | SelectItem::Trim { span, .. } => *span,
        }
    }

    /// Whether this item participates in the tag-only-vs-field-projection
    /// mixing rule as a "field" item (kinds 3-10 of the data model).
    pub fn is_field_projection(&self) -> bool {
        !matches!(self, SelectItem::Star { .. } | SelectItem::TagOnly { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FragmentsInner {
    Raw(String),
    Query(Box<Query>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseInner {
    Expr(Box<ScalarExpr>),
    Query(Box<Query>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    Document,
    Path { value: String },
    Url { value: String },
    RawHtml { value: String },
    Fragments { inner: FragmentsInner },
    Parse { inner: ParseInner },
    CteRef { name: String },
    DerivedSubquery { query: Box<Query> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub kind: SourceKind,
    pub alias: Option<String>,
    pub span: Span,
}

/// The root AST node produced by [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub ctes: Vec<(String, Query)>,
    pub select_items: Vec<SelectItem>,
    pub select_star_excludes: Vec<String>,
    pub source: Option<Source>,
    pub where_expr: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub sink: Option<Sink>,
    pub span: Span,
}

impl Query {
    pub fn empty(span: Span) -> Self {
        Self {
            ctes: Vec::new(),
            select_items: Vec::new(),
            select_star_excludes: Vec::new(),
            source: None,
            where_expr: None,
            order_by: Vec::new(),
            limit: None,
            sink: None,
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestStrategy {
    None,
    Project,
    Flatten,
}

/// A complete, ready-to-run MarkQL statement proposed by the suggestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedStatement {
    pub strategy: SuggestStrategy,
    pub confidence: u8,
    pub reason: String,
    pub statement: String,
}

impl SuggestedStatement {
    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            strategy: SuggestStrategy::None,
            confidence: 0,
            reason: reason.into(),
            statement: String::new(),
        }
    }
}
