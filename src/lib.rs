//! MarkQL query language front-end: lexer, parser, expression model, and
//! statement suggestor.
//!
//! This crate turns MarkQL source text into a typed [`ast::Query`] a
//! downstream executor can plan against, and separately turns a parsed HTML
//! document plus a selected node into a ready-to-run statement suggestion.
//! Loading HTML, executing a `Query` against a tree, and rendering output
//! are all collaborators outside this crate's scope.

pub mod ast;
pub mod config;
pub mod cursor;
pub mod error;
pub mod html;
pub mod lexer;
mod parser;
pub mod span;
pub mod suggestor;
pub mod token;

pub use ast::Query;
pub use config::ParserConfig;
pub use error::{Diagnostic, Severity};
pub use html::{HtmlDocument, Node};

/// Parses `source` into a [`Query`], or the single diagnostic describing why
/// it failed. Pure and single-threaded: no I/O, no partial results.
///
/// Equivalent to [`parse_with_config`] with [`ParserConfig::default`].
pub fn parse(source: &str) -> Result<Query, Diagnostic> {
    parse_with_config(source, ParserConfig::default())
}

/// Same as [`parse`], but with an explicit [`ParserConfig`] rather than the
/// default toggles.
pub fn parse_with_config(source: &str, config: ParserConfig) -> Result<Query, Diagnostic> {
    let span = tracing::debug_span!("parse", len = source.len());
    let _enter = span.enter();
    if let Some(offset) = repl_command_offset(source) {
        let diagnostic = Diagnostic {
            message: "REPL command lines are not parsed by this crate".to_string(),
            span: span::Span::point(offset),
            severity: Severity::Error,
        };
        tracing::warn!(message = diagnostic.message.as_str(), "parse failed");
        return Err(diagnostic);
    }
    parser::parse_source_text(source, config).map_err(|err| {
        tracing::warn!(message = err.message(), "parse failed");
        Diagnostic::from_parse_error(source, &err)
    })
}

/// Runs the parser purely for diagnostics: empty on success, exactly one
/// entry on failure. Never panics, never partially recovers.
///
/// Equivalent to [`lint_with_config`] with [`ParserConfig::default`].
pub fn lint(source: &str) -> Vec<Diagnostic> {
    lint_with_config(source, ParserConfig::default())
}

/// Same as [`lint`], but with an explicit [`ParserConfig`]. When
/// [`ParserConfig::skip_repl_commands_in_lint`] is set and `source` is a REPL
/// command line, returns an empty diagnostic list rather than flagging it.
pub fn lint_with_config(source: &str, config: ParserConfig) -> Vec<Diagnostic> {
    if config.skip_repl_commands_in_lint && repl_command_offset(source).is_some() {
        return Vec::new();
    }
    match parse_with_config(source, config) {
        Ok(_) => Vec::new(),
        Err(diagnostic) => vec![diagnostic],
    }
}

/// The byte offset of the first non-whitespace character, if `source` is a
/// REPL command line (starts with `.` or `:`) rather than MarkQL.
fn repl_command_offset(source: &str) -> Option<usize> {
    let trimmed_start = source.len() - source.trim_start().len();
    let first = source[trimmed_start..].chars().next()?;
    (first == '.' || first == ':').then_some(trimmed_start)
}

/// Suggests a concrete MarkQL statement for `selected_node_id` within `doc`.
pub fn suggest(doc: &HtmlDocument, selected_node_id: i64) -> ast::SuggestedStatement {
    suggestor::suggest(doc, selected_node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Axis, CompareOp, Expr, FieldKind, SelectItem, SourceKind};
    use proptest::prelude::*;

    #[test]
    fn parses_simple_projection_with_contains() {
        let query = parse("SELECT div FROM doc WHERE attributes.class CONTAINS 'card'").unwrap();
        assert_eq!(query.select_items.len(), 1);
        assert!(matches!(&query.select_items[0], SelectItem::TagOnly { tag, .. } if tag == "div"));
        assert!(matches!(&query.source.as_ref().unwrap().kind, SourceKind::Document));
        assert_eq!(query.source.as_ref().unwrap().alias.as_deref(), Some("doc"));
        let where_expr = query.where_expr.unwrap();
        let Expr::Compare(cmp) = where_expr else { panic!("expected compare") };
        assert_eq!(cmp.op, CompareOp::Contains);
        assert_eq!(cmp.rhs_values, vec!["card".to_string()]);
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.field_kind, FieldKind::Attribute);
        assert_eq!(lhs.attribute.as_deref(), Some("class"));
    }

    #[test]
    fn table_keyword_is_legal_as_select_tag() {
        let query = parse("SELECT table FROM doc").unwrap();
        assert_eq!(query.select_items.len(), 1);
        assert!(matches!(&query.select_items[0], SelectItem::TagOnly { tag, .. } if tag == "table"));
    }

    #[test]
    fn exists_with_descendant_axis_and_self_node_id() {
        let query = parse(
            "SELECT self.node_id, TEXT(a) FROM doc WHERE EXISTS(descendant WHERE tag = 'img')",
        )
        .unwrap();
        assert_eq!(query.select_items.len(), 2);
        let Expr::Exists { axis, where_expr, .. } = query.where_expr.unwrap() else {
            panic!("expected exists")
        };
        assert_eq!(axis, Axis::Descendant);
        let Expr::Compare(cmp) = *where_expr.unwrap() else { panic!("expected compare") };
        assert_eq!(cmp.lhs.unwrap().field_kind, FieldKind::Tag);
    }

    #[test]
    fn count_star_aggregate() {
        let query = parse("SELECT COUNT(*) FROM doc").unwrap();
        assert_eq!(query.select_items.len(), 1);
        match &query.select_items[0] {
            SelectItem::Aggregate {
                aggregate: ast::Aggregate::Count { tag },
                ..
            } => assert_eq!(tag, "*"),
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn project_with_two_aliases() {
        let query = parse("SELECT PROJECT(li) AS (t: TEXT(h2), u: ATTR(a, href)) FROM doc").unwrap();
        match &query.select_items[0] {
            SelectItem::Project { tag, fields, .. } => {
                assert_eq!(tag, "li");
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].alias, "t");
                assert!(matches!(fields[0].expr, ast::ProjectExpr::Text { .. }));
                assert_eq!(fields[1].alias, "u");
                assert!(matches!(fields[1].expr, ast::ProjectExpr::Attr { .. }));
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn lint_on_trailing_where_reports_offset_at_end() {
        let source = "SELECT * FROM doc WHERE";
        let diagnostics = lint(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span.begin, source.len());
    }

    #[test]
    fn select_star_with_exclude_list_preserves_duplicates() {
        let query = parse("SELECT * EXCLUDE (a, a) FROM doc").unwrap();
        assert_eq!(query.select_star_excludes, vec!["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn mixed_tag_only_and_field_projection_is_rejected() {
        let err = lint("SELECT div, a.href FROM doc");
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn star_combined_with_a_field_projection_is_allowed() {
        // Only a tag-only item (e.g. `div`) conflicts with a field
        // projection; `*` itself is not tag-only and may be combined.
        let query = parse("SELECT *, TEXT(a) FROM doc").unwrap();
        assert_eq!(query.select_items.len(), 2);
        assert!(matches!(&query.select_items[0], SelectItem::Star { .. }));
    }

    #[test]
    fn diagnostic_json_shape_matches_wire_format() {
        let source = "SELECT * FROM doc WHERE";
        let diagnostics = lint(source);
        let json = diagnostics[0].to_json(source);
        assert_eq!(json["severity"], "error");
        assert_eq!(json["offset"], source.len());
        assert!(json["message"].as_str().unwrap().contains("expression") || json["message"].as_str().unwrap().contains("operand"));
    }

    #[test]
    fn lint_skips_repl_command_lines_by_default() {
        assert!(lint(".help").is_empty());
        assert!(lint(":quit").is_empty());
    }

    #[test]
    fn parse_rejects_repl_command_lines() {
        let err = parse(".help").unwrap_err();
        assert_eq!(err.span.begin, 0);
    }

    #[test]
    fn lint_with_config_can_disable_repl_command_skipping() {
        let config = ParserConfig {
            skip_repl_commands_in_lint: false,
            ..ParserConfig::default()
        };
        let diagnostics = lint_with_config(".help", config);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn determinism_parsing_the_same_source_twice_yields_equal_asts() {
        let source = "SELECT div, a.href FROM doc WHERE attributes.class CONTAINS 'card' ORDER BY a.href DESC LIMIT 10";
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }

    #[test]
    fn query_round_trips_through_serde_json() {
        let query = parse("SELECT PROJECT(li) AS (t: TEXT(h2)) FROM doc WHERE tag = 'li'").unwrap();
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(query, back);
    }

    proptest::proptest! {
        #[test]
        fn spans_are_always_in_bounds_for_arbitrary_tag_names(
            tag in "[a-z][a-z0-9_]{0,8}",
            attr in "[a-z][a-z0-9_]{0,8}",
            value in "[a-zA-Z0-9 ]{0,12}",
        ) {
            let source = format!("SELECT {tag} FROM doc WHERE attributes.{attr} = '{value}'");
            if let Ok(query) = parse(&source) {
                prop_assert!(query.span.begin <= query.span.end);
                prop_assert!(query.span.end <= source.len());
                if let Some(where_expr) = &query.where_expr {
                    let span = where_expr.span();
                    prop_assert!(span.begin <= span.end);
                    prop_assert!(span.end <= source.len());
                }
            }
        }

        #[test]
        fn parsing_is_deterministic_for_arbitrary_limit_values(limit in 0u64..1_000_000) {
            let source = format!("SELECT * FROM doc LIMIT {limit}");
            let first = parse(&source);
            let second = parse(&source);
            prop_assert_eq!(first.is_ok(), second.is_ok());
            if let (Ok(a), Ok(b)) = (first, second) {
                prop_assert_eq!(a.limit, Some(limit));
                prop_assert_eq!(b.limit, Some(limit));
            }
        }
    }
}
