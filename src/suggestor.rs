//! Deterministic heuristic: parsed HTML tree + selected node → a ready-to-run
//! MarkQL statement.
//!
//! Every tie-break is fixed (no hash-map iteration order, no floating point)
//! so the same input always produces the same suggestion.

use std::collections::HashMap;

use crate::ast::{SuggestStrategy, SuggestedStatement};
use crate::html::{HtmlDocument, Node};

struct ChildIndex {
    children_by_parent: HashMap<i64, Vec<i64>>,
    roots: Vec<i64>,
}

fn build_children_index(doc: &HtmlDocument) -> ChildIndex {
    let mut children_by_parent: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut roots = Vec::new();
    for node in &doc.nodes {
        match node.parent_id {
            Some(parent) if doc.get(parent).is_some() => {
                children_by_parent.entry(parent).or_default().push(node.id);
            }
            _ => roots.push(node.id),
        }
    }
    ChildIndex {
        children_by_parent,
        roots,
    }
}

fn ancestor_chain(doc: &HtmlDocument, node_id: i64) -> Vec<i64> {
    let mut chain = Vec::new();
    let mut current = Some(node_id);
    let mut visited = std::collections::HashSet::new();
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        chain.push(id);
        current = doc.get(id).and_then(|n| n.parent_id);
    }
    chain
}

fn is_valid_markql_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn first_class_token(node: &Node) -> Option<String> {
    node.attributes
        .get("class")
        .and_then(|classes| classes.split_whitespace().next())
        .map(|s| s.to_string())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

fn is_title_like(node: &Node) -> bool {
    const TITLE_TAGS: &[&str] = &["h1", "h2", "h3", "th", "strong", "b"];
    if TITLE_TAGS.iter().any(|t| node.tag.eq_ignore_ascii_case(t)) {
        return true;
    }
    if let Some(class) = first_class_token(node) {
        if contains_ci(&class, "title") || contains_ci(&class, "header") || contains_ci(&class, "name") {
            return true;
        }
    }
    !node.text.trim().is_empty()
}

/// Allocates `base`, `base_2`, `base_3`, … skipping any already taken.
struct UniqueNames {
    taken: std::collections::HashSet<String>,
}

impl UniqueNames {
    fn new() -> Self {
        Self {
            taken: std::collections::HashSet::new(),
        }
    }

    fn allocate(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

struct RowCandidate {
    node_id: i64,
    tag: String,
    repeated_rows: usize,
}

fn find_row(doc: &HtmlDocument, index: &ChildIndex, selected_id: i64) -> RowCandidate {
    let chain = ancestor_chain(doc, selected_id);
    for &candidate_id in &chain {
        let Some(candidate) = doc.get(candidate_id) else { continue };
        let siblings: Vec<i64> = match candidate.parent_id {
            Some(parent) if index.children_by_parent.contains_key(&parent) => {
                index.children_by_parent[&parent].clone()
            }
            _ => index.roots.clone(),
        };
        let same_tag_count = siblings
            .iter()
            .filter_map(|id| doc.get(*id))
            .filter(|n| n.tag.eq_ignore_ascii_case(&candidate.tag))
            .count();
        if same_tag_count >= 2 {
            return RowCandidate {
                node_id: candidate_id,
                tag: candidate.tag.clone(),
                repeated_rows: same_tag_count,
            };
        }
    }
    let selected = doc.get(selected_id);
    RowCandidate {
        node_id: selected_id,
        tag: selected.map(|n| n.tag.clone()).unwrap_or_default(),
        repeated_rows: 1,
    }
}

struct WhereClause {
    text: String,
    /// Whether `row` carries any (non-empty) class token at all — drives the
    /// confidence bonus regardless of whether the token was long enough to
    /// make it into the WHERE clause itself.
    has_class_token: bool,
}

fn build_where_clause(row: &Node) -> WhereClause {
    let mut clauses = vec![format!("tag = {}", sql_quote(&row.tag))];
    let class_token = first_class_token(row);
    if let Some(token) = &class_token {
        if token.len() >= 3 {
            clauses.push(format!("attributes.class CONTAINS {}", sql_quote(token)));
        } else if let Some(id) = row.attributes.get("id") {
            clauses.push(format!("attributes.id = {}", sql_quote(id)));
        }
    } else if let Some(id) = row.attributes.get("id") {
        clauses.push(format!("attributes.id = {}", sql_quote(id)));
    }
    WhereClause {
        text: clauses.join(" AND "),
        has_class_token: class_token.is_some(),
    }
}

struct Field {
    alias: String,
    expr: String,
}

fn extract_fields(doc: &HtmlDocument, index: &ChildIndex, row: &Node, selected: &Node) -> (Vec<Field>, bool) {
    let mut names = UniqueNames::new();
    let mut fields = Vec::new();
    // Confidence keys on the id attribute merely existing; the `<tag>_id`
    // field itself still requires a valid tag to build `ATTR(<tag>, id)`.
    let has_selected_id = selected.attributes.contains_key("id");

    if has_selected_id && is_valid_markql_identifier(&selected.tag) {
        fields.push(Field {
            alias: names.allocate(&format!("{}_id", selected.tag)),
            expr: format!("ATTR({}, id)", selected.tag),
        });
    }

    let title_carrier = if is_title_like(selected) {
        Some((selected.tag.clone(), first_class_token(selected)))
    } else {
        index
            .children_by_parent
            .get(&row.id)
            .into_iter()
            .flatten()
            .filter_map(|id| doc.get(*id))
            .find(|n| is_title_like(n))
            .map(|n| (n.tag.clone(), first_class_token(n)))
    };
    if let Some((tag, class)) = title_carrier {
        let expr = match class {
            Some(c) if c.len() >= 3 => format!("TEXT({tag} WHERE attributes.class CONTAINS {})", sql_quote(&c)),
            _ => format!("TEXT({tag})"),
        };
        fields.push(Field {
            alias: names.allocate("title"),
            expr,
        });
    }

    if let Some(anchor) = bounded_find_anchor(doc, index, row.id) {
        fields.push(Field {
            alias: names.allocate("link_text"),
            expr: "TEXT(a)".to_string(),
        });
        fields.push(Field {
            alias: names.allocate("link_href"),
            expr: "ATTR(a, href)".to_string(),
        });
        let _ = anchor;
    }

    if fields.is_empty() {
        fields.push(Field {
            alias: names.allocate("content"),
            expr: "TEXT(self)".to_string(),
        });
    }

    (fields, has_selected_id)
}

/// Bounded breadth-first search from `root_id`, budgeted at `2 * |nodes|`
/// steps to guarantee termination even on a malformed (cyclic) parent graph.
fn bounded_find_anchor(doc: &HtmlDocument, index: &ChildIndex, root_id: i64) -> Option<i64> {
    let budget = 2 * doc.nodes.len().max(1);
    let mut queue = std::collections::VecDeque::new();
    let mut visited = std::collections::HashSet::new();
    queue.push_back(root_id);
    let mut steps = 0;
    while let Some(id) = queue.pop_front() {
        if steps >= budget {
            return None;
        }
        steps += 1;
        if !visited.insert(id) {
            continue;
        }
        if let Some(node) = doc.get(id) {
            if node.tag.eq_ignore_ascii_case("a") && id != root_id {
                return Some(id);
            }
        }
        if let Some(children) = index.children_by_parent.get(&id) {
            for &child in children {
                queue.push_back(child);
            }
        }
    }
    None
}

/// Produces a concrete MarkQL statement for `selected_node_id`, or a
/// `strategy = None` result (never a failure) when the document is empty or
/// the id does not resolve.
pub fn suggest(doc: &HtmlDocument, selected_node_id: i64) -> SuggestedStatement {
    let span = tracing::debug_span!("suggest", selected_node_id);
    let _enter = span.enter();

    if doc.nodes.is_empty() {
        return SuggestedStatement::none("document has no nodes");
    }
    let Some(selected) = doc.get(selected_node_id) else {
        return SuggestedStatement::none("selected node id does not resolve");
    };

    let index = build_children_index(doc);
    let row_candidate = find_row(doc, &index, selected_node_id);
    let Some(row) = doc.get(row_candidate.node_id) else {
        return SuggestedStatement::none("row candidate did not resolve");
    };

    let where_clause = build_where_clause(row);
    let (fields, has_selected_id) = extract_fields(doc, &index, row, selected);

    let row_tag_valid = is_valid_markql_identifier(&row_candidate.tag);
    let use_project = row_tag_valid && row_candidate.repeated_rows >= 2 && fields.len() >= 2;

    let mut confidence: i32 = 35;
    if row_candidate.repeated_rows >= 2 {
        confidence += 25;
    }
    if fields.len() >= 2 {
        confidence += 20;
    }
    if where_clause.has_class_token {
        confidence += 10;
    }
    if has_selected_id {
        confidence += 10;
    }
    confidence = confidence.min(95);

    let (strategy, statement, reason) = if use_project {
        let field_list = fields
            .iter()
            .map(|f| format!("{}: {}", f.alias, f.expr))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "SELECT PROJECT({tag}) AS ({field_list}) FROM doc WHERE {where_clause}",
            tag = row_candidate.tag,
            where_clause = where_clause.text,
        );
        (
            SuggestStrategy::Project,
            statement,
            format!("found {} repeated rows of tag '{}'", row_candidate.repeated_rows, row_candidate.tag),
        )
    } else {
        confidence = (confidence - 10).max(10);
        let statement = if row_tag_valid {
            format!("SELECT FLATTEN({}, 2) AS (flat_text) FROM doc WHERE {}", row_candidate.tag, where_clause.text)
        } else {
            "SELECT TEXT(self) AS text FROM doc".to_string()
        };
        (SuggestStrategy::Flatten, statement, "no reliable repeated row pattern found".to_string())
    };

    SuggestedStatement {
        strategy,
        confidence: confidence.clamp(0, 100) as u8,
        reason,
        statement,
    }
}
