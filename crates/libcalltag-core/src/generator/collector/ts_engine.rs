use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};
use tree_sitter_language::LanguageFn;

use super::RawSite;
use crate::location::normalize_member;
use crate::MARKER_NAME;

/// Direct invocations (plain or path-qualified), then identifiers inside
/// token trees, which is where markers nested in other macros' arguments
/// end up.
const MARKER_QUERY: &str = r#"
(macro_invocation
  macro: (identifier) @name) @call
(macro_invocation
  macro: (scoped_identifier name: (identifier) @name)) @call
(token_tree
  (identifier) @name) @call
"#;

const TOKEN_TREE_PATTERN: usize = 2;

/// Grammar used for every scanned file
const RUST_GRAMMAR: LanguageFn = tree_sitter_rust::LANGUAGE;

/// Attempt tree-sitter-based marker collection.
/// Returns None if the grammar cannot be loaded or parsing fails (triggers regex fallback).
pub(crate) fn collect(content: &str) -> Option<Vec<RawSite>> {
    let lang: Language = Language::from(RUST_GRAMMAR);

    let mut parser = Parser::new();
    parser.set_language(&lang).ok()?;

    let tree = parser.parse(content, None)?;
    let query = Query::new(&lang, MARKER_QUERY).ok()?;

    let name_idx = query.capture_index_for_name("name")?;
    let call_idx = query.capture_index_for_name("call")?;

    let mut cursor = QueryCursor::new();
    let mut sites = Vec::new();

    let mut matches = cursor.matches(&query, tree.root_node(), content.as_bytes());
    while let Some(m) = matches.next() {
        let mut name: Option<Node> = None;
        let mut call: Option<Node> = None;

        for capture in m.captures {
            if capture.index == name_idx {
                name = Some(capture.node);
            } else if capture.index == call_idx {
                call = Some(capture.node);
            }
        }

        let Some(name) = name else { continue };
        if call.is_none() || node_text(name, content) != Some(MARKER_NAME) {
            continue;
        }
        if m.pattern_index == TOKEN_TREE_PATTERN && !is_bang_invocation(name, content) {
            continue;
        }
        // Bodies of macro_rules! are templates, not call sites
        if has_ancestor(name, "macro_definition") {
            continue;
        }

        sites.push(RawSite {
            member: enclosing_fn(name, content),
            line: reported_line(name),
        });
    }

    Some(sites)
}

/// `name ! (...)` inside a token tree
fn is_bang_invocation(name: Node, content: &str) -> bool {
    let Some(bang) = name.next_sibling() else {
        return false;
    };
    if node_text(bang, content) != Some("!") {
        return false;
    }
    bang.next_sibling().is_some_and(|args| args.kind() == "token_tree")
}

/// Line `line!()` reports for this marker: the first line of the outermost
/// macro invocation containing it, or the marker's own line outside any.
fn reported_line(name: Node) -> u32 {
    let mut outermost = name;
    let mut current = name.parent();
    while let Some(node) = current {
        if node.kind() == "macro_invocation" {
            outermost = node;
        }
        current = node.parent();
    }
    outermost.start_position().row as u32 + 1
}

/// Name of the nearest enclosing `fn` item; closures are transparent
fn enclosing_fn(node: Node, content: &str) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "function_item" {
            let name = parent.child_by_field_name("name")?;
            return node_text(name, content).map(|n| normalize_member(n).to_string());
        }
        current = parent.parent();
    }
    None
}

fn has_ancestor(node: Node, kind: &str) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == kind {
            return true;
        }
        current = parent.parent();
    }
    false
}

fn node_text<'a>(node: Node, content: &'a str) -> Option<&'a str> {
    content.get(node.start_byte()..node.end_byte())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(content: &str) -> Vec<(Option<String>, u32)> {
        let mut found: Vec<_> = collect(content)
            .unwrap()
            .into_iter()
            .map(|s| (s.member, s.line))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_grammar_loads() {
        let lang = Language::from(RUST_GRAMMAR);
        let mut parser = Parser::new();
        assert!(parser.set_language(&lang).is_ok());
        assert!(Query::new(&lang, MARKER_QUERY).is_ok());
    }

    #[test]
    fn test_direct_invocation() {
        let content = r#"fn load(db: &Db) {
    let q = db.products();
    let q = tag_with_call_site_hash!(q);
    db.run(q);
}
"#;
        assert_eq!(sites(content), vec![(Some("load".to_string()), 3)]);
    }

    #[test]
    fn test_path_qualified_invocation() {
        let content = "fn load() {\n    crate::tag_with_call_site_hash!(q);\n}\n";
        assert_eq!(sites(content), vec![(Some("load".to_string()), 2)]);
    }

    #[test]
    fn test_other_macros_ignored() {
        let content = "fn load() {\n    tag_with!(q);\n    tag_with_call_site_hash(q);\n    x.tag_with_call_site_hash();\n}\n";
        assert!(sites(content).is_empty());
    }

    #[test]
    fn test_method_in_impl() {
        let content = r#"struct Repo;

impl Repo {
    pub fn products(&self) -> String {
        tag_with_call_site_hash!(String::from("SELECT 1"))
    }
}
"#;
        assert_eq!(sites(content), vec![(Some("products".to_string()), 5)]);
    }

    #[test]
    fn test_closure_is_transparent() {
        let content = r#"fn run() {
    let f = |q: String| {
        tag_with_call_site_hash!(q)
    };
}
"#;
        assert_eq!(sites(content), vec![(Some("run".to_string()), 3)]);
    }

    #[test]
    fn test_nearest_nested_fn_wins() {
        let content = r#"fn outer() {
    fn inner() {
        tag_with_call_site_hash!(q);
    }
}
"#;
        assert_eq!(sites(content), vec![(Some("inner".to_string()), 3)]);
    }

    #[test]
    fn test_raw_identifier_normalized() {
        let content = "fn r#match() {\n    tag_with_call_site_hash!(q);\n}\n";
        assert_eq!(sites(content), vec![(Some("match".to_string()), 2)]);
    }

    #[test]
    fn test_outside_fn_has_no_member() {
        let content = "static Q: &str = tag_with_call_site_hash!(\"SELECT 1\");\n";
        assert_eq!(sites(content), vec![(None, 1)]);
    }

    #[test]
    fn test_multiline_invocation_reports_first_line() {
        let content = r#"fn load() {
    let q = tag_with_call_site_hash!(
        db.products()
    );
}
"#;
        assert_eq!(sites(content), vec![(Some("load".to_string()), 2)]);
    }

    #[test]
    fn test_nested_in_other_macro_reports_outer_line() {
        let content = r#"fn report() {
    println!(
        "{}",
        tag_with_call_site_hash!(q)
    );
}
"#;
        assert_eq!(sites(content), vec![(Some("report".to_string()), 2)]);
    }

    #[test]
    fn test_macro_rules_body_skipped() {
        let content = r#"macro_rules! tagged {
    ($q:expr) => { tag_with_call_site_hash!($q) };
}
"#;
        assert!(sites(content).is_empty());
    }

    #[test]
    fn test_identifier_in_token_tree_without_bang_skipped() {
        let content = "fn f() {\n    println!(\"{}\", tag_with_call_site_hash);\n}\n";
        assert!(sites(content).is_empty());
    }

    #[test]
    fn test_broken_source_still_parses() {
        let content = "fn ok() {\n    tag_with_call_site_hash!(q);\n}\nfn broken( {\n";
        let found = sites(content);
        assert!(found.iter().any(|(_, line)| *line == 2), "got: {:?}", found);
    }
}
