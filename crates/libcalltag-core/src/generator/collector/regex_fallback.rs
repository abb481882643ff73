use regex::Regex;

use super::RawSite;
use crate::location::normalize_member;
use crate::MARKER_NAME;

#[derive(Debug)]
enum Event {
    FnDecl(String),
    Marker,
    Open,
    Close,
    Semi,
}

/// Line-oriented marker collection (fallback when tree-sitter is unavailable).
///
/// Tracks `fn` bodies by brace depth. Braces inside strings and comments
/// other than `//` are not understood, and nested markers report their own
/// line rather than the outer macro's.
pub(crate) fn collect(content: &str) -> Vec<RawSite> {
    let Ok(fn_re) = Regex::new(r"\bfn\s+((?:r#)?[A-Za-z_][A-Za-z0-9_]*)") else {
        return Vec::new();
    };
    let Ok(marker_re) = Regex::new(&format!(r"\b{}\s*!", MARKER_NAME)) else {
        return Vec::new();
    };

    let mut sites = Vec::new();
    // (fn name, brace depth of its body)
    let mut stack: Vec<(String, usize)> = Vec::new();
    let mut pending_fn: Option<String> = None;
    let mut depth = 0usize;

    for (idx, raw_line) in content.lines().enumerate() {
        let line = match raw_line.find("//") {
            Some(comment) => &raw_line[..comment],
            None => raw_line,
        };

        let mut events: Vec<(usize, Event)> = Vec::new();
        for caps in fn_re.captures_iter(line) {
            if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
                events.push((whole.start(), Event::FnDecl(normalize_member(name.as_str()).to_string())));
            }
        }
        for m in marker_re.find_iter(line) {
            events.push((m.start(), Event::Marker));
        }
        for (col, ch) in line.char_indices() {
            match ch {
                '{' => events.push((col, Event::Open)),
                '}' => events.push((col, Event::Close)),
                ';' => events.push((col, Event::Semi)),
                _ => {}
            }
        }
        events.sort_by_key(|(col, _)| *col);

        for (_, event) in events {
            match event {
                Event::FnDecl(name) => pending_fn = Some(name),
                Event::Open => {
                    depth += 1;
                    if let Some(name) = pending_fn.take() {
                        stack.push((name, depth));
                    }
                }
                Event::Close => {
                    if stack.last().is_some_and(|(_, d)| *d == depth) {
                        stack.pop();
                    }
                    depth = depth.saturating_sub(1);
                }
                // A bodiless signature (trait method, extern fn)
                Event::Semi => pending_fn = None,
                Event::Marker => sites.push(RawSite {
                    member: stack.last().map(|(name, _)| name.clone()),
                    line: idx as u32 + 1,
                }),
            }
        }
    }

    sites
}
