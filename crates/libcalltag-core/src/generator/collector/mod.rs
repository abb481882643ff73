mod regex_fallback;
mod ts_engine;

use tracing::debug;

use crate::generator::compilation::SourceFile;
use crate::generator::emit::GENERATED_HEADER;
use crate::types::CallSite;

/// A marker occurrence before it is bound to its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawSite {
    pub member: Option<String>,
    pub line: u32,
}

/// Find every marker invocation in one file (tree-sitter, with regex fallback)
pub fn collect_file(file: &SourceFile) -> Vec<CallSite> {
    if file.text.starts_with(GENERATED_HEADER) {
        return Vec::new();
    }

    let raw = match ts_engine::collect(&file.text) {
        Some(sites) => sites,
        None => {
            debug!(path = %file.path.display(), "tree-sitter unavailable, using regex fallback");
            regex_fallback::collect(&file.text)
        }
    };

    raw.into_iter()
        .map(|site| CallSite::new(&file.path, site.member.as_deref(), site.line))
        .collect()
}
