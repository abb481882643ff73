use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::location::{location_key, TOP_LEVEL_MEMBER};

/// One syntactic occurrence of the marker macro.
///
/// Two occurrences with identical fields are the same call site, which is
/// what lets the collector gather them into a `HashSet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Source file as seen by the scanner
    pub file: PathBuf,
    /// Nearest enclosing fn, or `TOP_LEVEL_MEMBER`
    pub enclosing_member: String,
    /// 1-based line reported by `line!()` at this call site
    pub line: u32,
}

impl CallSite {
    pub fn new(file: impl Into<PathBuf>, enclosing_member: Option<&str>, line: u32) -> Self {
        Self {
            file: file.into(),
            enclosing_member: enclosing_member.unwrap_or(TOP_LEVEL_MEMBER).to_string(),
            line,
        }
    }

    /// Canonical `<fileStem>.<member>:L<line>` key
    pub fn location_key(&self) -> String {
        location_key(&self.file.to_string_lossy(), &self.enclosing_member, self.line)
    }
}
