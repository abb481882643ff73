use crate::generator::compilation::{Compilation, TypeRef};
use crate::EXTENSION_POINT;

/// What the pipeline knows about the tagging library in this compilation.
///
/// An absent extension point switches generation off; that is a normal
/// outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationContext {
    pub tagging_extension: Option<TypeRef>,
}

impl CompilationContext {
    pub fn is_enabled(&self) -> bool {
        self.tagging_extension.is_some()
    }

    /// Crate path the generated code uses to reach the tagging library
    pub fn crate_path(&self) -> Option<&str> {
        self.tagging_extension.as_ref().map(|t| t.crate_name.as_str())
    }
}

/// Look up the tagging extension point in the compilation
pub fn load_context(compilation: &Compilation) -> CompilationContext {
    CompilationContext {
        tagging_extension: compilation.resolve_type(EXTENSION_POINT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_when_library_referenced() {
        let compilation = Compilation::new(Vec::new()).with_reference("libcalltag-core", None);
        let context = load_context(&compilation);
        assert!(context.is_enabled());
        assert_eq!(context.crate_path(), Some("libcalltag_core"));
    }

    #[test]
    fn test_disabled_without_library() {
        let compilation = Compilation::new(Vec::new()).with_reference("sqlx", None);
        let context = load_context(&compilation);
        assert!(!context.is_enabled());
        assert_eq!(context, CompilationContext::default());
    }
}
