//! `build.rs` integration.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     if let Err(e) = libcalltag_core::build_script::run() {
//!         panic!("calltag: {e}");
//!     }
//! }
//! ```
//!
//! The crate then includes the table at its root, before any `mod` items:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/calltag_generated.rs"));
//! ```

use std::path::{Path, PathBuf};

use crate::config::{load_config, GeneratorConfig};
use crate::error::CallTagError;
use crate::generator::{write_generated, Compilation, Generator, WriteOutcome};

/// Outcome of a build-script pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Generated file path, or `None` when the tagging library is not referenced
    pub output: Option<PathBuf>,
    /// Files cargo should watch
    pub rerun_if_changed: Vec<PathBuf>,
}

/// Generate for the crate cargo is currently building.
///
/// Reads `CARGO_MANIFEST_DIR`, writes into `OUT_DIR` unless `calltag.toml`
/// sets an output path, and prints the `cargo:rerun-if-changed` lines.
pub fn run() -> Result<BuildOutput, CallTagError> {
    let root = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| CallTagError::InvalidArgs("CARGO_MANIFEST_DIR is not set; run from build.rs".to_string()))?;

    let output = run_for(&root)?;
    for path in &output.rerun_if_changed {
        println!("cargo:rerun-if-changed={}", path.display());
    }
    Ok(output)
}

/// Generate for the crate at `root` without touching cargo's stdout protocol
pub fn run_for(root: &Path) -> Result<BuildOutput, CallTagError> {
    let config = load_config(root)?.unwrap_or_default();
    let compilation = Compilation::load(root, &config)?;
    let rerun_if_changed = watched_paths(root, &config, &compilation);

    let output = match Generator::new().run(&compilation)? {
        Some(source) => {
            let path = config.output_path(root);
            if write_generated(&path, &source)? == WriteOutcome::Unchanged {
                tracing::debug!(path = %path.display(), "dispatch table up to date");
            }
            Some(path)
        }
        None => None,
    };

    Ok(BuildOutput {
        output,
        rerun_if_changed,
    })
}

/// Scanned files, the manifest, the config, and the source roots themselves
/// so that added files also trigger a rerun
fn watched_paths(root: &Path, config: &GeneratorConfig, compilation: &Compilation) -> Vec<PathBuf> {
    let mut paths = compilation.input_paths();
    for source_root in &config.source_roots {
        let dir = root.join(source_root);
        if dir.is_dir() {
            paths.push(dir);
        }
    }
    paths.sort();
    paths.dedup();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    const MANIFEST: &str = r#"[package]
name = "shop"
version = "0.1.0"

[dependencies]
libcalltag-core = { version = "0.1", default-features = false }
"#;

    #[test]
    fn test_run_for_writes_configured_output() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "Cargo.toml", MANIFEST);
        write(root, "calltag.toml", "output = \"gen/calltag_generated.rs\"\n");
        write(root, "src/orders.rs", "pub fn list() {\n    tag_with_call_site_hash!(q);\n}\n");

        let output = run_for(root).unwrap();
        let path = root.join("gen/calltag_generated.rs");
        assert_eq!(output.output, Some(path.clone()));

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\"orders.list:L2\""));
        assert!(output.rerun_if_changed.contains(&root.join("src/orders.rs")));
        assert!(output.rerun_if_changed.contains(&root.join("calltag.toml")));
        assert!(output.rerun_if_changed.contains(&root.join("src")));
    }

    #[test]
    fn test_run_for_without_library_writes_nothing() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "Cargo.toml", "[package]\nname = \"plain\"\nversion = \"0.1.0\"\n");
        write(root, "calltag.toml", "output = \"gen/calltag_generated.rs\"\n");
        write(root, "src/lib.rs", "pub fn f() { tag_with_call_site_hash!(q); }\n");

        let output = run_for(root).unwrap();
        assert!(output.output.is_none());
        assert!(!root.join("gen").exists());
        assert!(output.rerun_if_changed.contains(&root.join("Cargo.toml")));
    }
}
