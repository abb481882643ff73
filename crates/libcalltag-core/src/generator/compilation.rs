use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::CallTagError;

/// One Rust source file in the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the crate root when loaded from disk
    pub path: PathBuf,
    pub text: String,
}

/// A resolved fully qualified item, spelled the way the scanned crate names it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Path usable from the scanned crate, e.g. `calltag_rt::TagWith` under a rename
    pub path: String,
    /// Leading crate segment of `path`
    pub crate_name: String,
}

/// Immutable snapshot of one crate: its sources and the crates it references.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    root: PathBuf,
    /// Normalized package name -> name the crate uses in paths
    references: BTreeMap<String, String>,
    sources: Vec<SourceFile>,
    /// Files other than sources whose edits should trigger regeneration
    extra_inputs: Vec<PathBuf>,
}

fn normalize_crate_name(name: &str) -> String {
    name.replace('-', "_")
}

impl Compilation {
    pub fn new(sources: Vec<SourceFile>) -> Self {
        let mut compilation = Self {
            sources,
            ..Self::default()
        };
        compilation.scan_extern_crates();
        compilation
    }

    /// Record a referenced crate, optionally under a local alias
    pub fn with_reference(mut self, package: &str, alias: Option<&str>) -> Self {
        self.add_reference(package, alias);
        self
    }

    fn add_reference(&mut self, package: &str, alias: Option<&str>) {
        let package = normalize_crate_name(package);
        let alias = alias.map(normalize_crate_name).unwrap_or_else(|| package.clone());
        self.references.insert(package, alias);
    }

    /// Load a crate from disk: manifest dependencies plus every `.rs` file
    /// under the configured source roots.
    pub fn load(root: &Path, config: &GeneratorConfig) -> Result<Self, CallTagError> {
        if !root.is_dir() {
            return Err(CallTagError::NotFound(format!(
                "crate root '{}' does not exist",
                root.display()
            )));
        }

        let manifest_path = root.join(&config.manifest);
        if !manifest_path.exists() {
            return Err(CallTagError::NotFound(format!(
                "Cargo.toml not found at {}",
                manifest_path.display()
            )));
        }
        let manifest: toml::Table = toml::from_str(&std::fs::read_to_string(&manifest_path)?)?;

        let mut sources = Vec::new();
        for path in discover_sources(root, config)? {
            match std::fs::read_to_string(root.join(&path)) {
                Ok(text) => sources.push(SourceFile { path, text }),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable source file"),
            }
        }

        let mut compilation = Self::new(sources);
        compilation.root = root.to_path_buf();
        compilation.extra_inputs.push(manifest_path);
        let config_path = root.join(crate::config::CONFIG_FILE);
        if config_path.exists() {
            compilation.extra_inputs.push(config_path);
        }
        for (package, alias) in manifest_dependencies(&manifest) {
            compilation.add_reference(&package, alias.as_deref());
        }

        debug!(
            root = %root.display(),
            sources = compilation.sources.len(),
            references = compilation.references.len(),
            "compilation loaded"
        );
        Ok(compilation)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// Every on-disk input of this snapshot, for rerun-if-changed tracking
    pub fn input_paths(&self) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = self.sources.iter().map(|s| self.root.join(&s.path)).collect();
        inputs.extend(self.extra_inputs.iter().cloned());
        inputs
    }

    /// Names under which referenced crates can be used in paths
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.references.values().map(String::as_str)
    }

    /// Look up a fully qualified item such as `libcalltag_core::TagWith`.
    ///
    /// Resolution is crate-level: the item resolves when its leading crate
    /// is referenced, and comes back spelled with the crate's local alias.
    pub fn resolve_type(&self, path: &str) -> Option<TypeRef> {
        let path = path.trim_start_matches("::");
        let (krate, rest) = path.split_once("::")?;
        let alias = self.references.get(&normalize_crate_name(krate))?;
        Some(TypeRef {
            path: format!("{}::{}", alias, rest),
            crate_name: alias.clone(),
        })
    }

    /// `extern crate foo as bar;` items also reference crates
    fn scan_extern_crates(&mut self) {
        let Ok(extern_re) =
            Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?extern\s+crate\s+(\w+)(?:\s+as\s+(\w+))?\s*;")
        else {
            return;
        };
        let mut found = Vec::new();
        for file in &self.sources {
            for caps in extern_re.captures_iter(&file.text) {
                if let Some(package) = caps.get(1) {
                    let alias = caps.get(2).map(|a| a.as_str().to_string());
                    found.push((package.as_str().to_string(), alias));
                }
            }
        }
        for (package, alias) in found {
            self.add_reference(&package, alias.as_deref());
        }
    }
}

/// `(package, alias)` for every dependency table of the manifest, including
/// target-specific ones. `foo = { package = "bar" }` yields `("bar", Some("foo"))`.
fn manifest_dependencies(manifest: &toml::Table) -> Vec<(String, Option<String>)> {
    let mut tables: Vec<&toml::Table> = Vec::new();
    if let Some(deps) = manifest.get("dependencies").and_then(|d| d.as_table()) {
        tables.push(deps);
    }
    if let Some(targets) = manifest.get("target").and_then(|t| t.as_table()) {
        for target in targets.values() {
            if let Some(deps) = target.get("dependencies").and_then(|d| d.as_table()) {
                tables.push(deps);
            }
        }
    }

    let mut deps = Vec::new();
    for table in tables {
        for (key, value) in table {
            match value.get("package").and_then(|p| p.as_str()) {
                Some(package) => deps.push((package.to_string(), Some(key.clone()))),
                None => deps.push((key.clone(), None)),
            }
        }
    }
    deps
}

/// Sorted relative paths of all `.rs` files under the source roots, minus exclusions
fn discover_sources(root: &Path, config: &GeneratorConfig) -> Result<Vec<PathBuf>, CallTagError> {
    let excludes = config
        .exclude
        .iter()
        .map(|pat| glob::Pattern::new(pat))
        .collect::<Result<Vec<_>, _>>()?;

    let mut files = Vec::new();
    for source_root in &config.source_roots {
        let dir = root.join(source_root);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "source root missing, skipping");
            continue;
        }
        let pattern = format!("{}/**/*.rs", glob::Pattern::escape(&dir.to_string_lossy()));
        let entries = glob::glob(&pattern)?;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    continue;
                }
            };
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            let relative_str = relative.to_string_lossy().replace('\\', "/");
            if excludes.iter().any(|p| p.matches(&relative_str)) {
                debug!(path = %relative_str, "excluded");
                continue;
            }
            files.push(relative);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
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

    #[test]
    fn test_resolve_type_through_dependency() {
        let compilation = Compilation::new(Vec::new()).with_reference("libcalltag-core", None);
        let resolved = compilation.resolve_type("libcalltag_core::TagWith").unwrap();
        assert_eq!(resolved.path, "libcalltag_core::TagWith");
        assert_eq!(resolved.crate_name, "libcalltag_core");
    }

    #[test]
    fn test_resolve_type_through_rename() {
        let compilation = Compilation::new(Vec::new()).with_reference("libcalltag-core", Some("tags"));
        let resolved = compilation.resolve_type("::libcalltag_core::TagWith").unwrap();
        assert_eq!(resolved.path, "tags::TagWith");
    }

    #[test]
    fn test_unreferenced_type_is_none() {
        let compilation = Compilation::new(Vec::new()).with_reference("serde", None);
        assert!(compilation.resolve_type("libcalltag_core::TagWith").is_none());
        assert!(compilation.resolve_type("TagWith").is_none());
    }

    #[test]
    fn test_extern_crate_counts_as_reference() {
        let compilation = Compilation::new(vec![SourceFile {
            path: PathBuf::from("src/lib.rs"),
            text: "extern crate libcalltag_core as rt;\n".to_string(),
        }]);
        assert_eq!(compilation.resolve_type("libcalltag_core::TagWith").unwrap().path, "rt::TagWith");
    }

    #[test]
    fn test_load_reads_manifest_and_sources() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "Cargo.toml",
            r#"[package]
name = "shop"
version = "0.1.0"

[dependencies]
serde = "1"
calltag-rt = { package = "libcalltag-core", version = "0.1", default-features = false }

[target.'cfg(unix)'.dependencies]
libc = "0.2"
"#,
        );
        write(root, "src/main.rs", "fn main() {}\n");
        write(root, "src/repo/mod.rs", "pub fn load() {}\n");
        write(root, "src/generated/tags.rs", "// generated\n");
        write(root, "README.md", "# shop\n");

        let config = GeneratorConfig {
            exclude: vec!["src/generated/**".to_string()],
            ..GeneratorConfig::default()
        };
        let compilation = Compilation::load(root, &config).unwrap();
        assert_eq!(compilation.root(), root);

        let paths: Vec<PathBuf> = compilation.sources().iter().map(|s| s.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("src/main.rs"), PathBuf::from("src/repo/mod.rs")]);

        let refs: Vec<&str> = compilation.references().collect();
        assert!(refs.contains(&"serde"));
        assert!(refs.contains(&"libc"));
        assert_eq!(
            compilation.resolve_type("libcalltag_core::TagWith").unwrap().path,
            "calltag_rt::TagWith"
        );
        assert!(compilation.input_paths().contains(&root.join("Cargo.toml")));
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempdir().unwrap();
        let result = Compilation::load(dir.path(), &GeneratorConfig::default());
        assert!(matches!(result, Err(CallTagError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_exclude_pattern() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Cargo.toml", "[package]\nname = \"x\"\n");
        let config = GeneratorConfig {
            exclude: vec!["src/[".to_string()],
            ..GeneratorConfig::default()
        };
        let result = Compilation::load(dir.path(), &config);
        assert!(matches!(result, Err(CallTagError::Pattern(_))));
    }
}
