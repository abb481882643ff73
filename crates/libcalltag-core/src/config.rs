use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CallTagError;

/// Config file looked up at the crate root
pub const CONFIG_FILE: &str = "calltag.toml";

/// Default name of the generated dispatch table
pub const GENERATED_FILE: &str = "calltag_generated.rs";

/// Generator configuration stored in `<crate root>/calltag.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directories scanned for `.rs` files, relative to the crate root
    pub source_roots: Vec<PathBuf>,
    /// Glob patterns (relative to the crate root) excluded from scanning
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Where the generated file is written, relative to the crate root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Manifest consulted for referenced crates
    pub manifest: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_roots: vec![PathBuf::from("src")],
            exclude: Vec::new(),
            output: None,
            manifest: PathBuf::from("Cargo.toml"),
        }
    }
}

impl GeneratorConfig {
    /// Resolve the output path: explicit setting, else `$OUT_DIR`, else the crate root
    pub fn output_path(&self, root: &Path) -> PathBuf {
        match &self.output {
            Some(path) => root.join(path),
            None => match std::env::var_os("OUT_DIR") {
                Some(out_dir) => PathBuf::from(out_dir).join(GENERATED_FILE),
                None => root.join(GENERATED_FILE),
            },
        }
    }
}

/// Load config from `<root>/calltag.toml`
pub fn load_config(root: &Path) -> Result<Option<GeneratorConfig>, CallTagError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&config_path)?;
    let config: GeneratorConfig = toml::from_str(&content)?;
    Ok(Some(config))
}

/// Save config to `<root>/calltag.toml`
pub fn save_config(root: &Path, config: &GeneratorConfig) -> Result<(), CallTagError> {
    std::fs::create_dir_all(root)?;
    let content = toml::to_string_pretty(config)?;
    std::fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig {
            source_roots: vec![PathBuf::from("src"), PathBuf::from("bin")],
            exclude: vec!["src/generated/**".to_string()],
            output: Some(PathBuf::from("src/calltag_generated.rs")),
            manifest: PathBuf::from("Cargo.toml"),
        };

        save_config(dir.path(), &config).unwrap();
        let loaded = load_config(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = [\"src/legacy/**\"]\n").unwrap();

        let loaded = load_config(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.source_roots, vec![PathBuf::from("src")]);
        assert_eq!(loaded.manifest, PathBuf::from("Cargo.toml"));
        assert_eq!(loaded.exclude, vec!["src/legacy/**".to_string()]);
    }

    #[test]
    fn test_explicit_output_path() {
        let config = GeneratorConfig {
            output: Some(PathBuf::from("src/tags.rs")),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.output_path(Path::new("/app")), PathBuf::from("/app/src/tags.rs"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "source_roots = [").unwrap();
        assert!(matches!(load_config(dir.path()), Err(CallTagError::TomlParse(_))));
    }
}
