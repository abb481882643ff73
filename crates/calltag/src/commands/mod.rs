pub mod generate;
pub mod hash;
pub mod scan;

use std::path::{Path, PathBuf};

use libcalltag_core::generator::Compilation;
use libcalltag_core::{load_config, CallTagError, GeneratorConfig};

/// Crate root from `--root`, else the working directory
pub fn resolve_root(root: Option<&Path>) -> Result<PathBuf, CallTagError> {
    match root {
        Some(root) => Ok(root.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Load `calltag.toml` (or defaults) and the compilation snapshot for `root`
pub fn load_crate(root: &Path) -> Result<(GeneratorConfig, Compilation), CallTagError> {
    let config = load_config(root)?.unwrap_or_default();
    let compilation = Compilation::load(root, &config)?;
    Ok((config, compilation))
}
