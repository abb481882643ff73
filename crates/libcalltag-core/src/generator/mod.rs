//! Call-site dispatch table generator.
//!
//! Generation is a two-phase batch over an immutable [`Compilation`]:
//! [`scan`] collects the marker call sites, [`emit`] renders the dispatch
//! table for them. [`Generator`] runs both with the context gate, an
//! incremental scan cache and cooperative cancellation.

pub mod cache;
pub mod cancel;
pub mod collector;
pub mod compilation;
pub mod emit;
pub mod gate;

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CallTagError;
use crate::types::{CallSite, DispatchTable};

pub use cache::ScanCache;
pub use cancel::CancellationToken;
pub use compilation::{Compilation, SourceFile, TypeRef};
pub use gate::{load_context, CompilationContext};

/// Collect every marker call site in the compilation
pub fn scan(compilation: &Compilation) -> HashSet<CallSite> {
    compilation
        .sources()
        .iter()
        .flat_map(collector::collect_file)
        .collect()
}

/// Render the generated unit for a set of call sites
pub fn emit(sites: &HashSet<CallSite>, crate_path: &str) -> String {
    emit::render(&DispatchTable::from_call_sites(sites), crate_path)
}

/// Result of one enabled generation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Crate path the generated code uses for the tagging library
    pub crate_path: String,
    pub table: DispatchTable,
    pub text: String,
}

/// What `write_generated` did with the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Runs the gate, collector and emitter over compilations.
///
/// Holding on to one `Generator` across passes reuses scan results for
/// files whose content has not changed.
#[derive(Debug, Default)]
pub struct Generator {
    cache: ScanCache,
    cancel: CancellationToken,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cache: ScanCache::new(),
            cancel,
        }
    }

    /// Token that cancels passes run by this generator
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Run one generation pass.
    ///
    /// Returns `Ok(None)` when the compilation does not reference the
    /// tagging library. A cancelled pass returns `CallTagError::Cancelled`
    /// and produces nothing.
    pub fn run(&mut self, compilation: &Compilation) -> Result<Option<GeneratedSource>, CallTagError> {
        let context = gate::load_context(compilation);
        let sites = self.collect(compilation)?;

        let Some(crate_path) = context.crate_path() else {
            debug!(sites = sites.len(), "tagging library not referenced, nothing to generate");
            return Ok(None);
        };
        if let Some(extension) = &context.tagging_extension {
            debug!(extension = %extension.path, "tagging extension resolved");
        }

        if self.cancel.is_cancelled() {
            return Err(CallTagError::Cancelled);
        }

        let table = DispatchTable::from_call_sites(&sites);
        let text = emit::render(&table, crate_path);
        info!(
            root = %compilation.root().display(),
            call_sites = sites.len(),
            entries = table.len(),
            cache_hits = self.cache.hits(),
            cache_misses = self.cache.misses(),
            "dispatch table generated"
        );

        Ok(Some(GeneratedSource {
            crate_path: crate_path.to_string(),
            table,
            text,
        }))
    }

    fn collect(&mut self, compilation: &Compilation) -> Result<HashSet<CallSite>, CallTagError> {
        let mut sites = HashSet::new();
        for file in compilation.sources() {
            if self.cancel.is_cancelled() {
                return Err(CallTagError::Cancelled);
            }

            let hash = cache::content_hash(&file.text);
            if let Some(cached) = self.cache.get(&file.path, &hash) {
                sites.extend(cached.iter().cloned());
                continue;
            }

            let found = collector::collect_file(file);
            debug!(path = %file.path.display(), sites = found.len(), "scanned");
            sites.extend(found.iter().cloned());
            self.cache.insert(file.path.clone(), hash, found);
        }

        self.cache
            .retain_paths(compilation.sources().iter().map(|f| f.path.as_path()));
        Ok(sites)
    }
}

/// Write the generated unit to `path` unless it already holds the same text.
///
/// The text goes to a sibling temporary file that is then renamed into
/// place, so readers never see a partial file.
pub fn write_generated(path: &Path, source: &GeneratedSource) -> Result<WriteOutcome, CallTagError> {
    if is_current(path, source)? {
        debug!(path = %path.display(), "generated file unchanged");
        return Ok(WriteOutcome::Unchanged);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path(path);
    if let Err(e) = write_atomic(&tmp, path, source.text.as_bytes()) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(path = %path.display(), entries = source.table.len(), "wrote generated file");
    Ok(WriteOutcome::Written)
}

/// Fail with `CallTagError::Stale` unless `path` already holds the generated text
pub fn check_generated(path: &Path, source: &GeneratedSource) -> Result<(), CallTagError> {
    if is_current(path, source)? {
        Ok(())
    } else {
        Err(CallTagError::Stale(path.to_path_buf()))
    }
}

fn is_current(path: &Path, source: &GeneratedSource) -> Result<bool, CallTagError> {
    match std::fs::read(path) {
        Ok(existing) => Ok(existing == source.text.as_bytes()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn write_atomic(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    std::fs::rename(tmp, path)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".tmp{}", std::process::id()));
    path.with_file_name(name)
}
