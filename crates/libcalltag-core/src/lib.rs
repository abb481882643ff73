pub mod hash;
pub mod location;
pub mod tag;
pub mod types;

#[cfg(feature = "generator")]
pub mod build_script;
#[cfg(feature = "generator")]
pub mod config;
#[cfg(feature = "generator")]
pub mod error;
#[cfg(feature = "generator")]
pub mod generator;

pub use hash::{deterministic_hash, hash_tag};
pub use location::{enclosing_member, location_key, TOP_LEVEL_MEMBER};
pub use tag::{TagWith, TaggedQuery};
pub use types::{CallSite, DispatchTable, MappingEntry};

#[cfg(feature = "generator")]
pub use config::{load_config, save_config, GeneratorConfig};
#[cfg(feature = "generator")]
pub use error::CallTagError;
#[cfg(feature = "generator")]
pub use generator::{Generator, GeneratedSource};

/// Name of the marker macro the collector scans for. Not configurable.
pub const MARKER_NAME: &str = "tag_with_call_site_hash";

/// Fully qualified path of the tagging extension point the gate looks up
pub const EXTENSION_POINT: &str = "libcalltag_core::TagWith";
