pub mod call_site;
pub mod dispatch;

pub use call_site::CallSite;
pub use dispatch::{DispatchTable, MappingEntry};
