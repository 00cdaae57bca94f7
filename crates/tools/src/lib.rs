//! Tool registry, capability packages and dispatch for the now-mcp bridge.

pub mod client;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod groups;
pub mod packages;
pub mod registry;
pub mod schema;
pub mod table;
pub mod traits;

pub use context::ToolContext;
pub use dispatcher::{Dispatcher, ToolListing};
pub use error::{ErrorKind, RemoteCallError, ToolError};
pub use groups::builtin_groups;
pub use packages::{ExposedToolSet, PackageCatalog, FULL_PACKAGE, NONE_PACKAGE};
pub use registry::{ToolDescriptor, ToolEntry, ToolGroup, ToolRegistry, LIST_TOOL_PACKAGES};
pub use schema::{FieldError, ParamSchema, ParamType, ResponseKind};
pub use traits::{Tool, ToolResult};
