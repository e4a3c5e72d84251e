//! MCP tool handlers. Each takes the shared [`DocState`](crate::worker::DocState)
//! and a request, and returns rendered text or an error message for the client.

pub(crate) mod render;

pub mod list_sections;
pub mod lookup;
pub mod search;
pub mod set_docs_root;
pub mod validate;

pub use list_sections::*;
pub use lookup::*;
pub use search::*;
pub use set_docs_root::*;
pub use validate::*;
