//! Domains module containing business logic organized by bounded contexts.
//!
//! - **tools**: the MCP tools exposed to clients and their dispatch
//! - **upstream**: the external APIs the tools call

pub mod tools;
pub mod upstream;
