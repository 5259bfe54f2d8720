//! Model backends and prompts

pub mod backend;
pub mod command_backend;
pub mod prompts;
