pub mod config;
pub mod filesystem;
pub mod git;
pub mod hook;
pub mod prompt;
pub mod template;

// Re-exports
pub use template::{resolve, PlaceholderHandler, PlaceholderKind, Registry, Template, TemplateError};
