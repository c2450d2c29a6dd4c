//! Forge Core - Shared library for the force mobile scaffolding CLIs
//!
//! This library provides the core functionality for scaffolding mobile app
//! projects from templates. It is designed to be used by multiple CLI
//! binaries (e.g., `forceios`, `forcedroid`) that share the same underlying
//! logic but target different platforms.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Argument resolution, command-tree
//!   execution, template fetching/copying, tool detection, config validation
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait plus the
//!   create and release workflows built on top of the core operations
//! - **Layer 3: CLI Interface** - cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-backed prompt implementations
//!   and the interactive create workflow
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use forge_core::args::{resolve_from_flags, ArgSpec};
//!
//! let specs = vec![ArgSpec::new("appname")
//!     .prompt("Enter your application name:")
//!     .pattern(r"^\S+$")
//!     .error("Invalid value for application name: '$val'.")];
//! let resolved = resolve_from_flags(&specs, &flags)?;
//! ```

pub mod args;
pub mod config;
pub mod product;
pub mod release;
pub mod runner;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod create;
#[cfg(feature = "tui")]
pub mod interact;

// Re-export main types for convenience
pub use args::{resolve_from_flags, ArgSpec, ResolvedArgs};
pub use product::{AppType, ProductConfig};
pub use runner::{CommandNode, ExecutionContext, Group, Leaf, RunOutcome, Runner, SystemShell};
pub use templates::{copy_template, RootManifest, TemplateFetcher, TemplateManifest, TemplateSource};

#[cfg(feature = "tui")]
pub use create::{run, CreateOptions};
#[cfg(feature = "tui")]
pub use interact::{CliclackPrompter, TerminalGate};
