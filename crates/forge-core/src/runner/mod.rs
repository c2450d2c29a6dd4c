//! Hierarchical command execution
//!
//! This module provides:
//! - Command trees (Leaf | Group) with per-leaf error handling
//! - A sequential runner with confirmation gating and nested progress output
//! - Shell and Gate traits so trees can be executed against test doubles

pub mod exec;
pub mod node;

pub use exec::{ExecutionContext, Gate, RunError, RunOutcome, Runner, Shell, SystemShell};
pub use node::{CommandNode, Group, Leaf};
