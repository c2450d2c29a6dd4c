//! Argument collection and validation
//!
//! This module provides:
//! - Declarative argument specifications (ArgSpec) with validation
//! - Sequential resolution from command-line flags and interactive prompts
//! - Conditional prompting via predicates over already-resolved arguments

pub mod resolve;
pub mod spec;

pub use resolve::{resolve, resolve_from_flags, ArgsError, Flags, Prompter};
pub use spec::{ArgSpec, Outcome, ResolvedArgs, Validation};
