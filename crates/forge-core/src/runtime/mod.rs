//! Tool detection and management
//!
//! This module provides:
//! - Detection of the external tools the scaffolders shell out to
//!   (git, Node.js, npm, CocoaPods, Cordova), with minimum-version checks
//! - A generic manager for installing missing tools

pub mod check;
pub mod tool;

pub use check::{check_tools, probe, Tool, ToolInfo};
pub use tool::{cordova_tool, ToolManager};
