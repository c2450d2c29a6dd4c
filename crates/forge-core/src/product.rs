//! Product configuration trait for the CLI binaries
//!
//! Each product (forceios, forcedroid) implements this trait to configure
//! the scaffolding behavior for its platform: supported app types, template
//! sources, required tools, and post-creation steps.

use crate::runner::node::CommandNode;
use crate::runtime::check::Tool;
use std::fmt;
use std::path::Path;

/// Kinds of application a product can scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppType {
    Native,
    NativeSwift,
    NativeKotlin,
    ReactNative,
    HybridLocal,
    HybridRemote,
}

impl AppType {
    /// Name used on the command line and in manifests.
    pub fn flag_name(&self) -> &'static str {
        match self {
            AppType::Native => "native",
            AppType::NativeSwift => "native_swift",
            AppType::NativeKotlin => "native_kotlin",
            AppType::ReactNative => "react_native",
            AppType::HybridLocal => "hybrid_local",
            AppType::HybridRemote => "hybrid_remote",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AppType::Native => "Native",
            AppType::NativeSwift => "Native (Swift)",
            AppType::NativeKotlin => "Native (Kotlin)",
            AppType::ReactNative => "React Native",
            AppType::HybridLocal => "Hybrid (local)",
            AppType::HybridRemote => "Hybrid (remote)",
        }
    }

    pub fn parse(s: &str) -> Option<AppType> {
        match s.to_lowercase().as_str() {
            "native" => Some(AppType::Native),
            "native_swift" => Some(AppType::NativeSwift),
            "native_kotlin" => Some(AppType::NativeKotlin),
            "react_native" => Some(AppType::ReactNative),
            "hybrid_local" => Some(AppType::HybridLocal),
            "hybrid_remote" => Some(AppType::HybridRemote),
            _ => None,
        }
    }

    /// Hybrid apps load a web start page and get a generated boot config.
    pub fn is_hybrid(&self) -> bool {
        matches!(self, AppType::HybridLocal | AppType::HybridRemote)
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag_name())
    }
}

/// Configuration trait for different CLI products
///
/// Each product (forceios, forcedroid) implements this trait to define:
/// - Product identity (name, display name)
/// - Template source URLs
/// - Supported app types and per-app-type tool requirements
/// - Documentation links
/// - Post-creation command trees and instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Default URL for fetching templates
    fn default_template_url(&self) -> &'static str;

    /// Environment variable name for overriding template URL
    fn template_url_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// App types this product can scaffold, in display order
    fn app_types(&self) -> &'static [AppType];

    /// Tools that must be installed before creating an app of this type
    fn required_tools(&self, apptype: AppType) -> Vec<Tool>;

    /// Command tree executed inside the freshly created project, if any
    fn post_create(&self, project_dir: &Path, apptype: AppType) -> Option<CommandNode>;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, apptype: AppType) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Whether this product supports the given app type
    fn supports(&self, apptype: AppType) -> bool {
        self.app_types().contains(&apptype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_flag_names() {
        for apptype in [
            AppType::Native,
            AppType::NativeSwift,
            AppType::NativeKotlin,
            AppType::ReactNative,
            AppType::HybridLocal,
            AppType::HybridRemote,
        ] {
            assert_eq!(AppType::parse(apptype.flag_name()), Some(apptype));
        }
        assert_eq!(AppType::parse("webview"), None);
    }

    #[test]
    fn hybrid_detection() {
        assert!(AppType::HybridLocal.is_hybrid());
        assert!(AppType::HybridRemote.is_hybrid());
        assert!(!AppType::ReactNative.is_hybrid());
    }
}
