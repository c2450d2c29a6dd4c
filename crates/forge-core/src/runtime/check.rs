//! Detection of external tools required by the scaffolders

use anyhow::Result;
use regex::Regex;
use semver::Version;
use std::fmt;
use std::process::Command;

/// External tools the CLIs orchestrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Git,
    Node,
    Npm,
    CocoaPods,
    Cordova,
}

impl Tool {
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::Git => "git",
            Tool::Node => "node",
            Tool::Npm => "npm",
            Tool::CocoaPods => "pod",
            Tool::Cordova => "cordova",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Git => "git",
            Tool::Node => "Node.js",
            Tool::Npm => "npm",
            Tool::CocoaPods => "CocoaPods",
            Tool::Cordova => "Cordova",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            Tool::Git => "install from https://git-scm.com",
            Tool::Node => "install from https://nodejs.org",
            Tool::Npm => "ships with Node.js (https://nodejs.org)",
            Tool::CocoaPods => "install with: sudo gem install cocoapods",
            Tool::Cordova => "install with: npm install -g cordova",
        }
    }

    /// Oldest version known to work with the generated projects.
    pub fn minimum_version(&self) -> Option<&'static str> {
        match self {
            Tool::Git => Some("2.13.0"),
            Tool::Node => Some("8.0.0"),
            Tool::Npm => Some("5.0.0"),
            Tool::Cordova => Some("8.0.0"),
            Tool::CocoaPods => None,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool: Tool,
    pub version: Option<String>,
    pub available: bool,
}

impl ToolInfo {
    /// Whether the detected version satisfies the tool's minimum, when both
    /// are known. Unparseable versions are treated as satisfying.
    pub fn meets_minimum(&self) -> bool {
        let (Some(version), Some(minimum)) = (self.version.as_deref(), self.tool.minimum_version())
        else {
            return true;
        };
        match (extract_version(version), Version::parse(minimum)) {
            (Some(found), Ok(min)) => found >= min,
            _ => true,
        }
    }
}

/// Pull a dotted version number out of arbitrary tool output, e.g.
/// "git version 2.39.2" or "v18.17.1".
pub fn extract_version(output: &str) -> Option<Version> {
    let re = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("version pattern must compile");
    let caps = re.captures(output)?;
    let major = caps.get(1)?.as_str();
    let minor = caps.get(2)?.as_str();
    let patch = caps.get(3).map_or("0", |m| m.as_str());
    Version::parse(&format!("{major}.{minor}.{patch}")).ok()
}

/// Check whether a tool is on PATH and grab its version string.
pub fn probe(tool: Tool) -> ToolInfo {
    let output = Command::new(tool.binary_name()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                tool,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            tool,
            version: None,
            available: false,
        },
    }
}

/// Probe every required tool; missing or too-old tools fail the check with
/// one message listing all of them.
pub fn check_tools(required: &[Tool]) -> Result<Vec<ToolInfo>> {
    let mut results = Vec::new();
    let mut problems = Vec::new();

    for &tool in required {
        let info = probe(tool);
        if !info.available {
            problems.push(format!("{} ({})", tool.display_name(), tool.install_hint()));
        } else if !info.meets_minimum() {
            problems.push(format!(
                "{} {} is older than the required {}",
                tool.display_name(),
                info.version.as_deref().unwrap_or("unknown"),
                tool.minimum_version().unwrap_or("unknown")
            ));
        }
        results.push(info);
    }

    if !problems.is_empty() {
        anyhow::bail!(
            "Missing or outdated tools:\n{}",
            problems
                .iter()
                .map(|p| format!("  - {p}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_version_from_tool_banners() {
        assert_eq!(
            extract_version("git version 2.39.2"),
            Some(Version::new(2, 39, 2))
        );
        assert_eq!(extract_version("v18.17.1"), Some(Version::new(18, 17, 1)));
        assert_eq!(extract_version("10.2"), Some(Version::new(10, 2, 0)));
        assert_eq!(extract_version("no digits here"), None);
    }

    #[test]
    fn minimum_version_comparison() {
        let old_git = ToolInfo {
            tool: Tool::Git,
            version: Some("git version 1.9.0".to_string()),
            available: true,
        };
        assert!(!old_git.meets_minimum());

        let new_git = ToolInfo {
            tool: Tool::Git,
            version: Some("git version 2.40.0".to_string()),
            available: true,
        };
        assert!(new_git.meets_minimum());
    }

    #[test]
    fn unparseable_version_is_not_a_failure() {
        let info = ToolInfo {
            tool: Tool::Node,
            version: Some("mystery build".to_string()),
            available: true,
        };
        assert!(info.meets_minimum());
    }

    #[test]
    fn tool_without_minimum_always_passes() {
        let info = ToolInfo {
            tool: Tool::CocoaPods,
            version: Some("1.0.0".to_string()),
            available: true,
        };
        assert!(info.meets_minimum());
    }
}
