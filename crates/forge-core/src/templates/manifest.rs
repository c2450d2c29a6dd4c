//! Template manifest types and parsing

use crate::product::AppType;
use serde::{Deserialize, Serialize};

/// File patterns associated with each app-type family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppTypeFiles {
    /// Files always included regardless of the chosen app type
    #[serde(default)]
    pub common: Vec<String>,

    /// Files for any of the native app types
    #[serde(default)]
    pub native: Vec<String>,

    /// Files specific to Swift native apps
    #[serde(default)]
    pub swift: Vec<String>,

    /// Files specific to Kotlin native apps
    #[serde(default)]
    pub kotlin: Vec<String>,

    /// Files for React Native apps
    #[serde(default)]
    pub react_native: Vec<String>,

    /// Files for the hybrid (web view) app types
    #[serde(default)]
    pub hybrid: Vec<String>,
}

impl AppTypeFiles {
    /// Merge another set into this one; patterns accumulate.
    pub fn merge(&mut self, other: &AppTypeFiles) {
        self.common.extend(other.common.iter().cloned());
        self.native.extend(other.native.iter().cloned());
        self.swift.extend(other.swift.iter().cloned());
        self.kotlin.extend(other.kotlin.iter().cloned());
        self.react_native.extend(other.react_native.iter().cloned());
        self.hybrid.extend(other.hybrid.iter().cloned());
    }

    /// Check if a filename matches any pattern in a list. Patterns are
    /// either exact names, `*suffix` matches, or `prefix*` matches.
    fn matches_any(filename: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                filename.ends_with(suffix)
            } else if let Some(prefix) = pattern.strip_suffix('*') {
                filename.starts_with(prefix)
            } else {
                filename == pattern
            }
        })
    }

    /// Which family a file belongs to, or `None` when it is not listed
    /// anywhere (unlisted files are excluded from the copy).
    pub fn category_for_file(&self, file_path: &str) -> Option<FileCategory> {
        let filename = file_path.rsplit('/').next().unwrap_or(file_path);

        if Self::matches_any(filename, &self.common) {
            return Some(FileCategory::Common);
        }
        if Self::matches_any(filename, &self.native) {
            return Some(FileCategory::Native);
        }
        if Self::matches_any(filename, &self.swift) {
            return Some(FileCategory::Swift);
        }
        if Self::matches_any(filename, &self.kotlin) {
            return Some(FileCategory::Kotlin);
        }
        if Self::matches_any(filename, &self.react_native) {
            return Some(FileCategory::ReactNative);
        }
        if Self::matches_any(filename, &self.hybrid) {
            return Some(FileCategory::Hybrid);
        }

        None
    }

    /// Whether a file should land in a project of the given app type.
    pub fn includes(&self, file_path: &str, apptype: AppType) -> bool {
        match self.category_for_file(file_path) {
            Some(FileCategory::Common) => true,
            Some(FileCategory::Native) => matches!(
                apptype,
                AppType::Native | AppType::NativeSwift | AppType::NativeKotlin
            ),
            Some(FileCategory::Swift) => apptype == AppType::NativeSwift,
            Some(FileCategory::Kotlin) => apptype == AppType::NativeKotlin,
            Some(FileCategory::ReactNative) => apptype == AppType::ReactNative,
            Some(FileCategory::Hybrid) => apptype.is_hybrid(),
            None => false,
        }
    }
}

/// App-type family a file is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Common,
    Native,
    Swift,
    Kotlin,
    ReactNative,
    Hybrid,
}

/// A shared file from the root templates directory bundled into every
/// template, with optional renaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// Source path relative to the templates directory
    pub source: String,

    /// Destination path in each template (defaults to source)
    #[serde(default)]
    pub dest: Option<String>,
}

impl SharedFile {
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.source)
    }
}

/// Root manifest (template.yaml at the repository root): lists available
/// template directories plus global file associations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// Template directory names
    pub templates: Vec<String>,

    /// Global app-type file patterns, merged into every template's
    #[serde(default)]
    pub apptype_files: AppTypeFiles,

    /// Files bundled into every template
    #[serde(default)]
    pub shared_files: Vec<SharedFile>,
}

/// Per-template manifest (template.yaml inside a template directory).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    pub description: String,

    /// Semver version for CLI compatibility checking
    pub version: String,

    /// App types this template can produce
    #[serde(default)]
    pub apptypes: Vec<String>,

    /// Explicit list of files to copy
    pub files: Vec<String>,

    /// Template-specific file patterns (merged with the root's)
    #[serde(default)]
    pub apptype_files: AppTypeFiles,
}

impl TemplateManifest {
    /// Whether this template supports the given app type.
    pub fn supports(&self, apptype: AppType) -> bool {
        self.apptypes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(apptype.flag_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> AppTypeFiles {
        AppTypeFiles {
            common: vec![".gitignore".to_string(), "README.md".to_string()],
            native: vec!["*.pbxproj".to_string(), "build.gradle".to_string()],
            swift: vec!["*.swift".to_string()],
            kotlin: vec!["*.kt".to_string()],
            react_native: vec!["package.json".to_string(), "*.jsx".to_string()],
            hybrid: vec!["*.html".to_string(), "config.xml".to_string()],
        }
    }

    #[test]
    fn common_files_included_for_every_apptype() {
        let files = sample_files();
        for apptype in [AppType::Native, AppType::ReactNative, AppType::HybridLocal] {
            assert!(files.includes("app/.gitignore", apptype));
            assert!(files.includes("README.md", apptype));
        }
    }

    #[test]
    fn swift_files_only_for_swift_apps() {
        let files = sample_files();
        assert!(files.includes("Classes/AppDelegate.swift", AppType::NativeSwift));
        assert!(!files.includes("Classes/AppDelegate.swift", AppType::Native));
        assert!(!files.includes("Classes/AppDelegate.swift", AppType::NativeKotlin));
    }

    #[test]
    fn native_family_spans_all_native_types() {
        let files = sample_files();
        for apptype in [AppType::Native, AppType::NativeSwift, AppType::NativeKotlin] {
            assert!(files.includes("proj/project.pbxproj", apptype));
        }
        assert!(!files.includes("proj/project.pbxproj", AppType::ReactNative));
    }

    #[test]
    fn hybrid_files_for_both_hybrid_types() {
        let files = sample_files();
        assert!(files.includes("www/index.html", AppType::HybridLocal));
        assert!(files.includes("config.xml", AppType::HybridRemote));
        assert!(!files.includes("www/index.html", AppType::Native));
    }

    #[test]
    fn unlisted_files_are_excluded() {
        let files = sample_files();
        assert!(!files.includes("notes.txt", AppType::Native));
    }

    #[test]
    fn prefix_patterns_match() {
        let files = AppTypeFiles {
            common: vec!["requirements*".to_string()],
            ..Default::default()
        };
        assert!(files.includes("requirements.txt", AppType::Native));
        assert!(!files.includes("other.txt", AppType::Native));
    }

    #[test]
    fn manifest_apptype_support_is_case_insensitive() {
        let manifest = TemplateManifest {
            name: "Native".to_string(),
            description: "Native app template".to_string(),
            version: "1.0.0".to_string(),
            apptypes: vec!["Native".to_string(), "NATIVE_SWIFT".to_string()],
            files: Vec::new(),
            apptype_files: AppTypeFiles::default(),
        };
        assert!(manifest.supports(AppType::Native));
        assert!(manifest.supports(AppType::NativeSwift));
        assert!(!manifest.supports(AppType::HybridLocal));
    }

    #[test]
    fn shared_file_destination_defaults_to_source() {
        let plain = SharedFile {
            source: "LICENSE.txt".to_string(),
            dest: None,
        };
        assert_eq!(plain.destination(), "LICENSE.txt");

        let renamed = SharedFile {
            source: "gitignore".to_string(),
            dest: Some(".gitignore".to_string()),
        };
        assert_eq!(renamed.destination(), ".gitignore");
    }
}
