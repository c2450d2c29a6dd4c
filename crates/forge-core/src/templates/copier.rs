//! Template file copying with app-type filtering and token substitution

use crate::args::spec::ResolvedArgs;
use crate::product::AppType;
use crate::templates::fetcher::TemplateFetcher;
use crate::templates::manifest::{AppTypeFiles, TemplateManifest};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Values substituted into template files and paths.
///
/// Templates reference them with triple-underscore tokens, e.g. a file
/// named `___appname___-Info.plist` containing `___packagename___`.
#[derive(Debug, Clone)]
pub struct Substitutions {
    pub appname: String,
    pub packagename: String,
    pub organization: String,
}

impl Substitutions {
    pub fn from_resolved(resolved: &ResolvedArgs) -> Self {
        Self {
            appname: resolved.get_or_empty("appname").to_string(),
            packagename: resolved.get_or_empty("packagename").to_string(),
            organization: resolved.get_or_empty("organization").to_string(),
        }
    }

    /// Replace every token occurrence in `text`.
    pub fn apply(&self, text: &str) -> String {
        text.replace("___appname___", &self.appname)
            .replace("___packagename___", &self.packagename)
            .replace("___organization___", &self.organization)
    }
}

/// Copy a template into `target_dir`, keeping only the files that belong
/// to the chosen app type and substituting tokens in paths and text
/// content. Binary files are copied verbatim. Returns the relative paths
/// written, in manifest order.
pub async fn copy_template(
    fetcher: &mut TemplateFetcher,
    template_name: &str,
    manifest: &TemplateManifest,
    target_dir: &Path,
    apptype: AppType,
    apptype_files: &AppTypeFiles,
    subs: &Substitutions,
) -> Result<Vec<String>> {
    fs::create_dir_all(target_dir)
        .await
        .context("Failed to create target directory")?;

    let mut copied_files = Vec::new();

    for file_path in &manifest.files {
        if !apptype_files.includes(file_path, apptype) {
            continue;
        }

        let dest_rel = subs.apply(file_path);
        let target_path = target_dir.join(&dest_rel);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = fetcher.fetch_file_bytes(template_name, file_path).await?;
        let content = match String::from_utf8(content) {
            Ok(text) => subs.apply(&text).into_bytes(),
            Err(not_utf8) => not_utf8.into_bytes(),
        };

        fs::write(&target_path, &content)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        copied_files.push(dest_rel);
    }

    Ok(copied_files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs() -> Substitutions {
        Substitutions {
            appname: "MyApp".to_string(),
            packagename: "com.acme.myapp".to_string(),
            organization: "Acme, Inc.".to_string(),
        }
    }

    #[test]
    fn substitutes_all_tokens_in_content() {
        let text = "name = ___appname___\nid = ___packagename___\nby ___organization___\n";
        assert_eq!(
            subs().apply(text),
            "name = MyApp\nid = com.acme.myapp\nby Acme, Inc.\n"
        );
    }

    #[test]
    fn substitutes_tokens_in_paths() {
        assert_eq!(
            subs().apply("___appname___/___appname___-Info.plist"),
            "MyApp/MyApp-Info.plist"
        );
    }

    #[test]
    fn text_without_tokens_is_unchanged() {
        let text = "plain file\n";
        assert_eq!(subs().apply(text), text);
    }

    #[tokio::test]
    async fn copies_filtered_and_substituted_files() {
        use std::fs as stdfs;

        let template_dir = tempfile::tempdir().unwrap();
        stdfs::write(template_dir.path().join("template.yaml"), "templates:\n  - app\n").unwrap();

        let app = template_dir.path().join("app");
        stdfs::create_dir(&app).unwrap();
        stdfs::write(
            app.join("template.yaml"),
            concat!(
                "name: App\n",
                "description: Test app\n",
                "version: 0.1.0\n",
                "apptypes:\n  - native\n  - hybrid_local\n",
                "files:\n",
                "  - README.md\n",
                "  - ___appname___.pbxproj\n",
                "  - www/index.html\n",
                "apptype_files:\n",
                "  common:\n    - README.md\n",
                "  native:\n    - '*.pbxproj'\n",
                "  hybrid:\n    - '*.html'\n",
            ),
        )
        .unwrap();
        stdfs::write(app.join("README.md"), "# ___appname___\n").unwrap();
        stdfs::write(app.join("___appname___.pbxproj"), "project ___appname___\n").unwrap();
        stdfs::create_dir(app.join("www")).unwrap();
        stdfs::write(app.join("www/index.html"), "<title>___appname___</title>\n").unwrap();

        let mut fetcher =
            TemplateFetcher::from_local(template_dir.path().to_path_buf(), "test");
        let manifest = fetcher.fetch_template_manifest("app").await.unwrap();

        let target = tempfile::tempdir().unwrap();
        let copied = copy_template(
            &mut fetcher,
            "app",
            &manifest,
            target.path(),
            AppType::Native,
            &manifest.apptype_files,
            &subs(),
        )
        .await
        .unwrap();

        // Hybrid-only file filtered out, token in path substituted.
        assert_eq!(copied, vec!["README.md".to_string(), "MyApp.pbxproj".to_string()]);
        let readme = stdfs::read_to_string(target.path().join("README.md")).unwrap();
        assert_eq!(readme, "# MyApp\n");
        let project = stdfs::read_to_string(target.path().join("MyApp.pbxproj")).unwrap();
        assert_eq!(project, "project MyApp\n");
        assert!(!target.path().join("www/index.html").exists());
    }
}
