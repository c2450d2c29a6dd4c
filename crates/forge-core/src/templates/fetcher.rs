//! Template fetching from a remote repository or a local directory
//!
//! Both sources hand out templates as zip archives: remote sources serve
//! pre-built zips next to the root manifest, local directories get their
//! zips built on the fly from the template folders. Development against a
//! local checkout therefore exercises the same code path as production.

use super::manifest::{RootManifest, SharedFile, TemplateManifest};
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use url::Url;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Where templates come from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// Remote source from a product config, honoring the env override.
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.template_url_env())
            .unwrap_or_else(|_| config.default_template_url().to_string());
        Self::remote(&url_str)
    }

    /// Remote source from an explicit URL string (createwithtemplate).
    pub fn remote(url_str: &str) -> Result<Self> {
        let url = Url::parse(url_str)
            .with_context(|| format!("Invalid template repository URL: {url_str}"))?;
        Ok(Self::Remote(url))
    }

    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// A template unpacked into memory.
#[derive(Debug, Clone)]
struct CachedTemplate {
    manifest: TemplateManifest,
    files: HashMap<String, Vec<u8>>,
}

/// Retrieves and caches templates from the configured source.
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
    cache: HashMap<String, CachedTemplate>,
}

impl TemplateFetcher {
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            cache: HashMap::new(),
        }
    }

    /// Fetcher for a product's default (or env-overridden) remote source.
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = TemplateSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    /// Fetcher for a local template checkout.
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::local(path), user_agent)
    }

    /// Append a path segment to a base URL, keeping query parameters.
    fn build_url(base: &Url, segment: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {base}"))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Fetch the root manifest listing available templates.
    pub async fn fetch_root_manifest(&self) -> Result<RootManifest> {
        let content = match &self.source {
            TemplateSource::Remote(base) => {
                let url = Self::build_url(base, "template.yaml")?;
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch root manifest from {url}"))?;
                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch root manifest from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }
                response.text().await?
            }
            TemplateSource::Local(path) => {
                let manifest_path = path.join("template.yaml");
                std::fs::read_to_string(&manifest_path)
                    .with_context(|| format!("Failed to read {}", manifest_path.display()))?
            }
        };

        serde_yaml::from_str(&content).context("Failed to parse root manifest")
    }

    /// Build a zip for one local template, bundling in the shared files
    /// from the templates root (with optional renames).
    pub fn build_local_zip(
        template_dir: &Path,
        template_name: &str,
        shared_files: &[SharedFile],
    ) -> Result<Vec<u8>> {
        let template_path = template_dir.join(template_name);
        let manifest_path = template_path.join("template.yaml");

        let manifest_content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let mut manifest: TemplateManifest = serde_yaml::from_str(&manifest_content)
            .with_context(|| format!("Failed to parse template '{template_name}' manifest"))?;

        // Shared destinations join the manifest's file list so the copier
        // sees them like any other template file.
        for shared in shared_files {
            let dest = shared.destination().to_string();
            if !manifest.files.contains(&dest) {
                manifest.files.push(dest);
            }
        }
        let manifest_content =
            serde_yaml::to_string(&manifest).context("Failed to serialize updated manifest")?;

        let mut zip_buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            zip.start_file(format!("{template_name}/template.yaml"), options)?;
            zip.write_all(manifest_content.as_bytes())?;

            for shared in shared_files {
                let source_path = template_dir.join(&shared.source);
                if !source_path.exists() {
                    eprintln!(
                        "Warning: Shared file '{}' not found in {}",
                        shared.source,
                        template_dir.display()
                    );
                    continue;
                }
                let content = std::fs::read(&source_path).with_context(|| {
                    format!("Failed to read shared file {}", source_path.display())
                })?;
                zip.start_file(format!("{template_name}/{}", shared.destination()), options)?;
                zip.write_all(&content)?;
            }

            let shared_dests: std::collections::HashSet<_> =
                shared_files.iter().map(|s| s.destination()).collect();

            for file_path in &manifest.files {
                if shared_dests.contains(file_path.as_str()) {
                    continue;
                }
                let full_path = template_path.join(file_path);
                if !full_path.exists() {
                    // Missing files are warned about, not fatal; a manifest
                    // may list files that only some checkouts carry.
                    eprintln!(
                        "Warning: File '{}' not found (listed in {})",
                        full_path.display(),
                        manifest_path.display()
                    );
                    continue;
                }
                let content = std::fs::read(&full_path)
                    .with_context(|| format!("Failed to read {}", full_path.display()))?;
                zip.start_file(format!("{template_name}/{file_path}"), options)?;
                zip.write_all(&content)?;
            }

            zip.finish()?;
        }

        Ok(zip_buffer)
    }

    /// Unpack a template zip into memory. Entries are prefixed with the
    /// template name inside the archive; the prefix is stripped here.
    fn unpack_zip(zip_bytes: &[u8], template_name: &str) -> Result<CachedTemplate> {
        let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
            .with_context(|| format!("Failed to read zip archive for template '{template_name}'"))?;

        let mut files: HashMap<String, Vec<u8>> = HashMap::new();
        let mut manifest: Option<TemplateManifest> = None;
        let prefix = format!("{template_name}/");

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }

            let full_path = entry.name().to_string();
            let relative_path = full_path
                .strip_prefix(&prefix)
                .unwrap_or(&full_path)
                .to_string();

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;

            if relative_path == "template.yaml" {
                let text = String::from_utf8_lossy(&contents);
                manifest = Some(serde_yaml::from_str(&text).with_context(|| {
                    format!("Failed to parse template '{template_name}' manifest")
                })?);
            }

            files.insert(relative_path, contents);
        }

        let manifest = manifest
            .ok_or_else(|| anyhow::anyhow!("Template '{template_name}' zip missing template.yaml"))?;

        Ok(CachedTemplate { manifest, files })
    }

    /// Fetch (or build) a template's zip and cache its contents.
    async fn load_template(&mut self, template_name: &str) -> Result<()> {
        if self.cache.contains_key(template_name) {
            return Ok(());
        }

        let zip_bytes = match &self.source {
            TemplateSource::Remote(base) => {
                let zip_url = Self::build_url(base, &format!("{template_name}.zip"))?;
                let response = self
                    .client
                    .get(zip_url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch template zip: {template_name}"))?;
                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch template '{}' zip from {}: HTTP {}",
                        template_name,
                        zip_url,
                        response.status()
                    );
                }
                response.bytes().await?.to_vec()
            }
            TemplateSource::Local(path) => {
                let root_manifest_path = path.join("template.yaml");
                let root_content = std::fs::read_to_string(&root_manifest_path)
                    .with_context(|| format!("Failed to read {}", root_manifest_path.display()))?;
                let root_manifest: RootManifest = serde_yaml::from_str(&root_content)
                    .context("Failed to parse root template.yaml")?;
                Self::build_local_zip(path, template_name, &root_manifest.shared_files)?
            }
        };

        let cached = Self::unpack_zip(&zip_bytes, template_name)?;
        self.cache.insert(template_name.to_string(), cached);
        Ok(())
    }

    /// Fetch a specific template's manifest.
    pub async fn fetch_template_manifest(
        &mut self,
        template_name: &str,
    ) -> Result<TemplateManifest> {
        self.load_template(template_name).await?;
        let cached = self
            .cache
            .get(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{template_name}' not found in cache"))?;
        Ok(cached.manifest.clone())
    }

    /// Fetch one file of a template as raw bytes.
    pub async fn fetch_file_bytes(
        &mut self,
        template_name: &str,
        file_path: &str,
    ) -> Result<Vec<u8>> {
        self.load_template(template_name).await?;
        let cached = self
            .cache
            .get(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{template_name}' not found in cache"))?;
        cached.files.get(file_path).cloned().ok_or_else(|| {
            anyhow::anyhow!("File '{file_path}' not found in template '{template_name}'")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_local_template(dir: &Path) {
        fs::write(
            dir.join("template.yaml"),
            "templates:\n  - starter\nshared_files:\n  - source: gitignore\n    dest: .gitignore\n",
        )
        .unwrap();
        fs::write(dir.join("gitignore"), "target/\n").unwrap();

        let starter = dir.join("starter");
        fs::create_dir(&starter).unwrap();
        fs::write(
            starter.join("template.yaml"),
            "name: Starter\ndescription: Starter app\nversion: 0.1.0\napptypes:\n  - native\nfiles:\n  - README.md\n",
        )
        .unwrap();
        fs::write(starter.join("README.md"), "# ___appname___\n").unwrap();
    }

    #[tokio::test]
    async fn local_source_builds_and_caches_zips() {
        let dir = tempfile::tempdir().unwrap();
        write_local_template(dir.path());

        let mut fetcher = TemplateFetcher::from_local(dir.path().to_path_buf(), "test");

        let root = fetcher.fetch_root_manifest().await.unwrap();
        assert_eq!(root.templates, vec!["starter".to_string()]);

        let manifest = fetcher.fetch_template_manifest("starter").await.unwrap();
        assert_eq!(manifest.name, "Starter");
        // Shared destination was folded into the file list.
        assert!(manifest.files.contains(&".gitignore".to_string()));

        let readme = fetcher.fetch_file_bytes("starter", "README.md").await.unwrap();
        assert_eq!(readme, b"# ___appname___\n");
        let gitignore = fetcher.fetch_file_bytes("starter", ".gitignore").await.unwrap();
        assert_eq!(gitignore, b"target/\n");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_local_template(dir.path());

        let mut fetcher = TemplateFetcher::from_local(dir.path().to_path_buf(), "test");
        let err = fetcher
            .fetch_file_bytes("starter", "nope.txt")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn build_url_appends_segments() {
        let base = Url::parse("https://example.com/templates/ios").unwrap();
        let url = TemplateFetcher::build_url(&base, "template.yaml").unwrap();
        assert_eq!(url.as_str(), "https://example.com/templates/ios/template.yaml");
    }
}
