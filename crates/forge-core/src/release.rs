//! Multi-repository release automation
//!
//! Builds the command trees that branch, stamp, and tag an ordered set of
//! repositories for a release. The trees are executed by the command
//! runner; nothing here touches git directly.

use crate::args::spec::ArgSpec;
use crate::config::check::{check_config, ConfigKind};
use crate::runner::node::{CommandNode, Group, Leaf};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// One repository taking part in a release.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSpec {
    pub name: String,
    pub url: String,
}

/// The set of repositories a release spans, in release order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseManifest {
    pub repos: Vec<RepoSpec>,

    /// Default for pushing branches and tags; the CLI flag overrides it.
    #[serde(default)]
    pub push: bool,
}

/// Load a release manifest, validating it against the release schema
/// before deserializing.
pub fn load_manifest(path: &Path) -> Result<ReleaseManifest> {
    let report = check_config(path, ConfigKind::Release)?;
    if !report.conforms() {
        anyhow::bail!(
            "Release manifest {} does not conform to the release schema:\n{}",
            path.display(),
            report
                .errors
                .iter()
                .map(|e| format!("  - {e}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse release manifest")
}

/// Arguments collected before a release run.
pub fn release_arg_specs() -> Vec<ArgSpec> {
    vec![
        ArgSpec::new("version")
            .prompt("Release version (e.g. 1.2.0):")
            .predicate(|s| semver::Version::parse(s).is_ok())
            .error("Invalid release version: '$val'."),
        ArgSpec::new("branch")
            .prompt("Release branch name:")
            .pattern(r"^[A-Za-z0-9._/-]+$")
            .error("Invalid branch name: '$val'."),
    ]
}

/// Build the command tree for one release across every repository.
///
/// Each repository gets its own group: clone (falling back to a fetch when
/// the checkout already exists), create the release branch (falling back
/// to checking it out when it exists), stamp an empty release commit, tag,
/// and optionally push. Tagging ignores errors so re-running a partially
/// finished release does not stop on already-placed tags.
pub fn release_tree(
    manifest: &ReleaseManifest,
    version: &str,
    branch: &str,
    push: bool,
) -> CommandNode {
    let mut root = Group::new(format!(
        "Release {} across {} repositories",
        version,
        manifest.repos.len()
    ));

    for repo in &manifest.repos {
        let clone = Leaf::new(format!("git clone {} {}", repo.url, repo.name))
            .fallback(Leaf::new("git fetch origin").rel_dir(&repo.name));

        let branch_step = Leaf::new(format!("git checkout -b {branch}"))
            .rel_dir(&repo.name)
            .fallback(Leaf::new(format!("git checkout {branch}")));

        let stamp = Leaf::new(format!(
            "git commit --allow-empty -m \"Start release {version}\""
        ))
        .rel_dir(&repo.name);

        let tag = Leaf::new(format!("git tag v{version}"))
            .rel_dir(&repo.name)
            .ignore_error();

        let push_step =
            push.then(|| Leaf::new(format!("git push origin {branch} v{version}")).rel_dir(&repo.name));

        root = root.child(
            Group::new(format!("Releasing {}", repo.name))
                .child(clone)
                .child(branch_step)
                .child(stamp)
                .child(tag)
                .child_if(push_step),
        );
    }

    CommandNode::Group(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn manifest() -> ReleaseManifest {
        ReleaseManifest {
            repos: vec![
                RepoSpec {
                    name: "sdk-core".to_string(),
                    url: "https://example.com/sdk-core.git".to_string(),
                },
                RepoSpec {
                    name: "sdk-templates".to_string(),
                    url: "https://example.com/sdk-templates.git".to_string(),
                },
            ],
            push: false,
        }
    }

    fn as_group(node: &CommandNode) -> &Group {
        match node {
            CommandNode::Group(group) => group,
            CommandNode::Leaf(_) => panic!("expected a group"),
        }
    }

    #[test]
    fn one_group_per_repository() {
        let tree = release_tree(&manifest(), "1.2.0", "release/1.2.0", false);
        let root = as_group(&tree);
        assert_eq!(root.active_children().len(), 2);
        assert!(root.message.contains("1.2.0"));
    }

    #[test]
    fn push_step_is_a_placeholder_unless_requested() {
        let without_push = release_tree(&manifest(), "1.2.0", "release/1.2.0", false);
        let repo_group = as_group(as_group(&without_push).active_children()[0]);
        assert_eq!(repo_group.active_children().len(), 4);

        let with_push = release_tree(&manifest(), "1.2.0", "release/1.2.0", true);
        let repo_group = as_group(as_group(&with_push).active_children()[0]);
        assert_eq!(repo_group.active_children().len(), 5);
    }

    #[test]
    fn clone_and_branch_steps_carry_fallbacks() {
        let tree = release_tree(&manifest(), "1.2.0", "release/1.2.0", false);
        let repo_group = as_group(as_group(&tree).active_children()[0]);
        let steps = repo_group.active_children();

        let CommandNode::Leaf(clone) = steps[0] else {
            panic!("expected clone leaf");
        };
        assert!(clone.command.starts_with("git clone"));
        assert!(clone.fallback.is_some());

        let CommandNode::Leaf(branch) = steps[1] else {
            panic!("expected branch leaf");
        };
        assert!(branch.command.contains("checkout -b"));
        assert!(branch.fallback.is_some());

        let CommandNode::Leaf(tag) = steps[3] else {
            panic!("expected tag leaf");
        };
        assert!(tag.ignore_error);
    }

    #[test]
    fn loads_and_validates_manifest_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"repos":[{{"name":"sdk","url":"https://example.com/sdk.git"}}],"push":true}}"#
        )
        .unwrap();

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.repos.len(), 1);
        assert!(manifest.push);
    }

    #[test]
    fn rejects_manifest_missing_repos() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"push":true}}"#).unwrap();

        let err = load_manifest(file.path()).unwrap_err();
        assert!(err.to_string().contains("does not conform"));
    }
}
