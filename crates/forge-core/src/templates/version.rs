//! CLI/template compatibility checking

use semver::Version;

/// Compare the CLI version against the version a template was built for.
/// Returns a warning message when the CLI is older than the template
/// expects; unparseable versions skip the check entirely.
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli = Version::parse(cli_version).ok()?;
    let template = Version::parse(template_version).ok()?;

    if cli < template {
        Some(format!(
            "Warning: This template was designed for CLI version {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            template_version, cli_version, upgrade_command
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_when_cli_is_older_than_template() {
        let warning = check_compatibility("0.1.0", "0.2.0", "cargo install forceios --force");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn no_warning_for_matching_versions() {
        assert!(check_compatibility("0.1.0", "0.1.0", "cargo install forceios --force").is_none());
    }

    #[test]
    fn no_warning_when_cli_is_newer() {
        assert!(check_compatibility("0.2.0", "0.1.0", "cargo install forceios --force").is_none());
    }

    #[test]
    fn invalid_versions_skip_the_check() {
        assert!(check_compatibility("invalid", "0.1.0", "cargo install forceios --force").is_none());
        assert!(check_compatibility("0.1.0", "latest", "cargo install forceios --force").is_none());
    }
}
