//! Boot configuration generation for hybrid apps

use crate::args::spec::ResolvedArgs;
use crate::product::AppType;
use serde_json::{json, Value};

/// Default start page when the user did not supply one.
const DEFAULT_START_PAGE: &str = "index.html";

/// Build the bootconfig.json content for a hybrid app.
///
/// Returns `None` for non-hybrid app types, which boot straight into
/// native code and carry no boot configuration.
pub fn bootconfig(resolved: &ResolvedArgs, apptype: AppType) -> Option<Value> {
    if !apptype.is_hybrid() {
        return None;
    }

    let start_page = resolved
        .get("startpage")
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_START_PAGE);

    Some(json!({
        "appName": resolved.get_or_empty("appname"),
        "appType": apptype.flag_name(),
        "isLocal": apptype == AppType::HybridLocal,
        "startPage": start_page,
        "attemptOfflineLoad": apptype == AppType::HybridLocal,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::resolve::{resolve_from_flags, Flags};
    use crate::args::spec::ArgSpec;

    fn resolved(pairs: &[(&str, &str)]) -> ResolvedArgs {
        let specs: Vec<ArgSpec> = pairs
            .iter()
            .map(|(name, _)| ArgSpec::new(*name).prompt(*name))
            .collect();
        let flags: Flags = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        resolve_from_flags(&specs, &flags).unwrap()
    }

    #[test]
    fn native_apps_have_no_bootconfig() {
        let args = resolved(&[("appname", "MyApp")]);
        assert!(bootconfig(&args, AppType::Native).is_none());
        assert!(bootconfig(&args, AppType::ReactNative).is_none());
    }

    #[test]
    fn hybrid_remote_uses_supplied_start_page() {
        let args = resolved(&[("appname", "MyApp"), ("startpage", "apex/start")]);
        let config = bootconfig(&args, AppType::HybridRemote).unwrap();
        assert_eq!(config["startPage"], "apex/start");
        assert_eq!(config["isLocal"], false);
    }

    #[test]
    fn hybrid_local_defaults_the_start_page() {
        let args = resolved(&[("appname", "MyApp")]);
        let config = bootconfig(&args, AppType::HybridLocal).unwrap();
        assert_eq!(config["startPage"], "index.html");
        assert_eq!(config["isLocal"], true);
    }
}
