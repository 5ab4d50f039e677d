use serde_json::Value;

/// Libraries bundled into the vendor DLL when the app doesn't declare its own list.
pub const DEFAULT_VENDOR_LIBS: &[&str] = &[
    "core-js",
    "classnames/bind",
    "history",
    "react",
    "react-dom",
    "react-router",
];

/// Read the vendor library list from an app's `package.json`.
///
/// The list lives at `apptime.vendorLibs`; anything other than an array there falls back to the
/// defaults.
pub fn vendor_libs(package: &Value) -> Vec<String> {
    let libs = match package.pointer("/apptime/vendorLibs") {
        Some(Value::Array(libs)) => libs
            .iter()
            .filter_map(|lib| lib.as_str().map(ToString::to_string))
            .collect(),
        _ => default_vendor_libs(),
    };

    tracing::debug!(?libs, "vendor libs");
    libs
}

pub fn default_vendor_libs() -> Vec<String> {
    DEFAULT_VENDOR_LIBS.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declared_list_wins() {
        let pkg = json!({"apptime": {"vendorLibs": ["react", "lodash"]}});
        assert_eq!(vendor_libs(&pkg), vec!["react", "lodash"]);
    }

    #[test]
    fn empty_declared_list_is_kept() {
        let pkg = json!({"apptime": {"vendorLibs": []}});
        assert!(vendor_libs(&pkg).is_empty());
    }

    #[test]
    fn falls_back_to_defaults() {
        assert_eq!(vendor_libs(&json!({})), default_vendor_libs());
        assert_eq!(
            vendor_libs(&json!({"apptime": {"vendorLibs": "react"}})),
            default_vendor_libs()
        );
    }
}
