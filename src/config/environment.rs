use strum::{Display, EnumString};

/// The value of `NODE_ENV` a production build requires.
pub const PRODUCTION: &str = "production";
/// The value of `NODE_ENV` used for everything else.
pub const DEVELOPMENT: &str = "development";

/// The environment a configuration is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BuildEnvironment {
    /// The dev server, with hot reloading.
    Development,
    /// The optimized, pre-rendered production build.
    Production,
    /// The vendor DLL prebuild.
    Vendor,
}

impl BuildEnvironment {
    /// The `NODE_ENV` value the compiler runs with.
    pub fn node_env(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION,
            Self::Development | Self::Vendor => DEVELOPMENT,
        }
    }

    /// File stem of the override file a project can provide for this environment.
    pub fn override_stem(self) -> &'static str {
        match self {
            Self::Development => "apptime.config.dev",
            Self::Production => "apptime.config.prod",
            Self::Vendor => "apptime.config.dll",
        }
    }

    /// Short name used in generated file names.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prod",
            Self::Vendor => "dll",
        }
    }
}

/// Precondition violations of the process environment.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error(
        "Tried to build for production in non-production environment (NODE_ENV={}). \
         Production builds must have NODE_ENV=production. Try:\n\n    $ NODE_ENV=production app-time build\n",
        found.as_deref().unwrap_or("<unset>")
    )]
    NotProduction { found: Option<String> },
}

/// Ensure the captured `NODE_ENV` allows a production build.
pub fn ensure_production(node_env: Option<&str>) -> Result<(), EnvironmentError> {
    match node_env {
        Some(PRODUCTION) => Ok(()),
        other => Err(EnvironmentError::NotProduction {
            found: other.map(ToString::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(Some("production"), true)]
    #[case(Some("development"), false)]
    #[case(Some("Production"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn production_check(#[case] node_env: Option<&str>, #[case] ok: bool) {
        assert_eq!(ensure_production(node_env).is_ok(), ok);
    }

    #[test]
    fn error_names_the_remedy() {
        let err = ensure_production(Some("development")).expect_err("must fail");
        let msg = err.to_string();
        assert!(msg.contains("NODE_ENV=development"));
        assert!(msg.contains("$ NODE_ENV=production app-time build"));
    }

    #[test]
    fn parses_names() {
        assert_eq!(
            BuildEnvironment::from_str("vendor").expect("parse"),
            BuildEnvironment::Vendor
        );
        assert_eq!(BuildEnvironment::Production.to_string(), "production");
    }
}
