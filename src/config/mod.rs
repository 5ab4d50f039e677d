//! app-time config.
//!
//! The base configuration of an environment is assembled by the [`builder`], then handed to the
//! project's [`overrides`] before it reaches the compiler.

mod builder;
mod context;
mod environment;
mod models;
mod overrides;
mod paths;
mod server;
mod source;
mod vendor;

pub use builder::{APP_ENTRY, build_config};
pub use context::{AppContext, DevServer};
pub use environment::{BuildEnvironment, DEVELOPMENT, EnvironmentError, PRODUCTION};
pub use models::*;
pub use overrides::{Helpers, apply_user_override, locate_override};
pub use paths::AppPaths;
pub use server::{ProxyRoute, ServerCustomization};

/// Resolve the configuration to compile for an environment: the base configuration, with the
/// project's override applied.
#[tracing::instrument(level = "trace", skip(ctx))]
pub fn resolve(environment: BuildEnvironment, ctx: &AppContext) -> anyhow::Result<Configuration> {
    let base = build_config(environment, ctx)?;
    let helpers = Helpers::from_config(&base);
    let override_file = locate_override(ctx.paths.app_dir(), environment.override_stem());
    Ok(apply_user_override(base, &helpers, override_file.as_deref())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_without_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = AppContext::new_test(dir.path());
        let config = resolve(BuildEnvironment::Vendor, &ctx).expect("resolve");
        assert_eq!(
            config,
            build_config(BuildEnvironment::Vendor, &ctx).expect("base")
        );
    }

    #[test]
    fn resolves_with_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("apptime.config.dll.json"), r#"{"devtool": "source-map"}"#)
            .expect("write");
        let ctx = AppContext::new_test(dir.path());
        let config = resolve(BuildEnvironment::Vendor, &ctx).expect("resolve");
        assert_eq!(config.devtool, Devtool::SourceMap);
    }

    #[test]
    fn production_without_flag_fails_before_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("apptime.config.prod.json"), "{ broken").expect("write");
        let mut ctx = AppContext::new_test(dir.path());
        ctx.node_env = None;
        let err = resolve(BuildEnvironment::Production, &ctx).expect_err("must fail");
        assert!(err.downcast_ref::<EnvironmentError>().is_some());
    }
}
