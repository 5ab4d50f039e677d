//! Base configurations, one per build environment.

mod rules;


use crate::config::{
    AppContext, BuildEnvironment, BundleAnalyzer, CommonsChunk, Configuration, CssExtraction,
    Dashboard, Definitions, Devtool, Dll, DllReference, EnvironmentError, LoaderOptions, Manifest,
    Minify, Module, Output, Performance, Plugin, Resolve, StaticSiteRender, environment,
};
use std::collections::BTreeMap;

/// The bundle holding the app.
pub const APP_ENTRY: &str = "app";
/// The bundle holding the vendor libraries.
pub const VENDOR_ENTRY: &str = "vendor";
/// Client of the hot reload event stream.
pub const HOT_CLIENT: &str = "webpack-hot-middleware/client";
/// Polyfills loaded ahead of the app.
pub const POLYFILL_ENTRY: &str = "babel-polyfill";
/// Name of the global variable the vendor DLL is exposed as.
pub const DLL_LIBRARY: &str = "[name]_dll_[hash]";

/// Build the base configuration for an environment.
///
/// A production configuration requires `NODE_ENV=production` in the context, so a development
/// bundle never ships by accident.
pub fn build_config(
    environment: BuildEnvironment,
    ctx: &AppContext,
) -> Result<Configuration, EnvironmentError> {
    let config = match environment {
        BuildEnvironment::Development => development(ctx),
        BuildEnvironment::Production => {
            environment::ensure_production(ctx.node_env.as_deref())?;
            production(ctx)
        }
        BuildEnvironment::Vendor => vendor(ctx),
    };

    tracing::debug!(
        %environment,
        plugins = ?config.plugin_kinds(),
        "built base configuration"
    );
    Ok(config)
}

fn development(ctx: &AppContext) -> Configuration {
    let paths = &ctx.paths;
    let host = &ctx.dev_server.host;

    let entry = BTreeMap::from([(
        APP_ENTRY.to_string(),
        vec![
            format!("{HOT_CLIENT}?path={}", ctx.dev_server.hmr_path()),
            POLYFILL_ENTRY.to_string(),
            path_string(paths.resolve_app("client/index.js")),
        ],
    )]);

    let mut plugins = vec![
        Plugin::HotModuleReplacement,
        Plugin::NoEmitOnErrors,
        Plugin::LoaderOptions(LoaderOptions {
            minimize: false,
            options: rules::loader_options(),
        }),
        Plugin::Define(Definitions::node_env(environment::DEVELOPMENT)),
        Plugin::DllReference(DllReference {
            context: paths.app_dir().to_path_buf(),
            manifest: paths.vendor_manifest(),
        }),
    ];
    if ctx.dashboard {
        plugins.push(Plugin::Dashboard(Dashboard::default()));
    }

    let mut module_rules = vec![
        rules::javascript(paths, true),
        rules::css(false),
        rules::stylus(false, "[name]__[local]__[hash:base64:6]"),
    ];
    module_rules.extend(rules::assets());

    Configuration {
        devtool: Devtool::CheapModuleEvalSourceMap,
        context: None,
        entry,
        output: Output {
            path: paths.dev_output(),
            filename: "[name].js".into(),
            public_path: Some(host.clone()),
            library: None,
        },
        plugins,
        module: Module {
            rules: module_rules,
        },
        resolve: module_resolution(),
        resolve_loader: Some(loader_resolution(ctx)),
        performance: Performance::quiet(),
    }
}

fn production(ctx: &AppContext) -> Configuration {
    let paths = &ctx.paths;

    let entry = BTreeMap::from([(
        APP_ENTRY.to_string(),
        vec![
            POLYFILL_ENTRY.to_string(),
            "normalize.css".to_string(),
            path_string(paths.resolve_app("client/index.js")),
        ],
    )]);

    let mut plugins = vec![
        Plugin::LoaderOptions(LoaderOptions {
            minimize: true,
            options: rules::loader_options(),
        }),
        Plugin::CssExtraction(CssExtraction {
            filename: "[name].css".into(),
            all_chunks: true,
        }),
        Plugin::Define(Definitions::node_env(environment::PRODUCTION)),
        Plugin::CommonsChunk(CommonsChunk {
            name: VENDOR_ENTRY.into(),
            node_modules_only: true,
        }),
        Plugin::Manifest(Manifest {
            file_name: "manifest.json".into(),
        }),
        Plugin::Minify(Minify {
            source_map: true,
            screw_ie8: true,
            warnings: false,
        }),
        Plugin::StaticSiteRender(StaticSiteRender {
            routes: paths.resolve_app("client/routes.js"),
            template: paths.resolve_app("template.js"),
            redux_store: None,
        }),
    ];
    if ctx.analyze {
        plugins.push(Plugin::BundleAnalyzer(BundleAnalyzer {
            analyzer_mode: "static".into(),
            report_filename: "report.html".into(),
            open_analyzer: false,
        }));
    }

    let mut module_rules = vec![
        rules::javascript(paths, false),
        rules::css(true),
        rules::stylus(true, "[hash:base64:8]"),
    ];
    module_rules.extend(rules::assets());

    Configuration {
        devtool: Devtool::SourceMap,
        context: None,
        entry,
        output: Output {
            path: paths.resolve_app("build"),
            filename: "[name].js".into(),
            public_path: Some("/".into()),
            library: None,
        },
        plugins,
        module: Module {
            rules: module_rules,
        },
        resolve: module_resolution(),
        resolve_loader: Some(loader_resolution(ctx)),
        performance: Performance::hints(),
    }
}

fn vendor(ctx: &AppContext) -> Configuration {
    let paths = &ctx.paths;

    let mut module_rules = vec![rules::css(false)];
    module_rules.extend(rules::assets());

    Configuration {
        devtool: Devtool::Eval,
        context: Some(paths.app_dir().to_path_buf()),
        entry: BTreeMap::from([(VENDOR_ENTRY.to_string(), ctx.vendor_libs.clone())]),
        output: Output {
            path: paths.temp_dir(),
            filename: "[name].dll.js".into(),
            public_path: None,
            library: Some(DLL_LIBRARY.into()),
        },
        plugins: vec![Plugin::Dll(Dll {
            path: paths.temp_dir().join("[name]-manifest.json"),
            name: DLL_LIBRARY.into(),
        })],
        module: Module {
            rules: module_rules,
        },
        resolve: module_resolution(),
        resolve_loader: None,
        performance: Performance::quiet(),
    }
}

/// Modules resolve from `web_modules` too, for modules owned by the app.
fn module_resolution() -> Resolve {
    Resolve {
        modules: vec!["web_modules".into(), "node_modules".into()],
    }
}

/// Loaders resolve from app-time's own modules first, then from the app.
fn loader_resolution(ctx: &AppContext) -> Resolve {
    Resolve {
        modules: vec![
            path_string(ctx.paths.own_node_modules()),
            path_string(ctx.paths.app_node_modules()),
        ],
    }
}

fn path_string(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
