//! Loader rules shared between the environments.

use crate::config::{AppPaths, Loader, Rule};
use serde_json::json;

pub const JS: &str = r"\.js$";
pub const CSS: &str = r"\.css$";
pub const STYLUS: &str = r"\.styl$";
pub const WOFF: &str = r"\.woff(2)?(\?v=[0-9]\.[0-9]\.[0-9])?$";
pub const FONTS: &str = r"\.(ttf|eot|svg)(\?v=[0-9]\.[0-9]\.[0-9])?$";
pub const IMAGES: &str = r"\.(png|jpg|gif|ico)$";

/// Transpile the app's own scripts, adding the hot reload preset when `hot` is set.
pub fn javascript(paths: &AppPaths, hot: bool) -> Rule {
    let mut options = json!({
        "babelrc": false,
        "presets": [
            ["babel-preset-es2015", {"modules": false}],
            "babel-preset-react",
            "babel-preset-stage-1",
        ],
    });
    if hot {
        options["env"] = json!({
            "development": {"presets": ["babel-preset-react-hmre"]},
        });
    }

    Rule::new(JS, [Loader::with_options("babel-loader", options)]).exclude(paths.app_node_modules())
}

/// Plain stylesheets. Extracted rules get their `style-loader` from the extraction plugin.
pub fn css(extract: bool) -> Rule {
    let loaders = match extract {
        true => vec![Loader::new("css-loader")],
        false => vec![Loader::new("style-loader"), Loader::new("css-loader")],
    };
    Rule::new(CSS, loaders).extract(extract)
}

/// Stylus with CSS modules, `ident_name` being the generated class name pattern.
pub fn stylus(extract: bool, ident_name: &str) -> Rule {
    let mut loaders = Vec::with_capacity(4);
    if !extract {
        loaders.push(Loader::new("style-loader"));
    }
    loaders.extend([
        Loader::with_options(
            "css-loader",
            json!({"modules": true, "importLoaders": 2, "localIdentName": ident_name}),
        ),
        Loader::new("postcss-loader"),
        Loader::new("stylus-loader"),
    ]);
    Rule::new(STYLUS, loaders).extract(extract)
}

/// Fonts, images & other static assets.
pub fn assets() -> Vec<Rule> {
    vec![
        Rule::new(
            WOFF,
            [Loader::with_options(
                "url-loader",
                json!({"limit": 10000, "mimetype": "application/font-woff"}),
            )],
        ),
        Rule::new(FONTS, [Loader::new("file-loader")]),
        Rule::new(
            IMAGES,
            [Loader::with_options("file-loader", json!({"name": "[name].[ext]"}))],
        ),
    ]
}

/// Options of the loader-options plugin: autoprefixer for postcss, rupture for stylus.
pub fn loader_options() -> serde_json::Value {
    json!({
        "postcss": {"autoprefixer": {"browsers": ["last 2 versions"]}},
        "stylus": {"use": ["rupture"]},
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use rstest::rstest;

    #[rstest]
    #[case(JS, "client/index.js", true)]
    #[case(JS, "client/index.jsx", false)]
    #[case(STYLUS, "button.styl", true)]
    #[case(WOFF, "font.woff2?v=1.2.3", true)]
    #[case(WOFF, "font.woff", true)]
    #[case(FONTS, "icons.svg?v=4.7.0", true)]
    #[case(FONTS, "icons.svgz", false)]
    #[case(IMAGES, "logo.png", true)]
    #[case(IMAGES, "logo.webp", false)]
    fn patterns_match(#[case] pattern: &str, #[case] path: &str, #[case] matches: bool) {
        let regex = Regex::new(pattern).expect("pattern must compile");
        assert_eq!(regex.is_match(path), matches);
    }

    #[test]
    fn extracted_rules_leave_out_style_loader() {
        let rule = stylus(true, "[hash:base64:8]");
        assert!(rule.extract);
        assert!(rule.loaders.iter().all(|l| l.loader != "style-loader"));

        let rule = css(false);
        assert!(!rule.extract);
        assert_eq!(rule.loaders[0].loader, "style-loader");
    }
}
