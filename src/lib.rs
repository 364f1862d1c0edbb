#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "fetch")]
pub mod client;
pub mod config;
pub mod ir;
pub mod judgment;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, JudgmentConfig, LayoutConfig, RenderConfig, load_config};
pub use ir::{TreeResponse, TreeType, parse_tree_response};
pub use layout::{RenderNode, RenderTree, build_render_tree};
pub use render::render_svg;
pub use theme::Theme;

/// Everything the pipeline needs besides the tree data.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub judgment: JudgmentConfig,
    pub render: RenderConfig,
}

impl RenderOptions {
    pub fn dashboard() -> Self {
        Self::from_theme(Theme::dashboard())
    }

    pub fn high_contrast() -> Self {
        Self::from_theme(Theme::high_contrast())
    }

    fn from_theme(theme: Theme) -> Self {
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            judgment: JudgmentConfig::default(),
            render,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::dashboard()
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            theme: config.theme.clone(),
            layout: config.layout.clone(),
            judgment: config.judgment,
            render: config.render.clone(),
        }
    }
}

/// Lays out, judges and colors a tree response. The response's own tree type
/// is used unless `tree_type` overrides it. `None` when the tree is empty.
pub fn prepare_tree(
    response: &TreeResponse,
    tree_type: Option<TreeType>,
    options: &RenderOptions,
) -> Option<RenderTree> {
    let mut tree = build_render_tree(response, &options.layout)?;
    let tree_type = tree_type.unwrap_or(response.tree_type);
    judgment::apply(&mut tree, tree_type, &options.judgment, &options.theme);
    Some(tree)
}

/// Parses a tree response and renders it to SVG in one call.
pub fn render_with_options(
    input: &str,
    tree_type: Option<TreeType>,
    options: &RenderOptions,
) -> anyhow::Result<String> {
    let response = parse_tree_response(input)?;
    let tree = prepare_tree(&response, tree_type, options)
        .ok_or_else(|| anyhow::anyhow!("Tree response contains no nodes"))?;
    Ok(render_svg(&tree, &options.theme, &options.render))
}
