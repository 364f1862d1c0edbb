use crate::config::RenderConfig;
use crate::ir::TreeType;
use crate::layout::{NodeSize, RenderNode, RenderTree};
use crate::text_metrics::fit_text;
use crate::theme::Theme;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;
#[cfg(feature = "png")]
use std::path::PathBuf;

/// Box dimensions for a node; large boxes scale both sides.
pub fn node_box(node: &RenderNode, config: &RenderConfig) -> (f32, f32) {
    match node.node_size {
        NodeSize::Normal => (config.node_width, config.node_height),
        NodeSize::Large => (
            config.node_width * config.large_scale,
            config.node_height * config.large_scale,
        ),
    }
}

/// Surface size large enough for every drawn box plus the margin, never
/// smaller than the configured minimum.
pub fn compute_surface(tree: &RenderTree, config: &RenderConfig) -> (f32, f32) {
    let mut width = config.min_width;
    let mut height = config.min_height;
    for node in tree.visible_nodes() {
        let (w, h) = node_box(node, config);
        width = width.max(node.x + w + config.margin);
        height = height.max(node.y + h + config.margin);
    }
    (width, height)
}

pub fn render_svg(tree: &RenderTree, theme: &Theme, config: &RenderConfig) -> String {
    let (width, height) = compute_surface(tree, config);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" data-tree-type=\"{}\">",
        tree.tree_type
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    render_node(&mut svg, &tree.root, None, theme, config);

    svg.push_str("</svg>");
    svg
}

fn render_node(
    svg: &mut String,
    node: &RenderNode,
    parent: Option<&RenderNode>,
    theme: &Theme,
    config: &RenderConfig,
) {
    if node.is_virtual_root {
        for child in &node.children {
            render_node(svg, child, None, theme, config);
        }
        return;
    }

    let (w, h) = node_box(node, config);
    if let Some(parent) = parent {
        let (pw, ph) = node_box(parent, config);
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            parent.x + pw,
            parent.y + ph / 2.0,
            node.x,
            node.y + h / 2.0,
            theme.line_color,
            config.connector_width
        ));
    }

    let color = node.node_color.clone().unwrap_or_else(|| theme.neutral.clone());
    svg.push_str(&format!(
        "<g class=\"node\" data-node-id=\"{}\" data-level=\"{}\">",
        escape_xml(&node.node_id.to_string()),
        node.level
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"{r}\" ry=\"{r}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        node.x,
        node.y,
        color.bg,
        color.border,
        r = config.corner_radius
    ));
    svg.push_str(&label_svg(node, w, h, &color.text, theme, config));
    svg.push_str("</g>");

    for child in &node.children {
        render_node(svg, child, Some(node), theme, config);
    }
}

/// Name on the first line, then each line of the display value.
fn label_svg(
    node: &RenderNode,
    w: f32,
    h: f32,
    fill: &str,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let max_width = (w - config.label_padding * 2.0).max(0.0);
    let name = fit_text(&node.name, max_width, theme.font_size, &theme.font_family);
    let values: Vec<&str> = node
        .display_value
        .lines()
        .filter(|line| !line.is_empty())
        .collect();

    let name_step = theme.font_size * config.line_height;
    let value_step = theme.value_font_size * config.line_height;
    let total = name_step + value_step * values.len() as f32;
    let cx = node.x + w / 2.0;
    let mut baseline = node.y + (h - total) / 2.0 + theme.font_size;

    let mut text = format!(
        "<text x=\"{cx:.2}\" y=\"{baseline:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{fill}\">{}</text>",
        theme.font_family,
        theme.font_size,
        escape_xml(&name)
    );
    baseline += name_step - theme.font_size + theme.value_font_size;
    for line in values {
        text.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{baseline:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{fill}\">{}</text>",
            theme.font_family,
            theme.value_font_size,
            escape_xml(line)
        ));
        baseline += value_step;
    }
    text
}

/// `tree-{treeType}-{YYYY-MM-DD}.png`
pub fn export_file_name(tree_type: TreeType, date: NaiveDate) -> String {
    format!("tree-{}-{}.png", tree_type, date.format("%Y-%m-%d"))
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid default render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

/// Rasterizes the current tree into `dir` under the export file name.
/// Without a tree nothing is written and `None` is returned.
#[cfg(feature = "png")]
pub fn export_png(
    tree: Option<&RenderTree>,
    dir: &Path,
    date: NaiveDate,
    theme: &Theme,
    config: &RenderConfig,
) -> Result<Option<PathBuf>> {
    let Some(tree) = tree else {
        tracing::debug!("export requested without a rendered tree");
        return Ok(None);
    };
    let path = dir.join(export_file_name(tree.tree_type, date));
    let svg = render_svg(tree, theme, config);
    write_output_png(&svg, &path, config, theme)?;
    tracing::info!(path = %path.display(), "exported tree image");
    Ok(Some(path))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
