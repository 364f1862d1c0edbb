use incident_tree_renderer::{RenderOptions, TreeType, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRenderOptions {
    theme: Option<String>,
    tree_type: Option<TreeType>,
    font_family: Option<String>,
    font_size: Option<f32>,
    language: Option<String>,
}

fn build_render_options(options: &TreeRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("high-contrast") {
        RenderOptions::high_contrast()
    } else {
        RenderOptions::dashboard()
    };

    if let Some(font_family) = &options.font_family {
        render_options.theme.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if options.language.as_deref() == Some("ar") {
        render_options.layout.name_language = incident_tree_renderer::config::NameLanguage::Ar;
    }

    render_options
}

/// Renders an investigation tree API response to an SVG string.
#[wasm_bindgen]
pub fn render_incident_tree_svg(tree_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TreeRenderOptions::default()
    };

    let render_options = build_render_options(&options);
    render_with_options(tree_json, options.tree_type, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
