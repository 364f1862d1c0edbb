use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const X_POSITIONS: [f32; 4] = [50.0, 420.0, 790.0, 1160.0];
const VERTICAL_SPACING: f32 = 150.0;
const ADMINISTRATION_GAP: f32 = 100.0;
const START_Y: f32 = 20.0;

pub const VIRTUAL_ROOT_ID: &str = "virtual-hospital-root";

/// Which of the API's names is shown in the node box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameLanguage {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Column x coordinate per depth; deeper levels reuse the last column.
    pub x_positions: Vec<f32>,
    pub vertical_spacing: f32,
    /// Extra whitespace before every administration block after the first.
    pub administration_gap: f32,
    pub start_y: f32,
    pub virtual_root_name: String,
    pub virtual_root_name_ar: String,
    pub name_language: NameLanguage,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_positions: X_POSITIONS.to_vec(),
            vertical_spacing: VERTICAL_SPACING,
            administration_gap: ADMINISTRATION_GAP,
            start_y: START_Y,
            virtual_root_name: "Hospital".to_string(),
            virtual_root_name_ar: "المستشفى".to_string(),
            name_language: NameLanguage::En,
        }
    }
}

impl LayoutConfig {
    pub fn x_for_level(&self, level: i32) -> f32 {
        let idx = (level.max(0) as usize).min(self.x_positions.len().saturating_sub(1));
        self.x_positions.get(idx).copied().unwrap_or(0.0)
    }
}

/// Domain bucket limits; a bucket passes when it is at or below its limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainThresholds {
    pub clinical: f64,
    pub management: f64,
    pub relational: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentConfig {
    pub domain_numbers: DomainThresholds,
    pub domain_percentage: DomainThresholds,
    pub severity_low: f64,
    pub severity_medium: f64,
    pub severity_high_percentage: f64,
    /// Fraction of a severity threshold at which a node turns amber.
    pub borderline_ratio: f64,
    pub red_flag_few: u64,
    pub red_flag_some: u64,
}

impl Default for JudgmentConfig {
    fn default() -> Self {
        Self {
            domain_numbers: DomainThresholds {
                clinical: 10.0,
                management: 5.0,
                relational: 5.0,
            },
            domain_percentage: DomainThresholds {
                clinical: 60.0,
                management: 25.0,
                relational: 15.0,
            },
            severity_low: 20.0,
            severity_medium: 10.0,
            severity_high_percentage: 10.0,
            borderline_ratio: 0.8,
            red_flag_few: 5,
            red_flag_some: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub node_width: f32,
    pub node_height: f32,
    pub large_scale: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub margin: f32,
    pub corner_radius: f32,
    pub label_padding: f32,
    pub line_height: f32,
    pub connector_width: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            node_width: 220.0,
            node_height: 70.0,
            large_scale: 1.5,
            min_width: 1200.0,
            min_height: 600.0,
            margin: 50.0,
            corner_radius: 8.0,
            label_padding: 12.0,
            line_height: 1.35,
            connector_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub tree_path: String,
    pub seasons_path: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            tree_path: "/api/incidents/investigation-tree".to_string(),
            seasons_path: "/api/incidents/investigation-tree/seasons".to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub judgment: JudgmentConfig,
    pub render: RenderConfig,
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::dashboard();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            judgment: JudgmentConfig::default(),
            render,
            api: ApiConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    value_font_size: Option<f32>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    x_positions: Option<Vec<f32>>,
    vertical_spacing: Option<f32>,
    administration_gap: Option<f32>,
    start_y: Option<f32>,
    virtual_root_name: Option<String>,
    virtual_root_name_ar: Option<String>,
    name_language: Option<NameLanguage>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DomainThresholdsFile {
    clinical: Option<f64>,
    management: Option<f64>,
    relational: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThresholdsFile {
    domain_numbers: Option<DomainThresholdsFile>,
    domain_percentage: Option<DomainThresholdsFile>,
    severity_low: Option<f64>,
    severity_medium: Option<f64>,
    severity_high_percentage: Option<f64>,
    borderline_ratio: Option<f64>,
    red_flag_few: Option<u64>,
    red_flag_some: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    large_scale: Option<f32>,
    min_width: Option<f32>,
    min_height: Option<f32>,
    margin: Option<f32>,
    corner_radius: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ApiConfigFile {
    base_url: Option<String>,
    tree_path: Option<String>,
    seasons_path: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    thresholds: Option<ThresholdsFile>,
    render: Option<RenderConfigFile>,
    api: Option<ApiConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Overlays a JSON5 config document onto the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    match parsed.theme.as_deref() {
        Some("high-contrast") | Some("highContrast") => config.theme = Theme::high_contrast(),
        Some("dashboard") | Some("default") | None => {}
        Some(other) => return Err(anyhow::anyhow!("unknown theme: {other}")),
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.value_font_size {
            config.theme.value_font_size = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.x_positions {
            if v.is_empty() {
                return Err(anyhow::anyhow!("layout.xPositions must not be empty"));
            }
            config.layout.x_positions = v;
        }
        if let Some(v) = layout.vertical_spacing {
            config.layout.vertical_spacing = v;
        }
        if let Some(v) = layout.administration_gap {
            config.layout.administration_gap = v;
        }
        if let Some(v) = layout.start_y {
            config.layout.start_y = v;
        }
        if let Some(v) = layout.virtual_root_name {
            config.layout.virtual_root_name = v;
        }
        if let Some(v) = layout.virtual_root_name_ar {
            config.layout.virtual_root_name_ar = v;
        }
        if let Some(v) = layout.name_language {
            config.layout.name_language = v;
        }
    }

    if let Some(thresholds) = parsed.thresholds {
        let judgment = &mut config.judgment;
        if let Some(v) = thresholds.domain_numbers {
            overlay_domain(&mut judgment.domain_numbers, v);
        }
        if let Some(v) = thresholds.domain_percentage {
            overlay_domain(&mut judgment.domain_percentage, v);
        }
        if let Some(v) = thresholds.severity_low {
            judgment.severity_low = v;
        }
        if let Some(v) = thresholds.severity_medium {
            judgment.severity_medium = v;
        }
        if let Some(v) = thresholds.severity_high_percentage {
            judgment.severity_high_percentage = v;
        }
        if let Some(v) = thresholds.borderline_ratio {
            judgment.borderline_ratio = v;
        }
        if let Some(v) = thresholds.red_flag_few {
            judgment.red_flag_few = v;
        }
        if let Some(v) = thresholds.red_flag_some {
            judgment.red_flag_some = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.node_width {
            config.render.node_width = v;
        }
        if let Some(v) = render.node_height {
            config.render.node_height = v;
        }
        if let Some(v) = render.large_scale {
            config.render.large_scale = v;
        }
        if let Some(v) = render.min_width {
            config.render.min_width = v;
        }
        if let Some(v) = render.min_height {
            config.render.min_height = v;
        }
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
        if let Some(v) = render.corner_radius {
            config.render.corner_radius = v;
        }
    }

    if let Some(api) = parsed.api {
        if let Some(v) = api.base_url {
            config.api.base_url = Some(v);
        }
        if let Some(v) = api.tree_path {
            config.api.tree_path = v;
        }
        if let Some(v) = api.seasons_path {
            config.api.seasons_path = v;
        }
        if let Some(v) = api.timeout_ms {
            config.api.timeout_ms = v;
        }
    }

    Ok(config)
}

fn overlay_domain(target: &mut DomainThresholds, file: DomainThresholdsFile) {
    if let Some(v) = file.clinical {
        target.clinical = v;
    }
    if let Some(v) = file.management {
        target.management = v;
    }
    if let Some(v) = file.relational {
        target.relational = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_for_level_clamps_to_last_column() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.x_for_level(0), 50.0);
        assert_eq!(layout.x_for_level(1), 420.0);
        assert_eq!(layout.x_for_level(3), 1160.0);
        assert_eq!(layout.x_for_level(7), 1160.0);
        assert_eq!(layout.x_for_level(-1), 50.0);
    }

    #[test]
    fn config_file_overlays_defaults() {
        let config = parse_config(
            r#"{
                // comments are allowed
                theme: "high-contrast",
                themeVariables: { fontSize: 18 },
                layout: { verticalSpacing: 120, nameLanguage: "ar" },
                thresholds: { domainNumbers: { clinical: 12 }, severityLow: 30 },
                api: { baseUrl: "http://localhost:8000", timeoutMs: 5000 },
            }"#,
        )
        .unwrap();
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.theme.line_color, "#000000");
        assert_eq!(config.layout.vertical_spacing, 120.0);
        assert_eq!(config.layout.administration_gap, 100.0);
        assert_eq!(config.layout.name_language, NameLanguage::Ar);
        assert_eq!(config.judgment.domain_numbers.clinical, 12.0);
        assert_eq!(config.judgment.domain_numbers.management, 5.0);
        assert_eq!(config.judgment.severity_low, 30.0);
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.api.timeout_ms, 5000);
    }

    #[test]
    fn rejects_unknown_theme_and_empty_columns() {
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
        assert!(parse_config(r#"{"layout": {"xPositions": []}}"#).is_err());
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.x_positions, X_POSITIONS.to_vec());
        assert_eq!(config.render.background, config.theme.background);
    }
}
