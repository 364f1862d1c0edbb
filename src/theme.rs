use serde::{Deserialize, Serialize};

/// Fill, text and border color of one node box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColor {
    pub bg: String,
    pub text: String,
    pub border: String,
}

impl NodeColor {
    pub fn new(bg: &str, text: &str, border: &str) -> Self {
        Self {
            bg: bg.to_string(),
            text: text.to_string(),
            border: border.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub value_font_size: f32,
    pub line_color: String,
    pub background: String,
    /// Blue gradient for plain incident counts, indexed by depth.
    pub level_colors: Vec<NodeColor>,
    pub pass: NodeColor,
    pub warning: NodeColor,
    pub borderline: NodeColor,
    pub fail: NodeColor,
    /// Red intensity ramp for red-flag counts: none, few, some, many.
    pub red_flag_colors: Vec<NodeColor>,
    pub neutral: NodeColor,
}

impl Theme {
    pub fn dashboard() -> Self {
        Self {
            font_family: "Inter, Segoe UI, Tahoma, system-ui, sans-serif".to_string(),
            font_size: 14.0,
            value_font_size: 12.0,
            line_color: "#94A3B8".to_string(),
            background: "#FFFFFF".to_string(),
            level_colors: vec![
                NodeColor::new("#1E3A8A", "#FFFFFF", "#1E3A8A"),
                NodeColor::new("#2563EB", "#FFFFFF", "#1D4ED8"),
                NodeColor::new("#60A5FA", "#0F172A", "#3B82F6"),
                NodeColor::new("#BFDBFE", "#0F172A", "#93C5FD"),
            ],
            pass: NodeColor::new("#DCFCE7", "#14532D", "#16A34A"),
            warning: NodeColor::new("#FFEDD5", "#7C2D12", "#EA580C"),
            borderline: NodeColor::new("#FEF3C7", "#78350F", "#D97706"),
            fail: NodeColor::new("#FEE2E2", "#7F1D1D", "#DC2626"),
            red_flag_colors: vec![
                NodeColor::new("#FEF2F2", "#7F1D1D", "#FECACA"),
                NodeColor::new("#FECACA", "#7F1D1D", "#F87171"),
                NodeColor::new("#F87171", "#FFFFFF", "#DC2626"),
                NodeColor::new("#B91C1C", "#FFFFFF", "#7F1D1D"),
            ],
            neutral: NodeColor::new("#F3F4F6", "#374151", "#9CA3AF"),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 15.0,
            value_font_size: 13.0,
            line_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            level_colors: vec![
                NodeColor::new("#000080", "#FFFFFF", "#000000"),
                NodeColor::new("#0000CD", "#FFFFFF", "#000000"),
                NodeColor::new("#4169E1", "#FFFFFF", "#000000"),
                NodeColor::new("#ADD8E6", "#000000", "#000000"),
            ],
            pass: NodeColor::new("#00A000", "#FFFFFF", "#000000"),
            warning: NodeColor::new("#FF8C00", "#000000", "#000000"),
            borderline: NodeColor::new("#FFD700", "#000000", "#000000"),
            fail: NodeColor::new("#D00000", "#FFFFFF", "#000000"),
            red_flag_colors: vec![
                NodeColor::new("#FFE4E1", "#000000", "#000000"),
                NodeColor::new("#FF9999", "#000000", "#000000"),
                NodeColor::new("#FF3333", "#FFFFFF", "#000000"),
                NodeColor::new("#990000", "#FFFFFF", "#000000"),
            ],
            neutral: NodeColor::new("#E5E5E5", "#000000", "#000000"),
        }
    }

    /// Shade for a depth, clamped to the last defined shade.
    pub fn level_color(&self, level: i32) -> NodeColor {
        let idx = level.max(0) as usize;
        self.level_colors
            .get(idx)
            .or_else(|| self.level_colors.last())
            .cloned()
            .unwrap_or_else(|| self.neutral.clone())
    }

    pub fn red_flag_color(&self, bucket: usize) -> NodeColor {
        self.red_flag_colors
            .get(bucket)
            .or_else(|| self.red_flag_colors.last())
            .cloned()
            .unwrap_or_else(|| self.fail.clone())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dashboard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_color_clamps_to_last_shade() {
        let theme = Theme::dashboard();
        assert_eq!(theme.level_color(3), theme.level_color(9));
        assert_ne!(theme.level_color(0), theme.level_color(1));
        assert_eq!(theme.level_color(-1), theme.level_color(0));
    }

    #[test]
    fn empty_ramps_fall_back() {
        let mut theme = Theme::dashboard();
        theme.level_colors.clear();
        theme.red_flag_colors.clear();
        assert_eq!(theme.level_color(2), theme.neutral);
        assert_eq!(theme.red_flag_color(1), theme.fail);
    }
}
