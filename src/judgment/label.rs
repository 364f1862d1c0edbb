use crate::ir::TreeType;
use crate::layout::{NodeSize, RenderNode};

use super::percent;

/// Text shown under the node name, plus the box size it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabel {
    pub text: String,
    pub size: NodeSize,
}

impl NodeLabel {
    fn normal(text: String) -> Self {
        Self {
            text,
            size: NodeSize::Normal,
        }
    }

    fn large(lines: &[String]) -> Self {
        Self {
            text: lines.join("\n"),
            size: NodeSize::Large,
        }
    }
}

pub fn label_for(node: &RenderNode, tree_type: TreeType) -> NodeLabel {
    (super::strategy_for(tree_type).label)(node)
}

fn pct(part: u64, total: u64) -> String {
    format!("{:.1}%", percent(part, total))
}

pub(super) fn incident_count(node: &RenderNode) -> NodeLabel {
    NodeLabel::normal(node.count.to_string())
}

pub(super) fn domain_numbers(node: &RenderNode) -> NodeLabel {
    let d = &node.domains;
    NodeLabel::large(&[
        format!("Clinical: {}", d.clinical),
        format!("Management: {}", d.management),
        format!("Relational: {}", d.relational),
    ])
}

pub(super) fn domain_percentage(node: &RenderNode) -> NodeLabel {
    let d = &node.domains;
    NodeLabel::large(&[
        format!("Clinical: {}", pct(d.clinical, node.count)),
        format!("Management: {}", pct(d.management, node.count)),
        format!("Relational: {}", pct(d.relational, node.count)),
    ])
}

pub(super) fn severity_numbers(node: &RenderNode) -> NodeLabel {
    let s = &node.severity;
    NodeLabel::large(&[
        format!("Low: {}", s.low),
        format!("Medium: {}", s.medium),
        format!("High: {}", s.high),
    ])
}

pub(super) fn severity_percentage(node: &RenderNode) -> NodeLabel {
    let s = &node.severity;
    NodeLabel::large(&[
        format!("Low: {}", pct(s.low, node.count)),
        format!("Medium: {}", pct(s.medium, node.count)),
        format!("High: {}", pct(s.high, node.count)),
    ])
}

pub(super) fn red_flags(node: &RenderNode) -> NodeLabel {
    NodeLabel::normal(format!("Red flags: {}", node.red_flags))
}

pub(super) fn never_events(node: &RenderNode) -> NodeLabel {
    NodeLabel::normal(format!("Never events: {}", node.never_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeId;
    use crate::layout::{DomainCounts, SeverityCounts};

    fn node() -> RenderNode {
        RenderNode {
            node_id: NodeId::Int(3),
            name: "ICU".to_string(),
            name_en: "ICU".to_string(),
            name_ar: String::new(),
            count: 8,
            node_type: Some("department".to_string()),
            level: 1,
            x: 420.0,
            y: 20.0,
            domains: DomainCounts {
                clinical: 5,
                management: 2,
                relational: 1,
            },
            severity: SeverityCounts {
                low: 4,
                medium: 3,
                high: 1,
            },
            red_flags: 2,
            never_events: 0,
            children: Vec::new(),
            display_value: String::new(),
            node_color: None,
            node_size: NodeSize::Normal,
            is_virtual_root: false,
        }
    }

    #[test]
    fn single_value_modes_are_normal_size() {
        let n = node();
        assert_eq!(label_for(&n, TreeType::IncidentCount).text, "8");
        assert_eq!(label_for(&n, TreeType::RedFlagIncidents).text, "Red flags: 2");
        assert_eq!(label_for(&n, TreeType::NeverEventIncidents).text, "Never events: 0");
        for tree_type in [
            TreeType::IncidentCount,
            TreeType::RedFlagIncidents,
            TreeType::NeverEventIncidents,
            TreeType::Unknown,
        ] {
            assert_eq!(label_for(&n, tree_type).size, NodeSize::Normal);
        }
    }

    #[test]
    fn breakdown_modes_are_large_multiline() {
        let n = node();
        let label = label_for(&n, TreeType::DomainDistributionNumbers);
        assert_eq!(label.size, NodeSize::Large);
        assert_eq!(label.text, "Clinical: 5\nManagement: 2\nRelational: 1");
        let label = label_for(&n, TreeType::SeverityDistributionNumbers);
        assert_eq!(label.text, "Low: 4\nMedium: 3\nHigh: 1");
    }

    #[test]
    fn percentages_use_one_decimal() {
        let n = node();
        let label = label_for(&n, TreeType::DomainDistributionPercentage);
        assert_eq!(label.text, "Clinical: 62.5%\nManagement: 25.0%\nRelational: 12.5%");
        let label = label_for(&n, TreeType::SeverityDistributionPercentage);
        assert_eq!(label.text, "Low: 50.0%\nMedium: 37.5%\nHigh: 12.5%");
    }

    #[test]
    fn zero_total_percentages_read_zero() {
        let mut n = node();
        n.count = 0;
        let label = label_for(&n, TreeType::SeverityDistributionPercentage);
        assert_eq!(label.text, "Low: 0.0%\nMedium: 0.0%\nHigh: 0.0%");
    }
}
