//! Judgment protocol: per tree type, how a node is colored and labeled.
//!
//! Each [`TreeType`] maps to a [`Strategy`] pairing a color evaluator with a
//! label formatter. Both are pure functions of the node, so a tree can be
//! re-judged under another tree type without re-running the layout.

mod color;
mod label;

pub use color::{
    Verdict, color_for, domain_verdict, never_event_verdict, red_flag_bucket,
    severity_numbers_verdict, severity_percentage_verdict,
};
pub use label::{NodeLabel, label_for};

use crate::config::JudgmentConfig;
use crate::ir::TreeType;
use crate::layout::{RenderNode, RenderTree};
use crate::theme::{NodeColor, Theme};

pub type ColorFn = fn(&RenderNode, i32, &JudgmentConfig, &Theme) -> NodeColor;
pub type LabelFn = fn(&RenderNode) -> NodeLabel;

#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub color: ColorFn,
    pub label: LabelFn,
}

static REGISTRY: [(TreeType, Strategy); 7] = [
    (
        TreeType::IncidentCount,
        Strategy {
            color: color::incident_count,
            label: label::incident_count,
        },
    ),
    (
        TreeType::DomainDistributionNumbers,
        Strategy {
            color: color::domain_numbers,
            label: label::domain_numbers,
        },
    ),
    (
        TreeType::DomainDistributionPercentage,
        Strategy {
            color: color::domain_percentage,
            label: label::domain_percentage,
        },
    ),
    (
        TreeType::SeverityDistributionNumbers,
        Strategy {
            color: color::severity_numbers,
            label: label::severity_numbers,
        },
    ),
    (
        TreeType::SeverityDistributionPercentage,
        Strategy {
            color: color::severity_percentage,
            label: label::severity_percentage,
        },
    ),
    (
        TreeType::RedFlagIncidents,
        Strategy {
            color: color::red_flags,
            label: label::red_flags,
        },
    ),
    (
        TreeType::NeverEventIncidents,
        Strategy {
            color: color::never_events,
            label: label::never_events,
        },
    ),
];

static NEUTRAL: Strategy = Strategy {
    color: color::neutral,
    label: label::incident_count,
};

pub fn strategy_for(tree_type: TreeType) -> &'static Strategy {
    REGISTRY
        .iter()
        .find(|(tag, _)| *tag == tree_type)
        .map(|(_, strategy)| strategy)
        .unwrap_or(&NEUTRAL)
}

/// `part / total * 100`, or 0 for an empty total.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Fills color, label and size of every node under `tree_type`.
pub fn apply(tree: &mut RenderTree, tree_type: TreeType, config: &JudgmentConfig, theme: &Theme) {
    let strategy = strategy_for(tree_type);
    if tree_type == TreeType::Unknown {
        tracing::warn!("unknown tree type; using neutral coloring");
    }
    tree.tree_type = tree_type;
    tree.root.walk_mut(&mut |node| {
        node.node_color = Some((strategy.color)(node, node.level, config, theme));
        let label = (strategy.label)(node);
        node.display_value = label.text;
        node.node_size = label.size;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::parse_tree_response;
    use crate::layout::{NodeSize, build_render_tree};

    #[test]
    fn every_known_tree_type_has_a_strategy() {
        for tree_type in TreeType::ALL {
            let found = REGISTRY.iter().filter(|(tag, _)| *tag == tree_type).count();
            assert_eq!(found, 1, "{tree_type}");
        }
    }

    #[test]
    fn percent_guards_zero_total() {
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn apply_fills_every_node_and_can_rejudge() {
        let response = parse_tree_response(
            r#"{"scope": {"level": "department"}, "tree": [
                {"node_id": 1, "node_name": "A", "value": 10, "never_event_count": 1,
                 "children": [{"node_id": 2, "node_name": "B", "value": 10}]}
            ]}"#,
        )
        .unwrap();
        let theme = Theme::dashboard();
        let config = JudgmentConfig::default();
        let mut tree = build_render_tree(&response, &LayoutConfig::default()).unwrap();

        apply(&mut tree, TreeType::NeverEventIncidents, &config, &theme);
        assert_eq!(tree.root.node_color.as_ref(), Some(&theme.fail));
        assert_eq!(tree.root.children[0].node_color.as_ref(), Some(&theme.pass));
        assert_eq!(tree.root.display_value, "Never events: 1");

        apply(&mut tree, TreeType::SeverityDistributionNumbers, &config, &theme);
        assert_eq!(tree.tree_type, TreeType::SeverityDistributionNumbers);
        assert_eq!(tree.root.node_size, NodeSize::Large);
        assert!(tree.root.display_value.starts_with("Low: 0"));
    }

    #[test]
    fn unknown_tree_type_is_neutral() {
        let response = parse_tree_response(
            r#"{"tree": [{"node_id": 1, "node_name": "A", "value": 7}]}"#,
        )
        .unwrap();
        let theme = Theme::dashboard();
        let mut tree = build_render_tree(&response, &LayoutConfig::default()).unwrap();
        apply(&mut tree, TreeType::Unknown, &JudgmentConfig::default(), &theme);
        assert_eq!(tree.root.node_color.as_ref(), Some(&theme.neutral));
        assert_eq!(tree.root.display_value, "7");
        assert_eq!(tree.root.node_size, NodeSize::Normal);
    }
}
