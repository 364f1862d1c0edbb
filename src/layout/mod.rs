pub(crate) mod types;
pub use types::*;

use crate::config::{LayoutConfig, NameLanguage, VIRTUAL_ROOT_ID};
use crate::ir::{IncidentTreeNode, NodeId, ScopeLevel, TreeResponse};

/// Running vertical position shared by one transform.
///
/// Every node takes the current value and advances it, so no two nodes of the
/// same transform ever share a `y`.
#[derive(Debug, Clone, Copy)]
pub struct LayoutCursor {
    next_y: f32,
    spacing: f32,
    administration_gap: f32,
}

impl LayoutCursor {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            next_y: config.start_y,
            spacing: config.vertical_spacing,
            administration_gap: config.administration_gap,
        }
    }

    pub fn next_y(&self) -> f32 {
        self.next_y
    }

    fn take(&mut self) -> f32 {
        let y = self.next_y;
        self.next_y += self.spacing;
        y
    }

    fn skip_gap(&mut self) {
        self.next_y += self.administration_gap;
    }
}

/// Converts sibling API nodes into render nodes with column `x` and
/// cursor-assigned `y`, recursing pre-order. Sibling order is preserved.
pub fn transform(
    nodes: &[IncidentTreeNode],
    level: i32,
    is_admin_level: bool,
    cursor: &mut LayoutCursor,
    config: &LayoutConfig,
) -> Vec<RenderNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if is_admin_level && idx > 0 {
            cursor.skip_gap();
        }
        let x = config.x_for_level(level);
        let y = cursor.take();
        let children = transform(&node.children, level + 1, false, cursor, config);
        let name_en = node.node_name.clone();
        let name_ar = node.node_name_ar.clone().unwrap_or_default();
        out.push(RenderNode {
            node_id: node.node_id.clone(),
            name: display_name(&name_en, &name_ar, config.name_language),
            name_en,
            name_ar,
            count: node.value,
            node_type: node.node_type.clone(),
            level,
            x,
            y,
            domains: node.domain_breakdown.into(),
            severity: node.severity_breakdown.into(),
            red_flags: node.red_flag_count,
            never_events: node.never_event_count,
            children,
            display_value: String::new(),
            node_color: None,
            node_size: NodeSize::Normal,
            is_virtual_root: false,
        });
    }
    out
}

/// Picks the root shape for a response: a virtual hospital root over several
/// administrations, or the first top-level node.
pub fn assemble(response: &TreeResponse, config: &LayoutConfig) -> Option<RenderNode> {
    let mut cursor = LayoutCursor::new(config);
    if response.scope.level == ScopeLevel::Hospital && response.tree.len() > 1 {
        let children = transform(&response.tree, 0, true, &mut cursor, config);
        tracing::debug!(
            administrations = children.len(),
            "wrapping administrations under virtual hospital root"
        );
        return Some(virtual_root(children, response.summary.total_incidents, config));
    }

    let mut roots = transform(&response.tree, 0, false, &mut cursor, config);
    if roots.len() > 1 {
        tracing::warn!(
            dropped = roots.len() - 1,
            "multiple top-level nodes outside hospital scope; rendering the first"
        );
    }
    if roots.is_empty() {
        None
    } else {
        Some(roots.swap_remove(0))
    }
}

fn virtual_root(children: Vec<RenderNode>, total: u64, config: &LayoutConfig) -> RenderNode {
    let name_en = config.virtual_root_name.clone();
    let name_ar = config.virtual_root_name_ar.clone();
    RenderNode {
        node_id: NodeId::Text(VIRTUAL_ROOT_ID.to_string()),
        name: display_name(&name_en, &name_ar, config.name_language),
        name_en,
        name_ar,
        count: total,
        node_type: Some("hospital".to_string()),
        level: -1,
        x: config.x_for_level(0),
        y: config.start_y,
        domains: DomainCounts::default(),
        severity: SeverityCounts::default(),
        red_flags: 0,
        never_events: 0,
        children,
        display_value: String::new(),
        node_color: None,
        node_size: NodeSize::Normal,
        is_virtual_root: true,
    }
}

/// Post-order pass placing every interior node halfway between its first and
/// last (already centered) child. Leaves keep their assigned `y`.
pub fn center(mut node: RenderNode) -> RenderNode {
    if node.children.is_empty() {
        return node;
    }
    node.children = std::mem::take(&mut node.children)
        .into_iter()
        .map(center)
        .collect();
    if let (Some(first), Some(last)) = (node.children.first(), node.children.last()) {
        node.y = (first.y + last.y) / 2.0;
    }
    node
}

/// Assemble then center. `None` when the response holds no nodes.
pub fn build_render_tree(response: &TreeResponse, config: &LayoutConfig) -> Option<RenderTree> {
    let root = assemble(response, config)?;
    let tree = RenderTree {
        root: center(root),
        tree_type: response.tree_type,
    };
    tracing::debug!(nodes = tree.node_count(), "laid out investigation tree");
    Some(tree)
}

fn display_name(name_en: &str, name_ar: &str, language: NameLanguage) -> String {
    let (preferred, fallback) = match language {
        NameLanguage::En => (name_en, name_ar),
        NameLanguage::Ar => (name_ar, name_en),
    };
    if preferred.trim().is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Scope, Summary, parse_tree_response};

    fn leaf(id: i64, name: &str, value: u64) -> IncidentTreeNode {
        IncidentTreeNode {
            node_id: NodeId::Int(id),
            node_name: name.to_string(),
            value,
            ..Default::default()
        }
    }

    fn with_children(mut node: IncidentTreeNode, children: Vec<IncidentTreeNode>) -> IncidentTreeNode {
        node.children = children;
        node
    }

    fn response(level: ScopeLevel, tree: Vec<IncidentTreeNode>, total: u64) -> TreeResponse {
        TreeResponse {
            scope: Scope { level },
            tree,
            summary: Summary {
                total_incidents: total,
            },
            ..Default::default()
        }
    }

    #[test]
    fn transform_assigns_columns_and_preorder_rows() {
        let config = LayoutConfig::default();
        let mut cursor = LayoutCursor::new(&config);
        let input = vec![with_children(
            leaf(1, "A", 10),
            vec![with_children(leaf(2, "B", 4), vec![leaf(4, "D", 1)]), leaf(3, "C", 6)],
        )];
        let nodes = transform(&input, 0, false, &mut cursor, &config);
        let a = &nodes[0];
        let b = &a.children[0];
        let d = &b.children[0];
        let c = &a.children[1];
        assert_eq!((a.x, a.y), (50.0, 20.0));
        assert_eq!((b.x, b.y), (420.0, 170.0));
        assert_eq!((d.x, d.y), (790.0, 320.0));
        assert_eq!((c.x, c.y), (420.0, 470.0));
        assert_eq!(cursor.next_y(), 620.0);
    }

    #[test]
    fn deep_levels_reuse_last_column() {
        let config = LayoutConfig::default();
        let mut node = leaf(6, "F", 1);
        for id in (1..6).rev() {
            node = with_children(leaf(id, "N", 1), vec![node]);
        }
        let mut cursor = LayoutCursor::new(&config);
        let nodes = transform(&[node], 0, false, &mut cursor, &config);
        let mut xs = Vec::new();
        nodes[0].walk(&mut |n| xs.push((n.level, n.x)));
        assert_eq!(xs[4], (4, 1160.0));
        assert_eq!(xs[5], (5, 1160.0));
    }

    #[test]
    fn admin_level_inserts_gap_between_blocks() {
        let config = LayoutConfig::default();
        let mut cursor = LayoutCursor::new(&config);
        let nodes = transform(
            &[leaf(1, "A", 1), leaf(2, "B", 1), leaf(3, "C", 1)],
            0,
            true,
            &mut cursor,
            &config,
        );
        assert_eq!(nodes[0].y, 20.0);
        assert_eq!(nodes[1].y, 270.0);
        assert_eq!(nodes[2].y, 520.0);
    }

    #[test]
    fn separate_cursors_do_not_interfere() {
        let config = LayoutConfig::default();
        let input = vec![leaf(1, "A", 1)];
        let mut first = LayoutCursor::new(&config);
        let mut second = LayoutCursor::new(&config);
        let a = transform(&input, 0, false, &mut first, &config);
        let _ = transform(&input, 0, false, &mut first, &config);
        let b = transform(&input, 0, false, &mut second, &config);
        assert_eq!(a[0].y, b[0].y);
    }

    #[test]
    fn hospital_scope_with_many_roots_gets_virtual_root() {
        let config = LayoutConfig::default();
        let input = response(ScopeLevel::Hospital, vec![leaf(1, "Adm 1", 3), leaf(2, "Adm 2", 5)], 42);
        let root = assemble(&input, &config).unwrap();
        assert!(root.is_virtual_root);
        assert_eq!(root.level, -1);
        assert_eq!(root.count, 42);
        assert_eq!(root.name, "Hospital");
        assert_eq!(root.node_id, NodeId::Text(VIRTUAL_ROOT_ID.to_string()));
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(|child| child.level == 0));
    }

    #[test]
    fn hospital_scope_with_single_root_is_not_wrapped() {
        let config = LayoutConfig::default();
        let input = response(ScopeLevel::Hospital, vec![leaf(1, "Adm 1", 3)], 3);
        let root = assemble(&input, &config).unwrap();
        assert!(!root.is_virtual_root);
        assert_eq!(root.level, 0);
    }

    #[test]
    fn empty_tree_has_no_root() {
        let config = LayoutConfig::default();
        assert!(assemble(&response(ScopeLevel::Department, Vec::new(), 0), &config).is_none());
        assert!(assemble(&response(ScopeLevel::Hospital, Vec::new(), 0), &config).is_none());
    }

    #[test]
    fn centering_uses_first_and_last_child() {
        let config = LayoutConfig::default();
        let mut cursor = LayoutCursor::new(&config);
        let input = vec![with_children(
            leaf(1, "A", 3),
            vec![
                with_children(leaf(2, "B", 1), vec![leaf(5, "E", 1), leaf(6, "F", 1)]),
                leaf(3, "C", 1),
                leaf(4, "D", 1),
            ],
        )];
        let root = center(transform(&input, 0, false, &mut cursor, &config).remove(0));
        // B: E=320, F=470 -> 395; C=620; D=770; A = (395 + 770) / 2
        assert_eq!(root.children[0].y, 395.0);
        assert_eq!(root.y, (395.0 + 770.0) / 2.0);
        assert_eq!(root.x, 50.0);
    }

    #[test]
    fn build_render_tree_keeps_tree_type() {
        let input = parse_tree_response(
            r#"{"tree_type": "red_flag_incidents", "scope": {"level": "section"},
                "tree": [{"node_id": 1, "node_name": "S", "value": 2, "red_flag_count": 2}]}"#,
        )
        .unwrap();
        let tree = build_render_tree(&input, &LayoutConfig::default()).unwrap();
        assert_eq!(tree.tree_type, crate::ir::TreeType::RedFlagIncidents);
        assert_eq!(tree.root.red_flags, 2);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn arabic_names_fall_back_to_english() {
        let config = LayoutConfig {
            name_language: NameLanguage::Ar,
            ..LayoutConfig::default()
        };
        let mut with_ar = leaf(1, "Surgery", 1);
        with_ar.node_name_ar = Some("الجراحة".to_string());
        let mut cursor = LayoutCursor::new(&config);
        let nodes = transform(&[with_ar, leaf(2, "Radiology", 1)], 0, false, &mut cursor, &config);
        assert_eq!(nodes[0].name, "الجراحة");
        assert_eq!(nodes[0].name_en, "Surgery");
        assert_eq!(nodes[1].name, "Radiology");
    }
}
