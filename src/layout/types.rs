use serde::Serialize;

use crate::ir::{DomainBreakdown, NodeId, SeverityBreakdown, TreeType};
use crate::theme::NodeColor;

/// Domain counts under the judgment protocol's bucket names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DomainCounts {
    pub clinical: u64,
    pub management: u64,
    pub relational: u64,
}

impl From<DomainBreakdown> for DomainCounts {
    fn from(breakdown: DomainBreakdown) -> Self {
        Self {
            clinical: breakdown.medical,
            management: breakdown.administrative,
            relational: breakdown.nursing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeverityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl From<SeverityBreakdown> for SeverityCounts {
    fn from(breakdown: SeverityBreakdown) -> Self {
        Self {
            low: breakdown.low,
            medium: breakdown.medium,
            high: breakdown.high,
        }
    }
}

/// Box size hint: `Large` for multi-line breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSize {
    #[default]
    Normal,
    Large,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    pub node_id: NodeId,
    pub name: String,
    pub name_en: String,
    pub name_ar: String,
    pub count: u64,
    pub node_type: Option<String>,
    /// Depth; 0 for a real root, -1 for the virtual hospital root.
    pub level: i32,
    pub x: f32,
    pub y: f32,
    pub domains: DomainCounts,
    pub severity: SeverityCounts,
    pub red_flags: u64,
    pub never_events: u64,
    pub children: Vec<RenderNode>,
    pub display_value: String,
    pub node_color: Option<NodeColor>,
    pub node_size: NodeSize,
    pub is_virtual_root: bool,
}

impl RenderNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RenderNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut RenderNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

/// A laid-out tree ready for judgment and rendering.
#[derive(Debug, Clone, Serialize)]
pub struct RenderTree {
    pub root: RenderNode,
    pub tree_type: TreeType,
}

impl RenderTree {
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |_| count += 1);
        count
    }

    /// Nodes that get a box: everything except a virtual root.
    pub fn visible_nodes(&self) -> Vec<&RenderNode> {
        let mut nodes = Vec::new();
        self.root.walk(&mut |node| {
            if !node.is_virtual_root {
                nodes.push(node);
            }
        });
        nodes
    }

    pub fn find(&self, id: &NodeId) -> Option<&RenderNode> {
        let mut found = None;
        self.root.walk(&mut |node| {
            if found.is_none() && &node.node_id == id {
                found = Some(node);
            }
        });
        found
    }
}
