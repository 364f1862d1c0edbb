use crate::config::RenderConfig;
use crate::layout::{RenderNode, RenderTree};
use crate::render::{compute_surface, node_box};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub tree_type: String,
    pub width: f32,
    pub height: f32,
    pub has_virtual_root: bool,
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub parent: Option<String>,
    pub name: String,
    pub level: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub count: u64,
    pub display_value: String,
    pub fill: Option<String>,
    pub drawn: bool,
}

impl LayoutDump {
    pub fn from_tree(tree: &RenderTree, config: &RenderConfig) -> Self {
        let (width, height) = compute_surface(tree, config);
        let mut nodes = Vec::new();
        collect(&tree.root, None, config, &mut nodes);
        LayoutDump {
            tree_type: tree.tree_type.to_string(),
            width,
            height,
            has_virtual_root: tree.root.is_virtual_root,
            nodes,
        }
    }
}

fn collect(node: &RenderNode, parent: Option<&RenderNode>, config: &RenderConfig, out: &mut Vec<NodeDump>) {
    let (width, height) = node_box(node, config);
    out.push(NodeDump {
        id: node.node_id.to_string(),
        parent: parent.map(|p| p.node_id.to_string()),
        name: node.name.clone(),
        level: node.level,
        x: node.x,
        y: node.y,
        width,
        height,
        count: node.count,
        display_value: node.display_value.clone(),
        fill: node.node_color.as_ref().map(|color| color.bg.clone()),
        drawn: !node.is_virtual_root,
    });
    for child in &node.children {
        collect(child, Some(node), config, out);
    }
}

pub fn write_layout_dump(path: &Path, tree: &RenderTree, config: &RenderConfig) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_tree(tree, config);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
