use crate::error::TreeError;
use std::fmt::Display;

pub const DEFAULT_INDENT: &str = "  ";

/// Handle to a node inside one [`Tree`]. Only meaningful for the tree that
/// returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    payload: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed labeled tree. Nodes are appended, never removed, so every
/// handle handed out stays valid for the life of the tree.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    name: String,
    nodes: Vec<Node<T>>,
}

impl<T> Tree<T> {
    pub fn new(root: T, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: vec![Node {
                payload: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn add_leaf(&mut self, parent: NodeId, payload: T) -> Result<NodeId, TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent.0));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            payload,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0).map(|node| &node.payload)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of parent links between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent_of(id);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.parent_of(parent);
        }
        depth
    }

    pub fn max_depth(&self) -> usize {
        (0..self.nodes.len())
            .map(|idx| self.depth(NodeId(idx)))
            .max()
            .unwrap_or(0)
    }
}

impl<T: PartialEq> Tree<T> {
    /// Linear search by value. When several nodes carry equal payloads the
    /// most recently inserted one wins.
    pub fn find_node(&self, payload: &T) -> Option<NodeId> {
        self.nodes
            .iter()
            .rposition(|node| &node.payload == payload)
            .map(NodeId)
    }
}

impl<T: Display> Tree<T> {
    pub fn render(&self, base_indent: usize) -> Render<'_, T> {
        self.render_with(base_indent, DEFAULT_INDENT)
    }

    pub fn render_with<'a>(&'a self, base_indent: usize, unit: &'a str) -> Render<'a, T> {
        Render {
            tree: self,
            unit,
            stack: vec![(self.root(), base_indent)],
        }
    }

    pub fn render_to_string(&self, base_indent: usize, unit: &str) -> String {
        let mut out = String::new();
        for line in self.render_with(base_indent, unit) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Pre-order, depth-first rendering of a tree, one line per node.
pub struct Render<'a, T> {
    tree: &'a Tree<T>,
    unit: &'a str,
    stack: Vec<(NodeId, usize)>,
}

impl<'a, T: Display> Iterator for Render<'a, T> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let (id, depth) = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        for child in node.children.iter().rev() {
            self.stack.push((*child, depth + 1));
        }
        Some(format!("{}{}", self.unit.repeat(depth), node.payload))
    }
}
