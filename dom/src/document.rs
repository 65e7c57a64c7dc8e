//! Arena-backed element tree.
//!
//! Nodes live in generation-checked slots: removing a subtree frees its slots
//! and bumps their generation, so a [`NodeId`] held across a reconciliation
//! that replaced the node simply stops resolving instead of aliasing a newer
//! node.

use crate::selector::Selector;

const ROOT_TAG: &str = "#root";
const CLASS_ATTR: &str = "class";
const HIDDEN_ATTR: &str = "hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Construction and structure.
impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        document.root = document.alloc(NodeKind::Element(ElementData {
            tag: ROOT_TAG.to_string(),
            attributes: Vec::new(),
        }));
        document
    }

    /// Synthetic container whose children are the document's top-level nodes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element(data) => Some(data.tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Ignored if either handle is stale or if the
    /// move would make a node its own ancestor.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Moves `children` to the front of `parent`, keeping their relative order.
    pub fn prepend_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let adopted: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|child| self.can_adopt(parent, *child))
            .collect();
        for child in &adopted {
            self.detach(*child);
            if let Some(node) = self.node_mut(*child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.splice(0..0, adopted);
        }
    }

    /// Detaches `id` from the tree and frees its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.contains_node(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
        }
    }

    /// Removes and frees every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    /// Deep-copies `node` from `source` into this document as a detached subtree.
    pub fn import(&mut self, source: &Document, node: NodeId) -> Option<NodeId> {
        let kind = source.kind(node)?.clone();
        let copy = self.alloc(kind);
        for child in source.children(node) {
            if let Some(imported) = self.import(source, *child) {
                self.append_child(copy, imported);
            }
        }
        Some(copy)
    }

    /// Copies `node` out into a standalone document whose single top-level
    /// node is the copy.
    pub fn extract(&self, node: NodeId) -> Document {
        let mut fragment = Document::new();
        if let Some(copy) = fragment.import(self, node) {
            let root = fragment.root();
            fragment.append_child(root, copy);
        }
        fragment
    }

    /// Inclusive ancestry check, mirroring DOM `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains_node(id) && self.contains(self.root, id)
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeKind::Text(value)) = self.kind(id) {
            text.push_str(value);
        }
        for descendant in self.descendants(id) {
            if let Some(NodeKind::Text(value)) = self.kind(descendant) {
                text.push_str(value);
            }
        }
        text
    }
}

/// Attributes and classes.
impl Document {
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            Some(NodeKind::Element(data)) => data.attributes.as_slice(),
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(data) = self.element_mut(id) else {
            return;
        };
        match data.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(data) = self.element_mut(id) {
            data.attributes.retain(|(key, _)| key != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, CLASS_ATTR)
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.is_element(id) || self.has_class(id, class) {
            return;
        }
        let joined = match self.attr(id, CLASS_ATTR) {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr(id, CLASS_ATTR, &joined);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let remaining = self
            .attr(id, CLASS_ATTR)
            .unwrap_or_default()
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, CLASS_ATTR, &remaining);
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_attr(id, HIDDEN_ATTR)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if hidden {
            self.set_attr(id, HIDDEN_ATTR, "");
        } else {
            self.remove_attr(id, HIDDEN_ATTR);
        }
    }
}

/// Slot management.
impl Document {
    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        child != self.root
            && self.is_element(parent)
            && self.contains_node(child)
            && !self.contains(child, parent)
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }
}
