use crate::document::Document;
use crate::document::NodeId;

/// Patches a live subtree so it mirrors freshly rendered content.
///
/// Implementations own the diffing strategy; callers only guarantee that
/// `target` belongs to `document` and that `content`'s top-level nodes are
/// the desired children of `target`.
pub trait Reconciler: Send {
    fn reconcile(&mut self, document: &mut Document, target: NodeId, content: &Document);
}

/// Baseline strategy: drop the old children and import the new ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceChildren;

impl Reconciler for ReplaceChildren {
    fn reconcile(&mut self, document: &mut Document, target: NodeId, content: &Document) {
        if !document.contains_node(target) {
            return;
        }
        document.clear_children(target);
        for node in content.children(content.root()) {
            if let Some(imported) = document.import(content, *node) {
                document.append_child(target, imported);
            }
        }
    }
}
