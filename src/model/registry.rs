//! Arena of window nodes keyed by view id.
//!
//! Ids are assigned monotonically by the native adapter, so iteration order
//! of the backing map is creation order; the quit cascade relies on this to
//! destroy windows in reverse order of creation.

use crate::common::collections::BTreeMap;
use crate::model::node::{Archetype, WindowId, WindowNode};
use crate::sys::window_server::WindowHandle;

#[derive(Debug, Default)]
pub struct Registry {
    windows: BTreeMap<WindowId, WindowNode>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowNode> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowNode> {
        self.windows.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowNode> {
        self.windows.values()
    }

    /// Ids in creation order.
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn by_handle(&self, handle: WindowHandle) -> Option<&WindowNode> {
        self.windows.values().find(|node| node.handle == handle)
    }

    pub fn id_of_handle(&self, handle: WindowHandle) -> Option<WindowId> {
        self.by_handle(handle).map(|node| node.id)
    }

    /// Inserts a node and links it into its owner's children, bumping the
    /// owner's popup count when appropriate. The owner, if any, must be
    /// live.
    pub fn insert(&mut self, node: WindowNode) {
        debug_assert!(!self.windows.contains_key(&node.id), "duplicate {}", node.id);
        if let Some(owner_id) = node.owner
            && let Some(owner) = self.windows.get_mut(&owner_id)
        {
            owner.children.insert(node.id);
            if node.archetype == Archetype::Popup {
                owner.popup_child_count += 1;
            }
        }
        self.windows.insert(node.id, node);
    }

    /// Removes a node, unlinking it from its owner's children and adjusting
    /// the owner's popup count. Children of the removed node are left in
    /// place; the native window system destroys owned windows itself and
    /// reports each destruction separately.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowNode> {
        let node = self.windows.remove(&id)?;
        if let Some(owner_id) = node.owner
            && let Some(owner) = self.windows.get_mut(&owner_id)
        {
            owner.children.remove(&id);
            if node.archetype == Archetype::Popup {
                owner.popup_child_count = owner.popup_child_count.saturating_sub(1);
            }
        }
        Some(node)
    }

    /// Walks the owner chain from `id` to its top-level ancestor. A node
    /// whose owner is missing from the registry counts as a root.
    pub fn root_of(&self, id: WindowId) -> WindowId {
        let mut current = id;
        while let Some(node) = self.windows.get(&current) {
            match node.owner {
                Some(owner) if self.windows.contains_key(&owner) => current = owner,
                _ => break,
            }
        }
        current
    }

    /// Whether `ancestor` appears on the owner chain of `id` (a node is not
    /// its own ancestor).
    pub fn is_ancestor_of(&self, ancestor: WindowId, id: WindowId) -> bool {
        let mut current = self.windows.get(&id).and_then(|node| node.owner);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.windows.get(&node_id).and_then(|node| node.owner);
        }
        false
    }

    /// The subtree rooted at `root` (inclusive), depth-first with children
    /// visited in id order.
    pub fn descendants(&self, root: WindowId) -> Vec<WindowId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.windows.get(&id) else { continue };
            result.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// The deepest dialog in the subtree rooted at `root`, if any. On ties
    /// at equal depth the last one found in depth-first pre-order wins.
    pub fn deepest_dialog(&self, root: WindowId) -> Option<WindowId> {
        let mut best: Option<(usize, WindowId)> = None;
        self.deepest_dialog_walk(root, 0, &mut best);
        best.map(|(_, id)| id)
    }

    fn deepest_dialog_walk(
        &self,
        id: WindowId,
        depth: usize,
        best: &mut Option<(usize, WindowId)>,
    ) {
        let Some(node) = self.windows.get(&id) else { return };
        if node.archetype == Archetype::Dialog
            && best.map_or(true, |(best_depth, _)| depth >= best_depth)
        {
            *best = Some((depth, id));
        }
        for child in &node.children {
            self.deepest_dialog_walk(*child, depth + 1, best);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, archetype: Archetype, owner: Option<i64>) -> WindowNode {
        WindowNode::new(WindowId(id), archetype, WindowHandle(id as u64), owner.map(WindowId))
    }

    fn registry() -> Registry {
        // 1 (regular)
        // ├── 2 (dialog)
        // │   └── 4 (dialog)
        // └── 3 (satellite)
        let mut registry = Registry::new();
        registry.insert(node(1, Archetype::Regular, None));
        registry.insert(node(2, Archetype::Dialog, Some(1)));
        registry.insert(node(3, Archetype::Satellite, Some(1)));
        registry.insert(node(4, Archetype::Dialog, Some(2)));
        registry
    }

    #[test]
    fn insert_links_children_and_counts_popups() {
        let mut registry = registry();
        registry.insert(node(5, Archetype::Popup, Some(1)));
        registry.insert(node(6, Archetype::Popup, Some(1)));

        let owner = registry.get(WindowId(1)).unwrap();
        assert_eq!(owner.children.len(), 4);
        assert_eq!(owner.popup_child_count, 2);

        registry.remove(WindowId(5));
        let owner = registry.get(WindowId(1)).unwrap();
        assert_eq!(owner.popup_child_count, 1);
        assert!(!owner.children.contains(&WindowId(5)));
    }

    #[test]
    fn ids_follow_creation_order() {
        let registry = registry();
        assert_eq!(
            registry.ids(),
            vec![WindowId(1), WindowId(2), WindowId(3), WindowId(4)]
        );
    }

    #[test]
    fn root_and_ancestors() {
        let registry = registry();
        assert_eq!(registry.root_of(WindowId(4)), WindowId(1));
        assert_eq!(registry.root_of(WindowId(1)), WindowId(1));
        assert!(registry.is_ancestor_of(WindowId(1), WindowId(4)));
        assert!(registry.is_ancestor_of(WindowId(2), WindowId(4)));
        assert!(!registry.is_ancestor_of(WindowId(3), WindowId(4)));
        assert!(!registry.is_ancestor_of(WindowId(4), WindowId(4)));
    }

    #[test]
    fn descendants_cover_subtree_in_preorder() {
        let registry = registry();
        assert_eq!(
            registry.descendants(WindowId(1)),
            vec![WindowId(1), WindowId(2), WindowId(4), WindowId(3)]
        );
        assert_eq!(registry.descendants(WindowId(2)), vec![WindowId(2), WindowId(4)]);
    }

    #[test]
    fn deepest_dialog_prefers_depth_then_last_found() {
        let mut registry = registry();
        assert_eq!(registry.deepest_dialog(WindowId(1)), Some(WindowId(4)));

        // A second dialog at the same depth as 2: deeper dialog 4 still wins.
        registry.insert(node(5, Archetype::Dialog, Some(1)));
        assert_eq!(registry.deepest_dialog(WindowId(1)), Some(WindowId(4)));

        // Equal depths: the last one visited wins.
        registry.remove(WindowId(4));
        assert_eq!(registry.deepest_dialog(WindowId(1)), Some(WindowId(5)));

        registry.remove(WindowId(5));
        registry.remove(WindowId(2));
        assert_eq!(registry.deepest_dialog(WindowId(1)), None);
    }
}
