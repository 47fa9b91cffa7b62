//! # Tree - Arena-Backed Syntax Tree
//!
//! Nodes live in a single arena and are addressed by [`NodeId`]. Each node
//! stores its kind, its ordered children, and the id of its parent. Because
//! parent links are plain indices there are no reference cycles to manage,
//! and detaching or replacing a node is an index rewrite.
//!
//! ## Consistency
//!
//! Every mutating method keeps the two directions in sync: if `parent(c)` is
//! `Some(p)` then `children(p)` contains `c` exactly once, and vice versa.
//! Attaching a node that already has a parent moves it, so a node never has
//! two parents.
//!
//! Nodes removed from the tree stay in the arena as detached subtrees. They
//! can be re-attached later; otherwise they are dropped with the tree.
//!
//! ## Indices
//!
//! Out-of-range child indices are programming errors and panic, exactly like
//! slice indexing does.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

/// Stable handle of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData<K> {
    kind: K,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena of nodes with one distinguished root.
#[derive(Debug, Clone)]
pub struct Tree<K> {
    nodes: Vec<NodeData<K>>,
    root: NodeId,
}

impl<K> Tree<K> {
    /// Create a tree holding only a root of the given kind.
    pub fn new(root: K) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: root,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, including detached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node.
    pub fn alloc(&mut self, kind: K) -> NodeId {
        let index = u32::try_from(self.nodes.len()).expect("tree arena exceeds u32::MAX nodes");
        let id = NodeId(index);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> &K {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut K {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> NodeId {
        self.nodes[id.index()].children[index]
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].children.last().copied()
    }

    /// Position of `id` among its parent's children, found by identity.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Iterate `id`'s parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// True when `ancestor` is `node` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.assert_acyclic(parent, child);
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Allocate a node of `kind` and append it under `parent`.
    pub fn append_new(&mut self, parent: NodeId, kind: K) -> NodeId {
        let id = self.alloc(kind);
        self.append(parent, id);
        id
    }

    /// Insert `child` at `index` among `parent`'s children.
    ///
    /// If `child` is attached it is detached first; `index` is interpreted
    /// against the children list after that.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.assert_acyclic(parent, child);
        self.detach(child);
        self.nodes[parent.index()].children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Remove and return the child at `index`; it becomes detached.
    pub fn remove(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.nodes[parent.index()].children.remove(index);
        self.nodes[child.index()].parent = None;
        child
    }

    /// Detach `id` from its parent, returning the slot it occupied.
    ///
    /// The slot is located by identity, so duplicate-valued siblings are
    /// never confused. Detaching a detached node is a no-op.
    pub fn detach(&mut self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let index = self
            .index_in_parent(id)
            .expect("parent link without matching child entry");
        self.nodes[parent.index()].children.remove(index);
        self.nodes[id.index()].parent = None;
        Some(index)
    }

    /// Put `new` into `parent`'s slot `index`, returning the detached old
    /// occupant.
    ///
    /// If `new` is attached it is detached first; `index` is interpreted
    /// against the children list after that.
    pub fn replace(&mut self, parent: NodeId, index: usize, new: NodeId) -> NodeId {
        self.assert_acyclic(parent, new);
        self.detach(new);
        let old = std::mem::replace(&mut self.nodes[parent.index()].children[index], new);
        self.nodes[old.index()].parent = None;
        self.nodes[new.index()].parent = Some(parent);
        old
    }

    /// Detach every child of `id`, returning them in order.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for &c in &children {
            self.nodes[c.index()].parent = None;
        }
        children
    }

    /// Pre-order depth-first iteration over the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, K> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Level-order iteration over the subtree rooted at `id`.
    pub fn breadth_first(&self, id: NodeId) -> BreadthFirst<'_, K> {
        BreadthFirst {
            tree: self,
            pending: VecDeque::from([id]),
        }
    }

    /// First node in pre-order whose kind satisfies `pred`.
    pub fn find_first(&self, id: NodeId, mut pred: impl FnMut(&K) -> bool) -> Option<NodeId> {
        self.descendants(id).find(|&n| pred(self.kind(n)))
    }

    /// All nodes in pre-order whose kind satisfies `pred`.
    pub fn find_all(&self, id: NodeId, mut pred: impl FnMut(&K) -> bool) -> Vec<NodeId> {
        self.descendants(id).filter(|&n| pred(self.kind(n))).collect()
    }

    /// Number of nodes in the subtree rooted at `id`, `id` included.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.descendants(id).count()
    }

    /// Distance from `id` to the top of its tree (0 for the root).
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    fn assert_acyclic(&self, parent: NodeId, child: NodeId) {
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "attaching {child:?} under {parent:?} would create a cycle"
        );
    }
}

impl<K: Hash> Tree<K> {
    /// Hash of the subtree's structure: each node's kind combined with its
    /// children's hashes in order.
    ///
    /// Independent of node ids, so equal subtrees hash equal wherever and
    /// whenever they were allocated.
    pub fn structural_hash(&self, id: NodeId) -> u64 {
        let order: Vec<NodeId> = self.descendants(id).collect();
        let mut hashes: HashMap<NodeId, u64> = HashMap::with_capacity(order.len());
        // Reverse pre-order visits every child before its parent.
        for &node in order.iter().rev() {
            let mut hasher = DefaultHasher::new();
            self.kind(node).hash(&mut hasher);
            let children = self.children(node);
            children.len().hash(&mut hasher);
            for c in children {
                hasher.write_u64(hashes[c]);
            }
            hashes.insert(node, hasher.finish());
        }
        hashes[&id]
    }
}

/// Iterator returned by [`Tree::descendants`].
pub struct Descendants<'a, K> {
    tree: &'a Tree<K>,
    stack: Vec<NodeId>,
}

impl<K> Iterator for Descendants<'_, K> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Iterator returned by [`Tree::breadth_first`].
pub struct BreadthFirst<'a, K> {
    tree: &'a Tree<K>,
    pending: VecDeque<NodeId>,
}

impl<K> Iterator for BreadthFirst<'_, K> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop_front()?;
        self.pending.extend(self.tree.children(id).iter().copied());
        Some(id)
    }
}
