//! Reconstruction of a node tree from a flat, depth-first section stream.
//!
//! The wire form has no child counts or parent indices; nesting is encoded
//! by paired start/end marker sections around each run of children. The
//! assembler replays that stream: a content section *emits* a node under the
//! current parent, a start marker *descends* (the last emitted node becomes
//! the parent), an end marker *ascends*. The same machine drives both the
//! pane tree and the group tree.

use crate::error::{Error, Result};

struct Slot<T> {
    node: Option<T>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Incremental tree builder over an arena of indices.
///
/// Parent links live only here, as indices; the finished tree is owned
/// top-down, parents holding their children in document order.
pub struct TreeAssembler<T> {
    slots: Vec<Slot<T>>,
    current: Option<usize>,
    parent: Option<usize>,
}

impl<T> TreeAssembler<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            current: None,
            parent: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A content section: attach a node under the current parent and make
    /// it the current node.
    pub fn emit(&mut self, node: T) {
        let index = self.slots.len();
        self.slots.push(Slot {
            node: Some(node),
            parent: self.parent,
            children: Vec::new(),
        });
        if let Some(parent) = self.parent {
            self.slots[parent].children.push(index);
        }
        self.current = Some(index);
    }

    /// A start marker: the current node becomes the parent of what follows.
    pub fn descend(&mut self) -> Result<()> {
        match self.current {
            Some(index) => {
                self.parent = Some(index);
                Ok(())
            }
            None => Err(Error::DanglingStartMarker),
        }
    }

    /// An end marker: pop back to the enclosing parent.
    pub fn ascend(&mut self) -> Result<()> {
        let parent = self.parent.ok_or(Error::DanglingEndMarker)?;
        self.current = Some(parent);
        self.parent = self.slots[parent].parent;
        Ok(())
    }

    /// The most recently emitted (or re-entered) node, for sections that
    /// attach trailing data to it.
    pub fn current_mut(&mut self) -> Option<&mut T> {
        let index = self.current?;
        self.slots[index].node.as_mut()
    }

    /// Materialize the owned tree. Exactly one node may be parentless; zero
    /// nodes yields `None`, anything else is corrupt input.
    pub fn finish<F>(mut self, mut attach: F) -> Result<Option<T>>
    where
        F: FnMut(&mut T, T),
    {
        if self.slots.is_empty() {
            return Ok(None);
        }

        // Children always appear after their parent in the stream, so a
        // reverse pass sees every subtree fully assembled before it is
        // attached to its parent.
        for index in (0..self.slots.len()).rev() {
            let Some(parent) = self.slots[index].parent else {
                continue;
            };
            let child = self.slots[index].node.take().expect("child taken twice");
            let parent_node = self.slots[parent].node.as_mut().expect("parent taken");
            attach(parent_node, child);
        }

        let mut roots = self
            .slots
            .iter_mut()
            .filter_map(|slot| slot.node.take())
            .collect::<Vec<_>>();
        if roots.len() != 1 {
            return Err(Error::BadRootCount { found: roots.len() });
        }
        Ok(roots.pop())
    }
}

impl<T> Default for TreeAssembler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Node {
        name: &'static str,
        children: Vec<Node>,
    }

    fn node(name: &'static str) -> Node {
        Node {
            name,
            children: Vec::new(),
        }
    }

    fn attach(parent: &mut Node, child: Node) {
        parent.children.push(child);
    }

    #[test]
    fn nested_stream_rebuilds_hierarchy() {
        // A ( B ( C ) D )
        let mut asm = TreeAssembler::new();
        asm.emit(node("A"));
        asm.descend().unwrap();
        asm.emit(node("B"));
        asm.descend().unwrap();
        asm.emit(node("C"));
        asm.ascend().unwrap();
        asm.emit(node("D"));
        asm.ascend().unwrap();

        let root = asm.finish(attach).unwrap().unwrap();
        assert_eq!(root.name, "A");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].name, "B");
        assert_eq!(root.children[0].children[0].name, "C");
        assert_eq!(root.children[1].name, "D");
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn sibling_order_is_document_order() {
        let mut asm = TreeAssembler::new();
        asm.emit(node("root"));
        asm.descend().unwrap();
        for name in ["x", "y", "z"] {
            asm.emit(node(name));
        }
        asm.ascend().unwrap();
        let root = asm.finish(attach).unwrap().unwrap();
        let order: Vec<_> = root.children.iter().map(|c| c.name).collect();
        assert_eq!(order, ["x", "y", "z"]);
    }

    #[test]
    fn empty_stream_yields_no_tree() {
        let asm = TreeAssembler::<Node>::new();
        assert!(asm.finish(attach).unwrap().is_none());
    }

    #[test]
    fn start_marker_without_node_is_rejected() {
        let mut asm = TreeAssembler::<Node>::new();
        assert!(matches!(asm.descend(), Err(Error::DanglingStartMarker)));
    }

    #[test]
    fn end_marker_without_parent_is_rejected() {
        let mut asm = TreeAssembler::new();
        asm.emit(node("A"));
        assert!(matches!(asm.ascend(), Err(Error::DanglingEndMarker)));
    }

    #[test]
    fn two_roots_are_rejected() {
        let mut asm = TreeAssembler::new();
        asm.emit(node("A"));
        asm.emit(node("B"));
        assert!(matches!(
            asm.finish(attach),
            Err(Error::BadRootCount { found: 2 })
        ));
    }

    #[test]
    fn current_follows_emit_and_ascend() {
        let mut asm = TreeAssembler::new();
        asm.emit(node("A"));
        asm.descend().unwrap();
        asm.emit(node("B"));
        assert_eq!(asm.current_mut().unwrap().name, "B");
        asm.ascend().unwrap();
        // After the end marker the enclosing node is current again.
        assert_eq!(asm.current_mut().unwrap().name, "A");
    }
}
