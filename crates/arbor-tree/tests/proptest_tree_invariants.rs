//! Property-based invariant tests for the tree arena.
//!
//! 1. Every attached node's path resolves back to the same handle.
//! 2. Detaching and re-attaching at the recorded path restores the
//!    original child order.
//! 3. The live-node count matches a full traversal.

use arbor_tree::{Node, NodeRef, Patch, Tree};
use proptest::prelude::*;

fn node_strategy() -> impl Strategy<Value = Node<u32>> {
    let leaf = any::<u32>().prop_map(Node::new);
    leaf.prop_recursive(3, 24, 4, |inner| {
        (any::<u32>(), prop::collection::vec(inner, 0..4))
            .prop_map(|(value, kids)| Node::new(value).with_children(kids))
    })
}

fn collect(tree: &Tree<u32>, node: NodeRef, out: &mut Vec<NodeRef>) {
    out.push(node);
    for &child in tree.children(node).unwrap() {
        collect(tree, child, out);
    }
}

proptest! {
    #[test]
    fn path_resolves_back_to_node(root in node_strategy()) {
        let tree = Tree::new(root);
        let mut nodes = Vec::new();
        collect(&tree, tree.root(), &mut nodes);

        for node in nodes {
            let path = tree.path(node).unwrap();
            prop_assert_eq!(tree.node_at(&path), Some(node));
        }
    }

    #[test]
    fn detach_then_add_restores_order(root in node_strategy()) {
        let mut tree = Tree::new(root);
        let mut nodes = Vec::new();
        collect(&tree, tree.root(), &mut nodes);

        for node in nodes {
            if tree.parent(node).unwrap().is_none() {
                continue;
            }
            let before: Vec<NodeRef> = {
                let parent = tree.parent(node).unwrap().unwrap();
                tree.children(parent).unwrap().to_vec()
            };
            let path = tree.path(node).unwrap();

            tree.detach(node).unwrap();
            tree.apply(Patch::Add { path, node }).unwrap();

            let parent = tree.parent(node).unwrap().unwrap();
            prop_assert_eq!(tree.children(parent).unwrap(), before.as_slice());
        }
    }

    #[test]
    fn len_matches_traversal(root in node_strategy()) {
        let tree = Tree::new(root);
        let mut nodes = Vec::new();
        collect(&tree, tree.root(), &mut nodes);
        prop_assert_eq!(tree.len(), nodes.len());
    }
}
