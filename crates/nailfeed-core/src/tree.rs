//! Traversal over forests of nodes that own their children.
//!
//! Everything here walks with an explicit stack, so depth is bounded only by
//! memory. Nodes are addressed by predicate; a located node is described by
//! its index path from the roots.

use nailfeed_types::Comment;

pub trait TreeNode: Sized {
    fn children(&self) -> &[Self];
    fn children_mut(&mut self) -> &mut Vec<Self>;
}

impl TreeNode for Comment {
    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

/// Pre-order iterator: each node, then its children in order.
pub struct Iter<'a, N> {
    stack: Vec<&'a N>,
}

impl<'a, N: TreeNode> Iterator for Iter<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<&'a N> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

pub fn iter<N: TreeNode>(roots: &[N]) -> Iter<'_, N> {
    Iter {
        stack: roots.iter().rev().collect(),
    }
}

/// Number of nodes, descendants included.
pub fn count<N: TreeNode>(roots: &[N]) -> usize {
    iter(roots).count()
}

pub fn find<N: TreeNode>(roots: &[N], mut pred: impl FnMut(&N) -> bool) -> Option<&N> {
    iter(roots).find(|node| pred(*node))
}

/// Index path of the first node (pre-order) matching `pred`.
pub fn locate<N: TreeNode>(roots: &[N], mut pred: impl FnMut(&N) -> bool) -> Option<Vec<usize>> {
    let mut stack: Vec<(Vec<usize>, &N)> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (vec![i], node))
        .collect();

    while let Some((path, node)) = stack.pop() {
        if pred(node) {
            return Some(path);
        }
        for (i, child) in node.children().iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(i);
            stack.push((child_path, child));
        }
    }
    None
}

pub fn node_at_mut<'a, N: TreeNode>(roots: &'a mut [N], path: &[usize]) -> Option<&'a mut N> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for &i in rest {
        node = node.children_mut().get_mut(i)?;
    }
    Some(node)
}

pub fn find_mut<N: TreeNode>(roots: &mut [N], pred: impl FnMut(&N) -> bool) -> Option<&mut N> {
    let path = locate(roots, pred)?;
    node_at_mut(roots, &path)
}

/// Append `node` as the last child of the first node matching `parent`.
/// Hands the node back if no parent matches.
pub fn insert_under<N: TreeNode>(
    roots: &mut [N],
    parent: impl FnMut(&N) -> bool,
    node: N,
) -> Result<(), N> {
    match find_mut(roots, parent) {
        Some(parent) => {
            parent.children_mut().push(node);
            Ok(())
        }
        None => Err(node),
    }
}

/// Detach and return the first node matching `pred`, together with its subtree.
pub fn remove<N: TreeNode>(roots: &mut Vec<N>, pred: impl FnMut(&N) -> bool) -> Option<N> {
    let path = locate(roots, pred)?;
    let (last, parent_path) = path.split_last()?;
    if parent_path.is_empty() {
        return Some(roots.remove(*last));
    }
    let parent = node_at_mut(roots, parent_path)?;
    Some(parent.children_mut().remove(*last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: u32,
        children: Vec<Node>,
    }

    impl TreeNode for Node {
        fn children(&self) -> &[Self] {
            &self.children
        }

        fn children_mut(&mut self) -> &mut Vec<Self> {
            &mut self.children
        }
    }

    fn leaf(id: u32) -> Node {
        Node { id, children: vec![] }
    }

    fn forest() -> Vec<Node> {
        vec![
            Node {
                id: 1,
                children: vec![
                    leaf(2),
                    Node {
                        id: 3,
                        children: vec![leaf(4)],
                    },
                ],
            },
            leaf(5),
        ]
    }

    #[test]
    fn iterates_in_pre_order() {
        let ids: Vec<u32> = iter(&forest()).map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(count(&forest()), 5);
    }

    #[test]
    fn locate_returns_index_path() {
        let roots = forest();
        assert_eq!(locate(&roots, |n| n.id == 4), Some(vec![0, 1, 0]));
        assert_eq!(locate(&roots, |n| n.id == 5), Some(vec![1]));
        assert_eq!(locate(&roots, |n| n.id == 9), None);
    }

    #[test]
    fn insert_appends_after_existing_children() {
        let mut roots = forest();
        insert_under(&mut roots, |n| n.id == 1, leaf(6)).unwrap();
        let ids: Vec<u32> = roots[0].children.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 6]);

        let orphan = insert_under(&mut roots, |n| n.id == 42, leaf(7));
        assert_eq!(orphan, Err(leaf(7)));
    }

    #[test]
    fn remove_takes_the_subtree() {
        let mut roots = forest();
        let removed = remove(&mut roots, |n| n.id == 3).unwrap();
        assert_eq!(removed.id, 3);
        assert_eq!(count(&roots), 3);
        assert!(find(&roots, |n| n.id == 4).is_none());

        let root = remove(&mut roots, |n| n.id == 5).unwrap();
        assert_eq!(root, leaf(5));
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut root = leaf(0);
        for id in 1..5_000 {
            root = Node {
                id,
                children: vec![root],
            };
        }
        let mut roots = vec![root];
        assert_eq!(count(&roots), 5_000);
        let deepest = find_mut(&mut roots, |n| n.id == 0).unwrap();
        deepest.children.push(leaf(99_999));
        assert!(find(&roots, |n| n.id == 99_999).is_some());
        // Unwind the chain iteratively so the test's own drop does not overflow.
        let mut stack = roots;
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
