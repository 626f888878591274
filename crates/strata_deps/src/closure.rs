//! Memoized transitive closure with cycle detection.

use crate::graph::DepGraph;
use crate::node::{Leaf, Node};
use std::collections::{BTreeSet, HashMap, HashSet};

struct Frame {
    node: Node,
    succs: Vec<Node>,
    next: usize,
    acc: BTreeSet<Leaf>,
    index: usize,
    low: usize,
}

/// Computes, per node, the leaves it transitively reads.
///
/// The traversal uses an explicit stack. Reaching a node that is still on
/// the stack records a cycle and contributes [`Leaf::Cycle`] in place of
/// that node's closure; the traversal then carries on. Members of one
/// strongly connected component are memoized together, once the whole
/// component is done, and all share the union of its leaves.
pub struct Closure<'g> {
    graph: &'g DepGraph,
    memo: HashMap<Node, BTreeSet<Leaf>>,
    cycles: Vec<Vec<Node>>,
}

impl<'g> Closure<'g> {
    /// Creates an empty closure over `graph`.
    pub fn new(graph: &'g DepGraph) -> Self {
        Self {
            graph,
            memo: HashMap::new(),
            cycles: Vec::new(),
        }
    }

    fn leaf_of(node: Node) -> Option<Leaf> {
        match node {
            Node::Input(w, b) => Some(Leaf::Input(w, b)),
            Node::State => Some(Leaf::State),
            _ => None,
        }
    }

    fn frame(&self, node: Node, index: usize) -> Frame {
        Frame {
            node,
            succs: self.graph.successors(node),
            next: 0,
            acc: BTreeSet::new(),
            index,
            low: index,
        }
    }

    /// The leaves `root` transitively depends on.
    pub fn leaves(&mut self, root: Node) -> BTreeSet<Leaf> {
        if let Some(leaf) = Self::leaf_of(root) {
            return BTreeSet::from([leaf]);
        }
        if let Some(done) = self.memo.get(&root) {
            return done.clone();
        }

        // Discovery index of every node visited by this call whose
        // component is not finished yet.
        let mut visited = HashMap::from([(root, 0usize)]);
        let mut counter = 1;
        let mut pending = vec![root];
        let mut on_path = HashSet::from([root]);
        let mut stack = vec![self.frame(root, 0)];
        while let Some(top) = stack.last_mut() {
            if top.next < top.succs.len() {
                let succ = top.succs[top.next];
                top.next += 1;
                if let Some(leaf) = Self::leaf_of(succ) {
                    top.acc.insert(leaf);
                } else if let Some(done) = self.memo.get(&succ) {
                    top.acc.extend(done.iter().copied());
                } else if let Some(&index) = visited.get(&succ) {
                    top.low = top.low.min(index);
                    if on_path.contains(&succ) {
                        top.acc.insert(Leaf::Cycle(succ));
                        let start = stack.iter().position(|f| f.node == succ).unwrap_or(0);
                        self.cycles.push(stack[start..].iter().map(|f| f.node).collect());
                    }
                } else {
                    let index = counter;
                    counter += 1;
                    visited.insert(succ, index);
                    pending.push(succ);
                    on_path.insert(succ);
                    let frame = self.frame(succ, index);
                    stack.push(frame);
                }
                continue;
            }

            let Some(finished) = stack.pop() else {
                break;
            };
            on_path.remove(&finished.node);
            if let Some(parent) = stack.last_mut() {
                parent.acc.extend(finished.acc.iter().copied());
                if finished.low < finished.index {
                    parent.low = parent.low.min(finished.low);
                }
            }
            if finished.low == finished.index {
                // `finished` roots a component; its accumulated leaves
                // already include every member's.
                let split = pending
                    .iter()
                    .position(|&n| n == finished.node)
                    .unwrap_or(pending.len());
                for member in pending.drain(split..) {
                    visited.remove(&member);
                    self.memo.insert(member, finished.acc.clone());
                }
            }
        }
        self.memo.get(&root).cloned().unwrap_or_default()
    }

    /// Takes the cycles found so far; each lists its members from the
    /// re-entered node onwards.
    pub fn take_cycles(&mut self) -> Vec<Vec<Node>> {
        std::mem::take(&mut self.cycles)
    }
}
