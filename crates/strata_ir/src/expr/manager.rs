//! Hash-consed expression storage.

use crate::arena::Arena;
use crate::expr::func::{Func, Simplified};
use crate::expr::var::Variable;
use crate::ids::ExprId;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use strata_common::{Mask, Value};

/// One node of the expression DAG.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ExprNode {
    /// A constant.
    Const(Value),
    /// A variable reference.
    Var(Variable),
    /// A function call; every argument ID is smaller than the call's own ID.
    Call(Func, Vec<ExprId>),
}

/// An arena of unique expression nodes.
///
/// Structurally equal nodes share one [`ExprId`], and a node's children are
/// always allocated before it, so ascending ID order is a topological order
/// of any sub-DAG. Serialized as the plain node list; the deduplication table
/// is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<ExprNode>", try_from = "Vec<ExprNode>")]
pub struct ExprManager {
    nodes: Arena<ExprId, ExprNode>,
    table: HashMap<ExprNode, ExprId>,
}

impl ExprManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id]
    }

    /// Returns `true` if `id` belongs to this manager.
    pub fn contains(&self, id: ExprId) -> bool {
        self.nodes.contains(id)
    }

    /// Returns the constant value of `id`, if it is a constant node.
    pub fn as_const(&self, id: ExprId) -> Option<&Value> {
        match &self.nodes[id] {
            ExprNode::Const(v) => Some(v),
            _ => None,
        }
    }

    fn intern(&mut self, node: ExprNode) -> ExprId {
        match self.table.entry(node) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let id = self.nodes.alloc(e.key().clone());
                e.insert(id);
                id
            }
        }
    }

    /// Returns the node for a constant.
    pub fn constant(&mut self, value: Value) -> ExprId {
        self.intern(ExprNode::Const(value))
    }

    /// Returns the node for a variable.
    pub fn var(&mut self, var: Variable) -> ExprId {
        self.intern(ExprNode::Var(var))
    }

    /// Returns the node for a call, without simplification.
    ///
    /// # Panics
    ///
    /// Panics if the argument count does not match the function's arity or
    /// an argument does not belong to this manager.
    pub fn call(&mut self, func: Func, args: Vec<ExprId>) -> ExprId {
        assert_eq!(args.len(), func.arity(), "wrong arity for {func}");
        assert!(args.iter().all(|&a| self.contains(a)), "foreign argument to {func}");
        self.intern(ExprNode::Call(func, args))
    }

    /// Returns the node for a call, folding constants and simplifying calls
    /// whose outcome is decided by constant arguments.
    pub fn call_folded(&mut self, func: Func, args: Vec<ExprId>) -> ExprId {
        let consts: Vec<Option<&Value>> = args.iter().map(|&a| self.as_const(a)).collect();
        match func.simplify(&args, &consts) {
            Some(Simplified::Const(v)) => self.constant(v),
            Some(Simplified::Arg(i)) => args[i],
            None => self.call(func, args),
        }
    }

    /// Returns the IDs of every node reachable from `root`, ascending.
    pub fn subgraph(&self, root: ExprId) -> Vec<ExprId> {
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let ExprNode::Call(_, args) = &self.nodes[id] {
                stack.extend(args.iter().copied().filter(|a| !seen.contains(a)));
            }
        }
        let mut ids: Vec<ExprId> = seen.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns every variable read by `root`.
    pub fn vars(&self, root: ExprId) -> BTreeSet<Variable> {
        self.subgraph(root)
            .into_iter()
            .filter_map(|id| match &self.nodes[id] {
                ExprNode::Var(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Replaces variables of `root` for which `f` returns a replacement.
    ///
    /// Each node of the sub-DAG is rebuilt at most once and calls are folded.
    pub fn substitute(
        &mut self,
        root: ExprId,
        mut f: impl FnMut(&Variable) -> Option<ExprId>,
    ) -> ExprId {
        let mut memo: HashMap<ExprId, ExprId> = HashMap::new();
        for id in self.subgraph(root) {
            let new = match self.nodes[id].clone() {
                ExprNode::Const(_) => id,
                ExprNode::Var(v) => f(&v).unwrap_or(id),
                ExprNode::Call(func, args) => {
                    let args = args.iter().map(|a| memo[a]).collect();
                    self.call_folded(func, args)
                }
            };
            memo.insert(id, new);
        }
        memo[&root]
    }

    /// Copies `root` from `src` into this manager, mapping each variable
    /// through `map_var`.
    ///
    /// `memo` maps `src` IDs to IDs in `self` and may be shared across calls
    /// so that sub-expressions common to several roots are translated once.
    pub fn translate<F>(
        &mut self,
        src: &ExprManager,
        root: ExprId,
        memo: &mut HashMap<ExprId, ExprId>,
        map_var: &mut F,
    ) -> ExprId
    where
        F: FnMut(&mut ExprManager, &Variable) -> ExprId,
    {
        if let Some(&done) = memo.get(&root) {
            return done;
        }
        let mut pending = Vec::new();
        let mut stack = vec![root];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if memo.contains_key(&id) || !seen.insert(id) {
                continue;
            }
            pending.push(id);
            if let ExprNode::Call(_, args) = src.node(id) {
                stack.extend(args.iter().copied());
            }
        }
        pending.sort_unstable();
        for id in pending {
            let new = match src.node(id) {
                ExprNode::Const(v) => self.constant(v.clone()),
                ExprNode::Var(v) => map_var(self, v),
                ExprNode::Call(func, args) => {
                    let args = args.iter().map(|a| memo[a]).collect();
                    self.call_folded(*func, args)
                }
            };
            memo.insert(id, new);
        }
        memo[&root]
    }

    /// Computes, for every variable of `root`, which of its bits can affect
    /// the bits of `root` selected by `mask`.
    ///
    /// Masks flow from each call to its arguments in descending ID order, so
    /// every node's mask is complete before it is propagated further.
    pub fn mask_vars(&self, root: ExprId, mask: &Mask) -> BTreeMap<Variable, Mask> {
        let mut masks: HashMap<ExprId, Mask> = HashMap::new();
        masks.insert(root, mask.clone());
        let mut out: BTreeMap<Variable, Mask> = BTreeMap::new();
        for id in self.subgraph(root).into_iter().rev() {
            let Some(m) = masks.remove(&id) else {
                continue;
            };
            if m.is_empty() {
                continue;
            }
            match &self.nodes[id] {
                ExprNode::Const(_) => {}
                ExprNode::Var(v) => {
                    let slot = out.entry(*v).or_default();
                    *slot = &*slot | &m;
                }
                ExprNode::Call(func, args) => {
                    let consts: Vec<Option<&Value>> =
                        args.iter().map(|&a| self.as_const(a)).collect();
                    for (arg, am) in args.iter().zip(func.argmasks(&m, &consts)) {
                        if am.is_empty() {
                            continue;
                        }
                        let slot = masks.entry(*arg).or_default();
                        *slot = &*slot | &am;
                    }
                }
            }
        }
        out
    }

    /// Returns `true` if `a` in `self` and `b` in `other` are the same tree.
    pub fn structurally_equal(&self, a: ExprId, other: &ExprManager, b: ExprId) -> bool {
        let mut done = HashSet::new();
        let mut stack = vec![(a, b)];
        while let Some((x, y)) = stack.pop() {
            if !done.insert((x, y)) {
                continue;
            }
            match (self.node(x), other.node(y)) {
                (ExprNode::Const(p), ExprNode::Const(q)) if p == q => {}
                (ExprNode::Var(p), ExprNode::Var(q)) if p == q => {}
                (ExprNode::Call(f, xs), ExprNode::Call(g, ys)) if f == g => {
                    stack.extend(xs.iter().copied().zip(ys.iter().copied()));
                }
                _ => return false,
            }
        }
        true
    }

    /// Renders `root` as an s-expression, for logs and test failures.
    pub fn render(&self, root: ExprId) -> String {
        match &self.nodes[root] {
            ExprNode::Const(v) => v.to_string(),
            ExprNode::Var(v) => v.to_string(),
            ExprNode::Call(func, args) => {
                let mut s = format!("({func}");
                for &a in args {
                    s.push(' ');
                    s.push_str(&self.render(a));
                }
                s.push(')');
                s
            }
        }
    }
}

impl From<ExprManager> for Vec<ExprNode> {
    fn from(m: ExprManager) -> Self {
        m.nodes.values().cloned().collect()
    }
}

impl TryFrom<Vec<ExprNode>> for ExprManager {
    type Error = String;

    fn try_from(nodes: Vec<ExprNode>) -> Result<Self, Self::Error> {
        let mut m = ExprManager::new();
        for (i, node) in nodes.into_iter().enumerate() {
            if let ExprNode::Call(func, args) = &node {
                if args.len() != func.arity() {
                    return Err(format!("node {i}: wrong arity for {func}"));
                }
                if args.iter().any(|a| a.index() >= i) {
                    return Err(format!("node {i}: argument does not precede its call"));
                }
            }
            if m.table.contains_key(&node) {
                return Err(format!("node {i}: duplicate node"));
            }
            m.intern(node);
        }
        Ok(m)
    }
}
