//! The raw design: a set of modules and a top module.

use crate::arena::Arena;
use crate::ids::{InstanceId, ModuleId};
use crate::module::Module;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structural errors of a raw design.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    /// An instance names a module that does not exist.
    #[error("instance {instance} of module {parent} refers to unknown module {target}")]
    UnknownModule {
        /// The instantiating module.
        parent: ModuleId,
        /// The instance.
        instance: InstanceId,
        /// The missing prototype.
        target: ModuleId,
    },
    /// A module instantiates itself, directly or indirectly.
    #[error("module {0} instantiates itself")]
    RecursiveInstantiation(ModuleId),
    /// The top module does not exist.
    #[error("top module {0} does not exist")]
    MissingTop(ModuleId),
    /// An interchange file is malformed.
    #[error("malformed design file: {0}")]
    Malformed(String),
}

/// A raw design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// All modules.
    pub modules: Arena<ModuleId, Module>,
    /// The top of the hierarchy.
    pub top: ModuleId,
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl Design {
    /// Creates an empty design whose top is the first module added.
    pub fn new() -> Self {
        Self {
            modules: Arena::new(),
            top: ModuleId::from_raw(0),
        }
    }

    /// Adds a module.
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        self.modules.alloc(module)
    }

    /// Returns the module with the given ID.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    fn instantiation_graph(&self) -> Result<DiGraphMap<ModuleId, ()>, DesignError> {
        let mut graph = DiGraphMap::new();
        for (id, module) in self.modules.iter() {
            graph.add_node(id);
            for (inst_id, inst) in module.instances.iter() {
                if !self.modules.contains(inst.module) {
                    return Err(DesignError::UnknownModule {
                        parent: id,
                        instance: inst_id,
                        target: inst.module,
                    });
                }
                graph.add_edge(id, inst.module, ());
            }
        }
        Ok(graph)
    }

    /// Checks the hierarchy: the top exists, every prototype exists, and no
    /// module instantiates itself.
    pub fn validate(&self) -> Result<(), DesignError> {
        if !self.modules.contains(self.top) {
            return Err(DesignError::MissingTop(self.top));
        }
        self.leaves_first().map(|_| ())
    }

    /// Every module, ordered so that each comes after all its prototypes.
    pub fn leaves_first(&self) -> Result<Vec<ModuleId>, DesignError> {
        let graph = self.instantiation_graph()?;
        let mut order = toposort(&graph, None)
            .map_err(|cycle| DesignError::RecursiveInstantiation(cycle.node_id()))?;
        order.reverse();
        Ok(order)
    }

    /// Groups [`leaves_first`](Self::leaves_first) into levels: level 0 has
    /// no instances, level `n` instantiates only modules of lower levels.
    pub fn levels(&self) -> Result<Vec<Vec<ModuleId>>, DesignError> {
        let order = self.leaves_first()?;
        let mut level = vec![0usize; self.modules.len()];
        let mut levels: Vec<Vec<ModuleId>> = Vec::new();
        for id in order {
            let l = self.modules[id]
                .instances
                .values()
                .map(|i| level[i.module.index()] + 1)
                .max()
                .unwrap_or(0);
            level[id.index()] = l;
            if levels.len() <= l {
                levels.resize_with(l + 1, Vec::new);
            }
            levels[l].push(id);
        }
        Ok(levels)
    }

    /// Every `(parent, instance)` pair instantiating `module`.
    pub fn parents_of(&self, module: ModuleId) -> Vec<(ModuleId, InstanceId)> {
        self.modules
            .iter()
            .flat_map(|(pid, p)| {
                p.instances
                    .iter()
                    .filter(move |(_, i)| i.module == module)
                    .map(move |(iid, _)| (pid, iid))
            })
            .collect()
    }

    /// Modules instantiated by at least one other module.
    pub fn instantiated(&self) -> BTreeSet<ModuleId> {
        self.modules
            .values()
            .flat_map(|m| m.instances.values().map(|i| i.module))
            .collect()
    }

    /// Finds a module by name.
    pub fn find_module(&self, name: strata_common::Ident) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::Interner;

    fn chain() -> (Design, [ModuleId; 3]) {
        let names = Interner::new();
        let mut d = Design::new();
        let leaf = d.add_module(Module::new(names.get_or_intern("leaf")));
        let mut mid = Module::new(names.get_or_intern("mid"));
        mid.add_instance(names.get_or_intern("l0"), leaf);
        mid.add_instance(names.get_or_intern("l1"), leaf);
        let mid = d.add_module(mid);
        let mut top = Module::new(names.get_or_intern("top"));
        top.add_instance(names.get_or_intern("m0"), mid);
        top.add_instance(names.get_or_intern("l2"), leaf);
        let top = d.add_module(top);
        d.top = top;
        (d, [leaf, mid, top])
    }

    #[test]
    fn leaves_first_order() {
        let (d, [leaf, mid, top]) = chain();
        let order = d.leaves_first().unwrap();
        let pos = |m| order.iter().position(|&x| x == m).unwrap();
        assert!(pos(leaf) < pos(mid));
        assert!(pos(mid) < pos(top));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn levels_group_by_depth() {
        let (d, [leaf, mid, top]) = chain();
        assert_eq!(d.levels().unwrap(), vec![vec![leaf], vec![mid], vec![top]]);
    }

    #[test]
    fn parents_and_instantiated() {
        let (d, [leaf, mid, top]) = chain();
        assert_eq!(d.parents_of(leaf).len(), 3);
        assert_eq!(d.parents_of(top), vec![]);
        assert_eq!(d.instantiated(), [leaf, mid].into_iter().collect());
    }

    #[test]
    fn recursion_detected() {
        let names = Interner::new();
        let mut d = Design::new();
        let mut m = Module::new(names.get_or_intern("m"));
        m.add_instance(names.get_or_intern("self"), ModuleId::from_raw(0));
        d.add_module(m);
        assert!(matches!(
            d.validate(),
            Err(DesignError::RecursiveInstantiation(_))
        ));
    }

    #[test]
    fn unknown_module_and_missing_top() {
        let names = Interner::new();
        let mut d = Design::new();
        assert!(matches!(d.validate(), Err(DesignError::MissingTop(_))));
        let mut m = Module::new(names.get_or_intern("m"));
        m.add_instance(names.get_or_intern("u"), ModuleId::from_raw(9));
        d.add_module(m);
        assert!(matches!(d.validate(), Err(DesignError::UnknownModule { .. })));
    }
}
