//! Export determination.
//!
//! A module's exports are always a prefix of its wires. With a hint the
//! prefix is given explicitly; otherwise it is the shortest prefix covering
//! every port referenced by a parent, and a module nobody instantiates
//! exports everything.

use crate::error::ModelError;
use strata_common::Interner;
use strata_config::DesignHints;
use strata_ir::{Design, LhAtom, Lhs, Module, VarName};

/// Computes the export count of every module, indexed by module ID.
pub fn compute_exports(
    design: &Design,
    names: &Interner,
    hints: &DesignHints,
) -> Result<Vec<u32>, ModelError> {
    let mut referenced: Vec<Option<u32>> = vec![None; design.modules.len()];
    for module in design.modules.values() {
        for name in referenced_ports(module) {
            let VarName::PortInst { inst, port } = name else {
                continue;
            };
            let Some(inst) = module.instances.try_get(inst) else {
                continue;
            };
            if let Some(slot) = referenced.get_mut(inst.module.index()) {
                let need = port.as_raw() + 1;
                *slot = Some(slot.map_or(need, |n| n.max(need)));
            }
        }
    }

    let instantiated = design.instantiated();
    let mut exports = Vec::with_capacity(design.modules.len());
    for (id, module) in design.modules.iter() {
        let module_name = names.resolve(module.name);
        let count = match hints.exports_for(module_name) {
            Some(list) => hinted_exports(module, module_name, names, list)?,
            None if instantiated.contains(&id) => referenced[id.index()].unwrap_or(0),
            None => module.wires.len() as u32,
        };
        exports.push(count);
    }
    Ok(exports)
}

fn hinted_exports(
    module: &Module,
    module_name: &str,
    names: &Interner,
    list: &[String],
) -> Result<u32, ModelError> {
    let mut indices = Vec::with_capacity(list.len());
    for wire_name in list {
        let found = names.get(wire_name).and_then(|ident| module.find_wire(ident));
        match found {
            Some(w) => indices.push(w.as_raw()),
            None => {
                return Err(ModelError::consistency(
                    module_name,
                    format!("export {wire_name} is not a wire"),
                ))
            }
        }
    }
    indices.sort_unstable();
    if indices.iter().enumerate().any(|(i, &w)| w != i as u32) {
        return Err(ModelError::consistency(
            module_name,
            "exports must be the first wires of the module",
        ));
    }
    Ok(indices.len() as u32)
}

fn referenced_ports(module: &Module) -> Vec<VarName> {
    fn push_lhs(lhs: &Lhs, out: &mut Vec<VarName>) {
        out.extend(lhs.ranges().iter().filter_map(|r| match r.atom {
            LhAtom::Var { name, .. } => Some(name),
            LhAtom::Z => None,
        }));
    }

    let mut out = Vec::new();
    for assign in module.assigns.values() {
        push_lhs(&assign.lhs, &mut out);
        if module.exprs.contains(assign.rhs) {
            out.extend(module.exprs.vars(assign.rhs).into_iter().map(|v| v.name));
        }
    }
    for alias in &module.aliases {
        push_lhs(&alias.lhs, &mut out);
        push_lhs(&alias.rhs, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use strata_ir::{ModuleId, Variable, WireId, STRENGTH_DEFAULT};

    fn design(names: &Interner) -> (Design, ModuleId, ModuleId) {
        let mut d = Design::new();
        let mut leaf = Module::new(names.get_or_intern("leaf"));
        leaf.add_wire(names.get_or_intern("a"), 1);
        leaf.add_wire(names.get_or_intern("b"), 1);
        leaf.add_wire(names.get_or_intern("y"), 1);
        leaf.add_wire(names.get_or_intern("t"), 1);
        let leaf = d.add_module(leaf);

        let mut top = Module::new(names.get_or_intern("top"));
        let x = top.add_wire(names.get_or_intern("x"), 1);
        let u = top.add_instance(names.get_or_intern("u"), leaf);
        let port = VarName::PortInst {
            inst: u,
            port: WireId::from_raw(1),
        };
        let rhs = top.exprs.var(Variable::wire(x));
        top.add_assign(Lhs::var(port, 1), rhs, STRENGTH_DEFAULT);
        let top = d.add_module(top);
        d.top = top;
        (d, leaf, top)
    }

    #[test]
    fn prefix_covers_references() {
        let names = Interner::new();
        let (d, leaf, top) = design(&names);
        let exports = compute_exports(&d, &names, &DesignHints::default()).unwrap();
        assert_eq!(exports[leaf.index()], 2);
        assert_eq!(exports[top.index()], 1);
    }

    #[test]
    fn hinted_exports_any_order() {
        let names = Interner::new();
        let (d, leaf, _) = design(&names);
        let mut hints = DesignHints::default();
        hints.exports = BTreeMap::from([(
            "leaf".to_string(),
            vec!["y".to_string(), "a".to_string(), "b".to_string()],
        )]);
        let exports = compute_exports(&d, &names, &hints).unwrap();
        assert_eq!(exports[leaf.index()], 3);
    }

    #[test]
    fn hinted_exports_must_be_prefix() {
        let names = Interner::new();
        let (d, _, _) = design(&names);
        let mut hints = DesignHints::default();
        hints.exports = BTreeMap::from([("leaf".to_string(), vec!["y".to_string()])]);
        let err = compute_exports(&d, &names, &hints).unwrap_err();
        assert!(matches!(err, ModelError::Consistency { .. }));

        hints.exports = BTreeMap::from([("leaf".to_string(), vec!["nope".to_string()])]);
        assert!(compute_exports(&d, &names, &hints).is_err());
    }
}
