//! The JSON interchange form of a design.

use crate::design::{Design, DesignError};
use crate::lhs::{LhAtom, Lhs};
use crate::expr::VarName;
use serde::{Deserialize, Serialize};
use strata_common::{Ident, Interner};

/// A design together with the names its identifiers index.
///
/// Every [`Ident`] in `design` is an index into `names`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignFile {
    /// Interned names, by index.
    pub names: Vec<String>,
    /// The design.
    pub design: Design,
}

impl DesignFile {
    /// Packs a design with its interner.
    pub fn new(interner: &Interner, design: Design) -> Self {
        Self {
            names: interner.names(),
            design,
        }
    }

    /// Unpacks the file, checking that every reference it holds resolves.
    pub fn into_parts(self) -> Result<(Interner, Design), DesignError> {
        let interner = Interner::from_names(&self.names).map_err(DesignError::Malformed)?;
        let n = self.names.len() as u32;
        let check_ident = |what: &str, id: Ident| {
            if id.as_raw() < n {
                Ok(())
            } else {
                Err(DesignError::Malformed(format!("{what} name index {} out of range", id.as_raw())))
            }
        };
        let design = self.design;
        for module in design.modules.values() {
            check_ident("module", module.name)?;
            for wire in module.wires.values() {
                check_ident("wire", wire.name)?;
            }
            for inst in module.instances.values() {
                check_ident("instance", inst.name)?;
            }
            let check_lhs = |lhs: &Lhs| {
                for r in lhs.ranges() {
                    if let LhAtom::Var { name, .. } = r.atom {
                        let ok = match name {
                            VarName::Wire(w) => module.wires.contains(w),
                            VarName::PortInst { inst, .. } => module.instances.contains(inst),
                            VarName::Flat(_) => false,
                        };
                        if !ok {
                            return Err(DesignError::Malformed(format!(
                                "reference to unknown {name} in an Lhs"
                            )));
                        }
                    }
                }
                Ok(())
            };
            for assign in module.assigns.values() {
                if !module.exprs.contains(assign.rhs) {
                    return Err(DesignError::Malformed(format!(
                        "assignment refers to unknown expression {}",
                        assign.rhs
                    )));
                }
                check_lhs(&assign.lhs)?;
            }
            for alias in &module.aliases {
                check_lhs(&alias.lhs)?;
                check_lhs(&alias.rhs)?;
            }
        }
        design.validate()?;
        Ok((interner, design))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Module, STRENGTH_DEFAULT};
    use crate::expr::Variable;

    fn sample() -> (Interner, Design) {
        let names = Interner::new();
        let mut m = Module::new(names.get_or_intern("top"));
        let a = m.add_wire(names.get_or_intern("a"), 2);
        let y = m.add_wire(names.get_or_intern("y"), 2);
        let e = m.exprs.var(Variable::wire(a));
        m.add_assign(Lhs::var(VarName::Wire(y), 2), e, STRENGTH_DEFAULT);
        let mut d = Design::new();
        d.top = d.add_module(m);
        (names, d)
    }

    #[test]
    fn json_roundtrip_preserves_names() {
        let (names, d) = sample();
        let file = DesignFile::new(&names, d);
        let json = serde_json::to_string(&file).unwrap();
        let back: DesignFile = serde_json::from_str(&json).unwrap();
        let (names2, d2) = back.into_parts().unwrap();
        let top = d2.module(d2.top);
        assert_eq!(names2.resolve(top.name), "top");
        assert_eq!(names2.resolve(top.wires[crate::ids::WireId::from_raw(1)].name), "y");
    }

    #[test]
    fn rejects_dangling_name() {
        let (names, d) = sample();
        let mut file = DesignFile::new(&names, d);
        file.names.truncate(1);
        assert!(matches!(file.into_parts(), Err(DesignError::Malformed(_))));
    }

    #[test]
    fn rejects_flat_reference() {
        let (names, mut d) = sample();
        let top = d.top;
        d.modules[top].add_alias(Lhs::var(VarName::Flat(0), 1), Lhs::z(1));
        let file = DesignFile::new(&names, d);
        assert!(matches!(file.into_parts(), Err(DesignError::Malformed(_))));
    }
}
