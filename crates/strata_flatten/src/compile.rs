//! The driver compiler.
//!
//! Drivers of every module instance are rewritten over flat slots
//! (`norm_assigns`), split into per-net contributions (`net_assigns`),
//! resolved into one expression per net (`res_assigns`), and the delayed
//! variables they read are linked to their one-cycle-younger versions
//! (`res_delays`).

use crate::alias::{make_aliases, AliasTable};
use crate::layout::{Hierarchy, Layout};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strata_common::{InternalError, StrataResult, Value};
use strata_ir::{AssignId, ExprId, ExprManager, Func, LhAtom, Lhs, VarName, Variable};
use strata_model::Model;
use tracing::debug;

/// One driver of one module instance, in flat terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormAssign {
    /// The scope the driver belongs to.
    pub scope: u32,
    /// The driver within the scope's module.
    pub driver: AssignId,
    /// Canonical flat target bits.
    pub lhs: Lhs,
    /// The driving expression over flat variables.
    pub expr: ExprId,
    /// Raw drive strength.
    pub strength: u8,
}

/// One contribution to a net: a full-width value, `Z` where not driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDriver {
    /// The contribution.
    pub expr: ExprId,
    /// Raw drive strength.
    pub strength: u8,
}

/// The compiled, flattened design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledNets {
    /// Scopes and slots.
    pub hierarchy: Hierarchy,
    /// Canonical form of every slot.
    pub aliases: AliasTable,
    /// Storage for every compiled expression.
    pub exprs: ExprManager,
    /// Every driver of every instance, top-down.
    pub norm_assigns: Vec<NormAssign>,
    /// Contributions per net, in source order.
    pub net_assigns: BTreeMap<u32, Vec<NetDriver>>,
    /// The resolved value of each driven net.
    pub res_assigns: BTreeMap<u32, ExprId>,
    /// Each delayed variable read by a net, mapped to the same variable one
    /// cycle later.
    #[serde(with = "pairs")]
    pub res_delays: BTreeMap<Variable, Variable>,
}

/// Flattens and compiles the hierarchy below the model's top module.
pub fn compile(model: &Model) -> StrataResult<CompiledNets> {
    let layout = Layout::new(model);
    let hierarchy = Hierarchy::build(model, &layout)?;
    let aliases = make_aliases(model, &layout, &hierarchy)?;
    let mut exprs = ExprManager::new();
    let norm_assigns = norm_assigns(model, &layout, &hierarchy, &aliases, &mut exprs)?;
    let net_assigns = net_assigns(&mut exprs, &norm_assigns);
    let res_assigns = resolve_nets(&mut exprs, &net_assigns);
    let res_delays = delay_links(&exprs, res_assigns.values().copied());
    debug!(
        slots = hierarchy.len(),
        drivers = norm_assigns.len(),
        nets = res_assigns.len(),
        delays = res_delays.len(),
        "compiled nets"
    );
    Ok(CompiledNets {
        hierarchy,
        aliases,
        exprs,
        norm_assigns,
        net_assigns,
        res_assigns,
        res_delays,
    })
}

fn norm_assigns(
    model: &Model,
    layout: &Layout,
    hierarchy: &Hierarchy,
    aliases: &AliasTable,
    exprs: &mut ExprManager,
) -> StrataResult<Vec<NormAssign>> {
    let mut out = Vec::new();
    for (index, scope) in hierarchy.scopes.iter().enumerate() {
        let m = model.module(scope.module);
        let mut memo = HashMap::new();
        for (driver, d) in m.drivers.iter() {
            let lhs = aliases.flatten_lhs(model, layout, scope.module, scope.offset, &d.lhs)?;
            let mut missing = None;
            let expr = exprs.translate(&m.exprs, d.expr, &mut memo, &mut |em: &mut ExprManager,
                                                                           v: &Variable| {
                let canonical = layout
                    .slot(model, scope.module, scope.offset, v.name)
                    .and_then(|slot| aliases.get(slot));
                match canonical {
                    Some(lhs) => lhs.to_expr_as(em, v.delay, v.nonblocking),
                    None => {
                        missing = Some(v.name);
                        em.constant(Value::x())
                    }
                }
            });
            if let Some(name) = missing {
                return Err(InternalError::new(format!("variable {name} has no flat slot")));
            }
            out.push(NormAssign {
                scope: index as u32,
                driver,
                lhs,
                expr,
                strength: d.strength.raw(),
            });
        }
    }
    Ok(out)
}

/// Splits normalized drivers into per-net contributions.
///
/// A driver covering bits `lsb..lsb + width` of a net, taken from position
/// `pos` of its value, contributes `concat(lsb, Z, concat(width, rsh(pos,
/// expr), Z))`.
pub fn net_assigns(exprs: &mut ExprManager, norm: &[NormAssign]) -> BTreeMap<u32, Vec<NetDriver>> {
    let mut nets: BTreeMap<u32, Vec<NetDriver>> = BTreeMap::new();
    let z = exprs.constant(Value::z());
    // Appending in forward order leaves each net's list in source order.
    for assign in norm {
        let mut pos = 0u32;
        for range in assign.lhs.ranges() {
            if let LhAtom::Var {
                name: VarName::Flat(slot),
                rsh,
            } = range.atom
            {
                let shift = exprs.constant(Value::from_u64(u64::from(pos)));
                let shifted = exprs.call_folded(Func::Rsh, vec![shift, assign.expr]);
                let width = exprs.constant(Value::from_u64(u64::from(range.width)));
                let field = exprs.call_folded(Func::Concat, vec![width, shifted, z]);
                let lsb = exprs.constant(Value::from_u64(u64::from(rsh)));
                let expr = exprs.call_folded(Func::Concat, vec![lsb, z, field]);
                nets.entry(slot).or_default().push(NetDriver {
                    expr,
                    strength: assign.strength,
                });
            }
            pos += range.width;
        }
    }
    nets
}

/// Resolves the contributions of each net: `res(d0, res(d1, ... dn))`.
pub fn resolve_nets(
    exprs: &mut ExprManager,
    nets: &BTreeMap<u32, Vec<NetDriver>>,
) -> BTreeMap<u32, ExprId> {
    nets.iter()
        .filter_map(|(&slot, drivers)| {
            let (last, rest) = drivers.split_last()?;
            let resolved = rest
                .iter()
                .rev()
                .fold(last.expr, |acc, d| exprs.call_folded(Func::Res, vec![d.expr, acc]));
            Some((slot, resolved))
        })
        .collect()
}

/// Links every delayed variable read by `roots` to its one-cycle-younger
/// version, down to delay zero.
pub fn delay_links(
    exprs: &ExprManager,
    roots: impl IntoIterator<Item = ExprId>,
) -> BTreeMap<Variable, Variable> {
    let mut links = BTreeMap::new();
    for root in roots {
        for var in exprs.vars(root) {
            let mut cur = var;
            while let Some(prev) = cur.step_back() {
                links.insert(cur, prev);
                cur = prev;
            }
        }
    }
    links
}

/// Re-derives the resolved nets and checks they match.
pub fn verify_compiled(nets: &CompiledNets) -> StrataResult<()> {
    let mut exprs = nets.exprs.clone();
    let again = resolve_nets(&mut exprs, &nets.net_assigns);
    if again.len() != nets.res_assigns.len() {
        return Err(InternalError::new(format!(
            "{} resolved nets, {} after recompiling",
            nets.res_assigns.len(),
            again.len()
        )));
    }
    for (slot, expr) in &again {
        if nets.res_assigns.get(slot) != Some(expr) {
            return Err(InternalError::new(format!("resolved value of net #{slot} differs")));
        }
    }
    Ok(())
}

mod pairs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;
    use strata_ir::Variable;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Variable, Variable>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        s.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<Variable, Variable>, D::Error> {
        let pairs: Vec<(Variable, Variable)> = Vec::deserialize(d)?;
        Ok(pairs.into_iter().collect())
    }
}
