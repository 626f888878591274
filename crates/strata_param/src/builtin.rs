//! Built-in templates for common library primitives.

use crate::template::{ParamSpec, Params, Template};
use strata_common::{Interner, Value};
use strata_ir::{
    ExprId, ExprManager, Func, Lhrange, Lhs, Module, VarName, Variable, WireId, STRENGTH_DEFAULT,
};

fn width_of(params: &Params) -> Option<u32> {
    params.int("width").and_then(|w| u32::try_from(w).ok()).filter(|&w| w > 0)
}

/// Bit `bit` of `var`.
fn bit_of(exprs: &mut ExprManager, var: Variable, bit: u32) -> ExprId {
    let index = exprs.constant(Value::from_u64(u64::from(bit)));
    let v = exprs.var(var);
    exprs.call(Func::BitSel, vec![index, v])
}

fn bit_lhs(wire: WireId, bit: u32) -> Lhs {
    Lhs(vec![Lhrange::var(VarName::Wire(wire), bit, 1)])
}

/// Ports `clk`, `d` and `q`; `q` is assigned one bit at a time from `next`.
fn clocked(
    name: &str,
    width: u32,
    names: &Interner,
    next: impl Fn(&mut ExprManager, WireId, WireId, WireId, u32) -> ExprId,
) -> Module {
    let mut m = Module::new(names.get_or_intern(name));
    let clk = m.add_wire(names.get_or_intern("clk"), 1);
    let d = m.add_wire(names.get_or_intern("d"), width);
    let q = m.add_wire(names.get_or_intern("q"), width);
    for bit in 0..width {
        let rhs = next(&mut m.exprs, clk, d, q, bit);
        m.add_assign(bit_lhs(q, bit), rhs, STRENGTH_DEFAULT);
    }
    m
}

/// `flop$width=N`: `q` takes the previous `d` on a rising clock edge.
#[derive(Debug)]
pub struct Flop {
    params: Vec<ParamSpec>,
}

impl Default for Flop {
    fn default() -> Self {
        Self {
            params: vec![ParamSpec::int("width", 1)],
        }
    }
}

impl Template for Flop {
    fn base(&self) -> &str {
        "flop"
    }

    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn generate(&self, name: &str, params: &Params, names: &Interner) -> Option<Module> {
        let width = width_of(params)?;
        Some(clocked(name, width, names, |exprs, clk, d, q, bit| {
            let now = exprs.var(Variable::wire(clk));
            let before = exprs.var(Variable::delayed(VarName::Wire(clk), 1));
            let was_low = exprs.call(Func::BitNot, vec![before]);
            let edge = exprs.call(Func::BitAnd, vec![now, was_low]);
            let d_prev = bit_of(exprs, Variable::delayed(VarName::Wire(d), 1), bit);
            let q_prev = bit_of(exprs, Variable::delayed(VarName::Wire(q), 1), bit);
            exprs.call(Func::Ite, vec![edge, d_prev, q_prev])
        }))
    }
}

/// `latch$width=N`: `q` follows `d` while the clock is high.
#[derive(Debug)]
pub struct Latch {
    params: Vec<ParamSpec>,
}

impl Default for Latch {
    fn default() -> Self {
        Self {
            params: vec![ParamSpec::int("width", 1)],
        }
    }
}

impl Template for Latch {
    fn base(&self) -> &str {
        "latch"
    }

    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn generate(&self, name: &str, params: &Params, names: &Interner) -> Option<Module> {
        let width = width_of(params)?;
        Some(clocked(name, width, names, |exprs, clk, d, q, bit| {
            let open = exprs.var(Variable::wire(clk));
            let d_now = bit_of(exprs, Variable::wire(d), bit);
            let q_prev = bit_of(exprs, Variable::delayed(VarName::Wire(q), 1), bit);
            exprs.call(Func::Ite, vec![open, d_now, q_prev])
        }))
    }
}

/// `gate$op=and|or|xor$width=N`: `y = a op b`.
#[derive(Debug)]
pub struct Gate {
    params: Vec<ParamSpec>,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            params: vec![ParamSpec::str("op", "and"), ParamSpec::int("width", 1)],
        }
    }
}

impl Template for Gate {
    fn base(&self) -> &str {
        "gate"
    }

    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn generate(&self, name: &str, params: &Params, names: &Interner) -> Option<Module> {
        let width = width_of(params)?;
        let func = match params.str("op")? {
            "and" => Func::BitAnd,
            "or" => Func::BitOr,
            "xor" => Func::BitXor,
            _ => return None,
        };
        let mut m = Module::new(names.get_or_intern(name));
        let a = m.add_wire(names.get_or_intern("a"), width);
        let b = m.add_wire(names.get_or_intern("b"), width);
        let y = m.add_wire(names.get_or_intern("y"), width);
        let ea = m.exprs.var(Variable::wire(a));
        let eb = m.exprs.var(Variable::wire(b));
        let rhs = m.exprs.call(func, vec![ea, eb]);
        m.add_assign(Lhs::var(VarName::Wire(y), width), rhs, STRENGTH_DEFAULT);
        Some(m)
    }
}

/// Every built-in template.
pub fn builtins() -> Vec<Box<dyn Template>> {
    vec![
        Box::new(Flop::default()),
        Box::new(Latch::default()),
        Box::new(Gate::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::parse_name;

    fn gen(t: &dyn Template, name: &str) -> Option<Module> {
        let names = Interner::new();
        let params = parse_name(name, t.base(), t.params())?;
        t.generate(name, &params, &names)
    }

    #[test]
    fn flop_has_one_assign_per_bit() {
        let m = gen(&Flop::default(), "flop$width=4").unwrap();
        assert_eq!(m.wires.len(), 3);
        assert_eq!(m.assigns.len(), 4);
        let (_, last) = m.assigns.iter().last().unwrap();
        assert_eq!(last.lhs, bit_lhs(WireId::from_raw(2), 3));
        assert!(m.exprs.render(last.rhs).starts_with("(?"));
    }

    #[test]
    fn latch_reads_current_d() {
        let m = gen(&Latch::default(), "latch$width=2").unwrap();
        let (_, a0) = m.assigns.iter().next().unwrap();
        let vars = m.exprs.vars(a0.rhs);
        assert!(vars.contains(&Variable::wire(WireId::from_raw(1))));
        assert!(vars.contains(&Variable::delayed(VarName::Wire(WireId::from_raw(2)), 1)));
    }

    #[test]
    fn gate_ops() {
        let m = gen(&Gate::default(), "gate$op=xor$width=3").unwrap();
        assert_eq!(m.assigns.len(), 1);
        assert_eq!(m.wires[WireId::from_raw(2)].width, 3);
        assert!(gen(&Gate::default(), "gate$op=nand").is_none());
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(gen(&Flop::default(), "flop$width=0").is_none());
    }
}
