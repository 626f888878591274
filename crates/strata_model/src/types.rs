//! Extended module types of the hierarchical model.

use std::collections::BTreeMap;
use strata_common::{Ident, Interner, Mask};
use strata_ir::{
    Arena, AssignId, ExprId, ExprManager, InstanceId, Lhs, ModuleId, VarName, WireId,
    STRENGTH_DEFAULT, STRENGTH_NORMAL,
};

/// Drive strength of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strength {
    /// An ordinary continuous assignment.
    Default,
    /// An assignment with an explicit drive strength.
    Normal,
}

impl Strength {
    /// Decodes a raw strength, or `None` if it is not legal.
    pub fn from_raw(raw: u8) -> Option<Strength> {
        match raw {
            STRENGTH_DEFAULT => Some(Strength::Default),
            STRENGTH_NORMAL => Some(Strength::Normal),
            _ => None,
        }
    }

    /// The raw encoding.
    pub fn raw(self) -> u8 {
        match self {
            Strength::Default => STRENGTH_DEFAULT,
            Strength::Normal => STRENGTH_NORMAL,
        }
    }
}

/// What drives a run of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    /// Bits `lsb..` of a driver's right-hand side.
    Driver {
        /// The driver.
        id: AssignId,
        /// Position within the driver's target.
        lsb: u32,
    },
    /// Bits `lsb..` of a local wire.
    Wire {
        /// The source wire.
        wire: WireId,
        /// First source bit.
        lsb: u32,
    },
    /// Bits `lsb..` of a port-instance output.
    PortInst {
        /// The instance.
        inst: InstanceId,
        /// The prototype port.
        port: WireId,
        /// First source bit.
        lsb: u32,
    },
    /// No driver: the bits read as `Z`.
    Z,
}

impl Source {
    /// The source of the bit `n` positions above this one.
    pub fn offset(self, n: u32) -> Source {
        match self {
            Source::Driver { id, lsb } => Source::Driver { id, lsb: lsb + n },
            Source::Wire { wire, lsb } => Source::Wire { wire, lsb: lsb + n },
            Source::PortInst { inst, port, lsb } => Source::PortInst {
                inst,
                port,
                lsb: lsb + n,
            },
            Source::Z => Source::Z,
        }
    }

    /// The variable this source reads from, if any.
    pub fn var_name(self) -> Option<VarName> {
        match self {
            Source::Wire { wire, .. } => Some(VarName::Wire(wire)),
            Source::PortInst { inst, port, .. } => Some(VarName::PortInst { inst, port }),
            Source::Driver { .. } | Source::Z => None,
        }
    }

    /// The first source bit, for variable sources.
    pub fn lsb(self) -> u32 {
        match self {
            Source::Driver { lsb, .. } | Source::Wire { lsb, .. } | Source::PortInst { lsb, .. } => {
                lsb
            }
            Source::Z => 0,
        }
    }
}

/// A driven run of bits of a wire or port-instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireDriver {
    /// Number of bits.
    pub width: u32,
    /// What drives the lowest bit; higher bits follow consecutively.
    pub source: Source,
}

/// Sink runs keyed by their lowest bit.
pub type DriverMap = BTreeMap<u32, WireDriver>;

/// Finds the run covering `bit`, returning its lsb and driver.
pub fn run_at(drivers: &DriverMap, bit: u32) -> Option<(u32, &WireDriver)> {
    let (&lsb, driver) = drivers.range(..=bit).next_back()?;
    (bit < lsb + driver.width).then_some((lsb, driver))
}

/// A checked wire.
#[derive(Debug, Clone)]
pub struct WireExt {
    /// The wire name.
    pub name: Ident,
    /// Number of bits.
    pub width: u32,
    /// Declared index of bit 0.
    pub low_idx: i64,
    /// Whether the wire is exported.
    pub export: bool,
    /// Whether the wire is the global clock.
    pub global: bool,
    /// Bits driven inside the module.
    pub assigned: Mask,
    /// Driven runs.
    pub drivers: DriverMap,
}

impl WireExt {
    /// Export bits driven by the parent.
    pub fn input_mask(&self) -> Mask {
        if self.export {
            &Mask::low(self.width) & &!&self.assigned
        } else {
            Mask::none()
        }
    }

    /// Export bits driven inside the module.
    pub fn output_mask(&self) -> Mask {
        if self.export {
            &Mask::low(self.width) & &self.assigned
        } else {
            Mask::none()
        }
    }

    /// Whether bit `bit` is an input bit.
    pub fn is_input(&self, bit: u32) -> bool {
        self.export && bit < self.width && !self.assigned.contains(bit)
    }

    /// The run driving `bit`, with its lsb.
    pub fn driver_at(&self, bit: u32) -> Option<(u32, &WireDriver)> {
        run_at(&self.drivers, bit)
    }
}

/// The connection of one prototype export at one instance.
#[derive(Debug, Clone)]
pub struct PortInst {
    /// The prototype wire.
    pub port: WireId,
    /// Number of bits.
    pub width: u32,
    /// Bits driven by the prototype.
    pub outputs: Mask,
    /// Input bits driven in the parent.
    pub assigned: Mask,
    /// Driven input runs.
    pub drivers: DriverMap,
}

impl PortInst {
    /// Whether bit `bit` is driven by the prototype.
    pub fn is_output(&self, bit: u32) -> bool {
        self.outputs.contains(bit)
    }

    /// Bits the parent drives or must drive.
    pub fn input_mask(&self) -> Mask {
        &Mask::low(self.width) & &!&self.outputs
    }

    /// The run driving input bit `bit`, with its lsb.
    pub fn driver_at(&self, bit: u32) -> Option<(u32, &WireDriver)> {
        run_at(&self.drivers, bit)
    }
}

/// A checked instance.
#[derive(Debug, Clone)]
pub struct InstanceExt {
    /// The instance name.
    pub name: Ident,
    /// The prototype.
    pub module: ModuleId,
    /// One port-instance per prototype export, indexed by prototype wire.
    pub ports: Vec<PortInst>,
}

impl InstanceExt {
    /// The port-instance of prototype wire `port`.
    pub fn port(&self, port: WireId) -> Option<&PortInst> {
        self.ports.get(port.index())
    }
}

/// A checked continuous assignment.
#[derive(Debug, Clone)]
pub struct Driver {
    /// The driven bits.
    pub lhs: Lhs,
    /// The driving expression.
    pub expr: ExprId,
    /// Drive strength.
    pub strength: Strength,
}

impl Driver {
    /// Number of driven bits.
    pub fn width(&self) -> u32 {
        self.lhs.width()
    }
}

/// A checked module.
#[derive(Debug, Clone)]
pub struct ModuleExt {
    /// The module's ID in the design.
    pub id: ModuleId,
    /// The module name.
    pub name: Ident,
    /// Checked wires.
    pub wires: Arena<WireId, WireExt>,
    /// Checked instances.
    pub instances: Arena<InstanceId, InstanceExt>,
    /// Checked drivers.
    pub drivers: Arena<AssignId, Driver>,
    /// Number of exported wires; the exports are the first wires.
    pub exports: u32,
    /// Wires in the module and all its sub-instances.
    pub total_wires: u32,
    /// The module's expressions.
    pub exprs: ExprManager,
}

impl ModuleExt {
    /// The exported wires.
    pub fn export_ids(&self) -> impl Iterator<Item = WireId> + '_ {
        self.wires.ids().take(self.exports as usize)
    }

    /// The global clock wire, if the module has one.
    pub fn clock(&self) -> Option<WireId> {
        self.wires.iter().find(|(_, w)| w.global).map(|(id, _)| id)
    }

    /// Whether any export bit is an output.
    pub fn has_outputs(&self) -> bool {
        self.export_ids()
            .any(|w| !self.wires[w].output_mask().is_empty())
    }

    /// Width of a variable name, if it refers to a wire or exported port here.
    pub fn var_width(&self, name: VarName) -> Option<u32> {
        match name {
            VarName::Wire(w) => self.wires.try_get(w).map(|w| w.width),
            VarName::PortInst { inst, port } => {
                self.instances.try_get(inst)?.port(port).map(|p| p.width)
            }
            VarName::Flat(_) => None,
        }
    }

    /// Human-readable name of a local variable.
    pub fn var_display(&self, names: &Interner, name: VarName) -> String {
        match name {
            VarName::Wire(w) => match self.wires.try_get(w) {
                Some(wire) => names.resolve(wire.name).to_string(),
                None => w.to_string(),
            },
            VarName::PortInst { inst, port } => {
                let inst_name = match self.instances.try_get(inst) {
                    Some(i) => names.resolve(i.name).to_string(),
                    None => inst.to_string(),
                };
                format!("{inst_name}.{port}")
            }
            VarName::Flat(slot) => format!("#{slot}"),
        }
    }

    /// Human-readable name of one bit of a local wire.
    pub fn wire_bit_display(&self, names: &Interner, wire: WireId, bit: u32) -> String {
        let base = self.var_display(names, VarName::Wire(wire));
        match self.wires.try_get(wire) {
            Some(w) if w.width == 1 => base,
            Some(w) => format!("{base}[{}]", w.low_idx + i64::from(bit)),
            None => format!("{base}[{bit}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(width: u32, export: bool, assigned: Mask) -> WireExt {
        WireExt {
            name: Ident::from_raw(0),
            width,
            low_idx: 0,
            export,
            global: false,
            assigned,
            drivers: DriverMap::new(),
        }
    }

    #[test]
    fn strength_codes() {
        assert_eq!(Strength::from_raw(6), Some(Strength::Default));
        assert_eq!(Strength::from_raw(10), Some(Strength::Normal));
        assert_eq!(Strength::from_raw(7), None);
        assert_eq!(Strength::Normal.raw(), 10);
    }

    #[test]
    fn input_output_masks() {
        let w = wire(4, true, Mask::range(1, 2));
        assert_eq!(w.output_mask(), Mask::range(1, 2));
        assert_eq!(w.input_mask(), &Mask::bit(0) | &Mask::bit(3));
        assert!(w.is_input(0));
        assert!(!w.is_input(1));
        assert!(!w.is_input(4));

        let local = wire(4, false, Mask::none());
        assert!(local.input_mask().is_empty());
        assert!(local.output_mask().is_empty());
    }

    #[test]
    fn runs_are_found_by_bit() {
        let mut drivers = DriverMap::new();
        let src = Source::Wire {
            wire: WireId::from_raw(1),
            lsb: 4,
        };
        drivers.insert(2, WireDriver { width: 3, source: src });
        assert!(run_at(&drivers, 1).is_none());
        assert_eq!(run_at(&drivers, 4).map(|(lsb, _)| lsb), Some(2));
        assert!(run_at(&drivers, 5).is_none());
        assert_eq!(src.offset(2).lsb(), 6);
        assert_eq!(Source::Z.offset(3), Source::Z);
    }
}
