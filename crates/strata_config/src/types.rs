//! Hint types deserialized from a design hints TOML file.

use serde::Deserialize;
use std::collections::BTreeMap;

/// All hints for one design. Every table is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignHints {
    /// The global clock.
    #[serde(default)]
    pub clock: ClockHints,
    /// Explicit export lists keyed by module name.
    #[serde(default)]
    pub exports: BTreeMap<String, Vec<String>>,
    /// Signals to analyze per bit from the start.
    #[serde(default)]
    pub split: SplitHints,
    /// Optional engine stages.
    #[serde(default)]
    pub engine: EngineOptions,
}

impl DesignHints {
    /// Returns the explicit export list for `module`, if one was given.
    pub fn exports_for(&self, module: &str) -> Option<&[String]> {
        self.exports.get(module).map(Vec::as_slice)
    }

    /// Returns the forced-split port-instance names (`inst.port`) for `module`.
    pub fn split_port_insts(&self, module: &str) -> &[String] {
        self.split.port_insts.get(module).map_or(&[], Vec::as_slice)
    }

    /// Returns the forced-split driver names for `module`.
    pub fn split_drivers(&self, module: &str) -> &[String] {
        self.split.drivers.get(module).map_or(&[], Vec::as_slice)
    }
}

/// The `[clock]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockHints {
    /// Name of the global clock wire. Every wire with this name, in any
    /// module, is the same global clock.
    #[serde(default = "default_clock")]
    pub name: String,
}

fn default_clock() -> String {
    "clk".to_string()
}

impl Default for ClockHints {
    fn default() -> Self {
        Self {
            name: default_clock(),
        }
    }
}

/// The `[split]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitHints {
    /// Port-instances to split, as `instance.port`, keyed by parent module.
    #[serde(default)]
    pub port_insts: BTreeMap<String, Vec<String>>,
    /// Drivers to split, named by the first wire they drive, keyed by module.
    #[serde(default)]
    pub drivers: BTreeMap<String, Vec<String>>,
}

/// The `[engine]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineOptions {
    /// Run the self-consistency checks after flattening.
    #[serde(default)]
    pub verify: bool,
    /// Analyze independent modules on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
    /// Run the parameterized-module matcher.
    #[serde(default = "default_true")]
    pub templates: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            verify: false,
            parallel: false,
            templates: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let hints = DesignHints::default();
        assert_eq!(hints.clock.name, "clk");
        assert!(hints.engine.templates);
        assert!(!hints.engine.verify);
        assert!(hints.exports_for("top").is_none());
        assert!(hints.split_drivers("top").is_empty());
    }

    #[test]
    fn lookup_helpers() {
        let mut hints = DesignHints::default();
        hints
            .split
            .port_insts
            .insert("top".into(), vec!["u0.o".into()]);
        hints.exports.insert("sub".into(), vec!["a".into()]);
        assert_eq!(hints.split_port_insts("top"), ["u0.o".to_string()]);
        assert_eq!(hints.exports_for("sub").unwrap().len(), 1);
    }
}
