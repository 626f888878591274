//! Hint file loading and validation.

use crate::error::ConfigError;
use crate::types::DesignHints;
use std::collections::BTreeSet;
use std::path::Path;

/// Loads and validates design hints from a TOML file.
pub fn load_hints(path: &Path) -> Result<DesignHints, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_hints_from_str(&content)
}

/// Parses and validates design hints from a string.
pub fn load_hints_from_str(content: &str) -> Result<DesignHints, ConfigError> {
    let hints: DesignHints =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_hints(&hints)?;
    Ok(hints)
}

/// Checks values that the TOML schema alone cannot.
///
/// Names that do not resolve against a design are checked later, against the
/// design, and only warned about.
pub fn validate_hints(hints: &DesignHints) -> Result<(), ConfigError> {
    if hints.clock.name.is_empty() {
        return Err(ConfigError::ValidationError("empty clock name".to_string()));
    }
    for (module, names) in &hints.exports {
        let mut seen = BTreeSet::new();
        for name in names {
            if !seen.insert(name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate export '{name}' for module '{module}'"
                )));
            }
        }
    }
    for (module, names) in &hints.split.port_insts {
        if let Some(bad) = names.iter().find(|n| n.split_once('.').is_none()) {
            return Err(ConfigError::ValidationError(format!(
                "split port-instance '{bad}' in module '{module}' is not of the form inst.port"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty() {
        let hints = load_hints_from_str("").unwrap();
        assert_eq!(hints.clock.name, "clk");
        assert!(hints.exports.is_empty());
    }

    #[test]
    fn parse_full() {
        let toml = r#"
[clock]
name = "gclk"

[exports]
top = ["a", "b", "y"]

[split]
port_insts = { top = ["u0.o"] }
drivers = { top = ["y"] }

[engine]
verify = true
parallel = true
templates = false
"#;
        let hints = load_hints_from_str(toml).unwrap();
        assert_eq!(hints.clock.name, "gclk");
        assert_eq!(hints.exports_for("top").unwrap(), ["a", "b", "y"]);
        assert_eq!(hints.split_port_insts("top"), ["u0.o"]);
        assert_eq!(hints.split_drivers("top"), ["y"]);
        assert!(hints.engine.verify);
        assert!(hints.engine.parallel);
        assert!(!hints.engine.templates);
    }

    #[test]
    fn empty_clock_errors() {
        let err = load_hints_from_str("[clock]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn duplicate_export_errors() {
        let err = load_hints_from_str("[exports]\ntop = [\"a\", \"a\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn malformed_split_name_errors() {
        let err = load_hints_from_str("[split]\nport_insts = { top = [\"u0\"] }\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_table_errors() {
        let err = load_hints_from_str("[bogus]\nx = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hints.toml");
        std::fs::write(&path, "[clock]\nname = \"ck\"\n").unwrap();
        assert_eq!(load_hints(&path).unwrap().clock.name, "ck");
    }

    #[test]
    fn io_error_for_missing_file() {
        let err = load_hints(Path::new("/nonexistent/hints.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
