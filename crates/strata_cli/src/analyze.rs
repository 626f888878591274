//! `strata analyze`.

use crate::output::{fatal, render_diagnostics};
use crate::{AnalyzeArgs, GlobalArgs};
use strata_config::{load_hints, DesignHints};
use strata_diagnostics::DiagnosticSink;
use strata_engine::{load_design, DesignReport, EngineError};
use tracing::info;

/// Loads the hints named on the command line, or the defaults.
pub fn hints_from(path: Option<&std::path::Path>) -> Result<DesignHints, EngineError> {
    Ok(match path {
        Some(path) => load_hints(path)?,
        None => DesignHints::default(),
    })
}

/// Runs the engine and writes the report. Returns the exit code.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut hints = hints_from(args.hints.as_deref())?;
    hints.engine.verify |= args.verify;
    hints.engine.parallel |= args.parallel;
    let sink = DiagnosticSink::new();
    let (names, design) = match load_design(&args.design) {
        Ok(loaded) => loaded,
        Err(e) => return fatal(e, &sink, global),
    };
    let compiled = match strata_engine::run(&design, &names, &hints, &sink) {
        Ok(compiled) => compiled,
        Err(e) => return fatal(e, &sink, global),
    };

    let report = DesignReport::new(&compiled, &names);
    let json = serde_json::to_string_pretty(&report)?;
    match &args.report {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }

    let errors = render_diagnostics(&sink, global);
    Ok(if errors > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strata_common::Interner;
    use strata_ir::{Design, DesignFile, Func, Lhs, Module, VarName, Variable, STRENGTH_DEFAULT};

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
        }
    }

    fn write_design(dir: &std::path::Path, double_drive: bool) -> PathBuf {
        let names = Interner::new();
        let mut m = Module::new(names.get_or_intern("top"));
        let a = m.add_wire(names.get_or_intern("a"), 1);
        let y = m.add_wire(names.get_or_intern("y"), 1);
        let ea = m.exprs.var(Variable::wire(a));
        let rhs = m.exprs.call(Func::BitNot, vec![ea]);
        m.add_assign(Lhs::var(VarName::Wire(y), 1), rhs, STRENGTH_DEFAULT);
        if double_drive {
            m.add_assign(Lhs::var(VarName::Wire(y), 1), ea, STRENGTH_DEFAULT);
        }
        let mut design = Design::new();
        design.top = design.add_module(m);
        let path = dir.join("design.json");
        let file = DesignFile::new(&names, design);
        std::fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();
        path
    }

    #[test]
    fn writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            design: write_design(dir.path(), false),
            hints: None,
            report: Some(dir.path().join("report.json")),
            verify: true,
            parallel: false,
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
        let text = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["top"], "top");
        assert_eq!(json["modules"][0]["outputs"][0]["signal"], "y");
    }

    #[test]
    fn structural_error_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            design: write_design(dir.path(), true),
            hints: None,
            report: Some(dir.path().join("report.json")),
            verify: false,
            parallel: false,
        };
        assert_eq!(run(&args, &global()).unwrap(), 1);
        assert!(!dir.path().join("report.json").exists());
    }

    #[test]
    fn bad_hints_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let hints = dir.path().join("hints.toml");
        std::fs::write(&hints, "[clock]\nname = \"\"\n").unwrap();
        let args = AnalyzeArgs {
            design: write_design(dir.path(), false),
            hints: Some(hints),
            report: None,
            verify: false,
            parallel: false,
        };
        assert!(run(&args, &global()).is_err());
    }
}
