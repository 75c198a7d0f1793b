use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::fixtures::{self, CaseClass, CaseMode};
use crate::{ParseMode, check_syntax, parse};

fn parse_mode(mode: CaseMode) -> ParseMode {
    match mode {
        CaseMode::Module => ParseMode::Module,
        CaseMode::Interactive => ParseMode::Interactive,
        CaseMode::Eval => ParseMode::Eval,
    }
}

#[test]
fn runs_fixture_cases() -> Result<()> {
    let cases = fixtures::load_cases(Path::new("tests/programs"))?;

    for case in cases {
        let source = case.read_source()?;
        let mode = parse_mode(case.spec.mode);

        match case.spec.class {
            CaseClass::ParseSuccess => {
                let first = parse(&source, mode)
                    .with_context(|| format!("Parsing case {}", case.name))?;
                let second = parse(&source, mode)
                    .with_context(|| format!("Re-parsing case {}", case.name))?;
                assert_eq!(first, second, "Parse not deterministic for {}", case.name);
                check_syntax(&source, mode)
                    .with_context(|| format!("Syntax-checking case {}", case.name))?;
            }
            CaseClass::SyntaxError => {
                let expected = case
                    .spec
                    .error_contains
                    .as_deref()
                    .with_context(|| format!("Case {} has no error_contains", case.name))?;
                let result = parse(&source, mode);
                ensure!(
                    result.is_err(),
                    "Expected a syntax error for case {}",
                    case.name
                );
                let error = result.unwrap_err().to_string();
                ensure!(
                    error.contains(expected),
                    "Case {}: expected error containing '{expected}', got '{error}'",
                    case.name
                );
                // Both factories must reject the same inputs.
                let checked = check_syntax(&source, mode);
                ensure!(
                    checked.is_err(),
                    "Syntax check accepted failing case {}",
                    case.name
                );
            }
        }
    }

    Ok(())
}
