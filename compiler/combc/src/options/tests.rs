use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults() {
    let (options, positional) =
        CompileOptions::from_args::<&str>(&[]).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(options, CompileOptions::default());
    assert_eq!(options.emit, EmitKind::Programs);
    assert!(!options.parallel);
    assert!(positional.is_empty());
}

#[test]
fn flags_and_positionals_mix() {
    let (options, positional) = CompileOptions::from_args(&[
        "--emit=table",
        "rules.json",
        "--parallel",
        "--error-limit=5",
    ])
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        options,
        CompileOptions {
            parallel: true,
            emit: EmitKind::Table,
            error_limit: 5,
        }
    );
    assert_eq!(positional, vec!["rules.json".to_string()]);
}

#[test]
fn emit_kind_spellings() {
    for kind in [EmitKind::Programs, EmitKind::Table, EmitKind::Check] {
        assert_eq!(kind.as_str().parse::<EmitKind>(), Ok(kind));
        assert_eq!(kind.to_string(), kind.as_str());
    }
}

#[test]
fn bad_emit_value() {
    assert_eq!(
        CompileOptions::from_args(&["--emit=asm"]),
        Err(OptionError::InvalidValue {
            flag: "--emit",
            value: "asm".to_string(),
        })
    );
}

#[test]
fn bad_error_limit() {
    assert_eq!(
        CompileOptions::from_args(&["--error-limit=many"]),
        Err(OptionError::InvalidValue {
            flag: "--error-limit",
            value: "many".to_string(),
        })
    );
}

#[test]
fn unknown_flag() {
    let err = CompileOptions::from_args(&["--fast"]).err();
    assert_eq!(err, Some(OptionError::UnknownFlag("--fast".to_string())));
    assert_eq!(
        err.map(|e| e.to_string()),
        Some("unknown option '--fast'".to_string())
    );
}
