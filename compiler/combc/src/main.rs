//! Combine-rule compiler CLI.

use std::path::Path;

use combc::{init_tracing, CompileOptions, Declarations, EmitKind, Registry};
use combc_diagnostic::ErrorCode;
use combc_ir::DisplayWith;

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("combc {}", env!("CARGO_PKG_VERSION"));
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: combc --explain <ERROR_CODE>");
                eprintln!("Example: combc --explain E2001");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        _ => compile_file(&args[1..]),
    }
}

fn compile_file(args: &[String]) {
    let (options, positional) = match CompileOptions::from_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };
    let [path] = positional.as_slice() else {
        eprintln!("error: expected exactly one declaration file");
        eprintln!("Usage: combc <decls.json> [--emit=programs|table|check] [--parallel]");
        std::process::exit(1);
    };

    let decls = match Declarations::load(Path::new(path)) {
        Ok(decls) => decls,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut registry = Registry::with_generic_opcodes();
    registry.register(decls);
    let report = registry.compile(&options);

    for diag in report.diagnostics.iter() {
        eprintln!("{diag}");
        eprintln!();
    }
    if report.diagnostics.suppressed_count() > 0 {
        eprintln!(
            "note: {} further errors suppressed by --error-limit",
            report.diagnostics.suppressed_count()
        );
    }

    let interner = registry.interner();
    match options.emit {
        EmitKind::Programs => {
            for program in &report.programs {
                print!("{}", program.display(interner));
            }
        }
        EmitKind::Table => print!("{}", report.table().display(interner)),
        EmitKind::Check => {}
    }

    if report.has_errors().is_some() {
        eprintln!(
            "error: {} rules and {} fragments failed",
            report.failed_rules.len(),
            report.failed_fragments.len()
        );
        std::process::exit(1);
    }
    if options.emit == EmitKind::Check {
        println!(
            "OK: {path} ({} rules, {} branches)",
            report.programs.len(),
            report.branch_count()
        );
    }
}

fn explain_error(code_str: &str) {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format EXXXX where X is a digit, or an error kind name.");
        eprintln!("Examples: E2001, TypeConflict");
        std::process::exit(1);
    };

    let phase = if code.is_ingestion_error() {
        "declaration ingestion"
    } else if code.is_operand_error() {
        "operand resolution"
    } else if code.is_fragment_error() {
        "fragment validation"
    } else if code.is_rule_error() {
        "rule emission"
    } else {
        "internal compiler error"
    };
    println!("{code}: {} ({phase})", code.kind());
}

fn print_usage() {
    println!("Combine-rule compiler");
    println!();
    println!("Usage: combc <decls.json> [options]");
    println!("       combc --explain <code>");
    println!();
    println!("Options:");
    println!("  --emit=<kind>        Output: programs (default), table, check");
    println!("  --parallel, -j       Compile rules in parallel");
    println!("  --error-limit=<n>    Stop reporting after n errors (0 = unlimited)");
    println!();
    println!("Logging is controlled by RUST_LOG, e.g. RUST_LOG=combc=debug.");
    println!();
    println!("Examples:");
    println!("  combc rules.json");
    println!("  combc rules.json --emit=table");
    println!("  combc rules.json --emit=check --parallel");
    println!("  combc --explain E4001             # Explain a missing root rewrite");
}
