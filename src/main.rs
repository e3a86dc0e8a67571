#![doc = include_str!("../README.md")]

use wgsl_intrinsics::error::AriadneReport as _;
use wgsl_intrinsics::table::{self, BinaryOp, Table, UnaryOp};
use wgsl_intrinsics::ty::Stage;
use wgsl_intrinsics::{error, parse, resolve, run};

use anyhow::{bail, Context, Result};
use argh::FromArgs;

use std::{fs, io, path, process};

#[derive(FromArgs)]
/// Resolve calls to WGSL builtin functions, operators, and type constructors.
struct Args {
    /// print every overload of the builtin function, type, or operator NAME
    #[argh(option)]
    list: Option<String>,

    /// evaluate calls without a `const` or `runtime` prefix at runtime
    #[argh(switch)]
    runtime: bool,

    /// call scripts to run
    #[argh(positional)]
    scripts: Vec<path::PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();
    let mut cache = error::Cache::default();

    let definitions_id = cache.insert_definitions();
    let table = match Table::load(definitions_id) {
        Ok(table) => table,
        Err(def_error) => {
            def_error.write(io::stderr(), &mut cache)?;
            process::exit(1);
        }
    };
    log::info!(
        "loaded {} overloads: {} builtin functions, {} types, {} constraints",
        table.num_overloads(),
        table.builtins().count(),
        table.ctor_convs().count(),
        table.constraints.len()
    );

    if let Some(ref name) = args.list {
        list(&table, name)?;
    }

    let stage = if args.runtime {
        Stage::Runtime
    } else {
        Stage::Constant
    };
    let mut runner = run::Runner::new(&table, stage);
    let mut failed = false;
    for path in &args.scripts {
        let script = fs::read_to_string(path)
            .with_context(|| format!("error reading script from {}", path.display()))?;
        let source_id = cache.insert(path.clone(), &script);

        let program = match parse::parse(&script, source_id) {
            Ok(program) => program,
            Err(parse_error) => {
                parse_error.write(io::stderr(), &mut cache)?;
                failed = true;
                continue;
            }
        };

        match runner.run(&program) {
            Ok(transcript) => {
                print!("{}", transcript.text);
                log::info!(
                    "{}: {} calls resolved, {} failed",
                    path.display(),
                    transcript.resolved,
                    transcript.failed
                );
                failed |= transcript.failed > 0;
            }
            Err(run_error) => {
                run_error.write(io::stderr(), &mut cache)?;
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
    Ok(())
}

/// Print every overload of `name`, one per line, as diagnostics list them.
///
/// Operators can be given by symbol, with or without the `operator` prefix.
fn list(table: &Table, name: &str) -> Result<()> {
    let mut lines = vec![];
    if let Some(builtin) = table.builtin(name) {
        for info in table.builtin_overloads(builtin) {
            lines.push(resolve::print_overload(name, info, table));
        }
    } else if let Some(ctor_conv) = table.ctor_conv(name) {
        for info in table.ctor_conv_overloads(ctor_conv) {
            lines.push(resolve::print_overload(name, info, table));
        }
    } else {
        let symbol = name.strip_prefix("operator").unwrap_or(name).trim();
        if let Some(op) = UnaryOp::from_symbol(symbol) {
            let op_name = table::unary_name(op);
            for info in table.unary_overloads(op) {
                lines.push(resolve::print_overload(&op_name, info, table));
            }
        }
        if let Some(op) = BinaryOp::from_symbol(symbol) {
            let op_name = table::binary_name(op, false);
            for info in table.binary_overloads(op) {
                lines.push(resolve::print_overload(&op_name, info, table));
            }
        }
    }

    if lines.is_empty() {
        bail!("no builtin function, type, or operator named `{}`", name);
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
