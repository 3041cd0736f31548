use std::time::Instant;
use std::{env, fs, process};

use tercet::bytecode::{self, Program, disasm};
use tercet::jit::JitProgram;
use tercet::scanner::Scanner;
use tercet::token::Token;
use tercet::vm::Vm;
use tercet::{interp, parse};

struct Options {
    expr: Option<String>,
    engine: Engine,
    tokens: bool,
    ast: bool,
    bc: bool,
    loops: Option<u64>,
    emit_bc: Option<String>,
    run_bc: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Engine {
    Tree,
    Vm,
    Jit,
    All,
}

fn main() {
    let opts = match parse_args(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(2);
        }
    };

    if let Some(path) = &opts.run_bc {
        run_bc_image(path, opts.loops);
        return;
    }

    let Some(source) = opts.expr.clone() else {
        print_usage();
        process::exit(2);
    };

    if opts.tokens {
        dump_tokens(&source);
        return;
    }

    let expr = match parse(&source) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("parse error: {}", e);
            process::exit(1);
        }
    };

    if opts.ast {
        println!("{}", expr);
        return;
    }

    let program = bytecode::compile(&expr);

    if opts.bc {
        disasm::print_bc(&program);
        return;
    }

    if let Some(path) = &opts.emit_bc {
        let bytes = match program.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("failed to encode bytecode image: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(path, bytes) {
            eprintln!("failed to write '{}': {}", path, e);
            process::exit(1);
        }
        return;
    }

    match opts.loops {
        Some(loops) => time_engines(&opts, &expr, &program, loops),
        None => run_once(&opts, &expr, &program),
    }
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options {
        expr: None,
        engine: Engine::All,
        tokens: false,
        ast: false,
        bc: false,
        loops: None,
        emit_bc: None,
        run_bc: None,
    };

    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => opts.tokens = true,
            "--ast" => opts.ast = true,
            "--bc" | "--bytecode" => opts.bc = true,
            "--engine" => {
                let v = args.next().ok_or("--engine needs a value")?;
                opts.engine = match v.as_str() {
                    "tree" => Engine::Tree,
                    "vm" => Engine::Vm,
                    "jit" => Engine::Jit,
                    "all" => Engine::All,
                    other => return Err(format!("unknown engine '{}'", other)),
                };
            }
            "--loops" => {
                let v = args.next().ok_or("--loops needs a value")?;
                opts.loops = Some(v.parse().map_err(|_| format!("bad loop count '{}'", v))?);
            }
            "--emit-bc" => opts.emit_bc = Some(args.next().ok_or("--emit-bc needs a path")?),
            "--run-bc" => opts.run_bc = Some(args.next().ok_or("--run-bc needs a path")?),
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            flag if flag.starts_with('-') => return Err(format!("unknown flag '{}'", flag)),
            _ => {
                if opts.expr.is_some() {
                    return Err("more than one expression given".to_string());
                }
                opts.expr = Some(arg);
            }
        }
    }
    Ok(opts)
}

fn print_usage() {
    println!("tercet - one arithmetic expression, three engines");
    println!();
    println!("Usage:");
    println!("  tercet \"<expr>\"                 Evaluate with all engines, cross-check");
    println!("  tercet --engine tree|vm|jit      Pick a single engine");
    println!("  tercet --loops N \"<expr>\"        Time each engine over N runs");
    println!("  tercet --tokens \"<expr>\"         Show the token stream");
    println!("  tercet --ast \"<expr>\"            Show the parse tree");
    println!("  tercet --bc \"<expr>\"             Show the bytecode disassembly");
    println!("  tercet --emit-bc FILE \"<expr>\"   Write a bytecode image");
    println!("  tercet --run-bc FILE             Run a bytecode image on the VM");
}

fn dump_tokens(source: &str) {
    let mut scanner = Scanner::new(source);
    loop {
        match scanner.next() {
            Ok(t) => {
                if t.token == Token::End {
                    break;
                }
                let kind = match t.token {
                    Token::Int(_) => "int",
                    Token::Op(_) => "op ",
                    Token::End => unreachable!(),
                };
                println!("{:>4}..{:<4} {} {}", t.span.start, t.span.end, kind, t.token);
            }
            Err(e) => {
                eprintln!("scan error: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_bc_image(path: &str, loops: Option<u64>) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("failed to read '{}': {}", path, e);
            process::exit(1);
        }
    };
    let program = match Program::from_bytes(&bytes) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    let mut vm = Vm::new();
    match loops {
        None => match vm.run(&program) {
            Ok(result) => println!("{}", result),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        Some(loops) => time_one("stack-based virtual machine", loops, || {
            vm.run(&program).map_err(|e| e.to_string())
        }),
    }
}

fn run_once(opts: &Options, expr: &tercet::ast::Expr, program: &Program) {
    let mut results: Vec<(&str, i64)> = Vec::new();

    if matches!(opts.engine, Engine::Tree | Engine::All) {
        match interp::eval(expr) {
            Ok(v) => results.push(("tree", v)),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
    if matches!(opts.engine, Engine::Vm | Engine::All) {
        match Vm::new().run(program) {
            Ok(v) => results.push(("vm", v)),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
    if matches!(opts.engine, Engine::Jit | Engine::All) {
        // The JIT path does not guard division by zero; the interpreted
        // engines above have already rejected those expressions when the
        // default all-engines mode is in use.
        match JitProgram::compile(expr) {
            Ok(jit) => results.push(("jit", jit.run())),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }

    let (_, first) = results[0];
    for (name, value) in &results[1..] {
        if *value != first {
            eprintln!("engine disagreement: {} produced {}, expected {}", name, value, first);
            process::exit(1);
        }
    }
    println!("{}", first);
}

fn time_engines(opts: &Options, expr: &tercet::ast::Expr, program: &Program, loops: u64) {
    if matches!(opts.engine, Engine::Tree | Engine::All) {
        time_one("tree-walking interpreter", loops, || {
            interp::eval(expr).map_err(|e| e.to_string())
        });
    }
    if matches!(opts.engine, Engine::Vm | Engine::All) {
        let mut vm = Vm::new();
        time_one("stack-based virtual machine", loops, || {
            vm.run(program).map_err(|e| e.to_string())
        });
    }
    if matches!(opts.engine, Engine::Jit | Engine::All) {
        match JitProgram::compile(expr) {
            Ok(jit) => {
                time_one("jit compiler", loops, || Ok::<i64, String>(jit.run()));
            }
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
}

fn time_one<F>(name: &str, loops: u64, mut run: F)
where
    F: FnMut() -> Result<i64, String>,
{
    println!("{} (loop={})", name, loops);
    let start = Instant::now();
    let mut last = 0;
    for _ in 0..loops {
        match run() {
            Ok(v) => last = v,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
    let elapsed = start.elapsed();
    println!("{:.6} sec (result {})", elapsed.as_secs_f64(), last);
}
