use tercet::bytecode::{self, Program};
use tercet::interp;
use tercet::jit::JitProgram;
use tercet::parse;
use tercet::runtime_error::RuntimeError;
use tercet::vm::Vm;

/// Evaluates through all three engines and asserts they agree on the
/// expected value. Every case here is division-safe, so the JIT path is
/// fine to execute unguarded.
fn assert_engines_agree(source: &str, expected: i64) {
    let expr = parse(source).unwrap_or_else(|e| panic!("parse of {:?} failed: {}", source, e));

    let tree = interp::eval(&expr)
        .unwrap_or_else(|e| panic!("tree eval of {:?} failed: {}", source, e));
    assert_eq!(tree, expected, "tree engine on {:?}", source);

    let program = bytecode::compile(&expr);
    let vm = Vm::new()
        .run(&program)
        .unwrap_or_else(|e| panic!("vm run of {:?} failed: {}", source, e));
    assert_eq!(vm, expected, "vm engine on {:?}", source);

    let jit = JitProgram::compile(&expr)
        .unwrap_or_else(|e| panic!("jit compile of {:?} failed: {}", source, e));
    assert_eq!(jit.run(), expected, "jit engine on {:?}", source);
}

#[test]
fn single_literal() {
    assert_engines_agree("0", 0);
    assert_engines_agree("42", 42);
}

#[test]
fn precedence() {
    assert_engines_agree("2+3*4", 14);
    assert_engines_agree("(2+3)*4", 20);
}

#[test]
fn left_associativity() {
    assert_engines_agree("8-3-2", 3);
    assert_engines_agree("20/4/5", 1);
}

#[test]
fn truncation_toward_zero() {
    assert_engines_agree("7/2", 3);
    assert_engines_agree("7%2", 1);
    assert_engines_agree("(0-7)/2", -3);
    assert_engines_agree("(0-7)%2", -1);
}

#[test]
fn reference_expression() {
    // 1+2-3*4+(5-6)-(7+8)%9 = 3 - 12 - 1 - 6 = -16
    assert_engines_agree("1+2-3*4+(5-6)-(7+8)%9", -16);
}

#[test]
fn whitespace_is_insignificant() {
    assert_engines_agree("  1 +\t2   * 3 ", 7);
}

#[test]
fn nested_parentheses() {
    assert_engines_agree("((((5))))", 5);
    assert_engines_agree("2*(3+(4-(5%3)))", 10);
}

#[test]
fn mixed_precedence_chains() {
    assert_engines_agree("1+2*3-4/2%3", 5);
    assert_engines_agree("100/10/2*3", 15);
}

#[test]
fn values_beyond_i32() {
    assert_engines_agree("2147483647+1", 2147483648);
    assert_engines_agree("4294967296*3-1", 12884901887);
}

#[test]
fn compiled_artifacts_are_reusable() {
    let expr = parse("1+2-3*4+(5-6)-(7+8)%9").unwrap();
    let program = bytecode::compile(&expr);
    let jit = JitProgram::compile(&expr).unwrap();
    let mut vm = Vm::new();

    for _ in 0..100 {
        assert_eq!(interp::eval(&expr), Ok(-16));
        assert_eq!(vm.run(&program), Ok(-16));
        assert!(vm.stack().is_empty());
        assert_eq!(jit.run(), -16);
    }
}

#[test]
fn division_by_zero_is_reported() {
    for source in ["1/0", "1%0", "3/(2-2)", "(4+4)%(1-1)"] {
        let expr = parse(source).unwrap();
        assert_eq!(interp::eval(&expr), Err(RuntimeError::DivisionByZero));
        assert_eq!(
            Vm::new().run(&bytecode::compile(&expr)),
            Err(RuntimeError::DivisionByZero)
        );
    }
}

#[test]
fn malformed_input_is_a_parse_error() {
    for source in ["(1+2", "1+", "1)", "1 $ 2", "", "+", "1++2", "()"] {
        assert!(parse(source).is_err(), "expected parse error for {:?}", source);
    }
}

#[test]
fn bytecode_image_survives_the_disk_round_trip() {
    let program = bytecode::compile(&parse("1+2-3*4+(5-6)-(7+8)%9").unwrap());
    let bytes = program.to_bytes().unwrap();
    let loaded = Program::from_bytes(&bytes).unwrap();
    assert_eq!(Vm::new().run(&loaded), Ok(-16));
}

#[test]
fn corrupted_image_is_rejected() {
    let program = bytecode::compile(&parse("6*7").unwrap());
    let mut bytes = program.to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(Program::from_bytes(&bytes).is_err());
}

#[test]
fn randomized_agreement() {
    // A small deterministic generator; no division to keep the JIT path safe.
    let mut state = 0x2545f4914f6cdd1du64;
    let mut next = move |bound: u64| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state % bound
    };

    for _ in 0..50 {
        let mut source = next(100).to_string();
        for _ in 0..next(8) + 1 {
            let op = ['+', '-', '*'][next(3) as usize];
            source.push(op);
            source.push_str(&next(100).to_string());
        }

        let expr = parse(&source).unwrap();
        let expected = interp::eval(&expr).unwrap();
        assert_eq!(
            Vm::new().run(&bytecode::compile(&expr)),
            Ok(expected),
            "vm disagrees on {:?}",
            source
        );
        assert_eq!(
            JitProgram::compile(&expr).unwrap().run(),
            expected,
            "jit disagrees on {:?}",
            source
        );
    }
}
