mod common;

use common::machine::Machine;
use plforge::compiler::Codegen;
use plforge::scanner::Scanner;

/// Full pipeline: scan, translate, serialize. The machine re-parses the
/// text listing, so these tests cover the output format as well.
fn compile(source: &str) -> String {
    let tokens = Scanner::new(source).tokenize().expect("scan should succeed");
    let code = Codegen::new(tokens)
        .translate()
        .expect("translation should succeed");
    let mut out = Vec::new();
    code.serialize(&mut out).expect("serialize should succeed");
    String::from_utf8(out).expect("listing should be utf8")
}

fn run(source: &str) -> Vec<i64> {
    Machine::load(&compile(source)).run()
}

fn run_with_input(source: &str, input: &[i64]) -> Vec<i64> {
    Machine::load(&compile(source)).with_input(input).run()
}

#[test]
fn worked_example_prints_six() {
    let listing = compile("const m = 5; var x; begin x := m + 1; write x end.");
    assert_eq!(
        listing.lines().next(),
        Some("6 0 0 5"),
        "frame reservation covers the header and one local"
    );
    assert_eq!(Machine::load(&listing).run(), vec![6]);
}

#[test]
fn factorial_loop_computes_120() {
    let output = run(
        "const limit = 5; \
         var n, f; \
         begin \
           n := limit; \
           f := 1; \
           while n > 1 do \
           begin \
             f := f * n; \
             n := n - 1 \
           end; \
           write f \
         end.",
    );
    assert_eq!(output, vec![120]);
}

#[test]
fn nested_procedure_mutates_the_outer_variable() {
    let output = run(
        "var x; \
         procedure bump; \
           x := x + 1; \
         begin \
           x := 0; \
           call bump; \
           call bump; \
           write x \
         end.",
    );
    assert_eq!(output, vec![2]);
}

#[test]
fn shadowed_variable_leaves_the_outer_one_alone() {
    let output = run(
        "var x; \
         procedure p; \
           var x; \
           begin x := 9; write x end; \
         begin \
           x := 1; \
           call p; \
           write x \
         end.",
    );
    assert_eq!(output, vec![9, 1]);
}

#[test]
fn recursive_countdown_prints_descending() {
    let output = run(
        "var n; \
         procedure down; \
           if n > 0 then \
           begin \
             write n; \
             n := n - 1; \
             call down \
           end; \
         begin \
           n := 3; \
           call down \
         end.",
    );
    assert_eq!(output, vec![3, 2, 1]);
}

#[test]
fn read_feeds_the_program_from_the_console() {
    let output = run_with_input(
        "var x; begin read x; x := x + 1; write x end.",
        &[41],
    );
    assert_eq!(output, vec![42]);
}

#[test]
fn odd_condition_selects_the_then_branch() {
    let output = run(
        "var x; \
         begin \
           x := 3; \
           if odd x then write x else x := 0; \
           x := x - 3; \
           write x \
         end.",
    );
    assert_eq!(output, vec![3, 0]);
}

#[test]
fn even_value_takes_the_else_branch() {
    let output = run("var x; begin x := 4; if odd x then write x else x := 0; write x end.");
    assert_eq!(output, vec![0]);
}

#[test]
fn negation_and_division_evaluate_left_to_right() {
    let output = run("var x; begin x := -(7 / 2); write x end.");
    assert_eq!(output, vec![-3]);
}

#[test]
fn constants_reach_the_console_without_a_frame_slot() {
    let output = run("const answer = 42; begin write answer end.");
    assert_eq!(output, vec![42]);
}
