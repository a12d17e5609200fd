mod common;

use common::{compiling_runtime, runtime, stack_of, temp_dir};
use gershwin::runtime::{
    data_structures::value::{Keyword, Value},
    interpreter::{
        driver::{compile, load},
        Runtime,
    },
};
use std::fs;
use test_case::test_case;

/// Compile the source, then load the artifact into a fresh runtime.  Returns the runtime that
/// loaded the original source directly, the one that loaded the artifact and the artifact text.
fn compile_and_reload(name: &str, source: &str) -> (Runtime, Runtime, String) {
    let directory = temp_dir(name);
    let source_id = format!("demo/{}.gwn", name);

    let mut compiler = compiling_runtime(&directory);
    let artifact = compile(&mut compiler, &source_id, source).unwrap();

    assert_eq!(artifact, directory.join(format!("demo/{}.clj", name)));

    let text = fs::read_to_string(&artifact).unwrap();

    let mut reloaded = runtime();
    load(&mut reloaded, &artifact.to_string_lossy(), &text).unwrap();

    let mut direct = runtime();
    load(&mut direct, &source_id, source).unwrap();

    let _ = fs::remove_dir_all(&directory);

    (direct, reloaded, text)
}

/// Printed stack contents, quotations print the same whichever way they were created.
fn printed_stack(runtime: &Runtime) -> Vec<String> {
    stack_of(runtime).iter().map(Value::to_string).collect()
}

#[test_case("docstring", ": inc1 \"Add one.\" [ n -- n+1 ] 1 + ; 41 inc1"; "word with a docstring")]
#[test_case("meta", ": dec1 { :since 2 } [ n -- n-1 ] 1 - ; 43 dec1"; "word with a metadata map")]
#[test_case("nested", ": thrice [ -- ] < 1 < 2 > > call call ; thrice 3"; "quotation nested in a word")]
#[test_case("calls", ": sq [ n -- n*n ] dup * ; : quad [ n -- n^4 ] sq sq ; 2 quad"; "word calling a word")]
#[test_case(
    "comments",
    "! squares\n: sq [ n -- n*n ] dup * ;\n! and cubes\n: cube [ n -- n^3 ] dup sq * ;\n3 cube";
    "comments between definitions"
)]
#[test_case("quotation", "< 1 2 + > dup call"; "quotation left on the stack")]
#[test_case("host", "(ns demo.host) (def base 10) (+ base 5) [1 2] {:a 1}"; "host forms")]
fn artifacts_behave_like_the_source(name: &str, source: &str) {
    let (direct, reloaded, _) = compile_and_reload(name, source);

    assert_eq!(printed_stack(&reloaded), printed_stack(&direct));
}

#[test]
fn one_line_per_form() {
    let (_, _, text) = compile_and_reload("lines", ": sq [ n -- n*n ] dup * ;\n! comment\n3 sq");

    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(text.ends_with('\n'));
    assert_eq!(
        lines[0],
        "(do (def sq__GWN__ (quote {:stack-effect [n -- n*n], :word true}) \
         (fn [] (gershwin.core/invoke! gershwin.core/dup__GWN__) \
         (gershwin.core/invoke! gershwin.core/*__GWN__))) gershwin.core/stack-void)"
    );
    assert_eq!(lines[1], "(gershwin.core/conj-it! 3)");
    assert_eq!(lines[2], "(gershwin.core/invoke! user/sq__GWN__)");
}

#[test]
fn reloaded_words_keep_their_metadata() {
    let (direct, reloaded, _) =
        compile_and_reload("metadata", ": inc1 { :since 2 } [ n -- n+1 ] 1 + ;");

    for runtime in [&direct, &reloaded] {
        let var = runtime.environment().lookup("inc1__GWN__").unwrap();

        assert!(var.is_word());
        assert_eq!(var.meta().get(&Keyword::new("since")), Some(&Value::Int(2)));
        assert_eq!(var.meta().stack_effect().map(Value::to_string), Some("[n -- n+1]".to_string()));
    }
}

#[test]
fn compiled_words_can_be_used_after_reloading() {
    let (_, mut reloaded, _) = compile_and_reload("reuse", ": sq [ n -- n*n ] dup * ;");

    load(&mut reloaded, "<test>", "5 sq").unwrap();

    assert_eq!(stack_of(&reloaded), vec![Value::Int(25)]);
}
