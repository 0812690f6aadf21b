mod common;

use common::run_err;
use minel::{error_report, Interpreter, MinelError, DEFAULT_MAX_DEPTH};

#[test]
fn test_type_error_in_arithmetic() {
    let err = run_err("(+ 1 \"two\")");
    assert!(matches!(err.inner(), MinelError::Type { expected, .. } if expected == "number"));
    assert!(err.stack_trace().is_none());
}

#[test]
fn test_not_callable() {
    assert!(matches!(run_err("(5 1 2)").inner(), MinelError::NotCallable(_)));
    assert!(matches!(
        run_err("(\"str\")").inner(),
        MinelError::NotCallable(_)
    ));
}

#[test]
fn test_unbound_function_and_symbol() {
    assert!(matches!(
        run_err("(no-such-fn 1)").inner(),
        MinelError::UnboundFunction(name) if name == "no-such-fn"
    ));
    assert!(matches!(
        run_err("no-such-var").inner(),
        MinelError::UnboundSymbol(name) if name == "no-such-var"
    ));
}

#[test]
fn test_trace_lists_innermost_last() {
    let src = "(defun level-3 () (car 'oops))
               (defun level-2 () (level-3))
               (defun level-1 () (level-2))
               (level-1)";
    let err = run_err(src);
    assert_eq!(
        err.stack_trace().unwrap().names(),
        vec!["level-1", "level-2", "level-3"]
    );
    assert_eq!(
        error_report(&err),
        "Type error: expected list, got symbol (oops)\n  in level-1\n  in level-2\n  in level-3\n"
    );
}

#[test]
fn test_trace_excludes_returned_frames() {
    let src = "(defun helper () 1)
               (defun main () (helper) (undefined))
               (main)";
    assert_eq!(run_err(src).stack_trace().unwrap().names(), vec!["main"]);
}

#[test]
fn test_runaway_recursion_hits_depth_limit() {
    let interp = Interpreter::builder().with_max_depth(50).build();
    let err = interp
        .eval_str("(defun forever (n) (forever (+ n 1))) (forever 0)")
        .unwrap_err();
    assert!(matches!(err.inner(), MinelError::DepthExceeded(50)));
    let names = err.stack_trace().unwrap().names();
    assert!(!names.is_empty() && names.len() < 50);
    assert!(names.iter().all(|n| *n == "forever"));
}

#[test]
fn test_default_depth_limit_fires_before_stack_overflow() {
    let src = "(defun sum-to (n) (if (< n 1) 0 (+ n (sum-to (- n 1))))) (sum-to 250)";
    assert!(matches!(
        run_err(src).inner(),
        MinelError::DepthExceeded(limit) if *limit == DEFAULT_MAX_DEPTH
    ));
}

#[test]
fn test_deeply_nested_special_forms_hit_depth_limit() {
    let src = "(defun walk (n)
                 (let ((m (- n 1)))
                   (if (< m 0) 'done
                     (progn (and t (or nil (walk m)))))))
               (walk 1000)";
    assert!(matches!(
        run_err(src).inner(),
        MinelError::DepthExceeded(limit) if *limit == DEFAULT_MAX_DEPTH
    ));
}

#[test]
fn test_depth_limit_resets_between_forms() {
    let interp = Interpreter::new();
    let src = "(defun sum-to (n) (if (< n 1) 0 (+ n (sum-to (- n 1)))))
               (list (sum-to 60) (sum-to 60) (sum-to 60))";
    assert_eq!(interp.run_program(src).unwrap().to_string(), "(1830 1830 1830)");
}

#[test]
fn test_parse_error_position() {
    let err = run_err("(progn\n  \"never closed)");
    match err {
        MinelError::Parse { line, col, .. } => assert_eq!((line, col), (2, 3)),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_malformed_character_literal() {
    assert!(matches!(run_err("?ab"), MinelError::Parse { .. }));
}

#[test]
fn test_index_errors() {
    assert!(matches!(
        run_err("(aref (make-vector 2 nil) 5)").inner(),
        MinelError::Eval(_)
    ));
    assert!(matches!(
        run_err("(substring \"abc\" 1 9)").inner(),
        MinelError::Eval(_)
    ));
    assert!(matches!(
        run_err("(string-match \"\\\\(\" \"x\")").inner(),
        MinelError::Eval(_)
    ));
}

#[test]
fn test_interpreter_unusable_after_fatal_error() {
    let interp = Interpreter::new();
    interp.eval_str("(setq kept 1)").unwrap();
    assert!(interp.eval_str("(car 1)").is_err());
    assert!(interp.is_poisoned());
    for src in ["kept", "(+ 1 1)"] {
        assert!(matches!(
            interp.eval_str(src),
            Err(MinelError::Eval(msg)) if msg.contains("unusable")
        ));
    }
    assert!(interp.run_program("1").is_err());
}

#[test]
fn test_parse_error_also_poisons() {
    let interp = Interpreter::new();
    assert!(interp.eval_str("(unclosed").is_err());
    assert!(interp.eval_str("1").is_err());
}
