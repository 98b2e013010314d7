//! Integration tests over the concrete scenarios and universal invariants
//! this evaluator is expected to satisfy end to end, exercised through the
//! public `evaluate` entry point rather than any interpreter-internal API.

use warden::{evaluate, memory, Environment, Value};

fn run(source: &str) -> Result<Value, warden::EvalError> {
    let globals = Environment::root();
    let result = pollster::block_on(evaluate(&globals, source));
    globals.release();
    result
}

#[test]
fn block_scoped_let_does_not_leak_outward() {
    let result = run("let x = 0; { let x = 1; } x").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 0.0));
}

#[test]
fn recursive_function_call() {
    let result = run("function f(n){ if(n<=1) return 1; return n*f(n-1); } f(5)").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 120.0));
}

#[test]
fn closures_capture_their_own_mutable_state() {
    let result = run("function make(){ let c=0; return function(){ return ++c; }; } let g=make(); g(); g(); g()").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 3.0));
}

#[test]
fn object_destructuring_with_rest() {
    let result = run("const {a, b, ...r} = {a:1,b:2,c:3,d:4}; [a,b,r]").expect("should evaluate");
    let Value::Array(items) = result else { panic!("expected an array") };
    let items = items.borrow();
    assert!(matches!(items[0], Value::Number(n) if n == 1.0));
    assert!(matches!(items[1], Value::Number(n) if n == 2.0));
    assert_eq!(items[2].to_display_string(), "[object Object]");
    let Value::Object(rest) = &items[2] else { panic!("expected rest to be an object") };
    let rest = rest.borrow();
    assert!(matches!(rest.get("c"), Some(Value::Number(n)) if *n == 3.0));
    assert!(matches!(rest.get("d"), Some(Value::Number(n)) if *n == 4.0));
    assert!(rest.get("a").is_none());
}

#[test]
fn continue_skips_the_rest_of_one_iteration() {
    let result = run("let s=0; for(let i=1;i<=5;i++){ if(i===3) continue; s+=i; } s").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 12.0));
}

#[test]
fn super_method_call_resolves_to_the_explicit_superclass() {
    let result = run("class A { m(){ return 1; } } class B extends A { m(){ return super.m()+1; } } new B().m()").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 2.0));
}

#[test]
fn awaiting_an_async_function_yields_its_return_value() {
    let result = run("async function g(){ return 42; } await g()").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 42.0));
}

#[test]
fn switch_uses_strict_equality_and_true_fallthrough() {
    let result = run(
        "function classify(x){ \
            switch(x){ \
                case 1: case 2: case 3: return 'hit'; \
                default: return 'miss'; \
            } \
         } \
         [classify(2), classify('2'), classify(9)]",
    )
    .expect("should evaluate");
    let Value::Array(items) = result else { panic!("expected an array") };
    let items = items.borrow();
    assert_eq!(items[0].to_display_string(), "hit");
    assert_eq!(items[1].to_display_string(), "miss");
    assert_eq!(items[2].to_display_string(), "miss");
}

#[test]
fn reading_an_unbound_identifier_is_a_reference_error() {
    let err = run("undefinedName").expect_err("should fault");
    assert_eq!(err.code(), "E_REFERENCE");
    assert_eq!(err.span.line, 1);
    assert_eq!(err.span.column, 1);
}

#[test]
fn spreading_a_non_array_is_a_type_error() {
    let err = run("[...42]").expect_err("should fault");
    assert_eq!(err.code(), "E_TYPE");
}

#[test]
fn getter_and_setter_intercept_plain_property_access() {
    let result = run(
        "class C { \
            constructor(){ this._x = 5; } \
            get double(){ return this._x*2; } \
            set double(v){ this._x = v/2; } \
         } \
         let c = new C(); c.double = 10; c.double",
    )
    .expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 10.0));
}

#[test]
fn a_thrown_error_inside_an_async_function_does_not_surface_until_awaited() {
    let result = run("async function f(){ throw 'boom'; } let p = f(); 1").expect("call site should not throw");
    assert!(matches!(result, Value::Number(n) if n == 1.0));

    let err = run("async function f(){ throw 'boom'; } await f()").expect_err("awaiting should surface the rejection");
    assert_eq!(err.code(), "E_THROWN");
}

#[test]
fn every_environment_and_function_created_during_a_run_is_torn_down() {
    let before_envs = memory::live_environment_count();
    let before_fns = memory::live_function_count();
    // `g` is scoped to the block, so nothing outlives it once the block
    // exits; a `g` bound at top level would still be reachable through
    // `globals` itself at the point this function calls `run`, which is a
    // real, still-live reference rather than a leak.
    run("{ function make(){ let c=0; return function(){ return ++c; }; } let g=make(); g(); g(); g(); }").expect("should evaluate");
    assert_eq!(memory::live_environment_count(), before_envs);
    assert_eq!(memory::live_function_count(), before_fns);
}
