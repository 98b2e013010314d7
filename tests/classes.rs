//! Class-model integration tests: constructor chaining across more than one
//! level of inheritance, static members, and field initializer ordering.

use warden::{evaluate, Environment, Value};

fn run(source: &str) -> Result<Value, warden::EvalError> {
    let globals = Environment::root();
    let result = pollster::block_on(evaluate(&globals, source));
    globals.release();
    result
}

#[test]
fn implicit_constructor_chain_forwards_args_through_every_ancestor() {
    // None of A/B/C declare a constructor: `new C(5)` must implicitly chain
    // all the way up to A, running every class's own field initializers
    // exactly once, in ancestor-to-descendant order.
    let result = run(
        "class A { } \
         class B extends A { } \
         class C extends B { } \
         class D extends C { constructor(n){ super(n); this.seen = n; } } \
         new D(5).seen",
    )
    .expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 5.0));
}

#[test]
fn field_initializers_run_once_per_instance_after_their_own_super_call() {
    let result = run(
        "class A { constructor(){ this.log = ''; } } \
         class B extends A { x = 1; constructor(){ super(); this.log += 'B'; } } \
         class C extends B { y = 2; constructor(){ super(); this.log += 'C'; } } \
         let c = new C(); \
         [c.x, c.y, c.log]",
    )
    .expect("should evaluate");
    let Value::Array(items) = result else { panic!("expected an array") };
    let items = items.borrow();
    assert!(matches!(items[0], Value::Number(n) if n == 1.0));
    assert!(matches!(items[1], Value::Number(n) if n == 2.0));
    assert_eq!(items[2].to_display_string(), "BC");
}

#[test]
fn a_base_class_with_its_own_constructor_still_runs_its_field_inits() {
    // `C` has no superclass, so its constructor can never call `super()`;
    // its field inits must run before the constructor body anyway.
    let result = run("class C { x = 5; constructor(){ this.y = this.x; } } new C().y").expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 5.0));
}

#[test]
fn static_members_are_not_visible_on_instances() {
    let result = run(
        "class Counter { static total = 0; static bump(){ Counter.total += 1; return Counter.total; } } \
         Counter.bump(); Counter.bump(); Counter.total",
    )
    .expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 2.0));
}

#[test]
fn deep_super_call_resolves_to_the_immediate_parent_not_the_root() {
    let result = run(
        "class A { m(){ return 'A'; } } \
         class B extends A { m(){ return super.m() + 'B'; } } \
         class C extends B { m(){ return super.m() + 'C'; } } \
         new C().m()",
    )
    .expect("should evaluate");
    assert_eq!(result.to_display_string(), "ABC");
}

#[test]
fn instance_fields_close_over_the_class_defining_scope() {
    let result = run(
        "let base = 10; \
         class WithBase { total = base + 1; } \
         new WithBase().total",
    )
    .expect("should evaluate");
    assert!(matches!(result, Value::Number(n) if n == 11.0));
}
