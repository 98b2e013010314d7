/*
 * ==========================================================================
 * WARDEN - sandboxed scripting language evaluator
 * ==========================================================================
 *
 * Author:   Sam Wilcox
 * Email:    sam@pawx-lang.com
 * Website:  https://www.pawx-lang.com
 * Github:   https://github.com/samwilcox/pawx
 *
 * License:
 * This file is part of the Warden project.
 *
 * Warden is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

//! Lexical environments with explicit, manually counted teardown.
//!
//! A plain `Rc<RefCell<..>>` chain cannot tear itself down when a function
//! captures the very environment it was declared in (`let f; f = function()
//! { return f; };` style self-reference): the environment holds the
//! function, and the function holds the environment, so the pair's Rc
//! strong count never reaches zero on its own.
//!
//! `Environment` breaks that cycle by tracking a *logical* reference count
//! separate from `Rc`'s strong count. Every scope that structurally owns an
//! environment (the call frame that created it, and every closure that
//! escapes with it) holds exactly one logical reference via
//! [`Environment::add_ref`] and gives it back via [`Environment::release`].
//! When the count reaches zero, the environment's own value table is cleared
//! *before* the parent link is released, dropping whatever it still held.
//!
//! `add_ref`/`release` alone can't resolve a function or class that ends up
//! stored in one of its own ancestor scopes — the direct case is a value
//! stored straight back into the environment it captured
//! (`function f(){ return f; }`), but the same shape shows up one or more
//! scopes removed: a function `g` defined inside `f`'s call frame and
//! *returned*, then bound in `f`'s own enclosing scope, pins that scope
//! through `f`'s call frame forever, since giving the pin back depends on the
//! call frame tearing down, which depends on `g` dropping, which depends on
//! the enclosing scope clearing its table, which depends on the very pin
//! that's stuck. `define`/`assign` break this at the moment such a value is
//! stored, by walking the value's captured environment up to (and including)
//! any ancestor hop and pre-paying the release that hop would otherwise owe
//! that ancestor (see `break_capture_cycle`). A `skip_parent_release` flag on
//! the hop records that its debt to that ancestor has already been settled,
//! so the hop's own eventual teardown doesn't pay it twice.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::memory;
use crate::value::Value;

struct EnvData {
    parent: Option<Environment>,
    values: RefCell<IndexMap<String, Value>>,
    logical_refs: Cell<usize>,
    /// Set once this environment's pin on `parent` has been pre-released by
    /// `break_capture_cycle` on some descendant's behalf, so `release`'s own
    /// teardown doesn't release `parent` a second time for the same pin.
    skip_parent_release: Cell<bool>,
}

/// A handle to a lexical scope. Cloning an `Environment` is cheap (an `Rc`
/// clone) and does **not** by itself add a logical reference — call
/// [`Environment::add_ref`] explicitly when a clone is going to outlive the
/// scope that produced it (a closure capture, most commonly).
#[derive(Clone)]
pub struct Environment(Rc<EnvData>);

impl Environment {
    /// Creates a new scope chained to `parent`. The returned handle carries
    /// one logical reference, owned by whoever called `new` (typically the
    /// statement executor that pushes this scope for the duration of a
    /// block, function call, or loop iteration).
    pub fn new(parent: Option<Environment>) -> Self {
        if let Some(p) = &parent {
            p.add_ref();
        }
        memory::environment_created();
        Environment(Rc::new(EnvData {
            parent,
            values: RefCell::new(IndexMap::new()),
            logical_refs: Cell::new(1),
            skip_parent_release: Cell::new(false),
        }))
    }

    pub fn root() -> Self {
        Self::new(None)
    }

    pub fn add_ref(&self) {
        self.0.logical_refs.set(self.0.logical_refs.get() + 1);
    }

    /// Gives back one logical reference. Once the count reaches zero the
    /// environment's own bindings are dropped and the parent is released in
    /// turn, propagating teardown up the lexical chain.
    pub fn release(&self) {
        let current = self.0.logical_refs.get();
        if current == 0 {
            return;
        }
        let remaining = current - 1;
        self.0.logical_refs.set(remaining);
        if remaining == 0 {
            self.0.values.borrow_mut().clear();
            if let Some(parent) = &self.0.parent {
                if !self.0.skip_parent_release.get() {
                    parent.release();
                }
            }
            memory::environment_destroyed();
        }
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.break_capture_cycle(&value);
        self.0.values.borrow_mut().insert(name.into(), value);
    }

    /// A function or class value that is about to be stored into `self` may
    /// pin `self` alive through its own captured environment, directly or
    /// through a chain of intervening call frames. Walks from the value's
    /// captured environment up to `self` and, if found, settles the pin the
    /// nearest intervening hop holds on `self` right now rather than letting
    /// it wait on a teardown that can never happen on its own.
    ///
    /// Depth zero — the value was captured by `self` itself
    /// (`function f(){ return f; }`) — waives the value's own reference, the
    /// same as before. Depth one or more — the value was captured by some
    /// descendant of `self` that is now being bound back into `self`, or into
    /// one of its own ancestors — pre-pays the release that descendant's
    /// nearest ancestor-of-`self` hop owes `self`, guarded by
    /// `skip_parent_release` so a second value routed through the same hop
    /// (or the hop's own later teardown) doesn't pay it twice.
    fn break_capture_cycle(&self, value: &Value) {
        let captured_env = match value {
            Value::Function(f) if f.owns_capture_ref.get() => &f.captured_env,
            Value::Class(c) if c.owns_capture_ref.get() => &c.defining_env,
            _ => return,
        };

        if captured_env.ptr_eq(self) {
            match value {
                Value::Function(f) => f.owns_capture_ref.set(false),
                Value::Class(c) => c.owns_capture_ref.set(false),
                _ => unreachable!(),
            }
            self.release();
            return;
        }

        let mut hop = captured_env.clone();
        while let Some(parent) = hop.parent() {
            if parent.ptr_eq(self) {
                if !hop.0.skip_parent_release.get() {
                    hop.0.skip_parent_release.set(true);
                    self.release();
                }
                return;
            }
            hop = parent;
        }
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.values.borrow().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.0.values.borrow().get(name) {
            return Some(v.clone());
        }
        match &self.0.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    /// Walks up to the nearest binding of `name` and overwrites it in place.
    /// Returns `false` if no enclosing scope declares `name`.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if self.0.values.borrow().contains_key(name) {
            self.break_capture_cycle(&value);
            self.0.values.borrow_mut().insert(name.to_string(), value);
            return true;
        }
        match &self.0.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.parent.clone()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::root();
        parent.define("x", Value::Number(1.0));
        let child = Environment::new(Some(parent.clone()));
        assert!(matches!(child.get("x"), Some(Value::Number(n)) if n == 1.0));
        child.release();
        parent.release();
    }

    #[test]
    fn assign_walks_up_the_chain() {
        let parent = Environment::root();
        parent.define("x", Value::Number(1.0));
        let child = Environment::new(Some(parent.clone()));
        assert!(child.assign("x", Value::Number(2.0)));
        assert!(matches!(parent.get("x"), Some(Value::Number(n)) if n == 2.0));
        child.release();
        parent.release();
    }

    #[test]
    fn release_tears_down_once_refs_reach_zero() {
        let before = memory::live_environment_count();
        let env = Environment::root();
        assert_eq!(memory::live_environment_count(), before + 1);
        env.release();
        assert_eq!(memory::live_environment_count(), before);
    }

    #[test]
    fn a_function_stored_back_into_the_environment_it_captured_still_tears_down() {
        use crate::ast::FunctionNode;
        use crate::function::FunctionObject;
        use crate::span::Span;

        let before_envs = memory::live_environment_count();
        let before_fns = memory::live_function_count();

        let env = Environment::root();
        let node = FunctionNode {
            name: Some("f".to_string()),
            params: vec![],
            body: vec![],
            is_async: false,
            is_arrow: false,
            span: Span::none(),
        };
        let f = FunctionObject::new(&node, env.clone(), None);
        env.define("f", Value::Function(f));

        env.release();
        assert_eq!(memory::live_environment_count(), before_envs);
        assert_eq!(memory::live_function_count(), before_fns);
    }

    #[test]
    fn a_closure_returned_from_a_call_frame_and_bound_in_an_ancestor_still_tears_down() {
        use crate::ast::FunctionNode;
        use crate::function::FunctionObject;
        use crate::span::Span;

        let before_envs = memory::live_environment_count();
        let before_fns = memory::live_function_count();

        // Mirrors `{ function make(){ let c=0; return function(){...}; }
        // let g=make(); }`: `inner` is captured by `call_env`, a *child* of
        // `outer`, but ends up bound in `outer` itself — a pin one hop
        // removed from the direct self-capture case above.
        let outer = Environment::new(None);
        let call_env = Environment::new(Some(outer.clone()));
        let node = FunctionNode {
            name: None,
            params: vec![],
            body: vec![],
            is_async: false,
            is_arrow: false,
            span: Span::none(),
        };
        let inner = FunctionObject::new(&node, call_env.clone(), None);
        call_env.release();
        outer.define("g", Value::Function(inner));

        outer.release();
        assert_eq!(memory::live_environment_count(), before_envs);
        assert_eq!(memory::live_function_count(), before_fns);
    }
}
