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

//! The caller-supplied promise abstraction `await` suspends on.
//!
//! The evaluator never creates I/O, timers, or a task queue itself. A host
//! embeds it by placing values implementing [`HostValue::await_promise`]
//! into the globals table; `await` on anything else just yields the value
//! unchanged (`5` awaits to `5`). Because the whole evaluator is written as
//! native `async fn`s, a pending host future really does suspend the
//! enclosing `evaluate(..)` future until whatever executor is driving it
//! polls the host future ready again — there is no busy-wait or internal
//! scheduler standing in for the host's own event loop.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::EvalError;
use crate::value::Value;

/// Implemented by any opaque value a host wants the evaluator to treat as
/// awaitable. Ordinary host values (a database handle, a logger) simply use
/// the default `await_promise`, so `await`ing them is a no-op that returns
/// the value itself.
pub trait HostValue: fmt::Debug {
    fn type_name(&self) -> &'static str {
        "HostValue"
    }

    /// Returns the future this value represents, or `None` if this value is
    /// not itself awaitable.
    fn await_promise(&self) -> Option<LocalBoxFuture<'static, Result<Value, EvalError>>> {
        None
    }
}

/// The promise an async function call immediately returns. Calling a
/// `async function` never runs the body to a throw at the call site —
/// exceptions become the promise's rejection, observable only once
/// something `await`s or otherwise inspects it.
pub struct FunctionPromise {
    result: std::cell::RefCell<Option<Result<Value, EvalError>>>,
}

impl FunctionPromise {
    pub fn settled(result: Result<Value, EvalError>) -> Rc<Self> {
        Rc::new(Self { result: std::cell::RefCell::new(Some(result)) })
    }
}

impl fmt::Debug for FunctionPromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Promise]")
    }
}

impl HostValue for FunctionPromise {
    fn type_name(&self) -> &'static str {
        "Promise"
    }

    fn await_promise(&self) -> Option<LocalBoxFuture<'static, Result<Value, EvalError>>> {
        let settled = self.result.borrow_mut().take();
        let settled = settled.unwrap_or_else(|| {
            Ok(Value::Undefined)
        });
        Some(Box::pin(async move { settled }))
    }
}
