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

//! Optional, opt-in convenience globals.
//!
//! [`crate::interpreter::evaluate`] never seeds the root environment with
//! anything: a sandboxed caller may not want the script to see a console, or
//! may want to supply its own. Embedders that don't care either way can call
//! [`install`] to get a small set of host values a typical script expects to
//! exist, built entirely out of the same `NativeFn`/`HostValue` seams a host
//! would use to install its own.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::environment::Environment;
use crate::value::Value;

/// Installs `console.log` / `console.warn` / `console.error` into `globals`,
/// each forwarding its arguments (space-joined, display-formatted) to the
/// corresponding `tracing` level. Does not overwrite an existing `console`
/// binding.
pub fn install(globals: &Environment) {
    if !globals.has_own("console") {
        globals.define("console", console_object());
    }
}

fn console_object() -> Value {
    let mut fields = IndexMap::new();
    fields.insert("log".to_string(), native_logger(Level::Info));
    fields.insert("warn".to_string(), native_logger(Level::Warn));
    fields.insert("error".to_string(), native_logger(Level::Error));
    Value::Object(Rc::new(RefCell::new(fields)))
}

enum Level {
    Info,
    Warn,
    Error,
}

fn native_logger(level: Level) -> Value {
    Value::Native(Rc::new(move |_this, args| {
        let line = args.iter().map(|v| v.to_display_string()).collect::<Vec<_>>().join(" ");
        match level {
            Level::Info => tracing::info!(target: "warden::script", "{}", line),
            Level::Warn => tracing::warn!(target: "warden::script", "{}", line),
            Level::Error => tracing::error!(target: "warden::script", "{}", line),
        }
        Ok(Value::Undefined)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent_and_does_not_clobber_a_caller_supplied_console() {
        let globals = Environment::root();
        globals.define("console", Value::Number(7.0));
        install(&globals);
        assert!(matches!(globals.get("console"), Some(Value::Number(n)) if n == 7.0));
        globals.release();
    }

    #[test]
    fn installed_console_exposes_log_warn_error() {
        let globals = Environment::root();
        install(&globals);
        let console = globals.get("console").expect("console installed");
        if let Value::Object(fields) = console {
            let fields = fields.borrow();
            assert!(matches!(fields.get("log"), Some(Value::Native(_))));
            assert!(matches!(fields.get("warn"), Some(Value::Native(_))));
            assert!(matches!(fields.get("error"), Some(Value::Native(_))));
        } else {
            panic!("expected console to be an object");
        }
        globals.release();
    }
}
