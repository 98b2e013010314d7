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

//! Serializes a [`Value`] into [`serde_json::Value`] for a host that wants
//! to hand a script's result back across its own boundary (a REPL printing
//! the last expression, a test harness comparing against a fixture). This is
//! a one-way, lossy projection: functions, classes, instances, and opaque
//! host values all collapse to a descriptive string since they carry no
//! portable representation.

use serde_json::json;

use crate::value::Value;

pub fn value_to_json(val: &Value) -> serde_json::Value {
    match val {
        Value::Undefined => serde_json::Value::Null,
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
        Value::String(s) => json!(s.as_ref()),
        Value::Array(items) => serde_json::Value::Array(items.borrow().iter().map(value_to_json).collect()),
        Value::Object(fields) => {
            let mut map = serde_json::Map::new();
            for (k, v) in fields.borrow().iter() {
                map.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Error(fields) => {
            let mut map = serde_json::Map::new();
            for (k, v) in fields.borrow().iter() {
                map.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Function(_) | Value::Native(_) => json!(val.to_display_string()),
        Value::Class(_) => json!(val.to_display_string()),
        Value::Instance(inst) => {
            let mut map = serde_json::Map::new();
            for (k, v) in inst.fields.borrow().iter() {
                map.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::HostOpaque(_) => json!(val.to_display_string()),
    }
}

/// Formats a value for REPL echo, the way a `print`-style call at the top
/// level would: strings print without quotes, everything else uses the same
/// display form `to_display_string` produces elsewhere.
pub fn repl_echo(val: &Value) -> String {
    val.to_display_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_and_objects_round_trip_into_json() {
        let arr = Value::array(vec![Value::Number(1.0), Value::string("two")]);
        assert_eq!(value_to_json(&arr), json!([1.0, "two"]));
    }

    #[test]
    fn functions_collapse_to_a_descriptive_string() {
        // No captured_env lifecycle needed here: Native wraps a plain closure.
        let native: Value = Value::Native(std::rc::Rc::new(|_this, _args| Ok(Value::Undefined)));
        assert_eq!(value_to_json(&native), json!("[Function: native]"));
    }
}
