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

//! Process-wide counters of live environments and live functions.
//!
//! Nothing in the evaluator depends on these numbers for correctness; they
//! exist so tests can assert that teardown actually releases the structures
//! it claims to release (closures capturing their own defining environment
//! are the usual way to leak these silently).

use std::cell::Cell;

thread_local! {
    static LIVE_ENVIRONMENTS: Cell<usize> = Cell::new(0);
    static LIVE_FUNCTIONS: Cell<usize> = Cell::new(0);
}

pub fn environment_created() {
    LIVE_ENVIRONMENTS.with(|c| c.set(c.get() + 1));
}

pub fn environment_destroyed() {
    LIVE_ENVIRONMENTS.with(|c| c.set(c.get().saturating_sub(1)));
}

pub fn function_created() {
    LIVE_FUNCTIONS.with(|c| c.set(c.get() + 1));
}

pub fn function_destroyed() {
    LIVE_FUNCTIONS.with(|c| c.set(c.get().saturating_sub(1)));
}

pub fn live_environment_count() -> usize {
    LIVE_ENVIRONMENTS.with(|c| c.get())
}

pub fn live_function_count() -> usize {
    LIVE_FUNCTIONS.with(|c| c.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_move_in_lockstep() {
        let before = live_environment_count();
        environment_created();
        assert_eq!(live_environment_count(), before + 1);
        environment_destroyed();
        assert_eq!(live_environment_count(), before);
    }
}
