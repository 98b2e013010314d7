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

//! Renders an [`EvalError`] as a compiler-style diagnostic: a header naming
//! the stable error code, a two-line window of source ending at the
//! offending line (just that line alone when it's line 1), a caret under
//! the exact column, and an optional help line. Output is plain text on
//! purpose — readable in a terminal with no color support and easy to
//! snapshot-test.

use crate::error::EvalError;
use crate::span::Span;

pub struct DiagnosticPrinter {
    source: String,
    file_name: String,
}

impl DiagnosticPrinter {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), source: source.into() }
    }

    /// Renders the diagnostic as a single multi-line string instead of
    /// printing directly, so callers (the REPL, the CLI, tests) decide
    /// where it goes.
    pub fn render(&self, error: &EvalError) -> String {
        let Span { line, column } = error.span;
        let lines: Vec<&str> = self.source.lines().collect();
        let src_line = lines.get(line.saturating_sub(1)).copied().unwrap_or("");

        let mut out = String::new();
        out.push_str(&format!("error[{}]: {}\n", error.code(), error.kind));
        out.push_str(&format!("  --> {}:{}:{}\n", self.file_name, line, column));
        out.push_str("   |\n");
        if line > 1 {
            if let Some(prev_line) = lines.get(line - 2) {
                out.push_str(&format!("{:>3} | {}\n", line - 1, prev_line));
            }
        }
        out.push_str(&format!("{:>3} | {}\n", line, src_line));
        out.push_str("   | ");
        out.push_str(&" ".repeat(column.saturating_sub(1)));
        out.push_str("^\n");
        if let Some(help) = &error.help {
            out.push_str(&format!("\nhelp: {}\n", help));
        }
        out
    }

    pub fn print(&self, error: &EvalError) {
        eprint!("{}", self.render(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn renders_code_and_caret_position() {
        let printer = DiagnosticPrinter::new("main.wd", "let x = 5 +\ntrue;");
        let err = EvalError::type_error("cannot add number and boolean", Span::new(1, 10));
        let rendered = printer.render(&err);
        assert!(rendered.contains("error[E_TYPE]"));
        assert!(rendered.contains("main.wd:1:10"));
        assert!(rendered.contains("let x = 5 +"));
    }

    #[test]
    fn renders_the_preceding_line_when_the_fault_is_not_on_line_one() {
        let printer = DiagnosticPrinter::new("main.wd", "let ok = 1;\nlet x = 5 +\ntrue;");
        let err = EvalError::type_error("cannot add number and boolean", Span::new(2, 10));
        let rendered = printer.render(&err);
        assert!(rendered.contains("1 | let ok = 1;"));
        assert!(rendered.contains("2 | let x = 5 +"));
    }

    #[test]
    fn omits_a_preceding_line_when_the_fault_is_on_line_one() {
        let printer = DiagnosticPrinter::new("main.wd", "true + 1");
        let err = EvalError::type_error("cannot add boolean and number", Span::new(1, 1));
        let rendered = printer.render(&err);
        assert!(!rendered.contains("0 |"));
        assert!(rendered.contains("1 | true + 1"));
    }
}
