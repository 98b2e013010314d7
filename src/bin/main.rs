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

//! `warden [file]` — runs a script, or with no arguments starts an
//! interactive loop reading one statement at a time. `.exit` or end-of-input
//! terminates the loop. Exit code 1 on a raised error while executing a
//! file; the interactive loop always exits 0.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use warden::diagnostics::DiagnosticPrinter;
use warden::{evaluate, history::History, prelude, Environment};

#[derive(Parser)]
#[command(name = "warden", about = "A sandboxed scripting language evaluator")]
struct Cli {
    /// Script to run. With none given, starts an interactive session.
    file: Option<PathBuf>,

    /// Skip installing the convenience globals (console.log and friends).
    #[arg(long)]
    no_prelude: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let globals = Environment::root();
    if !cli.no_prelude {
        prelude::install(&globals);
    }

    let exit = match &cli.file {
        Some(path) => run_file(&globals, path),
        None => {
            run_repl(&globals);
            ExitCode::SUCCESS
        }
    };
    globals.release();
    exit
}

fn run_file(globals: &Environment, path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let printer = DiagnosticPrinter::new(path.display().to_string(), source.clone());
    match futures::executor::block_on(evaluate(globals, &source)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            printer.print(&e);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(globals: &Environment) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("error: could not start the line editor: {}", e);
            return;
        }
    };

    let history_path = History::default_path();
    let mut history = history_path.as_ref().map(|p| History::load(p)).unwrap_or_else(|| History::load("history.json"));
    for line in history.entries() {
        let _ = editor.add_history_entry(line.as_str());
    }

    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == ".exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                history.push(trimmed);

                let printer = DiagnosticPrinter::new("<repl>", trimmed.to_string());
                match futures::executor::block_on(evaluate(globals, trimmed)) {
                    Ok(value) => println!("{}", warden::interpreter::display::repl_echo(&value)),
                    Err(e) => printer.print(&e),
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        }
    }

    if let Some(path) = history_path {
        if let Err(e) = history.save() {
            eprintln!("warning: could not save history to {}: {}", path.display(), e);
        }
    }
}
