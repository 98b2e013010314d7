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

//! Interactive-mode input history, persisted as a JSON array of strings at
//! `$HOME/.warden/history.json`. This lives outside the evaluator core: the
//! REPL driver owns it, and nothing in `crate::interpreter` touches it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    entries: Vec<String>,
}

/// Loaded history, capped and deduplicated, ready to hand to a line editor
/// or to append to as new lines come in.
pub struct History {
    path: PathBuf,
    entries: Vec<String>,
}

impl History {
    /// Loads history from `path`, tolerating a missing or malformed file by
    /// starting empty rather than failing the whole REPL session.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HistoryFile>(&raw).ok())
            .map(|f| f.entries)
            .unwrap_or_default();
        Self { path, entries }
    }

    /// The default location, `$HOME/.warden/history.json`, or `None` if the
    /// home directory cannot be determined.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".warden").join("history.json"))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Appends `line` unless it repeats the immediately preceding entry, then
    /// trims from the front to stay within [`MAX_ENTRIES`].
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() {
            return;
        }
        if self.entries.last().map(|last| last == &line).unwrap_or(false) {
            return;
        }
        self.entries.push(line);
        if self.entries.len() > MAX_ENTRIES {
            let overflow = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(0..overflow);
        }
    }

    /// Writes the history back to disk, creating the parent directory if
    /// needed. Errors are the caller's to decide whether to surface.
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = HistoryFile { entries: self.entries.clone() };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_deduplicates_only_against_the_immediately_preceding_entry() {
        let mut history = History { path: PathBuf::new(), entries: Vec::new() };
        history.push("let x = 1;");
        history.push("let x = 1;");
        history.push("x");
        history.push("let x = 1;");
        assert_eq!(history.entries(), &["let x = 1;", "x", "let x = 1;"]);
    }

    #[test]
    fn push_caps_at_max_entries_dropping_oldest_first() {
        let mut history = History { path: PathBuf::new(), entries: Vec::new() };
        for i in 0..(MAX_ENTRIES + 10) {
            history.push(format!("line{}", i));
        }
        assert_eq!(history.entries().len(), MAX_ENTRIES);
        assert_eq!(history.entries()[0], "line10");
    }

    #[test]
    fn blank_lines_are_never_recorded() {
        let mut history = History { path: PathBuf::new(), entries: Vec::new() };
        history.push("   ");
        assert!(history.entries().is_empty());
    }

    #[test]
    fn save_and_load_round_trip_through_a_temp_file() {
        let dir = std::env::temp_dir().join(format!("warden-history-test-{:p}", &MAX_ENTRIES));
        let path = dir.join("history.json");
        let mut history = History::load(&path);
        history.push("1 + 1");
        history.save().expect("save should succeed");

        let reloaded = History::load(&path);
        assert_eq!(reloaded.entries(), &["1 + 1"]);

        let _ = fs::remove_dir_all(&dir);
    }
}
