//! Per-unit output buffer.
//!
//! Collects `use` paths and declaration text separately so imports can be
//! emitted sorted and deduplicated, with self-imports (types declared in the
//! same unit) filtered out at assembly time.

use std::collections::BTreeSet;

pub struct Codegen {
    uses: BTreeSet<String>,
    declares: Vec<String>,
    buf: String,
}

impl Codegen {
    pub fn new() -> Self {
        Codegen {
            uses: BTreeSet::new(),
            declares: vec![],
            buf: String::new(),
        }
    }

    pub fn push_use(&mut self, path: impl Into<String>) {
        self.uses.insert(path.into());
    }

    /// Record a type declared in this unit; imports of it are suppressed.
    pub fn declare(&mut self, type_name: impl Into<String>) {
        self.declares.push(type_name.into());
    }

    pub fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn is_self_import(&self, path: &str) -> bool {
        let last = path.rsplit("::").next().unwrap_or(path);
        self.declares.iter().any(|d| d == last)
    }

    pub fn into_source(self) -> String {
        let mut out = String::new();
        for path in &self.uses {
            if self.is_self_import(path) {
                continue;
            }
            out.push_str("use ");
            out.push_str(path);
            out.push_str(";\n");
        }
        out.push('\n');
        out.push_str(&self.buf);
        out
    }
}

// ------------------------------- Tests ------------------------------------ //
