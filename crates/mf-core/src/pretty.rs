//! Shared plumbing for printing mapping programs.

use std::fmt::{self, Formatter};

#[derive(Debug, Clone)]
pub struct PrettyOptions {
    /// spaces per nesting level
    pub indent_size: usize,
    /// annotate `let` bindings with the static type of their initializer
    pub show_types: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            show_types: false,
        }
    }
}

/// Printer state: the options and the current nesting depth
pub struct PrettyCtx<'a> {
    pub options: &'a PrettyOptions,
    depth: usize,
}

impl<'a> PrettyCtx<'a> {
    pub fn new(options: &'a PrettyOptions) -> Self {
        Self { options, depth: 0 }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn write_indent(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:width$}", "", width = self.depth * self.options.indent_size)
    }

    /// Runs `body` one nesting level deeper
    pub fn with_indent(
        &mut self,
        mut body: impl FnMut(&mut Self) -> fmt::Result,
    ) -> fmt::Result {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

pub trait PrettyPrintable {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result;
}

/// `Display` adapter printing a node with explicit options
pub struct PrettyDisplay<'a, T> {
    value: &'a T,
    options: PrettyOptions,
}

impl<T: PrettyPrintable> fmt::Display for PrettyDisplay<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut ctx = PrettyCtx::new(&self.options);
        self.value.fmt_pretty(f, &mut ctx)
    }
}

pub fn pretty<T: PrettyPrintable>(value: &T, options: PrettyOptions) -> PrettyDisplay<'_, T> {
    PrettyDisplay { value, options }
}
