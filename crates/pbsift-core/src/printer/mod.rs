//! Tree printing.
//!
//! [`TreePrinter`] walks a decoded field tree depth-first, keeping the
//! field-number path of the current field in a [`FieldPath`], and hands each
//! leaf to a [`FieldVisitor`]. With [`LineWriter`] this produces the
//! `pb_1_2 : value` line format.

mod visitor;

use crate::field::Field;
use crate::ROOT_LABEL;
use std::fmt;
use std::io;

pub use visitor::{FieldVisitor, LineWriter, NullVisitor, StatsVisitor};

/// Field-number path from the root to the current field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    root: String,
    numbers: Vec<u32>,
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::new(ROOT_LABEL)
    }
}

impl FieldPath {
    /// Creates an empty path under `root`
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            numbers: Vec::new(),
        }
    }

    /// The root label
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Field numbers from the outermost field inwards
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    /// Number of components below the root
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// True at the root
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Descends into a field
    pub fn push(&mut self, field_number: u32) {
        self.numbers.push(field_number);
    }

    /// Returns to the parent
    pub fn pop(&mut self) -> Option<u32> {
        self.numbers.pop()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for number in &self.numbers {
            write!(f, "_{}", number)?;
        }
        Ok(())
    }
}

/// Walks decoded fields and reports each leaf to a visitor
#[derive(Debug, Clone, Default)]
pub struct TreePrinter {
    path: FieldPath,
}

impl TreePrinter {
    /// Creates a printer whose paths start at `root`
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            path: FieldPath::new(root),
        }
    }

    /// The path at the current position of the walk
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Prints `field` and everything below it.
    ///
    /// The path is restored before returning, also when the visitor fails.
    pub fn print<V: FieldVisitor>(&mut self, field: &Field<'_>, visitor: &mut V) -> io::Result<()> {
        self.path.push(field.field_number);
        let result = self.print_inner(field, visitor);
        self.path.pop();
        result
    }

    fn print_inner<V: FieldVisitor>(&mut self, field: &Field<'_>, visitor: &mut V) -> io::Result<()> {
        if field.is_leaf() {
            return visitor.visit_leaf(&self.path, field);
        }

        visitor.enter_message(&self.path, field)?;
        for child in field.children() {
            self.print(child, visitor)?;
        }
        visitor.leave_message(&self.path, field)
    }
}
