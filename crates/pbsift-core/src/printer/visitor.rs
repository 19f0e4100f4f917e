//! Extensible leaf visiting.
//!
//! This module provides the [`FieldVisitor`] trait for customizing what
//! happens to each field as the [`TreePrinter`](super::TreePrinter) walks a
//! decoded tree.

use super::FieldPath;
use crate::field::{Field, Payload};
use std::io::{self, Write};

/// Trait for consuming a decoded field tree.
///
/// Only [`visit_leaf`](FieldVisitor::visit_leaf) is required. Messages are
/// announced through the enter/leave hooks but produce no output in the
/// default line format.
///
/// # Example
///
/// ```
/// use pbsift_core::{Field, FieldPath, FieldVisitor};
///
/// #[derive(Default)]
/// struct Paths(Vec<String>);
///
/// impl FieldVisitor for Paths {
///     fn visit_leaf(&mut self, path: &FieldPath, _field: &Field<'_>) -> std::io::Result<()> {
///         self.0.push(path.to_string());
///         Ok(())
///     }
/// }
/// ```
pub trait FieldVisitor {
    /// Called for every field without children
    fn visit_leaf(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()>;

    /// Called before the children of a message field
    fn enter_message(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        let _ = (path, field);
        Ok(())
    }

    /// Called after the children of a message field
    fn leave_message(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        let _ = (path, field);
        Ok(())
    }
}

impl<V: FieldVisitor + ?Sized> FieldVisitor for &mut V {
    fn visit_leaf(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        (**self).visit_leaf(path, field)
    }

    fn enter_message(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        (**self).enter_message(path, field)
    }

    fn leave_message(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        (**self).leave_message(path, field)
    }
}

/// Feeds every event to both visitors, first `A` then `B`
impl<A: FieldVisitor, B: FieldVisitor> FieldVisitor for (A, B) {
    fn visit_leaf(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        self.0.visit_leaf(path, field)?;
        self.1.visit_leaf(path, field)
    }

    fn enter_message(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        self.0.enter_message(path, field)?;
        self.1.enter_message(path, field)
    }

    fn leave_message(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        self.0.leave_message(path, field)?;
        self.1.leave_message(path, field)
    }
}

/// Writes one `<path> : <value>` line per leaf.
///
/// Numbers are written in decimal. Opaque byte payloads are written verbatim,
/// without escaping, so the output may contain arbitrary bytes.
#[derive(Debug)]
pub struct LineWriter<W> {
    out: W,
}

impl<W: Write> LineWriter<W> {
    /// Wraps an output sink
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns a reference to the sink
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwraps the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FieldVisitor for LineWriter<W> {
    fn visit_leaf(&mut self, path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        write!(self.out, "{} : ", path)?;
        match &field.payload {
            Payload::Number(n) => write!(self.out, "{}", n)?,
            Payload::Bytes { raw, .. } | Payload::Message { raw, .. } => self.out.write_all(raw)?,
        }
        self.out.write_all(b"\n")
    }
}

/// A no-op visitor that discards all output
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisitor;

impl FieldVisitor for NullVisitor {
    fn visit_leaf(&mut self, _path: &FieldPath, _field: &Field<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// A visitor that collects statistics about the decoded tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsVisitor {
    /// Number of printed leaves
    pub leaf_count: usize,
    /// Leaves holding a number
    pub number_count: usize,
    /// Leaves holding opaque bytes
    pub bytes_count: usize,
    /// Leaves whose bytes were rejected as a message
    pub rejected_count: usize,
    /// Fields decoded as nested messages
    pub message_count: usize,
    /// Deepest nesting level seen
    pub max_depth: usize,
}

impl FieldVisitor for StatsVisitor {
    fn visit_leaf(&mut self, _path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        self.leaf_count += 1;
        self.max_depth = self.max_depth.max(field.depth);
        match &field.payload {
            Payload::Number(_) => self.number_count += 1,
            Payload::Bytes { rejection, .. } => {
                self.bytes_count += 1;
                if rejection.is_some() {
                    self.rejected_count += 1;
                }
            }
            Payload::Message { .. } => {}
        }
        Ok(())
    }

    fn enter_message(&mut self, _path: &FieldPath, field: &Field<'_>) -> io::Result<()> {
        self.message_count += 1;
        self.max_depth = self.max_depth.max(field.depth);
        Ok(())
    }
}
