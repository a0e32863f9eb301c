//! Delta module - Core implementation of the Quill Delta format
//!
//! This module provides the main [`Delta`] struct which represents either a complete
//! document or a set of changes to apply to a document. Deltas are composed of a
//! sequence of operations that describe how to build or modify content.
//!
//! # Key Concepts
//!
//! - **Document Delta**: A delta that represents a complete document, containing only
//!   insert operations
//! - **Change Delta**: A delta that represents modifications to a document, containing
//!   any combination of insert, delete, and retain operations
//! - **Operational Transformation**: The ability to transform concurrent edits to
//!   maintain consistency in collaborative editing scenarios
//!
//! # Examples
//!
//! Creating a document:
//! ```rust
//! use quillai_delta::Delta;
//!
//! let doc = Delta::new()
//!     .insert("Hello world", None).unwrap()
//!     .insert("\n", None).unwrap();
//! ```
//!
//! Creating a change:
//! ```rust
//! use quillai_delta::Delta;
//!
//! let change = Delta::new()
//!     .retain(6, None)  // Keep "Hello "
//!     .delete(5)        // Delete "world"
//!     .insert("Rust", None).unwrap();  // Insert "Rust"
//! ```

use crate::attributes::{AttributeMap, AttributeMapOps};
use crate::diff::{diff_text, DiffType};
use crate::embed::Embed;
use crate::error::Error;
use crate::op::{Action, Op, OpValue, TakeRest};
use crate::op_iterator::OpIterator;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

fn normalize_attrs(attrs: Option<AttributeMap>) -> Option<AttributeMap> {
    attrs.filter(|a| !a.is_empty())
}

/// What a [`Delta::split`] predicate reports for one operation
///
/// Reports either "continue past this op" or a non-negative split point
/// relative to the op's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPoint {
    /// Keep walking; this operation is not where the cleave happens
    Continue,
    /// Cleave here, `offset` length units into this operation
    At(usize),
}

/// Represents a Quill Delta - either a complete document or a change to a document
///
/// A Delta is fundamentally a sequence of operations that describe how to create
/// or modify a rich text document. The operations are stored in a normalized form
/// where consecutive operations of the same type with the same attributes are merged.
///
/// # Examples
///
/// Creating a simple document:
/// ```rust
/// use quillai_delta::Delta;
///
/// let doc = Delta::new()
///     .insert("Hello ", None).unwrap()
///     .insert("world!", None).unwrap();
/// // Results in a single insert operation: "Hello world!"
/// ```
///
/// Creating a document with formatting:
/// ```rust
/// use quillai_delta::{Delta, AttributeMap, AttributeValue};
///
/// let mut bold = AttributeMap::new();
/// bold.insert("bold".to_string(), AttributeValue::Boolean(true));
///
/// let doc = Delta::new()
///     .insert("Normal text ", None).unwrap()
///     .insert("bold text", Some(bold)).unwrap()
///     .insert(" more normal", None).unwrap();
/// ```
///
/// On the wire this is the Quill Delta document/change shape `{"ops": [...]}`
/// — a JSON object with one `"ops"` key, not a bare array — matching the
/// field name `ops` derives onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    /// Creates a new empty Delta
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Creates a Delta from a vector of operations
    ///
    /// This constructor does not perform any optimization or merging of operations —
    /// adjacent mergeable ops are not guaranteed to be combined. Use [`Delta::compact`]
    /// to canonicalize an arbitrary vector, or build up a Delta with the
    /// `insert`/`retain`/`delete` methods, which canonicalize incrementally
    /// through [`Delta::push`].
    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Returns a slice of the operations in this Delta
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Returns a mutable reference to the operations vector
    ///
    /// # Warning
    ///
    /// Direct modification of operations can break Delta invariants.
    /// Use the builder methods when possible.
    pub fn ops_mut(&mut self) -> &mut Vec<Op> {
        &mut self.ops
    }

    /// Inserts text with optional formatting attributes
    ///
    /// Empty text is a no-op *unless* attributes are attached, in which case
    /// there is no well-defined operation to construct (attributes on
    /// nothing) and this is rejected rather than silently dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if `text` is empty and
    /// `attributes` is non-empty.
    pub fn insert<T: Into<String>>(
        self,
        text: T,
        attributes: Option<AttributeMap>,
    ) -> Result<Self, Error> {
        let op = Op::new(Action::Insert, OpValue::Text(text.into()), attributes)?;
        Ok(self.push(op))
    }

    /// Inserts an embed object (image, video, etc.) with optional attributes
    ///
    /// Embeds are non-text content that occupy a single character position
    /// in the document.
    pub fn insert_embed(
        self,
        kind: impl Into<String>,
        value: JsonValue,
        attributes: Option<AttributeMap>,
    ) -> Self {
        self.push(Op::InsertEmbed {
            embed: Embed::new(kind, value),
            attributes: normalize_attrs(attributes),
        })
    }

    /// Deletes a specified number of characters
    pub fn delete(self, length: usize) -> Self {
        if length == 0 {
            return self;
        }
        self.push(Op::Delete {
            length,
            attributes: None,
        })
    }

    /// Deletes a specified number of characters, attaching metadata about
    /// the removal itself (e.g. the author who requested it) rather than
    /// formatting — see [`Op::Delete`].
    pub fn delete_with_attributes(self, length: usize, attributes: Option<AttributeMap>) -> Self {
        if length == 0 {
            return self;
        }
        self.push(Op::Delete {
            length,
            attributes: normalize_attrs(attributes),
        })
    }

    /// Retains a number of characters, optionally modifying their attributes
    pub fn retain(self, length: usize, attributes: Option<AttributeMap>) -> Self {
        if length == 0 {
            return self;
        }
        self.push(Op::Retain {
            length,
            attributes: normalize_attrs(attributes),
        })
    }

    /// Retains an existing embed, optionally modifying its attributes
    ///
    /// `value` is the embed expected at the current position; composing or
    /// transforming this against an embed of a different `kind` is an
    /// [`Error::EmbedMismatch`].
    pub fn retain_embed(
        self,
        kind: impl Into<String>,
        value: JsonValue,
        attributes: Option<AttributeMap>,
    ) -> Self {
        self.push(Op::RetainEmbed {
            embed: Embed::new(kind, value),
            attributes: normalize_attrs(attributes),
        })
    }

    /// Adds an operation to the Delta with automatic canonicalization
    ///
    /// The canonicalizing appender: drops zero-length
    /// operations, keeps inserts ordered before a trailing delete at the
    /// same anchor, and merges adjacent operations that share an action and
    /// attribute set (text inserts and integer retains/deletes only — embed
    /// operations never merge).
    pub fn push(mut self, new_op: Op) -> Self {
        if new_op.length() == 0 {
            return self;
        }

        if self.ops.is_empty() {
            self.ops.push(new_op);
            return self;
        }

        let last_index = self.ops.len() - 1;
        let last_op = self.ops[last_index].clone();

        // Inserts always precede a delete at the same anchor.
        if new_op.is_insert() && last_op.is_delete() {
            if last_index > 0 {
                let prev_op = self.ops[last_index - 1].clone();
                if Self::can_merge(&prev_op, &new_op) {
                    Self::merge_into(&mut self.ops[last_index - 1], new_op);
                    return self;
                }
            }
            self.ops.insert(last_index, new_op);
            return self;
        }

        if Self::can_merge(&last_op, &new_op) {
            Self::merge_into(&mut self.ops[last_index], new_op);
            return self;
        }

        self.ops.push(new_op);
        self
    }

    /// Whether two operations share an action and attribute set, and so can
    /// be folded into one by [`Delta::merge_into`]
    fn can_merge(op1: &Op, op2: &Op) -> bool {
        match (op1, op2) {
            (Op::Insert { attributes: a1, .. }, Op::Insert { attributes: a2, .. }) => {
                AttributeMapOps::equal(a1.as_ref(), a2.as_ref())
            }
            (Op::Retain { attributes: a1, .. }, Op::Retain { attributes: a2, .. }) => {
                AttributeMapOps::equal(a1.as_ref(), a2.as_ref())
            }
            (Op::Delete { attributes: a1, .. }, Op::Delete { attributes: a2, .. }) => {
                AttributeMapOps::equal(a1.as_ref(), a2.as_ref())
            }
            _ => false,
        }
    }

    /// Folds `op2` into `op1`; callers must have already checked [`Delta::can_merge`]
    fn merge_into(op1: &mut Op, op2: Op) {
        match (op1, op2) {
            (Op::Insert { text: t1, .. }, Op::Insert { text: t2, .. }) => t1.push_str(&t2),
            (Op::Retain { length: l1, .. }, Op::Retain { length: l2, .. }) => *l1 += l2,
            (Op::Delete { length: l1, .. }, Op::Delete { length: l2, .. }) => *l1 += l2,
            _ => unreachable!("can_merge guarantees matching shapes"),
        }
    }

    /// Removes a trailing retain operation without attributes
    ///
    /// Used after compose/transform to avoid ending a Delta with a
    /// meaningless retain.
    pub fn chop(mut self) -> Self {
        if matches!(
            self.ops.last(),
            Some(Op::Retain {
                attributes: None,
                ..
            })
        ) {
            self.ops.pop();
        }
        self
    }

    /// Reapplies the canonicalizing [`Delta::push`] to every operation
    ///
    /// Produces the canonical form of an arbitrary (possibly non-canonical)
    /// sequence.
    pub fn compact(&self) -> Delta {
        self.ops.iter().cloned().fold(Delta::new(), Delta::push)
    }

    /// Calculates the total length of content affected by this Delta
    pub fn length(&self) -> usize {
        self.ops.iter().map(|op| op.length()).sum()
    }

    /// Calculates the net change in document length if this Delta is applied
    ///
    /// - Insert operations increase length
    /// - Delete operations decrease length
    /// - Retain operations don't change length
    pub fn change_length(&self) -> i64 {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Insert { .. } | Op::InsertEmbed { .. } => op.length() as i64,
                Op::Delete { length, .. } => -(*length as i64),
                _ => 0,
            })
            .sum()
    }

    /// Filters operations based on a predicate function
    pub fn filter<F>(&self, predicate: F) -> Vec<&Op>
    where
        F: Fn(&Op) -> bool,
    {
        self.ops.iter().filter(|op| predicate(op)).collect()
    }

    /// Applies a function to each operation in the Delta
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Op),
    {
        for op in &self.ops {
            f(op);
        }
    }

    /// Maps each operation to a value of type T
    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&Op) -> T,
    {
        self.ops.iter().map(f).collect()
    }

    /// Partitions operations into two groups based on a predicate
    pub fn partition<F>(&self, predicate: F) -> (Vec<Op>, Vec<Op>)
    where
        F: Fn(&Op) -> bool,
    {
        let mut passed = Vec::new();
        let mut failed = Vec::new();
        for op in &self.ops {
            if predicate(op) {
                passed.push(op.clone());
            } else {
                failed.push(op.clone());
            }
        }
        (passed, failed)
    }

    /// Reduces operations to a single value using an accumulator function
    pub fn reduce<T, F>(&self, initial: T, f: F) -> T
    where
        F: Fn(T, &Op) -> T,
    {
        self.ops.iter().fold(initial, f)
    }

    /// Extracts the canonical subsequence covering `[start, start + length)`
    ///
    /// An operation straddling `start` or the end of the range is split with
    /// [`Op::take`]; grapheme boundaries are always
    /// respected since `take` routes text splits through [`crate::grapheme`].
    pub fn slice(&self, start: usize, length: usize) -> Result<Delta, Error> {
        let end = start.saturating_add(length);
        let mut ops = Vec::new();
        let mut iter = OpIterator::new(&self.ops);
        let mut index = 0usize;

        while index < end && iter.has_next() {
            let next_op = if index < start {
                iter.next(Some(start - index))?
            } else {
                let op = iter.next(Some(end - index))?;
                ops.push(op.clone());
                op
            };
            index += next_op.length();
        }

        Ok(Delta::from_ops(ops))
    }

    /// Like [`Delta::slice`], but an insert straddling `start + length` is
    /// extended rightward to the next grapheme boundary via [`Op::take_max`]
    /// instead of being cut. All other edges are identical to `slice`.
    pub fn slice_max(&self, start: usize, length: usize) -> Result<Delta, Error> {
        let end = start.saturating_add(length);
        let mut ops = Vec::new();
        let mut iter = OpIterator::new(&self.ops);
        let mut index = 0usize;

        while index < end && iter.has_next() {
            let next_op = if index < start {
                iter.next(Some(start - index))?
            } else {
                let op = iter.next_max(Some(end - index))?;
                ops.push(op.clone());
                op
            };
            index += next_op.length();
        }

        Ok(Delta::from_ops(ops))
    }

    /// Walks the sequence invoking `predicate(op, index)` at each operation's
    /// start index, cleaving the sequence at the first non-`Continue` result.
    /// The operation itself is split by [`Op::take`] when the split point
    /// falls strictly inside it; both halves are returned in canonical form.
    pub fn split<F>(&self, mut predicate: F) -> Result<(Delta, Delta), Error>
    where
        F: FnMut(&Op, usize) -> SplitPoint,
    {
        let mut index = 0usize;
        for (i, op) in self.ops.iter().enumerate() {
            match predicate(op, index) {
                SplitPoint::Continue => index += op.length(),
                SplitPoint::At(offset) => {
                    let mut before: Vec<Op> = self.ops[..i].to_vec();
                    let mut after: Vec<Op> = Vec::new();

                    if offset == 0 {
                        after.push(op.clone());
                    } else if offset >= op.length() {
                        before.push(op.clone());
                    } else {
                        let (left, rest) = op.take(offset)?;
                        before.push(left);
                        if let TakeRest::Op(rest_op) = rest {
                            after.push(rest_op);
                        }
                    }

                    after.extend_from_slice(&self.ops[i + 1..]);
                    return Ok((
                        Delta::from_ops(before).compact(),
                        Delta::from_ops(after).compact(),
                    ));
                }
            }
        }
        Ok((self.clone(), Delta::new()))
    }

    /// Concatenates this Delta with another Delta
    ///
    /// The operations from the other Delta are appended, with automatic
    /// merging of compatible operations at the boundary.
    pub fn concat(&self, other: &Delta) -> Delta {
        let mut result = self.clone();
        if !other.ops.is_empty() {
            result = result.push(other.ops[0].clone());
            for op in &other.ops[1..] {
                result.ops.push(op.clone());
            }
        }
        result
    }

    /// Composes this Delta with another Delta
    ///
    /// Composition creates a new Delta that represents the result of applying
    /// this Delta followed by `other`. Every synchronized slice pair is
    /// dispatched through [`crate::stepper::compose_step`];
    /// this method drives the pairwise stepper over the whole sequence and
    /// pushes results through the canonicalizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmbedMismatch`] or [`Error::UnknownEmbedType`] if a
    /// retain-embed is composed against a differently-typed embed, or
    /// against an embed kind with no registered handler.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::Delta;
    ///
    /// let doc = Delta::new().insert("Hello World", None).unwrap();
    /// let change = Delta::new().retain(6, None).delete(5).insert("Rust", None).unwrap();
    /// let combined = doc.compose(&change).unwrap();
    /// assert_eq!(combined.length(), 11);
    /// ```
    pub fn compose(&self, other: &Delta) -> Result<Delta, Error> {
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut result = Delta::new();

        // Retain-start optimization: an attribute-free leading retain in
        // `other` that covers a run of leading inserts in `self` lets those
        // inserts pass straight through.
        if let Some(Op::Retain {
            length,
            attributes: None,
        }) = other_iter.peek().cloned()
        {
            let mut first_left = length;
            while this_iter.peek_is_insert() && this_iter.peek_length() <= first_left {
                first_left -= this_iter.peek_length();
                result = result.push(this_iter.next(None)?);
            }
            if length - first_left > 0 {
                other_iter.next(Some(length - first_left))?;
            }
        }

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_is_insert() {
                result = result.push(other_iter.next(None)?);
                continue;
            }
            if this_iter.peek_is_delete() {
                result = result.push(this_iter.next(None)?);
                continue;
            }

            let length = this_iter.peek_length().min(other_iter.peek_length());
            let x = this_iter.next(Some(length))?;
            let y = other_iter.next(Some(length))?;

            if let Some(op) = crate::stepper::compose_step(&x, &y, length)? {
                let pushed = op.clone();
                result = result.push(op);

                // Retain-end optimization: once `other` is exhausted and the
                // op just pushed survived unmerged with no attribute change
                // from `y` (a bare retain), the rest of `self` composes with
                // an implicit trailing retain and can be copied verbatim.
                if !other_iter.has_next()
                    && result.ops.last() == Some(&pushed)
                    && matches!(
                        y,
                        Op::Retain {
                            attributes: None,
                            ..
                        }
                    )
                {
                    let rest = Delta::from_ops(this_iter.rest());
                    return Ok(result.concat(&rest).chop());
                }
            }
        }

        Ok(result.chop())
    }

    /// Transforms this Delta against another Delta for operational transformation
    ///
    /// Rebases `other` so it can be applied after this Delta, dispatching
    /// through [`crate::stepper::transform_step`].
    /// `priority` breaks ties on overlapping inserts and attribute conflicts:
    /// when true, this Delta wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmbedMismatch`] or [`Error::UnknownEmbedType`] under
    /// the same conditions as [`Delta::compose`].
    pub fn transform(&self, other: &Delta, priority: bool) -> Result<Delta, Error> {
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut result = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            if this_iter.peek_is_insert() && (priority || !other_iter.peek_is_insert()) {
                let op = this_iter.next(None)?;
                result = result.push(Op::Retain {
                    length: op.length(),
                    attributes: None,
                });
                continue;
            }
            if other_iter.peek_is_insert() {
                result = result.push(other_iter.next(None)?);
                continue;
            }

            let length = this_iter.peek_length().min(other_iter.peek_length());
            let x = this_iter.next(Some(length))?;
            let y = other_iter.next(Some(length))?;

            if let Some(op) = crate::stepper::transform_step(&x, &y, priority, length)? {
                result = result.push(op);
            }
        }

        Ok(result.chop())
    }

    /// Transforms a position index to account for this Delta's operations
    ///
    /// Walks op-by-op over this Delta: an insert at the walking offset
    /// shifts `index` by its length when `offset < index` or `priority` is
    /// false.
    pub fn transform_position(&self, index: usize, priority: bool) -> usize {
        let mut iter = OpIterator::new(&self.ops);
        let mut offset = 0;
        let mut transformed_index = index;

        while iter.has_next() && offset <= index {
            let length = iter.peek_length();
            let is_delete = iter.peek_is_delete();
            let is_insert = iter.peek_is_insert();
            iter.next(None)
                .expect("next(None) never splits, so never errors");

            if is_delete {
                transformed_index =
                    transformed_index.saturating_sub(std::cmp::min(length, index - offset));
            } else if is_insert && (offset < index || !priority) {
                transformed_index += length;
            }

            offset += length;
        }

        transformed_index
    }

    /// Creates a diff Delta that transforms this document into another document
    ///
    /// **[AMBIENT facade, not part of the core algebra]**: both Deltas must
    /// be documents (inserts only). Uses a simple prefix/suffix text diff
    /// rather than computing a minimal edit distance.
    pub fn diff(&self, other: &Delta) -> Result<Delta, Error> {
        if self.ops == other.ops {
            return Ok(Delta::new());
        }

        let self_text = self.to_text();
        let other_text = other.to_text();

        let diff_ops = diff_text(&self_text, &other_text);
        let mut result = Delta::new();
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);

        for diff_op in diff_ops {
            let mut length = diff_op.length();

            while length > 0 {
                match diff_op.operation {
                    DiffType::Insert => {
                        let op_length = std::cmp::min(other_iter.peek_length(), length);
                        result = result.push(other_iter.next(Some(op_length))?);
                        length -= op_length;
                    }
                    DiffType::Delete => {
                        let op_length = std::cmp::min(length, this_iter.peek_length());
                        this_iter.next(Some(op_length))?;
                        result = result.delete(op_length);
                        length -= op_length;
                    }
                    DiffType::Equal => {
                        let op_length = std::cmp::min(
                            std::cmp::min(this_iter.peek_length(), other_iter.peek_length()),
                            length,
                        );
                        let this_op = this_iter.next(Some(op_length))?;
                        let other_op = other_iter.next(Some(op_length))?;

                        let content_equal = match (&this_op, &other_op) {
                            (Op::Insert { text: t1, .. }, Op::Insert { text: t2, .. }) => {
                                t1 == t2
                            }
                            (
                                Op::InsertEmbed { embed: e1, .. },
                                Op::InsertEmbed { embed: e2, .. },
                            ) => e1 == e2,
                            _ => false,
                        };

                        if content_equal {
                            let attr_diff =
                                AttributeMapOps::diff(this_op.attributes(), other_op.attributes());
                            result = result.retain(op_length, attr_diff);
                        } else {
                            result = result.push(other_op).delete(op_length);
                        }
                        length -= op_length;
                    }
                }
            }
        }

        Ok(result.chop())
    }

    /// Creates an inverted Delta that undoes this Delta's changes
    ///
    /// **[AMBIENT facade, not part of the core algebra]**: given `base`, the
    /// document this Delta was applied to, returns the Delta that restores
    /// `base` from `base.compose(self)`.
    pub fn invert(&self, base: &Delta) -> Result<Delta, Error> {
        let mut inverted = Delta::new();
        let mut base_index = 0;

        for op in &self.ops {
            match op {
                Op::Insert { .. } | Op::InsertEmbed { .. } => {
                    inverted = inverted.delete(op.length());
                }
                Op::Delete { length, .. } => {
                    let slice = base.slice(base_index, *length)?;
                    for base_op in slice.ops() {
                        inverted = inverted.push(base_op.clone());
                    }
                    base_index += length;
                }
                Op::Retain { length, attributes } => {
                    if attributes.is_none() {
                        inverted = inverted.retain(*length, None);
                    } else {
                        let slice = base.slice(base_index, *length)?;
                        for base_op in slice.ops() {
                            let inverted_attrs =
                                AttributeMapOps::invert(attributes.as_ref(), base_op.attributes());
                            inverted = inverted.retain(base_op.length(), inverted_attrs);
                        }
                    }
                    base_index += length;
                }
                Op::RetainEmbed { .. } => {
                    let slice = base.slice(base_index, 1)?;
                    if let Some(base_op) = slice.ops().first() {
                        let inverted_attrs =
                            AttributeMapOps::invert(op.attributes(), base_op.attributes());
                        match base_op {
                            Op::InsertEmbed { embed, .. } => {
                                inverted = inverted.retain_embed(
                                    embed.kind.clone(),
                                    embed.value.clone(),
                                    inverted_attrs,
                                );
                            }
                            _ => {
                                inverted = inverted.retain(1, inverted_attrs);
                            }
                        }
                    }
                    base_index += 1;
                }
            }
        }

        Ok(inverted.chop())
    }

    /// Converts a document Delta to plain text
    ///
    /// This method extracts only the text content from insert operations,
    /// ignoring all formatting. Embeds are represented as null characters.
    ///
    /// Note: This only works correctly for document Deltas (containing only inserts).
    fn to_text(&self) -> String {
        let mut result = String::new();
        for op in &self.ops {
            match op {
                Op::Insert { text, .. } => result.push_str(text),
                Op::InsertEmbed { .. } => result.push('\0'),
                _ => {}
            }
        }
        result
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_delta_construction() {
        let delta = Delta::new();
        assert!(delta.ops().is_empty());

        let delta = Delta::new()
            .insert("Hello", None)
            .unwrap()
            .insert(" ", None)
            .unwrap()
            .insert("World", None)
            .unwrap();

        assert_eq!(delta.ops().len(), 1);
        if let Op::Insert { text, .. } = &delta.ops()[0] {
            assert_eq!(text, "Hello World");
        } else {
            panic!("Expected insert operation");
        }
    }

    #[test]
    fn test_delta_attributes() {
        let mut attrs = BTreeMap::new();
        attrs.insert("bold".to_string(), AttributeValue::Boolean(true));

        let delta = Delta::new()
            .insert("Hello", Some(attrs.clone()))
            .unwrap()
            .insert("World", Some(attrs))
            .unwrap();

        assert_eq!(delta.ops().len(), 1);
        if let Op::Insert { text, attributes } = &delta.ops()[0] {
            assert_eq!(text, "HelloWorld");
            assert!(attributes.is_some());
        } else {
            panic!("Expected insert operation");
        }
    }

    #[test]
    fn test_delta_different_attributes() {
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));

        let mut italic = BTreeMap::new();
        italic.insert("italic".to_string(), AttributeValue::Boolean(true));

        let delta = Delta::new()
            .insert("Hello", Some(bold))
            .unwrap()
            .insert("World", Some(italic))
            .unwrap();

        assert_eq!(delta.ops().len(), 2);
    }

    #[test]
    fn test_delta_delete_merge() {
        let delta = Delta::new().delete(5).delete(3);

        assert_eq!(delta.ops().len(), 1);
        if let Op::Delete { length, .. } = delta.ops()[0] {
            assert_eq!(length, 8);
        } else {
            panic!("Expected delete operation");
        }
    }

    #[test]
    fn test_delta_insert_before_delete() {
        let delta = Delta::new().delete(5).insert("Hello", None).unwrap();

        assert_eq!(delta.ops().len(), 2);
        assert!(delta.ops()[0].is_insert());
        assert!(delta.ops()[1].is_delete());
    }

    #[test]
    fn test_delta_insert_before_delete_order_independent() {
        // compose(base, [retain, insert, delete]) must equal
        // compose(base, [retain, delete, insert]).
        let base = Delta::new().insert("Hello World", None).unwrap();
        let a = Delta::new()
            .retain(5, None)
            .insert("X", None)
            .unwrap()
            .delete(1)
            .retain(5, None);
        let b = Delta::new()
            .retain(5, None)
            .delete(1)
            .insert("X", None)
            .unwrap()
            .retain(5, None);
        assert_eq!(a.ops(), b.ops());
        assert_eq!(base.compose(&a).unwrap(), base.compose(&b).unwrap());
    }

    #[test]
    fn test_delta_length() {
        let delta = Delta::new()
            .insert("Hello", None)
            .unwrap()
            .retain(5, None)
            .delete(3);

        assert_eq!(delta.length(), 13);
    }

    #[test]
    fn test_delta_change_length() {
        let delta = Delta::new()
            .insert("Hello", None)
            .unwrap()
            .retain(5, None)
            .delete(3);

        assert_eq!(delta.change_length(), 2);
    }

    #[test]
    fn test_delta_slice() {
        let delta = Delta::new().insert("Hello World", None).unwrap();

        let sliced = delta.slice(0, 5).unwrap();
        assert_eq!(sliced.ops().len(), 1);
        if let Op::Insert { text, .. } = &sliced.ops()[0] {
            assert_eq!(text, "Hello");
        } else {
            panic!("Expected insert operation");
        }

        let sliced = delta.slice(6, usize::MAX - 6).unwrap();
        assert_eq!(sliced.ops().len(), 1);
        if let Op::Insert { text, .. } = &sliced.ops()[0] {
            assert_eq!(text, "World");
        } else {
            panic!("Expected insert operation");
        }
    }

    #[test]
    fn test_delta_slice_max_extends_cluster() {
        // A slice that lands mid-cluster extends to the grapheme boundary.
        let delta = Delta::new()
            .insert("01\u{1F6B5}\u{1F3FB}\u{200D}\u{2640}\u{FE0F}345", None)
            .unwrap();
        let sliced = delta.slice_max(1, 2).unwrap();
        assert_eq!(sliced.ops().len(), 1);
        if let Op::Insert { text, .. } = &sliced.ops()[0] {
            assert_eq!(text, "1\u{1F6B5}\u{1F3FB}\u{200D}\u{2640}\u{FE0F}");
        } else {
            panic!("Expected insert operation");
        }
    }

    #[test]
    fn test_delta_split() {
        let delta = Delta::new()
            .insert("Hello", None)
            .unwrap()
            .insert(" World", None)
            .unwrap();
        let (before, after) = delta
            .split(|op, index| {
                if index + op.length() <= 5 {
                    SplitPoint::Continue
                } else {
                    SplitPoint::At(5 - index)
                }
            })
            .unwrap();
        assert_eq!(before.length(), 5);
        assert_eq!(after.length(), 6);
        assert_eq!(before, Delta::new().insert("Hello", None).unwrap());
        assert_eq!(after, Delta::new().insert(" World", None).unwrap());
    }

    #[test]
    fn test_delta_chop() {
        let delta = Delta::new()
            .insert("Hello", None)
            .unwrap()
            .retain(5, None)
            .chop();

        assert_eq!(delta.ops().len(), 1);
        assert!(delta.ops()[0].is_insert());
    }

    #[test]
    fn test_delta_compact_is_idempotent() {
        // compacting an already-compact delta must return it unchanged
        let ops = vec![
            Op::Insert {
                text: "a".into(),
                attributes: None,
            },
            Op::Insert {
                text: "b".into(),
                attributes: None,
            },
            Op::Retain {
                length: 0,
                attributes: None,
            },
        ];
        let once = Delta::from_ops(ops).compact();
        let twice = once.compact();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_compose_null_attribute_realizes_removal() {
        // A null attribute value realizes as removal once composed in.
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));
        let a = Delta::new().insert("A", Some(bold)).unwrap();

        let mut remove_bold = BTreeMap::new();
        remove_bold.insert("bold".to_string(), AttributeValue::Null);
        let b = Delta::new().retain(1, Some(remove_bold));

        let result = a.compose(&b).unwrap();
        assert_eq!(result, Delta::new().insert("A", None).unwrap());
    }

    #[test]
    fn test_compose_insert_into_middle() {
        // An insert landing in the middle of existing text splits it.
        let a = Delta::new().insert("Hello", None).unwrap();
        let b = Delta::new().retain(3, None).insert("X", None).unwrap();
        let result = a.compose(&b).unwrap();
        assert_eq!(result, Delta::new().insert("HelXlo", None).unwrap());
    }

    #[test]
    fn test_compose_split_retains_carry_distinct_attrs() {
        // A retain straddling two differently-attributed
        // regions of `a` must split so each half keeps its own composed attrs.
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));
        let mut italic = BTreeMap::new();
        italic.insert("italic".to_string(), AttributeValue::Boolean(true));

        let a = Delta::new()
            .retain(2, Some(bold.clone()))
            .retain(2, Some(italic.clone()));
        let b = Delta::new().retain(4, None).insert("!", None).unwrap();

        let result = a.compose(&b).unwrap();
        let expected = Delta::new()
            .retain(2, Some(bold))
            .retain(2, Some(italic))
            .insert("!", None)
            .unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_compose_embed_attribute_merge() {
        // Composing attributes onto an embed merges rather than replaces.
        let mut width = BTreeMap::new();
        width.insert("width".to_string(), AttributeValue::String("300".into()));
        let a = Delta::new().insert_embed("image", json!("i.png"), Some(width));

        let mut height = BTreeMap::new();
        height.insert("height".to_string(), AttributeValue::String("200".into()));
        let b = Delta::new().retain(1, Some(height));

        let result = a.compose(&b).unwrap();
        let mut expected_attrs = BTreeMap::new();
        expected_attrs.insert("width".to_string(), AttributeValue::String("300".into()));
        expected_attrs.insert("height".to_string(), AttributeValue::String("200".into()));
        assert_eq!(
            result,
            Delta::new().insert_embed("image", json!("i.png"), Some(expected_attrs))
        );
    }

    #[test]
    fn test_compose_retain_past_end_is_clamped() {
        // A retain reaching past the end of the document is clamped.
        let a = Delta::new()
            .insert("Take the \u{1F48A}\u{1F48A}", None)
            .unwrap();
        let b = Delta::new().retain(10, None);
        let result = a.compose(&b).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn test_compose_retain_integer_over_retain_embed() {
        // An integer retain composed over a retain-embed adopts the embed.
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));
        let a = Delta::new().retain(10, Some(bold.clone()));
        let b = Delta::new().retain_embed("delta", json!({"ops": [{"insert": "b"}]}), None);

        let result = a.compose(&b).unwrap();
        let expected = Delta::new()
            .retain_embed("delta", json!({"ops": [{"insert": "b"}]}), Some(bold.clone()))
            .retain(9, Some(bold));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_transform_concurrent_inserts() {
        let change_a = Delta::new().insert("A", None).unwrap().retain(5, None);
        let change_b = Delta::new().insert("B", None).unwrap().retain(5, None);

        let transformed_b = change_a.transform(&change_b, true).unwrap();
        assert_eq!(
            transformed_b,
            Delta::new()
                .retain(1, None)
                .insert("B", None)
                .unwrap()
                .retain(5, None)
        );
    }

    #[test]
    fn test_transform_position_shifts_past_insert() {
        let delta = Delta::new().insert("Hello ", None).unwrap();
        assert_eq!(delta.transform_position(5, false), 11);
    }

    #[test]
    fn test_invert_roundtrips() {
        let base = Delta::new().insert("Hello World", None).unwrap();
        let change = Delta::new()
            .retain(6, None)
            .delete(5)
            .insert("Rust", None)
            .unwrap();
        let result = base.compose(&change).unwrap();
        let inverted = change.invert(&base).unwrap();
        let restored = result.compose(&inverted).unwrap();
        assert_eq!(restored, base);
    }

    #[test]
    fn test_diff_roundtrips() {
        let a = Delta::new().insert("Hello World", None).unwrap();
        let b = Delta::new().insert("Hello Rust", None).unwrap();
        let change = a.diff(&b).unwrap();
        assert_eq!(a.compose(&change).unwrap(), b);
    }

    #[test]
    fn test_embed_mismatch_is_reported() {
        let a = Delta::new().retain_embed("image", json!("a"), None);
        let b = Delta::new().retain_embed("video", json!("b"), None);
        let err = a.compose(&b).unwrap_err();
        assert!(matches!(err, Error::EmbedMismatch { .. }));
    }

    #[test]
    fn test_unknown_embed_type_is_reported() {
        let a = Delta::new().retain_embed("formula", json!("x^2"), None);
        let b = Delta::new().retain_embed("formula", json!("x^2+1"), None);
        let err = a.compose(&b).unwrap_err();
        assert!(matches!(err, Error::UnknownEmbedType { .. }));
    }

    #[test]
    fn test_compose_identity() {
        // P2: compose(a, []) equals a compacted; compose([], b) equals b compacted.
        let a = Delta::new()
            .insert("Hello", None)
            .unwrap()
            .retain(3, None)
            .delete(2);
        let empty = Delta::new();
        assert_eq!(a.compose(&empty).unwrap(), a.compact());
        assert_eq!(empty.compose(&a).unwrap(), a.compact());
    }

    #[test]
    fn test_transform_length_matches_surviving_territory() {
        // P3: length(transform(a, b, p)) equals b's insert lengths plus the
        // portion of b's retain/delete extent that survives a's deletes.
        let a = Delta::new().retain(2, None).delete(3).retain(5, None);
        let b = Delta::new().insert("Hi", None).unwrap().retain(10, None);
        let transformed = a.transform(&b, true).unwrap();
        // b inserts 2, and its 10-length retain territory overlaps a's
        // delete(3) at [2,5), so 3 of those 10 positions are removed by a.
        assert_eq!(transformed.length(), 2 + (10 - 3));
    }

    #[test]
    fn test_compose_associativity() {
        // P4: compose(compose(a, b), c) == compose(a, compose(b, c)).
        let a = Delta::new().insert("Hello World", None).unwrap();
        let b = Delta::new()
            .retain(6, None)
            .delete(5)
            .insert("Rust", None)
            .unwrap();
        let c = Delta::new().retain(4, None).insert("!", None).unwrap();

        let left = a.compose(&b).unwrap().compose(&c).unwrap();
        let right = a.compose(&b.compose(&c).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_slice_idempotence_within_bounds() {
        // P6: slice(slice(d, i, j), 0, j) == slice(d, i, j).
        let d = Delta::new().insert("Hello World", None).unwrap();
        let once = d.slice(2, 5).unwrap();
        let twice = once.slice(0, 5).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_push_equals_compact() {
        // P7: folding push over an arbitrary sequence equals compact(ops).
        let ops = vec![
            Op::Insert {
                text: "a".into(),
                attributes: None,
            },
            Op::Insert {
                text: "b".into(),
                attributes: None,
            },
            Op::Delete {
                length: 0,
                attributes: None,
            },
            Op::Retain {
                length: 3,
                attributes: None,
            },
            Op::Retain {
                length: 2,
                attributes: None,
            },
        ];
        let folded = ops.iter().cloned().fold(Delta::new(), Delta::push);
        let compacted = Delta::from_ops(ops).compact();
        assert_eq!(folded, compacted);
    }

    #[test]
    fn test_delta_wire_format_is_ops_object_not_bare_array() {
        let delta = Delta::new().insert("Gandalf", None).unwrap().delete(2);
        let value = serde_json::to_value(&delta).unwrap();
        assert_eq!(
            value,
            json!({"ops": [{"insert": "Gandalf"}, {"delete": 2}]})
        );
        let round_tripped: Delta = serde_json::from_value(value).unwrap();
        assert_eq!(round_tripped, delta);
    }

    #[test]
    fn test_nested_delta_embed_composes_recursively() {
        let a = Delta::new().retain_embed(
            "delta",
            serde_json::to_value(Delta::new().insert("a", None).unwrap()).unwrap(),
            None,
        );
        let b = Delta::new().retain_embed(
            "delta",
            serde_json::to_value(Delta::new().insert("b", None).unwrap()).unwrap(),
            None,
        );
        let result = a.compose(&b).unwrap();
        if let Op::RetainEmbed { embed, .. } = &result.ops()[0] {
            let nested: Delta = serde_json::from_value(embed.value.clone()).unwrap();
            assert_eq!(nested, Delta::new().insert("ab", None).unwrap());
        } else {
            panic!("expected retain embed");
        }
    }
}
