//! Operation iterator for efficient Delta traversal
//!
//! This module provides the [`OpIterator`] struct, which enables efficient
//! traversal and slicing of Delta operations. The iterator is particularly
//! useful for implementing compose, transform, and diff operations where
//! you need to process operations in parallel while potentially splitting
//! them into smaller chunks.
//!
//! # Key Features
//!
//! - **Partial consumption**: Operations can be consumed partially, allowing
//!   precise control over how much of each operation to process
//! - **Peeking**: Look ahead at the next operation without consuming it
//! - **Grapheme-aware slicing**: splitting routes through [`Op::take`], so a
//!   text operation is never cut inside a grapheme cluster
//! - **Infinite retain**: Returns infinite retain when exhausted, simplifying
//!   compose/transform algorithms

use crate::error::Error;
use crate::op::{Op, TakeRest};

/// An iterator for traversing and slicing Delta operations
///
/// `OpIterator` maintains internal state to track position within operations,
/// allowing partial consumption of operations. This is essential for algorithms
/// like compose and transform that need to process operations in lockstep.
///
/// # Design
///
/// The iterator tracks:
/// - `ops`: The vector of operations to iterate over
/// - `index`: The index one past the last op already pulled into `pending`
/// - `pending`: The unconsumed remainder of the most recently pulled op, if any
///
/// When an operation is partially consumed, `pending` holds what's left and
/// is served on the next call instead of pulling from `ops` again.
///
/// # Examples
///
/// ```rust
/// use quillai_delta::{Op, OpIterator};
///
/// let ops = vec![
///     Op::Insert { text: "Hello World".to_string(), attributes: None },
///     Op::Retain { length: 5, attributes: None },
/// ];
///
/// let mut iter = OpIterator::new(&ops);
///
/// // Consume first 5 characters of the insert
/// let partial = iter.next(Some(5)).unwrap();
/// // Returns: Insert { text: "Hello", attributes: None }
///
/// // Consume the rest
/// let rest = iter.next(None).unwrap();
/// // Returns: Insert { text: " World", attributes: None }
/// ```
#[derive(Debug, Clone)]
pub struct OpIterator {
    ops: Vec<Op>,
    index: usize,
    pending: Option<Op>,
}

impl OpIterator {
    /// Creates a new iterator from a slice of operations
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![
    ///     Op::Insert { text: "Hello".to_string(), attributes: None },
    ///     Op::Delete { length: 5, attributes: None },
    /// ];
    /// let iter = OpIterator::new(&ops);
    /// ```
    pub fn new(ops: &[Op]) -> Self {
        Self {
            ops: ops.to_vec(),
            index: 0,
            pending: None,
        }
    }

    /// Checks if there are more operations to process
    ///
    /// Returns `false` when all operations have been consumed.
    /// Note that the iterator returns infinite retain operations
    /// when exhausted, so `next()` will always return something.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![Op::Delete { length: 5, attributes: None }];
    /// let mut iter = OpIterator::new(&ops);
    ///
    /// assert!(iter.has_next());
    /// iter.next(None).unwrap();
    /// assert!(!iter.has_next());
    /// ```
    pub fn has_next(&self) -> bool {
        self.peek_length() < usize::MAX
    }

    /// Consumes and returns the next operation or portion thereof
    ///
    /// If a length is specified and the current operation is longer,
    /// only that length is consumed and the remainder is saved for
    /// the next call. When the iterator is exhausted, it returns
    /// infinite retain operations.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::InvalidOperation`] from the underlying
    /// [`Op::take`] call; this should not occur since `length` is always
    /// clamped to at most the current operation's length by callers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![Op::Insert { text: "Hello".to_string(), attributes: None }];
    /// let mut iter = OpIterator::new(&ops);
    ///
    /// // Consume only 2 characters
    /// let partial = iter.next(Some(2)).unwrap();
    /// if let Op::Insert { text, .. } = partial {
    ///     assert_eq!(text, "He");
    /// }
    ///
    /// // Consume the rest
    /// let rest = iter.next(None).unwrap();
    /// if let Op::Insert { text, .. } = rest {
    ///     assert_eq!(text, "llo");
    /// }
    /// ```
    pub fn next(&mut self, length: Option<usize>) -> Result<Op, Error> {
        let length = length.unwrap_or(usize::MAX);

        let op = match self.pending.take() {
            Some(op) => op,
            None => match self.ops.get(self.index) {
                Some(op) => {
                    self.index += 1;
                    op.clone()
                }
                None => {
                    // Exhausted: synthesize an infinite retain, sized to
                    // whatever was requested rather than `usize::MAX` itself.
                    // Stepper rules read `.length()` straight off the
                    // returned op, so it must match the request; `pending`
                    // stays untouched so `has_next()` keeps reading
                    // `usize::MAX` as "truly exhausted" on the next call.
                    return Ok(Op::Retain {
                        length,
                        attributes: None,
                    });
                }
            },
        };

        let op_length = op.length();
        if length >= op_length {
            Ok(op)
        } else {
            match op.take(length)? {
                (left, TakeRest::Op(rest)) => {
                    self.pending = Some(rest);
                    Ok(left)
                }
                (left, TakeRest::Indivisible) => {
                    // An embed has length 1; `length < op_length` here means
                    // `length == 0`, which `Op::take` always reports as a
                    // zero-length remainder, never `Indivisible`.
                    self.pending = Some(op);
                    Ok(left)
                }
            }
        }
    }

    /// Like [`OpIterator::next`], but text inserts are split with
    /// [`Op::take_max`] instead of [`Op::take`] — used by
    /// [`crate::delta::Delta::slice_max`] so a straddling grapheme cluster at
    /// the right edge is kept whole rather than cut.
    pub fn next_max(&mut self, length: Option<usize>) -> Result<Op, Error> {
        let length = length.unwrap_or(usize::MAX);

        let op = match self.pending.take() {
            Some(op) => op,
            None => match self.ops.get(self.index) {
                Some(op) => {
                    self.index += 1;
                    op.clone()
                }
                None => {
                    // Exhausted: synthesize an infinite retain, sized to
                    // whatever was requested rather than `usize::MAX` itself.
                    // Stepper rules read `.length()` straight off the
                    // returned op, so it must match the request; `pending`
                    // stays untouched so `has_next()` keeps reading
                    // `usize::MAX` as "truly exhausted" on the next call.
                    return Ok(Op::Retain {
                        length,
                        attributes: None,
                    });
                }
            },
        };

        let op_length = op.length();
        if length >= op_length {
            Ok(op)
        } else {
            match op.take_max(length)? {
                (left, TakeRest::Op(rest)) => {
                    self.pending = Some(rest);
                    Ok(left)
                }
                (left, TakeRest::Indivisible) => {
                    self.pending = Some(op);
                    Ok(left)
                }
            }
        }
    }

    /// Peeks at the current operation without consuming it
    ///
    /// Returns `None` if the iterator is exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![Op::Delete { length: 5, attributes: None }];
    /// let iter = OpIterator::new(&ops);
    ///
    /// // Peek doesn't consume
    /// assert!(iter.peek().is_some());
    /// assert!(iter.peek().is_some());
    /// ```
    pub fn peek(&self) -> Option<&Op> {
        self.pending.as_ref().or_else(|| self.ops.get(self.index))
    }

    /// Returns the remaining length of the current operation
    ///
    /// If the iterator is exhausted, returns `usize::MAX` to indicate
    /// infinite length (used for compose/transform algorithms).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![Op::Insert { text: "Hello".to_string(), attributes: None }];
    /// let mut iter = OpIterator::new(&ops);
    ///
    /// assert_eq!(iter.peek_length(), 5);
    /// iter.next(Some(2)).unwrap();
    /// assert_eq!(iter.peek_length(), 3); // "llo" remaining
    /// ```
    pub fn peek_length(&self) -> usize {
        self.peek().map(Op::length).unwrap_or(usize::MAX)
    }

    /// Returns the type of the current operation as a string
    ///
    /// Returns "retain" if the iterator is exhausted (matching the
    /// behavior of returning infinite retains).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![
    ///     Op::Insert { text: "Hi".to_string(), attributes: None },
    ///     Op::Delete { length: 3, attributes: None },
    /// ];
    /// let mut iter = OpIterator::new(&ops);
    ///
    /// assert_eq!(iter.peek_type(), "insert");
    /// iter.next(None).unwrap();
    /// assert_eq!(iter.peek_type(), "delete");
    /// iter.next(None).unwrap();
    /// assert_eq!(iter.peek_type(), "retain"); // exhausted
    /// ```
    pub fn peek_type(&self) -> &'static str {
        self.peek().map(Op::op_type).unwrap_or("retain")
    }

    /// True if the current operation is an insert (text or embed)
    ///
    /// Unlike comparing `peek_type()` to the literal `"insert"`, this also
    /// matches `InsertEmbed`, which reports its own distinct type string —
    /// the stepper needs to treat both uniformly wherever its dispatch
    /// tables say "insert".
    pub fn peek_is_insert(&self) -> bool {
        self.peek().is_some_and(Op::is_insert)
    }

    /// True if the current operation is a delete
    pub fn peek_is_delete(&self) -> bool {
        self.peek().is_some_and(Op::is_delete)
    }

    /// Consumes the iterator and returns all remaining operations
    ///
    /// If the current operation has been partially consumed, the
    /// remaining portion is included as the first element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::{Op, OpIterator};
    ///
    /// let ops = vec![
    ///     Op::Insert { text: "Hello".to_string(), attributes: None },
    ///     Op::Delete { length: 5, attributes: None },
    /// ];
    /// let mut iter = OpIterator::new(&ops);
    ///
    /// // Partially consume first op
    /// iter.next(Some(2)).unwrap();
    ///
    /// let rest = iter.rest();
    /// assert_eq!(rest.len(), 2); // "llo" + Delete(5)
    /// ```
    pub fn rest(&mut self) -> Vec<Op> {
        if !self.has_next() {
            return Vec::new();
        }

        let mut result = Vec::new();
        if let Some(op) = self.pending.take() {
            result.push(op);
        }
        result.extend_from_slice(&self.ops[self.index..]);
        self.index = self.ops.len();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_iterator_basic() {
        let ops = vec![
            Op::Insert {
                text: "Hello".to_string(),
                attributes: None,
            },
            Op::Retain {
                length: 3,
                attributes: None,
            },
            Op::Delete {
                length: 2,
                attributes: None,
            },
        ];

        let mut iter = OpIterator::new(&ops);

        assert!(iter.has_next());
        assert_eq!(iter.peek_type(), "insert");
        assert_eq!(iter.peek_length(), 5);

        let first = iter.next(None).unwrap();
        if let Op::Insert { text, .. } = first {
            assert_eq!(text, "Hello");
        } else {
            panic!("Expected insert operation");
        }

        assert_eq!(iter.peek_type(), "retain");
        assert_eq!(iter.peek_length(), 3);

        let second = iter.next(None).unwrap();
        if let Op::Retain { length, .. } = second {
            assert_eq!(length, 3);
        } else {
            panic!("Expected retain operation");
        }

        assert_eq!(iter.peek_type(), "delete");
        let third = iter.next(None).unwrap();
        if let Op::Delete { length, .. } = third {
            assert_eq!(length, 2);
        } else {
            panic!("Expected delete operation");
        }

        assert!(!iter.has_next());
    }

    #[test]
    fn test_op_iterator_slicing() {
        let ops = vec![Op::Insert {
            text: "Hello World".to_string(),
            attributes: None,
        }];

        let mut iter = OpIterator::new(&ops);

        let first = iter.next(Some(5)).unwrap();
        if let Op::Insert { text, .. } = first {
            assert_eq!(text, "Hello");
        } else {
            panic!("Expected insert operation");
        }

        assert_eq!(iter.peek_length(), 6); // " World" remaining

        let second = iter.next(None).unwrap();
        if let Op::Insert { text, .. } = second {
            assert_eq!(text, " World");
        } else {
            panic!("Expected insert operation");
        }

        assert!(!iter.has_next());
    }

    #[test]
    fn test_op_iterator_rest() {
        let ops = vec![
            Op::Insert {
                text: "Hello".to_string(),
                attributes: None,
            },
            Op::Retain {
                length: 3,
                attributes: None,
            },
        ];

        let mut iter = OpIterator::new(&ops);
        iter.next(None).unwrap();

        let rest = iter.rest();
        assert_eq!(rest.len(), 1);
        if let Op::Retain { length, .. } = &rest[0] {
            assert_eq!(*length, 3);
        } else {
            panic!("Expected retain operation");
        }
    }

    #[test]
    fn test_op_iterator_partial_rest() {
        let ops = vec![Op::Insert {
            text: "Hello World".to_string(),
            attributes: None,
        }];

        let mut iter = OpIterator::new(&ops);
        iter.next(Some(5)).unwrap();

        let rest = iter.rest();
        assert_eq!(rest.len(), 1);
        if let Op::Insert { text, .. } = &rest[0] {
            assert_eq!(text, " World");
        } else {
            panic!("Expected insert operation");
        }
    }

    #[test]
    fn test_peek_is_insert_matches_embeds_too() {
        use crate::embed::Embed;
        use serde_json::json;

        let ops = vec![Op::InsertEmbed {
            embed: Embed::new("image", json!("url")),
            attributes: None,
        }];
        let iter = OpIterator::new(&ops);
        assert!(iter.peek_is_insert());
        assert!(!iter.peek_is_delete());
    }

    #[test]
    fn test_next_max_extends_past_requested_length() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let ops = vec![Op::Insert {
            text: format!("a{family}b"),
            attributes: None,
        }];
        let mut iter = OpIterator::new(&ops);
        iter.next(Some(1)).unwrap();
        // Requesting 1 more grapheme lands mid-cluster; next_max extends to
        // include the whole family emoji instead of truncating it.
        let piece = iter.next_max(Some(1)).unwrap();
        if let Op::Insert { text, .. } = piece {
            assert_eq!(text, family);
        } else {
            panic!("expected insert");
        }
    }

    #[test]
    fn test_op_iterator_does_not_split_grapheme_cluster() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let ops = vec![Op::Insert {
            text: format!("a{family}b"),
            attributes: None,
        }];

        let mut iter = OpIterator::new(&ops);
        let first = iter.next(Some(2)).unwrap();
        if let Op::Insert { text, .. } = first {
            assert_eq!(text, format!("a{family}"));
        } else {
            panic!("Expected insert operation");
        }
    }
}
