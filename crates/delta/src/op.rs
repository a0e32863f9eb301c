//! Operation types for the Delta format
//!
//! This module defines the fundamental operation types that make up a Delta:
//! - **Insert**: Add new content (text or embeds)
//! - **Delete**: Remove existing content
//! - **Retain**: Keep existing content, optionally modifying attributes
//!
//! Operations are the atomic units of change in the Delta format. They can be
//! combined, transformed, and inverted to support collaborative editing.

use crate::attributes::AttributeMap;
use crate::embed::Embed;
use crate::error::Error;
use crate::grapheme;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Represents a single operation in a Delta
///
/// Operations are the building blocks of the Delta format. Each operation
/// describes a specific action to perform on a document:
///
/// - **Insert operations** add new content
/// - **Delete operations** remove existing content
/// - **Retain operations** preserve existing content, optionally changing attributes
///
/// # Examples
///
/// ```rust
/// use quillai_delta::{Op, AttributeMap, AttributeValue};
/// use std::collections::BTreeMap;
///
/// // Insert plain text
/// let insert = Op::Insert {
///     text: "Hello world".to_string(),
///     attributes: None,
/// };
///
/// // Insert formatted text
/// let mut attrs = BTreeMap::new();
/// attrs.insert("bold".to_string(), AttributeValue::Boolean(true));
/// let formatted_insert = Op::Insert {
///     text: "Bold text".to_string(),
///     attributes: Some(attrs),
/// };
///
/// // Delete operation
/// let delete = Op::Delete {
///     length: 5,
///     attributes: None,
/// };
///
/// // Retain with attribute changes
/// let mut attrs = BTreeMap::new();
/// attrs.insert("italic".to_string(), AttributeValue::Boolean(true));
/// let retain = Op::Retain {
///     length: 10,
///     attributes: Some(attrs),
/// };
/// ```
///
/// `Serialize`/`Deserialize` are hand-written below rather than derived: the
/// wire format is the flat Quill Delta shape (`{"insert": "text", "attributes":
/// {...}}`, `{"retain": 3}`, `{"delete": 5}`), not the externally-tagged
/// `{"Insert": {"text": ..., "attributes": ...}}` a derive would produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Inserts new text content with optional formatting attributes
    ///
    /// The text is inserted at the current position in the document.
    /// Attributes define formatting like bold, italic, color, etc. Length
    /// is measured in extended grapheme clusters, not code points.
    Insert {
        /// The text content to insert
        text: String,
        /// Optional formatting attributes
        attributes: Option<AttributeMap>,
    },

    /// Inserts an embedded object with optional attributes
    ///
    /// Embeds represent non-text content like images or videos. They occupy
    /// exactly one character position in the document regardless of their
    /// internal content.
    InsertEmbed {
        /// The embed this operation inserts
        embed: Embed,
        /// Optional formatting attributes for the embed
        attributes: Option<AttributeMap>,
    },

    /// Deletes a specified number of characters
    ///
    /// The deletion starts at the current position and removes
    /// the specified number of characters forward. Attributes on a delete
    /// carry metadata about the removal itself (e.g. the author who
    /// requested it) rather than formatting; composition must not discard
    /// them (spec.md §4.4's `retain | delete -> delete(n, y.attrs)` row).
    Delete {
        /// The number of characters to delete
        length: usize,
        /// Optional metadata attached to the removal
        attributes: Option<AttributeMap>,
    },

    /// Retains existing characters, optionally modifying their attributes
    ///
    /// Retain operations preserve content while potentially changing
    /// its formatting. A retain without attributes is a no-op that
    /// simply advances the position.
    Retain {
        /// The number of characters to retain
        length: usize,
        /// Optional attribute changes to apply
        attributes: Option<AttributeMap>,
    },

    /// Retains an existing embed, optionally modifying its attributes
    ///
    /// The embed carried here is the one expected at the current position;
    /// composing or transforming against a different embed kind is an
    /// [`Error::EmbedMismatch`].
    RetainEmbed {
        /// The embed expected at the current position
        embed: Embed,
        /// Optional attribute changes to apply
        attributes: Option<AttributeMap>,
    },
}

fn attributes_to_json(attrs: &Option<AttributeMap>) -> Result<Option<JsonValue>, String> {
    match attrs {
        Some(a) if !a.is_empty() => {
            serde_json::to_value(a).map(Some).map_err(|e| e.to_string())
        }
        _ => Ok(None),
    }
}

fn attributes_from_json(value: Option<&JsonValue>) -> Result<Option<AttributeMap>, String> {
    match value {
        Some(v) => {
            let attrs: AttributeMap = serde_json::from_value(v.clone()).map_err(|e| e.to_string())?;
            Ok(if attrs.is_empty() { None } else { Some(attrs) })
        }
        None => Ok(None),
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serde_json::Map::new();
        let attrs = match self {
            Op::Insert { text, attributes } => {
                map.insert("insert".to_string(), JsonValue::String(text.clone()));
                attributes
            }
            Op::InsertEmbed { embed, attributes } => {
                let embed_value =
                    serde_json::to_value(embed).map_err(serde::ser::Error::custom)?;
                map.insert("insert".to_string(), embed_value);
                attributes
            }
            Op::Delete { length, attributes } => {
                map.insert("delete".to_string(), JsonValue::from(*length));
                attributes
            }
            Op::Retain { length, attributes } => {
                map.insert("retain".to_string(), JsonValue::from(*length));
                attributes
            }
            Op::RetainEmbed { embed, attributes } => {
                let embed_value =
                    serde_json::to_value(embed).map_err(serde::ser::Error::custom)?;
                map.insert("retain".to_string(), embed_value);
                attributes
            }
        };
        if let Some(attrs) = attributes_to_json(attrs).map_err(serde::ser::Error::custom)? {
            map.insert("attributes".to_string(), attrs);
        }
        JsonValue::Object(map).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| D::Error::custom("operation must be a JSON object"))?;
        let attributes =
            attributes_from_json(obj.get("attributes")).map_err(D::Error::custom)?;

        if let Some(v) = obj.get("insert") {
            return match v {
                JsonValue::String(text) => Ok(Op::Insert {
                    text: text.clone(),
                    attributes,
                }),
                JsonValue::Object(_) => {
                    let embed: Embed =
                        serde_json::from_value(v.clone()).map_err(D::Error::custom)?;
                    Ok(Op::InsertEmbed { embed, attributes })
                }
                _ => Err(D::Error::custom(
                    "\"insert\" must be a string or a single-key embed object",
                )),
            };
        }

        if let Some(v) = obj.get("retain") {
            return match v {
                JsonValue::Number(n) => {
                    let length = n.as_u64().ok_or_else(|| {
                        D::Error::custom("\"retain\" length must be a non-negative integer")
                    })?;
                    Ok(Op::Retain {
                        length: length as usize,
                        attributes,
                    })
                }
                JsonValue::Object(_) => {
                    let embed: Embed =
                        serde_json::from_value(v.clone()).map_err(D::Error::custom)?;
                    Ok(Op::RetainEmbed { embed, attributes })
                }
                _ => Err(D::Error::custom(
                    "\"retain\" must be an integer or a single-key embed object",
                )),
            };
        }

        if let Some(v) = obj.get("delete") {
            let length = v
                .as_u64()
                .ok_or_else(|| D::Error::custom("\"delete\" length must be a non-negative integer"))?;
            return Ok(Op::Delete {
                length: length as usize,
                attributes,
            });
        }

        Err(D::Error::custom(
            "operation must have exactly one of \"insert\", \"retain\", or \"delete\"",
        ))
    }
}

/// The action tag an operation carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Adds new content
    Insert,
    /// Preserves existing content, optionally re-attributing it
    Retain,
    /// Removes existing content
    Delete,
}

/// The kind of value an operation's action is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A scalar length (retain or delete)
    Integer,
    /// Unicode text (insert only)
    Text,
    /// A single-key embed map
    Embed,
}

/// The remainder produced by [`Op::take`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeRest {
    /// The remaining, possibly zero-length, portion of the operation
    Op(Op),
    /// The operation could not be split further (an embed taken whole)
    Indivisible,
}

/// The value carried by an operation under construction via [`Op::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpValue {
    /// Text for a `Insert`-text operation
    Text(String),
    /// A length for a `Retain` or `Delete` operation
    Integer(usize),
    /// An embed for an `Insert`-embed or `Retain`-embed operation
    Embed(Embed),
}

impl Op {
    /// Builds and validates an operation from its `(action, value)` pair
    ///
    /// Drops an empty attribute map down to `None`. Rejects a zero-length
    /// text insert carrying non-empty attributes and a zero-length
    /// `Retain`/`Delete` carrying non-empty attributes as
    /// [`Error::InvalidOperation`] — those shapes have no well-defined
    /// meaning and Quill's own `Delta#push` would otherwise silently drop
    /// the attributes rather than the caller ever finding out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] for the zero-length-with-attributes
    /// case described above, or when `action`/`value` are an invalid pairing
    /// (e.g. `Action::Insert` with `OpValue::Integer`).
    pub fn new(action: Action, value: OpValue, attributes: Option<AttributeMap>) -> Result<Op, Error> {
        let attributes = attributes.filter(|a| !a.is_empty());

        match (action, value) {
            (Action::Insert, OpValue::Text(text)) => {
                if text.is_empty() && attributes.is_some() {
                    return Err(Error::invalid_operation(
                        "zero-length insert cannot carry attributes",
                        None,
                    ));
                }
                Ok(Op::Insert { text, attributes })
            }
            (Action::Insert, OpValue::Embed(embed)) => Ok(Op::InsertEmbed { embed, attributes }),
            (Action::Retain, OpValue::Integer(length)) => {
                if length == 0 && attributes.is_some() {
                    return Err(Error::invalid_operation(
                        "zero-length retain cannot carry attributes",
                        None,
                    ));
                }
                Ok(Op::Retain { length, attributes })
            }
            (Action::Retain, OpValue::Embed(embed)) => Ok(Op::RetainEmbed { embed, attributes }),
            (Action::Delete, OpValue::Integer(length)) => {
                if length == 0 && attributes.is_some() {
                    return Err(Error::invalid_operation(
                        "zero-length delete cannot carry attributes",
                        None,
                    ));
                }
                Ok(Op::Delete { length, attributes })
            }
            (action, value) => Err(Error::invalid_operation(
                format!("{action:?} is not a valid action for this value"),
                match value {
                    OpValue::Text(text) => Some(Op::Insert {
                        text,
                        attributes: None,
                    }),
                    OpValue::Embed(embed) => Some(Op::InsertEmbed {
                        embed,
                        attributes: None,
                    }),
                    OpValue::Integer(length) => Some(Op::Retain {
                        length,
                        attributes: None,
                    }),
                },
            )),
        }
    }

    /// Calculates the length of content affected by this operation
    ///
    /// - Text operations count extended grapheme clusters, not code points
    /// - Embeds always have length 1
    /// - Delete and retain use their explicit length values
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quillai_delta::Op;
    ///
    /// let insert = Op::Insert {
    ///     text: "Hello".to_string(),
    ///     attributes: None,
    /// };
    /// assert_eq!(insert.length(), 5);
    ///
    /// let delete = Op::Delete { length: 10, attributes: None };
    /// assert_eq!(delete.length(), 10);
    /// ```
    pub fn length(&self) -> usize {
        match self {
            Op::Insert { text, .. } => grapheme::length(text),
            Op::InsertEmbed { .. } => 1,
            Op::Delete { length, .. } => *length,
            Op::Retain { length, .. } => *length,
            Op::RetainEmbed { .. } => 1,
        }
    }

    /// Returns a reference to the operation's attributes if present
    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Op::Insert { attributes, .. }
            | Op::InsertEmbed { attributes, .. }
            | Op::Delete { attributes, .. }
            | Op::Retain { attributes, .. }
            | Op::RetainEmbed { attributes, .. } => attributes.as_ref(),
        }
    }

    /// Returns a mutable reference to the operation's attributes if present
    pub fn attributes_mut(&mut self) -> Option<&mut AttributeMap> {
        match self {
            Op::Insert { attributes, .. }
            | Op::InsertEmbed { attributes, .. }
            | Op::Delete { attributes, .. }
            | Op::Retain { attributes, .. }
            | Op::RetainEmbed { attributes, .. } => attributes.as_mut(),
        }
    }

    /// Returns true iff a non-empty attribute map is attached
    pub fn has_attributes(&self) -> bool {
        self.attributes().is_some_and(|a| !a.is_empty())
    }

    /// Creates a new operation with the specified attributes
    ///
    /// This consumes the operation and returns a new one with the given
    /// attributes. An empty map is normalized to `None`.
    pub fn with_attributes(mut self, attrs: AttributeMap) -> Self {
        let attrs = if attrs.is_empty() { None } else { Some(attrs) };
        match &mut self {
            Op::Insert { attributes, .. }
            | Op::InsertEmbed { attributes, .. }
            | Op::Delete { attributes, .. }
            | Op::Retain { attributes, .. }
            | Op::RetainEmbed { attributes, .. } => {
                *attributes = attrs;
            }
        }
        self
    }

    /// Checks if this operation inserts new content
    pub fn is_insert(&self) -> bool {
        matches!(self, Op::Insert { .. } | Op::InsertEmbed { .. })
    }

    /// Checks if this operation deletes content
    pub fn is_delete(&self) -> bool {
        matches!(self, Op::Delete { .. })
    }

    /// Checks if this operation retains existing content
    pub fn is_retain(&self) -> bool {
        matches!(self, Op::Retain { .. } | Op::RetainEmbed { .. })
    }

    /// Classifies this operation as an `(action, kind)` pair
    ///
    /// The pairwise stepper dispatches on this classification rather than
    /// matching on `Op` variants directly, so the compose/transform tables
    /// read as one arm per `(action, kind)` row.
    pub fn info(&self) -> (Action, Kind) {
        match self {
            Op::Insert { .. } => (Action::Insert, Kind::Text),
            Op::InsertEmbed { .. } => (Action::Insert, Kind::Embed),
            Op::Retain { .. } => (Action::Retain, Kind::Integer),
            Op::RetainEmbed { .. } => (Action::Retain, Kind::Embed),
            Op::Delete { .. } => (Action::Delete, Kind::Integer),
        }
    }

    /// Tests this operation's `(action, kind)` classification
    ///
    /// `kind` of `None` matches any value kind for the given action.
    pub fn is(&self, action: Action, kind: Option<Kind>) -> bool {
        let (a, k) = self.info();
        a == action && kind.is_none_or(|k2| k == k2)
    }

    /// Returns the operation type as a string
    ///
    /// This is primarily used for debugging and logging purposes.
    pub fn op_type(&self) -> &'static str {
        match self {
            Op::Insert { .. } => "insert",
            Op::InsertEmbed { .. } => "insert_embed",
            Op::Delete { .. } => "delete",
            Op::Retain { .. } => "retain",
            Op::RetainEmbed { .. } => "retain_embed",
        }
    }

    /// Trims `n` length units from the front of this operation
    ///
    /// Returns the taken prefix and what remains: `TakeRest::Op` for a
    /// (possibly zero-length) remainder, or `TakeRest::Indivisible` when an
    /// embed was consumed whole. Attributes are duplicated onto both halves;
    /// callers that only want one side discard the other.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if `n` exceeds [`Op::length`] —
    /// the stepper guarantees `n = min(size(a), size(b))`, so this should
    /// never trigger in ordinary use.
    pub fn take(&self, n: usize) -> Result<(Op, TakeRest), Error> {
        let size = self.length();
        if n > size {
            return Err(Error::invalid_operation(
                format!("take({n}) exceeds operation length {size}"),
                Some(self.clone()),
            ));
        }

        match self {
            Op::Insert { text, attributes } => {
                let (left, right) = grapheme::split(text, n);
                Ok((
                    Op::Insert {
                        text: left,
                        attributes: attributes.clone(),
                    },
                    TakeRest::Op(Op::Insert {
                        text: right,
                        attributes: attributes.clone(),
                    }),
                ))
            }
            Op::Delete { attributes, .. } => Ok((
                Op::Delete {
                    length: n,
                    attributes: attributes.clone(),
                },
                TakeRest::Op(Op::Delete {
                    length: size - n,
                    attributes: attributes.clone(),
                }),
            )),
            Op::Retain { attributes, .. } => Ok((
                Op::Retain {
                    length: n,
                    attributes: attributes.clone(),
                },
                TakeRest::Op(Op::Retain {
                    length: size - n,
                    attributes: attributes.clone(),
                }),
            )),
            Op::InsertEmbed { attributes, .. } => {
                if n == 0 {
                    Ok((
                        Op::Insert {
                            text: String::new(),
                            attributes: attributes.clone(),
                        },
                        TakeRest::Op(self.clone()),
                    ))
                } else {
                    Ok((self.clone(), TakeRest::Indivisible))
                }
            }
            Op::RetainEmbed { attributes, .. } => {
                if n == 0 {
                    Ok((
                        Op::Retain {
                            length: 0,
                            attributes: attributes.clone(),
                        },
                        TakeRest::Op(self.clone()),
                    ))
                } else {
                    Ok((self.clone(), TakeRest::Indivisible))
                }
            }
        }
    }

    /// Like [`Op::take`], but for text inserts the left piece is extended to
    /// the next grapheme boundary rather than cut exactly at `n`, used by
    /// [`crate::delta::Delta::slice_max`].
    ///
    /// Unlike `take`, `n` may exceed [`Op::length`]: a text insert just
    /// returns itself whole, matching `take_max`'s "if `n` meets or exceeds
    /// the grapheme count, return the whole string" rule. Non-text
    /// operations have no cluster concept, so this falls back to `take`.
    pub fn take_max(&self, n: usize) -> Result<(Op, TakeRest), Error> {
        if let Op::Insert { text, attributes } = self {
            let left = grapheme::take_max(text, n);
            let left_len = grapheme::length(&left);
            let (left, right) = grapheme::split(text, left_len);
            return Ok((
                Op::Insert {
                    text: left,
                    attributes: attributes.clone(),
                },
                TakeRest::Op(Op::Insert {
                    text: right,
                    attributes: attributes.clone(),
                }),
            ));
        }
        self.take(n.min(self.length()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_op_length() {
        let insert_text = Op::Insert {
            text: "Hello".to_string(),
            attributes: None,
        };
        assert_eq!(insert_text.length(), 5);

        let insert_embed = Op::InsertEmbed {
            embed: Embed::new("image", json!("url")),
            attributes: None,
        };
        assert_eq!(insert_embed.length(), 1);

        let delete = Op::Delete {
            length: 10,
            attributes: None,
        };
        assert_eq!(delete.length(), 10);

        let retain = Op::Retain {
            length: 7,
            attributes: None,
        };
        assert_eq!(retain.length(), 7);

        let retain_embed = Op::RetainEmbed {
            embed: Embed::new("video", json!("url")),
            attributes: None,
        };
        assert_eq!(retain_embed.length(), 1);
    }

    #[test]
    fn test_op_attributes() {
        let mut attrs = BTreeMap::new();
        attrs.insert("bold".to_string(), AttributeValue::Boolean(true));

        let op = Op::Insert {
            text: "text".to_string(),
            attributes: Some(attrs.clone()),
        };

        assert_eq!(op.attributes(), Some(&attrs));
        assert!(op.is_insert());
        assert!(!op.is_delete());
        assert!(!op.is_retain());
    }

    #[test]
    fn test_op_type_checks() {
        let insert = Op::Insert {
            text: "test".to_string(),
            attributes: None,
        };
        assert!(insert.is_insert());
        assert_eq!(insert.op_type(), "insert");
        assert!(insert.is(Action::Insert, Some(Kind::Text)));
        assert!(!insert.is(Action::Insert, Some(Kind::Embed)));
        assert!(insert.is(Action::Insert, None));

        let delete = Op::Delete {
            length: 5,
            attributes: None,
        };
        assert!(delete.is_delete());
        assert_eq!(delete.op_type(), "delete");

        let retain = Op::Retain {
            length: 3,
            attributes: None,
        };
        assert!(retain.is_retain());
        assert_eq!(retain.op_type(), "retain");
    }

    #[test]
    fn test_take_splits_text_on_grapheme_boundary() {
        let op = Op::Insert {
            text: "Hello".to_string(),
            attributes: None,
        };
        let (left, rest) = op.take(2).unwrap();
        assert_eq!(
            left,
            Op::Insert {
                text: "He".into(),
                attributes: None
            }
        );
        assert_eq!(
            rest,
            TakeRest::Op(Op::Insert {
                text: "llo".into(),
                attributes: None
            })
        );
    }

    #[test]
    fn test_take_embed_at_full_length_is_indivisible() {
        let op = Op::InsertEmbed {
            embed: Embed::new("image", json!("url")),
            attributes: None,
        };
        let (left, rest) = op.take(1).unwrap();
        assert_eq!(left, op);
        assert_eq!(rest, TakeRest::Indivisible);
    }

    #[test]
    fn test_take_embed_at_zero_returns_self_as_rest() {
        let op = Op::RetainEmbed {
            embed: Embed::new("image", json!("url")),
            attributes: None,
        };
        let (left, rest) = op.take(0).unwrap();
        assert_eq!(
            left,
            Op::Retain {
                length: 0,
                attributes: None
            }
        );
        assert_eq!(rest, TakeRest::Op(op));
    }

    #[test]
    fn test_take_beyond_length_errors() {
        let op = Op::Delete {
            length: 3,
            attributes: None,
        };
        let err = op.take(5).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
    }

    #[test]
    fn test_take_max_keeps_zwj_cluster_whole() {
        let op = Op::Insert {
            text: "01\u{1F6B5}\u{1F3FB}\u{200D}\u{2640}\u{FE0F}345".to_string(),
            attributes: None,
        };
        let (left, rest) = op.take_max(3).unwrap();
        if let Op::Insert { text, .. } = &left {
            assert_eq!(crate::grapheme::length(text), 3);
            assert!(text.starts_with("01"));
        } else {
            panic!("expected insert");
        }
        if let TakeRest::Op(Op::Insert { text, .. }) = &rest {
            assert_eq!(text, "345");
        } else {
            panic!("expected insert remainder");
        }
    }

    #[test]
    fn test_take_max_n_beyond_length_returns_whole_string() {
        let op = Op::Insert {
            text: "hi".to_string(),
            attributes: None,
        };
        let (left, rest) = op.take_max(50).unwrap();
        assert_eq!(left, op);
        assert_eq!(
            rest,
            TakeRest::Op(Op::Insert {
                text: String::new(),
                attributes: None
            })
        );
    }

    #[test]
    fn test_insert_wire_format_matches_quill() {
        let op = Op::Insert {
            text: "Gandalf".to_string(),
            attributes: None,
        };
        assert_eq!(serde_json::to_value(&op).unwrap(), json!({"insert": "Gandalf"}));

        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));
        let op = Op::Insert {
            text: "Gandalf".to_string(),
            attributes: Some(bold),
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"insert": "Gandalf", "attributes": {"bold": true}})
        );
    }

    #[test]
    fn test_retain_and_delete_wire_format_omit_attributes_field_when_absent() {
        let retain = Op::Retain {
            length: 3,
            attributes: None,
        };
        assert_eq!(serde_json::to_value(&retain).unwrap(), json!({"retain": 3}));

        let delete = Op::Delete {
            length: 4,
            attributes: None,
        };
        assert_eq!(serde_json::to_value(&delete).unwrap(), json!({"delete": 4}));
    }

    #[test]
    fn test_embed_wire_format_is_single_key_map() {
        let op = Op::InsertEmbed {
            embed: Embed::new("image", json!({"url": "i.png"})),
            attributes: None,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"insert": {"image": {"url": "i.png"}}})
        );

        let op = Op::RetainEmbed {
            embed: Embed::new("image", json!({"url": "i.png"})),
            attributes: None,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"retain": {"image": {"url": "i.png"}}})
        );
    }

    #[test]
    fn test_op_wire_format_round_trips() {
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));
        let ops = vec![
            Op::Insert {
                text: "Hello".to_string(),
                attributes: Some(bold),
            },
            Op::InsertEmbed {
                embed: Embed::new("image", json!("i.png")),
                attributes: None,
            },
            Op::Retain {
                length: 3,
                attributes: None,
            },
            Op::RetainEmbed {
                embed: Embed::new("delta", json!({"ops": [{"insert": "a"}]})),
                attributes: None,
            },
            Op::Delete {
                length: 2,
                attributes: None,
            },
        ];
        for op in ops {
            let value = serde_json::to_value(&op).unwrap();
            let round_tripped: Op = serde_json::from_value(value).unwrap();
            assert_eq!(round_tripped, op);
        }
    }

    #[test]
    fn test_op_deserialize_rejects_op_with_no_discriminant_key() {
        let err = serde_json::from_value::<Op>(json!({"foo": 1})).unwrap_err();
        assert!(err.to_string().contains("insert"));
    }
}
