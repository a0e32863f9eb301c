//! Pairwise compose/transform dispatch tables
//!
//! Given two already-trimmed operation slices of equal length (or a length-1
//! embed slice on one or both sides), [`compose_step`] and [`transform_step`]
//! implement the two `(action, kind)` dispatch tables as pattern matches.
//! Callers (the sequence engine in `delta.rs`) are responsible for trimming
//! heads to a common length with [`Op::take`] and for front-loading the
//! degenerate cases — `y` is an insert, or `x` is a delete — before reaching
//! these functions.

use crate::attributes::AttributeMapOps;
use crate::embed::{lookup_embed_handler, Embed};
use crate::error::Error;
use crate::op::Op;

fn same_kind_embeds<'a>(x: &'a Embed, y: &'a Embed) -> Result<&'a str, Error> {
    if x.kind == y.kind {
        Ok(&x.kind)
    } else {
        Err(Error::embed_mismatch(x.kind.clone(), y.kind.clone()))
    }
}

/// One step of the composition table
///
/// `x` and `y` must already be trimmed to the same length by the caller
/// (`n = min(size(x), size(y))`); an insert `y` or a delete `x` must be
/// handled by the caller before calling this — see the module docs.
pub fn compose_step(x: &Op, y: &Op, length: usize) -> Result<Option<Op>, Error> {
    tracing::trace!(x = x.op_type(), y = y.op_type(), length, "compose_step");
    match y {
        Op::Delete {
            attributes: y_attrs,
            ..
        } => match x {
            Op::Insert { .. } | Op::InsertEmbed { .. } => Ok(None),
            Op::Retain { .. } => Ok(Some(Op::Delete {
                length,
                attributes: y_attrs.clone(),
            })),
            Op::RetainEmbed { .. } => Ok(Some(Op::Delete {
                length: 1,
                attributes: y_attrs.clone(),
            })),
            Op::Delete {
                attributes: x_attrs,
                ..
            } => Ok(Some(Op::Delete {
                length,
                attributes: x_attrs.clone(),
            })),
        },
        Op::Retain {
            attributes: y_attrs,
            ..
        } => compose_retain_integer(x, y_attrs.as_ref()),
        Op::RetainEmbed {
            embed: y_embed,
            attributes: y_attrs,
        } => compose_retain_embed(x, y_embed, y_attrs.as_ref()),
        Op::Insert { .. } | Op::InsertEmbed { .. } => {
            unreachable!("caller must front-load an insert y before calling compose_step")
        }
    }
}

fn compose_retain_integer(
    x: &Op,
    y_attrs: Option<&crate::attributes::AttributeMap>,
) -> Result<Option<Op>, Error> {
    match x {
        Op::Insert {
            text,
            attributes: x_attrs,
        } => Ok(Some(Op::Insert {
            text: text.clone(),
            attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, false),
        })),
        Op::InsertEmbed {
            embed,
            attributes: x_attrs,
        } => Ok(Some(Op::InsertEmbed {
            embed: embed.clone(),
            attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, false),
        })),
        Op::Retain {
            length,
            attributes: x_attrs,
        } => Ok(Some(Op::Retain {
            length: *length,
            attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, true),
        })),
        Op::RetainEmbed {
            embed,
            attributes: x_attrs,
        } => Ok(Some(Op::RetainEmbed {
            embed: embed.clone(),
            attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, false),
        })),
        Op::Delete { length, attributes } => Ok(Some(Op::Delete {
            length: *length,
            attributes: attributes.clone(),
        })),
    }
}

fn compose_retain_embed(
    x: &Op,
    y_embed: &Embed,
    y_attrs: Option<&crate::attributes::AttributeMap>,
) -> Result<Option<Op>, Error> {
    match x {
        Op::Insert {
            text,
            attributes: x_attrs,
        } => Ok(Some(Op::Insert {
            text: text.clone(),
            attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, false),
        })),
        Op::InsertEmbed {
            embed: x_embed,
            attributes: x_attrs,
        } => {
            let kind = same_kind_embeds(x_embed, y_embed)?;
            let handler = lookup_embed_handler(kind)?;
            let value = handler.compose(&x_embed.value, &y_embed.value, false)?;
            Ok(Some(Op::InsertEmbed {
                embed: Embed::new(kind, value),
                attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, false),
            }))
        }
        Op::Retain {
            attributes: x_attrs,
            ..
        } => Ok(Some(Op::RetainEmbed {
            embed: y_embed.clone(),
            attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, true),
        })),
        Op::RetainEmbed {
            embed: x_embed,
            attributes: x_attrs,
        } => {
            let kind = same_kind_embeds(x_embed, y_embed)?;
            let handler = lookup_embed_handler(kind)?;
            let value = handler.compose(&x_embed.value, &y_embed.value, true)?;
            Ok(Some(Op::RetainEmbed {
                embed: Embed::new(kind, value),
                attributes: AttributeMapOps::compose(x_attrs.as_ref(), y_attrs, false),
            }))
        }
        Op::Delete { length, attributes } => Ok(Some(Op::Delete {
            length: *length,
            attributes: attributes.clone(),
        })),
    }
}

/// One step of the transformation table
///
/// `x` and `y` must already be trimmed to the same length; an insert on
/// either side must be front-loaded by the caller, matching the
/// `delete | any`, `anything | delete`, and insert-priority rows of the
/// transform table.
pub fn transform_step(x: &Op, y: &Op, priority: bool, length: usize) -> Result<Option<Op>, Error> {
    tracing::trace!(
        x = x.op_type(),
        y = y.op_type(),
        priority,
        length,
        "transform_step"
    );
    if matches!(x, Op::Delete { .. }) {
        return Ok(None);
    }
    if matches!(y, Op::Delete { .. }) {
        return Ok(Some(y.clone()));
    }

    match (x, y) {
        (
            Op::RetainEmbed {
                embed: x_embed,
                attributes: x_attrs,
            },
            Op::RetainEmbed {
                embed: y_embed,
                attributes: y_attrs,
            },
        ) => {
            let kind = same_kind_embeds(x_embed, y_embed)?;
            let handler = lookup_embed_handler(kind)?;
            let value = handler.transform(&x_embed.value, &y_embed.value, priority)?;
            Ok(Some(Op::RetainEmbed {
                embed: Embed::new(kind, value),
                attributes: AttributeMapOps::transform(x_attrs.as_ref(), y_attrs.as_ref(), priority),
            }))
        }
        (
            Op::Retain {
                attributes: x_attrs,
                ..
            },
            Op::RetainEmbed {
                embed: y_embed,
                attributes: y_attrs,
            },
        ) => Ok(Some(Op::RetainEmbed {
            embed: y_embed.clone(),
            attributes: AttributeMapOps::transform(x_attrs.as_ref(), y_attrs.as_ref(), priority),
        })),
        _ => {
            let x_attrs = x.attributes();
            let y_attrs = y.attributes();
            Ok(Some(Op::Retain {
                length,
                attributes: AttributeMapOps::transform(x_attrs, y_attrs, priority),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn compose_insert_over_retain_integer_composes_attrs() {
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));

        let x = Op::Insert {
            text: "A".to_string(),
            attributes: Some(bold),
        };
        let mut null_attrs = BTreeMap::new();
        null_attrs.insert("bold".to_string(), AttributeValue::Null);
        let y = Op::Retain {
            length: 1,
            attributes: Some(null_attrs),
        };

        let result = compose_step(&x, &y, 1).unwrap().unwrap();
        match result {
            Op::Insert { text, attributes } => {
                assert_eq!(text, "A");
                assert!(attributes.is_none());
            }
            _ => panic!("expected insert"),
        }
    }

    #[test]
    fn compose_delete_ignores_x() {
        let x = Op::Insert {
            text: "A".to_string(),
            attributes: None,
        };
        let y = Op::Delete {
            length: 1,
            attributes: None,
        };
        assert!(compose_step(&x, &y, 1).unwrap().is_none());
    }

    #[test]
    fn compose_retain_embed_mismatch_errors() {
        let x = Op::RetainEmbed {
            embed: Embed::new("image", json!("a")),
            attributes: None,
        };
        let y = Op::RetainEmbed {
            embed: Embed::new("video", json!("b")),
            attributes: None,
        };
        let err = compose_step(&x, &y, 1).unwrap_err();
        assert!(matches!(err, Error::EmbedMismatch { .. }));
    }

    #[test]
    fn transform_delete_x_yields_nothing() {
        let x = Op::Delete {
            length: 3,
            attributes: None,
        };
        let y = Op::Retain {
            length: 3,
            attributes: None,
        };
        assert!(transform_step(&x, &y, true, 3).unwrap().is_none());
    }

    #[test]
    fn transform_delete_y_is_emitted() {
        let x = Op::Retain {
            length: 3,
            attributes: None,
        };
        let y = Op::Delete {
            length: 3,
            attributes: None,
        };
        let result = transform_step(&x, &y, true, 3).unwrap().unwrap();
        assert_eq!(
            result,
            Op::Delete {
                length: 3,
                attributes: None,
            }
        );
    }

    #[test]
    fn transform_retain_retain_uses_attribute_transform() {
        let mut a = BTreeMap::new();
        a.insert("bold".to_string(), AttributeValue::Boolean(true));
        let x = Op::Retain {
            length: 5,
            attributes: Some(a),
        };
        let mut b = BTreeMap::new();
        b.insert("italic".to_string(), AttributeValue::Boolean(true));
        let y = Op::Retain {
            length: 5,
            attributes: Some(b),
        };

        let result = transform_step(&x, &y, true, 5).unwrap().unwrap();
        match result {
            Op::Retain { length, attributes } => {
                assert_eq!(length, 5);
                assert_eq!(
                    attributes.unwrap().get("italic"),
                    Some(&AttributeValue::Boolean(true))
                );
            }
            _ => panic!("expected retain"),
        }
    }

    #[test]
    fn compose_retain_over_delete_attaches_deletes_own_attributes() {
        let mut author = BTreeMap::new();
        author.insert(
            "author".to_string(),
            AttributeValue::String("u2".to_string()),
        );
        let x = Op::Retain {
            length: 2,
            attributes: None,
        };
        let y = Op::Delete {
            length: 2,
            attributes: Some(author.clone()),
        };

        let result = compose_step(&x, &y, 2).unwrap().unwrap();
        assert_eq!(
            result,
            Op::Delete {
                length: 2,
                attributes: Some(author),
            }
        );
    }

    #[test]
    fn compose_retain_embed_over_delete_attaches_deletes_own_attributes() {
        let mut author = BTreeMap::new();
        author.insert(
            "author".to_string(),
            AttributeValue::String("u2".to_string()),
        );
        let x = Op::RetainEmbed {
            embed: Embed::new("image", json!("a")),
            attributes: None,
        };
        let y = Op::Delete {
            length: 1,
            attributes: Some(author.clone()),
        };

        let result = compose_step(&x, &y, 1).unwrap().unwrap();
        assert_eq!(
            result,
            Op::Delete {
                length: 1,
                attributes: Some(author),
            }
        );
    }
}
