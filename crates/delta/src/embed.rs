//! Embed values and the pluggable embed handler protocol
//!
//! An embed is a single-key map whose key names its *type* (`"image"`,
//! `"delta"`, ...); its value is opaque to the core algebra. Handlers are
//! resolved once per embed type by a process-wide registry and must be
//! pure — see the crate's top-level docs for the concurrency model this
//! relies on.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::delta::Delta;
use crate::error::Error;

/// Opaque embedded content: a type tag plus its (core-opaque) JSON payload
///
/// On the wire this appears as the single-key map `{ "<kind>": <value> }`;
/// `kind` is the map's one key and `value` is everything under it. The
/// `Serialize`/`Deserialize` impls below are hand-written (rather than
/// derived) because that single-key-map shape has no derivable
/// representation: a derived struct would serialize as `{"kind": ...,
/// "value": ...}`, which is not the Quill Delta embed wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// The embed's type tag, used to resolve a handler in the registry
    pub kind: String,
    /// The embed's opaque payload
    pub value: JsonValue,
}

impl Embed {
    /// Creates a new embed of the given kind
    pub fn new(kind: impl Into<String>, value: JsonValue) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

impl Serialize for Embed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serde_json::Map::with_capacity(1);
        map.insert(self.kind.clone(), self.value.clone());
        JsonValue::Object(map).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Embed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        match value {
            JsonValue::Object(map) if map.len() == 1 => {
                let (kind, value) = map.into_iter().next().expect("len checked above");
                Ok(Embed { kind, value })
            }
            other => Err(D::Error::custom(format!(
                "embed must be a single-key object, got {other}"
            ))),
        }
    }
}

/// The three pure operations a handler provides for one embed type
///
/// All three must be pure functions of their inputs: stateless,
/// deterministic, and side-effect free.
pub trait EmbedHandler: Send + Sync {
    /// Folds two embeds of this handler's type into one
    ///
    /// `is_retain` distinguishes retain-over-retain composition (keeps
    /// explicit attribute removals live for a later consumer) from
    /// insert-over-retain composition (realizes them).
    fn compose(&self, a: &JsonValue, b: &JsonValue, is_retain: bool) -> Result<JsonValue, Error>;

    /// Rebases embed `b` against concurrent embed `a`
    fn transform(&self, a: &JsonValue, b: &JsonValue, priority: bool) -> Result<JsonValue, Error>;

    /// Computes the embed that would undo `change` given the original `base`
    fn invert(&self, change: &JsonValue, base: &JsonValue) -> Result<JsonValue, Error>;
}

type Registry = HashMap<String, Arc<dyn EmbedHandler>>;

static EMBED_HANDLERS: OnceLock<RwLock<Registry>> = OnceLock::new();

fn registry() -> &'static RwLock<Registry> {
    EMBED_HANDLERS.get_or_init(|| {
        let mut map: Registry = HashMap::new();
        map.insert("delta".to_string(), Arc::new(NestedDeltaHandler));
        RwLock::new(map)
    })
}

/// Registers (or replaces) the handler for embed type `kind`
///
/// Idempotent: registering the same kind again swaps in the new handler.
/// Typically called once during process initialization; lookups afterward
/// never block on this write lock.
pub fn register_embed_handler(kind: impl Into<String>, handler: Arc<dyn EmbedHandler>) {
    let kind = kind.into();
    tracing::debug!(kind = %kind, "register_embed_handler");
    let mut guard = registry().write().expect("embed handler registry poisoned");
    guard.insert(kind, handler);
}

/// Looks up the handler registered for `kind`
///
/// # Errors
///
/// Returns [`Error::UnknownEmbedType`] if no handler is registered.
pub fn lookup_embed_handler(kind: &str) -> Result<Arc<dyn EmbedHandler>, Error> {
    tracing::trace!(kind, "lookup_embed_handler");
    let guard = registry().read().expect("embed handler registry poisoned");
    guard.get(kind).cloned().ok_or_else(|| {
        tracing::debug!(kind, "no embed handler registered");
        Error::unknown_embed_type(kind)
    })
}

/// Built-in handler for embed kind `"delta"`: a nested Delta recursively
/// composed/transformed/inverted by re-entering this crate's own sequence
/// engine.
struct NestedDeltaHandler;

fn nested_delta(value: &JsonValue) -> Result<Delta, Error> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::invalid_operation(format!("embed is not a delta: {e}"), None))
}

impl EmbedHandler for NestedDeltaHandler {
    fn compose(&self, a: &JsonValue, b: &JsonValue, _is_retain: bool) -> Result<JsonValue, Error> {
        let a = nested_delta(a)?;
        let b = nested_delta(b)?;
        let composed = a.compose(&b)?;
        serde_json::to_value(composed)
            .map_err(|e| Error::invalid_operation(format!("failed to encode delta: {e}"), None))
    }

    fn transform(&self, a: &JsonValue, b: &JsonValue, priority: bool) -> Result<JsonValue, Error> {
        let a = nested_delta(a)?;
        let b = nested_delta(b)?;
        let transformed = a.transform(&b, priority)?;
        serde_json::to_value(transformed)
            .map_err(|e| Error::invalid_operation(format!("failed to encode delta: {e}"), None))
    }

    fn invert(&self, change: &JsonValue, base: &JsonValue) -> Result<JsonValue, Error> {
        let change = nested_delta(change)?;
        let base = nested_delta(base)?;
        let inverted = change.invert(&base)?;
        serde_json::to_value(inverted)
            .map_err(|e| Error::invalid_operation(format!("failed to encode delta: {e}"), None))
    }
}
