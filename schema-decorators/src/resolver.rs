use std::fmt;
use std::future::Future;
use std::sync::Arc;

use apollo_compiler::Name;
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::SecondsFormat;
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value as JsonValue;

use crate::error::ResolverError;

pub type JsonMap = Map<ByteString, JsonValue>;

/// The value of a resolved field
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// * JSON null represents GraphQL null
    /// * An object is the parent value handed to the resolvers of its own fields
    /// * A JSON array is a list that has not been broken up into resolved values
    Leaf(JsonValue),

    /// A date-time value, as produced by a resolver or by date formatting
    DateTime(DateTime<FixedOffset>),

    /// Expected for GraphQL list types
    List(Vec<ResolvedValue>),
}

impl ResolvedValue {
    /// Construct a null leaf resolved value
    pub fn null() -> Self {
        Self::Leaf(JsonValue::Null)
    }

    /// Construct a leaf resolved value from something that is convertible to JSON
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Leaf(json.into())
    }

    pub fn date_time(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }

    /// Construct a list resolved value from an iterator
    pub fn list(iter: impl IntoIterator<Item = Self>) -> Self {
        Self::List(iter.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Leaf(JsonValue::Null))
    }

    /// Renders the value as it is serialized in a response.
    ///
    /// Date-times use ISO-8601 with millisecond precision, in their own offset.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Leaf(value) => value.clone(),
            Self::DateTime(value) => {
                JsonValue::from(value.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<JsonValue> for ResolvedValue {
    fn from(value: JsonValue) -> Self {
        Self::Leaf(value)
    }
}

/// What a resolver gets to see of the field being resolved.
#[derive(Debug, Clone, Default)]
pub struct FieldContext {
    /// The value of the parent object.
    pub parent: JsonValue,
    /// The field arguments, coerced by the executor.
    pub arguments: JsonMap,
}

impl FieldContext {
    pub fn new(parent: JsonValue) -> Self {
        Self {
            parent,
            arguments: JsonMap::new(),
        }
    }

    pub fn with_argument(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.arguments.insert(ByteString::from(name), value.into());
        self
    }

    /// Returns a string argument, treating a missing argument and `null` alike.
    pub fn string_argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(JsonValue::as_str)
    }
}

pub type ResolverFuture = BoxFuture<'static, Result<ResolvedValue, ResolverError>>;

/// A field resolver.
///
/// Resolvers hold no per-call state, so the same resolver may run concurrently for
/// independent requests.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn(FieldContext) -> ResolverFuture + Send + Sync>);

impl Resolver {
    pub fn new<F, Fut>(resolve: F) -> Self
    where
        F: Fn(FieldContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResolvedValue, ResolverError>> + Send + 'static,
    {
        Self(Arc::new(move |context| resolve(context).boxed()))
    }

    /// A resolver that always returns the same value.
    pub fn constant(value: ResolvedValue) -> Self {
        Self::new(move |_| futures::future::ready(Ok(value.clone())))
    }

    /// The resolver used for fields that have none: reads the same-named property of the parent.
    ///
    /// Resolves to null when the parent is not an object.
    pub fn property(field_name: Name) -> Self {
        Self::new(move |context: FieldContext| {
            let value = context
                .parent
                .as_object()
                .and_then(|parent| parent.get(field_name.as_str()))
                .cloned()
                .unwrap_or(JsonValue::Null);
            futures::future::ready(Ok(ResolvedValue::Leaf(value)))
        })
    }

    pub fn resolve(&self, context: FieldContext) -> ResolverFuture {
        (self.0)(context)
    }

    /// Whether both resolvers are the very same function.
    pub fn ptr_eq(&self, other: &Resolver) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// Resolvers keyed by type name, then field name, ready to be merged into a
/// [`TypeGraph`][crate::TypeGraph].
#[derive(Debug, Clone, Default)]
pub struct Resolvers {
    pub(crate) by_type: IndexMap<Name, IndexMap<Name, Resolver>>,
}

impl Resolvers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, type_name: Name, field_name: Name, resolver: Resolver) -> Self {
        self.by_type
            .entry(type_name)
            .or_default()
            .insert(field_name, resolver);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
