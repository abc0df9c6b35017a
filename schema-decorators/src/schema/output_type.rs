use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::ast;

/// The type of an output field: a named type wrapped in any number of modifiers.
///
/// Whether a [`OutputType::Named`] terminal is a scalar or an object type is answered by the
/// [`TypeGraph`][super::TypeGraph] it belongs to. Wrapper chains are finite by construction;
/// the graph as a whole may still be cyclic through named references.
#[derive(Clone)]
pub enum OutputType {
    Named(Name),
    NonNull(Box<OutputType>),
    List(Box<OutputType>),
    Lazy(LazyType),
}

/// A lazily produced output type.
///
/// Used where a field refers to a type that is only known once the rest of the graph has been
/// assembled. Resolving it has no effect on the shape of the values the field returns.
#[derive(Clone)]
pub struct LazyType(Arc<dyn Fn() -> OutputType + Send + Sync>);

impl LazyType {
    pub fn new(thunk: impl Fn() -> OutputType + Send + Sync + 'static) -> Self {
        Self(Arc::new(thunk))
    }

    pub fn resolve(&self) -> OutputType {
        (self.0)()
    }
}

/// One modifier layer peeled off an [`OutputType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrapper {
    NonNull,
    List,
    Lazy,
}

/// The result of [`OutputType::unwrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped {
    /// The innermost named type.
    pub terminal: Name,
    /// Every wrapper layer, outermost first.
    pub wrappers: Vec<Wrapper>,
}

impl Unwrapped {
    /// How many list layers separate the field from its terminal type.
    pub fn list_depth(&self) -> usize {
        self.wrappers
            .iter()
            .filter(|wrapper| **wrapper == Wrapper::List)
            .count()
    }
}

impl OutputType {
    pub fn named(name: Name) -> Self {
        Self::Named(name)
    }

    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    pub fn lazy(thunk: impl Fn() -> OutputType + Send + Sync + 'static) -> Self {
        Self::Lazy(LazyType::new(thunk))
    }

    /// Peels every wrapper layer and returns the innermost named type along with the layers.
    ///
    /// Example: `[Date!]!` unwraps to `Date` with `[NonNull, List, NonNull]`.
    pub fn unwrap_type(&self) -> Unwrapped {
        let mut wrappers = Vec::new();
        let terminal = unwrap_into(self, &mut wrappers);
        Unwrapped { terminal, wrappers }
    }

    /// Returns the name of the innermost named type.
    pub fn inner_named_type(&self) -> Name {
        self.unwrap_type().terminal
    }

    /// Strips at most one outer non-null layer.
    pub fn strip_non_null(&self) -> &OutputType {
        match self {
            OutputType::NonNull(inner) => inner,
            _ => self,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, OutputType::NonNull(_))
    }
}

fn unwrap_into(ty: &OutputType, wrappers: &mut Vec<Wrapper>) -> Name {
    match ty {
        OutputType::Named(name) => name.clone(),
        OutputType::NonNull(inner) => {
            wrappers.push(Wrapper::NonNull);
            unwrap_into(inner, wrappers)
        }
        OutputType::List(inner) => {
            wrappers.push(Wrapper::List);
            unwrap_into(inner, wrappers)
        }
        OutputType::Lazy(lazy) => {
            wrappers.push(Wrapper::Lazy);
            unwrap_into(&lazy.resolve(), wrappers)
        }
    }
}

impl From<&ast::Type> for OutputType {
    // https://spec.graphql.org/draft/#sec-Type-References
    fn from(ty: &ast::Type) -> Self {
        match ty {
            ast::Type::Named(name) => OutputType::Named(name.clone()),
            ast::Type::NonNullNamed(name) => OutputType::Named(name.clone()).non_null(),
            ast::Type::List(inner) => OutputType::from(inner.as_ref()).list(),
            ast::Type::NonNullList(inner) => OutputType::from(inner.as_ref()).list().non_null(),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Named(name) => write!(f, "{name}"),
            OutputType::NonNull(inner) => write!(f, "{inner}!"),
            OutputType::List(inner) => write!(f, "[{inner}]"),
            OutputType::Lazy(lazy) => write!(f, "{}", lazy.resolve()),
        }
    }
}

impl fmt::Debug for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Named(name) => f.debug_tuple("Named").field(name).finish(),
            OutputType::NonNull(inner) => f.debug_tuple("NonNull").field(inner).finish(),
            OutputType::List(inner) => f.debug_tuple("List").field(inner).finish(),
            OutputType::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}
