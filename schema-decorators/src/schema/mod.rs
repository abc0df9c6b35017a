//! The mutable type graph both decorator passes read and rewrite.
use apollo_compiler::Name;
use apollo_compiler::ast;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::name;
use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::error::DecoratorError;
use crate::error::ResolverError;
use crate::resolver::FieldContext;
use crate::resolver::ResolvedValue;
use crate::resolver::Resolver;
use crate::resolver::Resolvers;

mod from_ast;
mod output_type;
mod print;

pub use output_type::LazyType;
pub use output_type::OutputType;
pub use output_type::Unwrapped;
pub use output_type::Wrapper;

/// Identifies a field of an object type, e.g. `Query.user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldCoordinate {
    pub type_name: Name,
    pub field_name: Name,
}

impl std::fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: Name,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherKind {
    Interface,
    Union,
    Enum,
    InputObject,
}

/// A named type the decorators carry through untouched.
#[derive(Debug, Clone)]
pub struct OtherType {
    pub name: Name,
    pub kind: OtherKind,
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: Name,
    pub description: Option<String>,
    pub fields: IndexMap<Name, FieldDefinition>,
    /// Names of the directives applied to the type.
    pub directives: IndexSet<Name>,
}

impl ObjectType {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            description: None,
            fields: IndexMap::new(),
            directives: IndexSet::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.insert_field(field);
        self
    }

    pub fn with_directive(mut self, directive: Name) -> Self {
        self.directives.insert(directive);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDefinition> {
        self.fields.get_mut(name)
    }

    /// Adds a field, replacing any field with the same name.
    pub fn insert_field(&mut self, field: FieldDefinition) -> Option<FieldDefinition> {
        self.fields.insert(field.name.clone(), field)
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.contains(name)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: OutputType,
    pub arguments: IndexMap<Name, ArgumentDefinition>,
    pub resolver: Option<Resolver>,
}

impl FieldDefinition {
    pub fn new(name: Name, ty: OutputType) -> Self {
        Self {
            name,
            description: None,
            ty,
            arguments: IndexMap::new(),
            resolver: None,
        }
    }

    pub fn with_argument(mut self, argument: ArgumentDefinition) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The field's resolver, or the property resolver used when none was provided.
    pub fn resolver_or_default(&self) -> Resolver {
        self.resolver
            .clone()
            .unwrap_or_else(|| Resolver::property(self.name.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: ast::Type,
}

impl ArgumentDefinition {
    pub fn new(name: Name, ty: ast::Type) -> Self {
        Self {
            name,
            description: None,
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub locations: Vec<DirectiveLocation>,
}

#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Object(ObjectType),
    Other(OtherType),
}

impl TypeDefinition {
    pub fn name(&self) -> &Name {
        match self {
            TypeDefinition::Scalar(scalar) => &scalar.name,
            TypeDefinition::Object(object) => &object.name,
            TypeDefinition::Other(other) => &other.name,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeDefinition::Scalar(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeDefinition::Object(_))
    }
}

/// All named types of an API schema, their fields, and the directive vocabulary.
///
/// Created once by the schema bootstrap, mutated in place by the decorator passes, then frozen
/// for as long as the schema is served.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    types: IndexMap<Name, TypeDefinition>,
    directive_definitions: IndexMap<Name, DirectiveDefinition>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph that only knows the built-in scalars.
    pub fn with_built_in_scalars() -> Self {
        let mut graph = Self::new();
        for name in [
            name!("Int"),
            name!("Float"),
            name!("String"),
            name!("Boolean"),
            name!("ID"),
        ] {
            graph.insert_type(TypeDefinition::Scalar(ScalarType {
                name,
                description: None,
            }));
        }
        graph
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    /// Names of every object type, in definition order.
    pub fn object_type_names(&self) -> Vec<Name> {
        self.types
            .values()
            .filter_map(|ty| match ty {
                TypeDefinition::Object(object) => Some(object.name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn insert_type(&mut self, ty: TypeDefinition) -> Option<TypeDefinition> {
        self.types.insert(ty.name().clone(), ty)
    }

    pub fn object(&self, name: &Name) -> Result<&ObjectType, DecoratorError> {
        match self.types.get(name) {
            Some(TypeDefinition::Object(object)) => Ok(object),
            Some(_) => Err(DecoratorError::NotAnObjectType { name: name.clone() }),
            None => Err(DecoratorError::UnknownType { name: name.clone() }),
        }
    }

    pub fn object_mut(&mut self, name: &Name) -> Result<&mut ObjectType, DecoratorError> {
        match self.types.get_mut(name) {
            Some(TypeDefinition::Object(object)) => Ok(object),
            Some(_) => Err(DecoratorError::NotAnObjectType { name: name.clone() }),
            None => Err(DecoratorError::UnknownType { name: name.clone() }),
        }
    }

    /// Looks up a well-known scalar such as `String` or `Int`.
    pub fn scalar(&self, name: &Name) -> Result<&ScalarType, DecoratorError> {
        match self.types.get(name) {
            Some(TypeDefinition::Scalar(scalar)) => Ok(scalar),
            _ => Err(DecoratorError::UnknownScalar { name: name.clone() }),
        }
    }

    pub fn field(&self, coordinate: &FieldCoordinate) -> Result<&FieldDefinition, DecoratorError> {
        self.object(&coordinate.type_name)?
            .field(&coordinate.field_name)
            .ok_or_else(|| DecoratorError::UnknownField {
                type_name: coordinate.type_name.clone(),
                field_name: coordinate.field_name.clone(),
            })
    }

    pub fn field_mut(
        &mut self,
        coordinate: &FieldCoordinate,
    ) -> Result<&mut FieldDefinition, DecoratorError> {
        self.object_mut(&coordinate.type_name)?
            .field_mut(&coordinate.field_name)
            .ok_or_else(|| DecoratorError::UnknownField {
                type_name: coordinate.type_name.clone(),
                field_name: coordinate.field_name.clone(),
            })
    }

    /// Adds a directive to the vocabulary, replacing any previous definition with the same name.
    pub fn register_directive(&mut self, definition: DirectiveDefinition) {
        self.directive_definitions
            .insert(definition.name.clone(), definition);
    }

    pub fn directive_definition(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directive_definitions.get(name)
    }

    pub fn directive_definitions(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.directive_definitions.values()
    }

    /// Installs resolvers on the fields they belong to.
    pub fn merge_resolvers(&mut self, resolvers: Resolvers) -> Result<(), DecoratorError> {
        for (type_name, fields) in resolvers.by_type {
            for (field_name, resolver) in fields {
                let coordinate = FieldCoordinate {
                    type_name: type_name.clone(),
                    field_name,
                };
                self.field_mut(&coordinate)?.resolver = Some(resolver);
            }
        }
        Ok(())
    }

    /// Resolves a single field against its parent value.
    ///
    /// Fields without a resolver read the same-named property of the parent.
    pub async fn resolve(
        &self,
        coordinate: &FieldCoordinate,
        context: FieldContext,
    ) -> Result<ResolvedValue, ResolverError> {
        let resolver = self
            .field(coordinate)
            .map_err(|error| ResolverError::new(error.to_string()))?
            .resolver_or_default();
        resolver.resolve(context).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    fn graph() -> TypeGraph {
        let mut graph = TypeGraph::with_built_in_scalars();
        graph.insert_type(TypeDefinition::Object(
            ObjectType::new(name!("Food"))
                .with_field(FieldDefinition::new(
                    name!("name"),
                    OutputType::named(name!("String")),
                ))
                .with_field(
                    FieldDefinition::new(
                        name!("pricePerKg"),
                        OutputType::named(name!("Float")).non_null(),
                    )
                    .with_resolver(Resolver::constant(ResolvedValue::leaf(2.5))),
                ),
        ));
        graph
    }

    fn coordinate(type_name: Name, field_name: Name) -> FieldCoordinate {
        FieldCoordinate {
            type_name,
            field_name,
        }
    }

    #[test]
    fn lookups_distinguish_kinds() {
        let graph = graph();
        assert!(graph.object(&name!("Food")).is_ok());
        assert_eq!(
            graph.object(&name!("String")).unwrap_err(),
            DecoratorError::NotAnObjectType {
                name: name!("String")
            }
        );
        assert_eq!(
            graph.object(&name!("Drink")).unwrap_err(),
            DecoratorError::UnknownType {
                name: name!("Drink")
            }
        );
        assert!(graph.scalar(&name!("Int")).is_ok());
        assert_eq!(
            graph.scalar(&name!("Food")).unwrap_err(),
            DecoratorError::UnknownScalar {
                name: name!("Food")
            }
        );
        assert_eq!(graph.object_type_names(), vec![name!("Food")]);
    }

    #[test]
    fn merging_resolvers_for_unknown_fields_fails() {
        let mut graph = graph();
        let resolvers = Resolvers::new().field(
            name!("Food"),
            name!("colour"),
            Resolver::constant(ResolvedValue::null()),
        );
        assert_eq!(
            graph.merge_resolvers(resolvers).unwrap_err(),
            DecoratorError::UnknownField {
                type_name: name!("Food"),
                field_name: name!("colour"),
            }
        );
    }

    #[tokio::test]
    async fn resolve_falls_back_to_the_parent_property() {
        let mut graph = graph();
        graph
            .merge_resolvers(Resolvers::new().field(
                name!("Food"),
                name!("pricePerKg"),
                Resolver::constant(ResolvedValue::leaf(4.0)),
            ))
            .unwrap();

        let parent = json!({ "name": "kale", "pricePerKg": 1.0 });
        let name = graph
            .resolve(
                &coordinate(name!("Food"), name!("name")),
                FieldContext::new(parent.clone()),
            )
            .await
            .unwrap();
        assert_eq!(name, ResolvedValue::leaf("kale"));

        let price = graph
            .resolve(
                &coordinate(name!("Food"), name!("pricePerKg")),
                FieldContext::new(parent),
            )
            .await
            .unwrap();
        assert_eq!(price, ResolvedValue::leaf(4.0));
    }
}
