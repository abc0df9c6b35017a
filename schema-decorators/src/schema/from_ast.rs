use std::path::Path;

use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::schema::ExtendedType;
use indexmap::IndexMap;

use super::ArgumentDefinition;
use super::DirectiveDefinition;
use super::FieldDefinition;
use super::ObjectType;
use super::OtherKind;
use super::OtherType;
use super::OutputType;
use super::ScalarType;
use super::TypeDefinition;
use super::TypeGraph;
use crate::error::DecoratorError;

const BUILT_IN_DIRECTIVES: [&str; 7] = [
    "skip",
    "include",
    "deprecated",
    "specifiedBy",
    "oneOf",
    "defer",
    "stream",
];

impl TypeGraph {
    /// Parses and validates SDL, then builds the graph from it.
    ///
    /// Every directive applied in `sdl` must be defined, either in `sdl` itself or by prepending
    /// the definitions the decorators register.
    pub fn parse(sdl: &str, path: impl AsRef<Path>) -> Result<Self, DecoratorError> {
        let schema = Schema::parse_and_validate(sdl, path).map_err(|with_errors| {
            DecoratorError::InvalidSchema {
                message: with_errors.errors.to_string(),
            }
        })?;
        Self::try_from(&*schema)
    }
}

impl TryFrom<&Schema> for TypeGraph {
    type Error = DecoratorError;

    fn try_from(schema: &Schema) -> Result<Self, Self::Error> {
        let mut graph = TypeGraph::new();
        for definition in schema.directive_definitions.values() {
            if BUILT_IN_DIRECTIVES.contains(&definition.name.as_str()) {
                continue;
            }
            graph.register_directive(DirectiveDefinition {
                name: definition.name.clone(),
                description: description(&definition.description),
                locations: definition.locations.clone(),
            });
        }

        for (name, ty) in &schema.types {
            // Introspection types are served by the executor itself.
            if name.starts_with("__") {
                continue;
            }
            let other = |kind| {
                TypeDefinition::Other(OtherType {
                    name: name.clone(),
                    kind,
                })
            };
            let definition = match ty {
                ExtendedType::Scalar(scalar) => TypeDefinition::Scalar(ScalarType {
                    name: name.clone(),
                    description: description(&scalar.description),
                }),
                ExtendedType::Object(object) => TypeDefinition::Object(ObjectType {
                    name: name.clone(),
                    description: description(&object.description),
                    fields: object
                        .fields
                        .values()
                        .map(|field| (field.name.clone(), field_definition(field)))
                        .collect(),
                    directives: object
                        .directives
                        .iter()
                        .map(|directive| directive.name.clone())
                        .collect(),
                }),
                ExtendedType::Interface(_) => other(OtherKind::Interface),
                ExtendedType::Union(_) => other(OtherKind::Union),
                ExtendedType::Enum(_) => other(OtherKind::Enum),
                ExtendedType::InputObject(_) => other(OtherKind::InputObject),
            };
            graph.insert_type(definition);
        }
        Ok(graph)
    }
}

fn field_definition(field: &ast::FieldDefinition) -> FieldDefinition {
    let arguments: IndexMap<_, _> = field
        .arguments
        .iter()
        .map(|argument| {
            (
                argument.name.clone(),
                ArgumentDefinition {
                    name: argument.name.clone(),
                    description: description(&argument.description),
                    ty: argument.ty.as_ref().clone(),
                },
            )
        })
        .collect();
    FieldDefinition {
        name: field.name.clone(),
        description: description(&field.description),
        ty: OutputType::from(&field.ty),
        arguments,
        resolver: None,
    }
}

fn description(description: &Option<Node<str>>) -> Option<String> {
    description.as_deref().map(str::to_owned)
}
