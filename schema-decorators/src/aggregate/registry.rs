use apollo_compiler::Name;
use apollo_compiler::name;
use indexmap::IndexMap;

use crate::error::DecoratorError;
use crate::resolver::ResolvedValue;
use crate::resolver::Resolver;
use crate::schema::FieldDefinition;
use crate::schema::ObjectType;
use crate::schema::OutputType;
use crate::schema::TypeDefinition;
use crate::schema::TypeGraph;

pub const COUNT_AGGREGATE: Name = name!("count");

const INT_SCALAR: Name = name!("Int");

/// Builds the field definition of one aggregate for a given connection.
pub type AggregateBuilder = fn(&AggregateTarget<'_>) -> Result<FieldDefinition, DecoratorError>;

/// A connection that conforms to the cursor connection shape, as handed to aggregate builders.
#[derive(Debug, Clone, Copy)]
pub struct AggregateTarget<'a> {
    /// The name the built field must have.
    pub field_name: &'a Name,
    pub graph: &'a TypeGraph,
    pub connection: &'a ObjectType,
    /// The type of `edges.node`.
    pub node: &'a TypeDefinition,
}

/// The aggregates added to every connection marked for aggregation, keyed by field name.
///
/// The default registry only knows `count`.
#[derive(Clone)]
pub struct AggregateRegistry {
    builders: IndexMap<Name, AggregateBuilder>,
}

impl Default for AggregateRegistry {
    fn default() -> Self {
        Self::empty().with(COUNT_AGGREGATE, count)
    }
}

impl std::fmt::Debug for AggregateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.builders.keys()).finish()
    }
}

impl AggregateRegistry {
    pub fn empty() -> Self {
        Self {
            builders: IndexMap::new(),
        }
    }

    /// Registers an aggregate, replacing any aggregate with the same name.
    pub fn register(&mut self, name: Name, builder: AggregateBuilder) {
        self.builders.insert(name, builder);
    }

    pub fn with(mut self, name: Name, builder: AggregateBuilder) -> Self {
        self.register(name, builder);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.builders.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Builds every registered aggregate for one connection, in registration order.
    pub(crate) fn build(
        &self,
        graph: &TypeGraph,
        connection: &ObjectType,
        node: &TypeDefinition,
    ) -> Result<Vec<FieldDefinition>, DecoratorError> {
        self.builders
            .iter()
            .map(|(field_name, builder)| {
                let field = builder(&AggregateTarget {
                    field_name,
                    graph,
                    connection,
                    node,
                })?;
                if field.name != *field_name {
                    return Err(DecoratorError::internal(format!(
                        "aggregate \"{field_name}\" built a field named \"{}\"",
                        field.name
                    )));
                }
                Ok(field)
            })
            .collect()
    }
}

/// `count: Int!`. Computing the count is left to a resolver merged later; until then it is 0.
pub fn count(target: &AggregateTarget<'_>) -> Result<FieldDefinition, DecoratorError> {
    let int = target.graph.scalar(&INT_SCALAR)?;
    Ok(
        FieldDefinition::new(
            target.field_name.clone(),
            OutputType::named(int.name.clone()).non_null(),
        )
        .with_resolver(Resolver::constant(ResolvedValue::leaf(0))),
    )
}
