//! Aggregate injection: connection types marked with `@injectAggregate` gain one field per
//! registered aggregate, provided they have the cursor connection shape
//! (`edges: [Edge]` where `Edge` has a `node` field).
use std::collections::HashSet;

use apollo_compiler::Name;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::name;

use crate::error::DecoratorError;
use crate::schema::DirectiveDefinition;
use crate::schema::ObjectType;
use crate::schema::OutputType;
use crate::schema::TypeDefinition;
use crate::schema::TypeGraph;

mod registry;

pub use registry::AggregateBuilder;
pub use registry::AggregateRegistry;
pub use registry::AggregateTarget;
pub use registry::COUNT_AGGREGATE;
pub use registry::count;

pub const DEFAULT_INJECT_AGGREGATE_DIRECTIVE: Name = name!("injectAggregate");

const EDGES_FIELD: &str = "edges";
const NODE_FIELD: &str = "node";

const INJECT_AGGREGATE_DESCRIPTION: &str = "If this directive is included on an connection, \
it'll automatically add aggregate resolvers to the connection.";

/// The definition of the marker directive, `directive @<name> on OBJECT`.
pub fn directive_definition(name: Name) -> DirectiveDefinition {
    DirectiveDefinition {
        name,
        description: Some(INJECT_AGGREGATE_DESCRIPTION.to_owned()),
        locations: vec![DirectiveLocation::Object],
    }
}

/// Adds the marker directive to the graph's directive vocabulary.
pub fn register_directive(graph: &mut TypeGraph, name: Name) {
    graph.register_directive(directive_definition(name));
}

/// Why a marked type does not have the cursor connection shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NonConformance {
    #[error("the type has no \"edges\" field")]
    MissingEdges,
    #[error("the \"edges\" field is not a list of edges")]
    EdgesNotAList,
    #[error("the edges are not objects")]
    EdgeNotAnObject { edge: Name },
    #[error("the edge type \"{edge}\" has no \"node\" field")]
    MissingNode { edge: Name },
    #[error("the \"node\" field of \"{edge}\" is not a named object or scalar type")]
    NodeNotNamed { edge: Name },
}

/// A marked type that was left undecorated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedConnection {
    pub type_name: Name,
    pub reason: NonConformance,
}

/// The outcome of an [`AggregateInjection`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Connections that gained aggregate fields, with the fields they gained.
    pub decorated: Vec<(Name, Vec<Name>)>,
    pub skipped: Vec<SkippedConnection>,
}

/// The aggregate injection pass.
///
/// Every object type is inspected at most once per pass instance. Aggregates whose name is
/// already taken on the connection are never added, so a fresh pass over an already decorated
/// graph changes nothing either.
#[derive(Debug)]
pub struct AggregateInjection {
    directive: Name,
    registry: AggregateRegistry,
    visited: HashSet<Name>,
}

impl Default for AggregateInjection {
    fn default() -> Self {
        Self::new(DEFAULT_INJECT_AGGREGATE_DIRECTIVE, AggregateRegistry::default())
    }
}

impl AggregateInjection {
    pub fn new(directive: Name, registry: AggregateRegistry) -> Self {
        Self {
            directive,
            registry,
            visited: HashSet::new(),
        }
    }

    pub fn directive(&self) -> &Name {
        &self.directive
    }

    pub fn run(&mut self, graph: &mut TypeGraph) -> Result<AggregateReport, DecoratorError> {
        let mut report = AggregateReport::default();
        for type_name in graph.object_type_names() {
            if !self.visited.insert(type_name.clone()) {
                continue;
            }
            let node = match self.inspect(graph, &type_name)? {
                None => continue,
                Some(Ok(node)) => node,
                Some(Err(reason)) => {
                    tracing::warn!(
                        type_name = %type_name,
                        "@{} requires a connection with a list of edges that each have a node, skipping: {reason}",
                        self.directive,
                    );
                    report.skipped.push(SkippedConnection { type_name, reason });
                    continue;
                }
            };

            let connection = graph.object(&type_name)?;
            let node = graph
                .get(&node)
                .ok_or_else(|| DecoratorError::UnknownType { name: node.clone() })?;
            let fields = self.registry.build(graph, connection, node)?;

            let connection = graph.object_mut(&type_name)?;
            let mut added = Vec::new();
            for field in fields {
                if connection.fields.contains_key(&field.name) {
                    tracing::debug!(
                        type_name = %type_name,
                        field_name = %field.name,
                        "connection already has a field with the aggregate's name"
                    );
                    continue;
                }
                added.push(field.name.clone());
                connection.insert_field(field);
            }
            if !added.is_empty() {
                tracing::debug!(type_name = %type_name, fields = ?added, "injected aggregates");
                report.decorated.push((type_name, added));
            }
        }
        Ok(report)
    }

    /// Checks the connection shape of one object type.
    ///
    /// Returns `None` for types without the marker directive, otherwise the name of the node type
    /// or the reason the type does not conform.
    fn inspect(
        &self,
        graph: &TypeGraph,
        type_name: &Name,
    ) -> Result<Option<Result<Name, NonConformance>>, DecoratorError> {
        let connection = graph.object(type_name)?;
        if !connection.has_directive(&self.directive) {
            return Ok(None);
        }
        Ok(Some(connection_node(graph, connection)))
    }
}

fn connection_node(graph: &TypeGraph, connection: &ObjectType) -> Result<Name, NonConformance> {
    let edges = connection
        .field(EDGES_FIELD)
        .ok_or(NonConformance::MissingEdges)?;
    let OutputType::List(edge) = strip_non_null(&edges.ty) else {
        return Err(NonConformance::EdgesNotAList);
    };

    let edge = edge.inner_named_type();
    let Some(TypeDefinition::Object(edge_type)) = graph.get(&edge) else {
        return Err(NonConformance::EdgeNotAnObject { edge });
    };
    let Some(node) = edge_type.field(NODE_FIELD) else {
        return Err(NonConformance::MissingNode { edge });
    };

    match strip_non_null(&node.ty) {
        OutputType::Named(name)
            if graph
                .get(&name)
                .is_some_and(|ty| ty.is_object() || ty.is_scalar()) =>
        {
            Ok(name)
        }
        _ => Err(NonConformance::NodeNotNamed { edge }),
    }
}

/// Strips at most one non-null layer. Lazy layers do not count.
fn strip_non_null(ty: &OutputType) -> OutputType {
    match ty {
        OutputType::Lazy(lazy) => strip_non_null(&lazy.resolve()),
        OutputType::NonNull(inner) => resolve_lazy(inner),
        _ => ty.clone(),
    }
}

fn resolve_lazy(ty: &OutputType) -> OutputType {
    match ty {
        OutputType::Lazy(lazy) => resolve_lazy(&lazy.resolve()),
        _ => ty.clone(),
    }
}
