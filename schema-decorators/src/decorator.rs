use apollo_compiler::Name;
use itertools::Itertools;

use crate::aggregate;
use crate::aggregate::AggregateInjection;
use crate::aggregate::AggregateRegistry;
use crate::aggregate::AggregateReport;
use crate::config::DecoratorConfig;
use crate::date_format::DateFormatting;
use crate::date_format::DateFormattingReport;
use crate::error::DecoratorError;
use crate::resolver::Resolvers;
use crate::schema::DirectiveDefinition;
use crate::schema::TypeGraph;

/// What [`Decorator::decorate`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationReport {
    pub aggregates: AggregateReport,
    pub date_formatting: DateFormattingReport,
}

/// Runs the decorator passes over a type graph.
///
/// Aggregates are injected first, then date formatting. Aggregate fields are therefore seen by
/// the date formatting pass like any other field.
#[derive(Debug, Clone)]
pub struct Decorator {
    date_time_scalar: Option<Name>,
    aggregate_directive: Option<Name>,
    aggregates: AggregateRegistry,
}

impl Decorator {
    pub fn new(config: &DecoratorConfig) -> Result<Self, DecoratorError> {
        let date_time_scalar = config
            .date_formatting
            .enabled
            .then(|| config.date_formatting.scalar_name())
            .transpose()?;
        let aggregate_directive = config
            .aggregates
            .enabled
            .then(|| config.aggregates.directive_name())
            .transpose()?;
        Ok(Self {
            date_time_scalar,
            aggregate_directive,
            aggregates: AggregateRegistry::default(),
        })
    }

    /// Replaces the default aggregates.
    pub fn with_aggregates(mut self, registry: AggregateRegistry) -> Self {
        self.aggregates = registry;
        self
    }

    /// The directives the enabled passes need in the schema.
    pub fn directive_definitions(&self) -> Vec<DirectiveDefinition> {
        self.aggregate_directive
            .iter()
            .cloned()
            .map(aggregate::directive_definition)
            .collect()
    }

    /// SDL defining [`Self::directive_definitions`], to be parsed along with a schema that
    /// applies them.
    pub fn directive_prelude(&self) -> String {
        self.directive_definitions()
            .iter()
            .map(|definition| definition.to_string())
            .join("\n\n")
    }

    /// Builds a decorated graph from SDL and resolvers.
    ///
    /// The directive prelude is parsed along with `sdl`, which must therefore not define the
    /// directives itself.
    pub fn build(&self, sdl: &str, resolvers: Resolvers) -> Result<TypeGraph, DecoratorError> {
        let prelude = self.directive_prelude();
        let sdl = if prelude.is_empty() {
            sdl.to_owned()
        } else {
            format!("{prelude}\n\n{sdl}")
        };
        let mut graph = TypeGraph::parse(&sdl, "schema.graphql")?;
        graph.merge_resolvers(resolvers)?;
        self.decorate(&mut graph)?;
        Ok(graph)
    }

    /// Runs the enabled passes over an existing graph.
    ///
    /// Decorating an already decorated graph changes nothing.
    pub fn decorate(&self, graph: &mut TypeGraph) -> Result<DecorationReport, DecoratorError> {
        for definition in self.directive_definitions() {
            if graph.directive_definition(&definition.name).is_none() {
                graph.register_directive(definition);
            }
        }

        let mut report = DecorationReport::default();
        if let Some(directive) = &self.aggregate_directive {
            report.aggregates =
                AggregateInjection::new(directive.clone(), self.aggregates.clone()).run(graph)?;
        }
        if let Some(scalar) = &self.date_time_scalar {
            report.date_formatting = DateFormatting::new(scalar.clone()).run(graph)?;
        }

        tracing::debug!(
            connections = report.aggregates.decorated.len(),
            skipped_connections = report.aggregates.skipped.len(),
            date_fields = report.date_formatting.rewritten.len(),
            "decorated type graph"
        );
        Ok(report)
    }
}

impl Default for Decorator {
    fn default() -> Self {
        Self {
            date_time_scalar: Some(crate::date_format::DEFAULT_DATE_TIME_SCALAR),
            aggregate_directive: Some(aggregate::DEFAULT_INJECT_AGGREGATE_DIRECTIVE),
            aggregates: AggregateRegistry::default(),
        }
    }
}
