//! Date formatting: every field whose type ends in the date-time scalar gains `dateFormat`,
//! `dateFormatLocale` and `dateFormatTimezone` arguments, and its resolver is wrapped so the
//! resolved value is normalized to UTC or rendered with the requested format.
use std::collections::HashSet;

use apollo_compiler::Name;
use apollo_compiler::ast;
use apollo_compiler::name;

use crate::error::DecoratorError;
use crate::resolver::FieldContext;
use crate::resolver::Resolver;
use crate::schema::ArgumentDefinition;
use crate::schema::FieldCoordinate;
use crate::schema::TypeGraph;

mod pattern;
mod transform;

pub use transform::BuildOutcome;
pub use transform::FormatOptions;
pub use transform::Transform;
pub use transform::base_transform;
pub use transform::build_transform;

pub const DEFAULT_DATE_TIME_SCALAR: Name = name!("DateTime");
pub const DATE_FORMAT_ARGUMENT: Name = name!("dateFormat");
pub const DATE_FORMAT_LOCALE_ARGUMENT: Name = name!("dateFormatLocale");
pub const DATE_FORMAT_TIMEZONE_ARGUMENT: Name = name!("dateFormatTimezone");

const STRING_SCALAR: Name = name!("String");

/// The fields a [`DateFormatting`] run rewrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFormattingReport {
    pub rewritten: Vec<FieldCoordinate>,
}

/// The date formatting pass.
///
/// The pass remembers every field it has looked at, so running it again over the same graph
/// leaves the graph as it is. A field that already declares `dateFormat` is never rewritten,
/// which keeps a fresh pass from wrapping a resolver twice.
#[derive(Debug)]
pub struct DateFormatting {
    scalar: Name,
    visited: HashSet<FieldCoordinate>,
}

impl Default for DateFormatting {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_TIME_SCALAR)
    }
}

impl DateFormatting {
    /// A pass targeting fields whose type ends in `scalar`.
    pub fn new(scalar: Name) -> Self {
        Self {
            scalar,
            visited: HashSet::new(),
        }
    }

    pub fn scalar(&self) -> &Name {
        &self.scalar
    }

    /// Visits every field of every object type.
    pub fn run(&mut self, graph: &mut TypeGraph) -> Result<DateFormattingReport, DecoratorError> {
        let mut report = DateFormattingReport::default();
        for type_name in graph.object_type_names() {
            let field_names: Vec<Name> = graph.object(&type_name)?.fields.keys().cloned().collect();
            for field_name in field_names {
                let coordinate = FieldCoordinate {
                    type_name: type_name.clone(),
                    field_name,
                };
                if self.maybe_rewrite(graph, &coordinate)? {
                    report.rewritten.push(coordinate);
                }
            }
        }
        Ok(report)
    }

    /// Rewrites a single field if its type ends in the date-time scalar.
    ///
    /// Returns whether the field was rewritten. Fields that are not date-times keep their
    /// arguments, but get the property resolver if they had none.
    pub fn maybe_rewrite(
        &mut self,
        graph: &mut TypeGraph,
        coordinate: &FieldCoordinate,
    ) -> Result<bool, DecoratorError> {
        if !self.visited.insert(coordinate.clone()) {
            return Ok(false);
        }

        let field = graph.field_mut(coordinate)?;
        if field.arguments.contains_key(&DATE_FORMAT_ARGUMENT) {
            tracing::trace!(
                type_name = %coordinate.type_name,
                field_name = %coordinate.field_name,
                "field already accepts date formatting arguments"
            );
            return Ok(false);
        }
        let inner = field.resolver_or_default();
        field.resolver = Some(inner.clone());
        let ty = field.ty.clone();

        let transform = match build_transform(graph, &self.scalar, &ty)? {
            BuildOutcome::Applicable(transform) => transform,
            BuildOutcome::NotApplicable => {
                tracing::trace!(
                    type_name = %coordinate.type_name,
                    field_name = %coordinate.field_name,
                    "not a date-time field"
                );
                return Ok(false);
            }
        };

        let string = graph.scalar(&STRING_SCALAR)?.name.clone();
        let resolver = Resolver::new(move |context: FieldContext| {
            let options = FormatOptions::from_arguments(&context);
            let inner = inner.clone();
            let transform = transform.clone();
            async move {
                let value = inner.resolve(context).await?;
                transform(value, &options)
            }
        });

        let field = graph.field_mut(coordinate)?;
        for argument in [
            DATE_FORMAT_ARGUMENT,
            DATE_FORMAT_LOCALE_ARGUMENT,
            DATE_FORMAT_TIMEZONE_ARGUMENT,
        ] {
            field.arguments.insert(
                argument.clone(),
                ArgumentDefinition::new(argument, ast::Type::Named(string.clone())),
            );
        }
        field.resolver = Some(resolver);

        tracing::debug!(
            type_name = %coordinate.type_name,
            field_name = %coordinate.field_name,
            "injected date formatting"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json_bytes::json;

    use super::*;
    use crate::resolver::ResolvedValue;
    use crate::schema::FieldDefinition;
    use crate::schema::ObjectType;
    use crate::schema::OutputType;
    use crate::schema::ScalarType;
    use crate::schema::TypeDefinition;

    fn coordinate(field_name: Name) -> FieldCoordinate {
        FieldCoordinate {
            type_name: name!("Event"),
            field_name,
        }
    }

    fn graph_with(field: FieldDefinition) -> TypeGraph {
        let mut graph = TypeGraph::with_built_in_scalars();
        graph.insert_type(TypeDefinition::Scalar(ScalarType {
            name: name!("DateTime"),
            description: None,
        }));
        graph.insert_type(TypeDefinition::Object(
            ObjectType::new(name!("Event")).with_field(field),
        ));
        graph
    }

    fn date_time() -> OutputType {
        OutputType::named(name!("DateTime"))
    }

    #[test]
    fn injects_string_arguments() {
        let mut graph = graph_with(FieldDefinition::new(name!("at"), date_time().non_null()));
        let report = DateFormatting::default().run(&mut graph).unwrap();
        assert_eq!(report.rewritten, vec![coordinate(name!("at"))]);

        let field = graph.field(&coordinate(name!("at"))).unwrap();
        let arguments: Vec<String> = field
            .arguments
            .values()
            .map(|argument| format!("{}: {}", argument.name, argument.ty))
            .collect();
        assert_eq!(
            arguments,
            vec![
                "dateFormat: String",
                "dateFormatLocale: String",
                "dateFormatTimezone: String",
            ]
        );
    }

    #[rstest]
    #[case::named(OutputType::named(name!("String")))]
    #[case::list(OutputType::named(name!("Int")).list().non_null())]
    #[case::lazy(OutputType::lazy(|| OutputType::named(name!("Boolean"))))]
    fn leaves_other_fields_alone(#[case] ty: OutputType) {
        let mut graph = graph_with(FieldDefinition::new(name!("other"), ty));
        let report = DateFormatting::default().run(&mut graph).unwrap();
        assert!(report.rewritten.is_empty());

        let field = graph.field(&coordinate(name!("other"))).unwrap();
        assert!(field.arguments.is_empty());
        assert!(field.resolver.is_some());
    }

    #[test]
    fn unknown_named_types_abort_the_pass() {
        let mut graph = graph_with(FieldDefinition::new(
            name!("at"),
            OutputType::named(name!("Instant")),
        ));
        assert_eq!(
            DateFormatting::default().run(&mut graph).unwrap_err(),
            DecoratorError::UnknownType {
                name: name!("Instant")
            }
        );
    }

    #[test]
    fn runs_at_most_once_per_field() {
        let mut graph = graph_with(FieldDefinition::new(name!("at"), date_time()));
        let mut pass = DateFormatting::default();
        pass.run(&mut graph).unwrap();
        let first = graph
            .field(&coordinate(name!("at")))
            .unwrap()
            .resolver_or_default();

        assert!(pass.run(&mut graph).unwrap().rewritten.is_empty());
        assert!(
            DateFormatting::default()
                .run(&mut graph)
                .unwrap()
                .rewritten
                .is_empty()
        );

        let field = graph.field(&coordinate(name!("at"))).unwrap();
        assert_eq!(field.arguments.len(), 3);
        assert!(field.resolver_or_default().ptr_eq(&first));
    }

    #[tokio::test]
    async fn wrapped_resolver_formats_the_inner_result() {
        let mut graph = graph_with(
            FieldDefinition::new(name!("at"), date_time()).with_resolver(Resolver::constant(
                ResolvedValue::leaf("2020-06-15T12:30:00+02:00"),
            )),
        );
        DateFormatting::default().run(&mut graph).unwrap();

        let at = coordinate(name!("at"));
        let normalized = graph.resolve(&at, FieldContext::default()).await.unwrap();
        assert_eq!(
            normalized,
            ResolvedValue::date_time(
                Utc.with_ymd_and_hms(2020, 6, 15, 10, 30, 0)
                    .unwrap()
                    .fixed_offset()
            )
        );

        let context = FieldContext::default()
            .with_argument("dateFormat", "yyyy-MM-dd HH:mm")
            .with_argument("dateFormatTimezone", "Asia/Tokyo");
        let formatted = graph.resolve(&at, context).await.unwrap();
        assert_eq!(formatted, ResolvedValue::leaf("2020-06-15 19:30"));
    }

    #[tokio::test]
    async fn default_resolver_reads_the_parent() {
        let mut graph = graph_with(FieldDefinition::new(name!("at"), date_time().list()));
        DateFormatting::default().run(&mut graph).unwrap();

        let context = FieldContext::new(json!({ "at": ["2020-01-01", null] }))
            .with_argument("dateFormat", "MMMM");
        let value = graph
            .resolve(&coordinate(name!("at")), context)
            .await
            .unwrap();
        assert_eq!(value.to_json(), json!(["January", null]));
    }

    #[tokio::test]
    async fn request_time_errors_stay_on_the_field() {
        let mut graph = graph_with(FieldDefinition::new(name!("at"), date_time()));
        DateFormatting::default().run(&mut graph).unwrap();

        let context = FieldContext::new(json!({ "at": "2020-01-01" }))
            .with_argument("dateFormat", "yyyy")
            .with_argument("dateFormatTimezone", "Nowhere/Special");
        let error = graph
            .resolve(&coordinate(name!("at")), context)
            .await
            .unwrap_err();
        assert_eq!(error.message, "Unknown time zone \"Nowhere/Special\"");
    }
}
