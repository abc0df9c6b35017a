use apollo_compiler::Name;
use apollo_compiler::name;
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::TimeZone;
use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use schema_decorators::Decorator;
use schema_decorators::DecoratorConfig;
use schema_decorators::FieldContext;
use schema_decorators::FieldCoordinate;
use schema_decorators::ResolvedValue;
use schema_decorators::Resolver;
use schema_decorators::Resolvers;
use schema_decorators::TypeGraph;
use schema_decorators::date_format::BuildOutcome;
use schema_decorators::date_format::DateFormatting;
use schema_decorators::date_format::FormatOptions;
use schema_decorators::date_format::build_transform;
use schema_decorators::schema::FieldDefinition;
use schema_decorators::schema::ObjectType;
use schema_decorators::schema::OutputType;
use schema_decorators::schema::ScalarType;
use schema_decorators::schema::TypeDefinition;
use serde_json_bytes::json;

fn midnight() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .unwrap()
        .fixed_offset()
}

fn date_time() -> OutputType {
    OutputType::named(name!("DateTime"))
}

/// `type T { x: DateTime, xs: [DateTime], name: String }`, `x` and `xs` read from the parent.
fn graph() -> TypeGraph {
    let mut graph = TypeGraph::with_built_in_scalars();
    graph.insert_type(TypeDefinition::Scalar(ScalarType {
        name: name!("DateTime"),
        description: None,
    }));
    graph.insert_type(TypeDefinition::Object(
        ObjectType::new(name!("T"))
            .with_field(FieldDefinition::new(name!("x"), date_time()))
            .with_field(FieldDefinition::new(name!("xs"), date_time().list()))
            .with_field(FieldDefinition::new(
                name!("name"),
                OutputType::named(name!("String")),
            )),
    ));
    graph
}

fn coordinate(field_name: Name) -> FieldCoordinate {
    FieldCoordinate {
        type_name: name!("T"),
        field_name,
    }
}

fn parent() -> serde_json_bytes::Value {
    json!({
        "x": "2020-01-01T00:00:00Z",
        "xs": ["2020-01-01T00:00:00Z", null],
        "name": "2020-01-01T00:00:00Z",
    })
}

fn transform_for(graph: &TypeGraph, ty: &OutputType) -> Option<schema_decorators::date_format::Transform> {
    match build_transform(graph, &name!("DateTime"), ty).unwrap() {
        BuildOutcome::Applicable(transform) => Some(transform),
        BuildOutcome::NotApplicable => None,
    }
}

#[tokio::test]
async fn no_arguments_normalize_to_a_date_time() {
    let mut graph = graph();
    DateFormatting::default().run(&mut graph).unwrap();

    let value = graph
        .resolve(&coordinate(name!("x")), FieldContext::new(parent()))
        .await
        .unwrap();
    assert_eq!(value, ResolvedValue::date_time(midnight()));
    assert_eq!(value.to_json(), json!("2020-01-01T00:00:00.000Z"));
}

#[tokio::test]
async fn date_format_renders_a_string() {
    let mut graph = graph();
    DateFormatting::default().run(&mut graph).unwrap();

    let context = FieldContext::new(parent()).with_argument("dateFormat", "yyyy");
    let value = graph
        .resolve(&coordinate(name!("x")), context)
        .await
        .unwrap();
    assert_eq!(value, ResolvedValue::leaf("2020"));
}

#[tokio::test]
async fn lists_are_formatted_element_wise() {
    let mut graph = graph();
    DateFormatting::default().run(&mut graph).unwrap();

    let context = FieldContext::new(parent()).with_argument("dateFormat", "yyyy");
    let value = graph
        .resolve(&coordinate(name!("xs")), context)
        .await
        .unwrap();
    assert_eq!(value.to_json(), json!(["2020", null]));
}

#[tokio::test]
async fn locale_and_timezone_apply_to_the_rendering() {
    let mut graph = graph();
    DateFormatting::default().run(&mut graph).unwrap();

    let context = FieldContext::new(parent())
        .with_argument("dateFormat", "EEEE d MMMM yyyy HH:mm")
        .with_argument("dateFormatLocale", "de-DE")
        .with_argument("dateFormatTimezone", "Europe/Berlin");
    let value = graph
        .resolve(&coordinate(name!("x")), context)
        .await
        .unwrap();
    assert_eq!(value, ResolvedValue::leaf("Mittwoch 1 Januar 2020 01:00"));
}

#[tokio::test]
async fn other_fields_keep_their_values() {
    let mut graph = graph();
    let report = DateFormatting::default().run(&mut graph).unwrap();
    assert_eq!(
        report.rewritten,
        vec![coordinate(name!("x")), coordinate(name!("xs"))]
    );

    let name = graph.field(&coordinate(name!("name"))).unwrap();
    assert!(name.arguments.is_empty());
    let value = graph
        .resolve(&coordinate(name!("name")), FieldContext::new(parent()))
        .await
        .unwrap();
    assert_eq!(value, ResolvedValue::leaf("2020-01-01T00:00:00Z"));
}

#[rstest]
#[case::bare(date_time())]
#[case::non_null(date_time().non_null())]
#[case::lazy(OutputType::lazy(date_time))]
#[case::lazy_non_null(OutputType::lazy(|| date_time().non_null()).non_null())]
fn normalizes_single_values(#[case] ty: OutputType) {
    let graph = graph();
    let transform = transform_for(&graph, &ty).unwrap();
    let value = transform(
        ResolvedValue::leaf("2020-01-01T02:00:00+02:00"),
        &FormatOptions::default(),
    )
    .unwrap();
    assert_eq!(value, ResolvedValue::date_time(midnight()));
}

#[rstest]
#[case::list(date_time().list(), 1)]
#[case::non_null_list(date_time().non_null().list().non_null(), 1)]
#[case::nested(date_time().list().non_null().list(), 2)]
#[case::lazy_nested(OutputType::lazy(|| date_time().list()).list(), 2)]
#[case::deep(date_time().list().list().non_null().list(), 3)]
fn preserves_list_shape(#[case] ty: OutputType, #[case] depth: usize) {
    let graph = graph();
    let transform = transform_for(&graph, &ty).unwrap();

    let mut input = json!("2020-01-01T00:00:00Z");
    let mut expected = json!("2020-01-01T00:00:00.000Z");
    for _ in 0..depth {
        input = json!([input, null]);
        expected = json!([expected, null]);
    }
    let value = transform(ResolvedValue::leaf(input), &FormatOptions::default()).unwrap();
    assert_eq!(value.to_json(), expected);
    assert_eq!(ty.unwrap_type().list_depth(), depth);
}

#[rstest]
#[case::string(OutputType::named(name!("String")))]
#[case::object(OutputType::named(name!("T")).list())]
#[case::lazy_object(OutputType::lazy(|| OutputType::named(name!("T")).non_null()))]
fn other_terminals_are_not_applicable(#[case] ty: OutputType) {
    assert!(transform_for(&graph(), &ty).is_none());
}

#[test]
fn normalizing_keeps_the_instant() {
    let graph = graph();
    let transform = transform_for(&graph, &date_time()).unwrap();
    let instant = "2021-07-04T18:30:15.250-04:00";
    let value = transform(ResolvedValue::leaf(instant), &FormatOptions::default()).unwrap();

    let reparsed = DateTime::parse_from_rfc3339(value.to_json().as_str().unwrap()).unwrap();
    assert_eq!(reparsed, DateTime::parse_from_rfc3339(instant).unwrap());
}

#[test]
fn rewriting_twice_changes_nothing() {
    let mut graph = graph();
    DateFormatting::default().run(&mut graph).unwrap();
    let resolvers: Vec<Resolver> = [name!("x"), name!("xs"), name!("name")]
        .into_iter()
        .map(|field| graph.field(&coordinate(field)).unwrap().resolver_or_default())
        .collect();

    let again = DateFormatting::default().run(&mut graph).unwrap();
    assert!(again.rewritten.is_empty());

    for (field, resolver) in [name!("x"), name!("xs"), name!("name")]
        .into_iter()
        .zip(resolvers)
    {
        let definition = graph.field(&coordinate(field)).unwrap();
        assert!(definition.resolver_or_default().ptr_eq(&resolver));
    }
    let x = graph.field(&coordinate(name!("x"))).unwrap();
    assert_eq!(x.arguments.len(), 3);
}

#[tokio::test]
async fn configured_scalar_can_be_a_built_in() {
    let config = DecoratorConfig::from_yaml("date_formatting:\n  scalar: String\n").unwrap();
    let graph = Decorator::new(&config)
        .unwrap()
        .build("type Query { x: String, xs: [String] }", Resolvers::new())
        .unwrap();
    let field = |field_name| FieldCoordinate {
        type_name: name!("Query"),
        field_name,
    };
    let parent = json!({
        "x": "2020-01-01T00:00:00Z",
        "xs": ["2020-01-01T00:00:00Z", null],
    });
    assert_eq!(graph.field(&field(name!("x"))).unwrap().arguments.len(), 3);

    let value = graph
        .resolve(&field(name!("x")), FieldContext::new(parent.clone()))
        .await
        .unwrap();
    assert_eq!(value, ResolvedValue::date_time(midnight()));

    let context = FieldContext::new(parent.clone()).with_argument("dateFormat", "yyyy");
    let value = graph.resolve(&field(name!("x")), context).await.unwrap();
    assert_eq!(value, ResolvedValue::leaf("2020"));

    let context = FieldContext::new(parent).with_argument("dateFormat", "yyyy");
    let value = graph.resolve(&field(name!("xs")), context).await.unwrap();
    assert_eq!(value.to_json(), json!(["2020", null]));
}
