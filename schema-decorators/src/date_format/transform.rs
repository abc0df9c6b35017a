//! Value transforms for fields whose type ends in the date-time scalar.
use std::sync::Arc;

use apollo_compiler::Name;
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Utc;
use chrono::Weekday;
use chrono_tz::Tz;
use serde_json_bytes::Value as JsonValue;

use super::DATE_FORMAT_ARGUMENT;
use super::DATE_FORMAT_LOCALE_ARGUMENT;
use super::DATE_FORMAT_TIMEZONE_ARGUMENT;
use super::pattern;
use crate::error::DecoratorError;
use crate::error::ResolverError;
use crate::resolver::FieldContext;
use crate::resolver::ResolvedValue;
use crate::schema::OutputType;
use crate::schema::TypeDefinition;
use crate::schema::TypeGraph;

/// The formatting arguments supplied for one field selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
}

impl FormatOptions {
    /// Reads the injected arguments. Null and empty strings count as absent.
    pub fn from_arguments(context: &FieldContext) -> Self {
        let argument = |name: Name| {
            context
                .string_argument(name.as_str())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        Self {
            format: argument(DATE_FORMAT_ARGUMENT),
            locale: argument(DATE_FORMAT_LOCALE_ARGUMENT),
            timezone: argument(DATE_FORMAT_TIMEZONE_ARGUMENT),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.format.is_none() && self.locale.is_none() && self.timezone.is_none()
    }
}

/// Applies date formatting to a resolved value of the shape the field's type describes.
pub type Transform =
    Arc<dyn Fn(ResolvedValue, &FormatOptions) -> Result<ResolvedValue, ResolverError> + Send + Sync>;

/// Whether a field's type ends in the date-time scalar, and if so how to transform its values.
pub enum BuildOutcome {
    Applicable(Transform),
    /// The type ends in some other named type; the field needs no rewriting.
    NotApplicable,
}

impl std::fmt::Debug for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildOutcome::Applicable(_) => f.write_str("Applicable(..)"),
            BuildOutcome::NotApplicable => f.write_str("NotApplicable"),
        }
    }
}

/// Builds the transform for values of type `ty`, following its wrapper layers down to the
/// named type.
///
/// Non-null and lazy layers do not change the shape of a value and are passed through. Each list
/// layer maps the transform of its element type over the items. Any named type other than the
/// `date_time` scalar makes the whole type [`BuildOutcome::NotApplicable`].
///
/// A named type missing from the graph is a broken graph, hence an error.
pub fn build_transform(
    graph: &TypeGraph,
    date_time: &Name,
    ty: &OutputType,
) -> Result<BuildOutcome, DecoratorError> {
    match ty {
        OutputType::Named(name) => match graph.get(name) {
            Some(TypeDefinition::Scalar(scalar)) if scalar.name == *date_time => {
                Ok(BuildOutcome::Applicable(Arc::new(base_transform)))
            }
            Some(_) => Ok(BuildOutcome::NotApplicable),
            None => Err(DecoratorError::UnknownType { name: name.clone() }),
        },
        OutputType::NonNull(inner) => build_transform(graph, date_time, inner),
        OutputType::Lazy(lazy) => build_transform(graph, date_time, &lazy.resolve()),
        OutputType::List(inner) => {
            let BuildOutcome::Applicable(element) = build_transform(graph, date_time, inner)?
            else {
                return Ok(BuildOutcome::NotApplicable);
            };
            Ok(BuildOutcome::Applicable(Arc::new(move |value, options| {
                map_list(value, options, &element)
            })))
        }
    }
}

/// Maps `element` over list-shaped values; anything else is returned as is.
fn map_list(
    value: ResolvedValue,
    options: &FormatOptions,
    element: &Transform,
) -> Result<ResolvedValue, ResolverError> {
    match value {
        ResolvedValue::List(items) => items
            .into_iter()
            .map(|item| element(item, options))
            .collect::<Result<_, _>>()
            .map(ResolvedValue::List),
        ResolvedValue::Leaf(JsonValue::Array(items)) => items
            .into_iter()
            .map(|item| element(ResolvedValue::Leaf(item), options))
            .collect::<Result<_, _>>()
            .map(ResolvedValue::List),
        value => Ok(value),
    }
}

/// Transforms a single date-time value.
///
/// * Null, empty and non-date values are returned unchanged.
/// * Without options, the value is normalized to UTC.
/// * With a locale or timezone but no format, the value is still normalized to UTC. The locale
///   is not checked in that case.
/// * With a format, the value is rendered to a string in the requested zone and locale.
pub fn base_transform(
    value: ResolvedValue,
    options: &FormatOptions,
) -> Result<ResolvedValue, ResolverError> {
    let date_time = match &value {
        ResolvedValue::DateTime(date_time) => date_time.with_timezone(&Utc),
        ResolvedValue::Leaf(JsonValue::String(text)) => match parse_iso_8601(text.as_str()) {
            Some(date_time) => date_time,
            None => return Ok(value),
        },
        _ => return Ok(value),
    };
    if options.is_empty() {
        return Ok(ResolvedValue::DateTime(date_time.fixed_offset()));
    }

    let zone = match options.timezone.as_deref() {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| ResolverError::new(format!("Unknown time zone \"{name}\"")))?,
        None => Tz::UTC,
    };
    let zoned = date_time.with_timezone(&zone);

    match options.format.as_deref() {
        None => Ok(ResolvedValue::DateTime(
            zoned.with_timezone(&Utc).fixed_offset(),
        )),
        Some(format) => {
            // Only rendering reads the locale.
            let locale = options
                .locale
                .as_deref()
                .map(|tag| {
                    pattern::parse_locale(tag)
                        .ok_or_else(|| ResolverError::new(format!("Unknown locale \"{tag}\"")))
                })
                .transpose()?;
            pattern::render(&zoned, zone.name(), format, locale)
                .map(ResolvedValue::leaf)
                .map_err(|_| ResolverError::new(format!("Invalid date format \"{format}\"")))
        }
    }
}

/// Parses an ISO-8601 date or date-time. Values without an offset are taken to be UTC.
///
/// Accepted dates are calendar (`2020-01-01`, `20200101`, `2020-01`, `2020`), week
/// (`2020-W01-3`, `2020W013`, `2020-W01`) and ordinal (`2020-001`, `2020001`). Times may be
/// extended or basic and have hour, minute or second precision with an optional fraction, followed
/// by an optional `Z` or numeric offset.
fn parse_iso_8601(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.with_timezone(&Utc));
    }
    if !text.is_ascii() {
        return None;
    }
    let (date, time) = match text.split_once(['T', 't']) {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };
    let date = parse_date(date)?;
    let Some(time) = time else {
        return date.and_hms_opt(0, 0, 0).map(|date_time| date_time.and_utc());
    };

    let (time, offset) = split_offset(time)?;
    let date_time = NaiveDateTime::new(date, parse_time(time)?);
    match offset {
        Some(offset) => offset
            .from_local_datetime(&date_time)
            .single()
            .map(|date_time| date_time.with_timezone(&Utc)),
        None => Some(date_time.and_utc()),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Some((year, week)) = text.split_once('W') {
        let year = number(year.strip_suffix('-').unwrap_or(year))?;
        let week: String = week.chars().filter(|c| *c != '-').collect();
        let (week, day) = match week.len() {
            2 => (number(&week)?, 1),
            3 => (number(&week[..2])?, number(&week[2..])?),
            _ => return None,
        };
        let weekday = Weekday::try_from(u8::try_from(day.checked_sub(1)?).ok()?).ok()?;
        return NaiveDate::from_isoywd_opt(i32::try_from(year).ok()?, week, weekday);
    }

    let year = |text: &str| number(text).and_then(|year| i32::try_from(year).ok());
    match (text.len(), text.as_bytes().get(4)) {
        (4, _) => NaiveDate::from_ymd_opt(year(text)?, 1, 1),
        (7, Some(b'-')) => NaiveDate::from_ymd_opt(year(&text[..4])?, number(&text[5..])?, 1),
        (7, _) => NaiveDate::from_yo_opt(year(&text[..4])?, number(&text[4..])?),
        (8, Some(b'-')) => NaiveDate::from_yo_opt(year(&text[..4])?, number(&text[5..])?),
        (8, _) => NaiveDate::from_ymd_opt(
            year(&text[..4])?,
            number(&text[4..6])?,
            number(&text[6..])?,
        ),
        (10, Some(b'-')) if text.as_bytes().get(7) == Some(&b'-') => NaiveDate::from_ymd_opt(
            year(&text[..4])?,
            number(&text[5..7])?,
            number(&text[8..])?,
        ),
        _ => None,
    }
}

/// Splits a trailing `Z`, `±hh`, `±hhmm` or `±hh:mm` off a time.
fn split_offset(time: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(time) = time.strip_suffix(['Z', 'z']) {
        return Some((time, FixedOffset::east_opt(0)));
    }
    let Some(at) = time.rfind(['+', '-']) else {
        return Some((time, None));
    };
    let (time, offset) = time.split_at(at);
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let digits: String = offset[1..].chars().filter(|c| *c != ':').collect();
    let (hours, minutes) = match digits.len() {
        2 => (number(&digits)?, 0),
        4 => (number(&digits[..2])?, number(&digits[2..])?),
        _ => return None,
    };
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    Some((time, Some(FixedOffset::east_opt(sign * seconds)?)))
}

/// Parses `hh`, `hh:mm`, `hh:mm:ss` or their basic forms, with an optional `.` or `,` fraction.
fn parse_time(time: &str) -> Option<NaiveTime> {
    let (time, fraction) = match time.split_once(['.', ',']) {
        Some((time, fraction)) => (time, Some(fraction)),
        None => (time, None),
    };
    let digits: String = time.chars().filter(|c| *c != ':').collect();
    let (hour, minute, second) = match digits.len() {
        2 => (number(&digits)?, 0, 0),
        4 => (number(&digits[..2])?, number(&digits[2..])?, 0),
        6 => (
            number(&digits[..2])?,
            number(&digits[2..4])?,
            number(&digits[4..])?,
        ),
        _ => return None,
    };
    let nano = match fraction {
        Some(fraction) if !fraction.is_empty() => {
            let mut nanos: String = fraction.chars().take(9).collect();
            while nanos.len() < 9 {
                nanos.push('0');
            }
            number(&nanos)?
        }
        Some(_) => return None,
        None => 0,
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nano)
}

/// Parses a run of ASCII digits.
fn number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
