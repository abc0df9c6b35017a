//! Rendering of date-times with token-based format strings such as `yyyy-MM-dd HH:mm`.
//!
//! Tokens are runs of the same letter; text between single quotes is copied verbatim, and so is
//! any character that is not a letter. Supported tokens:
//!
//! | token | output | token | output |
//! |-------|--------|-------|--------|
//! | `y` `yyyy` | year (`2020`) | `yy` | two-digit year (`20`) |
//! | `M` `MM` | month number (`1`, `01`) | `MMM` `MMMM` | month name (`Jan`, `January`) |
//! | `d` `dd` | day of month | `o` `ooo` | day of year |
//! | `E` | ISO weekday number | `EEE` `EEEE` | weekday name (`Wed`, `Wednesday`) |
//! | `H` `HH` | 24-hour | `h` `hh` | 12-hour |
//! | `m` `mm` | minute | `s` `ss` | second |
//! | `S` | millisecond (`5`) | `SSS` | millisecond, padded (`005`) |
//! | `Z` `ZZ` | offset (`+01:00`) | `ZZZ` | offset (`+0100`) |
//! | `z` | IANA zone name (`Europe/Paris`) | `ZZZZ` | zone abbreviation (`CET`) |
//! | `q` | quarter (`1`) | `qq` | quarter, padded (`01`) |
//! | `a` | meridiem | `W` `WW` | ISO week |
//! | `kkkk` | ISO week year | | |
//!
//! `L` and `c` are accepted as stand-alone aliases of `M` and `E`. Unknown letters are printed
//! as they are. `ZZZZZ` has no long zone name to print and renders the abbreviation.
use std::fmt;
use std::fmt::Write;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Locale;
use chrono::TimeZone;

/// Renders `date_time` according to `pattern`, localizing names when a locale is given.
///
/// `zone_name` is the IANA name printed for `z`.
pub(crate) fn render<Tz>(
    date_time: &DateTime<Tz>,
    zone_name: &str,
    pattern: &str,
    locale: Option<Locale>,
) -> Result<String, fmt::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let computed = Computed {
        quarter: (date_time.month() - 1) / 3 + 1,
        millisecond: date_time.timestamp_subsec_millis(),
        zone_name,
    };
    let format = to_strftime(pattern, &computed);
    let mut rendered = String::new();
    match locale {
        Some(locale) => write!(rendered, "{}", date_time.format_localized(&format, locale))?,
        None => write!(rendered, "{}", date_time.format(&format))?,
    }
    Ok(rendered)
}

/// Parses a locale tag such as `fr-FR`, `fr_FR` or `fr`.
pub(crate) fn parse_locale(tag: &str) -> Option<Locale> {
    let tag = tag.replace('-', "_");
    if let Ok(locale) = Locale::try_from(tag.as_str()) {
        return Some(locale);
    }
    // A bare language: try its most common territory.
    let region = match tag.as_str() {
        "en" => "US".to_owned(),
        language if !language.contains('_') => language.to_uppercase(),
        _ => return None,
    };
    Locale::try_from(format!("{tag}_{region}").as_str()).ok()
}

/// Values for the tokens `strftime` cannot express.
struct Computed<'a> {
    quarter: u32,
    millisecond: u32,
    zone_name: &'a str,
}

/// Translates a token pattern into a chrono `strftime` format string.
fn to_strftime(pattern: &str, computed: &Computed<'_>) -> String {
    let mut format = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // `''` is an escaped quote, inside or outside of quoted text.
            if chars.peek() == Some(&'\'') {
                chars.next();
                format.push('\'');
                continue;
            }
            while let Some(literal) = chars.next() {
                if literal != '\'' {
                    push_literal(&mut format, literal);
                } else if chars.peek() == Some(&'\'') {
                    chars.next();
                    format.push('\'');
                } else {
                    break;
                }
            }
        } else if c.is_ascii_alphabetic() {
            let mut len = 1;
            while chars.peek() == Some(&c) {
                chars.next();
                len += 1;
            }
            match (c, len) {
                ('q', 1) => format.push_str(&computed.quarter.to_string()),
                ('q', _) => format.push_str(&format!("{:02}", computed.quarter)),
                ('S', 1 | 2) => format.push_str(&computed.millisecond.to_string()),
                ('z', _) => computed
                    .zone_name
                    .chars()
                    .for_each(|name_char| push_literal(&mut format, name_char)),
                _ => match token(c, len) {
                    Some(spec) => format.push_str(spec),
                    None => (0..len).for_each(|_| push_literal(&mut format, c)),
                },
            }
        } else {
            push_literal(&mut format, c);
        }
    }
    format
}

fn token(c: char, len: usize) -> Option<&'static str> {
    let spec = match (c, len) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('o', 1) => "%-j",
        ('o', _) => "%j",
        ('E' | 'c', 1 | 2) => "%u",
        ('E' | 'c', 3) => "%a",
        ('E' | 'c', _) => "%A",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('S', _) => "%3f",
        ('a', _) => "%p",
        ('Z', 1 | 2) => "%:z",
        ('Z', 3) => "%z",
        ('Z', _) => "%Z",
        ('W', 1) => "%-V",
        ('W', _) => "%V",
        ('k', _) => "%G",
        _ => return None,
    };
    Some(spec)
}

fn push_literal(format: &mut String, c: char) {
    if c == '%' {
        format.push_str("%%");
    } else {
        format.push(c);
    }
}
