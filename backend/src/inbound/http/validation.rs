//! Declarative request validation for inbound HTTP adapters.
//!
//! Each request body is checked against a table of [`FieldRule`]s rather
//! than hand-written per-field branches. All failures for a body are
//! collected and returned in a single validation error so clients see
//! every problem at once, as a `fields` array in the error details.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // E.164: plus sign, then 2 to 15 digits, no leading zero.
        let pattern = r"^\+[1-9]\d{1,14}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Shape constraint a field value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Format {
    /// Non-empty text up to `max` characters.
    Text { max: usize },
    /// RFC-5322-ish mailbox shape. Deliverability is not checked.
    Email,
    /// Absolute URL with a scheme.
    Url,
    /// E.164 phone number.
    PhoneE164,
    /// Degrees in [-90, 90].
    Latitude,
    /// Degrees in [-180, 180].
    Longitude,
}

/// View of a request field the rule engine can check.
///
/// Extraction closures map a DTO field to one of these; `Absent` covers
/// both a missing key and an explicit null.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Number(f64),
    /// A list whose every item must satisfy the rule's format.
    Items(&'a [String]),
}

/// One row of a request body's validation table.
pub(crate) struct FieldRule<T> {
    field: FieldName,
    required: bool,
    format: Format,
    get: fn(&T) -> FieldValue<'_>,
}

impl<T> FieldRule<T> {
    pub(crate) const fn required(
        field: FieldName,
        format: Format,
        get: fn(&T) -> FieldValue<'_>,
    ) -> Self {
        Self {
            field,
            required: true,
            format,
            get,
        }
    }

    pub(crate) const fn optional(
        field: FieldName,
        format: Format,
        get: fn(&T) -> FieldValue<'_>,
    ) -> Self {
        Self {
            field,
            required: false,
            format,
            get,
        }
    }
}

/// A single field's validation failure, serialized into the error details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldFailure {
    field: &'static str,
    code: &'static str,
    message: String,
    index: Option<usize>,
}

impl FieldFailure {
    fn new(field: FieldName, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            code,
            message: message.into(),
            index: None,
        }
    }

    fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn missing(field: FieldName) -> Self {
        let name = field.as_str();
        Self::new(field, "missing_field", format!("{name} is required"))
    }

    pub(crate) fn custom(field: FieldName, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(field, code, message)
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = json!({
            "field": self.field,
            "code": self.code,
            "message": self.message,
        });
        if let Some(index) = self.index {
            value["index"] = json!(index);
        }
        value
    }
}

fn check_format(field: FieldName, format: Format, value: FieldValue<'_>) -> Option<FieldFailure> {
    let name = field.as_str();
    match (format, value) {
        (_, FieldValue::Absent) => None,
        (Format::Text { max }, FieldValue::Text(text)) => {
            if text.trim().is_empty() {
                Some(FieldFailure::new(
                    field,
                    "empty_field",
                    format!("{name} must not be empty"),
                ))
            } else if text.chars().count() > max {
                Some(FieldFailure::new(
                    field,
                    "too_long",
                    format!("{name} must be at most {max} characters"),
                ))
            } else {
                None
            }
        }
        (Format::Email, FieldValue::Text(text)) => (!email_regex().is_match(text)).then(|| {
            FieldFailure::new(
                field,
                "invalid_email",
                format!("{name} must be a valid email address"),
            )
        }),
        (Format::Url, FieldValue::Text(text)) => url::Url::parse(text).err().map(|_| {
            FieldFailure::new(
                field,
                "invalid_url",
                format!("{name} must be an absolute URL"),
            )
        }),
        (Format::PhoneE164, FieldValue::Text(text)) => (!phone_regex().is_match(text)).then(|| {
            FieldFailure::new(
                field,
                "invalid_phone",
                format!("{name} must be an E.164 phone number"),
            )
        }),
        (Format::Latitude, FieldValue::Number(degrees)) => (!(-90.0..=90.0).contains(&degrees))
            .then(|| {
                FieldFailure::new(
                    field,
                    "out_of_range",
                    format!("{name} must be between -90 and 90"),
                )
            }),
        (Format::Longitude, FieldValue::Number(degrees)) => (!(-180.0..=180.0).contains(&degrees))
            .then(|| {
                FieldFailure::new(
                    field,
                    "out_of_range",
                    format!("{name} must be between -180 and 180"),
                )
            }),
        (format, FieldValue::Items(items)) => items.iter().enumerate().find_map(|(index, item)| {
            check_format(field, format, FieldValue::Text(item))
                .map(|failure| failure.at_index(index))
        }),
        // A rule whose extractor yields a shape the format cannot judge is
        // a programming error in the table, not a client error.
        (format, value) => Some(FieldFailure::new(
            field,
            "invalid_type",
            format!("{name} has an unexpected shape for {format:?} ({value:?})"),
        )),
    }
}

/// Run a rule table over a request body, collecting every failure.
pub(crate) fn apply_rules<T>(rules: &[FieldRule<T>], body: &T) -> Vec<FieldFailure> {
    rules
        .iter()
        .filter_map(|rule| {
            let value = (rule.get)(body);
            if matches!(value, FieldValue::Absent) {
                return rule.required.then(|| FieldFailure::missing(rule.field));
            }
            check_format(rule.field, rule.format, value)
        })
        .collect()
}

/// Collapse accumulated failures into a single domain validation error.
///
/// Returns `Ok(())` when the list is empty so call sites can end a
/// validation block with `?`.
pub(crate) fn into_result(failures: Vec<FieldFailure>) -> Result<(), Error> {
    if failures.is_empty() {
        return Ok(());
    }
    let fields: Vec<_> = failures.iter().map(FieldFailure::to_json).collect();
    Err(Error::validation("request validation failed").with_details(json!({ "fields": fields })))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "value": value,
        "code": "invalid_uuid",
    }))
}

/// Parse a path or body identifier, reporting which field was malformed.
pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a list of identifiers, reporting the index of the first bad one.
pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value).map_err(|_| {
                let name = field.as_str();
                Error::invalid_request(format!("{name} must contain valid UUIDs")).with_details(
                    json!({
                        "field": name,
                        "index": index,
                        "value": value,
                        "code": "invalid_uuid",
                    }),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Body {
        name: Option<String>,
        email: Option<String>,
        latitude: Option<f64>,
        image_urls: Vec<String>,
    }

    fn text(value: &Option<String>) -> FieldValue<'_> {
        value
            .as_deref()
            .map_or(FieldValue::Absent, FieldValue::Text)
    }

    const RULES: &[FieldRule<Body>] = &[
        FieldRule::required(FieldName::new("name"), Format::Text { max: 255 }, |b| {
            text(&b.name)
        }),
        FieldRule::required(FieldName::new("email"), Format::Email, |b| text(&b.email)),
        FieldRule::optional(FieldName::new("latitude"), Format::Latitude, |b| {
            b.latitude.map_or(FieldValue::Absent, FieldValue::Number)
        }),
        FieldRule::optional(FieldName::new("image_urls"), Format::Url, |b| {
            FieldValue::Items(&b.image_urls)
        }),
    ];

    fn valid_body() -> Body {
        Body {
            name: Some("Acme Corp".into()),
            email: Some("a@x.com".into()),
            latitude: Some(13.7388),
            image_urls: vec!["https://example.com/logo.png".into()],
        }
    }

    #[test]
    fn valid_body_passes() {
        assert!(apply_rules(RULES, &valid_body()).is_empty());
    }

    #[test]
    fn all_failures_are_collected_not_just_the_first() {
        let body = Body {
            name: None,
            email: Some("not-an-email".into()),
            latitude: Some(91.0),
            image_urls: vec!["https://example.com".into(), "no scheme".into()],
        };

        let failures = apply_rules(RULES, &body);
        let codes: Vec<_> = failures.iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            vec!["missing_field", "invalid_email", "out_of_range", "invalid_url"]
        );
        assert_eq!(failures[3].index, Some(1));
    }

    #[test]
    fn optional_absent_fields_are_skipped() {
        let body = Body {
            latitude: None,
            image_urls: Vec::new(),
            ..valid_body()
        };
        assert!(apply_rules(RULES, &body).is_empty());
    }

    #[rstest]
    #[case("a@x.com", true)]
    #[case("first.last+tag@sub.example.org", true)]
    #[case("not-an-email", false)]
    #[case("two@@x.com", false)]
    #[case("spaced name@x.com", false)]
    fn email_shapes(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(email_regex().is_match(candidate), ok);
    }

    #[rstest]
    #[case("+15551234567", true)]
    #[case("+442071838750", true)]
    #[case("15551234567", false)]
    #[case("+0123", false)]
    #[case("+1 555 123 4567", false)]
    fn phone_shapes(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(phone_regex().is_match(candidate), ok);
    }

    #[test]
    fn empty_failure_list_is_ok() {
        assert!(into_result(Vec::new()).is_ok());
    }

    #[test]
    fn failures_aggregate_into_one_validation_error() {
        let err = into_result(vec![
            FieldFailure::missing(FieldName::new("name")),
            FieldFailure::custom(FieldName::new("longitude"), "missing_pair", "whoops"),
        ])
        .expect_err("failures should error");

        assert_eq!(err.code(), crate::domain::ErrorCode::Validation);
        let details = err.details().expect("details");
        assert_eq!(details["fields"].as_array().expect("fields array").len(), 2);
    }

    #[test]
    fn uuid_parse_reports_the_field() {
        let err = parse_uuid("not-a-uuid", FieldName::new("id")).expect_err("parse should fail");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
        assert_eq!(err.details().expect("details")["field"], "id");
    }

    #[test]
    fn uuid_list_parse_reports_the_offending_index() {
        let values = vec![
            Uuid::new_v4().to_string(),
            "not-a-uuid".into(),
        ];
        let err =
            parse_uuid_list(&values, FieldName::new("ids")).expect_err("parse should fail");
        assert_eq!(err.details().expect("details")["index"], 1);
    }
}
