use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the three fields a report request must carry before work can start.
///
/// [`ContextField::ALL`] is also the order in which missing fields are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    Subject,
    TimeRange,
    ReportKind,
}

impl ContextField {
    pub const ALL: [ContextField; 3] =
        [ContextField::Subject, ContextField::TimeRange, ContextField::ReportKind];

    pub fn key(&self) -> &'static str {
        match self {
            ContextField::Subject => "subject",
            ContextField::TimeRange => "time_range",
            ContextField::ReportKind => "report_kind",
        }
    }

    /// Older key accepted when decoding extraction output.
    pub fn legacy_key(&self) -> &'static str {
        match self {
            ContextField::Subject => "company",
            ContextField::TimeRange => "time_duration",
            ContextField::ReportKind => "report_type",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContextField::Subject => "Subject",
            ContextField::TimeRange => "Time range",
            ContextField::ReportKind => "Report kind",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Subject, time range and report kind of the report being requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    #[serde(default, alias = "company")]
    pub subject: Option<String>,
    #[serde(default, alias = "time_duration")]
    pub time_range: Option<String>,
    #[serde(default, alias = "report_type")]
    pub report_kind: Option<String>,
}

impl ReportContext {
    pub fn new(
        subject: Option<&str>,
        time_range: Option<&str>,
        report_kind: Option<&str>,
    ) -> Self {
        Self {
            subject: subject.and_then(normalize_value),
            time_range: time_range.and_then(normalize_value),
            report_kind: report_kind.and_then(normalize_value),
        }
    }

    pub fn get(&self, field: ContextField) -> Option<&str> {
        match field {
            ContextField::Subject => self.subject.as_deref(),
            ContextField::TimeRange => self.time_range.as_deref(),
            ContextField::ReportKind => self.report_kind.as_deref(),
        }
    }

    /// Sets `field` to the normalized `value`; blank or placeholder values clear it.
    pub fn set(&mut self, field: ContextField, value: &str) {
        let slot = match field {
            ContextField::Subject => &mut self.subject,
            ContextField::TimeRange => &mut self.time_range,
            ContextField::ReportKind => &mut self.report_kind,
        };
        *slot = normalize_value(value);
    }

    pub fn is_complete(&self) -> bool {
        ContextField::ALL.iter().all(|f| self.get(*f).is_some())
    }

    pub fn first_missing(&self) -> Option<ContextField> {
        ContextField::ALL.into_iter().find(|f| self.get(*f).is_none())
    }

    pub fn missing(&self) -> Vec<ContextField> {
        ContextField::ALL.into_iter().filter(|f| self.get(*f).is_none()).collect()
    }

    /// Copies fields from `other` into the ones still unset here. Known fields are kept.
    pub fn fill_missing_from(&mut self, other: &ReportContext) {
        for field in ContextField::ALL {
            if self.get(field).is_none() {
                if let Some(value) = other.get(field) {
                    self.set(field, value);
                }
            }
        }
    }

    /// Reads a context from a loosely shaped JSON object.
    ///
    /// Both current and legacy keys are accepted, numbers are taken as their decimal
    /// text, and anything else (null, arrays, objects) counts as unset.
    pub fn from_json_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut ctx = ReportContext::default();
        for field in ContextField::ALL {
            let raw = object.get(field.key()).or_else(|| object.get(field.legacy_key()));
            let text = match raw {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            if let Some(text) = text {
                ctx.set(field, &text);
            }
        }
        Some(ctx)
    }

    /// `Subject: Acme, Time range: Q1, Report kind: financial`
    pub fn summary(&self) -> String {
        ContextField::ALL
            .iter()
            .map(|f| format!("{}: {}", f.label(), self.get(*f).unwrap_or("unknown")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "null" | "none" | "unknown" | "n/a" => None,
        _ => Some(trimmed.to_string()),
    }
}
