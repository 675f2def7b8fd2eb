use brief_core::{ContextField, Message, ReportContext};
use std::collections::HashMap;

/// Where a conversation stands on gathering the report context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NeedSubject,
    NeedTimeRange,
    NeedReportKind,
    Complete,
}

impl GateState {
    /// The first unset field, in priority order, decides the state.
    pub fn evaluate(context: &ReportContext) -> Self {
        match context.first_missing() {
            Some(ContextField::Subject) => GateState::NeedSubject,
            Some(ContextField::TimeRange) => GateState::NeedTimeRange,
            Some(ContextField::ReportKind) => GateState::NeedReportKind,
            None => GateState::Complete,
        }
    }

    pub fn missing_field(&self) -> Option<ContextField> {
        match self {
            GateState::NeedSubject => Some(ContextField::Subject),
            GateState::NeedTimeRange => Some(ContextField::TimeRange),
            GateState::NeedReportKind => Some(ContextField::ReportKind),
            GateState::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, GateState::Complete)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Ask the user for one missing field.
    Ask { field: ContextField, question: Message },
    Proceed,
}

/// Decides whether a conversation needs a clarifying question before work starts.
///
/// Each pass asks for at most one field. Fields are never modified here.
#[derive(Debug, Clone, Default)]
pub struct CompletionGate {
    questions: HashMap<ContextField, String>,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the question asked for `field`.
    pub fn with_question(mut self, field: ContextField, question: impl Into<String>) -> Self {
        self.questions.insert(field, question.into());
        self
    }

    pub fn question_for(&self, field: ContextField) -> &str {
        self.questions.get(&field).map(String::as_str).unwrap_or_else(|| default_question(field))
    }

    pub fn decide(&self, context: &ReportContext) -> GateDecision {
        match GateState::evaluate(context).missing_field() {
            Some(field) => GateDecision::Ask { field, question: Message::ai(self.question_for(field)) },
            None => GateDecision::Proceed,
        }
    }
}

pub fn default_question(field: ContextField) -> &'static str {
    match field {
        ContextField::Subject => "Which company or topic is this report for?",
        ContextField::TimeRange => "What time range should the report cover?",
        ContextField::ReportKind => "What kind of report do you need (for example financial or summary)?",
    }
}
