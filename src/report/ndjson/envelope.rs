//! Cucumber message envelopes and the line decoder.
//!
//! Only the four message kinds the correlator consumes are modelled, and only
//! the fields it reads. Unknown fields and other message kinds are ignored.
use serde::Deserialize;
use std::iter::Enumerate;
use std::str::Lines;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub line: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    gherkin_document: Option<GherkinDocument>,
    pickle: Option<PickleMessage>,
    test_case: Option<TestCaseMessage>,
    test_step_finished: Option<TestStepFinished>,
}

impl Envelope {
    fn into_event(self) -> Option<Event> {
        if let Some(document) = self.gherkin_document {
            return Some(Event::DocumentDeclared(document));
        }
        if let Some(pickle) = self.pickle {
            return Some(Event::PickleGenerated(pickle));
        }
        if let Some(test_case) = self.test_case {
            return Some(Event::TestCasePlanned(test_case));
        }
        self.test_step_finished.map(Event::TestStepFinished)
    }
}

/// A decoded record the correlator acts on.
#[derive(Debug)]
pub enum Event {
    DocumentDeclared(GherkinDocument),
    PickleGenerated(PickleMessage),
    TestCasePlanned(TestCaseMessage),
    TestStepFinished(TestStepFinished),
}

#[derive(Debug, Deserialize)]
pub struct GherkinDocument {
    #[serde(default)]
    pub uri: String,
    pub feature: Option<FeatureNode>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

/// Child of a feature or of a rule. Exactly one field is normally set.
#[derive(Debug, Deserialize)]
pub struct FeatureChild {
    pub background: Option<BackgroundNode>,
    pub scenario: Option<ScenarioNode>,
    pub rule: Option<RuleNode>,
}

#[derive(Debug, Deserialize)]
pub struct RuleNode {
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

#[derive(Debug, Deserialize)]
pub struct BackgroundNode {
    #[serde(default)]
    pub steps: Vec<StepNode>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<StepNode>,
}

#[derive(Debug, Deserialize)]
pub struct StepNode {
    #[serde(default)]
    pub id: String,
    pub location: Option<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleMessage {
    pub id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
    #[serde(default)]
    pub steps: Vec<PickleStepMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleStepMessage {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseMessage {
    pub id: String,
    #[serde(default)]
    pub pickle_id: String,
    #[serde(default)]
    pub test_steps: Vec<TestStepMessage>,
}

/// A planned step. Hook steps carry a `hookId` instead of a `pickleStepId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepMessage {
    #[serde(default)]
    pub id: String,
    pub pickle_step_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepFinished {
    pub test_step_id: String,
    pub test_step_result: TestStepResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestStepResult {
    pub status: String,
    pub message: Option<String>,
}

/// A line that could not be decoded into an envelope.
#[derive(Debug)]
pub struct DecodeError {
    pub line_number: usize,
    source: serde_json::Error,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to decode message on line {}: {}",
            self.line_number, self.source
        )
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Lazily decodes one envelope per non-blank line.
///
/// Malformed lines surface as errors without ending the iteration; envelopes
/// carrying none of the consumed message kinds are skipped.
pub struct RecordDecoder<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(text: &'a str) -> Self {
        RecordDecoder {
            lines: text.lines().enumerate(),
        }
    }
}

impl Iterator for RecordDecoder<'_> {
    type Item = Result<Event, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Envelope>(line) {
                Ok(envelope) => {
                    if let Some(event) = envelope.into_event() {
                        return Some(Ok(event));
                    }
                }
                Err(source) => {
                    return Some(Err(DecodeError {
                        line_number: idx + 1,
                        source,
                    }))
                }
            }
        }
        None
    }
}
