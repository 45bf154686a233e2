use thiserror::Error;

use crate::types::Side;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid label '{value}': end {end} is not after start {start}")]
    InvalidLabel { value: String, start: f64, end: f64 },
    #[error("label '{value}' starting at {start} has an open end and no closing time")]
    OpenLabelEnd { value: String, start: f64 },
    #[error("{count} overlapping {side} labels in segment [{start}, {end})")]
    OverlappingLabels {
        side: Side,
        start: f64,
        end: f64,
        count: usize,
    },
    #[error("no hypothesis found for utterance '{utterance_id}'")]
    MissingCounterpart { utterance_id: String },
    #[error("utterance '{utterance_id}': {source}")]
    Utterance {
        utterance_id: String,
        #[source]
        source: Box<AlignmentError>,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_label(value: impl Into<String>, start: f64, end: f64) -> Self {
        Self::InvalidLabel {
            value: value.into(),
            start,
            end,
        }
    }

    pub(crate) fn open_label_end(value: impl Into<String>, start: f64) -> Self {
        Self::OpenLabelEnd {
            value: value.into(),
            start,
        }
    }

    pub(crate) fn overlapping(side: Side, start: f64, end: f64, count: usize) -> Self {
        Self::OverlappingLabels {
            side,
            start,
            end,
            count,
        }
    }

    pub(crate) fn missing_counterpart(utterance_id: impl Into<String>) -> Self {
        Self::MissingCounterpart {
            utterance_id: utterance_id.into(),
        }
    }

    pub(crate) fn in_utterance(self, utterance_id: impl Into<String>) -> Self {
        Self::Utterance {
            utterance_id: utterance_id.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// The innermost error, skipping any utterance wrappers.
    pub fn root(&self) -> &AlignmentError {
        match self {
            Self::Utterance { source, .. } => source.root(),
            other => other,
        }
    }
}
