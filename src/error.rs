use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::tags::{TypeTag, Version};

pub type SerialResult<T> = Result<T, SerialError>;

#[derive(Debug, Error, Diagnostic)]
pub enum SerialError {
    #[error("unknown serialisable type {tag}")]
    #[diagnostic(code("polyserial.unknown_type"))]
    UnknownType { tag: TypeTag },
    #[error("serialisable type {tag} is already registered")]
    #[diagnostic(
        code("polyserial.duplicate_tag"),
        help("every variant owns its tag permanently; pick an unused one")
    )]
    DuplicateTag { tag: TypeTag },
    #[error("serialisable type {tag} is an abstract base marker and cannot be registered")]
    #[diagnostic(code("polyserial.reserved_tag"))]
    ReservedTag { tag: TypeTag },
    #[error("factory registered under {registered} builds objects declaring {declared}")]
    #[diagnostic(code("polyserial.tag_mismatch"))]
    TagMismatch {
        registered: TypeTag,
        declared: TypeTag,
    },
    #[error("{tag} is registered as {expected} but its objects encode as {found}")]
    #[diagnostic(
        code("polyserial.name_mismatch"),
        help("named variants must return Some from name(); anonymous ones must return None")
    )]
    NameMismatch {
        tag: TypeTag,
        expected: &'static str,
        found: &'static str,
    },
    #[error("malformed payload: {0}")]
    #[diagnostic(code("polyserial.malformed_payload"))]
    MalformedPayload(String),
    #[error("migration of {tag} failed: {failure}")]
    #[diagnostic(code("polyserial.migration"))]
    Migration {
        tag: TypeTag,
        failure: MigrationFailure,
    },
    #[error("corrupt payload: {0}")]
    #[diagnostic(code("polyserial.corrupt_payload"))]
    CorruptPayload(String),
    #[error("codec limit exceeded: {0}")]
    #[diagnostic(code("polyserial.limit_exceeded"))]
    LimitExceeded(String),
    #[error("text encoding error: {message}")]
    #[diagnostic(code("polyserial.text"))]
    Text {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
}

impl SerialError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    pub(crate) fn text(input: &str, err: &serde_json::Error) -> Self {
        let (offset, length) = json_error_span(input, err);
        Self::Text {
            message: err.to_string(),
            src: input.to_string(),
            span: (offset, length).into(),
        }
    }
}

/// Why a version-migration chain could not reach the current version.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MigrationFailure {
    #[error("payload version {found} is newer than supported version {current}")]
    FutureVersion { found: Version, current: Version },
    #[error("no migration step advances version {at} (current is {current})")]
    Stalled { at: Version, current: Version },
    #[error("step from {from} jumped to {to}, past current version {current}")]
    Overshoot {
        from: Version,
        to: Version,
        current: Version,
    },
    #[error("step from {from} failed: {message}")]
    StepFailed { from: Version, message: String },
}

fn json_error_span(input: &str, error: &serde_json::Error) -> (usize, usize) {
    let line = error.line();
    let column = error.column();
    if line == 0 || column == 0 {
        return (0, usize::from(!input.is_empty()));
    }
    let mut current_line = 1usize;
    let mut offset = 0usize;
    for chunk in input.split_inclusive('\n') {
        if current_line == line {
            let column_index = column.saturating_sub(1);
            let byte_index = chunk
                .char_indices()
                .nth(column_index)
                .map(|(idx, _)| idx)
                .unwrap_or(chunk.len().saturating_sub(1));
            offset += byte_index;
            return (offset, 1);
        }
        offset += chunk.len();
        current_line += 1;
    }
    (input.len().saturating_sub(1), usize::from(!input.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_error_points_at_offending_line() {
        let input = "[21, 1,\n  oops]";
        let err = serde_json::from_str::<serde_json::Value>(input).expect_err("invalid json");
        let SerialError::Text { span, .. } = SerialError::text(input, &err) else {
            panic!("expected text error");
        };
        assert!(span.offset() >= 8, "span should land on line two: {span:?}");
    }

    #[test]
    fn migration_error_names_the_tag() {
        let err = SerialError::Migration {
            tag: TypeTag::new(4),
            failure: MigrationFailure::FutureVersion {
                found: Version::new(3),
                current: Version::new(2),
            },
        };
        let message = err.to_string();
        assert!(message.contains("type 4"), "{message}");
        assert!(message.contains("newer than supported"), "{message}");
    }
}
