use thiserror::Error;


/// Failures surfaced to the embedding caller. Shader compile and link
/// problems are reported through the log instead and never abort the
/// command stream.
#[derive(Debug, Error)]
pub enum GlirError {
	#[error("no {expected} '{id}' in namespace")]
	Reference {
		id: String,
		expected: &'static str,
	},

	#[error("unsupported command '{0}'")]
	UnsupportedCommand(String),

	#[error("malformed command: {0}")]
	Malformed(String),
}

impl GlirError {
	pub(crate) fn reference(id: &str, expected: &'static str) -> GlirError {
		GlirError::Reference {
			id: id.to_owned(),
			expected,
		}
	}

	pub(crate) fn malformed(reason: impl Into<String>) -> GlirError {
		GlirError::Malformed(reason.into())
	}
}
