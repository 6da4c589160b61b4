//! Static checks on the submitted source text.

/// A parsed `check` expression.
///
/// The only supported form is `contains '<literal>'`. Anything else parses to
/// [`QualityCheck::Unsupported`], which never passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityCheck {
    Contains(String),
    Unsupported(String),
}

impl QualityCheck {
    pub fn parse(expression: &str) -> Self {
        let trimmed = expression.trim();
        trimmed
            .strip_prefix("contains")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(str::trim)
            .and_then(|rest| rest.strip_prefix('\''))
            .and_then(|rest| rest.strip_suffix('\''))
            .map(|literal| Self::Contains(literal.to_string()))
            .unwrap_or_else(|| Self::Unsupported(trimmed.to_string()))
    }

    pub fn evaluate(&self, source: &str) -> bool {
        match self {
            Self::Contains(literal) => source.contains(literal.as_str()),
            Self::Unsupported(_) => false,
        }
    }
}
