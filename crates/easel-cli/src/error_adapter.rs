//! Error adapter for rendering [`CliError`] with miette.
//!
//! Each error gets a diagnostic code naming the layer it came from. Model
//! and command failures carry a hint about what usually causes them.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use easel::EaselError;

use crate::error::CliError;

/// Adapter implementing [`MietteDiagnostic`] for a [`CliError`].
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Io(_) | CliError::Snapshot(_) => "easel::io",
            CliError::Config(_) => "easel::config",
            CliError::Parse(_) | CliError::Script { .. } => "easel::script",
            CliError::Command { .. } => "easel::command",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Script { .. } => "name elements with `name = ...` when creating them",
            CliError::Command {
                source: EaselError::Denied { .. },
                ..
            } => "the rules refused the operation; nothing was changed",
            CliError::Command {
                source: EaselError::Model(_),
                ..
            } => "the step refers to an element that is missing or of the wrong kind",
            CliError::Config(_) => "see the [layout], [grid] and [modeling] sections",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(err: &CliError) -> Option<String> {
        ErrorAdapter(err).code().map(|code| code.to_string())
    }

    #[test]
    fn test_codes() {
        assert_eq!(code(&CliError::Parse("bad".to_string())).as_deref(), Some("easel::script"));
        assert_eq!(code(&CliError::Config("bad".to_string())).as_deref(), Some("easel::config"));

        let err = CliError::Command {
            step: 2,
            op: "resize",
            source: EaselError::Denied {
                command: "shape.resize".to_string(),
            },
        };
        assert_eq!(code(&err).as_deref(), Some("easel::command"));
        assert!(ErrorAdapter(&err).help().is_some());
    }

    #[test]
    fn test_display_passes_through() {
        let err = CliError::script(3, "connect", "unknown element `x`");
        assert_eq!(
            ErrorAdapter(&err).to_string(),
            "Step 3 (`connect`): unknown element `x`"
        );
    }
}
