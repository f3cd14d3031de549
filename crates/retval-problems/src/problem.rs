//! The `Problem` capability and the concrete problems shipped with retval.

use smol_str::SmolStr;
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// An immutable diagnostic with a human-readable message.
///
/// `Display` is the debug rendering used by `debug_problems`; the
/// `local_message` is the bare message meant for end users.
pub trait Problem: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The localized, human-readable message.
    fn local_message(&self) -> &str;

    /// The origin locator, for problems that know where they came from.
    fn origin(&self) -> Option<&str> {
        None
    }

    /// Access to the concrete problem type, for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A problem that carries an origin locator (a path, a URL, a key...).
pub trait SourcedProblem: Problem {
    /// Where the problem came from.
    fn source_locator(&self) -> &str;
}

/// A shared reference to a problem. Problems are freely shared between
/// containers; nothing ever mutates one.
pub type ProblemRef = Arc<dyn Problem>;

impl dyn Problem {
    /// Downcast to a concrete problem type.
    #[must_use]
    pub fn downcast_ref<P: Problem>(&self) -> Option<&P> {
        self.as_any().downcast_ref::<P>()
    }

    /// Check whether this problem is of the given concrete type.
    #[must_use]
    pub fn is<P: Problem>(&self) -> bool {
        self.as_any().is::<P>()
    }
}

/// Conversion into a shared problem reference.
///
/// Implemented for every concrete problem and for `ProblemRef` itself, so
/// constructors accept either without double wrapping.
pub trait IntoProblem {
    fn into_problem_ref(self) -> ProblemRef;
}

impl<P: Problem> IntoProblem for P {
    fn into_problem_ref(self) -> ProblemRef {
        Arc::new(self)
    }
}

impl IntoProblem for ProblemRef {
    fn into_problem_ref(self) -> ProblemRef {
        self
    }
}

impl IntoProblem for &ProblemRef {
    fn into_problem_ref(self) -> ProblemRef {
        Arc::clone(self)
    }
}

// ============================================================================
// LocalizedProblem
// ============================================================================

/// A plain problem: just a localized message. Equality is by message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalizedProblem {
    #[cfg_attr(feature = "serde", serde(with = "arc_str_serde"))]
    message: Arc<str>,
}

impl LocalizedProblem {
    /// Create a problem from an already-localized message.
    #[must_use]
    pub fn from(message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Problem for LocalizedProblem {
    fn local_message(&self) -> &str {
        &self.message
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for LocalizedProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(feature = "serde")]
mod arc_str_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::sync::Arc;

    pub fn serialize<S: Serializer>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error> {
        value.as_ref().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arc<str>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Arc::from(s))
    }
}

// ============================================================================
// FileProblem
// ============================================================================

/// A problem tied to a file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileProblem {
    path: SmolStr,
    #[cfg_attr(feature = "serde", serde(with = "arc_str_serde"))]
    message: Arc<str>,
}

impl FileProblem {
    /// Create a file problem with an explicit message.
    #[must_use]
    pub fn new(path: impl Into<SmolStr>, message: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file problem from an I/O failure on `path`.
    ///
    /// The message is the I/O error's own text, or "`<path>` caused a
    /// problem" when the error renders as an empty string.
    #[must_use]
    pub fn from_io(path: impl Into<SmolStr>, error: &io::Error) -> Self {
        let path = path.into();
        let message = error_text(error, || format!("{path} caused a problem"));
        Self {
            path,
            message: message.into(),
        }
    }

    /// The file path this problem refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Problem for FileProblem {
    fn local_message(&self) -> &str {
        &self.message
    }

    fn origin(&self) -> Option<&str> {
        Some(&self.path)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SourcedProblem for FileProblem {
    fn source_locator(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for FileProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

// ============================================================================
// UnhandledExceptionProblem
// ============================================================================

/// Wraps an error raised by a called operation so it can travel as a
/// problem. The original error is retained for inspection.
#[derive(Clone)]
pub struct UnhandledExceptionProblem {
    source: Arc<dyn Error + Send + Sync + 'static>,
    message: String,
}

impl UnhandledExceptionProblem {
    /// Wrap an error. An error with an empty message is described by its
    /// type name.
    #[must_use]
    pub fn wrap<E: Error + Send + Sync + 'static>(source: E) -> Self {
        let message = error_text(&source, || std::any::type_name::<E>().to_string());
        Self {
            source: Arc::new(source),
            message,
        }
    }

    /// Wrap an already boxed error.
    #[must_use]
    pub fn from_boxed(source: Box<dyn Error + Send + Sync + 'static>) -> Self {
        let message = error_text(source.as_ref(), || "unhandled error".to_string());
        Self {
            source: Arc::from(source),
            message,
        }
    }

    /// The wrapped error.
    #[must_use]
    pub fn source_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Downcast the wrapped error to its concrete type.
    #[must_use]
    pub fn downcast_source<E: Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }
}

impl Problem for UnhandledExceptionProblem {
    fn local_message(&self) -> &str {
        &self.message
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for UnhandledExceptionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnhandledExceptionProblem")
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for UnhandledExceptionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn error_text<E: Error + ?Sized>(error: &E, fallback: impl FnOnce() -> String) -> String {
    let text = error.to_string();
    if text.is_empty() {
        fallback()
    } else {
        text
    }
}

// ============================================================================
// ValueRequiredProblem
// ============================================================================

/// Reported when a nullable result is narrowed to a non-null one but holds
/// no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValueRequiredProblem;

impl ValueRequiredProblem {
    pub const MESSAGE: &'static str = "value required";
}

impl Problem for ValueRequiredProblem {
    fn local_message(&self) -> &str {
        Self::MESSAGE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for ValueRequiredProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("")]
    struct SilentError;

    #[test]
    fn test_localized_equality_by_message() {
        let a = LocalizedProblem::from("bad input");
        let b = LocalizedProblem::from(String::from("bad input"));
        assert_eq!(a, b);
        assert_ne!(a, LocalizedProblem::from("other"));
        assert_eq!(a.to_string(), "bad input");
        assert_eq!(a.origin(), None);
    }

    #[test]
    fn test_file_problem_from_io() {
        let err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let problem = FileProblem::from_io("conf/app.properties", &err);
        assert_eq!(problem.local_message(), "no such file");
        assert_eq!(problem.origin(), Some("conf/app.properties"));
        assert_eq!(problem.source_locator(), "conf/app.properties");
        assert_eq!(problem.to_string(), "conf/app.properties: no such file");
    }

    #[test]
    fn test_file_problem_from_io_empty_message() {
        let err = io::Error::new(io::ErrorKind::Other, SilentError);
        let problem = FileProblem::from_io("data.bin", &err);
        assert_eq!(problem.local_message(), "data.bin caused a problem");
    }

    #[test]
    fn test_unhandled_exception_keeps_source() {
        let problem =
            UnhandledExceptionProblem::wrap(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        assert_eq!(problem.local_message(), "disk on fire");
        let source = problem
            .downcast_source::<io::Error>()
            .expect("source should be an io::Error");
        assert_eq!(source.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_unhandled_exception_empty_message_uses_type_name() {
        let problem = UnhandledExceptionProblem::wrap(SilentError);
        assert!(problem.local_message().ends_with("SilentError"));
    }

    #[test]
    fn test_downcast_problem_ref() {
        let problem: ProblemRef = ValueRequiredProblem.into_problem_ref();
        assert!(problem.is::<ValueRequiredProblem>());
        assert!(problem.downcast_ref::<LocalizedProblem>().is_none());
        assert_eq!(problem.local_message(), "value required");
    }

    #[test]
    fn test_into_problem_ref_does_not_rewrap() {
        let original: ProblemRef = Arc::new(LocalizedProblem::from("x"));
        let again = Arc::clone(&original).into_problem_ref();
        assert!(Arc::ptr_eq(&original, &again));
    }
}
