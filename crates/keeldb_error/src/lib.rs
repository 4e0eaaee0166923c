use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Result type used throughout the system.
pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Error type used throughout the system.
///
/// Cheap to clone. A single error may need to fan out to multiple observers,
/// e.g. a cancellation cause that is both recorded on a task and forwarded to
/// a source, so the underlying cause is reference counted.
#[derive(Debug, Clone)]
pub struct DbError {
    /// Message for the error.
    message: String,
    /// Optional underlying cause.
    source: Option<Arc<dyn Error + Send + Sync>>,
    /// Key/value pairs providing additional context for the error.
    fields: Vec<(&'static str, String)>,
}

impl DbError {
    pub fn new(message: impl Into<String>) -> Self {
        DbError {
            message: message.into(),
            source: None,
            fields: Vec::new(),
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: Box<dyn Error + Send + Sync>,
    ) -> Self {
        DbError {
            message: message.into(),
            source: Some(Arc::from(source)),
            fields: Vec::new(),
        }
    }

    /// Attach a key/value pair to the error.
    pub fn with_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        for (key, value) in &self.fields {
            write!(f, "\n{key} = {value}")?;
        }
        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Wrap an error with a static context message.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap an error with a lazily computed context message.
    fn context_fn(self, f: impl FnOnce() -> String) -> Result<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| DbError::with_source(msg, Box::new(e)))
    }

    fn context_fn(self, f: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| DbError::with_source(f(), Box::new(e)))
    }
}
