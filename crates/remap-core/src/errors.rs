use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Key absent on read. An expected outcome, not a failure.
    NotFound,
    /// Value shape rejected at the facade boundary
    InvalidType,
    /// JSON encoding or decoding failed
    Serialization,
    /// The backing engine failed (I/O, constraint, transaction)
    Persistence,
    /// Driver registration or lookup failed
    Configuration,
    /// A shared lock was poisoned by a panicking holder
    Concurrency,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidType => "ERR_INVALID_TYPE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling, plus the
/// operation, key and driver context that was active when it was raised.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    key: Option<String>,
    driver: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key: None,
            driver: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add driver name context
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Wrap this error in an outer operation, keeping its kind
    ///
    /// Used when a layer re-raises a lower layer's error: the result reads as
    /// "outer op failed" with the original error as its source.
    pub fn wrap(self, op: impl Into<String>) -> Self {
        let mut outer = ExError::new(self.kind).with_op(op);
        outer.key = self.key.clone();
        outer.source = Some(Box::new(self));
        outer
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether this error reports a missing key
    pub fn is_not_found(&self) -> bool {
        self.kind == ExErrorKind::NotFound
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the key context, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the driver context, if any
    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(driver) = &self.driver {
            write!(f, " (driver: {})", driver)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for remap operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemapError {
    /// Key does not exist in the store
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// Value serializes to a JSON shape the active policy refuses to store
    #[error("Value for key {key} cannot be set atomically: JSON {shape}")]
    InvalidType { key: String, shape: String },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Backing engine failure
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// A driver with this name is already registered
    #[error("Driver registered twice: {name}")]
    DuplicateDriver { name: String },

    /// No driver with this name is registered
    #[error("Unknown driver: {name} (forgotten import?)")]
    UnknownDriver { name: String },

    /// Registration attempted after the registry was first used
    #[error("Driver registry is frozen, cannot register {name}")]
    RegistryFrozen { name: String },

    /// A shared lock was poisoned
    #[error("Lock poisoned: {resource}")]
    LockPoisoned { resource: String },
}

/// Conversion from RemapError to ExError
impl From<RemapError> for ExError {
    fn from(err: RemapError) -> Self {
        let message = err.to_string();
        match err {
            RemapError::KeyNotFound { key } => ExError::new(ExErrorKind::NotFound)
                .with_key(key)
                .with_message(message),
            RemapError::InvalidType { key, .. } => ExError::new(ExErrorKind::InvalidType)
                .with_key(key)
                .with_message(message),
            RemapError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            RemapError::Persistence { .. } => {
                ExError::new(ExErrorKind::Persistence).with_message(message)
            }
            RemapError::DuplicateDriver { name }
            | RemapError::UnknownDriver { name }
            | RemapError::RegistryFrozen { name } => ExError::new(ExErrorKind::Configuration)
                .with_driver(name)
                .with_message(message),
            RemapError::LockPoisoned { .. } => {
                ExError::new(ExErrorKind::Concurrency).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to RemapError
impl From<serde_json::Error> for RemapError {
    fn from(err: serde_json::Error) -> Self {
        RemapError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        RemapError::from(err).into()
    }
}
