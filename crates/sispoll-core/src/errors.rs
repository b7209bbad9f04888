use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure in the poller is classified into one of these kinds. Each
/// kind maps to a stable error code used in log lines and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Per-record
    /// A fetched record is malformed (missing or unparseable timestamp, empty id)
    InvalidRecord,
    /// A row already exists for this resource_id
    AlreadyExists,

    // Per-source
    /// A single source could not be fetched or parsed
    Fetch,
    Timeout,

    // Whole run
    /// Every configured source failed, so there is nothing to reconcile
    NoSnapshot,
    /// Some sources failed where a complete snapshot is required
    IncompleteSnapshot,
    /// The baseline store could not be opened or prepared
    StoreUnavailable,
    InvalidConfig,

    // Integration/IO
    Io,
    Persistence,
    ExternalService,
    Unauthorised,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidRecord => "ERR_INVALID_RECORD",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::Fetch => "ERR_FETCH",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::NoSnapshot => "ERR_NO_SNAPSHOT",
            ExErrorKind::IncompleteSnapshot => "ERR_INCOMPLETE_SNAPSHOT",
            ExErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind aborts the whole run.
    ///
    /// Per-record and per-source kinds are recovered locally by the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NoSnapshot
                | ExErrorKind::IncompleteSnapshot
                | ExErrorKind::StoreUnavailable
                | ExErrorKind::InvalidConfig
                | ExErrorKind::Internal
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context (operation, resource,
/// source) for log lines.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    resource_id: Option<String>,
    source_name: Option<String>,
    message: String,
    cause: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            resource_id: None,
            source_name: None,
            message: String::new(),
            cause: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the offending resource_id
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    /// Add the name of the snapshot source (network code)
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Chain an underlying error
    pub fn with_cause(mut self, cause: ExError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&ExError> {
        self.cause.as_deref()
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
        if let Some(resource_id) = &self.resource_id {
            write!(f, " (resource_id: {})", resource_id)?;
        }
        if let Some(source_name) = &self.source_name {
            write!(f, " (source: {})", source_name)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, " caused by {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Typed domain errors raised by the reconciliation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollerError {
    /// Fetched record has no usable last-modified timestamp
    #[error("Record {resource_id} has a missing or unparseable timestamp")]
    InvalidTimestamp { resource_id: String },

    /// Fetched record has an empty resource identifier
    #[error("Record has an empty resource_id")]
    EmptyResourceId,

    /// Listing timestamp text could not be parsed
    #[error("Cannot parse listing timestamp '{text}': {reason}")]
    UnparseableTimestamp { text: String, reason: String },

    /// One snapshot source failed to fetch or parse
    #[error("Fetching source {source_name} failed: {reason}")]
    SourceFetchFailed { source_name: String, reason: String },

    /// Every configured source failed
    #[error("All {attempted} snapshot sources failed; nothing to reconcile")]
    NoSnapshot { attempted: usize },

    /// A run that replaces the whole baseline saw failed sources
    #[error("{} of {attempted} snapshot sources failed ({}); refusing to replace the baseline", failed.len(), failed.join(", "))]
    IncompleteSnapshot { failed: Vec<String>, attempted: usize },

    /// No snapshot sources were configured
    #[error("No snapshot sources configured")]
    NoSources,

    /// Row already present in the baseline
    #[error("Baseline already contains {resource_id}")]
    DuplicateBaselineRow { resource_id: String },
}

/// Conversion from PollerError to ExError
impl From<PollerError> for ExError {
    fn from(err: PollerError) -> Self {
        let message = err.to_string();
        match err {
            PollerError::InvalidTimestamp { resource_id } => {
                ExError::new(ExErrorKind::InvalidRecord)
                    .with_resource_id(resource_id)
                    .with_message(message)
            }
            PollerError::EmptyResourceId => {
                ExError::new(ExErrorKind::InvalidRecord).with_message(message)
            }
            PollerError::UnparseableTimestamp { .. } => {
                ExError::new(ExErrorKind::InvalidRecord).with_message(message)
            }
            PollerError::SourceFetchFailed { source_name, .. } => {
                ExError::new(ExErrorKind::Fetch)
                    .with_source_name(source_name)
                    .with_message(message)
            }
            PollerError::NoSnapshot { .. } => {
                ExError::new(ExErrorKind::NoSnapshot).with_message(message)
            }
            PollerError::IncompleteSnapshot { .. } => {
                ExError::new(ExErrorKind::IncompleteSnapshot).with_message(message)
            }
            PollerError::NoSources => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
            PollerError::DuplicateBaselineRow { resource_id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_resource_id(resource_id)
                    .with_message(message)
            }
        }
    }
}
