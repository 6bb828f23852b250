use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the gate.
///
/// Each collaborator boundary defines its own error variant. Callers can match
/// on these to decide recovery strategy; loaders keep using `anyhow::Result`
/// for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GateError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Version source ──────────────────────────────────────────────────
    #[error("version source: {0}")]
    Source(#[from] SourceError),

    // ── Session store ───────────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── URL opener ──────────────────────────────────────────────────────
    #[error("opener: {0}")]
    Opener(#[from] OpenerError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Version source errors ──────────────────────────────────────────────────

/// Failure of a single version fetch. Never surfaced to the user: the poller
/// logs it and leaves its state untouched.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("{endpoint} answered HTTP {status}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not decode version record: {0}")]
    Decode(String),

    #[error("source not configured: {0}")]
    NotConfigured(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

// ─── Session store errors ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("store {path}: {message}")]
    Store { path: String, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Opener errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum OpenerError {
    #[error("refusing to open {url}: {reason}")]
    Rejected { url: String, reason: String },

    #[error("launcher {program} failed: {message}")]
    Launch { program: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GateError>;
