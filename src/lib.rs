//! `younotes`: the transcript back end of YouNotes.
//!
//! This crate provides:
//! - Video identifier extraction from the URL shapes users paste
//! - A caption-source abstraction plus a YouTube implementation
//! - Transcript acquisition with per-attempt timeouts, bounded retries and language fallback
//! - An axum router exposing the service over HTTP
//! - Output encoders (plain text, JSON, WebVTT) for the CLI
//!
//! Every lookup is request-scoped: nothing is cached or shared between calls beyond
//! read-only configuration and the HTTP client's connection pool.

// High-level API (most consumers should start here).
pub mod opts;
pub mod transcript;

// Identifiers, captions and the sources that produce them.
pub mod caption;
pub mod sources;
pub mod video_id;

// Failure taxonomy and crate errors.
pub mod error;
pub mod failure;

// HTTP boundary.
pub mod cors;
pub mod http;

// Output selection and encoder interfaces.
pub mod caption_encoder;
pub mod output_type;

// Encoders that serialize fragments into various formats.
pub mod json_array_encoder;
pub mod text_encoder;
pub mod vtt_encoder;

// Logging configuration for the binaries.
#[cfg(feature = "logging")]
pub mod logging;

pub use caption::{CaptionFragment, CaptionSource, CaptionSourceError};
pub use error::{Error, Result};
pub use failure::{FailureCategory, FailureReport};
pub use opts::{Backoff, Opts};
pub use output_type::OutputType;
pub use sources::youtube::YouTubeCaptionSource;
pub use transcript::{TranscriptRequest, TranscriptResult, fetch_transcript};
pub use video_id::{VideoId, extract_video_id};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
