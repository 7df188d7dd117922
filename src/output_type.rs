#[cfg(feature = "cli")]
use clap::ValueEnum;

/// The supported output formats for a fetched transcript.
///
/// Each variant maps to a concrete `CaptionEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum OutputType {
    /// Fragment texts joined by single spaces.
    Text,

    /// Fragments as a JSON array.
    Json,

    /// Fragments as WebVTT cues.
    Vtt,
}
