use std::io::Write;

use crate::Result;
use crate::caption::CaptionFragment;
use crate::caption_encoder::CaptionEncoder;

/// A `CaptionEncoder` that writes the plain transcript: fragment texts joined by single spaces,
/// newline-terminated on close.
///
/// Matches [`crate::transcript::join_fragments`] byte for byte (plus the trailing newline).
pub struct TextEncoder<W: Write> {
    w: W,
    first: bool,
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            first: true,
            closed: false,
        }
    }
}

impl<W: Write> CaptionEncoder for TextEncoder<W> {
    fn write_fragment(&mut self, fragment: &CaptionFragment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write fragment: encoder is already closed",
            ));
        }

        if !self.first {
            self.w.write_all(b" ")?;
        }
        self.first = false;

        self.w.write_all(fragment.text.as_bytes())?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.write_all(b"\n")?;
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption_encoder::encode_all;
    use crate::transcript::join_fragments;

    #[test]
    fn output_matches_joined_transcript() -> anyhow::Result<()> {
        let fragments = vec![
            CaptionFragment::new("a"),
            CaptionFragment::new("b"),
            CaptionFragment::new("c"),
        ];

        let mut out = Vec::new();
        encode_all(&mut TextEncoder::new(&mut out), &fragments)?;

        assert_eq!(String::from_utf8(out)?, format!("{}\n", join_fragments(&fragments)));
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_fragment(&CaptionFragment::new("late")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
