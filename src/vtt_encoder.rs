use std::io::Write;

use crate::Result;
use crate::caption::CaptionFragment;
use crate::caption_encoder::CaptionEncoder;

/// A `CaptionEncoder` that writes fragments as WebVTT cues.
///
/// The `WEBVTT` header is written lazily on the first fragment. Fragments without timing are
/// emitted as zero-length cues at `00:00:00.000`.
pub struct VttEncoder<W: Write> {
    w: W,
    started: bool,
    closed: bool,
}

impl<W: Write> VttEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"WEBVTT\n\n")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> CaptionEncoder for VttEncoder<W> {
    fn write_fragment(&mut self, fragment: &CaptionFragment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write fragment: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        let start_seconds = fragment.start_seconds.unwrap_or(0.0);
        let end_seconds = start_seconds + fragment.duration_seconds.unwrap_or(0.0);

        writeln!(
            &mut self.w,
            "{} --> {}",
            format_timestamp_vtt(start_seconds),
            format_timestamp_vtt(end_seconds)
        )?;
        writeln!(&mut self.w, "{}", fragment.text)?;
        writeln!(&mut self.w)?;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into a WebVTT timestamp (`HH:MM:SS.mmm`), rounded to the nearest millisecond.
fn format_timestamp_vtt(seconds: f32) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_without_fragments_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn writes_header_once_and_formats_cues() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);

        enc.write_fragment(&CaptionFragment::new("hello").with_timing(0.0, 1.25))?;
        enc.write_fragment(&CaptionFragment::new("world").with_timing(61.5, 0.5))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("WEBVTT\n\n"));
        assert!(s.contains("00:00:00.000 --> 00:00:01.250\nhello\n\n"));
        assert!(s.contains("00:01:01.500 --> 00:01:02.000\nworld\n\n"));
        assert_eq!(s.matches("WEBVTT").count(), 1);
        Ok(())
    }

    #[test]
    fn untimed_fragments_become_zero_length_cues() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_fragment(&CaptionFragment::new("no timing"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.contains("00:00:00.000 --> 00:00:00.000\nno timing\n"));
        Ok(())
    }

    #[test]
    fn timestamps_round_to_nearest_millisecond() {
        assert_eq!(format_timestamp_vtt(0.0004), "00:00:00.000");
        assert_eq!(format_timestamp_vtt(3661.0), "01:01:01.000");
        assert_eq!(format_timestamp_vtt(-2.0), "00:00:00.000");
    }
}
