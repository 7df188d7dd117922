use std::io::Write;

use crate::Result;
use crate::caption::CaptionFragment;
use crate::caption_encoder::CaptionEncoder;

/// A `CaptionEncoder` that writes fragments as a single JSON array.
///
/// Fragments are streamed straight into the writer; the array is opened lazily so an empty
/// transcript still produces valid JSON (`[]`).
///
/// Example output:
/// ```json
/// [{"text":"hello","start_seconds":0.0,"duration_seconds":1.2},{"text":"world"}]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,
    started: bool,
    first: bool,
    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> CaptionEncoder for JsonArrayEncoder<W> {
    fn write_fragment(&mut self, fragment: &CaptionFragment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write fragment: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, fragment)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]\n")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
