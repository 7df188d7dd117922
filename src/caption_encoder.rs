use crate::Result;
use crate::caption::CaptionFragment;

/// Streaming sink for caption fragments.
///
/// `close` is idempotent; writing after `close` is an error.
pub trait CaptionEncoder {
    fn write_fragment(&mut self, fragment: &CaptionFragment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Write every fragment, then close the encoder.
///
/// The encoder is closed even when a write fails; the write error wins.
pub fn encode_all<E: CaptionEncoder + ?Sized>(
    encoder: &mut E,
    fragments: &[CaptionFragment],
) -> Result<()> {
    let write_res = fragments
        .iter()
        .try_for_each(|fragment| encoder.write_fragment(fragment));
    let close_res = encoder.close();
    write_res.and(close_res)
}
