use std::io::{self, BufWriter};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use younotes::caption_encoder::{CaptionEncoder, encode_all};
use younotes::json_array_encoder::JsonArrayEncoder;
use younotes::text_encoder::TextEncoder;
use younotes::vtt_encoder::VttEncoder;
use younotes::{Backoff, Opts, OutputType, TranscriptRequest, YouTubeCaptionSource};

#[derive(Parser, Debug)]
#[command(name = "younotes")]
#[command(about = "Fetch the caption transcript of a YouTube video")]
struct Params {
    /// Video URL (`https://www.youtube.com/watch?v=...` or `https://youtu.be/...`).
    #[arg(short = 'u', long = "url")]
    pub url: String,

    /// Preferred caption language; falls back to English when unavailable.
    #[arg(short = 'l', long = "lang", default_value = "en")]
    pub language: String,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Text
    )]
    pub output_type: OutputType,

    #[arg(long = "attempts", default_value_t = 3)]
    pub attempts: u32,

    #[arg(long = "timeout-secs", default_value_t = 10)]
    pub timeout_secs: u64,

    #[arg(long = "retry-delay-ms", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    #[arg(long = "linear-backoff", default_value_t = false)]
    pub linear_backoff: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    younotes::init_logging();
    let params = Params::parse();

    let opts = Opts {
        max_attempts: params.attempts,
        attempt_timeout: Duration::from_secs(params.timeout_secs),
        retry_delay: Duration::from_millis(params.retry_delay_ms),
        backoff: if params.linear_backoff {
            Backoff::Linear
        } else {
            Backoff::Flat
        },
        ..Opts::default()
    };

    let source = YouTubeCaptionSource::new().context("failed to build HTTP client")?;
    let request = TranscriptRequest::new(params.url, Some(params.language.as_str()));

    let result = match request.fetch(&source, &opts).await {
        Ok(result) => result,
        Err(report) => {
            eprintln!("error ({}): {}", report.category, report.message);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());

    let mut encoder: Box<dyn CaptionEncoder> = match params.output_type {
        OutputType::Text => Box::new(TextEncoder::new(writer)),
        OutputType::Json => Box::new(JsonArrayEncoder::new(writer)),
        OutputType::Vtt => Box::new(VttEncoder::new(writer)),
    };

    encode_all(&mut *encoder, &result.fragments).context("failed to write transcript")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_type_defaults_to_text() {
        let params = Params::try_parse_from(["younotes", "--url", "https://youtu.be/abc"])
            .expect("parse defaults");
        assert_eq!(params.output_type, OutputType::Text);
        assert_eq!(params.language, "en");
    }

    #[test]
    fn output_type_flag_selects_format() {
        let params = Params::try_parse_from([
            "younotes",
            "--url",
            "https://youtu.be/abc",
            "--output-type",
            "vtt",
        ])
        .expect("parse long flag");
        assert_eq!(params.output_type, OutputType::Vtt);

        let params =
            Params::try_parse_from(["younotes", "-u", "https://youtu.be/abc", "-o", "json"])
                .expect("parse short flag");
        assert_eq!(params.output_type, OutputType::Json);
    }
}
