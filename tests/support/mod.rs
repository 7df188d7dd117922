//! Scriptable caption source shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use tokio::time::Instant;
use younotes::{CaptionFragment, CaptionSource, CaptionSourceError, VideoId};

pub enum Reply {
    Fragments(Vec<CaptionFragment>),
    Error(CaptionSourceError),
    /// Never resolves; only the caller's timeout ends the attempt.
    Hang,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub video_id: String,
    pub language: String,
    pub at: Instant,
}

/// A caption source driven by a closure of `(language, call number starting at 1)`.
pub struct StubSource<F> {
    respond: F,
    calls: Mutex<Vec<Call>>,
}

pub fn stub<F>(respond: F) -> StubSource<F>
where
    F: Fn(&str, usize) -> Reply + Send + Sync,
{
    StubSource {
        respond,
        calls: Mutex::new(Vec::new()),
    }
}

pub fn fragments(texts: &[&str]) -> Vec<CaptionFragment> {
    texts.iter().map(|text| CaptionFragment::new(*text)).collect()
}

impl<F> StubSource<F> {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }

    pub fn languages(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.language).collect()
    }
}

impl<F> CaptionSource for StubSource<F>
where
    F: Fn(&str, usize) -> Reply + Send + Sync,
{
    async fn fetch(
        &self,
        video_id: &VideoId,
        language: &str,
    ) -> Result<Vec<CaptionFragment>, CaptionSourceError> {
        let call_number = {
            let mut calls = self.calls.lock().expect("calls lock poisoned");
            calls.push(Call {
                video_id: video_id.to_string(),
                language: language.to_owned(),
                at: Instant::now(),
            });
            calls.len()
        };

        match (self.respond)(language, call_number) {
            Reply::Fragments(fragments) => Ok(fragments),
            Reply::Error(err) => Err(err),
            Reply::Hang => std::future::pending().await,
        }
    }
}
