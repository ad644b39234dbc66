//! Retrieval of raw clip bytes.

use std::io::Read;
use std::time::Duration;

use log::debug;

use crate::error::QuizError;

/// Recordings above this size are rejected instead of buffered.
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Source of the compressed bytes behind a clip's download URL.
pub trait ClipFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, QuizError>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(20))
            .build();

        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, QuizError> {
        let failure = |reason: String| QuizError::Download {
            url: url.to_string(),
            reason,
        };

        debug!("downloading {}", url);
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| failure(err.to_string()))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_DOWNLOAD_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| failure(err.to_string()))?;

        if bytes.len() as u64 > MAX_DOWNLOAD_BYTES {
            return Err(failure(format!(
                "recording exceeds {} bytes",
                MAX_DOWNLOAD_BYTES
            )));
        }

        Ok(bytes)
    }
}
