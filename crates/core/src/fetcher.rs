//! PDF fetching.
//!
//! The fetch races the transport against a timer. If the timer wins the
//! transport future is dropped; blocking transports keep running on tokio's
//! blocking pool and their result is discarded.

use crate::config::FetchConfig;
use crate::document::DocumentLoader;
use crate::error::{FlipbookError, Result};
use crate::session::FlipbookId;
use crate::worker;
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A single GET request for document bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Responses larger than this are rejected.
    pub max_bytes: u64,
}

/// Moves bytes from a URL into memory.
pub trait Transport {
    fn get(&self, request: FetchRequest) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Blocking `ureq` client run on the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(true)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    async fn get(&self, request: FetchRequest) -> Result<Vec<u8>> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &request))
            .await
            .map_err(|e| FlipbookError::FetchError(format!("fetch task failed: {}", e)))?
    }
}

fn fetch_blocking(agent: &ureq::Agent, request: &FetchRequest) -> Result<Vec<u8>> {
    let mut builder = agent.get(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let mut response = builder.call().map_err(|e| match e {
        ureq::Error::StatusCode(code) => {
            FlipbookError::FetchError(format!("HTTP {} for {}", code, request.url))
        }
        other => FlipbookError::FetchError(other.to_string()),
    })?;

    response
        .body_mut()
        .with_config()
        .limit(request.max_bytes)
        .read_to_vec()
        .map_err(|e| FlipbookError::FetchError(format!("failed to read body: {}", e)))
}

/// Fetches flipbook PDFs and parses them into documents.
pub struct PdfFetcher<T, L> {
    transport: T,
    loader: L,
    config: FetchConfig,
}

impl<T: Transport, L: DocumentLoader> PdfFetcher<T, L> {
    /// Create a fetcher.
    pub fn new(transport: T, loader: L, config: FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            loader,
            config,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of a flipbook's PDF.
    pub fn document_url(&self, id: FlipbookId) -> String {
        format!(
            "{}/flipbook/pdf/{}",
            self.config.base_url.trim_end_matches('/'),
            id
        )
    }

    fn request(&self, url: &str) -> FetchRequest {
        worker::configure_worker_src(&self.config.worker_src);

        let mut headers = Vec::new();
        if self.config.no_cache {
            headers.push(("Cache-Control".to_string(), "no-cache".to_string()));
        }
        FetchRequest {
            url: url.to_string(),
            headers,
            max_bytes: self.config.max_document_bytes,
        }
    }

    /// Run `work` against the fetch budget.
    ///
    /// `tokio::time::timeout` hands back a result that is ready on the poll
    /// where the deadline passes, so synchronous work that overran the budget
    /// is checked against the clock as well.
    async fn within_timeout<R, F>(&self, url: &str, work: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        let start = Instant::now();
        let timed_out = || {
            warn!("Fetch of {} timed out after {:?}", url, self.config.timeout);
            FlipbookError::FetchTimeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            }
        };

        match tokio::time::timeout(self.config.timeout, work).await {
            Ok(_) if start.elapsed() > self.config.timeout => Err(timed_out()),
            Ok(result) => {
                debug!("Loaded {} in {:?}", url, start.elapsed());
                result
            }
            Err(_) => Err(timed_out()),
        }
    }

    /// Fetch raw bytes from `url`, bounded by the configured timeout.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let request = self.request(url);
        info!("Fetching PDF from {}", url);
        self.within_timeout(url, self.transport.get(request)).await
    }

    /// Fetch and parse the document at `url`. Parsing counts against the
    /// same timeout as the transfer.
    pub async fn fetch(&self, url: &str) -> Result<L::Document<'_>> {
        let request = self.request(url);
        info!("Fetching PDF from {}", url);

        self.within_timeout(url, async {
            let bytes = self.transport.get(request).await?;
            debug!("Fetched {} bytes from {}", bytes.len(), url);
            self.loader.load(bytes)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PageSize, PageSource};
    use image::RgbaImage;
    use std::cell::RefCell;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingTransport {
        requests: RefCell<Vec<FetchRequest>>,
        body: Option<Vec<u8>>,
    }

    impl Transport for RecordingTransport {
        async fn get(&self, request: FetchRequest) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(request);
            self.body
                .clone()
                .ok_or_else(|| FlipbookError::FetchError("connection refused".to_string()))
        }
    }

    struct NeverTransport;

    impl Transport for NeverTransport {
        async fn get(&self, _request: FetchRequest) -> Result<Vec<u8>> {
            std::future::pending().await
        }
    }

    /// Treats every byte as one letter-sized page.
    struct ByteCountLoader;

    struct ByteCountDocument(usize);

    impl PageSource for ByteCountDocument {
        fn page_count(&self) -> Result<usize> {
            Ok(self.0)
        }

        fn page_size(&self, _page_number: usize) -> Result<PageSize> {
            Ok(PageSize::new(612.0, 792.0))
        }

        fn render_page(&self, _page_number: usize, width: u32, height: u32) -> Result<RgbaImage> {
            Ok(RgbaImage::new(width, height))
        }
    }

    impl DocumentLoader for ByteCountLoader {
        type Document<'a> = ByteCountDocument;

        fn load(&self, bytes: Vec<u8>) -> Result<ByteCountDocument> {
            if bytes.is_empty() {
                return Err(FlipbookError::FetchError("empty document".to_string()));
            }
            Ok(ByteCountDocument(bytes.len()))
        }
    }

    /// Parses correctly but takes `delay` of wall-clock time doing it.
    struct SlowLoader {
        delay: Duration,
    }

    impl DocumentLoader for SlowLoader {
        type Document<'a> = ByteCountDocument;

        fn load(&self, bytes: Vec<u8>) -> Result<ByteCountDocument> {
            std::thread::sleep(self.delay);
            Ok(ByteCountDocument(bytes.len()))
        }
    }

    fn fetcher<T: Transport>(transport: T) -> PdfFetcher<T, ByteCountLoader> {
        PdfFetcher::new(transport, ByteCountLoader, FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_document_url() {
        let f = PdfFetcher::new(
            NeverTransport,
            ByteCountLoader,
            FetchConfig::with_base_url("http://localhost:8069/"),
        )
        .unwrap();
        assert_eq!(
            f.document_url(FlipbookId::new(7).unwrap()),
            "http://localhost:8069/flipbook/pdf/7"
        );
        assert_eq!(
            fetcher(NeverTransport).document_url(FlipbookId::new(3).unwrap()),
            "/flipbook/pdf/3"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FetchConfig::default().timeout(Duration::ZERO);
        assert!(PdfFetcher::new(NeverTransport, ByteCountLoader, config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_sends_no_cache_and_parses() {
        let f = fetcher(RecordingTransport {
            body: Some(vec![0u8; 3]),
            ..Default::default()
        });

        let document = f.fetch("/flipbook/pdf/1").await.unwrap();
        assert_eq!(document.page_count().unwrap(), 3);

        let requests = f.transport().requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "/flipbook/pdf/1");
        assert!(requests[0]
            .headers
            .contains(&("Cache-Control".to_string(), "no-cache".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_configures_worker() {
        let f = fetcher(RecordingTransport {
            body: Some(vec![1]),
            ..Default::default()
        });
        f.fetch_bytes("/flipbook/pdf/1").await.unwrap();
        assert!(worker::worker_src().is_some());
    }

    #[tokio::test]
    async fn test_fetch_transport_error_is_fetch_error() {
        let f = fetcher(RecordingTransport::default());
        let err = f.fetch_bytes("/flipbook/pdf/1").await.unwrap_err();
        assert!(matches!(err, FlipbookError::FetchError(_)));
    }

    #[tokio::test]
    async fn test_fetch_parse_error_is_fetch_error() {
        let f = fetcher(RecordingTransport {
            body: Some(Vec::new()),
            ..Default::default()
        });
        assert!(matches!(
            f.fetch("/flipbook/pdf/1").await,
            Err(FlipbookError::FetchError(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_parse_counts_against_timeout() {
        let config = FetchConfig::default().timeout(Duration::from_millis(20));
        let f = PdfFetcher::new(
            RecordingTransport {
                body: Some(vec![0u8; 2]),
                ..Default::default()
            },
            SlowLoader {
                delay: Duration::from_millis(80),
            },
            config,
        )
        .unwrap();

        match f.fetch("/flipbook/pdf/4").await {
            Err(FlipbookError::FetchTimeout { url, .. }) => assert_eq!(url, "/flipbook/pdf/4"),
            Err(e) => panic!("Expected FetchTimeout, got {:?}", e),
            Ok(_) => panic!("Expected FetchTimeout, got a document"),
        }
    }

    #[tokio::test]
    async fn test_fast_parse_within_timeout() {
        let f = PdfFetcher::new(
            RecordingTransport {
                body: Some(vec![0u8; 2]),
                ..Default::default()
            },
            SlowLoader {
                delay: Duration::from_millis(1),
            },
            FetchConfig::default(),
        )
        .unwrap();

        let document = f.fetch("/flipbook/pdf/4").await.unwrap();
        assert_eq!(document.page_count().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_times_out_at_thirty_seconds() {
        let f = fetcher(NeverTransport);
        let start = tokio::time::Instant::now();

        let fut = f.fetch_bytes("/flipbook/pdf/9");
        tokio::pin!(fut);

        tokio::select! {
            _ = &mut fut => panic!("fetch settled before the timeout"),
            _ = tokio::time::sleep(Duration::from_millis(29_900)) => {}
        }

        match fut.await {
            Err(FlipbookError::FetchTimeout { url, timeout_secs }) => {
                assert_eq!(url, "/flipbook/pdf/9");
                assert_eq!(timeout_secs, 30);
            }
            other => panic!("Expected FetchTimeout, got {:?}", other.map(|b| b.len())),
        }
        assert!(start.elapsed() >= Duration::from_secs(30));
    }
}
