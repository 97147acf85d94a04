use crate::core::parser::HtmlPageParser;
use crate::core::{ConfigProvider, PageParser, VerseCache, VerseRecord, VerseReference};
use crate::utils::error::{BotError, Result};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://quran-online.ru";

/// Retrieves verse pages, parses them and fills the shared [`VerseCache`].
pub struct VerseFetcher {
    client: Client,
    base_url: String,
    cache: Arc<VerseCache>,
    parser: Arc<dyn PageParser>,
}

impl VerseFetcher {
    /// Fetcher with the HTML parser and the HTTP client's default timeout behaviour.
    pub fn new(base_url: impl Into<String>, cache: Arc<VerseCache>) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url.into(),
            cache,
            parser: Arc::new(HtmlPageParser::new()?),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C, cache: Arc<VerseCache>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().to_string(),
            cache,
            parser: Arc::new(HtmlPageParser::new()?),
        })
    }

    pub fn with_parser(mut self, parser: Arc<dyn PageParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn cache(&self) -> &Arc<VerseCache> {
        &self.cache
    }

    /// `<base>/<surah>:<ayah>?translator=<slug>`
    pub fn verse_url(&self, reference: &VerseReference) -> Result<Url> {
        let raw = format!(
            "{}/{}:{}",
            self.base_url.trim_end_matches('/'),
            reference.surah(),
            reference.ayah()
        );
        let mut url = Url::parse(&raw).map_err(|e| BotError::InvalidConfigValueError {
            field: "source.base_url".to_string(),
            value: self.base_url.clone(),
            reason: format!("Cannot build verse URL: {}", e),
        })?;
        url.query_pairs_mut()
            .append_pair("translator", reference.translator().slug());
        Ok(url)
    }

    /// Cache first; only a miss goes to the network.
    pub async fn resolve(&self, reference: &VerseReference) -> Option<Arc<VerseRecord>> {
        if let Some(record) = self.cache.lookup(reference) {
            tracing::debug!(reference = %reference, "Cache hit");
            return Some(record);
        }
        self.fetch(reference).await
    }

    /// Always hits the network. `None` means the verse could not be retrieved;
    /// the cache is only written on success.
    pub async fn fetch(&self, reference: &VerseReference) -> Option<Arc<VerseRecord>> {
        let url = match self.verse_url(reference) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(reference = %reference, "⚠️ {}", e);
                return None;
            }
        };

        let html = match self.retrieve(url).await {
            Ok(Some(html)) => html,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(reference = %reference, "⚠️ Verse retrieval failed: {}", e);
                return None;
            }
        };

        let record = Arc::new(self.parser.parse(&html));
        self.cache.store(*reference, Arc::clone(&record));
        tracing::debug!(reference = %reference, cached = self.cache.len(), "Verse cached");

        Some(record)
    }

    async fn retrieve(&self, url: Url) -> Result<Option<String>> {
        tracing::debug!("Making request to: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            tracing::info!("🔍 Source returned {}, treating as not found", status);
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}
