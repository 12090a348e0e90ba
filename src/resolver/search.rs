//! Remote model search against the Poly Pizza catalogue.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Deserialize;

use super::chain::{BoxFuture, ModelSearch};

/// A downloadable search result
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub download_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),
    #[error("search returned status {0}")]
    Status(u16),
    #[error("search response parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid search endpoint: {0}")]
    Endpoint(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default, alias = "models")]
    results: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "Title", alias = "title")]
    title: Option<String>,
    name: Option<String>,
    #[serde(rename = "Download", alias = "download")]
    download: Option<String>,
}

/// Decode a search response, dropping hits that cannot be downloaded
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .filter_map(|hit| {
            let download_url = hit.download.filter(|url| !url.is_empty())?;
            Some(SearchHit {
                name: hit.title.or(hit.name).unwrap_or_default(),
                download_url,
            })
        })
        .collect())
}

/// Name relevance of a hit for `keyword`; `index` is the hit's position in the response
pub fn relevance(keyword: &str, name: &str, index: usize) -> i64 {
    let keyword = keyword.to_lowercase();
    let name = name.to_lowercase();
    let mut score = 0;

    if name == keyword {
        score += 100;
    }
    if name.starts_with(&keyword) {
        score += 50;
    }
    if name.contains(&keyword) {
        score += 30;
    }
    if contains_words(&name, &keyword) {
        score += 20;
    }
    if index == 0 {
        score += 10;
    }
    score
}

fn contains_words(haystack: &str, needle: &str) -> bool {
    let words: Vec<&str> = haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let wanted: Vec<&str> = needle.split_whitespace().collect();
    !wanted.is_empty() && words.windows(wanted.len()).any(|window| window == wanted.as_slice())
}

/// Order hits best first; ties are broken by fuzzy similarity, then by response order
pub fn rank_hits(keyword: &str, hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, i64, usize, SearchHit)> = hits
        .into_iter()
        .enumerate()
        .map(|(index, hit)| {
            let fuzzy = matcher.fuzzy_match(&hit.name, keyword).unwrap_or(0);
            (relevance(keyword, &hit.name, index), fuzzy, index, hit)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
    scored.into_iter().map(|(_, _, _, hit)| hit).collect()
}

/// Keyed cache whose entries expire after a fixed time-to-live
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, (Instant, V)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str, now: Instant) -> Option<V> {
        let fresh = self
            .entries
            .get(key)
            .is_some_and(|(stored, _)| now.saturating_duration_since(*stored) < self.ttl);
        if !fresh {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(_, value)| value.clone())
    }

    /// Store `value`, dropping every entry that has expired by `now`
    pub fn insert(&mut self, key: &str, value: V, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (stored, _)| now.saturating_duration_since(*stored) < ttl);
        self.entries.insert(key.to_string(), (now, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// HTTP client for `GET {endpoint}?keyword=...` with an `X-Auth-Token` header
pub struct PolyPizzaSearch {
    http: reqwest::Client,
    endpoint: reqwest::Url,
    api_key: String,
    cache: Mutex<TtlCache<Vec<SearchHit>>>,
}

impl PolyPizzaSearch {
    pub fn new(
        endpoint: &str,
        api_key: String,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Result<Self, SearchError> {
        let endpoint =
            reqwest::Url::parse(endpoint).map_err(|e| SearchError::Endpoint(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SearchError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            cache: Mutex::new(TtlCache::new(cache_ttl)),
        })
    }

    async fn fetch(&self, keyword: &str) -> Result<Vec<SearchHit>, SearchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("keyword", keyword);

        let response = self
            .http
            .get(url)
            .header("X-Auth-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;
        if status != 200 {
            return Err(SearchError::Status(status));
        }
        parse_search_response(&text)
    }
}

impl ModelSearch for PolyPizzaSearch {
    fn search<'a>(&'a self, keyword: &'a str) -> BoxFuture<'a, Result<Vec<SearchHit>, SearchError>> {
        Box::pin(async move {
            let cached = self
                .cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get(keyword, Instant::now());
            if let Some(hits) = cached {
                return Ok(hits);
            }

            let hits = self.fetch(keyword).await?;
            if !hits.is_empty() {
                self.cache
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(keyword, hits.clone(), Instant::now());
            }
            Ok(hits)
        })
    }
}
