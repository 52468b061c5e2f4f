//! AI adapter: provider abstraction + file cache + daily limit.
//!
//! The model is a text-in/text-out collaborator. Every failure (no key, HTTP error,
//! empty candidate, daily limit reached) surfaces as `None`; callers substitute
//! their fallback text.

use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AiConfig;

pub const ENV_AI_TEST_MODE: &str = "AI_TEST_MODE";
pub const ENV_AI_CACHE_DIR: &str = "AI_CACHE_DIR";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait object used by the summarizer.
pub trait AiClient: Send + Sync {
    /// Generate text for `prompt`, or `None` if no answer is available.
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Option<String>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynAiClient = Arc<dyn AiClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client (uncached).
/// * Else if `config.enabled==false` or no API key resolves, returns a disabled client.
/// * Else builds the Gemini provider wrapped with caching + daily limit.
pub fn build_client_from_config(config: &AiConfig) -> DynAiClient {
    if std::env::var(ENV_AI_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(Uncached(MockProvider::new("Summary unavailable in mock mode.")));
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "gemini" => {
            let Some(key) = config.resolve_api_key() else {
                warn!(target: "summarize", "GEMINI_API_KEY not set, AI summaries disabled");
                return Arc::new(DisabledClient);
            };
            match GeminiProvider::new(config, key) {
                Ok(provider) => Arc::new(CachingClient::new(
                    provider,
                    default_cache_dir(),
                    config.daily_limit,
                )),
                Err(e) => {
                    warn!(target: "summarize", error = %format!("{e:#}"), "AI client init failed");
                    Arc::new(DisabledClient)
                }
            }
        }
        other => {
            warn!(target: "summarize", provider = other, "unsupported AI provider, summaries disabled");
            Arc::new(DisabledClient)
        }
    }
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call. Separated so we can reuse the same
/// caching wrapper for production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Option<String>>;
    fn name(&self) -> &'static str;
}

/// Google Gemini `generateContent` provider.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiProvider {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tech-news-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_BASE_URL}/models/{}:generateContent", self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReq<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<PartReq<'a>>,
}

#[derive(Serialize)]
struct PartReq<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResp>,
}

#[derive(Deserialize)]
struct PartResp {
    #[serde(default)]
    text: String,
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(resp: GenerateResp) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    let cleaned = clean_output(&text);
    (!cleaned.is_empty()).then_some(cleaned)
}

impl Provider for GeminiProvider {
    fn fetch<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            let req = GenerateReq {
                contents: vec![Content {
                    role: "user",
                    parts: vec![PartReq { text: prompt }],
                }],
                generation_config: GenerationConfig {
                    temperature: self.temperature,
                    max_output_tokens: self.max_tokens,
                },
            };

            let resp = match self
                .http
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(target: "summarize", error = %e, "gemini request failed");
                    return None;
                }
            };

            if !resp.status().is_success() {
                warn!(target: "summarize", status = %resp.status(), "gemini returned error status");
                return None;
            }
            let body: GenerateResp = resp.json().await.ok()?;
            first_candidate_text(body)
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-answer provider for tests/local runs. Records the prompts it saw.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new(fixed: &str) -> Self {
        Self {
            fixed: fixed.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.prompts.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Option<String>> {
        if let Ok(mut g) = self.prompts.lock() {
            g.push(prompt.to_string());
        }
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Adapts a bare provider to `AiClient` without cache or limit.
pub struct Uncached<P: Provider>(pub P);

impl<P: Provider> AiClient for Uncached<P> {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Option<String>> {
        self.0.fetch(prompt)
    }
    fn provider_name(&self) -> &'static str {
        self.0.name()
    }
}

// ------------------------------------------------------------
// Caching client wrapper (file cache + daily limit)
// ------------------------------------------------------------

/// Counter state is guarded by a `Mutex`; cache files are written atomically via rename.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Arc<Mutex<DailyCounter>>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!(target: "summarize", error = %e, dir = %cache_dir.display(), "cannot create AI cache dir");
        }
        let counter = Arc::new(Mutex::new(
            load_daily_counter(&cache_dir).unwrap_or_default(),
        ));
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    /// Real calls made today.
    pub fn calls_today(&self) -> u32 {
        self.counter.lock().map(|g| g.count).unwrap_or(0)
    }

    async fn generate_impl(&self, prompt: &str) -> Option<String> {
        // 1) Cache lookup (hits never count against the limit).
        let key = cache_key(prompt);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            counter!("ai_cache_hits_total").increment(1);
            debug!(target: "summarize", %key, "ai cache hit");
            return Some(hit.text);
        }

        // 2) Daily limit.
        {
            let mut g = self.counter.lock().ok()?;
            if g.is_expired() {
                g.reset_to_today();
                let _ = save_daily_counter(&self.cache_dir, &g);
            }
            if g.count >= self.daily_limit_max {
                counter!("ai_limit_hits_total").increment(1);
                warn!(target: "summarize", limit = self.daily_limit_max, "AI daily limit reached");
                return None;
            }
        }

        // 3) Real call.
        counter!("ai_requests_total").increment(1);
        let fresh = clean_output(&self.inner.fetch(prompt).await?);
        if fresh.is_empty() {
            return None;
        }
        if let Err(e) = write_cache_file(&self.cache_dir, &key, &CacheEntry { text: fresh.clone() }) {
            debug!(target: "summarize", error = %e, "ai cache write failed");
        }
        if let Ok(mut g) = self.counter.lock() {
            g.count = g.count.saturating_add(1);
            let _ = save_daily_counter(&self.cache_dir, &g);
        }
        Some(fresh)
    }
}

impl<P: Provider> AiClient for CachingClient<P> {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(self.generate_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    text: String,
}

fn default_cache_dir() -> PathBuf {
    std::env::var(ENV_AI_CACHE_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cache/ai"))
}

/// Stable across builds (unlike `DefaultHasher`), so cache files survive upgrades.
fn cache_key(prompt: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(prompt.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<CacheEntry> {
    let s = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&s).ok()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp)?;
    f.write_all(bytes)?;
    fs::rename(tmp, path)
}

fn write_cache_file(dir: &Path, key: &str, value: &CacheEntry) -> io::Result<()> {
    let json = serde_json::to_vec(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write_atomic(&cache_path(dir, key), &json)
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let s = serde_json::to_vec(dc).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write_atomic(&counter_path(dir), &s)
}

// ------------------------------------------------------------
// Output cleanup
// ------------------------------------------------------------

/// Normalize line endings and trim; markdown is kept for the renderers.
pub fn clean_output(input: &str) -> String {
    input.replace("\r\n", "\n").trim().to_string()
}
