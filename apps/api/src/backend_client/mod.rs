/// Recruitment backend client: the single point of entry for every call the
/// gateway makes to the recruitment REST backend.
///
/// Reads are idempotent and retried on 429/5xx with exponential backoff.
/// Writes (answer evaluation, match creation, auto-screening) are sent once;
/// retrying them is the caller's decision. Match creation and auto-screening
/// run an LLM over every pair they score and get their own, longer timeout.
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::screening::Match;

const JOBS_PATH: &str = "/jobs";
const CANDIDATES_PATH: &str = "/candidates";
const MATCHES_PATH: &str = "/matches";
const MATCH_CANDIDATE_JOB_PATH: &str = "/match_candidate_job";
const AUTO_SCREEN_PATH: &str = "/auto_screen";
pub const EVALUATE_PATH: &str = "/evaluate_interview";

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// FastAPI error envelope: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct CreateMatchRequest {
    job_id: i64,
    candidate_id: i64,
}

#[derive(Clone)]
pub struct RecruitmentClient {
    client: Client,
    base_url: String,
    screening_timeout: Duration,
    retry_base_delay: Duration,
}

impl RecruitmentClient {
    /// `timeout` bounds every request except match creation and auto-screening,
    /// which use `screening_timeout` (initially the same value).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            screening_timeout: timeout,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    pub fn with_screening_timeout(mut self, timeout: Duration) -> Self {
        self.screening_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>, BackendError> {
        self.get_json(JOBS_PATH).await
    }

    pub async fn list_candidates(&self) -> Result<Vec<Candidate>, BackendError> {
        self.get_json(CANDIDATES_PATH).await
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, BackendError> {
        self.get_json(MATCHES_PATH).await
    }

    /// Asks the backend to score one (job, candidate) pair and generate its questions.
    pub async fn create_match(
        &self,
        job_id: i64,
        candidate_id: i64,
    ) -> Result<Match, BackendError> {
        let body = CreateMatchRequest {
            job_id,
            candidate_id,
        };
        let request = self
            .request(Method::POST, MATCH_CANDIDATE_JOB_PATH)
            .timeout(self.screening_timeout)
            .json(&body);
        self.send_once(request).await
    }

    /// Runs backend auto-screening across all jobs and candidates.
    pub async fn auto_screen(&self) -> Result<Vec<Match>, BackendError> {
        let request = self
            .request(Method::POST, AUTO_SCREEN_PATH)
            .timeout(self.screening_timeout);
        self.send_once(request).await
    }

    /// Single-attempt JSON POST. Used for answer evaluation.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        self.send_once(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("content-type", "application/json")
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// GET with retries on 429, 5xx and transport errors.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let mut last_error: Option<BackendError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base_delay, attempt);
                warn!(
                    "GET {} attempt {} failed, retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.request(Method::GET, path).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(BackendError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Backend returned {} for GET {}: {}", status, path, body);
                last_error = Some(api_error(status.as_u16(), body));
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(api_error(status.as_u16(), body));
            }

            let parsed = serde_json::from_str(&body)?;
            debug!("GET {} succeeded ({} bytes)", path, body.len());
            return Ok(parsed);
        }

        Err(last_error.unwrap_or(BackendError::Api {
            status: 503,
            message: format!("GET {path} failed after {MAX_RETRIES} attempts"),
        }))
    }
}

/// Exponential backoff before retry `attempt`: base, then 2 × base.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * (1 << (attempt - 1))
}

/// Builds an `Api` error, preferring FastAPI's `detail` over the raw body.
fn api_error(status: u16, body: String) -> BackendError {
    let message = match serde_json::from_str::<BackendErrorBody>(&body) {
        Ok(BackendErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(BackendErrorBody { detail }) => detail.to_string(),
        Err(_) => body,
    };
    BackendError::Api { status, message }
}
