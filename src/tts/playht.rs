//! PlayHT v2 REST synthesis.
//!
//! Each call creates a job, polls it until the audio is ready, and
//! downloads the WAV. Requests are independent, so calls may overlap.
//!
//! Credentials are read from `PLAY_HT_USER_ID` and `PLAY_HT_API_KEY`.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Synthesizer;
use crate::config::ProjectConfig;

pub const NAME: &str = "playht";

pub const USER_ID_VAR: &str = "PLAY_HT_USER_ID";
pub const API_KEY_VAR: &str = "PLAY_HT_API_KEY";

const API_URL: &str = "https://api.play.ht/api/v2/tts";
const VOICE_ENGINE: &str = "PlayHT2.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLLS: u32 = 1200;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct JobRequest<'a> {
    text: &'a str,
    voice: &'a str,
    voice_engine: &'a str,
    quality: &'a str,
    sample_rate: u32,
    output_format: &'a str,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    #[serde(rename = "_links")]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    status: Option<String>,
    output: Option<JobOutput>,
}

#[derive(Debug, Deserialize)]
struct JobOutput {
    url: String,
}

/// What one poll of a job revealed.
#[derive(Debug, PartialEq)]
enum Progress {
    Pending,
    Complete(String),
    Failed,
}

impl JobStatus {
    fn progress(self) -> anyhow::Result<Progress> {
        match self.status.as_deref() {
            Some("complete") => {
                let output = self.output.context("completed job has no output url")?;
                Ok(Progress::Complete(output.url))
            }
            Some("failed") => Ok(Progress::Failed),
            _ => Ok(Progress::Pending),
        }
    }
}

/// PlayHT account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    pub api_key: String,
}

impl Credentials {
    /// Read credentials from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let user_id = std::env::var(USER_ID_VAR).with_context(|| format!("{USER_ID_VAR} is not set"))?;
        let api_key = std::env::var(API_KEY_VAR).with_context(|| format!("{API_KEY_VAR} is not set"))?;
        Ok(Self { user_id, api_key })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_key", &"***")
            .finish()
    }
}

/// Remote synthesis through the PlayHT v2 API.
#[derive(Debug)]
pub struct PlayHtSynthesizer {
    client: Client,
    credentials: Credentials,
    voice: String,
    speed: f64,
}

impl PlayHtSynthesizer {
    pub fn new(credentials: Credentials, voice: impl Into<String>, speed: f64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            credentials,
            voice: voice.into(),
            speed,
        })
    }

    /// Build from project settings; `voice` is the PlayHT voice id and
    /// `speech_rate` becomes the request speed.
    pub fn from_config(config: &ProjectConfig) -> anyhow::Result<Self> {
        let voice = config
            .voice
            .as_deref()
            .context("the playht backend requires `voice` (a PlayHT voice id)")?;
        Self::new(Credentials::from_env()?, voice, config.speech_rate)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("accept", "application/json")
            .header("AUTHORIZATION", &self.credentials.api_key)
            .header("X-USER-ID", &self.credentials.user_id)
    }

    /// Send a request built by `build`, retrying on HTTP 429.
    fn send(&self, build: impl Fn() -> RequestBuilder) -> anyhow::Result<Response> {
        let mut retries = 0u32;
        loop {
            let resp = build().send().context("PlayHT request failed")?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "PlayHT returned 429, backing off"
                );
                std::thread::sleep(Duration::from_secs(wait));
                continue;
            }

            return Ok(resp);
        }
    }

    fn create_job(&self, text: &str) -> anyhow::Result<String> {
        let payload = self.job_request(text);
        let resp = self.send(|| self.authorized(self.client.post(API_URL)).json(&payload))?;

        if resp.status() != StatusCode::CREATED {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            anyhow::bail!("PlayHT rejected the job ({status}): {body}");
        }

        let created: JobCreated = resp.json().context("invalid PlayHT job response")?;
        created
            .links
            .into_iter()
            .next()
            .map(|link| link.href)
            .context("PlayHT job response has no poll link")
    }

    fn wait_for_audio(&self, poll_url: &str) -> anyhow::Result<String> {
        for attempt in 1..=MAX_POLLS {
            let status: JobStatus = self
                .send(|| self.authorized(self.client.get(poll_url)))?
                .error_for_status()
                .context("PlayHT status request returned error")?
                .json()
                .context("invalid PlayHT status response")?;

            match status.progress()? {
                Progress::Complete(url) => return Ok(url),
                Progress::Failed => anyhow::bail!("PlayHT job failed"),
                Progress::Pending => {
                    debug!(attempt, "PlayHT job pending");
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        }
        anyhow::bail!("PlayHT job did not finish after {MAX_POLLS} polls")
    }

    fn download(&self, url: &str, output: &Path) -> anyhow::Result<()> {
        let mut resp = self
            .send(|| self.client.get(url))?
            .error_for_status()
            .context("PlayHT audio download returned error")?;

        let mut file =
            File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
        resp.copy_to(&mut file)
            .with_context(|| format!("failed to download audio to {}", output.display()))?;
        Ok(())
    }

    fn job_request<'a>(&'a self, text: &'a str) -> JobRequest<'a> {
        JobRequest {
            text,
            voice: &self.voice,
            voice_engine: VOICE_ENGINE,
            quality: "medium",
            sample_rate: 44100,
            output_format: "wav",
            speed: self.speed,
        }
    }
}

impl Synthesizer for PlayHtSynthesizer {
    fn name(&self) -> &str {
        NAME
    }

    fn synthesize(&self, text: &str, output: &Path) -> anyhow::Result<()> {
        debug!("Creating PlayHT job for {:?}", output);
        let poll_url = self.create_job(text.trim())?;
        let audio_url = self.wait_for_audio(&poll_url)?;
        self.download(&audio_url, output)
    }

    fn is_parallel_capable(&self) -> bool {
        true
    }
}
