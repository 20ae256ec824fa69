//! Post content synthesis.
//!
//! Content comes from one of two strategies, resolved once at startup:
//!
//! - **External**: a generation service reached over HTTP with a bearer
//!   credential. Anything going wrong here — missing network, bad response,
//!   service error — is logged and silently replaced by the fallback. The
//!   run never aborts for lack of "smart" content.
//! - **Fallback**: a fixed deterministic skeleton with the topic
//!   interpolated at each marked position. Pure; same topic, same output.
//!
//! [`Strategy::synthesize`] therefore never fails.

use std::time::Duration;

use maud::html;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::errlog::ErrorLog;

/// Seconds before an in-flight generation request is abandoned.
const GENERATION_TIMEOUT_SECS: u64 = 30;

/// One run's worth of synthesized post content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedContent {
    /// Post title, also the source of the slug.
    pub title: String,
    /// Body as an HTML fragment (paragraphs and `<h3>` sections).
    pub body_markup: String,
    /// One-sentence summary used in the index entry.
    pub meta_description: String,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid generation endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Content generation strategy, chosen once per process by credential
/// presence.
pub enum Strategy {
    External(ExternalGenerator),
    Fallback,
}

impl Strategy {
    /// Resolve the strategy: a credential selects the external service,
    /// absence selects the deterministic fallback.
    pub fn resolve(
        credential: Option<String>,
        endpoint: &str,
    ) -> Result<Strategy, GenerationError> {
        match credential {
            Some(credential) => Ok(Strategy::External(ExternalGenerator::new(
                endpoint, credential,
            )?)),
            None => Ok(Strategy::Fallback),
        }
    }

    /// Produce content for the topic. Never fails: external-service errors
    /// are appended to the log and the fallback result is substituted.
    pub fn synthesize(&self, topic: &str, log: &dyn ErrorLog) -> GeneratedContent {
        match self {
            Strategy::Fallback => fallback_content(topic),
            Strategy::External(generator) => match generator.generate(topic) {
                Ok(content) => content,
                Err(err) => {
                    log.append(&format!(
                        "generation service failed, using fallback content: {err}"
                    ));
                    fallback_content(topic)
                }
            },
        }
    }
}

/// Client for the external generation service.
pub struct ExternalGenerator {
    client: reqwest::blocking::Client,
    endpoint: Url,
    credential: String,
}

impl ExternalGenerator {
    pub fn new(endpoint: &str, credential: String) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            credential,
        })
    }

    /// Request content for a topic. The service answers with the three
    /// content fields as JSON.
    fn generate(&self, topic: &str) -> Result<GeneratedContent, GenerationError> {
        let content = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.credential)
            .json(&serde_json::json!({ "topic": topic }))
            .send()?
            .error_for_status()?
            .json::<GeneratedContent>()?;
        Ok(content)
    }
}

/// Deterministic template content for a topic.
fn fallback_content(topic: &str) -> GeneratedContent {
    let title = format!("The Future of {topic}: What You Need to Know");
    let body_markup = html! {
        p {
            (topic)
            " is changing fast, and keeping up matters more than ever. "
            "This post looks at where things stand today and where they are heading."
        }
        h3 { "Why " (topic) " Matters Right Now" }
        p {
            "Teams that invest in "
            (topic)
            " see clear benefits: better output, fewer surprises, and a head "
            "start on the trends shaping the next few years."
        }
        h3 { "Getting Started" }
        p {
            "You do not need to master "
            (topic)
            " overnight. Start small, stay curious, and build momentum - the "
            "best time to begin is today."
        }
    }
    .into_string();
    let meta_description = format!(
        "A practical look at {topic} and why it matters right now."
    );
    GeneratedContent {
        title,
        body_markup,
        meta_description,
    }
}

/// Pick one topic uniformly at random. `None` only for an empty catalog.
pub fn pick_topic(topics: &[String]) -> Option<&str> {
    topics.choose(&mut rand::rng()).map(String::as_str)
}
