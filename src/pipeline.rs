//! Run orchestration.
//!
//! One call to [`Pipeline::run`] is one publishing run:
//!
//! ```text
//! pick topic → synthesize content → derive identity → fetch cover image
//!   → render post from template → write post file
//!   → update index (best-effort) → publish (non-fatal)
//! ```
//!
//! Failure severity is deliberately asymmetric. A post without its cover
//! image is not acceptable, so image fetch failure aborts the run; a post
//! that merely fails to appear in the index or fails to be committed is a
//! partial success to be retried out-of-band. Fatal errors unwind to the
//! caller; recoverable ones are logged at their origin and reflected in the
//! [`RunReport`].
//!
//! Collaborators (image fetcher, publisher, error log) are injected traits,
//! so the whole run is testable without network, git, or a real log file.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use scraper::Html;
use thiserror::Error;

use crate::config::BlogConfig;
use crate::content::{self, Strategy};
use crate::dom;
use crate::errlog::ErrorLog;
use crate::fetch::{FetchError, ImageFetcher};
use crate::listing::{self, ListingEntry};
use crate::naming;
use crate::publish::{self, Publisher};
use crate::render::{self, TemplateStructureError};

/// Errors that abort the run. Everything else degrades to a logged skip.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("topic catalog is empty")]
    EmptyCatalog,
    #[error("image fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Template(#[from] TemplateStructureError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub topic: String,
    pub title: String,
    pub post_file: PathBuf,
    pub image_file: PathBuf,
    /// False when the index grid was missing or the index write failed.
    pub index_updated: bool,
    /// False when the publish collaborator reported an error.
    pub published: bool,
}

/// A configured single-run pipeline.
pub struct Pipeline<'a> {
    pub config: &'a BlogConfig,
    pub strategy: &'a Strategy,
    pub fetcher: &'a dyn ImageFetcher,
    pub publisher: &'a dyn Publisher,
    pub log: &'a dyn ErrorLog,
}

impl Pipeline<'_> {
    /// Execute the full run for the given calendar date.
    ///
    /// Fatal errors are returned (the caller logs them and exits non-zero);
    /// recoverable failures are already logged by the time this returns.
    pub fn run(&self, date: NaiveDate) -> Result<RunReport, PipelineError> {
        let topic = content::pick_topic(&self.config.topics)
            .ok_or(PipelineError::EmptyCatalog)?
            .to_string();
        println!("==> Topic: {topic}");

        let content = self.strategy.synthesize(&topic, self.log);
        let identity = naming::derive_identity(&content.title, date);
        println!("==> Post: {}", content.title);

        fs::create_dir_all(&self.config.output_dir)?;

        let image_file = self.config.output_dir.join(&identity.image_filename);
        println!("==> Fetching cover image → {}", image_file.display());
        self.fetcher.fetch(&content.title, &image_file)?;

        println!("==> Rendering {}", identity.post_filename);
        let template = fs::read_to_string(&self.config.template_path)?;
        let mut post_doc = Html::parse_document(&template);
        render::render_post(&mut post_doc, &content, &identity, &self.config.site_name)?;
        let post_file = self.config.output_dir.join(&identity.post_filename);
        fs::write(&post_file, dom::serialize(&post_doc))?;

        println!("==> Updating index");
        let entry = ListingEntry::new(&content, &identity);
        let index_updated = self.update_index(&entry);

        println!("==> Publishing");
        let message = publish::commit_message(&content.title);
        let published = match self.publisher.publish(&message) {
            Ok(()) => true,
            Err(err) => {
                self.log.append(&format!("publish failed: {err}"));
                false
            }
        };

        Ok(RunReport {
            topic,
            title: content.title,
            post_file,
            image_file,
            index_updated,
            published,
        })
    }

    /// Best-effort index update. Any failure is logged and reported as a
    /// skipped update, never as a run failure.
    fn update_index(&self, entry: &ListingEntry) -> bool {
        let index_path = &self.config.index_path;
        let markup = match fs::read_to_string(index_path) {
            Ok(markup) => markup,
            Err(err) => {
                self.log
                    .append(&format!("index update skipped, cannot read index: {err}"));
                return false;
            }
        };
        let mut index_doc = Html::parse_document(&markup);
        if let Err(err) = listing::insert_entry(&mut index_doc, entry) {
            self.log.append(&format!("index update skipped: {err}"));
            return false;
        }
        if let Err(err) = fs::write(index_path, dom::serialize(&index_doc)) {
            self.log
                .append(&format!("index update failed, cannot write index: {err}"));
            return false;
        }
        true
    }
}
