//! # AutoBlog
//!
//! A single-run blog publishing pipeline. Each invocation picks a topic
//! from a fixed catalog, synthesizes a post (title, body markup, summary),
//! derives deterministic file names, mutates a base HTML template into a
//! standalone post document, prepends an entry to the shared index, and
//! hands the results to a publish collaborator.
//!
//! # Architecture: One Sequential Run
//!
//! ```text
//! topic → content → identity → image fetch → post render → index update → publish
//! ```
//!
//! Strictly sequential — every stage depends on the previous stage's
//! output. Nothing persists in memory across runs; durable state lives only
//! in the files the run reads and writes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `autoblog.toml` loading: sparse overrides, stock defaults, validation |
//! | [`naming`] | pure title+date → slug and filenames derivation |
//! | [`content`] | content synthesis: external service strategy with deterministic fallback |
//! | [`dom`] | anchor contract and HTML tree surgery shared by render and listing |
//! | [`render`] | template mutation into the post document (fails loudly on missing anchors) |
//! | [`listing`] | index entry fragment + newest-first insertion (best-effort) |
//! | [`fetch`] | cover image fetch over HTTP — the run's one fatal external dependency |
//! | [`publish`] | git commit/push collaborator, non-fatal |
//! | [`errlog`] | injected append-only error log, one timestamped line per failure |
//! | [`pipeline`] | orchestrator sequencing the stages and owning the error taxonomy |
//!
//! # Design Decisions
//!
//! ## Anchors Over Selectors
//!
//! The template and index rewrites never chase ad hoc selectors. Every
//! required location is a named [`dom::Anchor`] validated up front; a
//! missing anchor produces a typed error naming it instead of a silently
//! malformed document.
//!
//! ## Mutation Over Generation
//!
//! The post page is not generated from scratch — an existing, hand-styled
//! template is parsed and surgically rewritten, so the site's layout is
//! preserved byte-for-byte outside the anchored fragments. New fragments
//! (index entry, fallback body, date line) are built with
//! [Maud](https://maud.lambda.xyz/) and grafted in as parsed markup.
//!
//! ## Failure Asymmetry
//!
//! Image fetch failure aborts the run; index and publish failures degrade
//! to logged skips. A post without its cover image is unacceptable, while a
//! post missing from the index is a partial success to retry out-of-band.

pub mod config;
pub mod content;
pub mod dom;
pub mod errlog;
pub mod fetch;
pub mod listing;
pub mod naming;
pub mod pipeline;
pub mod publish;
pub mod render;
