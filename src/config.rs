//! Run configuration.
//!
//! Loads `autoblog.toml`. The file is sparse: stock defaults cover every
//! option, user config overrides just the values it names, and unknown keys
//! are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "AutoBlog"                      # Suffix for the <title> tag
//! output_dir = "site"                         # Where posts and images land
//! template_path = "site/template.html"        # Base post template (read-only)
//! index_path = "site/index.html"              # Listing document (read-write)
//! error_log_path = "autoblog-errors.log"      # Append-only error log
//!
//! # Topic catalog — one is picked uniformly at random per run
//! topics = ["AI tools for productivity", "..."]
//!
//! # External services
//! image_service_url = "https://image.example.com/generate"
//! generation_url = "https://api.example.com/v1/posts"
//! credential_env = "AUTOBLOG_API_KEY"         # Env var holding the API key;
//!                                             # unset = deterministic fallback
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `autoblog.toml`.
///
/// All fields have working defaults; a missing config file means a fully
/// stock run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Site name appended to the page title of every post.
    pub site_name: String,
    /// Directory receiving the post file and the cover image.
    pub output_dir: PathBuf,
    /// Base post template. Read-only input; must contain the render anchors.
    pub template_path: PathBuf,
    /// Listing/index document. Read-write; missing grid skips the update.
    pub index_path: PathBuf,
    /// Append-only error log file.
    pub error_log_path: PathBuf,
    /// Fixed ordered topic catalog. One entry is chosen per run.
    pub topics: Vec<String>,
    /// Image service endpoint. Receives the prompt as a `prompt` query
    /// parameter and returns a binary image stream.
    pub image_service_url: String,
    /// Content generation service endpoint (JSON POST).
    pub generation_url: String,
    /// Name of the environment variable holding the generation credential.
    pub credential_env: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            site_name: "AutoBlog".to_string(),
            output_dir: PathBuf::from("site"),
            template_path: PathBuf::from("site/template.html"),
            index_path: PathBuf::from("site/index.html"),
            error_log_path: PathBuf::from("autoblog-errors.log"),
            topics: stock_topics(),
            image_service_url: "https://image.example.com/generate".to_string(),
            generation_url: "https://api.example.com/v1/posts".to_string(),
            credential_env: "AUTOBLOG_API_KEY".to_string(),
        }
    }
}

fn stock_topics() -> Vec<String> {
    [
        "AI tools for productivity",
        "Web development trends",
        "Remote work best practices",
        "Cybersecurity essentials",
        "Cloud computing for small teams",
        "Open source sustainability",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl BlogConfig {
    /// Validate config values before a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topics.is_empty() {
            return Err(ConfigError::Validation("topics must not be empty".into()));
        }
        if self.site_name.trim().is_empty() {
            return Err(ConfigError::Validation("site_name must not be empty".into()));
        }
        for (field, value) in [
            ("image_service_url", &self.image_service_url),
            ("generation_url", &self.generation_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(ConfigError::Validation(format!(
                    "{field} is not a valid URL: {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file, falling back to stock defaults when the
/// file does not exist.
pub fn read_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    let config = if path.exists() {
        toml::from_str(&fs::read_to_string(path)?)?
    } else {
        BlogConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A documented stock `autoblog.toml`, printed by the `gen-config` command.
pub fn stock_config_toml() -> String {
    let defaults = BlogConfig::default();
    let topics = defaults
        .topics
        .iter()
        .map(|t| format!("    \"{t}\","))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"# autoblog configuration
# All options are optional - defaults shown below

# Suffix for the <title> tag of every generated post
site_name = "{site_name}"

# Where the post file and cover image are written
output_dir = "{output_dir}"

# Base post template (read-only input, must contain the render anchors)
template_path = "{template_path}"

# Listing/index document (read-write; a missing grid skips the update)
index_path = "{index_path}"

# Append-only error log, one timestamped line per failure
error_log_path = "{error_log_path}"

# Topic catalog - one entry is picked uniformly at random per run
topics = [
{topics}
]

# Image service; receives the prompt as a `prompt` query parameter
image_service_url = "{image_service_url}"

# Content generation service (JSON POST with bearer credential)
generation_url = "{generation_url}"

# Environment variable holding the generation credential.
# When unset, the deterministic fallback content is used.
credential_env = "{credential_env}"
"#,
        site_name = defaults.site_name,
        output_dir = defaults.output_dir.display(),
        template_path = defaults.template_path.display(),
        index_path = defaults.index_path.display(),
        error_log_path = defaults.error_log_path.display(),
        image_service_url = defaults.image_service_url,
        generation_url = defaults.generation_url,
        credential_env = defaults.credential_env,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        BlogConfig::default().validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = read_config(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.site_name, "AutoBlog");
        assert!(!config.topics.is_empty());
    }

    #[test]
    fn sparse_file_overrides_only_named_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoblog.toml");
        std::fs::write(&path, "site_name = \"My Blog\"\n").unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.site_name, "My Blog");
        assert_eq!(config.output_dir, PathBuf::from("site"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoblog.toml");
        std::fs::write(&path, "site_nmae = \"typo\"\n").unwrap();

        assert!(matches!(read_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn empty_topics_fail_validation() {
        let config = BlogConfig {
            topics: vec![],
            ..BlogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn bad_url_fails_validation() {
        let config = BlogConfig {
            image_service_url: "not a url".to_string(),
            ..BlogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_round_trips() {
        let parsed: BlogConfig = toml::from_str(&stock_config_toml()).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.site_name, BlogConfig::default().site_name);
    }
}
