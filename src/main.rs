use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use autoblog::config::{self, BlogConfig};
use autoblog::content::Strategy;
use autoblog::errlog::{ErrorLog, FileErrorLog};
use autoblog::fetch::HttpImageFetcher;
use autoblog::listing::LISTING_GRID;
use autoblog::pipeline::Pipeline;
use autoblog::publish::GitPublisher;
use autoblog::{dom, render};
use chrono::Local;
use clap::{Parser, Subcommand};
use scraper::Html;

#[derive(Parser)]
#[command(name = "autoblog")]
#[command(about = "Single-run blog publishing pipeline")]
#[command(long_about = "\
Single-run blog publishing pipeline

Each run picks a topic from the configured catalog, synthesizes a post,
fetches a cover image, rewrites the base template into a standalone post
page, prepends an entry to the index, and commits the result.

Content strategy:
  With the credential env var set     generation service, fallback on error
  Without it                          deterministic template content

The base template must contain the render anchors (page title, hero title,
cover and inline image markers, and the content container). Run
'autoblog check' to validate a template without writing anything.")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "autoblog.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: topic → content → image → post → index → publish
    Run,
    /// Validate the template anchors and index grid without writing anything
    Check,
    /// Print a stock autoblog.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Run => {
            let config = config::read_config(&cli.config)?;
            let log = FileErrorLog::new(config.error_log_path.clone());
            let strategy = resolve_strategy(&config, &log);
            let fetcher = HttpImageFetcher::new(&config.image_service_url)?;
            let publisher = GitPublisher::new(&config.output_dir);

            let pipeline = Pipeline {
                config: &config,
                strategy: &strategy,
                fetcher: &fetcher,
                publisher: &publisher,
                log: &log,
            };

            match pipeline.run(Local::now().date_naive()) {
                Ok(report) => {
                    println!("==> Run complete");
                    println!("    Post:    {}", report.post_file.display());
                    println!("    Image:   {}", report.image_file.display());
                    println!(
                        "    Index:   {}",
                        if report.index_updated {
                            "updated"
                        } else {
                            "skipped (see error log)"
                        }
                    );
                    println!(
                        "    Publish: {}",
                        if report.published {
                            "ok"
                        } else {
                            "failed (see error log)"
                        }
                    );
                    Ok(())
                }
                Err(err) => {
                    // Fatal errors land in the persistent log too.
                    log.append(&err.to_string());
                    Err(err.into())
                }
            }
        }
        Command::Check => {
            let config = config::read_config(&cli.config)?;
            println!("==> Checking {}", config.template_path.display());
            let template = fs::read_to_string(&config.template_path)?;
            render::validate_template(&Html::parse_document(&template))?;
            println!("==> Template anchors are valid");

            println!("==> Checking {}", config.index_path.display());
            match fs::read_to_string(&config.index_path) {
                Ok(markup) => {
                    let index = Html::parse_document(&markup);
                    if dom::locate(&index, &LISTING_GRID).is_some() {
                        println!("==> Listing grid found");
                    } else {
                        println!("==> Listing grid missing - index updates would be skipped");
                    }
                }
                Err(err) => {
                    println!("==> Index not readable ({err}) - index updates would be skipped");
                }
            }
            Ok(())
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    }
}

/// Credential presence picks the strategy once at startup. A client that
/// cannot even be constructed degrades to the fallback, logged.
fn resolve_strategy(config: &BlogConfig, log: &dyn ErrorLog) -> Strategy {
    let credential = env::var(&config.credential_env).ok().filter(|v| !v.is_empty());
    match Strategy::resolve(credential, &config.generation_url) {
        Ok(strategy) => strategy,
        Err(err) => {
            log.append(&format!(
                "generation client unavailable, using fallback content: {err}"
            ));
            Strategy::Fallback
        }
    }
}
