#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use careerprobe::artifacts::SCREENSHOT_DIR;
use careerprobe::errors::ProbeError;
use careerprobe::pages::home::HOME_URL;
use careerprobe::scenario::{DEFAULT_DEPARTMENT, DEFAULT_LOCATION};
use careerprobe::webdriver_manager::{GLOBAL_WEBDRIVER_MANAGER, WebDriverManager};
use careerprobe::{
    Browser, BrowserType, OutputFormat, Scenario, ScenarioReport, SessionOptions, Toolkit,
    ViewportSize, WaitConfig, run_session,
};

// Exit codes
const EXIT_SUCCESS: i32 = 0;

const DEFAULT_RUN_NAME: &str = "insider_qa_jobs_istanbul";

#[derive(Parser)]
#[command(name = "careerprobe")]
#[command(about = "End-to-end check of the Insider One careers funnel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the careers flow in a fresh browser session
    Run {
        /// Browser to use (chrome or firefox)
        #[arg(short, long, default_value = "chrome")]
        browser: String,

        /// Run without a visible window
        #[arg(long)]
        headless: bool,

        /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
        #[arg(long)]
        viewport: Option<String>,

        /// Homepage to start from
        #[arg(long, default_value = HOME_URL)]
        url: String,

        /// Location filter
        #[arg(long, default_value = DEFAULT_LOCATION)]
        location: String,

        /// Team filter
        #[arg(long, default_value = DEFAULT_DEPARTMENT)]
        department: String,

        /// Default wait timeout in seconds
        #[arg(short, long, default_value = "15")]
        timeout: u64,

        /// Pause between DOM re-checks in milliseconds
        #[arg(long, default_value = "500", value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval_ms: u64,

        /// Where failure screenshots are written
        #[arg(long, default_value = SCREENSHOT_DIR)]
        screenshots_dir: PathBuf,

        /// Run name, used in screenshot file names
        #[arg(long, default_value = DEFAULT_RUN_NAME)]
        name: String,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Check whether a WebDriver server is reachable
    Status {
        /// Browser whose driver to check
        #[arg(short, long, default_value = "chrome")]
        browser: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
                "exit_code": err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

/// Exit code of a run whose outcome has already been printed
async fn run() -> Result<i32, ProbeError> {
    // Logs on stderr so stdout stays clean for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "careerprobe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            browser,
            headless,
            viewport,
            url,
            location,
            department,
            timeout,
            poll_interval_ms,
            screenshots_dir,
            name,
            format,
        } => {
            let browser_type: BrowserType = browser.parse()?;
            let viewport = viewport.as_deref().map(ViewportSize::parse).transpose()?;
            Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;

            let options = SessionOptions {
                name,
                screenshots_dir,
                wait: WaitConfig::with_timeout(Duration::from_secs(timeout))
                    .poll_interval(Duration::from_millis(poll_interval_ms)),
            };
            let scenario = Scenario {
                home_url: url,
                location,
                department,
            };
            info!(
                "Running '{}': {} / {}",
                options.name, scenario.location, scenario.department
            );

            let browser = Browser::new(browser_type, viewport, headless)
                .await
                .map_err(|e| ProbeError::WebDriver(format!("{:#}", e)))?;

            let outcome = run_session(browser, &options, async |toolkit: &Toolkit<Browser>| {
                scenario.run(toolkit).await
            })
            .await;

            match outcome {
                Ok(report) => {
                    print_report(&report, format, None)?;
                    Ok(EXIT_SUCCESS)
                }
                Err(failure) => {
                    print_report(&failure.report, format, Some(&failure.to_string()))?;
                    eprintln!("Error: {}", failure);
                    Ok(failure.exit_code())
                }
            }
        }

        Commands::Status { browser } => {
            let browser_type: BrowserType = browser.parse()?;
            let url = browser_type.default_webdriver_url();
            let command = browser_type.driver_command();
            let status = json!({
                "browser": format!("{:?}", browser_type).to_lowercase(),
                "driver": command,
                "installed": WebDriverManager::command_exists(command),
                "url": url,
                "ready": WebDriverManager::is_driver_ready(&url).await,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&status).map_err(anyhow::Error::from)?
            );
            Ok(EXIT_SUCCESS)
        }

        Commands::Version => {
            println!("careerprobe {}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}

fn print_report(
    report: &ScenarioReport,
    format: OutputFormat,
    error: Option<&str>,
) -> Result<(), ProbeError> {
    match format {
        OutputFormat::Json => {
            let output = json!({
                "passed": error.is_none(),
                "error": error,
                "report": report,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).map_err(anyhow::Error::from)?
            );
        }
        OutputFormat::Simple => {
            println!("{}", report.trace());
            if let Some(listing) = &report.listing {
                for card in listing.mismatches() {
                    println!(
                        "  mismatch: job {} '{}' at '{}'",
                        card.index, card.title, card.location
                    );
                }
            }
            match error {
                Some(error) => println!("FAILED: {}", error),
                None => println!("PASSED: {} steps", report.steps.len()),
            }
        }
    }
    Ok(())
}
