use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use coverdiff_core::{ComparisonResult, Config, DocumentPair, OpenAiService};
use coverdiff_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

const DEFAULT_PLACEHOLDER: &str = "Aucun équivalent";

/// Compare two insurance warranty tables, category by category
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize two warranty-table PDFs and show them side by side
    Compare {
        /// First PDF
        left: PathBuf,

        /// Second PDF
        right: PathBuf,

        /// Print the raw comparison result as JSON
        #[arg(long, conflicts_with = "aligned_json")]
        json: bool,

        /// Print the category-aligned view as JSON
        #[arg(long)]
        aligned_json: bool,

        #[command(flatten)]
        render: RenderArgs,

        /// Model name sent to the text service
        #[arg(long)]
        model: Option<String>,

        /// API key for the text service
        #[arg(long)]
        api_key: Option<String>,

        /// Base URL of the text service
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Re-validate a saved comparison result and show it side by side
    Show {
        /// JSON file written by `compare --json`
        result: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Path to output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text shown where a category has no counterpart
    #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,
}

impl RenderArgs {
    fn color(&self) -> ColorMode {
        ColorMode(!self.no_color && self.output.is_none())
    }

    fn writer(&self) -> anyhow::Result<Box<dyn Write>> {
        Ok(match &self.output {
            Some(path) => Box::new(
                std::fs::File::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))?,
            ),
            None => Box::new(std::io::stdout()),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coverdiff_core=warn,coverdiff_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Compare {
            left,
            right,
            json,
            aligned_json,
            render,
            model,
            api_key,
            base_url,
            timeout_secs,
        } => {
            let mut config = Config::load();
            if let Some(key) = api_key {
                config.api_key = Some(key);
            }
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(url) = base_url {
                config.base_url = url;
            }
            if let Some(secs) = timeout_secs {
                config.timeout_secs = secs;
            }

            let output = if json {
                Output::Json
            } else if aligned_json {
                Output::AlignedJson
            } else {
                Output::Columns
            };
            compare(&left, &right, &config, output, &render).await
        }
        Command::Show { result, render } => show(&result, &render),
    }
}

#[derive(Debug, Clone, Copy)]
enum Output {
    Columns,
    Json,
    AlignedJson,
}

async fn compare(
    left: &Path,
    right: &Path,
    config: &Config,
    output: Output,
    render: &RenderArgs,
) -> anyhow::Result<()> {
    let service = OpenAiService::from_config(config).context(
        "no API key configured: pass --api-key, set OPENAI_API_KEY, or add [service].api_key",
    )?;
    tracing::debug!(?config, "resolved configuration");

    let docs = DocumentPair::new(read_pdf(left)?, read_pdf(right)?);
    let backend = Arc::new(
        MupdfBackend::new()
            .with_header_exclusion(config.header_exclusion)
            .with_footer_exclusion(config.footer_exclusion),
    );

    let color = render.color();
    let spinner = if color.enabled() {
        Some(spinner(service.model())?)
    } else {
        None
    };

    let result = coverdiff_core::compare_documents(backend, &service, docs).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result?;

    let mut writer = render.writer()?;
    write_result(&mut *writer, &result, output, &render.placeholder, color)?;
    writer.flush()?;
    Ok(())
}

fn show(path: &Path, render: &RenderArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let result = coverdiff_core::parse_comparison(&raw)
        .with_context(|| format!("{} is not a valid comparison result", path.display()))?;

    let mut writer = render.writer()?;
    write_result(
        &mut *writer,
        &result,
        Output::Columns,
        &render.placeholder,
        render.color(),
    )?;
    writer.flush()?;
    Ok(())
}

fn read_pdf(path: &Path) -> anyhow::Result<Vec<u8>> {
    let data = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = data.len(), "read document");
    Ok(data)
}

fn spinner(model: &str) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")?);
    bar.set_message(format!("Comparing documents with {model}..."));
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn write_result(
    w: &mut dyn Write,
    result: &ComparisonResult,
    output: Output,
    placeholder: &str,
    color: ColorMode,
) -> anyhow::Result<()> {
    match output {
        Output::Columns => output::print_comparison(w, result, placeholder, color)?,
        Output::Json => {
            serde_json::to_writer_pretty(&mut *w, result)?;
            writeln!(w)?;
        }
        Output::AlignedJson => {
            let aligned = result.align();
            let view = serde_json::json!({
                "tables": [&result.left.name, &result.right.name],
                "categories": aligned.pairs(),
            });
            serde_json::to_writer_pretty(&mut *w, &view)?;
            writeln!(w)?;
        }
    }
    Ok(())
}
