//! chatdown - export a saved conversation page to Markdown

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use chatdown::{ChatDateMode, ExportOptions, ExportService, Page};

#[derive(Parser)]
#[command(name = "chatdown")]
#[command(version, about = "Export a saved conversation page to Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    chatdown chat.html                         Write \"<title>.md\" to the current directory
    chatdown chat.html --url https://claude.ai/chat/1 --out-dir notes
    curl -s file://chat.html | chatdown - --stdout")]
struct Cli {
    /// Saved HTML page, or `-` to read standard input
    #[arg(value_name = "INPUT")]
    input: String,

    /// Location the page was captured from; used as the export link target
    #[arg(long, default_value = "about:blank")]
    url: String,

    /// Directory to write the Markdown file into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Name shown in the speaker line of user turns
    #[arg(short, long, default_value = "User")]
    speaker: String,

    /// Add the conversation date found on the page, if any
    #[arg(long)]
    chat_date: bool,

    /// Print the Markdown instead of saving it
    #[arg(long)]
    stdout: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        ConfigBuilder::new()
            .add_filter_ignore_str("html5ever")
            .add_filter_ignore_str("selectors")
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let html = read_input(&cli.input)?;
    let page = Page::from_html(&html, cli.url.as_str());

    let service = ExportService::with_options(export_options(&cli));

    let markdown = service.export_now(&page);

    if cli.stdout {
        let mut out = io::stdout().lock();
        writeln!(out, "{markdown}").context("failed to write to stdout")?;
        return Ok(());
    }

    let path = service
        .save(&page, &markdown, &cli.out_dir)
        .with_context(|| format!("failed to save export to {}", cli.out_dir.display()))?;
    info!("exported {} to {}", cli.input, path.display());
    println!("{}", path.display());
    Ok(())
}

fn export_options(cli: &Cli) -> ExportOptions {
    ExportOptions {
        speaker_name: cli.speaker.clone(),
        chat_date: if cli.chat_date {
            ChatDateMode::Include
        } else {
            ChatDateMode::Omit
        },
        ..Default::default()
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut html = String::new();
        io::stdin()
            .read_to_string(&mut html)
            .context("failed to read HTML from stdin")?;
        return Ok(html);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}
