//! CLI tool for translating PowerPoint files with their formatting intact.

use anyhow::{Context, Result};
use clap::Parser;
use deck_client::{ClientConfig, TranslationClient};
use deck_core::Language;
use std::path::{Path, PathBuf};

/// Translate the text of a .pptx file, keeping fonts, colors and layout.
#[derive(Parser, Debug)]
#[command(name = "pptx-translate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    #[arg(required_unless_present = "list_languages")]
    input: Option<PathBuf>,

    /// Target language code (see --list-languages)
    #[arg(short, long, required_unless_present_any = ["list_languages", "dump_templates"])]
    lang: Option<String>,

    /// Output file (default: <input>_translated_<lang>.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model used for translation
    #[arg(long, env = "PPTX_TRANSLATE_MODEL", default_value = deck_client::config::DEFAULT_MODEL)]
    model: String,

    /// Messages API endpoint
    #[arg(long, env = "PPTX_TRANSLATE_ENDPOINT", default_value = deck_client::config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// API key for the translation service
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Attempts per text when the service is throttling
    #[arg(long, default_value = "5")]
    max_attempts: u32,

    /// List supported target languages and exit
    #[arg(long)]
    list_languages: bool,

    /// Print the formatting templates found in the input as JSON and exit
    #[arg(long)]
    dump_templates: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if args.list_languages {
        for language in Language::ALL {
            println!("{}\t{}", language.code(), language.display_name());
        }
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No input file given"))?;

    if args.dump_templates {
        let slides = deck_pptx::inspect_presentation(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        println!("{}", serde_json::to_string_pretty(&slides)?);
        return Ok(());
    }

    let code = args.lang.as_deref().unwrap_or_default();
    let language = Language::parse(code)?;
    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => get_output_path(input, language),
    };

    let summary = translate(input, &output_path, language, &args)?;
    println!("{}", summary);

    if !summary.succeeded() {
        eprintln!("Translation failed: no slide could be translated");
        std::process::exit(1);
    }
    println!("Written to: {}", output_path.display());
    Ok(())
}

/// Translate one file with a client built from the arguments.
fn translate(
    input: &Path,
    output: &Path,
    language: Language,
    args: &Args,
) -> Result<deck_core::RunSummary> {
    let mut config = ClientConfig::default()
        .with_model(&args.model)
        .with_endpoint(&args.endpoint)
        .with_max_attempts(args.max_attempts);
    config.api_key = args.api_key.clone();

    let client = TranslationClient::connect(config)
        .context("Failed to set up the translation client (is ANTHROPIC_API_KEY set?)")?;

    deck_pptx::translate_presentation(input, output, language.code(), &client)
        .with_context(|| format!("Failed to translate {}", input.display()))
}

/// Determine the output path for a translated file.
fn get_output_path(input_path: &Path, language: Language) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}_translated_{}.pptx", stem, language.code());

    match input_path.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}
