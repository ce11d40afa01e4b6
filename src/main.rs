//! resume-parser CLI - structured résumé extraction from .docx exports

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info};
use serde_json::{json, Value};

use resume_parser_rs::core::parser::{DocxParser, Parser as _};
use resume_parser_rs::etl::fields::FieldsExtractor;
use resume_parser_rs::{parse_file, Locale, Paragraph, ParserConfig};

#[derive(Parser)]
#[command(name = "resume-parser")]
#[command(version)]
#[command(about = "Extract structured résumé records from .docx files", long_about = None)]
struct Cli {
    /// Parser configuration (JSON)
    #[arg(long, global = true, env = "RESUME_PARSER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a résumé, or every .docx in a directory
    Parse {
        /// Input .docx file or directory
        #[arg(value_name = "FILE|DIR")]
        input: PathBuf,

        /// Emit the block document instead of the record map
        #[arg(long)]
        blocks: bool,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Dump extracted paragraphs
    Paragraphs {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Run a single field extractor on text lines
    Field {
        /// Field name, e.g. `phone` or `experience.total`
        name: String,

        /// One argument per line
        #[arg(required = true)]
        text: Vec<String>,

        /// Template locale
        #[arg(long, default_value = "ru")]
        locale: Locale,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ParserConfig::default(),
    };

    match cli.command {
        Commands::Parse { input, blocks, pretty } => {
            if input.is_dir() {
                parse_dir(&input, &config, blocks, pretty)
            } else {
                let value = parse_one(&input, &config, blocks)?;
                print_json(&value, pretty)
            }
        }
        Commands::Paragraphs { input } => {
            let paragraphs = DocxParser::new()
                .parse(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            print_json(&serde_json::to_value(paragraphs)?, true)
        }
        Commands::Field { name, text, locale } => {
            let lines: Vec<Paragraph> = text.into_iter().map(Paragraph::from).collect();
            let value = FieldsExtractor::new(locale, locale).extract(&name, &lines);
            print_json(&serde_json::to_value(value)?, true)
        }
    }
}

fn parse_one(path: &Path, config: &ParserConfig, blocks: bool) -> anyhow::Result<Value> {
    let etl = parse_file(path, config)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if blocks {
        return Ok(etl.to_blocks());
    }
    Ok(json!({
        "template_lang": etl.template_lang(),
        "doc_lang": etl.doc_lang(),
        "resume": etl.get_resume().to_value(),
    }))
}

fn parse_dir(dir: &Path, config: &ParserConfig, blocks: bool, pretty: bool) -> anyhow::Result<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("docx")))
        .collect();
    files.sort();

    let mut failed = 0;
    for path in &files {
        info!("Parsing {}", path.display());
        match parse_one(path, config, blocks) {
            Ok(value) => {
                let entry = json!({ "file": path.display().to_string(), "result": value });
                print_json(&entry, pretty)?
            }
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }
    info!("Parsed {} of {} files", files.len() - failed, files.len());
    Ok(())
}

fn print_json(value: &Value, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
