mod config;
mod engine;
mod error;
mod files;
mod utils;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{PackConfig, DEFAULT_CONFIG_FILE};
use engine::visualize::{render_text, TreeMode};
use error::CodecError;
use utils::format::{format_percent, format_size};

#[derive(Parser)]
#[command(name = "huffpack")]
#[command(about = "Lossless Huffman compression for arbitrary files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Output directory (overrides config)")]
    output_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Compress a file into a container
    Compress {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decompress a container back to the original file
    Decompress {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the Huffman tree for a file or container
    Tree {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = TreeMode::Auto)]
        mode: TreeMode,
    },
    /// Print a container's header
    Inspect { input: PathBuf },
    /// Decode a container and compare it against the original file
    Verify { container: PathBuf, original: PathBuf },
    GenerateConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE, help = "Config file path")]
        output: String,
    },
}

fn print_error(json: bool, title: &str, e: &CodecError) {
    if json {
        println!("{}", serde_json::json!({"error": e.to_string(), "kind": error_kind(e)}));
    } else {
        eprintln!("❌ {}: {}", title, e);
    }
}

fn error_kind(e: &CodecError) -> &'static str {
    match e {
        CodecError::EmptyInput => "empty_input",
        CodecError::IneffectiveCompression { .. } => "ineffective_compression",
        CodecError::InvalidFormat(_) => "invalid_format",
        CodecError::CorruptContainer(_) => "corrupt_container",
        CodecError::InputTooLarge(_) => "input_too_large",
        CodecError::Io(_) => "io",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PackConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.output_directory = Some(dir);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(?config, "Configuration loaded");

    config.ensure_output_directory()?;

    match cli.command {
        Commands::Compress { input, output } => {
            match files::compress_file(&input, output.as_deref(), &config).await {
                Ok(outcome) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    } else {
                        let r = &outcome.report;
                        println!("📦 Compressed {}", outcome.input.display());
                        println!("   Output: {}", outcome.output.display());
                        println!("   Original size: {}", format_size(r.original_size as u64));
                        println!("   Compressed size: {}", format_size(r.compressed_size as u64));
                        println!("   Ratio: {}", format_percent(r.ratio));
                        println!("   Saved: {}", format_percent(r.saved_fraction));
                    }
                }
                Err(e) => {
                    print_error(cli.json, "Compression failed", &e);
                    return Err(e.into());
                }
            }
        }
        Commands::Decompress { input, output } => {
            match files::decompress_file(&input, output.as_deref(), &config).await {
                Ok(outcome) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    } else {
                        let r = &outcome.report;
                        println!("📂 Decompressed {}", outcome.input.display());
                        println!("   Output: {}", outcome.output.display());
                        println!("   Compressed size: {}", format_size(r.compressed_size as u64));
                        println!("   Decompressed size: {}", format_size(r.decompressed_size as u64));
                        println!("   Ratio: {}", format_percent(r.ratio));
                    }
                }
                Err(e) => {
                    print_error(cli.json, "Decompression failed", &e);
                    return Err(e.into());
                }
            }
        }
        Commands::Tree { input, mode } => match files::tree_for_file(&input, mode, &config).await {
            Ok(view) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    print!("{}", render_text(&view));
                }
            }
            Err(e) => {
                print_error(cli.json, "Tree construction failed", &e);
                return Err(e.into());
            }
        },
        Commands::Inspect { input } => match files::inspect_file(&input, &config).await {
            Ok(summary) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    println!("🔍 Container Header");
                    println!("==================");
                    println!("   Symbols: {}", summary.symbol_count);
                    println!("   Valid bits in last byte: {}", summary.valid_bits_last_byte);
                    println!("   Original length: {}", summary.original_length);
                    println!("   Header size: {}", format_size(summary.header_size as u64));
                    println!("   Payload size: {}", format_size(summary.payload_size as u64));
                    for entry in &summary.entries {
                        println!("   {:>6} x{:<10} {}", entry.label, entry.count, entry.code);
                    }
                }
            }
            Err(e) => {
                print_error(cli.json, "Inspection failed", &e);
                return Err(e.into());
            }
        },
        Commands::Verify { container, original } => {
            match files::verify_file(&container, &original, &config).await {
                Ok(report) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else if report.hash_match {
                        println!("✅ {} matches {}", report.container.display(), report.original.display());
                        println!("   SHA-256: {}", report.decoded_sha256);
                    } else {
                        println!("❌ {} does not match {}", report.container.display(), report.original.display());
                        println!("   Decoded:  {}", report.decoded_sha256);
                        println!("   Original: {}", report.original_sha256);
                    }
                    if !report.hash_match {
                        anyhow::bail!("verification failed");
                    }
                }
                Err(e) => {
                    print_error(cli.json, "Verification failed", &e);
                    return Err(e.into());
                }
            }
        }
        Commands::GenerateConfig { output } => {
            PackConfig::default().save(&output)?;
            if cli.json {
                println!("{}", serde_json::json!({"success": true, "path": output}));
            } else {
                println!("✅ Wrote default configuration to {}", output);
            }
        }
    }

    Ok(())
}
