use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use chapterize_core::{DebugConfig, ImportConfig, ImportStages, OutputFormat, TextImporter};

#[derive(Parser)]
#[command(name = "chapterize")]
#[command(about = "Split plain-text e-books into chapters with configurable detection rules")]
struct Args {
    /// Path to the text file to import
    #[arg(short, long)]
    input: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: book, chapters, or flat
    #[arg(short = 'f', long, default_value = "book")]
    output_format: String,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Treat the whole text as one chapter
    #[arg(long)]
    no_detect: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Log candidate headings matching these patterns (regex or substring)
    #[arg(long, num_args = 1..)]
    debug_filter: Vec<String>,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: metadata lines, classified lines, detection, and the final book
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    println!("📚 Chapterize Text Importer");

    if args.show_configs {
        return show_help();
    }

    let Some(input) = args.input.as_deref() else {
        tracing::error!("❌ No input file given. Use --input <path> or --show-configs.");
        std::process::exit(2);
    };
    check_input(input)?;

    let format: OutputFormat = args.output_format.parse()?;

    let config = ImportConfig::load_with_fallback(args.config.as_deref());
    match &args.config {
        Some(config_path) => tracing::info!("📋 Loaded config from: {}", config_path),
        None => tracing::info!("📋 Using default config"),
    }

    let mut importer = TextImporter::new(config).context("Failed to build importer")?;
    importer.set_profiling(args.profile);
    if !args.debug_filter.is_empty() {
        importer.set_debug_config(DebugConfig::new(true, args.debug_filter.clone()));
    }

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {input}"))?;
    let source_name = Path::new(input).file_stem().and_then(|s| s.to_str());
    let detect_chapters = !args.no_detect;

    println!("📄 Processing: {}", input);

    // Stage dump mode: capture and save all intermediates
    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        let stages = importer
            .capture_stages(&text, source_name, detect_chapters)
            .context("Stage dump failed")?;
        save_stages(&stages, input, &args.stages_dir)?;
        println!("\n✅ All stages dumped to: {}", args.stages_dir);
        return Ok(());
    }

    let result = importer
        .import(&text, source_name, detect_chapters)
        .with_context(|| format!("Import of {input} failed"))?;

    println!("✅ Successfully imported text");
    println!("📊 Import metrics:");
    println!("   - Chapters: {}", result.profile.chapter_count);
    println!("   - Words: {}", result.profile.total_words);
    println!(
        "   - Detection: {} (confidence {:.2}{})",
        result.profile.detection.rule,
        result.profile.detection.confidence,
        if result.profile.detection.fell_back { ", fallback" } else { "" }
    );

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, args.config.as_deref()));
    result.save_with_format(&output_path, format)?;
    println!("💾 {:?} format results saved to: {}", format, output_path);

    Ok(())
}

/// The input must be an existing regular file
fn check_input(input: &str) -> Result<()> {
    let path = Path::new(input);
    if !path.exists() {
        bail!("Input file not found: {input}");
    }
    if !path.is_file() {
        bail!("Input is not a file: {input}");
    }
    Ok(())
}

/// `<input stem>[_<config stem>]_chapters.json`
fn default_output_path(input: &str, config: Option<&str>) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let config_suffix = config
        .and_then(|p| Path::new(p).file_stem())
        .and_then(|s| s.to_str())
        .map(|s| format!("_{s}"))
        .unwrap_or_default();
    format!("{input_name}{config_suffix}_chapters.json")
}

fn show_help() -> Result<()> {
    println!("\n📋 Available Configuration Options:");
    println!("  --config <path>          Load custom config file");
    println!("  --input <path>           Text file to import");
    println!("  --output <path>          Output file path (auto-generated if not specified)");
    println!("  --output-format <fmt>    Output format: book, chapters, or flat");
    println!("  --no-detect              Skip chapter detection, one chapter for the whole text");
    println!("  --profile                Print timings for each pipeline step");
    println!("  --debug-filter <pat>...  Log candidate headings matching the patterns");
    println!("  --dump-stages            Write every pipeline stage to --stages-dir");

    println!("\n📄 Output Formats:");
    println!("  book      - Full structure: parts, chapters, lines, metadata, profile (default)");
    println!("  chapters  - Ordered chapter records with title and text");
    println!("  flat      - Simple array of chapter texts (minimal format)");

    println!("\n🔧 Detection rules (pipeline.rules, in priority order):");
    println!("  KeywordHeading   - CHAPTER IV, Part Two, PROLOGUE ...");
    println!("  BlankLineBlock   - short all-caps lines between blank lines");
    println!("  NumericSequence  - bare numerals counting up from 1");

    println!("\n⚙️  Default config:");
    println!("{}", ImportConfig::default().to_yaml()?);

    println!("📝 Usage Examples:");
    println!("  chapterize -i book.txt");
    println!("  chapterize -i book.txt -o /path/to/output.json");
    println!("  chapterize -i book.txt -c config.yaml -f chapters");
    Ok(())
}

fn save_stages(stages: &ImportStages, input: &str, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    // Stage 1: Metadata region
    let meta_path = format!("{}/stage1_metadata_lines.json", output_dir);
    fs::write(&meta_path, serde_json::to_string_pretty(&stages.metadata_lines)?)?;
    println!("  💾 {} ({} lines)", meta_path, stages.metadata_lines.len());

    // Stage 2: Classified lines
    let lines_path = format!("{}/stage2_lines.json", output_dir);
    fs::write(&lines_path, serde_json::to_string_pretty(&stages.lines)?)?;
    println!("  💾 {} ({} lines)", lines_path, stages.lines.len());

    // Stage 3: Detection
    let detection_path = format!("{}/stage3_detection.json", output_dir);
    let detection = serde_json::json!({
        "detection": &stages.detection,
        "position": &stages.position,
        "rejected": &stages.rejected,
    });
    fs::write(&detection_path, serde_json::to_string_pretty(&detection)?)?;
    println!("  💾 {} ({} chapters)", detection_path, stages.position.len());

    // Stage 4: Final book
    let book_path = format!("{}/stage4_book.json", output_dir);
    stages.result.save_with_format(&book_path, OutputFormat::Book)?;
    println!("  💾 {} ({} parts)", book_path, stages.result.parts.len());

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "input": input,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "metadata_lines": stages.metadata_lines.len(),
            "lines": stages.lines.len(),
            "chapters": stages.position.len(),
            "rejected_rules": stages.rejected.len(),
            "words": stages.result.profile.total_words,
        }
    });
    let summary_path = format!("{}/summary.json", output_dir);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path);

    Ok(())
}
