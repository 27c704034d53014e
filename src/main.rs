use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use symchunk::config::Config;
use symchunk::indexer::core::Indexer;
use symchunk::indexer::discovery::{extension_stats, find_source_files};
use symchunk::lsp::client::LspClient;
use symchunk::output::{self, OutputStats};

#[derive(Parser, Debug)]
#[command(name = "symchunk", version, about = "Semantic chunks from clangd document symbols")]
struct Cli {
    /// JSON configuration file
    #[arg(long, default_value = "symchunk.json")]
    config: PathBuf,

    /// Source tree to index
    #[arg(long)]
    root: Option<String>,

    /// Directory containing compile_commands.json
    #[arg(long = "compile-db")]
    compile_db: Option<String>,

    /// Output JSON file
    #[arg(long, short)]
    output: Option<String>,

    /// Chunk only these files instead of walking the root
    #[arg(long = "test-file")]
    test_files: Vec<PathBuf>,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// clangd executable
    #[arg(long)]
    clangd: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.root.clone_from(root);
        }
        if let Some(dir) = &self.compile_db {
            config.compile_commands_dir.clone_from(dir);
        }
        if let Some(output) = &self.output {
            config.output.clone_from(output);
        }
        if let Some(clangd) = &self.clangd {
            config.clangd_path.clone_from(clangd);
        }
        if self.compact {
            config.compact = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 1. Load config, flags win
    let mut config = Config::load(&cli.config)?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    // 2. Collect files
    let files = if cli.test_files.is_empty() {
        info!("Scanning {}", config.root);
        find_source_files(&config.root, &config.discovery_options())
            .with_context(|| format!("failed to discover sources under {}", config.root))?
    } else {
        cli.test_files.clone()
    };
    info!("Found {} source files", files.len());
    for (ext, count) in extension_stats(&files) {
        info!("  {ext}: {count}");
    }

    // 3. Start clangd
    let mut client = LspClient::start(config.lsp_options())
        .await
        .with_context(|| format!("failed to start {}", config.clangd_path))?;

    // 4. Chunk
    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .context("invalid progress template")?,
    );
    let result = {
        let mut indexer = Indexer::new(&mut client);
        let run = indexer.chunk_files_with_progress(&files, |path, _| {
            bar.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            bar.inc(1);
        });
        tokio::select! {
            result = run => result,
            _ = tokio::signal::ctrl_c() => {
                bar.abandon_with_message("interrupted");
                anyhow::bail!("interrupted");
            }
        }
    };
    bar.finish_and_clear();

    if let Err(e) = client.shutdown().await {
        warn!("clangd shutdown failed: {e}");
    }

    info!(
        "Processed {} files ({} failed, {} without symbols)",
        result.processed, result.failed, result.empty
    );
    for failure in &result.failures {
        warn!("  {}: {}", failure.path.display(), failure.error);
    }

    // 5. Write output
    output::write_json(&result.chunks, &config.output, config.compact)
        .with_context(|| format!("failed to save chunks to {}", config.output))?;
    info!("Saved {} chunks to {}", result.chunks.len(), config.output);

    let stats = OutputStats::from_chunks(&result.chunks);
    info!("  with docstring: {}", stats.with_docstring);
    for (code_type, count) in &stats.by_type {
        info!("  {code_type}: {count}");
    }

    Ok(())
}
