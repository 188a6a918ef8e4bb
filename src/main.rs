// src/main.rs
mod document;
mod extractors;
mod pipeline;
mod storage;
mod utils;

use std::path::{Path, PathBuf};

use clap::Parser;
use pipeline::{ExportConfig, ExportPipeline};
use utils::AppError;

/// Extracts Quadros 30, 31 and 32 of the TISS organizational standard into CSV files and a zip archive
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source PDF, relative to the root directory unless absolute
    #[arg(long, env = "TISS_PDF_PATH", default_value = "padrao-tiss_componente-organizacional_202111.pdf")]
    pdf: PathBuf,

    /// Program root directory; the archive is written here
    #[arg(long, env = "TISS_ROOT_DIR", default_value = ".")]
    root_dir: PathBuf,

    /// Directory for the CSV files, relative to the root directory unless absolute
    #[arg(short, long, default_value = "csv")]
    output_dir: PathBuf,

    /// Archive base name (".zip" is appended)
    #[arg(short, long, default_value = "tabelas_tiss")]
    archive_name: String,

    /// Compression level: 0 stores, 1-9 deflates
    #[arg(short, long, env = "TISS_ZIP_LEVEL", default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,

    /// Skip archive creation
    #[arg(long)]
    no_archive: bool,

    /// Debug mode - save the extracted text, annotated markers and table regions
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn into_config(self) -> Result<ExportConfig, AppError> {
        if self.archive_name.trim().is_empty() || self.archive_name.contains(['/', '\\']) {
            return Err(AppError::Config(format!("Invalid archive name: {:?}", self.archive_name)));
        }

        let resolve = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root_dir.join(path)
            }
        };

        Ok(ExportConfig {
            source_pdf: resolve(&self.pdf),
            output_dir: resolve(&self.output_dir),
            archive_path: self.root_dir.join(format!("{}.zip", self.archive_name)),
            compression_level: self.level,
            create_archive: !self.no_archive,
            debug: self.debug,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting export for args: {:?}", args);
    let config = args.into_config()?;

    // 3. Read and extract the document; nothing can be produced without it
    let document = document::load_document(&config.source_pdf).await?;

    // 4. Export the tables and build the archive
    let report = ExportPipeline::new(config, document).run().await?;
    report.log_summary();

    if report.succeeded_tables() == 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any of the {} tables",
            report.tables.len()
        )));
    }

    Ok(())
}
