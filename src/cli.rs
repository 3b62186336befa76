use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use slidecarve::ImageFormat;
use slidecarve::options::{DEFAULT_MIN_FILE_BYTES, DEFAULT_OUTPUT_DIR, ExtractOptions, ScanOptions};

#[derive(Parser, Debug)]
#[command(name = "slidecarve")]
#[command(version, about = "Carve embedded images out of legacy presentation files", long_about = None)]
pub struct Cli {
    /// Source document to scan
    pub input: PathBuf,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Formats to carve, comma separated (jpeg,png,gif,bmp,tiff)
    #[arg(short = 't', long, value_delimiter = ',', value_parser = ImageFormat::from_str)]
    pub types: Option<Vec<ImageFormat>>,

    /// Written files must be larger than this to be kept
    #[arg(long, default_value_t = DEFAULT_MIN_FILE_BYTES)]
    pub min_file_bytes: u64,

    #[arg(long)]
    pub no_overwrite: bool,

    /// Write a JSON manifest of the saved images
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Scan and report without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new().with_formats(self.types.clone().unwrap_or_default())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        let options =
            ExtractOptions::new(&self.output).with_min_file_bytes(self.min_file_bytes);
        if self.no_overwrite {
            options.no_overwrite()
        } else {
            options
        }
    }
}
