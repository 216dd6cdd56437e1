//! cultivar - crop recommendation web service
//!
//! Usage:
//!   cultivar                          # serve on 127.0.0.1:5000 with ./model
//!   cultivar --port 8080              # custom port
//!   cultivar --model-dir /srv/models  # custom artifact directory

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cultivar::server::{self, ServerConfig};

/// cultivar - Crop Recommendation Service
///
/// Serves a pre-trained crop classifier over HTTP: an input form,
/// a prediction endpoint, a PDF report download, and a health check.
#[derive(Parser, Debug)]
#[command(name = "cultivar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Directory holding crop_forest.bin and label_decoder.bin
    #[arg(long, value_name = "DIR", default_value = "model")]
    model_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        model_dir: cli.model_dir,
    };

    match server::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            e.exit_code()
        }
    }
}
