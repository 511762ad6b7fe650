//! AngleNet - text line orientation from the command line
//!
//! ```bash
//! anglenet --model-dir models --most-angle line_0.png line_1.png
//! anglenet --model-dir models --config anglenet.toml --format pretty crops/*.png
//! ```

use angle_cli::{init_logging, run, Cli};
use clap::Parser;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    info!("=== AngleNet v{} ===", env!("CARGO_PKG_VERSION"));
    run(&cli)?;

    Ok(())
}
