//! Extratos CLI - write one commission statement per seller
//!
//! ```bash
//! extratos                              # uses ./data
//! EXTRATOS_DATA_DIR=/srv/extratos extratos
//! EXTRATOS_CONFIG=extratos.json extratos
//! RUST_LOG=debug extratos
//! ```
//!
//! Expected layout under the data directory:
//!
//! ```text
//! data/
//! ├── input/*.xls        receivables export (first match)
//! ├── comissoes.xlsx     RESSELLERS / SELLERS / COMISSÃO
//! ├── temp_files/        stage snapshots
//! └── output/            <seller>.xlsx
//! ```

use clap::Parser;
use extratos::{run, Config, PipelineError};
use std::io::Write;

#[derive(Parser)]
#[command(name = "extratos", version)]
#[command(
    about = "Write one commission statement spreadsheet per seller",
    long_about = "Reads the receivables export and the commission table from the data \
                  directory, computes the payout of every received installment and writes \
                  one statement per seller. Configure with EXTRATOS_DATA_DIR and \
                  EXTRATOS_CONFIG."
)]
struct Cli {}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let _cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .target(env_logger::Target::Stdout)
        .init();

    if let Err(e) = Config::from_env()
        .map_err(PipelineError::from)
        .and_then(|config| run(&config))
    {
        println!("{}", e.user_message());
        std::process::exit(1);
    }
}
