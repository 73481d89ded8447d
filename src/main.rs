mod backend;
mod board;
mod config;
mod display;
mod error;
mod session;
mod snapshot;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use log::info;

use backend::HttpBackend;
use board::compile_assignments;
use config::Config;
use display::{print_assignment_plan, write_plan_to_file};
use snapshot::load_board_snapshot;

const USAGE: &str = "usage: gbs-board web [port] | gbs-board preview <snapshot.json> [out.csv]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("web") => {
            let mut config = Config::from_env()?;
            if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
                config.port = port;
            }

            info!("Starting web server on port {}...", config.port);
            info!("Attendance API at {}", config.api_base_url);

            let backend = Arc::new(HttpBackend::new(&config.api_base_url, config.api_token.clone()));
            web::start_server(&config, backend)
                .await
                .context("Web server stopped with an error")?;
            Ok(())
        }
        Some("preview") => {
            let snapshot_path = args.get(2).context(USAGE)?;
            let board = load_board_snapshot(snapshot_path)?;

            let compiled = compile_assignments(&board);
            print_assignment_plan(&board, &compiled);

            if let board::Compiled::Batch(batch) = &compiled {
                let out = args
                    .get(3)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(format!("gbs_village_{}.csv", board.village_id)));
                write_plan_to_file(batch, &board, &out)
                    .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", out.display(), e))?;
                println!("\nPlan saved to {}", out.display());
            }
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}
