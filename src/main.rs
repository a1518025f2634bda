use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod mining;
pub mod session;
pub mod storage;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
