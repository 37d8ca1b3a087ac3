use clap::Parser;

mod api;
mod cli;
mod config;
mod controller;
mod error;
mod logging;
mod runtime;
mod session;
mod ui;
mod upload;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();
    runtime::run(cli)
}
