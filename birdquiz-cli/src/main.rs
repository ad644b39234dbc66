//! # Bird Quiz
//!
//! A terminal quiz: listen to a bird recording and name the species.

use log::error;

mod cli;
mod controls;
mod logging;
mod plain;
mod runner;
mod ui;

fn main() {
    dotenv::dotenv().ok();
    let log_buffer = logging::init();
    let args = cli::args::build_cli().get_matches();

    let code = match runner::run(&args, log_buffer) {
        Ok(code) => code,
        Err(err) => {
            let message = err.to_string().to_lowercase();
            error!("{}", message);
            eprintln!("error: {}", message);
            -1
        }
    };

    std::process::exit(code)
}
