use std::process::ExitCode;

use finance_core::cli::{self, output};
use finance_core::config::ConfigManager;

fn main() -> ExitCode {
    let filter = ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.log_filter)
        .ok();
    finance_core::init_with_filter(filter.as_deref());

    match cli::run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(err);
            ExitCode::FAILURE
        }
    }
}
