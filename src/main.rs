use std::process::ExitCode;

fn main() -> ExitCode {
    debt_ledger::telemetry::init();

    match debt_ledger::app::run(std::env::args()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
