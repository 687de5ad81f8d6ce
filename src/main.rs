use kaiven::signal::InterruptFlag;
use kaiven::{Interpreter, SHELL_NAME};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let interrupts = match InterruptFlag::install() {
        Ok(flag) => flag,
        Err(e) => {
            log::warn!("could not install SIGINT handler: {e}");
            InterruptFlag::default()
        }
    };

    match Interpreter::default().repl(&interrupts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{SHELL_NAME}: {e}");
            ExitCode::FAILURE
        }
    }
}
