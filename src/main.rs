// Main entry point - all the logic is in lib.rs and the modules it declares

use std::process::ExitCode;

use wgpu_cells::run;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("wgpu_cells failed: {err}");
            ExitCode::FAILURE
        }
    }
}
