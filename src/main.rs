use std::process::ExitCode;

fn main() -> ExitCode {
    peakrdl::app::run()
}
