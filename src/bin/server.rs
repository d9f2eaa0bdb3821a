//! Summary relay server binary.
//! Run with: cargo run --bin summary-relay

use std::process::ExitCode;

use summary_relay::start_summary_relay;

fn main() -> ExitCode {
    start_summary_relay::run()
}
