//! Convos server binary.
//! Run with: cargo run --bin convos-server

use std::process::ExitCode;

use convos::start_convos;

fn main() -> ExitCode {
    start_convos::run()
}
