mod command;

use std::process::ExitCode;

use clap::Parser;
use log::error;
use mimalloc::MiMalloc;

use crate::command::*;

#[global_allocator]
static ALLOC: MiMalloc = MiMalloc;

/// HTTP gateway that relabels string-labeled graphs for an integer-id coloring solver.
#[derive(Parser)]
#[command(version, about)]
#[command(propagate_version = true)]
enum Command {
    /// Serve the coloring API.
    Serve(ServeArgs),
    /// Print the id graph and label table the solver would see for a graph file.
    Relabel(RelabelArgs),
    /// Color the graph of a request file once through the solver.
    Color(ColorArgs),
}

fn main() -> ExitCode {
    env_logger::init();
    let command = Command::parse();
    let result = match command {
        Command::Serve(args) => serve(args),
        Command::Relabel(args) => relabel(args),
        Command::Color(args) => color(args),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
