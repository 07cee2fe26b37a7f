use clap::Parser;
use maxbf::commands::run::{self, RunArgs};
use std::env;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "maxbf", version, disable_help_flag = true)]
struct Cli {
    #[command(flatten)]
    args: RunArgs,
}

fn main() {
    // Program name for diagnostics, without the directory it was run from
    let program = env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("maxbf"));

    let cli = Cli::parse();

    std::process::exit(run::run(&program, cli.args));
}
