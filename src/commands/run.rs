use clap::Args;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::PathBuf;

use crate::cli_util::print_execution_error;
use crate::config;
use crate::interpreter::{ExecutionError, Interpreter, RunSummary, Step};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Brainfuck program to run; `-` reads it from stdin
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Read bytes for ',' from PATH instead of stdin
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write bytes from '.' to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Treat '#' as a debug instruction that dumps the tape to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Cells shown per '#' dump (fallback MAXBF_DUMP_CELLS; default 32)
    #[arg(long = "dump-cells", value_name = "N")]
    pub dump_cells: Option<usize>,

    /// Print a step-by-step table of executed instructions to stderr
    #[arg(short = 't', long = "trace")]
    pub trace: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Flags resolved against the environment and config file.
struct Options {
    debug: bool,
    trace: bool,
    dump_cells: usize,
}

/// Where the program bytes come from. Stdin can't seek, so it is buffered.
enum ProgramText {
    File(File),
    Buffered(Vec<u8>),
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        files,
        input,
        output,
        debug,
        dump_cells,
        trace,
        ..
    } = args;

    let path = match files.as_slice() {
        [path] => path.clone(),
        [] => {
            eprintln!("{program}: please specify a program file");
            usage_and_exit(program, 2);
        }
        _ => {
            eprintln!("{program}: too many program files specified");
            usage_and_exit(program, 2);
        }
    };

    if dump_cells == Some(0) {
        eprintln!("{program}: --dump-cells must be at least 1");
        usage_and_exit(program, 2);
    }

    // Resolve: flags -> env -> config file -> defaults
    let settings = config::settings();
    let options = Options {
        debug: debug || settings.debug,
        trace: trace || settings.trace,
        dump_cells: dump_cells.unwrap_or(settings.dump_cells),
    };

    // The program has to be loaded before stdin is handed to ','.
    let text = if path == "-" {
        let mut buf = Vec::new();
        if let Err(e) = io::stdin().lock().read_to_end(&mut buf) {
            eprintln!("{program}: failed reading program from stdin: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
        ProgramText::Buffered(buf)
    } else {
        match File::open(&path) {
            Ok(f) => ProgramText::File(f),
            Err(e) => {
                eprintln!("{program}: could not open program file {path}: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    };

    let input: Box<dyn Read> = match &input {
        Some(p) => match File::open(p) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => {
                eprintln!("{program}: could not open input file {}: {e}", p.display());
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match &output {
        Some(p) => match File::create(p) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => {
                eprintln!("{program}: could not create output file {}: {e}", p.display());
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    let result = match &text {
        ProgramText::File(f) => execute(f, input, output, &options),
        ProgramText::Buffered(buf) => execute(Cursor::new(buf.as_slice()), input, output, &options),
    };

    match result {
        Ok(_) => 0,
        Err(err) => {
            // Only re-read the file for the error context.
            let code = match text {
                ProgramText::File(_) => fs::read(&path).ok(),
                ProgramText::Buffered(buf) => Some(buf),
            };
            print_execution_error(program, &path, code.as_deref(), &err);
            1
        }
    }
}

fn execute<R: Read + Seek>(
    program: R,
    input: Box<dyn Read>,
    output: Box<dyn Write>,
    options: &Options,
) -> Result<RunSummary, ExecutionError> {
    let mut bf = Interpreter::new(program, input, output);

    if options.debug {
        bf.set_tape_observer(options.dump_cells, |view| {
            // Keep dumps in order with program output on a shared terminal.
            let _ = io::stdout().flush();
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "{view}");
            let _ = stderr.flush();
        });
    }

    if options.trace {
        eprintln!("STEP   | OFFSET | PTR   | CELL | INSTR | ACTION");
        eprintln!("-------+--------+-------+------+-------+------------------------------------------------");
        bf.set_trace_observer(print_trace_row);
    }

    bf.run()
}

fn print_trace_row(step: &Step) {
    eprintln!(
        "{:<6} | {:<6} | {:<5} | {:<4} |   {}   | {}",
        step.index, step.offset, step.cursor, step.cell, step.instruction, step.action
    );
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [OPTIONS] <FILE>   # Run the Brainfuck program in FILE ('-' reads it from stdin)

Options:
  --input,  -i <PATH>  Read bytes for ',' from PATH instead of stdin
  --output, -o <PATH>  Write bytes from '.' to PATH instead of stdout
  --debug,  -d         Treat '#' as a debug instruction that dumps the tape to stderr
  --dump-cells <N>     Cells shown per '#' dump (fallback MAXBF_DUMP_CELLS; default 32)
  --trace,  -t         Print a step-by-step table of executed instructions to stderr
  --version, -V        Print version information
  --help,   -h         Show this help

Notes:
- Input (`,`) reads a single byte; on end of input the current cell is set to 0.
- Characters outside of Brainfuck's ><+-.,[] are comments and are ignored.
- The tape starts at 1000 cells and grows to the right; moving left of cell 0 is an error.

Examples:
- Run a program file:
    {0} ./hello.bf
- Feed a file to `,` and capture `.` in another:
    {0} --input data.txt --output result.bin ./filter.bf
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
