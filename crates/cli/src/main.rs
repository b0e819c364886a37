use clap::Parser as ClapParser;
use colored::*;
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fs,
    io::{self, Write},
    process,
};

extern crate frontend;
extern crate runtime;

use frontend::{ast::ASTNode, diagnostic::Diagnostic, parse_source};
use runtime::{backend::LocalBackend, ExecutionState, Flow, Interpreter};

// --------
//   CLI
// --------

#[derive(ClapParser)]
#[command(version)]
#[command(about = "Interpreter for VisualScript, a line based language for computer vision")]
struct CLI {
    /// Path to the script. Without it a small demo program runs
    #[arg(short, long)]
    file: Option<String>,

    /// Only parse the script and report whether it is valid
    #[arg(long)]
    validate: bool,

    /// Prints the language reference
    #[arg(long = "ref")]
    reference: bool,

    /// Prints the AST before running it
    #[arg(long)]
    debug: bool,

    /// Interactive mode after running the script
    #[arg(long)]
    repl: bool,

    /// More logs, repeat for more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const USAGE: &str = r#"VisualScript (VIC) is a visual programming language for computer vision.

VisualScript is a line-based language. Each line is a function call.

Language Reference
------------------
Load["./abbey.jpg"] -> Load the image
Size[] -> Get the size of the image
Say[] -> Say the result of the last function
Detect["person"] -> Detect the person
Segment["a red car"] -> Segment the objects matching the prompt
Replace["emoji.png"] -> Replace the person with the image, or a black box
Cutout[] -> Cutout the last detections
Count[] -> Count the last detections
CountInRegion[0, 0, 500, 500] -> Count the last detections in the region (x1, y1, x2, y2)
Classify["cat", "dog"] -> Classify the image in the provided categories
Show[] -> Show the image
Save["./abbey2.jpg"] -> Save the last image
IN["./photos"] -> Run the indented lines for each file of the directory
IF[Count[] == 1] -> Run the indented lines unless the condition is False
Help["Load"] -> Print the description of a function
Exit[] -> Exit the program

Example Program
---------------

Find a church in the image and cut it out.

Load["./abbey.jpg"]
Detect["church"]
Cutout[]
Save["./abbey2.jpg"]"#;

const DEFAULT_PROGRAM: &str = "Load[\"./abbey.jpg\"]\nDetect[\"person\"]\nShow[]\n";

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn open_file(file_path: &str) -> Result<String, String> {
    fs::read_to_string(file_path)
        .map_err(|e| format!("{} opening script file {}: {}", "Error".red().bold(), file_path, e))
}

fn parse_or_diagnose(code: &str) -> Result<Vec<ASTNode>, Diagnostic> {
    parse_source(code).map_err(|e| Diagnostic::from_error(code, &e))
}

// Runs a whole program. Ok(true) means Exit[] was reached.
fn interpretation_sequence(
    nodes: &[ASTNode],
    interp: &mut Interpreter,
    state: &mut ExecutionState,
) -> Result<bool, String> {
    match interp.execute_program(nodes, state) {
        Ok(flow) => Ok(flow == Flow::Exit),
        Err(e) => Err(e.to_string()),
    }
}

// REPL
fn repl(interp: &mut Interpreter, state: &mut ExecutionState, cli: &CLI) {
    println!("Welcome to {}!", "VisualScript".cyan().bold());
    println!("Type 'Exit[]' to exit.");
    println!("Read the docs at https://visualscript.org/docs");
    println!("For help, type 'Help[FunctionName]'.");
    println!("{}", "-".repeat(20));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();

    loop {
        input.clear();
        print!(">>> ");
        let _ = stdout.flush();

        match stdin.read_line(&mut input) {
            // End of input
            Ok(0) => process::exit(0),
            Ok(_) => {
                let nodes = match parse_or_diagnose(input.trim()) {
                    Ok(nodes) => nodes,
                    Err(diagnostic) => {
                        println!("{diagnostic}");
                        continue;
                    }
                };

                if cli.debug {
                    println!("{:#?}", nodes);
                }

                // The same state lives for the whole session, errors don't end it
                match interpretation_sequence(&nodes, interp, state) {
                    Ok(true) => process::exit(0),
                    Ok(false) => {}
                    Err(e) => println!("{e}"),
                }
            }
            Err(e) => {
                eprintln!("{} reading from terminal: {e}", "Error".red().bold());
                process::exit(1);
            }
        }
    }
}

fn main() {
    // Manage command line args
    let cli = CLI::parse();

    if let Err(e) = SimpleLogger::new().with_level(log_level(cli.verbose)).init() {
        eprintln!("{} setting up logger: {e}", "Error".red().bold());
    }

    if cli.reference {
        println!("{USAGE}");
        process::exit(0);
    }

    let code = match &cli.file {
        Some(path) => open_file(path).unwrap_or_else(|e| {
            println!("{e}");
            process::exit(1);
        }),
        None => DEFAULT_PROGRAM.to_string(),
    };

    let nodes = parse_or_diagnose(&code).unwrap_or_else(|diagnostic| {
        println!("{diagnostic}");
        process::exit(diagnostic.exit_code());
    });
    debug!("Parsed {} statements", nodes.len());

    if cli.validate {
        println!("Script is a valid VisualScript program.");
        process::exit(0);
    }

    if cli.debug {
        println!("{:#?}", nodes);
    }

    let mut interp = Interpreter::new(Box::new(LocalBackend::new()));
    let mut state = ExecutionState::new();

    match interpretation_sequence(&nodes, &mut interp, &mut state) {
        Ok(true) => process::exit(0),
        Ok(false) => {}
        Err(e) => {
            println!("{e}");
            process::exit(1);
        }
    }

    if cli.repl {
        repl(&mut interp, &mut state, &cli);
    }
}
