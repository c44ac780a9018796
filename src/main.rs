//! Ordergrid - order accounting spreadsheet driven by line commands

mod command;
mod config;
mod logging;

use ordergrid_core::Workbook;
use ordergrid_core::storage::export_html;
use std::env;
use std::io::BufRead;
use std::path::PathBuf;

use command::Session;

fn print_usage() {
    eprintln!("Usage: ordergrid [OPTIONS] [WORKBOOK]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [WORKBOOK]                Workbook file to open (.json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a command (can be repeated)");
    eprintln!("  -s, --script <FILE>       Run commands from a file, one per line");
    eprintln!("  -o, --output <FILE>       Export the active sheet as HTML when done");
    eprintln!("  --config <path>           Load configuration from TOML file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Without -c, -s or -o, commands are read from stdin and an error");
    eprintln!("does not stop the commands that follow.");
    eprintln!();
    eprintln!("{}", command::HELP);
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Run one line and print its output. Errors are returned for the caller to
/// report.
fn run_line(session: &mut Session, line: &str) -> Result<(), String> {
    match session.execute(line) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => return Err(format!("{}: {:#}", line.trim(), e)),
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut file_path: Option<PathBuf> = None;
    let mut commands: Vec<String> = Vec::new();
    let mut script: Option<PathBuf> = None;
    let mut output_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    fail("--command requires a command");
                }
                commands.push(args[i].to_string());
            }
            "-s" | "--script" => {
                i += 1;
                if i >= args.len() {
                    fail("--script requires a file path");
                }
                script = Some(PathBuf::from(&args[i]));
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    fail("--output requires a file path");
                }
                output_file = Some(PathBuf::from(&args[i]));
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    fail("--config requires a file path");
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if file_path.is_none() {
                    file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let (config, mut warnings) = config::load_config(config_file.as_ref());
    warnings.extend(logging::init(config.log_filter.as_deref()));
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut book = match Workbook::with_file(file_path) {
        Ok(book) => book,
        Err(e) => fail(e),
    };
    book.date_format = config.date_format.clone();
    let mut session = Session::new(book, config.rows_per_order);

    for cmd in &commands {
        if let Err(e) = run_line(&mut session, cmd) {
            fail(e);
        }
    }

    if let Some(path) = &script {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(format!("Failed to read {}: {}", path.display(), e)),
        };
        for line in content.lines() {
            if let Err(e) = run_line(&mut session, line) {
                fail(e);
            }
        }
    }

    // Interactive input keeps going after a failed command; the exit status
    // still reports that something failed.
    if commands.is_empty() && script.is_none() && output_file.is_none() {
        let mut failed = false;
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => fail(e),
            };
            if let Err(e) = run_line(&mut session, &line) {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
        if failed {
            std::process::exit(1);
        }
    }

    if let Some(output_path) = output_file {
        let book = &session.book;
        if let Err(e) = export_html(&output_path, book.active(), &book.engine) {
            fail(e);
        }
        println!("Exported to {}", output_path.display());
    }
}
