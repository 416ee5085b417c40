use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::Parser;
use exam_drill::{load_cached, Quiz, QuizError};
use tracing_subscriber::EnvFilter;

const DEFAULT_QUESTIONS_PATH: &str = "questions.csv";
const DEFAULT_LOG_FILTER: &str = "exam_drill=info";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Question file (.xlsx, .xls, .ods, .csv, .tsv or .json)
    #[arg(short, long, default_value = DEFAULT_QUESTIONS_PATH)]
    questions: PathBuf,

    /// Write logs to this file (the terminal is taken by the quiz)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Load and validate the question file, then exit
    #[arg(long)]
    check: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_file.as_deref(), args.check) {
        eprintln!("Error opening log file: {}", e);
        process::exit(1);
    }

    let result = if args.check {
        check(&args.questions)
    } else {
        Quiz::from_path(&args.questions).and_then(Quiz::run)
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn check(path: &Path) -> Result<(), QuizError> {
    let bank = load_cached(path)?;
    let with_reference = bank
        .questions()
        .iter()
        .filter(|question| question.reference.is_some())
        .count();
    let unanswerable = bank
        .questions()
        .iter()
        .filter(|question| question.correct_label().is_none())
        .count();

    println!("{}: {} questions", path.display(), bank.len());
    println!("  with reference: {}", with_reference);
    println!("  without a valid answer key: {}", unanswerable);
    Ok(())
}

/// Logs go to `log_file` when given, to stderr in `--check` mode, and
/// nowhere otherwise.
fn init_logging(log_file: Option<&Path>, check: bool) -> io::Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None if check => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}
