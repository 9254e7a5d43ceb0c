use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;

use impsort::config::SortConfig;
use impsort::file_handler::FileHandler;
use impsort::sort_typescript;

#[derive(Parser)]
#[command(name = "impsort")]
#[command(version)]
#[command(about = "Sorts import and export statements in TypeScript files", long_about = None)]
struct Cli {
    #[arg(help = "Files or directories to sort")]
    paths: Vec<PathBuf>,

    #[arg(short, long, help = "Check if files are sorted without modifying them")]
    check: bool,

    #[arg(long, help = "Print sorted output to stdout instead of writing to file")]
    stdout: bool,

    #[arg(long, help = "Skip creating backups of original files")]
    no_backup: bool,

    #[arg(long, help = "Path to a JSON file with custom group patterns")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.paths.is_empty() {
        eprintln!("{}", "Error: No files or directories specified".red());
        std::process::exit(1);
    }

    let config = match &cli.config {
        Some(path) => SortConfig::from_file(path)?,
        None => SortConfig::default(),
    };
    // Fail on a bad pattern before touching any file.
    config.compile()?;

    let file_handler = FileHandler::new(!cli.no_backup);
    let files = file_handler.find_typescript_files(&cli.paths)?;

    if files.is_empty() {
        println!("{}", "No TypeScript files found".yellow());
        return Ok(());
    }

    println!("{} {} files", "Sorting".green(), files.len());

    let results: Vec<_> = files
        .par_iter()
        .map(|file| process_file(&file_handler, file, &config, &cli))
        .collect();

    let mut had_changes = false;
    let mut had_errors = false;
    for (file, result) in files.iter().zip(results.iter()) {
        match result {
            Ok(changed) => {
                if *changed {
                    had_changes = true;
                    if cli.check {
                        println!("{} {}", "✗".red(), file.display());
                    } else {
                        println!("{} {}", "✓".green(), file.display());
                    }
                } else {
                    println!("{} {} (no changes)", "✓".green(), file.display());
                }
            }
            Err(e) => {
                had_errors = true;
                eprintln!("{} {}: {:#}", "✗".red(), file.display(), e);
            }
        }
    }

    if cli.check && had_changes {
        eprintln!("\n{}", "Some files are not sorted".red());
        std::process::exit(1);
    }

    if had_errors {
        eprintln!("\n{}", "Some files had errors".red());
        std::process::exit(1);
    }

    println!("\n{}", "All files sorted successfully".green());
    Ok(())
}

fn process_file(
    file_handler: &FileHandler,
    path: &Path,
    config: &SortConfig,
    cli: &Cli,
) -> Result<bool> {
    let content = file_handler.read_file(path)?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown.ts");
    let sorted = sort_typescript(&content, filename, config)?;

    if content == sorted {
        return Ok(false);
    }

    if cli.stdout {
        println!("{sorted}");
    } else if !cli.check {
        file_handler.write_file(path, &sorted)?;
    }

    Ok(true)
}
