//! Console output of the verbose mode.
use colored::Colorize;

use std::fmt::Display;

const WIDTH: usize = 12;
const PREC_WIDTH: usize = 5;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;


/// Prints the settings of a run.
pub(crate) fn print_stats<T: Display>(title: &str, stats: &[(&str, T)]) {
    let header = format!(
        "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
        "", title.bold(), "",
    );
    println!("\n{header}");
    for (key, val) in stats {
        println!(
            "+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            key.bold(),
            val.to_string().bold().green(),
        );
    }
    println!("{:=^FULL_WIDTH$}\n", "");
}


/// Prints the header of the per-candidate table.
pub(crate) fn print_table_header() {
    println!(
        "      {:<28}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
        "CANDIDATE".bold().red(),
        "CV RISK".bold().blue(),
        "WEIGHT".bold().green(),
        "FAILED".bold().yellow(),
    );
}


/// Prints one row of the per-candidate table.
pub(crate) fn print_candidate(
    name: &str,
    risk: f64,
    weight: f64,
    failures: usize,
    excluded: bool,
)
{
    let tag = if excluded {
        "[EXC]".bold().bright_red()
    } else {
        "[LOG]".bold().magenta()
    };
    println!(
        "{} {:<28}\t{}\t{}\t{}",
        tag,
        name.red(),
        format!("{:>WIDTH$.PREC_WIDTH$}", risk).blue(),
        format!("{:>WIDTH$.PREC_WIDTH$}", weight).green(),
        format!("{:>WIDTH$}", failures).yellow(),
    );
}


/// Prints a per-fold line.
pub(crate) fn print_fold(fold: usize, n_train: usize, n_test: usize) {
    println!(
        "{}    {}    {}",
        format!("  [{: >3}'th fold]", fold).bold().red(),
        format!("[TRAIN {:>WIDTH$}]", n_train).bold().green(),
        format!("[TEST {:>WIDTH$}]", n_test).bold().yellow(),
    );
}


/// Prints a warning.
pub(crate) fn warn<T: Display>(message: T) {
    println!("{} {}", "[WARN]".bold().bright_yellow(), message);
}


/// Prints the closing line of a run.
pub(crate) fn finish<T: Display>(message: T) {
    println!("{} {}\n", "[FIN]".bold().bright_green(), message);
}
