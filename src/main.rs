use colored::Colorize;
use wrapgen::cli;

fn main() {
    if let Err(e) = cli::run() {
        // Script diagnostics were already rendered; this is the summary line.
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;
    use wrapgen::cli::{Command, WrapgenCli};

    #[test]
    fn generate_takes_three_paths() {
        let cli = WrapgenCli::parse_from(["wrapgen", "generate", "cache", "tpl", "out"]);
        match cli.command() {
            Command::Generate {
                cache_dir,
                templates,
                output,
                format,
            } => {
                assert_eq!(cache_dir, &PathBuf::from("cache"));
                assert_eq!(templates, &PathBuf::from("tpl"));
                assert_eq!(output, &PathBuf::from("out"));
                assert!(format.is_none());
            }
            other => panic!("expected generate command, got {other:?}"),
        }
    }
}
