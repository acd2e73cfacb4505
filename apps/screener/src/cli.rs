use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "screener", version)]
#[command(about = "Resume screening and ATS optimization", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// A job description given inline or as a file.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct JobInput {
    #[arg(long, help = "File containing the job description")]
    pub job: Option<PathBuf>,

    #[arg(long, help = "Job description text")]
    pub job_text: Option<String>,
}

/// A past job, by its description or by the fingerprint stored with each session.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct JobLookup {
    #[arg(long, help = "File containing the job description")]
    pub job: Option<PathBuf>,

    #[arg(long, help = "Job description text")]
    pub job_text: Option<String>,

    #[arg(long, help = "Job fingerprint as shown in stored sessions")]
    pub fingerprint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Parse resumes (.pdf, .txt, .md) and add them to the batch")]
    Upload {
        #[arg(required = true, help = "Resume files, at most 20 per upload")]
        files: Vec<PathBuf>,

        #[arg(long, help = "Replace the current batch instead of adding to it")]
        replace: bool,
    },

    #[command(about = "List the candidates in the current batch")]
    List,

    #[command(about = "Remove every candidate from the batch")]
    Clear {
        #[arg(long, help = "Also clear screening and optimization history")]
        history: bool,
    },

    #[command(about = "Rank the batch against a job description")]
    Match {
        #[command(flatten)]
        job: JobInput,

        #[arg(short = 'k', long, default_value_t = 3, help = "Number of candidates to return")]
        top_k: usize,
    },

    #[command(about = "Score one resume against a job and suggest ATS improvements")]
    Optimize {
        #[command(flatten)]
        job: JobInput,

        #[arg(help = "Resume file, or the file name of an uploaded candidate")]
        resume: PathBuf,
    },

    #[command(about = "Extract keywords and requirements from a job description")]
    AnalyzeJob {
        #[command(flatten)]
        job: JobInput,
    },

    #[command(about = "Query past screenings and optimizations")]
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    #[command(about = "Batch, screening and optimization statistics")]
    Stats,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    #[command(about = "Most recent sessions first")]
    Recent {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(long, help = "Show optimizations instead of screenings")]
        optimizations: bool,
    },

    #[command(about = "Show one stored session")]
    Show {
        id: Uuid,
    },

    #[command(about = "Screenings and optimizations involving one candidate")]
    Candidate {
        email: String,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    #[command(about = "Screenings and optimizations run against one job description")]
    Job {
        #[command(flatten)]
        job: JobLookup,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_match_parses_job_file_and_top_k() {
        let cli = Cli::try_parse_from(["screener", "match", "--job", "jd.txt", "-k", "5"]).unwrap();
        match cli.command {
            Commands::Match { job, top_k } => {
                assert_eq!(job.job, Some(PathBuf::from("jd.txt")));
                assert_eq!(top_k, 5);
            }
            _ => panic!("expected match"),
        }
    }

    #[test]
    fn test_job_input_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["screener", "match"]).is_err());
        assert!(Cli::try_parse_from([
            "screener", "match", "--job", "a.txt", "--job-text", "Rust"
        ])
        .is_err());
    }

    #[test]
    fn test_history_job_accepts_fingerprint() {
        let cli = Cli::try_parse_from([
            "screener", "history", "job", "--fingerprint", "00ff00ff00ff00ff",
        ])
        .unwrap();
        match cli.command {
            Commands::History {
                command: HistoryCommand::Job { job, limit },
            } => {
                assert_eq!(job.fingerprint.as_deref(), Some("00ff00ff00ff00ff"));
                assert_eq!(limit, 20);
            }
            _ => panic!("expected history job"),
        }
        assert!(Cli::try_parse_from(["screener", "history", "job"]).is_err());
    }

    #[test]
    fn test_history_show_requires_uuid() {
        assert!(Cli::try_parse_from(["screener", "history", "show", "not-a-uuid"]).is_err());
    }
}
