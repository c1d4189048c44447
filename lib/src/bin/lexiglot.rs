//! Command-line entry point.
//!
//! Subcommands:
//!   train     -- Train, evaluate and persist the model variants, updating the report
//!   classify  -- Classify words with a persisted variant

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexiglot::persistence::FileModelStore;
use lexiglot::{train_all, ClassifyService, ModelVariant, TrainConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexiglot", about = "English vs Croatian word classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train every selected variant, update the report and save the models.
    Train {
        /// Labeled CSV dataset (header, then word,label rows).
        #[arg(long, default_value = "data/data.csv")]
        data: PathBuf,

        /// Directory for trained models.
        #[arg(long, default_value = "models")]
        models: PathBuf,

        /// Markdown file holding the "## Model performance" table.
        #[arg(long, default_value = "README.md")]
        report: PathBuf,

        /// Fraction of the dataset held out for evaluation.
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Seed for the split and the stochastic solvers.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Variant to train; repeat for several. Defaults to all.
        #[arg(long = "variant")]
        variants: Vec<String>,
    },

    /// Classify space- or newline-separated words.
    Classify {
        /// Variant name, e.g. NGRAM_SVC.
        variant: String,

        /// Words to classify.
        words: String,

        /// Directory holding trained models.
        #[arg(long, default_value = "models")]
        models: PathBuf,
    },
}

fn split_words(input: &str) -> Vec<&str> {
    input
        .split([' ', '\n'])
        .map(|w| w.trim_end_matches('\r'))
        .filter(|w| !w.is_empty())
        .collect()
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Train {
            data,
            models,
            report,
            test_size,
            seed,
            variants,
        } => {
            let mut config = TrainConfig::default()
                .with_data_path(data)
                .with_model_dir(models)
                .with_report_path(report)
                .with_test_size(test_size)
                .with_seed(seed);
            if !variants.is_empty() {
                let parsed = variants
                    .iter()
                    .map(|v| v.parse::<ModelVariant>())
                    .collect::<Result<Vec<_>, _>>()?;
                config = config.with_variants(parsed);
            }

            let outcomes = train_all(&config).context("training failed")?;
            for o in outcomes {
                println!(
                    "{:<36} f1={:.3} accuracy={:.3} ({:.1}s)",
                    o.variant.name(),
                    o.metrics.f1,
                    o.metrics.accuracy,
                    o.elapsed.as_secs_f64()
                );
            }
        }

        Command::Classify {
            variant,
            words,
            models,
        } => {
            let variant: ModelVariant = variant.parse()?;
            let words = split_words(&words);
            let mut service = ClassifyService::new(FileModelStore::new(&models));
            let labels = service
                .classify(&words, variant)
                .with_context(|| format!("classifying with {variant}"))?;

            println!("word,is_eng");
            for (word, label) in words.iter().zip(labels) {
                println!("{word},{label}");
            }
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("house kuća\ntree"), vec!["house", "kuća", "tree"]);
        assert_eq!(split_words("  a  b \r\n"), vec!["a", "b"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_parse_train_flags() {
        let cli = Cli::parse_from([
            "lexiglot",
            "train",
            "--variant",
            "NGRAM_SVC",
            "--variant",
            "ngram_knn",
            "--seed",
            "7",
        ]);
        match cli.command {
            Command::Train { variants, seed, .. } => {
                assert_eq!(variants, vec!["NGRAM_SVC", "ngram_knn"]);
                assert_eq!(seed, 7);
            }
            Command::Classify { .. } => panic!("expected train"),
        }
    }
}
