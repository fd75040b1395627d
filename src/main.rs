use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::warn;

use candle_sentiment::sentiment::{ModernBertSize, SentimentPipelineBuilder};

/// Classify the sentiment of text with a pretrained ModernBERT model.
#[derive(Parser)]
#[command(name = "candle-sentiment", version, about)]
struct Args {
    /// Text to analyze. Omit when using --input.
    text: Option<String>,

    /// Read inputs from a file, one text per line.
    #[arg(long, conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Write batch results as CSV to this file instead of stdout.
    #[arg(long, requires = "input")]
    output: Option<PathBuf>,

    /// Model size to load.
    #[arg(long, value_enum, default_value = "base")]
    size: SizeArg,

    /// Run on the given CUDA device instead of CPU.
    #[arg(long)]
    cuda: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Base,
    Large,
}

impl From<SizeArg> for ModernBertSize {
    fn from(value: SizeArg) -> Self {
        match value {
            SizeArg::Base => ModernBertSize::Base,
            SizeArg::Large => ModernBertSize::Large,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut builder = SentimentPipelineBuilder::modernbert(args.size.into());
    if let Some(index) = args.cuda {
        builder = builder.cuda(index);
    }
    let pipeline = builder.build()?;

    match (args.text, args.input) {
        (Some(text), None) => {
            let output = pipeline.analyze(&text)?;
            println!(
                "Sentiment: {} (Confidence: {:.2})",
                output.prediction.label, output.prediction.score
            );
        }
        (None, Some(path)) => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let texts: Vec<&str> = contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .collect();
            if texts.is_empty() {
                bail!("{} contains no non-empty lines", path.display());
            }

            let output = pipeline.analyze_batch(&texts)?;

            let mut csv = String::from("label,score,text\n");
            for result in &output.results {
                match &result.prediction {
                    Ok(p) => {
                        csv.push_str(&format!("{},{:.4},{:?}\n", p.label, p.score, result.text));
                    }
                    Err(e) => warn!("skipping {:?}: {e}", result.text),
                }
            }

            match args.output {
                Some(out_path) => {
                    fs::write(&out_path, csv)
                        .with_context(|| format!("failed to write {}", out_path.display()))?;
                    println!(
                        "Results for {} texts saved to {} ({:.2}s)",
                        output.stats.items_processed,
                        out_path.display(),
                        output.stats.total_time.as_secs_f64()
                    );
                }
                None => print!("{csv}"),
            }
        }
        _ => bail!("provide a text argument or --input FILE (see --help)"),
    }

    Ok(())
}
