use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use protocodec_rs::codec::{Chain, Codec};
use protocodec_rs::phy::bits::parse_bits;
use protocodec_rs::ui::progress::{ProgressManager, templates};
use protocodec_rs::ui::{format_result, print_banner};
use protocodec_rs::utils::logging::init_logging;
use protocodec_rs::utils::profile::CodecProfile;
use protocodec_rs::{Error, Result};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ChainSource {
    /// Comma separated chain tokens, name first
    #[arg(short, long, conflicts_with = "profile")]
    chain: Option<String>,

    /// JSON codec profile
    #[arg(short, long)]
    profile: Option<PathBuf>,
}

#[derive(Args)]
struct BitSource {
    /// Bits as a 0/1 string
    #[arg(short, long, conflicts_with = "input")]
    bits: Option<String>,

    /// File with one 0/1 message per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Group output bits by 4
    #[arg(long)]
    points: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chain forward
    Decode {
        #[command(flatten)]
        chain: ChainSource,
        #[command(flatten)]
        bits: BitSource,
    },
    /// Run the chain backward
    Encode {
        #[command(flatten)]
        chain: ChainSource,
        #[command(flatten)]
        bits: BitSource,
    },
    /// Decode and print only the error counts
    Analyze {
        #[command(flatten)]
        chain: ChainSource,
        #[command(flatten)]
        bits: BitSource,
    },
    /// Print the normalized chain tokens as JSON
    Chain {
        #[command(flatten)]
        chain: ChainSource,
        /// Save the chain as a codec profile
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
}

fn load_chain(source: &ChainSource) -> Result<Chain> {
    match (&source.chain, &source.profile) {
        (Some(text), _) => {
            let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
            Ok(Chain::from_tokens(&tokens)?)
        }
        (None, Some(path)) => CodecProfile::load(path)?.to_chain(),
        (None, None) => Ok(Chain::default()),
    }
}

fn load_messages(source: &BitSource) -> Result<Vec<Vec<bool>>> {
    let text = match (&source.bits, &source.input) {
        (Some(bits), _) => bits.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => String::new(),
    };

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| parse_bits(line).ok_or_else(|| Error::InvalidBits(line.to_string())))
        .collect()
}

fn run_codec(chain: &ChainSource, bits: &BitSource, decoding: bool, errors_only: bool) -> Result<()> {
    let mut codec = Codec::new(load_chain(chain)?);
    let messages = load_messages(bits)?;
    info!("Chain {:?}: {} messages", codec.name(), messages.len());

    // Only worth a bar for batch input
    let progress = (messages.len() > 1).then(ProgressManager::new);
    let bar_id = if decoding { "decode" } else { "encode" };
    if let Some(progress) = &progress {
        let template = if decoding { templates::DECODE } else { templates::ENCODE };
        if let Err(e) = progress.create_bar(bar_id, messages.len() as u64, template, codec.name()) {
            error!("{}", e);
        }
    }

    let mut total_errors = 0;
    for message in &messages {
        let output = codec.process(decoding, message);
        total_errors += output.errors;
        if errors_only {
            println!("{}", output.errors);
        } else {
            println!("{}", format_result(&output, bits.points));
        }
        if let Some(progress) = &progress {
            let _ = progress.inc(bar_id, 1);
            let _ = progress.set_message(bar_id, &format!("{} errors", total_errors));
        }
    }

    if let Some(progress) = &progress {
        let _ = progress.finish(bar_id, &format!("{} errors", total_errors));
    }
    info!(
        "Done: {} errors in total, symbol length {}",
        total_errors,
        codec.symbol_len()
    );
    Ok(())
}

fn show_chain(chain: &ChainSource, save: Option<&PathBuf>) -> Result<()> {
    let chain = load_chain(chain)?;
    let profile = CodecProfile::from_chain(&chain);
    println!("{}", serde_json::to_string_pretty(&profile.tokens())?);
    if let Some(path) = save {
        profile.save(path)?;
    }
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    print_banner();

    let result = match &cli.command {
        Commands::Decode { chain, bits } => run_codec(chain, bits, true, false),
        Commands::Encode { chain, bits } => run_codec(chain, bits, false, false),
        Commands::Analyze { chain, bits } => run_codec(chain, bits, true, true),
        Commands::Chain { chain, save } => show_chain(chain, save.as_ref()),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
