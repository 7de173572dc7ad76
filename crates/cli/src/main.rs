use anyhow::Result;
use clap::{Parser, Subcommand};
use randfeat::DEFAULT_PAIR_AXIS;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod run;

use run::{EmbedArgs, Mode};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Random feature embedding runner")]
struct Cmd {
    /// Log library debug events (construction, graph gathers)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Embed random rigid transforms and write the tensor as JSON
    Embed {
        #[arg(long, value_enum, default_value_t = Mode::Aligned)]
        mode: Mode,
        #[arg(long, default_value_t = 16)]
        dim: usize,
        #[arg(long, default_value_t = 1.0)]
        sigma: f64,
        /// Batch shape of the first transform set, comma separated
        #[arg(long, value_delimiter = ',', default_value = "4")]
        batch: Vec<usize>,
        /// Batch shape of the second set (aligned/pairwise); defaults to reusing the first set
        #[arg(long, value_delimiter = ',')]
        batch2: Option<Vec<usize>>,
        #[arg(long, default_value_t = DEFAULT_PAIR_AXIS)]
        axis: usize,
        /// Edge probability for the random graph in graph mode
        #[arg(long, default_value_t = 1.0)]
        edge_prob: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: String,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    match cmd.action {
        Action::Embed {
            mode,
            dim,
            sigma,
            batch,
            batch2,
            axis,
            edge_prob,
            seed,
            out,
        } => {
            let args = EmbedArgs {
                mode,
                dim,
                sigma,
                batch,
                batch2,
                axis,
                edge_prob,
                seed,
            };
            run::embed_to_file(&args, &out).map(|_| ())
        }
        Action::Report => report(),
    }
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "randfeat_version": randfeat::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
