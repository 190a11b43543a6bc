// SPDX-License-Identifier: MPL-2.0
use chroma_lens::application::port::ChromaPredictor;
use chroma_lens::config::{self, Config};
use chroma_lens::error::{Error, Result};
use chroma_lens::evaluation::{evaluate_corpus, run_batch};
use chroma_lens::infrastructure::OnnxColorizer;
use chroma_lens::{diagram, summary, web};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

const HELP: &str = "\
chroma_lens: colorize grayscale photographs and score the results

USAGE:
  chroma_lens [OPTIONS] <COMMAND>

COMMANDS:
  serve      Run the HTTP upload server
  batch      Colorize a folder and score it against color references
  evaluate   Score an existing folder of results against references
  summary    Print the model's layer table
  diagram    Write the pipeline diagram as Graphviz DOT

OPTIONS:
  --config PATH    Settings file (default: <config dir>/ChromaLens/settings.toml)
  --verbose        Log per-image progress
  -h, --help       Print this help

serve:    --bind ADDR     Listen address (overrides server.bind)
diagram:  --output PATH   Destination (default: colorization_pipeline.dot)
";

#[derive(Debug)]
enum Command {
    Serve { bind: Option<String> },
    Batch,
    Evaluate,
    Summary,
    Diagram { output: PathBuf },
}

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    verbose: bool,
    command: Command,
}

fn parse_args(mut args: pico_args::Arguments) -> std::result::Result<Args, pico_args::Error> {
    let config = args.opt_value_from_str("--config")?;
    let verbose = args.contains("--verbose");
    let name: String = args.free_from_str()?;

    let command = match name.as_str() {
        "serve" => Command::Serve {
            bind: args.opt_value_from_str("--bind")?,
        },
        "batch" => Command::Batch,
        "evaluate" => Command::Evaluate,
        "summary" => Command::Summary,
        "diagram" => Command::Diagram {
            output: args
                .opt_value_from_str("--output")?
                .unwrap_or_else(|| PathBuf::from(diagram::DEFAULT_OUTPUT)),
        },
        other => {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: format!("unknown command '{other}'"),
            })
        }
    };

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {rest:?}"),
        });
    }

    Ok(Args {
        config,
        verbose,
        command,
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let window = config.metrics.ssim_window;

    match args.command {
        Command::Serve { bind } => {
            let mut server = config.server.clone();
            if let Some(bind) = bind {
                server.bind = bind;
            }
            let predictor: Arc<dyn ChromaPredictor> =
                Arc::new(OnnxColorizer::load(&config.model.artifacts())?);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::serve(&server, predictor))
        }
        Command::Batch => {
            let model = OnnxColorizer::load(&config.model.artifacts())?;
            let report = run_batch(&model, &config.batch, window)?;
            println!("{report}");
            Ok(())
        }
        Command::Evaluate => {
            let report = evaluate_corpus(&config.evaluate, window)?;
            println!("{report}");
            Ok(())
        }
        Command::Summary => {
            let model = OnnxColorizer::load(&config.model.artifacts())?;
            println!("{}", summary::render_table(&model.model().layers()));
            Ok(())
        }
        Command::Diagram { output } => {
            diagram::write_pipeline_dot(&output)?;
            info!(path = %output.display(), "wrote pipeline diagram");
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return ExitCode::SUCCESS;
    }

    let args = match parse_args(args) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}\n\n{HELP}");
            return ExitCode::FAILURE;
        }
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ Error::Load(_)) => {
            eprintln!("Error: {err}");
            eprintln!("Check the [model] paths in the settings file.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
