use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use cdm_classifier::{
    server, BinaryBert, ModelInfo, ModelManager, PredictionInput, PredictionPipeline,
    RuntimeConfig, ServiceConfig,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::Value;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve /process_text and /process_bulk over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "CDM_ADDR", default_value = "0.0.0.0:5000")]
        addr: String,
    },
    /// Classify a request body (`{"content": ...}`) read from a file or stdin
    Predict {
        /// Request file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// ONNX model file; used together with --tokenizer-path
    #[arg(long, env = "CDM_MODEL_PATH", requires = "tokenizer_path")]
    model_path: Option<String>,

    /// tokenizer.json matching the model
    #[arg(long, env = "CDM_TOKENIZER_PATH", requires = "model_path")]
    tokenizer_path: Option<String>,

    /// Name of the model directory inside the cache
    #[arg(long, env = "CDM_MODEL_NAME", default_value = "binary-bert")]
    model_name: String,

    /// URL to fetch model.onnx from when it is not cached
    #[arg(long, env = "CDM_MODEL_URL")]
    model_url: Option<String>,

    /// URL to fetch tokenizer.json from when it is not cached
    #[arg(long, env = "CDM_TOKENIZER_URL")]
    tokenizer_url: Option<String>,

    /// Expected SHA-256 of model.onnx
    #[arg(long, env = "CDM_MODEL_SHA256")]
    model_hash: Option<String>,

    /// Expected SHA-256 of tokenizer.json
    #[arg(long, env = "CDM_TOKENIZER_SHA256")]
    tokenizer_hash: Option<String>,

    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,

    /// Tokens fed to the model; longer notes are truncated
    #[arg(long, env = "CDM_MAX_SEQUENCE_LENGTH", default_value_t = 512)]
    max_sequence_length: usize,

    /// Name reported as processing pipeline and service model
    #[arg(long, env = "CDM_CLASSIFIER_NAME")]
    classifier_name: Option<String>,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    intra_threads: usize,

    /// ONNX Runtime graph optimization level, 0-3
    #[arg(long, default_value_t = 3)]
    optimization_level: u8,
}

impl ModelArgs {
    fn model_info(&self) -> ModelInfo {
        let info = match (&self.model_url, &self.tokenizer_url) {
            (Some(model_url), Some(tokenizer_url)) => {
                ModelInfo::remote(&self.model_name, model_url, tokenizer_url)
            }
            _ => ModelInfo::local(&self.model_name),
        };
        info.with_hashes(self.model_hash.clone(), self.tokenizer_hash.clone())
    }
}

async fn load_classifier(args: &ModelArgs) -> anyhow::Result<BinaryBert> {
    let runtime_config = RuntimeConfig {
        intra_threads: args.intra_threads,
        ..RuntimeConfig::default()
    }
    .with_optimization(args.optimization_level);

    let mut builder = BinaryBert::builder().with_runtime_config(runtime_config);
    if let Some(name) = &args.classifier_name {
        builder = builder.with_name(name);
    }

    let builder = match (&args.model_path, &args.tokenizer_path) {
        (Some(model_path), Some(tokenizer_path)) => {
            info!("Loading model from {}", model_path);
            builder.with_model_files(model_path, tokenizer_path, Some(args.max_sequence_length))?
        }
        _ => {
            let manager = ModelManager::new_default()?;
            let model = args.model_info();
            if args.fresh {
                info!("Fresh download requested - removing any existing model files...");
                manager.remove_download(&model.name)?;
            }
            manager.ensure_model_downloaded(&model).await?;
            builder.with_model(&manager, &model, Some(args.max_sequence_length))?
        }
    };

    Ok(builder.build()?)
}

fn read_request(input: Option<&PathBuf>) -> anyhow::Result<Value> {
    let raw = match input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    serde_json::from_str(&raw).context("request is not valid JSON")
}

fn predict_request(pipeline: &PredictionPipeline<BinaryBert>, request: Value) -> anyhow::Result<Value> {
    let Some(content) = request.get("content") else {
        bail!("Input must be a dictionary with 'content' key");
    };

    let output = match content {
        Value::Array(items) => {
            let items: Vec<PredictionInput> = items.iter().map(PredictionInput::from_json).collect();
            serde_json::to_value(pipeline.predict_bulk(&items)?)?
        }
        item => {
            let item = PredictionInput::from_json(item);
            let text = item.text.unwrap_or_default();
            serde_json::to_value(pipeline.predict(&text, item.footer.as_ref())?)?
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cdm_classifier::init_logger();
    let cli = Cli::parse();

    info!("=== Starting CDMv2 classifier ===");
    let start_time = Instant::now();
    let classifier = load_classifier(&cli.model).await?;
    info!(
        "=== Classifier '{}' loaded (took {:.2?}) ===",
        classifier.info().name,
        start_time.elapsed()
    );

    let pipeline = PredictionPipeline::new(Arc::new(classifier), ServiceConfig::from_env());

    match cli.command {
        Command::Serve { addr } => server::serve(pipeline, &addr).await,
        Command::Predict { input } => {
            let request = read_request(input.as_ref())?;
            let classify_start = Instant::now();
            let output = predict_request(&pipeline, request)?;
            info!("Classification time: {:.2?}", classify_start.elapsed());
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}
