//! Command-line entry point: runs one turn and prints the reply.
//!
//! ```text
//! site-copilot [--tier compact|advanced|premium] [--image photo.jpg] <prompt...>
//! ```

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use site_copilot::adapters::ai::{OpenAIConfig, OpenAIProvider};
use site_copilot::adapters::corpus::{CachedCorpus, InMemoryCorpus};
use site_copilot::application::{Orchestrator, TurnReply};
use site_copilot::config::{AppConfig, LoggingConfig};
use site_copilot::domain::conversation::{InlineImage, UserTurn};
use site_copilot::domain::engine::EngineTier;
use site_copilot::domain::profile::UserProfile;
use site_copilot::ports::DocumentCorpus;

const CORPUS_ENV: &str = "SITE_COPILOT_CORPUS";

struct Args {
    tier: EngineTier,
    images: Vec<String>,
    prompt: String,
}

fn parse_args() -> Result<Args, String> {
    let mut tier = EngineTier::Premium;
    let mut images = Vec::new();
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tier" => {
                let value = args.next().ok_or("--tier needs a value")?;
                tier = match value.as_str() {
                    "compact" => EngineTier::Compact,
                    "advanced" => EngineTier::Advanced,
                    "premium" => EngineTier::Premium,
                    other => return Err(format!("unknown tier: {}", other)),
                };
            }
            "--image" => images.push(args.next().ok_or("--image needs a path")?),
            _ => words.push(arg),
        }
    }
    if words.is_empty() {
        return Err("usage: site-copilot [--tier TIER] [--image PATH] <prompt...>".into());
    }
    Ok(Args {
        tier,
        images,
        prompt: words.join(" "),
    })
}

fn load_image(path: &str) -> Result<InlineImage, Box<dyn std::error::Error>> {
    let mime = match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    Ok(InlineImage::new(mime, std::fs::read(path)?)?)
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(logging.env_filter()?)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;
    config.validate()?;

    let args = parse_args()?;

    let api_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(config.ai.compact_model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;

    let corpus: Option<Arc<dyn DocumentCorpus>> = std::env::var(CORPUS_ENV).ok().map(|names| {
        let corpus = InMemoryCorpus::with_names(
            names.split(',').map(str::trim).filter(|n| !n.is_empty()),
        );
        Arc::new(CachedCorpus::new(
            Arc::new(corpus),
            config.orchestration.corpus_cache_ttl(),
        )) as Arc<dyn DocumentCorpus>
    });

    let orchestrator = Orchestrator::new(config.orchestrator_settings(), Arc::new(provider), corpus)?;

    let mut turn = UserTurn::new(args.prompt)?;
    for path in &args.images {
        turn = turn.with_image(load_image(path)?);
    }
    let profile = UserProfile::default().with_tier(args.tier);

    let mut outcome = orchestrator.handle_turn(&turn, &[], &profile, None).await;
    let state = match &mut outcome.reply {
        Err(err) => {
            eprintln!("{}", err.user_message());
            None
        }
        Ok(TurnReply::Streaming(stream)) => {
            if let Some(ref rag) = stream.rag {
                eprintln!("[source: {}]", rag.source);
            }
            let mut stdout = std::io::stdout();
            loop {
                tokio::select! {
                    chunk = stream.channel.next_chunk() => match chunk {
                        Some(Ok(text)) => {
                            write!(stdout, "{}", text)?;
                            stdout.flush()?;
                        }
                        Some(Err(err)) => {
                            eprintln!("\n{}", err);
                            break;
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => stream.cancel.cancel(),
                }
            }
            println!();
            Some(stream.channel.state())
        }
        Ok(reply) => {
            if let Some(content) = reply.content() {
                println!("{}", serde_json::to_string_pretty(&content)?);
            }
            None
        }
    };
    if let Some(state) = state {
        outcome.finish_stream(state);
    }

    tracing::info!(phases = ?outcome.record.phases(), agent = %outcome.agent, "turn finished");
    Ok(())
}
