use std::io::BufRead;
use std::process::ExitCode;

use clap::Parser;

use slack_progress_core::gateway::slack_gateway::SLACK_API_BASE;
use slack_progress_core::{ProgressConfig, ProgressController};

mod terminal_observer;
use terminal_observer::TerminalSessionObserver;

#[derive(Parser)]
#[command(
    name = "slack-progress",
    about = "Keep a live status message in a Slack channel; each stdin line becomes the new status"
)]
struct Args {
    /// Slack token used for all API calls
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    token: String,

    /// Channel name or id to post in
    #[arg(short, long, env = "SLACK_CHANNEL")]
    channel: String,

    /// Bold text shown before the spinner
    #[arg(short, long, default_value = "Working")]
    prefix: String,

    /// Spinner frames, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "no_spinner")]
    frames: Option<Vec<String>>,

    /// Static status without a spinner
    #[arg(long)]
    no_spinner: bool,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_BASE", default_value = SLACK_API_BASE)]
    api_base: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut builder = ProgressConfig::builder(args.token, args.channel)
        .with_prefix(args.prefix.clone())
        .with_api_base(args.api_base);
    if args.no_spinner {
        builder = builder.with_frames(Vec::<String>::new());
    } else if let Some(frames) = args.frames {
        builder = builder.with_frames(frames);
    }

    let mut progress = match ProgressController::new(builder.build()) {
        Ok(progress) => progress,
        Err(e) => {
            eprintln!("slack-progress: {}", e);
            return ExitCode::FAILURE;
        }
    };
    progress.add_observer(Box::new(TerminalSessionObserver::new(&args.prefix)));

    if let Err(e) = progress.start() {
        eprintln!("slack-progress: {}", e);
        return ExitCode::FAILURE;
    }

    // Ctrl-C ends the run the same way EOF does.
    let stop = progress.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    // Plain thread: a blocked stdin read must not hold up runtime shutdown.
    let status = progress.status_text();
    let stop = progress.stop_handle();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => status.set(line),
                Err(e) => {
                    log::warn!("[slack-progress] stdin read failed: {}", e);
                    break;
                }
            }
        }
        stop.stop();
    });

    progress.wait().await;

    match progress.try_recv_error() {
        Some(e) => {
            eprintln!("slack-progress: {}", e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
