use clap::{Parser, Subcommand};
use std::path::Path;

use multi_bot_controller::application::arbitration::{Arbiter, Outcome, Precedence};
use multi_bot_controller::application::errors::{BotError, ConfigError, HostError, ReplayError};
use multi_bot_controller::application::messaging::MessageParser;
use multi_bot_controller::application::services::ControllerService;
use multi_bot_controller::domain::entities::{BotIdentity, Channel, IncomingMessage};
use multi_bot_controller::domain::traits::TraceSink;
use multi_bot_controller::infrastructure::config::Config;
use multi_bot_controller::infrastructure::host::{DispatchMode, InMemoryHost};
use multi_bot_controller::infrastructure::replay::{self, EventSource, LineSource};
use multi_bot_controller::infrastructure::trace::{MemorySink, NoopSink, TracingSink};

#[derive(Parser)]
#[command(name = "multi-bot-controller")]
#[command(about = "Decides which bot answers a message in a shared channel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,

    /// Log every decision point
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config file
    Check,
    /// Print or write a sample config
    InitConfig {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Arbitrate a single message against the config
    Simulate(SimulateArgs),
    /// Replay JSON-lines host events from a file or stdin
    Replay {
        /// Event file, stdin when omitted
        input: Option<String>,
        /// Invoke the hook once per attached bot instead of once per message
        #[arg(long)]
        per_bot: bool,
    },
    /// Show version
    Version,
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Message text
    text: String,
    #[arg(long, default_value = "onebot")]
    platform: String,
    #[arg(long, default_value = "channel-1")]
    channel: String,
    #[arg(long, default_value = "user-1")]
    user: String,
    #[arg(long)]
    guild: Option<String>,
    #[arg(long)]
    direct: bool,
    /// Attached bot as platform:self-id; defaults to every configured bot on the platform
    #[arg(long = "attach")]
    attached: Vec<String>,
    /// Mentioned self id
    #[arg(long = "mention")]
    mentions: Vec<String>,
    /// Current assignee of the channel
    #[arg(long, default_value = "")]
    assignee: String,
    #[arg(long)]
    precedence: Option<Precedence>,
    /// Print the decision trace
    #[arg(long)]
    explain: bool,
}

fn main() {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config);
    let debug = cli.debug || loaded.as_ref().map(|c| c.debug).unwrap_or(false);

    // Initialize logging
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let result = match cli.command {
        Commands::Check => check(&cli.config, loaded),
        Commands::InitConfig { output } => init_config(output),
        Commands::Simulate(args) => simulate(config_or_default(loaded), debug, args),
        Commands::Replay { input, per_bot } => run_replay(config_or_default(loaded), debug, input, per_bot),
        Commands::Version => {
            println!("multi-bot-controller v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str) -> Result<Config, ConfigError> {
    let mut config = if Path::new(path).exists() {
        Config::load(path)?
    } else {
        Config::default()
    };
    config.apply_env()?;
    Ok(config)
}

fn check(path: &str, loaded: Result<Config, ConfigError>) -> Result<(), BotError> {
    let config = loaded?;
    if !Path::new(path).exists() {
        tracing::warn!("{} not found, checked built-in defaults", path);
    }
    tracing::info!(
        "{} is valid: {} bots, precedence {}",
        path,
        config.bots.len(),
        config.arbitration.precedence
    );
    for bot in &config.bots {
        if !bot.enabled {
            tracing::info!("{} is disabled and will never respond", bot.identity());
        }
    }
    Ok(())
}

fn config_or_default(loaded: Result<Config, ConfigError>) -> Config {
    loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Config::load_env()
    })
}

fn init_config(output: Option<String>) -> Result<(), BotError> {
    let yaml = Config::example().to_yaml()?;
    match output {
        Some(path) => {
            std::fs::write(&path, yaml).map_err(ConfigError::from)?;
            tracing::info!("Wrote sample config to {}", path);
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

fn simulate(config: Config, debug: bool, args: SimulateArgs) -> Result<(), BotError> {
    let policies = config.policies();
    let attached: Vec<BotIdentity> = if args.attached.is_empty() {
        policies
            .identities()
            .filter(|id| id.platform == args.platform)
            .cloned()
            .collect()
    } else {
        args.attached
            .iter()
            .map(|raw| raw.parse().map_err(HostError::InvalidIdentity))
            .collect::<Result<Vec<BotIdentity>, HostError>>()?
    };
    let receiver = attached.first().map(|id| id.self_id.clone()).unwrap_or_default();

    let mut message = IncomingMessage::new(&args.platform, receiver, &args.channel, &args.user, &args.text);
    if let Some(guild) = args.guild {
        message = message.with_guild(guild);
    }
    if args.direct {
        message = message.direct();
    }
    for mention in args.mentions {
        message = message.with_mention(mention);
    }
    let message = parser_for(&config).parse(message);

    let memory = MemorySink::new();
    let tracing_sink = TracingSink::new(debug);
    let sink: &dyn TraceSink = if args.explain { &memory } else { &tracing_sink };

    let precedence = args.precedence.unwrap_or(config.arbitration.precedence);
    let arbiter = Arbiter::new(&policies, sink).with_precedence(precedence);
    let mut channel = Channel::new(&args.platform, &args.channel).with_assignee(args.assignee);
    let outcome = arbiter.arbitrate(&message, &attached, &mut channel);

    if args.explain {
        for event in memory.drain() {
            println!(
                "{} [{}] {}",
                event.received_at.format("%H:%M:%S%.3f"),
                event.identity,
                event.message
            );
        }
    }
    println!("{}", describe(&outcome, channel.assignee()));
    Ok(())
}

fn run_replay(config: Config, debug: bool, input: Option<String>, per_bot: bool) -> Result<(), BotError> {
    let sink: Box<dyn TraceSink> = if debug {
        Box::new(TracingSink::new(true))
    } else {
        Box::new(NoopSink)
    };
    let controller = ControllerService::new(config.policies(), config.arbitration.precedence, sink);
    let dispatch = if per_bot { DispatchMode::PerBot } else { DispatchMode::Batch };
    let mut host = InMemoryHost::new(controller, parser_for(&config)).with_dispatch(dispatch);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BotError::Internal(e.to_string()))?;

    let steps = rt.block_on(async {
        let mut source: Box<dyn EventSource> = match input {
            Some(path) => match tokio::fs::File::open(&path).await {
                Ok(file) => Box::new(LineSource::new(file)),
                Err(e) => return Err(ReplayError::from(e)),
            },
            None => Box::new(LineSource::new(tokio::io::stdin())),
        };
        replay::replay(source.as_mut(), &mut host).await
    })?;

    for step in steps {
        println!(
            "line {:>4}  {:<12} {:<36} {}",
            step.line,
            step.channel,
            step.message_id,
            describe(&step.outcome, &step.assignee)
        );
    }
    Ok(())
}

fn parser_for(config: &Config) -> MessageParser {
    let mut prefixes = config.command_prefixes().into_iter();
    let first = prefixes.next().unwrap_or_else(|| "/".to_string());
    prefixes.fold(MessageParser::new(first), |parser, p| parser.with_prefix(p))
}

fn describe(outcome: &Outcome, assignee: &str) -> String {
    let state = if assignee.is_empty() { "<unassigned>" } else { assignee };
    match outcome {
        Outcome::Skipped => format!("skipped (assignee {})", state),
        Outcome::Unchanged => format!("unchanged (assignee {})", state),
        Outcome::Assigned(id) => format!("assigned to {}", id),
        Outcome::Released => "released".to_string(),
    }
}
