// carpool-scout CLI: query an Evolution API instance from the terminal
//
// Without a subcommand it runs a connectivity check (find chats, log the
// count, log any failure). Subcommands map one-to-one onto client calls.

use std::process::ExitCode;

use carpool_scout::atoms::types::{Chat, Group, Message, MessageKind};
use carpool_scout::{
    classify_groups, get_carpool_groups, EvolutionClient, EvolutionConfig, EvolutionError,
    EvolutionResult,
};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use serde::Serialize;

// ── Arguments ──────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "carpool-scout", version, about = "Find carpool groups and messages on an Evolution API instance")]
struct Cli {
    #[command(flatten)]
    gateway: GatewayArgs,

    /// Print pretty JSON instead of summary lines
    #[arg(long, global = true)]
    json: bool,

    /// Log filter in env_logger syntax (e.g. "debug", "carpool_scout=debug")
    #[arg(long, env = "CARPOOL_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Overrides for the values read from the environment / `.env`.
#[derive(Args)]
struct GatewayArgs {
    /// Gateway base URL [default: $EVO_URL or http://localhost:8080]
    #[arg(long, global = true)]
    url: Option<String>,

    /// Instance name [default: $EVO_INSTANCE or carpool]
    #[arg(long, global = true)]
    instance: Option<String>,

    /// API key [default: $AUTHENTICATION_API_KEY]
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Request timeout in seconds [default: $EVO_TIMEOUT_SECS or 60]
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl GatewayArgs {
    fn apply(self, mut config: EvolutionConfig) -> EvolutionConfig {
        if let Some(url) = self.url {
            config.api_url = url;
        }
        if let Some(instance) = self.instance {
            config.instance_name = instance;
        }
        if let Some(key) = self.api_key {
            config.api_key = key;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Gateway version banner
    Info,
    /// Connection state of the instance
    State,
    /// List chats
    Chats,
    /// List all groups with participants
    Groups,
    /// List groups whose subject looks carpool-related
    Carpool,
    /// Search the messages of one group
    Messages {
        /// Group JID, e.g. 120363000000000000@g.us
        group_id: String,
        /// Skip the sender-key distribution filter
        #[arg(long)]
        raw: bool,
    },
    /// Send a text message
    Send {
        /// Destination number or JID
        number: String,
        text: String,
    },
    /// Connection state, chat count and carpool groups in one go
    Overview,
}

// ── Entry point ────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str()))
        .init();

    let config = cli.gateway.apply(EvolutionConfig::from_env());
    let client = match EvolutionClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(command) = cli.command else {
        connectivity_check(&client).await;
        return ExitCode::SUCCESS;
    };

    match run(command, &client, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log the outcome of a findChats call; never fails the process.
async fn connectivity_check(client: &EvolutionClient) {
    match client.find_chats().await {
        Ok(chats) => info!("Found {} chats", chats.len()),
        Err(e @ EvolutionError::Gateway { .. }) => error!("HTTP error while fetching chats: {}", e),
        Err(e @ EvolutionError::Transport(_)) => error!("Network error while fetching chats: {}", e),
        Err(e) => error!("Failed to fetch chats: {}", e),
    }
}

// ── Commands ───────────────────────────────────────────────────────────

async fn run(command: Command, client: &EvolutionClient, json: bool) -> EvolutionResult<()> {
    match command {
        Command::Info => {
            let info = client.get_information().await?;
            emit(json, &info, || {
                println!("Evolution API {}", info.version().unwrap_or("(unknown version)"))
            })
        }
        Command::State => {
            let state = client.get_connection_state().await?;
            emit(json, &state, || {
                println!("{}: {}", client.config().instance_name, state.state().unwrap_or("unknown"))
            })
        }
        Command::Chats => {
            let chats = client.find_chats().await?;
            emit(json, &chats, || chats.iter().for_each(print_chat))
        }
        Command::Groups => {
            let groups = client.fetch_all_groups().await?;
            emit(json, &groups, || groups.iter().for_each(print_group))
        }
        Command::Carpool => {
            let keywords = client.config().keywords();
            let groups = get_carpool_groups(client, None, &keywords).await?;
            emit(json, &groups, || groups.iter().for_each(print_group))
        }
        Command::Messages { group_id, raw } => {
            let messages = if raw {
                client.find_messages_raw(&group_id).await?
            } else {
                info!("Matching on the sender-key distribution group id; plain text messages are not included");
                client.find_messages(&group_id).await?
            };
            emit(json, &messages, || messages.iter().for_each(print_message))
        }
        Command::Send { number, text } => {
            let receipt = client.send_message(&text, &number).await?;
            emit(json, &receipt, || {
                println!("Sent to {} (id {})", number, receipt.message_id().unwrap_or("?"))
            })
        }
        Command::Overview => overview(client, json).await,
    }
}

#[derive(Serialize)]
struct Overview {
    instance: String,
    state: Option<String>,
    chats: usize,
    groups: usize,
    carpool_groups: Vec<Group>,
}

/// The three calls share nothing, so they run concurrently.
async fn overview(client: &EvolutionClient, json: bool) -> EvolutionResult<()> {
    let (state, chats, groups) = tokio::try_join!(
        client.get_connection_state(),
        client.find_chats(),
        client.fetch_all_groups(),
    )?;

    let total_groups = groups.len();
    let carpool_groups = classify_groups(groups, &client.config().keywords());
    let report = Overview {
        instance: client.config().instance_name.clone(),
        state: state.state().map(str::to_string),
        chats: chats.len(),
        groups: total_groups,
        carpool_groups,
    };

    if !state.is_open() {
        warn!("Instance '{}' is not connected", report.instance);
    }

    emit(json, &report, || {
        println!("instance  {}", report.instance);
        println!("state     {}", report.state.as_deref().unwrap_or("unknown"));
        println!("chats     {}", report.chats);
        println!("groups    {} ({} carpool)", report.groups, report.carpool_groups.len());
        report.carpool_groups.iter().for_each(print_group);
    })
}

// ── Output ─────────────────────────────────────────────────────────────

fn emit<T: Serialize>(json: bool, value: &T, summary: impl FnOnce()) -> EvolutionResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(value)
            .map_err(|e| EvolutionError::config(format!("cannot encode output as JSON: {}", e)))?;
        println!("{}", rendered);
    } else {
        summary();
    }
    Ok(())
}

fn print_chat(chat: &Chat) {
    println!("{}  {}", chat.id().unwrap_or("?"), chat.name().unwrap_or(""));
}

fn print_group(group: &Group) {
    match group.participant_count() {
        Some(n) => println!("{}  {}  ({} participants)", group.id, group.subject, n),
        None => println!("{}  {}", group.id, group.subject),
    }
}

fn print_message(message: &Message) {
    let when = message
        .sent_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "????-??-?? ??:??".into());
    let who = message
        .push_name
        .as_deref()
        .or(message.key.participant.as_deref())
        .unwrap_or(&message.key.remote_jid);
    let what = message.text().map(str::to_string).unwrap_or_else(|| describe_content(message));
    println!("[{}] {}: {}", when, who, what);
}

fn describe_content(message: &Message) -> String {
    let Some(content) = message.message.as_ref() else {
        return "<no content>".into();
    };
    let kinds: Vec<String> = content
        .kinds()
        .map(|kind| match kind {
            MessageKind::ExtendedText(_) => "extendedText".to_string(),
            MessageKind::SenderKeyDistribution(s) => {
                format!("senderKeyDistribution {}", s.group_id.as_deref().unwrap_or("?"))
            }
            MessageKind::Other(name) => name.to_string(),
        })
        .collect();
    format!("<{}>", kinds.join(", "))
}
