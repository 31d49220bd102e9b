use {
    std::time::{
        SystemTime,
        UNIX_EPOCH,
    },
    chrono::prelude::*,
    itertools::Itertools as _,
    rustls as _, // feature ring required for WebSocket connections to work
    serde_json::{
        Value as Json,
        json,
    },
    tokio::{
        io::{
            AsyncBufReadExt as _,
            AsyncWriteExt as _,
            BufReader,
        },
        pin,
        select,
        signal,
        sync::{
            mpsc,
            watch,
        },
    },
    wheel::{
        fs::File,
        traits::IoResultExt as _,
    },
    tf2ap::{
        data::Class,
        progress::{
            Effect,
            Progress,
        },
        protocol::{
            self,
            ClientMessage,
            ServerMessage,
            SetOperation,
        },
    },
    crate::{
        config,
        console,
        session,
    },
};

mod config;
mod console;
mod session;

#[derive(Clone, clap::Parser)]
#[clap(version)]
struct Args {
    /// multiworld server address, e.g. play.example.net:38281
    server: String,
    /// slot (player) name
    slot: String,
    /// room password, if the server has one
    #[clap(short, long)]
    password: Option<String>,
    /// RCON password; can also be set later with /connect
    #[clap(long)]
    rcon_password: Option<String>,
    /// where the game's RCON listens
    #[clap(long, default_value = "127.0.0.1:27015")]
    rcon_address: String,
    /// append timestamped status messages to tf2ap.log
    #[clap(long)]
    log: bool,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)] Config(#[from] config::Error),
    #[error(transparent)] Console(#[from] console::Error),
    #[error(transparent)] Session(#[from] session::Error),
    #[error(transparent)] SessionSend(#[from] mpsc::error::SendError<Vec<ClientMessage>>),
    #[error(transparent)] Task(#[from] tokio::task::JoinError),
    #[error(transparent)] Wheel(#[from] wheel::Error),
}

/// Queues a command for the game without stalling the event loop — the game
/// side may be down, in which case the command is dropped, like the game
/// itself would drop it.
fn game_command(cmd_tx: &mpsc::Sender<console::Command>, command: console::Command) {
    let _ = cmd_tx.try_send(command);
}

/// Translates progress effects into session messages and game commands. One
/// call produces at most one outbound frame.
async fn apply_effects(effects: Vec<Effect>, slot: &str, outbound_tx: &mpsc::Sender<Vec<ClientMessage>>, cmd_tx: &mpsc::Sender<console::Command>) -> Result<(), Error> {
    let mut batch = Vec::default();
    for effect in effects {
        match effect {
            Effect::Check(id) => batch.push(ClientMessage::LocationChecks { locations: vec![id] }),
            Effect::SetNumber { key, value } => batch.push(ClientMessage::Set {
                key,
                default: json!(0),
                want_reply: false,
                operations: vec![SetOperation::replace(value)],
            }),
            Effect::AddHint { key, value } => batch.push(ClientMessage::Set {
                key,
                default: json!([]),
                want_reply: false,
                operations: vec![SetOperation::add(json!([value]))],
            }),
            Effect::GetKeys(keys) => batch.push(ClientMessage::Get { keys }),
            Effect::Say(text) => batch.push(ClientMessage::Say { text }),
            Effect::StatusGoal => batch.push(ClientMessage::StatusUpdate { status: protocol::CLIENT_GOAL }),
            Effect::SendDeath(cause) => batch.push(ClientMessage::Bounce {
                tags: vec![format!("DeathLink")],
                data: json!({
                    "time": SystemTime::now().duration_since(UNIX_EPOCH).map(|time| time.as_secs_f64()).unwrap_or_default(),
                    "source": slot,
                    "cause": cause,
                }),
            }),
            Effect::GameCmd(cmd) => game_command(cmd_tx, console::Command::Raw(cmd)),
            Effect::Echo(text) => game_command(cmd_tx, console::Command::Echo { text, delay: 1 }),
            Effect::PlaySound(sound) => game_command(cmd_tx, console::Command::Play(sound.to_owned())),
        }
    }
    if !batch.is_empty() {
        outbound_tx.send(batch).await?;
    }
    Ok(())
}

#[wheel::main]
async fn main(args: Args) -> Result<(), Error> {
    let game_dir = config::game_dir().await?;
    let mut log_file = if args.log {
        Some(File::create("tf2ap.log").await?)
    } else {
        None
    };

    macro_rules! log {
        ($($fmt:tt)*) => {{
            if let Some(ref mut log_file) = log_file {
                log_file.write_all(Local::now().format("%Y-%m-%d %H:%M:%S ").to_string().as_bytes()).await.at("tf2ap.log")?;
                log_file.write_all(format!($($fmt)*).as_bytes()).await.at("tf2ap.log")?;
                log_file.write_all(b"\n").await.at("tf2ap.log")?;
                log_file.flush().await.at("tf2ap.log")?;
            }
        }};
    }

    macro_rules! status {
        ($($fmt:tt)*) => {{
            eprintln!($($fmt)*);
            log!($($fmt)*);
        }};
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(256);
    let (console_tx, mut console_rx) = mpsc::channel(256);
    let (outbound_tx, outbound_rx) = mpsc::channel(256);
    let (session_tx, mut session_rx) = mpsc::channel(256);
    let (password_tx, password_rx) = watch::channel(args.rcon_password.clone());
    let (class_known_tx, class_known_rx) = watch::channel(false);
    let console_task = tokio::spawn(console::task(game_dir.clone(), args.rcon_address.clone(), password_rx, cmd_rx, console_tx, class_known_rx));
    let session_task = tokio::spawn(session::task(args.server.clone(), args.slot.clone(), args.password.clone(), outbound_rx, session_tx));
    status!("game directory: {}", game_dir.display());
    if args.rcon_password.is_none() {
        status!("no RCON password yet — set the rcon_password convar in-game, then type /connect <password> here");
    }

    let mut progress = Progress::default();
    // the maintenance tasks retry on a fixed 100ms cadence, so repeated
    // failures arrive constantly — only report a reason once until it changes
    let mut last_console_error = None;
    let mut last_session_error = None;
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = signal::ctrl_c();
    pin!(ctrl_c);
    loop {
        select! {
            _ = &mut ctrl_c => break,
            Some(event) = console_rx.recv() => match event {
                console::Event::Connected { steam_name } => {
                    status!("connected to TF2 RCON — your name is {steam_name}");
                    progress.steam_name = steam_name;
                    last_console_error = None;
                }
                console::Event::Line(line) => {
                    let effects = progress.handle_console_line(&line);
                    let _ = class_known_tx.send(progress.current_class != Class::Unknown);
                    apply_effects(effects, &args.slot, &outbound_tx, &cmd_tx).await?;
                }
                console::Event::Disconnected { reason } => {
                    if last_console_error.as_ref() != Some(&reason) {
                        status!("TF2 RCON connection failed or aborted ({reason}), retrying");
                        last_console_error = Some(reason);
                    }
                    progress.current_class = Class::Unknown;
                    let _ = class_known_tx.send(false);
                }
            },
            Some(event) = session_rx.recv() => match event {
                session::Event::Connected => {
                    log!("session socket open, waiting for the room");
                    last_session_error = None;
                }
                session::Event::Disconnected { reason } => if last_session_error.as_ref() != Some(&reason) {
                    status!("session connection lost ({reason}), retrying");
                    last_session_error = Some(reason);
                },
                session::Event::Messages(messages) => for message in messages {
                    match message {
                        ServerMessage::RoomInfo { .. } => log!("authenticating"),
                        ServerMessage::Connected { slot, slot_data } => {
                            let effects = progress.connected(slot, &slot_data);
                            apply_effects(effects, &args.slot, &outbound_tx, &cmd_tx).await?;
                            if progress.death_link() {
                                outbound_tx.send(vec![ClientMessage::ConnectUpdate { tags: vec![format!("DeathLink")] }]).await?;
                            }
                            status!("connected as slot {slot} ({} contract points of {} required)", progress.contract_points(), progress.required_contract_points());
                            status!("to connect to TF2 RCON:");
                            status!("  1. run the game with the -usercon launch option");
                            status!("  2. in the in-game console, set the rcon_password convar to something");
                            status!("  3. type /connect <password> in this client with the same password");
                        }
                        ServerMessage::ConnectionRefused { errors } => status!("connection refused by the server: {}", errors.iter().format(", ")),
                        ServerMessage::ReceivedItems { index, items } => {
                            let items = items.into_iter().map(|item| item.item).collect_vec();
                            let effects = progress.receive_items(index, &items, &mut rand::rng());
                            apply_effects(effects, &args.slot, &outbound_tx, &cmd_tx).await?;
                        }
                        ServerMessage::Retrieved { keys } => for (key, value) in &keys {
                            progress.merge_retrieved(key, value);
                        },
                        ServerMessage::PrintJSON { data } => {
                            let text = protocol::flatten_print(&data);
                            if !text.is_empty() {
                                log!("{text}");
                                game_command(&cmd_tx, console::Command::Echo { text, delay: 10 });
                            }
                        }
                        ServerMessage::Bounced { tags, data } => if tags.iter().any(|tag| tag == "DeathLink") && progress.death_link() {
                            if data.get("source").and_then(Json::as_str) != Some(args.slot.as_str()) {
                                let cause = data.get("cause").and_then(Json::as_str).unwrap_or("a death link");
                                status!("death link received: {cause}");
                                let effects = progress.killbind(&mut rand::rng());
                                apply_effects(effects, &args.slot, &outbound_tx, &cmd_tx).await?;
                            }
                        },
                    }
                },
            },
            res = stdin_lines.next_line(), if stdin_open => match res {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if let Some(password) = line.strip_prefix("/connect ") {
                        let _ = password_tx.send(Some(password.trim().to_owned()));
                        status!("RCON password set, connecting to the game");
                    } else if line == "/hints" {
                        let pending = progress.contract_hints().iter().filter(|hint| !progress.has_item(hint.as_str())).collect_vec();
                        if progress.contract_hints().is_empty() {
                            status!("You have no contract hints.");
                        } else if pending.is_empty() {
                            status!("You don't have any contract hints (for unobtained contracts).");
                        } else {
                            for hint in pending {
                                status!("{hint}");
                            }
                        }
                    } else if line == "/deathlink" {
                        let enabled = progress.toggle_death_link();
                        outbound_tx.send(vec![ClientMessage::ConnectUpdate { tags: if enabled { vec![format!("DeathLink")] } else { Vec::default() } }]).await?;
                        status!("death link {}", if enabled { "enabled" } else { "disabled" });
                    } else if let Some(text) = line.strip_prefix("/say ") {
                        outbound_tx.send(vec![ClientMessage::Say { text: text.to_owned() }]).await?;
                    } else if !line.is_empty() {
                        status!("commands: /connect <rcon password>, /hints, /deathlink, /say <text>");
                    }
                }
                Ok(None) | Err(_) => stdin_open = false,
            },
        }
    }
    // drop the task-facing channels so both maintenance tasks wind down, then
    // drain their event streams until they do
    drop(cmd_tx);
    drop(outbound_tx);
    drop(class_known_tx);
    drop(password_tx);
    while console_rx.recv().await.is_some() {}
    while session_rx.recv().await.is_some() {}
    console_task.await??;
    session_task.await??;
    Ok(())
}
