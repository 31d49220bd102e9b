use {
    std::{
        io,
        mem,
        path::{
            Path,
            PathBuf,
        },
        time::Duration,
    },
    lazy_regex::regex_captures,
    tokio::{
        fs::File,
        io::{
            AsyncBufReadExt as _,
            BufReader,
        },
        net::TcpStream,
        sync::{
            mpsc,
            watch,
        },
        time::sleep,
    },
    wheel::{
        fs,
        traits::IoResultExt as _,
    },
    crate::config,
};

/// Cadence of the whole game-side loop: reconnect attempts, command drains,
/// and log polls. Fixed, no backoff — the game may be absent for hours.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A command for the running game, queued by the event loop.
pub enum Command {
    Raw(String),
    /// echo wrapped in the `con_filter_enable` dance so it survives the filter
    Echo {
        text: String,
        delay: u32,
    },
    Play(String),
}

pub enum Event {
    /// RCON is up and the player identity was resolved
    Connected {
        steam_name: String,
    },
    /// one line from the console dump
    Line(String),
    Disconnected {
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)] Rcon(#[from] rcon::Error),
    #[error(transparent)] Send(#[from] mpsc::error::SendError<Event>),
    #[error(transparent)] Wheel(#[from] wheel::Error),
}

fn disconnect_reason(e: &Error) -> String {
    match e {
        Error::Rcon(rcon::Error::Auth) => format!("wrong RCON password — check the rcon_password convar in-game, and set it to something if it's blank"),
        Error::Rcon(rcon::Error::Io(inner)) if inner.kind() == io::ErrorKind::ConnectionRefused => format!("connection refused — make sure the game is running with the -usercon launch option"),
        e => e.to_string(),
    }
}

/// Maintains the game connection forever: waits for an RCON password, runs a
/// session, reports the failure, retries on the fixed cadence. Returns once
/// the command channel closes (client shutdown).
pub async fn task(game_dir: PathBuf, rcon_address: String, password_rx: watch::Receiver<Option<String>>, mut cmd_rx: mpsc::Receiver<Command>, events: mpsc::Sender<Event>, class_known_rx: watch::Receiver<bool>) -> Result<(), Error> {
    loop {
        if cmd_rx.is_closed() {
            return Ok(())
        }
        let password = password_rx.borrow().clone();
        if let Some(password) = password {
            match session(&game_dir, &rcon_address, &password, &mut cmd_rx, &events, &class_known_rx).await {
                Ok(()) => return Ok(()),
                Err(e @ Error::Send(_)) => return Err(e),
                Err(e) => events.send(Event::Disconnected { reason: disconnect_reason(&e) }).await?,
            }
        }
        sleep(POLL_INTERVAL).await;
    }
}

async fn session(game_dir: &Path, address: &str, password: &str, cmd_rx: &mut mpsc::Receiver<Command>, events: &mpsc::Sender<Event>, class_known_rx: &watch::Receiver<bool>) -> Result<(), Error> {
    let mut conn = <rcon::Connection<TcpStream>>::builder().connect(address, password).await?;
    // drop whatever an earlier run left in the dump
    let condump = config::condump_path(game_dir);
    if fs::exists(&condump).await? {
        fs::write(&condump, "").await?;
    }
    let mut reader = None;
    let mut pending = String::default();
    let mut steam_name = String::default();
    loop {
        if steam_name.is_empty() {
            let response = conn.cmd("name").await?;
            if let Some((_, name)) = regex_captures!(r#""name" = "(.*?)""#, &response) {
                steam_name = name.to_owned();
                events.send(Event::Connected { steam_name: steam_name.clone() }).await?;
            }
        }
        if !*class_known_rx.borrow() {
            // forces the class config to execute so the class shows up in the
            // log, e.g. after the client reconnects mid-match
            conn.cmd("record ap_dummy; stop").await?;
        }
        loop {
            match cmd_rx.try_recv() {
                Ok(command) => run_command(&mut conn, command).await?,
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if reader.is_none() && fs::exists(&condump).await? {
            reader = Some(BufReader::new(File::open(&condump).await.at(condump.clone())?));
        }
        if let Some(reader) = &mut reader {
            loop {
                let mut buf = String::default();
                if reader.read_line(&mut buf).await.at(condump.clone())? == 0 {
                    break
                }
                // the game can flush mid-line; hold partial lines until the
                // newline arrives
                pending.push_str(&buf);
                if pending.ends_with('\n') {
                    events.send(Event::Line(mem::take(&mut pending))).await?;
                }
            }
        }
        sleep(POLL_INTERVAL).await;
    }
}

async fn run_command(conn: &mut rcon::Connection<TcpStream>, command: Command) -> Result<(), Error> {
    match command {
        Command::Raw(cmd) => { conn.cmd(&cmd).await?; }
        Command::Play(sound) => { conn.cmd(&format!("play {sound}")).await?; }
        Command::Echo { text, delay } => {
            conn.cmd(&format!("wait {delay}; con_filter_enable 0")).await?;
            conn.cmd(&format!("wait {delay}; echo {text}")).await?;
            conn.cmd(&format!("wait {}; con_filter_enable 1", delay + 1)).await?;
        }
    }
    Ok(())
}
