use {
    std::time::Duration,
    futures::{
        SinkExt as _,
        StreamExt as _,
    },
    tokio::{
        net::TcpStream,
        select,
        sync::mpsc,
        time::sleep,
    },
    tokio_tungstenite::{
        MaybeTlsStream,
        WebSocketStream,
        connect_async,
        tungstenite,
    },
    tf2ap::protocol::{
        self,
        ClientMessage,
        NetworkVersion,
        ServerMessage,
    },
};

/// Fixed reconnect cadence; the server may be gone for arbitrarily long.
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

pub enum Event {
    Connected,
    Messages(Vec<ServerMessage>),
    Disconnected {
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error(transparent)] Send(#[from] mpsc::error::SendError<Event>),
    #[error(transparent)] WebSocket(#[from] tungstenite::Error),
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Maintains the multiworld session forever. Outbound batches queued while
/// disconnected are dropped — counters live on the session's key/value store
/// and are restored by the handshake that follows the reconnect.
pub async fn task(server: String, slot: String, password: Option<String>, mut outbound: mpsc::Receiver<Vec<ClientMessage>>, events: mpsc::Sender<Event>) -> Result<(), Error> {
    loop {
        match run(&server, &slot, password.as_deref(), &mut outbound, &events).await {
            Ok(()) => return Ok(()),
            Err(e @ Error::Send(_)) => return Err(e),
            Err(e) => events.send(Event::Disconnected { reason: e.to_string() }).await?,
        }
        while outbound.try_recv().is_ok() {}
        sleep(RETRY_INTERVAL).await;
    }
}

async fn connect(server: &str) -> Result<WsStream, tungstenite::Error> {
    if server.contains("://") {
        Ok(connect_async(server).await?.0)
    } else {
        // same convention as the other clients: try TLS first, then plain
        match connect_async(format!("wss://{server}")).await {
            Ok((socket, _)) => Ok(socket),
            Err(_) => Ok(connect_async(format!("ws://{server}")).await?.0),
        }
    }
}

async fn run(server: &str, slot: &str, password: Option<&str>, outbound: &mut mpsc::Receiver<Vec<ClientMessage>>, events: &mpsc::Sender<Event>) -> Result<(), Error> {
    let mut socket = connect(server).await?;
    events.send(Event::Connected).await?;
    loop {
        select! {
            msg = socket.next() => {
                let Some(msg) = msg else { return Err(tungstenite::Error::ConnectionClosed.into()) };
                match msg? {
                    tungstenite::Message::Text(frame) => {
                        let messages = protocol::parse_frame(frame.as_str());
                        if messages.iter().any(|message| matches!(message, ServerMessage::RoomInfo { .. })) {
                            let connect = ClientMessage::Connect {
                                password: password.map(str::to_owned),
                                game: tf2ap::GAME_NAME.to_owned(),
                                name: slot.to_owned(),
                                uuid: format!("tf2ap-{slot}"),
                                version: NetworkVersion::default(),
                                items_handling: 0b111,
                                tags: Vec::default(),
                                slot_data: true,
                            };
                            socket.send(tungstenite::Message::text(protocol::encode_frame(&[connect])?)).await?;
                        }
                        if !messages.is_empty() {
                            events.send(Event::Messages(messages)).await?;
                        }
                    }
                    tungstenite::Message::Close(_) => return Err(tungstenite::Error::ConnectionClosed.into()),
                    _ => {}
                }
            }
            batch = outbound.recv() => {
                let Some(batch) = batch else {
                    let _ = socket.close(None).await;
                    return Ok(())
                };
                if !batch.is_empty() {
                    socket.send(tungstenite::Message::text(protocol::encode_frame(&batch)?)).await?;
                }
            }
        }
    }
}
