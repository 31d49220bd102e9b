use {
    std::collections::BTreeMap,
    serde::{
        Deserialize,
        Serialize,
    },
    serde_json::Value as Json,
    crate::SlotData,
};

/// `StatusUpdate` value for a completed goal.
pub const CLIENT_GOAL: u32 = 30;

/// Outbound session messages. The wire format is a JSON array of `cmd`-tagged
/// objects per WebSocket text frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd")]
pub enum ClientMessage {
    Connect {
        password: Option<String>,
        game: String,
        name: String,
        uuid: String,
        version: NetworkVersion,
        items_handling: u32,
        tags: Vec<String>,
        slot_data: bool,
    },
    ConnectUpdate {
        tags: Vec<String>,
    },
    Say {
        text: String,
    },
    LocationChecks {
        locations: Vec<i64>,
    },
    Get {
        keys: Vec<String>,
    },
    Set {
        key: String,
        default: Json,
        want_reply: bool,
        operations: Vec<SetOperation>,
    },
    StatusUpdate {
        status: u32,
    },
    Bounce {
        tags: Vec<String>,
        data: Json,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetOperation {
    pub operation: &'static str,
    pub value: Json,
}

impl SetOperation {
    pub fn replace(value: impl Into<Json>) -> Self {
        Self { operation: "replace", value: value.into() }
    }

    pub fn add(value: impl Into<Json>) -> Self {
        Self { operation: "add", value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub class: &'static str,
}

impl Default for NetworkVersion {
    fn default() -> Self {
        Self { major: 0, minor: 5, build: 0, class: "Version" }
    }
}

/// Inbound session messages, limited to the commands this integration reacts
/// to — anything else in a frame is skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerMessage {
    RoomInfo {
        #[serde(default)]
        password: bool,
    },
    Connected {
        slot: i64,
        slot_data: SlotData,
    },
    ConnectionRefused {
        #[serde(default)]
        errors: Vec<String>,
    },
    ReceivedItems {
        index: u32,
        items: Vec<NetworkItem>,
    },
    Retrieved {
        keys: BTreeMap<String, Json>,
    },
    PrintJSON {
        data: Vec<JsonMessagePart>,
    },
    Bounced {
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        data: Json,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkItem {
    pub item: i64,
    #[serde(default)]
    pub location: i64,
    #[serde(default)]
    pub player: i64,
    #[serde(default)]
    pub flags: u32,
}

/// One fragment of a server-rendered text message. Colours and markup are
/// deliberately dropped — the game console only takes plain text.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonMessagePart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Concatenates the plain text of a `PrintJSON` payload.
pub fn flatten_print(parts: &[JsonMessagePart]) -> String {
    parts.iter().filter_map(|part| part.text.as_deref()).collect()
}

/// Parses one inbound text frame, skipping unknown or malformed commands.
pub fn parse_frame(frame: &str) -> Vec<ServerMessage> {
    let Ok(values) = serde_json::from_str::<Vec<Json>>(frame) else { return Vec::default() };
    values.into_iter().filter_map(|value| serde_json::from_value(value).ok()).collect()
}

/// Encodes one outbound batch.
pub fn encode_frame(messages: &[ClientMessage]) -> Result<String, serde_json::Error> {
    serde_json::to_string(messages)
}

#[cfg(test)]
mod tests {
    use {
        serde_json::json,
        super::*,
    };

    #[test]
    fn outbound_frames_are_cmd_tagged_arrays() {
        let frame = encode_frame(&[ClientMessage::LocationChecks { locations: vec![41151] }]).expect("serializable");
        assert_eq!(frame, r#"[{"cmd":"LocationChecks","locations":[41151]}]"#);
        let frame = encode_frame(&[ClientMessage::Set {
            key: format!("ContractPoints_1"),
            default: json!(0),
            want_reply: false,
            operations: vec![SetOperation::replace(3)],
        }]).expect("serializable");
        assert!(frame.contains(r#""operation":"replace""#));
    }

    #[test]
    fn inbound_frames_skip_unknown_commands() {
        let frame = r#"[
            {"cmd": "RoomInfo", "password": false, "games": ["Team Fortress 2"]},
            {"cmd": "SetReply", "key": "x", "value": 1},
            {"cmd": "ReceivedItems", "index": 0, "items": [{"item": 50, "location": -1, "player": 1, "flags": 0}]}
        ]"#;
        let messages = parse_frame(frame);
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ServerMessage::RoomInfo { password: false }));
        assert!(matches!(&messages[1], ServerMessage::ReceivedItems { index: 0, items } if items[0].item == 50));
    }

    #[test]
    fn connected_carries_slot_data() {
        let frame = r#"[{
            "cmd": "Connected",
            "slot": 4,
            "team": 0,
            "players": [],
            "slot_data": {
                "WeaponKillCounts": {"Machina": 2},
                "ClassKillCounts": {"Sniper": 3},
                "RequiredContractPoints": 7,
                "DeathLinkAmnesty": 3,
                "DeathLink": true
            }
        }]"#;
        let messages = parse_frame(frame);
        let [ServerMessage::Connected { slot, slot_data }] = messages.as_slice() else {
            panic!("expected a Connected message, got {messages:?}")
        };
        assert_eq!(*slot, 4);
        assert_eq!(slot_data.weapon_kill_counts.get("Machina"), Some(&2));
        assert_eq!(slot_data.required_contract_points, 7);
        assert!(slot_data.death_link);
    }
}
