use {
    std::collections::BTreeMap,
    itertools::Itertools as _,
    rand::prelude::*,
    serde_json::Value as Json,
    crate::{
        SlotData,
        data::{
            self,
            Class,
            KillInfo,
        },
        ids::{
            item_id,
            location_id,
        },
    },
};

const NOVICE_TICK: &str = "ui/quest_status_tick_novice.wav";
const EXPERT_TICK: &str = "ui/quest_status_tick_expert.wav";
const UNCLOAK: &str = "player/spy_uncloak.wav";
const BIRTHDAY_HORNS: &str = "misc/happy_birthday_tf_14.wav";
const BIRTHDAY_SONG: &str = "misc/happy_birthday.wav";

/// A boundary action requested by the progress state machine. The event loop
/// owning the session and game transports translates these; the state machine
/// itself never talks to either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// report a completed location check
    Check(i64),
    /// persist a counter under a session key
    SetNumber { key: String, value: u32 },
    /// append a weapon to the persisted hint list
    AddHint { key: String, value: String },
    /// request persisted values after (re)connecting
    GetKeys(Vec<String>),
    /// relay a chat message from the game
    Say(String),
    /// report goal completion
    StatusGoal,
    /// fire a death link, carrying the kill-log line as the cause
    SendDeath(String),
    /// run a console command in the game
    GameCmd(String),
    /// print text to the game console
    Echo(String),
    /// play a sound in the game
    PlaySound(&'static str),
}

/// Per-session runtime state: kill counters, contract points, hints, and the
/// current class as inferred from the console log. All mutation goes through
/// methods returning the `Effect`s the mutation requires; ownership stays
/// with the single event loop, so no locking is involved.
#[derive(Debug, Default)]
pub struct Progress {
    slot: i64,
    pub steam_name: String,
    pub current_class: Class,
    items_received: Vec<i64>,
    class_kill_reqs: BTreeMap<String, u32>,
    weapon_kill_reqs: BTreeMap<String, u32>,
    class_kill_counts: BTreeMap<String, u32>,
    weapon_kill_counts: BTreeMap<String, u32>,
    contract_hints: Vec<String>,
    points: u32,
    required_points: u32,
    death_count: u32,
    death_amnesty: u32,
    death_link: bool,
}

impl Progress {
    /// Applies the slot configuration after a successful session handshake and
    /// asks for every persisted counter. Reconnects re-run this; counters are
    /// then restored by the retrieval replies, which are idempotent.
    pub fn connected(&mut self, slot: i64, slot_data: &SlotData) -> Vec<Effect> {
        self.slot = slot;
        self.class_kill_reqs = slot_data.class_kill_counts.clone();
        self.weapon_kill_reqs = slot_data.weapon_kill_counts.clone();
        self.required_points = slot_data.required_contract_points;
        self.death_amnesty = slot_data.death_link_amnesty;
        self.death_link = slot_data.death_link;
        let keys = self.class_kill_reqs.keys().map(|name| format!("ClassCount_{}_{name}", self.slot))
            .chain(self.weapon_kill_reqs.keys().map(|name| format!("WeaponCount_{}_{name}", self.slot)))
            .chain([format!("ContractPoints_{}", self.slot), format!("ContractHints_{}", self.slot)])
            .collect();
        vec![Effect::GetKeys(keys)]
    }

    pub fn has_item(&self, name: &str) -> bool {
        item_id(name).is_ok_and(|id| self.items_received.contains(&id))
    }

    pub fn contract_points(&self) -> u32 { self.points }
    pub fn required_contract_points(&self) -> u32 { self.required_points }
    pub fn contract_hints(&self) -> &[String] { &self.contract_hints }
    pub fn death_link(&self) -> bool { self.death_link }

    pub fn toggle_death_link(&mut self) -> bool {
        self.death_link = !self.death_link;
        self.death_link
    }

    /// Consumes one console log line. Kill lines are only attributed once the
    /// steam name is known; a class-general kill and a weapon kill from the
    /// same line increment independently.
    pub fn handle_console_line(&mut self, line: &str) -> Vec<Effect> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut effects = Vec::default();
        if line.starts_with("ap_say") {
            effects.push(Effect::Say(line.replacen("ap_say ", "", 1)));
        } else if line.starts_with("ap_classmissing") {
            self.report_pending_objectives(&mut effects);
        } else if line.contains("not executing.") || line.contains("execing") {
            if let Some(class) = data::class_from_config_line(line) {
                self.current_class = class;
            }
        } else if !self.steam_name.is_empty() && line.starts_with(&self.steam_name) {
            if line.contains("killed") && line.contains("with") {
                if let Some(info) = data::parse_kill_line(line) {
                    self.handle_own_kill(info, &mut effects);
                }
            }
        } else if !self.steam_name.is_empty() && line.contains(&self.steam_name) {
            if line.contains("killed") && line.contains("with") && self.death_link {
                if let Some(info) = data::parse_kill_line(line) {
                    if info.victim == self.steam_name {
                        self.death_count += 1;
                        if self.death_count >= self.death_amnesty {
                            self.death_count = 0;
                            effects.push(Effect::SendDeath(if info.weapon.is_empty() {
                                line.to_owned()
                            } else {
                                line.replace(&info.weapon_internal, info.weapon)
                            }));
                        }
                    }
                }
            }
        }
        effects
    }

    fn handle_own_kill(&mut self, mut info: KillInfo, effects: &mut Vec<Effect>) {
        let mut sound_played_novice = false;
        let mut sound_played_expert = false;
        if self.current_class != Class::Unknown {
            let class_name = self.current_class.name();
            if self.class_kill_reqs.contains_key(class_name) && self.has_item(class_name) {
                let val = self.class_kill_counts.get(class_name).copied().unwrap_or_default();
                let req = self.class_kill_reqs.get(class_name).copied().unwrap_or_default();
                if val < req {
                    if let Ok(base) = location_id(class_name) {
                        effects.push(Effect::Check(base + i64::from(val)));
                    }
                    let val = val + 1;
                    self.class_kill_counts.insert(class_name.to_owned(), val);
                    effects.push(Effect::SetNumber { key: format!("ClassCount_{}_{class_name}", self.slot), value: val });
                    if val >= req {
                        effects.push(Effect::Echo(format!("[ARCHIPELAGO] COMPLETED CONTRACT: Kills as {class_name} ({val}/{req})")));
                        effects.push(Effect::PlaySound(EXPERT_TICK));
                        sound_played_expert = true;
                        self.add_contract_points(1, effects);
                    } else {
                        effects.push(Effect::PlaySound(NOVICE_TICK));
                        sound_played_novice = true;
                    }
                }
            }
        } else {
            for _ in 0..6 {
                effects.push(Effect::Echo(format!("!!!!! Your class is unknown by the client. Switch classes or type  'record 1' and then 'stop'  in the console to fix this. !!!!!")));
            }
        }
        if info.weapon_internal == "loose_cannon_impact" {
            // the Loose Cannon logs two different kill tokens
            info.weapon = "Loose Cannon";
            info.weapon_internal = format!("loose_cannon");
        } else if info.weapon_internal == "bleed_kill" {
            match self.current_class {
                Class::Engineer => {
                    info.weapon = "Southern Hospitality";
                    info.weapon_internal = format!("southern_hospitality");
                }
                Class::Sniper => {
                    info.weapon = "Tribalman's Shiv";
                    info.weapon_internal = format!("tribalkukri");
                }
                Class::Scout => {
                    // two Scout weapons cause bleeding — attribute to whichever
                    // is owned and still has objectives left, Guillotine first
                    let guillotine_kills = self.weapon_kill_counts.get("Flying Guillotine").copied().unwrap_or_default();
                    let guillotine_req = self.weapon_kill_reqs.get("Flying Guillotine").copied().unwrap_or_default();
                    let basher_kills = self.weapon_kill_counts.get("Boston Basher").copied().unwrap_or_default();
                    let basher_req = self.weapon_kill_reqs.get("Boston Basher").copied().unwrap_or_default();
                    if self.has_item("Flying Guillotine") && guillotine_kills < guillotine_req {
                        info.weapon = "Flying Guillotine";
                        info.weapon_internal = format!("guillotine");
                    } else if self.has_item("Boston Basher") && basher_kills < basher_req {
                        info.weapon = "Boston Basher";
                        info.weapon_internal = format!("boston_basher");
                    }
                }
                _ => {}
            }
        }
        let weapon = info.weapon;
        if self.weapon_kill_reqs.contains_key(weapon) && self.has_item(weapon) {
            let val = self.weapon_kill_counts.get(weapon).copied().unwrap_or_default();
            let req = self.weapon_kill_reqs.get(weapon).copied().unwrap_or_default();
            if val < req {
                if let Ok(base) = location_id(weapon) {
                    effects.push(Effect::Check(base + i64::from(val)));
                }
                let val = val + 1;
                self.weapon_kill_counts.insert(weapon.to_owned(), val);
                effects.push(Effect::SetNumber { key: format!("WeaponCount_{}_{weapon}", self.slot), value: val });
                if val >= req {
                    effects.push(Effect::Echo(format!("[ARCHIPELAGO] COMPLETED CONTRACT: Kills with {weapon} ({val}/{req})")));
                    self.add_contract_points(1, effects);
                    if !sound_played_expert {
                        effects.push(Effect::PlaySound(EXPERT_TICK));
                    }
                } else if !sound_played_novice {
                    effects.push(Effect::PlaySound(NOVICE_TICK));
                }
            }
        }
    }

    /// Points are capped at the requirement; awards past the goal are no-ops.
    fn add_contract_points(&mut self, amount: u32, effects: &mut Vec<Effect>) {
        if self.points >= self.required_points {
            return
        }
        self.points += amount;
        effects.push(Effect::Echo(format!("[ARCHIPELAGO] Contract Points: {}/{}", self.points, self.required_points)));
        effects.push(Effect::SetNumber { key: format!("ContractPoints_{}", self.slot), value: self.points });
        if self.points >= self.required_points {
            effects.push(Effect::StatusGoal);
            effects.push(Effect::Echo(format!("[ARCHIPELAGO] ********* CONGRATULATIONS! You're finished! ********")));
            effects.push(Effect::PlaySound(BIRTHDAY_HORNS));
            effects.push(Effect::PlaySound(BIRTHDAY_SONG));
        }
    }

    fn report_pending_objectives(&self, effects: &mut Vec<Effect>) {
        if self.current_class == Class::Unknown {
            effects.push(Effect::Echo(format!("Your class is unknown by the client, type 'record 1' and then 'stop' in the console to fix this, or change classes.")));
            return
        }
        let class_name = self.current_class.name();
        let mut message = String::default();
        let class_count = self.class_kill_counts.get(class_name).copied().unwrap_or_default();
        let class_req = self.class_kill_reqs.get(class_name).copied().unwrap_or_default();
        if class_count < class_req {
            message.push_str(&format!("{class_name} Kills: {class_count}/{class_req}\necho "));
        }
        for (weapon, &req) in &self.weapon_kill_reqs {
            if !self.has_item(weapon) || !data::class_uses_weapon(self.current_class, weapon) {
                continue
            }
            let count = self.weapon_kill_counts.get(weapon).copied().unwrap_or_default();
            if count >= req {
                continue
            }
            message.push_str(&format!("{weapon}: {count}/{req}\necho "));
        }
        if message.is_empty() {
            effects.push(Effect::Echo(format!("You have no pending objectives for the {class_name} class.")));
        } else {
            effects.push(Effect::Echo(message));
        }
    }

    /// Records an inventory delta. Index 0 is the initial sync after a
    /// (re)connect and only restores state; later batches also fire trap and
    /// hint side effects per item.
    pub fn receive_items(&mut self, index: u32, items: &[i64], rng: &mut impl Rng) -> Vec<Effect> {
        let mut effects = Vec::default();
        if index == 0 {
            self.items_received = items.to_vec();
            return effects
        }
        for &item in items {
            self.items_received.push(item);
            match item {
                50 => self.give_contract_hint(rng, &mut effects),
                51 => effects.extend(self.killbind(rng)),
                52 => effects.push(Effect::GameCmd(format!("disconnect"))),
                53 => effects.push(Effect::PlaySound(UNCLOAK)),
                54 => effects.push(Effect::GameCmd(format!("snd_restart"))),
                _ => {}
            }
        }
        effects
    }

    /// Uniform pick among weapons that are required, unowned, and not already
    /// hinted. Never re-hints a weapon; a dry candidate list is a no-op.
    fn give_contract_hint(&mut self, rng: &mut impl Rng, effects: &mut Vec<Effect>) {
        let possible = self.weapon_kill_reqs.keys()
            .filter(|&weapon| !self.contract_hints.contains(weapon) && !self.has_item(weapon))
            .cloned()
            .collect_vec();
        let Some(hint) = possible.choose(rng) else { return };
        self.contract_hints.push(hint.clone());
        effects.push(Effect::AddHint { key: format!("ContractHints_{}", self.slot), value: hint.clone() });
        effects.push(Effect::Echo(format!("Contract revealed: {hint}")));
    }

    pub fn killbind(&self, rng: &mut impl Rng) -> Vec<Effect> {
        vec![Effect::GameCmd(format!("{}", if rng.random_bool(0.5) { "kill" } else { "explode" }))]
    }

    /// Restores one persisted value. Replaying the same snapshot is a no-op;
    /// the session and the poll loop may race, but both only ever set whole
    /// values, so last write wins.
    pub fn merge_retrieved(&mut self, key: &str, value: &Json) {
        if let Some(name) = key.strip_prefix(&format!("WeaponCount_{}_", self.slot)) {
            if let Some(count) = value.as_u64() {
                self.weapon_kill_counts.insert(name.to_owned(), count as u32);
            }
        } else if let Some(name) = key.strip_prefix(&format!("ClassCount_{}_", self.slot)) {
            if let Some(count) = value.as_u64() {
                self.class_kill_counts.insert(name.to_owned(), count as u32);
            }
        } else if key == format!("ContractPoints_{}", self.slot) {
            if let Some(points) = value.as_u64() {
                self.points = points as u32;
            }
        } else if key == format!("ContractHints_{}", self.slot) {
            if let Some(hints) = value.as_array() {
                self.contract_hints = hints.iter().filter_map(|hint| hint.as_str().map(str::to_owned)).collect();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        rand_chacha::ChaCha8Rng,
        serde_json::json,
        super::*,
    };

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn slot_data(weapons: &[(&str, u32)], classes: &[(&str, u32)], required: u32, amnesty: u32, death_link: bool) -> SlotData {
        SlotData {
            weapon_kill_counts: weapons.iter().map(|&(name, count)| (name.to_owned(), count)).collect(),
            class_kill_counts: classes.iter().map(|&(name, count)| (name.to_owned(), count)).collect(),
            required_contract_points: required,
            death_link_amnesty: amnesty,
            death_link,
        }
    }

    fn connect(progress: &mut Progress, slot_data: &SlotData) {
        let effects = progress.connected(1, slot_data);
        assert!(matches!(effects.as_slice(), [Effect::GetKeys(_)]));
    }

    #[test]
    fn loose_cannon_impact_normalises() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Loose Cannon", 2)], &[], 5, 3, false));
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Scout;
        progress.receive_items(0, &[item_id("Loose Cannon").unwrap()], &mut rng());
        let base = location_id("Loose Cannon").unwrap();
        let effects = progress.handle_console_line("Alice killed Bob with loose_cannon_impact.");
        assert_eq!(effects[0], Effect::Check(base));
        assert_eq!(effects[1], Effect::SetNumber { key: format!("WeaponCount_1_Loose Cannon"), value: 1 });
        assert!(!effects.contains(&Effect::StatusGoal));
        assert_eq!(progress.contract_points(), 0);
    }

    #[test]
    fn bleed_kill_attributes_by_class() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Tribalman's Shiv", 1)], &[], 5, 3, false));
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Sniper;
        progress.receive_items(0, &[item_id("Tribalman's Shiv").unwrap()], &mut rng());
        let effects = progress.handle_console_line("Alice killed Bob with bleed_kill.");
        assert_eq!(effects[0], Effect::Check(location_id("Tribalman's Shiv").unwrap()));
        // the requirement was 1, so the sequence completed and a point landed
        assert_eq!(progress.contract_points(), 1);
    }

    #[test]
    fn scout_bleed_tiebreak_prefers_incomplete_guillotine() {
        let data = slot_data(&[("Flying Guillotine", 2), ("Boston Basher", 2)], &[], 9, 3, false);
        let mut progress = Progress::default();
        connect(&mut progress, &data);
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Scout;
        progress.receive_items(0, &[item_id("Flying Guillotine").unwrap(), item_id("Boston Basher").unwrap()], &mut rng());
        let effects = progress.handle_console_line("Alice killed Bob with bleed_kill.");
        assert_eq!(effects[0], Effect::Check(location_id("Flying Guillotine").unwrap()));

        // once the Guillotine is done, bleed kills fall through to the Basher
        progress.merge_retrieved("WeaponCount_1_Flying Guillotine", &json!(2));
        let effects = progress.handle_console_line("Alice killed Bob with bleed_kill.");
        assert_eq!(effects[0], Effect::Check(location_id("Boston Basher").unwrap()));
    }

    #[test]
    fn kills_past_the_requirement_are_noops() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Machina", 1)], &[], 5, 3, false));
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Sniper;
        progress.receive_items(0, &[item_id("Machina").unwrap()], &mut rng());
        assert!(!progress.handle_console_line("Alice killed Bob with machina.").is_empty());
        assert_eq!(progress.handle_console_line("Alice killed Bob with machina."), Vec::default());
        assert_eq!(progress.contract_points(), 1);
    }

    #[test]
    fn class_and_weapon_counters_are_independent() {
        let data = slot_data(&[("Machina", 2)], &[("Sniper", 2)], 9, 3, false);
        let mut progress = Progress::default();
        connect(&mut progress, &data);
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Sniper;
        progress.receive_items(0, &[item_id("Sniper").unwrap(), item_id("Machina").unwrap()], &mut rng());
        let effects = progress.handle_console_line("Alice killed Bob with machina.");
        let checks = effects.iter().filter(|effect| matches!(effect, Effect::Check(_))).count();
        assert_eq!(checks, 2, "one kill line increments both counters: {effects:?}");
        assert_eq!(effects[0], Effect::Check(location_id("Sniper").unwrap()));
    }

    #[test]
    fn unknown_class_blocks_general_kills_only() {
        let data = slot_data(&[("Machina", 2)], &[("Sniper", 2)], 9, 3, false);
        let mut progress = Progress::default();
        connect(&mut progress, &data);
        progress.steam_name = format!("Alice");
        progress.receive_items(0, &[item_id("Sniper").unwrap(), item_id("Machina").unwrap()], &mut rng());
        let effects = progress.handle_console_line("Alice killed Bob with machina.");
        assert!(effects.iter().any(|effect| *effect == Effect::Check(location_id("Machina").unwrap())));
        assert!(!effects.iter().any(|effect| *effect == Effect::Check(location_id("Sniper").unwrap())));
        // and the player got told their class is unknown
        assert!(effects.iter().filter(|effect| matches!(effect, Effect::Echo(_))).count() >= 6);
    }

    #[test]
    fn goal_triggers_on_the_boundary_point() {
        // 10 targets at 75% → 7 points; the 6th must not goal, the 7th must
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Machina", 1), ("Bushwacka", 1)], &[], 7, 3, false));
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Sniper;
        progress.receive_items(0, &[item_id("Machina").unwrap(), item_id("Bushwacka").unwrap()], &mut rng());
        progress.merge_retrieved("ContractPoints_1", &json!(5));
        let effects = progress.handle_console_line("Alice killed Bob with machina.");
        assert_eq!(progress.contract_points(), 6);
        assert!(!effects.contains(&Effect::StatusGoal));
        let effects = progress.handle_console_line("Alice killed Bob with bushwacka.");
        assert_eq!(progress.contract_points(), 7);
        assert!(effects.contains(&Effect::StatusGoal));
    }

    #[test]
    fn points_never_exceed_the_requirement() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Machina", 1), ("Bushwacka", 1)], &[], 1, 3, false));
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Sniper;
        progress.receive_items(0, &[item_id("Machina").unwrap(), item_id("Bushwacka").unwrap()], &mut rng());
        let effects = progress.handle_console_line("Alice killed Bob with machina.");
        assert!(effects.contains(&Effect::StatusGoal));
        let effects = progress.handle_console_line("Alice killed Bob with bushwacka.");
        assert!(!effects.contains(&Effect::StatusGoal));
        assert_eq!(progress.contract_points(), 1);
    }

    #[test]
    fn merge_retrieved_is_idempotent() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Machina", 3)], &[], 5, 3, false));
        progress.merge_retrieved("WeaponCount_1_Machina", &json!(2));
        progress.merge_retrieved("WeaponCount_1_Machina", &json!(2));
        progress.merge_retrieved("ContractHints_1", &json!(["Machina"]));
        progress.merge_retrieved("ContractHints_1", &json!(["Machina"]));
        assert_eq!(progress.contract_hints(), ["Machina"]);
        progress.merge_retrieved("WeaponCount_1_Machina", &Json::Null);
        progress.steam_name = format!("Alice");
        progress.current_class = Class::Sniper;
        progress.receive_items(0, &[item_id("Machina").unwrap()], &mut rng());
        let effects = progress.handle_console_line("Alice killed Bob with machina.");
        // the null didn't clobber the restored counter: next check is #3
        assert_eq!(effects[0], Effect::Check(location_id("Machina").unwrap() + 2));
    }

    #[test]
    fn death_link_respects_amnesty() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[], &[], 5, 3, true));
        progress.steam_name = format!("Alice");
        assert_eq!(progress.handle_console_line("Bob killed Alice with sword."), Vec::default());
        assert_eq!(progress.handle_console_line("Bob killed Alice with sword."), Vec::default());
        let effects = progress.handle_console_line("Bob killed Alice with sword.");
        assert_eq!(effects, vec![Effect::SendDeath(format!("Bob killed Alice with Eyelander."))]);
        // the counter reset, so the next death is amnesty 1 of 3 again
        assert_eq!(progress.handle_console_line("Bob killed Alice with sword."), Vec::default());
    }

    #[test]
    fn hints_are_never_repeated() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Machina", 2)], &[], 5, 3, false));
        let effects = progress.receive_items(1, &[50], &mut rng());
        assert!(effects.iter().any(|effect| *effect == Effect::AddHint { key: format!("ContractHints_1"), value: format!("Machina") }));
        // the only candidate is already hinted — nothing further to reveal
        assert_eq!(progress.receive_items(1, &[50], &mut rng()), Vec::default());
    }

    #[test]
    fn initial_inventory_sync_has_no_side_effects() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[("Machina", 2)], &[], 5, 3, false));
        let effects = progress.receive_items(0, &[50, 51, item_id("Machina").unwrap()], &mut rng());
        assert_eq!(effects, Vec::default());
        assert!(progress.has_item("Machina"));
        assert!(progress.has_item("Contract Hint"));
    }

    #[test]
    fn traps_fire_on_delivery() {
        let mut progress = Progress::default();
        connect(&mut progress, &slot_data(&[], &[], 5, 3, false));
        let effects = progress.receive_items(1, &[52, 53, 54], &mut rng());
        assert_eq!(effects, vec![
            Effect::GameCmd(format!("disconnect")),
            Effect::PlaySound(UNCLOAK),
            Effect::GameCmd(format!("snd_restart")),
        ]);
        let effects = progress.receive_items(1, &[51], &mut rng());
        assert!(matches!(&effects[0], Effect::GameCmd(cmd) if cmd == "kill" || cmd == "explode"));
    }

    #[test]
    fn chat_and_class_sentinels() {
        let mut progress = Progress::default();
        assert_eq!(progress.handle_console_line("ap_say hello world\n"), vec![Effect::Say(format!("hello world"))]);
        assert_eq!(progress.handle_console_line("execing config file soldier.cfg"), Vec::default());
        assert_eq!(progress.current_class, Class::Soldier);
        let effects = progress.handle_console_line("ap_classmissing");
        assert!(matches!(&effects[0], Effect::Echo(text) if text.contains("no pending objectives")));
    }
}
