use {
    std::{
        collections::HashMap,
        sync::OnceLock,
    },
    lazy_regex::regex_captures,
};

/// The nine playable classes, plus a sentinel for "the client doesn't know yet".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Class {
    #[default]
    Unknown = 0,
    Scout = 1,
    Soldier = 2,
    Pyro = 3,
    Demoman = 4,
    Heavy = 5,
    Engineer = 6,
    Medic = 7,
    Sniper = 8,
    Spy = 9,
}

impl Class {
    pub const ALL: [Self; 9] = [Self::Scout, Self::Soldier, Self::Pyro, Self::Demoman, Self::Heavy, Self::Engineer, Self::Medic, Self::Sniper, Self::Spy];

    pub fn index(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Scout => 1,
            Self::Soldier => 2,
            Self::Pyro => 3,
            Self::Demoman => 4,
            Self::Heavy => 5,
            Self::Engineer => 6,
            Self::Medic => 7,
            Self::Sniper => 8,
            Self::Spy => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Scout => "Scout",
            Self::Soldier => "Soldier",
            Self::Pyro => "Pyro",
            Self::Demoman => "Demoman",
            Self::Heavy => "Heavy",
            Self::Engineer => "Engineer",
            Self::Medic => "Medic",
            Self::Sniper => "Sniper",
            Self::Spy => "Spy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name().eq_ignore_ascii_case(name))
    }

    /// The raw kill-log token → display name table for this class, in table order.
    /// Several tokens map to the same display name (e.g. every reflect kill token),
    /// and some tokens appear in multiple class tables; the first table in class
    /// order wins when resolving a bare token.
    pub fn kill_names(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Unknown => &[],
            Self::Scout => SCOUT_KILL_NAMES,
            Self::Soldier => SOLDIER_KILL_NAMES,
            Self::Pyro => PYRO_KILL_NAMES,
            Self::Demoman => DEMOMAN_KILL_NAMES,
            Self::Heavy => HEAVY_KILL_NAMES,
            Self::Engineer => ENGINEER_KILL_NAMES,
            Self::Medic => MEDIC_KILL_NAMES,
            Self::Sniper => SNIPER_KILL_NAMES,
            Self::Spy => SPY_KILL_NAMES,
        }
    }
}

const SCOUT_KILL_NAMES: &[(&str, &str)] = &[
    ("back_scatter", "Back Scatter"),
    ("force_a_nature", "Force-a-Nature"),
    ("pep_brawlerblaster", "Baby Face's Blaster"),
    ("shortstop", "Shortstop"),
    ("soda_popper", "Soda Popper"),
    ("pep_pistol", "Pretty Boy's Pocket Pistol"),
    ("the_winger", "Winger"),
    ("guillotine", "Flying Guillotine"),
    ("bat_wood", "Sandman"),
    ("atomizer", "Atomizer"),
    ("boston_basher", "Boston Basher"),
    ("scout_sword", "Boston Basher"),
    ("warfan", "Fan O'War"),
    ("holymackerel", "Holy Mackerel"),
    ("unarmed_combat", "Holy Mackerel"),
    ("wrap_assassin", "Wrap Assassin"),
    ("lava_bat", "Sun-on-a-Stick"),
    ("candy_cane", "Candy Cane"),
];

const SOLDIER_KILL_NAMES: &[(&str, &str)] = &[
    ("cow_mangler", "Cow Mangler 5000"),
    ("airstrike", "Air Strike"),
    ("blackbox", "Black Box"),
    ("dumpster_device", "Beggar's Bazooka"),
    ("rocketlauncher_directhit", "Direct Hit"),
    ("liberty_launcher", "Liberty Launcher"),
    ("reserve_shooter", "Reserve Shooter"),
    ("panic_attack", "Panic Attack"),
    ("righteous_bison", "Righteous Bison"),
    ("mantreads", "Mantreads"),
    ("unique_pickaxe_escape", "Escape Plan"),
    ("paintrain", "Pain Train"),
    ("unique_pickaxe", "Equalizer"),
    ("disciplinary_action", "Disciplinary Action"),
    ("demokatana", "Half-Zatoichi"),
    ("market_gardener", "Market Gardener"),
];

const PYRO_KILL_NAMES: &[(&str, &str)] = &[
    ("deflect_rocket", "Reflect"),
    ("deflect_promode", "Reflect"),
    ("deflect_ball", "Reflect"),
    ("deflect_arrow", "Reflect"),
    ("deflect_flare", "Reflect"),
    ("deflect_sticky", "Reflect"),
    ("rescue_ranger_reflect", "Reflect"),
    ("deflect_huntsman_headshot", "Reflect"),
    ("deflect_huntsman_flyingburn", "Reflect"),
    ("deflect_huntsman_flyingburn_headshot", "Reflect"),
    ("phlogistinator", "Phlogistinator"),
    ("dragons_fury", "Dragon's Fury"),
    ("backburner", "Backburner"),
    ("degreaser", "Degreaser"),
    ("reserve_shooter", "Reserve Shooter"),
    ("panic_attack", "Panic Attack"),
    ("flaregun", "Flare Gun"),
    ("scorch_shot", "Scorch Shot"),
    ("detonator", "Detonator"),
    ("manmelter", "Manmelter"),
    ("rocketpack_stomp", "Thermal Thruster"),
    ("axtinguisher", "Axtinguisher"),
    ("mailbox", "Axtinguisher"),
    ("sledgehammer", "Homewrecker"),
    ("the_maul", "Homewrecker"),
    ("powerjack", "Powerjack"),
    ("thirddegree", "Third Degree"),
    ("back_scratcher", "Back Scratcher"),
    ("lava_axe", "Sharpened Volcano Fragment"),
    ("annihilator", "Neon Annihilator"),
    ("hot_hand", "Hot Hand"),
];

const DEMOMAN_KILL_NAMES: &[(&str, &str)] = &[
    ("iron_bomber", "Iron Bomber"),
    ("loose_cannon", "Loose Cannon"),
    ("loch_n_load", "Loch-n-Load"),
    ("sticky_resistance", "Scottish Resistance"),
    ("quickiebomb_launcher", "Quickiebomb Launcher"),
    ("demoshield", "Chargin' Targe"),
    ("splendid_screen", "Splendid Screen"),
    ("tide_turner", "Tide Turner"),
    ("ullapool_caber", "Ullapool Caber"),
    ("ullapool_caber_explosion", "Ullapool Caber"),
    ("battleaxe", "Scotsman's Skullcutter"),
    ("paintrain", "Pain Train"),
    ("claidheamohmor", "Claidheamh Mor"),
    ("demokatana", "Half-Zatoichi"),
    ("sword", "Eyelander"),
    ("headtaker", "Eyelander"),
    ("nessieclub", "Eyelander"),
    ("persian_persuader", "Persian Persuader"),
];

const HEAVY_KILL_NAMES: &[(&str, &str)] = &[
    ("natascha", "Natascha"),
    ("tomislav", "Tomislav"),
    ("brass_beast", "Brass Beast"),
    ("long_heatmaker", "Huo-Long Heater"),
    ("panic_attack", "Panic Attack"),
    ("family_business", "Family Business"),
    ("holiday_punch", "Holiday Punch"),
    ("warrior_spirit", "Warrior's Spirit"),
    ("steel_fists", "Fists of Steel"),
    ("gloves", "Killing Gloves of Boxing"),
    ("gloves_running_urgently", "Gloves of Running Urgently"),
    ("eviction_notice", "Eviction Notice"),
];

const ENGINEER_KILL_NAMES: &[(&str, &str)] = &[
    ("rescue_ranger", "Rescue Ranger"),
    ("widowmaker", "Widowmaker"),
    ("pomson", "Pomson 6000"),
    ("frontier_justice", "Frontier Justice"),
    ("panic_attack", "Panic Attack"),
    ("short_circuit", "Short Circuit"),
    ("tf_projectile_mechanicalarmorb", "Short Circuit"),
    ("eureka_effect", "Eureka Effect"),
    ("wrench_jag", "Jag"),
    ("robot_arm_kill", "Gunslinger"),
    ("robot_arm_combo_kill", "Gunslinger"),
    ("robot_arm_blender_kill", "Gunslinger"),
    ("southern_hospitality", "Southern Hospitality"),
];

const MEDIC_KILL_NAMES: &[(&str, &str)] = &[
    ("blutsauger", "Blutsauger"),
    ("proto_syringe", "Overdose"),
    ("crusaders_crossbow", "Crusader's Crossbow"),
    ("ubersaw", "Ubersaw"),
    ("solemn_vow", "Solemn Vow"),
    ("amputator", "Amputator"),
    ("battleneedle", "Vita-Saw"),
];

const SNIPER_KILL_NAMES: &[(&str, &str)] = &[
    ("pro_rifle", "Hitman's Heatmaker"),
    ("machina", "Machina"),
    ("player_penetration", "Machina"),
    ("sydney_sleeper", "Sydney Sleeper"),
    ("tf_projectile_arrow", "Huntsman"),
    ("bazaar_bargain", "Bazaar Bargain"),
    ("the_classic", "Classic"),
    ("pro_smg", "Cleaner's Carbine"),
    ("bushwacka", "Bushwacka"),
    ("tribalkukri", "Tribalman's Shiv"),
    ("shahanshah", "Shahanshah"),
];

const SPY_KILL_NAMES: &[(&str, &str)] = &[
    ("diamondback", "Diamondback"),
    ("ambassador", "Ambassador"),
    ("enforcer", "Enforcer"),
    ("letranger", "L'Etranger"),
    ("kunai", "Conniver's Kunai"),
    ("big_earner", "Big Earner"),
    ("spy_cicle", "Spy-cicle"),
    ("eternal_reward", "Your Eternal Reward"),
];

/// Weapons trackable under more than one class. They are deliberately absent
/// from the weapon → owning-class index and get their own id ranges.
pub const MULTICLASS_WEAPONS: &[&str] = &[
    "Half-Zatoichi",
    "Reserve Shooter",
    "Panic Attack",
];

pub const KNIVES: &[&str] = &[
    "Conniver's Kunai",
    "Big Earner",
    "Spy-cicle",
    "Your Eternal Reward",
];

pub const SWORDS: &[&str] = &[
    "Half-Zatoichi",
    "Eyelander",
    "Scotsman's Skullcutter",
    "Claidheamh Mor",
    "Persian Persuader",
];

/// The melee list the pool filters work from. It is not exhaustive (stock
/// melee weapons never produce distinct kill tokens, and a few unlocks like
/// the Candy Cane and the Ullapool Caber were never added to it).
pub const MELEE_WEAPONS: &[&str] = &[
    "Conniver's Kunai",
    "Big Earner",
    "Spy-cicle",
    "Your Eternal Reward",
    "Half-Zatoichi",
    "Eyelander",
    "Scotsman's Skullcutter",
    "Claidheamh Mor",
    "Persian Persuader",
    "Sandman",
    "Atomizer",
    "Boston Basher",
    "Fan O'War",
    "Holy Mackerel",
    "Wrap Assassin",
    "Sun-on-a-Stick",
    "Escape Plan",
    "Pain Train",
    "Equalizer",
    "Disciplinary Action",
    "Market Gardener",
    "Axtinguisher",
    "Homewrecker",
    "Powerjack",
    "Third Degree",
    "Back Scratcher",
    "Sharpened Volcano Fragment",
    "Neon Annihilator",
    "Hot Hand",
];

struct WeaponIndex {
    /// single-class weapons only; first table in class order wins
    owning_class: HashMap<&'static str, Class>,
    /// per-class multiclass membership, indexed by class index
    multiclass: [Vec<&'static str>; 10],
    /// every distinct display name, in table order
    weapons: Vec<&'static str>,
}

fn weapon_index() -> &'static WeaponIndex {
    static INDEX: OnceLock<WeaponIndex> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut owning_class = HashMap::new();
        let mut multiclass: [Vec<&'static str>; 10] = Default::default();
        let mut weapons = Vec::new();
        for class in Class::ALL {
            for &(_, weapon) in class.kill_names() {
                if !weapons.contains(&weapon) {
                    weapons.push(weapon);
                }
                if MULTICLASS_WEAPONS.contains(&weapon) {
                    let list = &mut multiclass[class.index() as usize];
                    if !list.contains(&weapon) {
                        list.push(weapon);
                    }
                } else {
                    owning_class.entry(weapon).or_insert(class);
                }
            }
        }
        WeaponIndex { owning_class, multiclass, weapons }
    })
}

/// The class a single-class weapon belongs to. `None` for multiclass weapons
/// and unknown names.
pub fn weapon_class(weapon: &str) -> Option<Class> {
    weapon_index().owning_class.get(weapon).copied()
}

pub fn is_multiclass(weapon: &str) -> bool {
    MULTICLASS_WEAPONS.contains(&weapon)
}

/// Whether kills as `class` can count toward `weapon`'s objectives.
pub fn class_uses_weapon(class: Class, weapon: &str) -> bool {
    weapon_class(weapon) == Some(class) || weapon_index().multiclass[class.index() as usize].iter().any(|&w| w == weapon)
}

/// Every distinct weapon display name, in table order.
pub fn all_weapons() -> &'static [&'static str] {
    &weapon_index().weapons
}

/// Canonical display name for a raw kill-log token, scanning the class tables
/// in class order. `None` for tokens no table knows about.
pub fn resolve_kill_token(token: &str) -> Option<&'static str> {
    Class::ALL.into_iter()
        .flat_map(|class| class.kill_names())
        .find(|&&(t, _)| t == token)
        .map(|&(_, weapon)| weapon)
}

/// One parsed kill-log line. `weapon` is the canonical display name, or empty
/// when the token is unknown and the kill stays unattributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillInfo {
    pub attacker: String,
    pub victim: String,
    pub weapon: &'static str,
    pub weapon_internal: String,
    pub crit: bool,
}

/// Parses `"<attacker> killed <victim> with <token>.[ (crit)]"`. The attacker
/// ends at the first ` killed `, the victim at the last ` with ` (player names
/// may themselves contain either phrase).
pub fn parse_kill_line(line: &str) -> Option<KillInfo> {
    let (line, crit) = match line.strip_suffix(" (crit)") {
        Some(rest) => (rest, true),
        None => (line, false),
    };
    let (_, attacker, victim, token) = regex_captures!(r"^(.+?) killed (.+) with ([^.]+)\.$", line)?;
    Some(KillInfo {
        attacker: attacker.to_owned(),
        victim: victim.to_owned(),
        weapon: resolve_kill_token(token).unwrap_or(""),
        weapon_internal: token.to_owned(),
        crit,
    })
}

/// Detects class changes from config execution traces in the console log
/// (`heavyweapons.cfg` is the historical name of Heavy's config).
pub fn class_from_config_line(line: &str) -> Option<Class> {
    if !line.contains("not executing.") && !line.contains("execing") {
        return None
    }
    if line.contains("scout.cfg") {
        Some(Class::Scout)
    } else if line.contains("soldier.cfg") {
        Some(Class::Soldier)
    } else if line.contains("pyro.cfg") {
        Some(Class::Pyro)
    } else if line.contains("demoman.cfg") {
        Some(Class::Demoman)
    } else if line.contains("heavyweapons.cfg") || line.contains("heavy.cfg") {
        Some(Class::Heavy)
    } else if line.contains("engineer.cfg") {
        Some(Class::Engineer)
    } else if line.contains("medic.cfg") {
        Some(Class::Medic)
    } else if line.contains("sniper.cfg") {
        Some(Class::Sniper)
    } else if line.contains("spy.cfg") {
        Some(Class::Spy)
    } else {
        None
    }
}
