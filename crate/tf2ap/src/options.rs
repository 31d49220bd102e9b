use {
    serde::Deserialize,
    crate::data::Class,
};

/// Largest value the general-kill objective count options accept; the data
/// package enumerates location names up to it.
pub const GENERAL_KILL_OBJECTIVE_COUNT_RANGE_END: u32 = 15;
/// Largest value the weapon-kill objective count options accept.
pub const WEAPON_KILL_OBJECTIVE_COUNT_RANGE_END: u32 = 10;

/// Generation configuration, fixed at world-setup time. Field names follow
/// the option names players put in their settings files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Options {
    pub allowed_classes: Vec<String>,
    pub starting_class: StartingClass,
    pub banned_weapons: Vec<String>,
    /// percentage of objective targets whose contract points are required to goal
    pub contract_point_requirement: u32,
    pub min_weapons_in_pool: u32,
    pub max_weapons_in_pool: u32,
    pub general_kill_objective_count_min: u32,
    pub general_kill_objective_count_max: u32,
    pub weapon_kill_objective_count_min: u32,
    pub weapon_kill_objective_count_max: u32,
    pub even_weapon_counts: bool,
    pub melee_weapon_rules: MeleeWeaponRules,
    /// percent chance for a filler slot to hold a trap instead of a hint
    pub trap_chance: u32,
    pub paranoia_trap_weight: u32,
    pub killbind_trap_weight: u32,
    pub disconnect_trap_weight: u32,
    pub snd_restart_trap_weight: u32,
    pub death_link: bool,
    pub death_link_amnesty: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allowed_classes: Class::ALL.iter().map(|class| class.name().to_owned()).collect(),
            starting_class: StartingClass::RandomClass,
            banned_weapons: DEFAULT_BANNED_WEAPONS.iter().map(|&weapon| weapon.to_owned()).collect(),
            contract_point_requirement: 75,
            min_weapons_in_pool: 20,
            max_weapons_in_pool: 25,
            general_kill_objective_count_min: 3,
            general_kill_objective_count_max: 4,
            weapon_kill_objective_count_min: 2,
            weapon_kill_objective_count_max: 3,
            even_weapon_counts: true,
            melee_weapon_rules: MeleeWeaponRules::AllowAll,
            trap_chance: 0,
            paranoia_trap_weight: 40,
            killbind_trap_weight: 0,
            disconnect_trap_weight: 0,
            snd_restart_trap_weight: 0,
            death_link: false,
            death_link_amnesty: 3,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingClass {
    Scout,
    Soldier,
    Pyro,
    Demoman,
    Heavy,
    Engineer,
    Medic,
    Sniper,
    Spy,
    #[default]
    RandomClass,
}

impl StartingClass {
    /// `None` means "pick uniformly among the allowed classes".
    pub fn class(&self) -> Option<Class> {
        match self {
            Self::Scout => Some(Class::Scout),
            Self::Soldier => Some(Class::Soldier),
            Self::Pyro => Some(Class::Pyro),
            Self::Demoman => Some(Class::Demoman),
            Self::Heavy => Some(Class::Heavy),
            Self::Engineer => Some(Class::Engineer),
            Self::Medic => Some(Class::Medic),
            Self::Sniper => Some(Class::Sniper),
            Self::Spy => Some(Class::Spy),
            Self::RandomClass => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeleeWeaponRules {
    #[default]
    AllowAll,
    DisallowAll,
    AllowKnivesOnly,
    AllowSwordsOnly,
    AllowKnivesAndSwordsOnly,
}

impl MeleeWeaponRules {
    pub fn allows_knives(&self) -> bool {
        matches!(self, Self::AllowAll | Self::AllowKnivesOnly | Self::AllowKnivesAndSwordsOnly)
    }

    pub fn allows_swords(&self) -> bool {
        matches!(self, Self::AllowAll | Self::AllowSwordsOnly | Self::AllowKnivesAndSwordsOnly)
    }
}

/// Weapons excluded from the pool unless a settings file says otherwise —
/// mostly unlocks whose kills are impractical to grind on demand.
const DEFAULT_BANNED_WEAPONS: &[&str] = &[
    "Flying Guillotine",
    "Wrap Assassin",
    "Fan O'War",
    "Atomizer",
    "Sun-on-a-Stick",
    "Candy Cane",
    "Boston Basher",
    "Mantreads",
    "Righteous Bison",
    "Market Gardener",
    "Escape Plan",
    "Pain Train",
    "Thermal Thruster",
    "Detonator",
    "Homewrecker",
    "Sharpened Volcano Fragment",
    "Chargin' Targe",
    "Splendid Screen",
    "Tide Turner",
    "Gloves of Running Urgently",
    "Eviction Notice",
    "Pomson 6000",
    "Rescue Ranger",
    "Short Circuit",
    "Jag",
    "Overdose",
    "Amputator",
    "Classic",
    "Cleaner's Carbine",
    "Tribalman's Shiv",
    "Shahanshah",
    "L'Etranger",
];
