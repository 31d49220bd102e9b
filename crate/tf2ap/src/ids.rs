use {
    std::collections::HashMap,
    crate::{
        data::{
            self,
            Class,
        },
        options::{
            GENERAL_KILL_OBJECTIVE_COUNT_RANGE_END,
            WEAPON_KILL_OBJECTIVE_COUNT_RANGE_END,
        },
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("can't derive an item id for {0:?}")]
    UnknownItem(String),
    #[error("can't derive a location id for {0:?}")]
    UnknownLocation(String),
}

/// Checksum-style derivation base: the sum of the byte values of the display
/// name, spaces and punctuation included. Not a hash — kept bit-compatible
/// with ids already persisted by existing seeds.
fn ascii_sum(name: &str) -> i64 {
    name.bytes().map(i64::from).sum()
}

/// Stable location id for a class or weapon name. Classes get `index * 100`
/// (100 slots each for their general-kill sequence), multiclass weapons
/// `20000 + ascii_sum`, other weapons `owning class index * 10000 + ascii_sum`.
/// The sequence index is added on top by the caller.
///
/// The literal overrides below relocate names whose derived sequence ranges
/// would land inside another weapon's (Reflect/Hot Hand, Mantreads/Direct Hit,
/// Air Strike/Equalizer, Widowmaker/Gunslinger, Manmelter/Powerjack). This is
/// a closed list, not a collision detector — a newly added weapon that
/// collides would do so silently.
//TODO derive the override list from a collision scan over the tables instead of maintaining it by hand
pub fn location_id(name: &str) -> Result<i64, IdError> {
    match name {
        "Hot Hand" => return Ok(30725),
        "Manmelter" => return Ok(30960),
        "Equalizer" => return Ok(20900),
        "Gunslinger" => return Ok(61000),
        "Direct Hit" => return Ok(62000),
        _ => {}
    }
    if let Some(class) = Class::from_name(name) {
        return Ok(class.index() * 100)
    }
    if data::is_multiclass(name) {
        Ok(20000 + ascii_sum(name))
    } else if let Some(class) = data::weapon_class(name) {
        Ok(class.index() * 10000 + ascii_sum(name))
    } else {
        Err(IdError::UnknownLocation(name.to_owned()))
    }
}

/// Stable item id for any placeable item name. Filler and traps are literal
/// constants (55 and 56 are reserved for trap kinds that don't exist yet),
/// class unlocks use the raw class index, multiclass weapons `2000 +
/// ascii_sum`, and other weapons `owning class index * 100 + position`, where
/// position counts entries in the owning class's table (duplicate display
/// names included — table order is part of the contract).
pub fn item_id(name: &str) -> Result<i64, IdError> {
    match name {
        "Contract Hint" => return Ok(50),
        "Killbind Trap" => return Ok(51),
        "Disconnect Trap" => return Ok(52),
        "Paranoia Trap" => return Ok(53),
        "snd_restart Trap" => return Ok(54),
        "Taunt Trap" => return Ok(55),
        "Melee Only Trap" => return Ok(56),
        _ => {}
    }
    if data::is_multiclass(name) {
        return Ok(2000 + ascii_sum(name))
    }
    if let Some(class) = Class::from_name(name) {
        return Ok(class.index())
    }
    let class = data::weapon_class(name).ok_or_else(|| IdError::UnknownItem(name.to_owned()))?;
    let position = class.kill_names().iter()
        .position(|&(_, weapon)| weapon == name)
        .ok_or_else(|| IdError::UnknownItem(name.to_owned()))?;
    Ok(class.index() * 100 + position as i64)
}

/// The full location name → id map for the host data package, enumerating
/// every sequence up to the option range maxima.
pub fn location_ids() -> HashMap<String, i64> {
    let mut ids = HashMap::new();
    for class in Class::ALL {
        if let Ok(base) = location_id(class.name()) {
            for i in 0..GENERAL_KILL_OBJECTIVE_COUNT_RANGE_END {
                ids.entry(format!("{} General Kill #{}", class.name(), i + 1)).or_insert(base + i64::from(i));
            }
        }
    }
    for &weapon in data::all_weapons() {
        if let Ok(base) = location_id(weapon) {
            for i in 0..WEAPON_KILL_OBJECTIVE_COUNT_RANGE_END {
                ids.entry(format!("{weapon} Kill #{}", i + 1)).or_insert(base + i64::from(i));
            }
        }
    }
    ids
}

/// The full item name → id map for the host data package.
pub fn item_ids() -> HashMap<String, i64> {
    let mut ids = HashMap::new();
    for &weapon in data::all_weapons() {
        if let Ok(id) = item_id(weapon) {
            ids.entry(weapon.to_owned()).or_insert(id);
        }
    }
    for class in Class::ALL {
        if let Ok(id) = item_id(class.name()) {
            ids.entry(class.name().to_owned()).or_insert(id);
        }
    }
    for name in ["Contract Hint", "Killbind Trap", "Disconnect Trap", "Paranoia Trap", "snd_restart Trap", "Taunt Trap", "Melee Only Trap"] {
        if let Ok(id) = item_id(name) {
            ids.entry(name.to_owned()).or_insert(id);
        }
    }
    ids
}
