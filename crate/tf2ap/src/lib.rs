use {
    std::{
        collections::BTreeMap,
        io::{
            self,
            Write,
        },
    },
    itertools::Itertools as _,
    rand::prelude::*,
    rand_chacha::ChaCha8Rng,
    serde::{
        Deserialize,
        Serialize,
    },
    crate::{
        data::{
            Class,
            KNIVES,
            MELEE_WEAPONS,
            SWORDS,
        },
        ids::{
            item_id,
            location_id,
        },
        options::{
            MeleeWeaponRules,
            Options,
        },
    },
};

pub mod data;
pub mod ids;
pub mod options;
pub mod progress;
pub mod protocol;

pub const GAME_NAME: &str = "Team Fortress 2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClassification {
    Progression,
    Filler,
    Trap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    /// `None` for event items that never enter the pool (Contract Point)
    pub code: Option<i64>,
    pub classification: ItemClassification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    /// `None` for contract point locations, which are locked and never checked over the wire
    pub code: Option<i64>,
    /// weapon item that must be possessed before this location can be checked
    pub requires_weapon: Option<&'static str>,
    pub locked_item: Option<Item>,
}

/// One per allowed class; entering it requires the class unlock item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub requires_class: Class,
    pub locations: Vec<Location>,
}

/// The slot configuration handed to the client on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlotData {
    #[serde(rename = "WeaponKillCounts")]
    pub weapon_kill_counts: BTreeMap<String, u32>,
    #[serde(rename = "ClassKillCounts")]
    pub class_kill_counts: BTreeMap<String, u32>,
    #[serde(rename = "RequiredContractPoints")]
    pub required_contract_points: u32,
    #[serde(rename = "DeathLinkAmnesty")]
    pub death_link_amnesty: u32,
    #[serde(rename = "DeathLink")]
    pub death_link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenError {
    #[error(transparent)] Id(#[from] ids::IdError),
    #[error("AllowedClasses must not be empty")]
    NoClasses,
    #[error("unknown class name {0:?} in AllowedClasses list")]
    UnknownClass(String),
    #[error("invalid weapon name: {0}")]
    UnknownWeapon(String),
}

/// A fully generated world: a fixed objective set and item pool for one seed
/// and configuration. Generation is a single pass — any contract violation is
/// a fatal `GenError`, there are no retries.
pub struct Tf2World {
    options: Options,
    rng: ChaCha8Rng,
    pub allowed_classes: Vec<Class>,
    pub starting_class: Class,
    pub available_weapons: Vec<&'static str>,
    pub regions: Vec<Region>,
    pub itempool: Vec<Item>,
    pub precollected: Vec<Item>,
    /// checkable locations — contract point locations are not counted here
    pub total_locations: u32,
    /// objective targets (one per class sequence, one per weapon sequence)
    pub total_objectives: u32,
    pub class_kill_counts: BTreeMap<String, u32>,
    pub weapon_kill_counts: BTreeMap<String, u32>,
}

impl Tf2World {
    pub fn generate(options: Options, seed: u64) -> Result<Self, GenError> {
        let mut world = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            allowed_classes: Vec::default(),
            starting_class: Class::Unknown,
            available_weapons: Vec::default(),
            regions: Vec::default(),
            itempool: Vec::default(),
            precollected: Vec::default(),
            total_locations: 0,
            total_objectives: 0,
            class_kill_counts: BTreeMap::default(),
            weapon_kill_counts: BTreeMap::default(),
            options,
        };
        world.generate_early()?;
        world.create_regions()?;
        world.create_items()?;
        Ok(world)
    }

    fn generate_early(&mut self) -> Result<(), GenError> {
        for weapon in &self.options.banned_weapons {
            if !data::all_weapons().iter().any(|known| known == weapon) {
                return Err(GenError::UnknownWeapon(weapon.clone()))
            }
        }
        self.allowed_classes = self.options.allowed_classes.iter()
            .map(|name| Class::from_name(name).ok_or_else(|| GenError::UnknownClass(name.clone())))
            .try_collect()?;
        if self.allowed_classes.is_empty() {
            return Err(GenError::NoClasses)
        }
        self.starting_class = match self.options.starting_class.class() {
            Some(class) => class,
            None => *self.allowed_classes.choose(&mut self.rng).expect("checked nonempty"),
        };
        self.precollected.push(self.create_item(self.starting_class.name())?);
        self.init_available_weapons();
        Ok(())
    }

    /// Builds the available-weapon set: seeded shuffle per class, greedy fill
    /// against a per-class cap, then a global shuffle followed by either
    /// truncation or the even-distribution pass.
    fn init_available_weapons(&mut self) {
        let lo = self.options.min_weapons_in_pool.min(self.options.max_weapons_in_pool);
        let hi = self.options.min_weapons_in_pool.max(self.options.max_weapons_in_pool);
        let weapon_count = self.rng.random_range(lo..=hi);
        // the cap is deliberately left unrounded when splitting evenly — the
        // greedy loop compares an integer count against the quotient
        let max_per_class = if self.options.even_weapon_counts {
            f64::from(weapon_count) / self.allowed_classes.len() as f64
        } else {
            f64::from(weapon_count)
        };
        let mut per_class_counts = BTreeMap::default();
        for &class in &self.allowed_classes.clone() {
            let mut class_weapons = class.kill_names().iter().map(|&(_, weapon)| weapon).collect_vec();
            class_weapons.shuffle(&mut self.rng);
            let mut count = 0u32;
            for weapon in class_weapons {
                if self.available_weapons.contains(&weapon) || self.options.banned_weapons.iter().any(|banned| banned == weapon) {
                    continue
                }
                match self.options.melee_weapon_rules {
                    MeleeWeaponRules::AllowAll => {}
                    MeleeWeaponRules::DisallowAll => if MELEE_WEAPONS.contains(&weapon) { continue },
                    rules => {
                        if KNIVES.contains(&weapon) && !rules.allows_knives() || SWORDS.contains(&weapon) && !rules.allows_swords() {
                            continue
                        }
                    }
                }
                self.available_weapons.push(weapon);
                count += 1;
                per_class_counts.insert(class, count);
                if f64::from(count) >= max_per_class {
                    break
                }
            }
        }
        self.available_weapons.shuffle(&mut self.rng);
        if self.options.even_weapon_counts {
            self.redistribute_weapons(per_class_counts);
        } else if self.available_weapons.len() > weapon_count as usize {
            self.available_weapons.truncate(weapon_count as usize);
        }
    }

    /// Removes weapons from classes sitting above the arithmetic mean of the
    /// per-class counts, cycling a shuffled class order. A class leaves the
    /// rotation once at or below the mean, or once it has no removable
    /// single-class weapon left (multiclass weapons are never attributed to a
    /// class here, so they are never removed).
    fn redistribute_weapons(&mut self, mut per_class_counts: BTreeMap<Class, u32>) {
        if per_class_counts.is_empty() {
            return
        }
        let average = per_class_counts.values().map(|&count| f64::from(count)).sum::<f64>() / per_class_counts.len() as f64;
        let mut cycle = self.allowed_classes.clone();
        cycle.shuffle(&mut self.rng);
        let mut index = 0;
        while !per_class_counts.is_empty() {
            let current = cycle[index];
            let Some(&count) = per_class_counts.get(&current) else {
                index = (index + 1) % cycle.len();
                continue
            };
            if f64::from(count) <= average {
                per_class_counts.remove(&current);
                continue
            }
            if let Some(pos) = self.available_weapons.iter().position(|&weapon| data::weapon_class(weapon) == Some(current)) {
                self.available_weapons.remove(pos);
                per_class_counts.insert(current, count - 1);
                index = (index + 1) % cycle.len();
            } else {
                per_class_counts.remove(&current);
            }
        }
    }

    fn create_regions(&mut self) -> Result<(), GenError> {
        let general_lo = self.options.general_kill_objective_count_min.min(self.options.general_kill_objective_count_max);
        let general_hi = self.options.general_kill_objective_count_min.max(self.options.general_kill_objective_count_max);
        let weapon_lo = self.options.weapon_kill_objective_count_min.min(self.options.weapon_kill_objective_count_max);
        let weapon_hi = self.options.weapon_kill_objective_count_min.max(self.options.weapon_kill_objective_count_max);
        let available = self.available_weapons.clone();
        let mut realised = Vec::new();
        for &class in &self.allowed_classes.clone() {
            let mut region = Region {
                name: format!("{} Objectives", class.name()),
                requires_class: class,
                locations: Vec::default(),
            };
            region.locations.push(contract_point_location(class.name(), None));
            self.total_objectives += 1;
            let count = self.rng.random_range(general_lo..=general_hi);
            self.class_kill_counts.entry(class.name().to_owned()).or_insert(count);
            let base = location_id(class.name())?;
            for i in 0..count {
                region.locations.push(Location {
                    name: format!("{} General Kill #{}", class.name(), i + 1),
                    code: Some(base + i64::from(i)),
                    requires_weapon: None,
                    locked_item: None,
                });
                self.total_locations += 1;
            }
            for &weapon in &available {
                if !class.kill_names().iter().any(|&(_, name)| name == weapon) || realised.contains(&weapon) {
                    continue
                }
                realised.push(weapon);
                let count = self.rng.random_range(weapon_lo..=weapon_hi);
                self.weapon_kill_counts.entry(weapon.to_owned()).or_insert(count);
                let base = location_id(weapon)?;
                for i in 0..count {
                    region.locations.push(Location {
                        name: format!("{weapon} Kill #{}", i + 1),
                        code: Some(base + i64::from(i)),
                        requires_weapon: Some(weapon),
                        locked_item: None,
                    });
                    self.total_locations += 1;
                }
                region.locations.push(contract_point_location(weapon, Some(weapon)));
                self.total_objectives += 1;
            }
            self.regions.push(region);
        }
        Ok(())
    }

    fn create_items(&mut self) -> Result<(), GenError> {
        let mut items = Vec::default();
        for &class in &self.allowed_classes {
            if class != self.starting_class {
                items.push(self.create_item(class.name())?);
            }
        }
        // class-table order, not pool order
        let mut weapon_itempool = Vec::new();
        for &class in &self.allowed_classes {
            for &(_, weapon) in class.kill_names() {
                if self.available_weapons.contains(&weapon) && !weapon_itempool.contains(&weapon) {
                    weapon_itempool.push(weapon);
                }
            }
        }
        for weapon in weapon_itempool {
            items.push(self.create_item(weapon)?);
            if items.len() >= self.total_locations as usize {
                // too many weapons vs available locations: the rest stay
                // checkable but are never placed as items
                break
            }
        }
        while items.len() < self.total_locations as usize {
            let name = if self.options.trap_chance > 0 && self.rng.random_range(1..=100) <= self.options.trap_chance {
                let traps = [
                    ("Killbind Trap", self.options.killbind_trap_weight),
                    ("Disconnect Trap", self.options.disconnect_trap_weight),
                    ("Paranoia Trap", self.options.paranoia_trap_weight),
                    ("snd_restart Trap", self.options.snd_restart_trap_weight),
                ];
                // all-zero weights fall back to a hint
                traps.choose_weighted(&mut self.rng, |&(_, weight)| weight).map(|&(name, _)| name).unwrap_or("Contract Hint")
            } else {
                "Contract Hint"
            };
            items.push(self.create_item(name)?);
        }
        self.itempool = items;
        Ok(())
    }

    pub fn create_item(&self, name: &str) -> Result<Item, GenError> {
        let classification = if name == "Contract Hint" {
            ItemClassification::Filler
        } else if name.contains("Trap") {
            ItemClassification::Trap
        } else {
            ItemClassification::Progression
        };
        Ok(Item {
            name: name.to_owned(),
            code: Some(item_id(name)?),
            classification,
        })
    }

    /// The completion predicate over accumulated contract points.
    pub fn set_rules(&self) -> impl Fn(u32) -> bool {
        let required = self.required_contract_points();
        move |points| points >= required
    }

    pub fn filler_item_name() -> &'static str {
        "Contract Hint"
    }

    pub fn required_contract_points(&self) -> u32 {
        self.total_objectives * self.options.contract_point_requirement / 100
    }

    pub fn fill_slot_data(&self) -> SlotData {
        SlotData {
            weapon_kill_counts: self.weapon_kill_counts.clone(),
            class_kill_counts: self.class_kill_counts.clone(),
            required_contract_points: self.required_contract_points(),
            death_link_amnesty: self.options.death_link_amnesty,
            death_link: self.options.death_link,
        }
    }

    pub fn write_spoiler(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "Total Weapons: {}", self.available_weapons.len())?;
        writeln!(writer, "Total Objectives: {}", self.total_objectives)?;
        write!(writer, "Contract Points Required: {}", self.required_contract_points())
    }
}

fn contract_point_location(target: &str, requires_weapon: Option<&'static str>) -> Location {
    Location {
        name: format!("Contract Point - {target} Kills"),
        code: None,
        requires_weapon,
        locked_item: Some(Item {
            name: format!("Contract Point"),
            code: None,
            classification: ItemClassification::Progression,
        }),
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::options::StartingClass,
        super::*,
    };

    fn owned_count(world: &Tf2World, class: Class) -> usize {
        world.available_weapons.iter().filter(|&&weapon| data::weapon_class(weapon) == Some(class)).count()
    }

    #[test]
    fn generation_is_reproducible() {
        let a = Tf2World::generate(Options::default(), 0x7f2).expect("generation should succeed");
        let b = Tf2World::generate(Options::default(), 0x7f2).expect("generation should succeed");
        assert_eq!(a.starting_class, b.starting_class);
        assert_eq!(a.available_weapons, b.available_weapons);
        assert_eq!(a.class_kill_counts, b.class_kill_counts);
        assert_eq!(a.weapon_kill_counts, b.weapon_kill_counts);
        assert_eq!(a.regions, b.regions);
        assert_eq!(a.itempool, b.itempool);
    }

    #[test]
    fn sequences_are_contiguous() {
        let world = Tf2World::generate(Options::default(), 7).expect("generation should succeed");
        let locations = world.regions.iter().flat_map(|region| &region.locations).collect::<Vec<_>>();
        for (weapon, &count) in &world.weapon_kill_counts {
            let base = location_id(weapon).expect("pool weapon id");
            for i in 0..count {
                let name = format!("{weapon} Kill #{}", i + 1);
                let location = locations.iter().find(|location| location.name == name).expect("sequence location missing");
                assert_eq!(location.code, Some(base + i64::from(i)));
                assert_eq!(location.requires_weapon, Some(weapon.as_str()));
            }
            assert!(!locations.iter().any(|location| location.name == format!("{weapon} Kill #{}", count + 1)));
            assert!(locations.iter().any(|location| location.name == format!("Contract Point - {weapon} Kills")));
        }
        for (class, &count) in &world.class_kill_counts {
            let base = location_id(class).expect("class id");
            for i in 0..count {
                let name = format!("{class} General Kill #{}", i + 1);
                let location = locations.iter().find(|location| location.name == name).expect("sequence location missing");
                assert_eq!(location.code, Some(base + i64::from(i)));
            }
            assert!(!locations.iter().any(|location| location.name == format!("{class} General Kill #{}", count + 1)));
        }
        assert_eq!(world.total_locations as usize, locations.iter().filter(|location| location.code.is_some()).count());
        assert_eq!(world.total_objectives as usize, locations.iter().filter(|location| location.code.is_none()).count());
    }

    #[test]
    fn itempool_fills_to_location_count() {
        let world = Tf2World::generate(Options::default(), 31).expect("generation should succeed");
        assert_eq!(world.itempool.len(), world.total_locations as usize);
        // the starting class is precollected, never pooled
        assert!(!world.itempool.iter().any(|item| item.name == world.starting_class.name()));
        assert_eq!(world.precollected.len(), 1);
        assert_eq!(world.precollected[0].name, world.starting_class.name());
        for banned in &world.options.banned_weapons {
            assert!(!world.available_weapons.iter().any(|weapon| weapon == banned));
            assert!(!world.itempool.iter().any(|item| &item.name == banned));
        }
        for item in &world.itempool {
            if item.name == "Contract Hint" {
                assert_eq!(item.classification, ItemClassification::Filler);
            } else if item.name.contains("Trap") {
                assert_eq!(item.classification, ItemClassification::Trap);
            } else {
                assert_eq!(item.classification, ItemClassification::Progression);
            }
        }
    }

    #[test]
    fn trap_weights_respect_zeroes() {
        let options = Options {
            trap_chance: 100,
            killbind_trap_weight: 1,
            paranoia_trap_weight: 0,
            disconnect_trap_weight: 0,
            snd_restart_trap_weight: 0,
            ..Options::default()
        };
        let world = Tf2World::generate(options, 5).expect("generation should succeed");
        let fillers = world.itempool.iter().filter(|item| item.classification != ItemClassification::Progression).collect::<Vec<_>>();
        assert!(!fillers.is_empty());
        assert!(fillers.iter().all(|item| item.name == "Killbind Trap"));
    }

    #[test]
    fn all_zero_trap_weights_fall_back_to_hints() {
        let options = Options {
            trap_chance: 100,
            paranoia_trap_weight: 0,
            ..Options::default()
        };
        let world = Tf2World::generate(options, 5).expect("generation should succeed");
        let fillers = world.itempool.iter().filter(|item| item.classification != ItemClassification::Progression).collect::<Vec<_>>();
        assert!(!fillers.is_empty());
        assert!(fillers.iter().all(|item| item.name == "Contract Hint"));
    }

    #[test]
    fn melee_policies_filter_the_pool() {
        let options = Options {
            melee_weapon_rules: MeleeWeaponRules::DisallowAll,
            banned_weapons: Vec::default(),
            ..Options::default()
        };
        let world = Tf2World::generate(options, 11).expect("generation should succeed");
        assert!(world.available_weapons.iter().all(|weapon| !MELEE_WEAPONS.contains(weapon)));

        let options = Options {
            melee_weapon_rules: MeleeWeaponRules::AllowKnivesOnly,
            banned_weapons: Vec::default(),
            ..Options::default()
        };
        let world = Tf2World::generate(options, 11).expect("generation should succeed");
        assert!(world.available_weapons.iter().all(|weapon| !SWORDS.contains(weapon)));
    }

    #[test]
    fn even_distribution_trims_to_the_mean() {
        // Scout can fill its 5.5 cap (6 weapons), Medic only has 3 eligible
        // weapons left, so the mean is 4.5 and Scout gets trimmed to 4.
        let options = Options {
            allowed_classes: vec![format!("Scout"), format!("Medic")],
            starting_class: StartingClass::Scout,
            banned_weapons: vec![format!("Blutsauger"), format!("Overdose"), format!("Crusader's Crossbow"), format!("Ubersaw")],
            min_weapons_in_pool: 11,
            max_weapons_in_pool: 11,
            even_weapon_counts: true,
            ..Options::default()
        };
        for seed in 0..4 {
            let world = Tf2World::generate(options.clone(), seed).expect("generation should succeed");
            assert_eq!(owned_count(&world, Class::Scout), 4);
            assert_eq!(owned_count(&world, Class::Medic), 3);
            assert_eq!(world.available_weapons.len(), 7);
        }
    }

    #[test]
    fn uneven_pools_truncate_to_the_sampled_size() {
        let options = Options {
            even_weapon_counts: false,
            min_weapons_in_pool: 12,
            max_weapons_in_pool: 12,
            ..Options::default()
        };
        let world = Tf2World::generate(options, 3).expect("generation should succeed");
        assert_eq!(world.available_weapons.len(), 12);
    }

    #[test]
    fn goal_requires_the_floored_percentage() {
        let world = Tf2World::generate(Options::default(), 23).expect("generation should succeed");
        assert_eq!(world.required_contract_points(), world.total_objectives * 75 / 100);
        let done = world.set_rules();
        assert!(!done(world.required_contract_points() - 1));
        assert!(done(world.required_contract_points()));
    }

    #[test]
    fn invalid_configuration_fails_generation() {
        let options = Options {
            banned_weapons: vec![format!("Gravel")],
            ..Options::default()
        };
        assert_eq!(Tf2World::generate(options, 0).err(), Some(GenError::UnknownWeapon(format!("Gravel"))));

        let options = Options {
            allowed_classes: vec![format!("Civilian")],
            banned_weapons: Vec::default(),
            ..Options::default()
        };
        assert_eq!(Tf2World::generate(options, 0).err(), Some(GenError::UnknownClass(format!("Civilian"))));
    }

    #[test]
    fn slot_data_round_trips() {
        let world = Tf2World::generate(Options::default(), 17).expect("generation should succeed");
        let slot_data = world.fill_slot_data();
        let json = serde_json::to_string(&slot_data).expect("serializable");
        assert_eq!(serde_json::from_str::<SlotData>(&json).expect("deserializable"), slot_data);
        assert_eq!(slot_data.required_contract_points, world.required_contract_points());
    }

    #[test]
    fn spoiler_summary() {
        let world = Tf2World::generate(Options::default(), 2).expect("generation should succeed");
        let mut out = Vec::new();
        world.write_spoiler(&mut out).expect("in-memory write");
        let text = String::from_utf8(out).expect("utf-8");
        assert!(text.contains("Total Objectives:"));
        assert!(text.contains("Contract Points Required:"));
    }
}
