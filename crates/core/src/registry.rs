//! The map registry: every map of the world plus world-level settings, parsed from
//! declarative TOML and validated once so that transitions can never dangle at runtime.

use std::collections::BTreeMap;
use std::error::Error;
use std::{fmt, iter};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::geometry::{Rect, ScreenBounds};
use crate::map::{Map, Transition};
use crate::player::ENCOUNTER_CHANCE_PERCENT;
use crate::types::{GameError, Pos};

const BUILTIN_MAPS: &str = include_str!("../data/kanto.toml");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub screen_width: i32,
    pub screen_height: i32,
    pub start_map: String,
    pub start_x: i32,
    pub start_y: i32,
    #[serde(default = "default_encounter_chance")]
    pub encounter_chance_percent: u32,
}

fn default_encounter_chance() -> u32 {
    ENCOUNTER_CHANCE_PERCENT
}

impl WorldConfig {
    pub fn screen(&self) -> ScreenBounds {
        ScreenBounds { width: self.screen_width, height: self.screen_height }
    }

    pub fn start(&self) -> Pos {
        Pos::new(self.start_x, self.start_y)
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    world: WorldConfig,
    #[serde(default)]
    maps: Vec<Map>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    Parse(String),
    DuplicateMap(String),
    UnknownStartMap(String),
    UnknownTarget { map: String, target: String },
    EmptyRoster(String),
    BadGeometry { map: String, rect: Rect },
    SpawnOutOfBounds { map: String, target: String, spawn: Pos },
    SpawnBlocked { map: String, target: String, spawn: Pos },
    EncounterChance(u32),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Parse(message) => write!(f, "invalid map data: {message}"),
            RegistryError::DuplicateMap(name) => write!(f, "map '{name}' is defined twice"),
            RegistryError::UnknownStartMap(name) => {
                write!(f, "starting map '{name}' is not defined")
            }
            RegistryError::UnknownTarget { map, target } => {
                write!(f, "map '{map}' has a transition to undefined map '{target}'")
            }
            RegistryError::EmptyRoster(name) => {
                write!(f, "map '{name}' has encounter zones but an empty wild roster")
            }
            RegistryError::BadGeometry { map, rect } => {
                write!(f, "map '{map}' has a rectangle with non-positive size: {rect:?}")
            }
            RegistryError::SpawnOutOfBounds { map, target, spawn } => write!(
                f,
                "map '{map}' spawns into '{target}' at ({}, {}) outside its bounds",
                spawn.x, spawn.y
            ),
            RegistryError::SpawnBlocked { map, target, spawn } => write!(
                f,
                "map '{map}' spawns into '{target}' at ({}, {}) inside an obstacle",
                spawn.x, spawn.y
            ),
            RegistryError::EncounterChance(percent) => {
                write!(f, "encounter chance {percent}% is above 100%")
            }
        }
    }
}

impl Error for RegistryError {}

/// Index of a map inside the registry it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapId(usize);

#[derive(Clone, Debug)]
pub struct MapRegistry {
    world: WorldConfig,
    maps: Vec<Map>,
    by_name: BTreeMap<String, MapId>,
    content_hash: u64,
}

impl MapRegistry {
    /// The shipped Kanto maps.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_MAPS)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile =
            toml::from_str(source).map_err(|err| RegistryError::Parse(err.to_string()))?;
        let mut registry = Self::new(file.world, file.maps)?;
        registry.content_hash = xxh3_64(source.as_bytes());
        Ok(registry)
    }

    pub fn new(world: WorldConfig, maps: Vec<Map>) -> Result<Self, RegistryError> {
        let mut by_name = BTreeMap::new();
        for (index, map) in maps.iter().enumerate() {
            if by_name.insert(map.name.clone(), MapId(index)).is_some() {
                return Err(RegistryError::DuplicateMap(map.name.clone()));
            }
        }
        let content_hash = structural_hash(&world, &maps)?;
        let registry = Self { world, maps, by_name, content_hash };
        registry.validate()?;
        Ok(registry)
    }

    pub fn world(&self) -> &WorldConfig {
        &self.world
    }

    pub fn id_of(&self, name: &str) -> Result<MapId, GameError> {
        self.by_name.get(name).copied().ok_or_else(|| GameError::UnknownMap(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&Map, GameError> {
        self.id_of(name).map(|id| self.map(id))
    }

    /// The map behind an id handed out by this registry.
    pub fn map(&self, id: MapId) -> &Map {
        &self.maps[id.0]
    }

    /// Map names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Maps in declaration order.
    pub fn maps(&self) -> impl Iterator<Item = &Map> {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Fingerprint of the map data, recorded in journals so replays run against the same world.
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.world.encounter_chance_percent > 100 {
            return Err(RegistryError::EncounterChance(self.world.encounter_chance_percent));
        }
        let start_map = self
            .get(&self.world.start_map)
            .map_err(|_| RegistryError::UnknownStartMap(self.world.start_map.clone()))?;
        let start = Transition::new(&start_map.name, self.world.start_x, self.world.start_y);
        check_spawn(start_map, &start, "world")?;

        for map in &self.maps {
            check_geometry(map)?;
            if !map.encounter_zones.is_empty() && map.wild_roster.is_empty() {
                return Err(RegistryError::EmptyRoster(map.name.clone()));
            }
            for transition in map.transitions() {
                let target = self.get(&transition.target).map_err(|_| {
                    RegistryError::UnknownTarget {
                        map: map.name.clone(),
                        target: transition.target.clone(),
                    }
                })?;
                check_spawn(target, transition, &map.name)?;
            }
        }
        Ok(())
    }
}

fn check_geometry(map: &Map) -> Result<(), RegistryError> {
    let bounds = map.bounds();
    let door_triggers = map.door_transitions.iter().map(|door| &door.trigger);
    for rect in
        iter::once(&bounds).chain(&map.obstacles).chain(&map.encounter_zones).chain(door_triggers)
    {
        if rect.w <= 0 || rect.h <= 0 {
            return Err(RegistryError::BadGeometry { map: map.name.clone(), rect: *rect });
        }
    }
    Ok(())
}

fn check_spawn(target: &Map, transition: &Transition, from: &str) -> Result<(), RegistryError> {
    let spawn = transition.spawn();
    let hitbox = Rect::tile_at(spawn);
    if !hitbox.is_within(&target.bounds()) {
        return Err(RegistryError::SpawnOutOfBounds {
            map: from.to_string(),
            target: target.name.clone(),
            spawn,
        });
    }
    if target.check_collision(&hitbox) {
        return Err(RegistryError::SpawnBlocked {
            map: from.to_string(),
            target: target.name.clone(),
            spawn,
        });
    }
    Ok(())
}

fn structural_hash(world: &WorldConfig, maps: &[Map]) -> Result<u64, RegistryError> {
    // Registries built in code have no source text; hash their JSON form instead.
    let encoded =
        serde_json::to_vec(&(world, maps)).map_err(|err| RegistryError::Parse(err.to_string()))?;
    Ok(xxh3_64(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Door;
    use crate::types::Direction;

    fn world(start_map: &str) -> WorldConfig {
        WorldConfig {
            screen_width: 600,
            screen_height: 400,
            start_map: start_map.to_string(),
            start_x: 300,
            start_y: 200,
            encounter_chance_percent: 10,
        }
    }

    fn town(name: &str) -> Map {
        Map::new(name, 600, 400)
    }

    #[test]
    fn builtin_registry_is_valid() {
        let registry = MapRegistry::builtin().expect("shipped maps should validate");
        assert_eq!(registry.len(), 14);
        assert_eq!(registry.world().start_map, "Pallet Town");
        assert_eq!(registry.world().start(), Pos::new(300, 200));
        assert!(registry.get("Viridian House").is_ok());
    }

    #[test]
    fn unknown_transition_target_is_rejected_upfront() {
        let mut pallet = town("Pallet Town");
        pallet.edge_transitions.set(Direction::Up, Transition::new("Route 1", 300, 380));
        let err = MapRegistry::new(world("Pallet Town"), vec![pallet]).expect_err("dangling");
        assert_eq!(
            err,
            RegistryError::UnknownTarget {
                map: "Pallet Town".to_string(),
                target: "Route 1".to_string()
            }
        );
    }

    #[test]
    fn unknown_door_target_is_rejected_upfront() {
        let mut pallet = town("Pallet Town");
        pallet.door_transitions.push(Door {
            trigger: Rect::new(100, 100, 50, 50),
            to: Transition::new("Nowhere", 300, 350),
        });
        let err = MapRegistry::new(world("Pallet Town"), vec![pallet]).expect_err("dangling");
        assert!(matches!(err, RegistryError::UnknownTarget { target, .. } if target == "Nowhere"));
    }

    #[test]
    fn grass_without_roster_is_rejected() {
        let mut route = town("Route 1");
        route.encounter_zones.push(Rect::new(100, 200, 16, 16));
        let err = MapRegistry::new(world("Route 1"), vec![route]).expect_err("empty roster");
        assert_eq!(err, RegistryError::EmptyRoster("Route 1".to_string()));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = MapRegistry::new(world("A"), vec![town("A"), town("A")]).expect_err("dup");
        assert_eq!(err, RegistryError::DuplicateMap("A".to_string()));
    }

    #[test]
    fn missing_start_map_is_rejected() {
        let err = MapRegistry::new(world("Elsewhere"), vec![town("A")]).expect_err("start");
        assert_eq!(err, RegistryError::UnknownStartMap("Elsewhere".to_string()));
    }

    #[test]
    fn spawn_inside_obstacle_is_rejected() {
        let mut a = town("A");
        let mut b = town("B");
        b.obstacles.push(Rect::new(0, 384, 600, 16));
        a.edge_transitions.set(Direction::Up, Transition::new("B", 300, 380));
        let err = MapRegistry::new(world("A"), vec![a, b]).expect_err("blocked spawn");
        assert!(matches!(err, RegistryError::SpawnBlocked { target, .. } if target == "B"));
    }

    #[test]
    fn spawn_outside_bounds_is_rejected() {
        let mut a = town("A");
        a.edge_transitions.set(Direction::Right, Transition::new("A", 590, 200));
        let err = MapRegistry::new(world("A"), vec![a]).expect_err("out of bounds");
        assert!(matches!(err, RegistryError::SpawnOutOfBounds { .. }));
    }

    #[test]
    fn parse_errors_are_reported() {
        let err = MapRegistry::from_toml_str("[world]\nscreen_width = \"wide\"").expect_err("parse");
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn lookup_of_unknown_map_is_an_error() {
        let registry = MapRegistry::new(world("A"), vec![town("A")]).expect("valid");
        assert_eq!(registry.get("B").expect_err("missing"), GameError::UnknownMap("B".to_string()));
    }

    #[test]
    fn content_hash_tracks_source_text() {
        let a = MapRegistry::from_toml_str(
            "[world]\nscreen_width = 600\nscreen_height = 400\nstart_map = \"A\"\nstart_x = 300\nstart_y = 200\n\n[[maps]]\nname = \"A\"\nwidth = 600\nheight = 400\n",
        )
        .expect("valid");
        let b = MapRegistry::from_toml_str(
            "[world]\nscreen_width = 600\nscreen_height = 400\nstart_map = \"A\"\nstart_x = 284\nstart_y = 200\n\n[[maps]]\nname = \"A\"\nwidth = 600\nheight = 400\n",
        )
        .expect("valid");
        assert_eq!(a.world().encounter_chance_percent, 10);
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn code_built_registries_hash_their_map_data() {
        let hash_of = |maps: Vec<Map>| {
            MapRegistry::new(world("A"), maps).expect("valid").content_hash()
        };
        let plain = hash_of(vec![town("A")]);
        assert_eq!(plain, hash_of(vec![town("A")]));

        let mut walled = town("A");
        walled.obstacles.push(Rect::new(0, 0, 600, 16));
        assert_ne!(plain, hash_of(vec![walled]));
        assert_ne!(plain, hash_of(vec![town("A"), town("B")]));
        // An empty encoding would hash to this.
        assert_ne!(plain, xxh3_64(&[]));
    }
}
