//! Unit archetype catalogue - immutable stats for every producible unit type
//!
//! Loaded once at startup, read-only during play. Ships a default roster and
//! can load additional rosters from TOML data files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weapon classes
///
/// HE is effective against unarmored targets and useless against any armor;
/// AP compares penetration power against directional armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    He,
    Ap,
}

/// Stat bundle for one weapon
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponStats {
    pub power: i32,
    pub range: u32,
    pub attack_interval: f32,
    pub dps: f32,
}

impl WeaponStats {
    pub fn new(power: i32, range: u32, attack_interval: f32) -> Self {
        let dps = if attack_interval > 0.0 {
            power as f32 / attack_interval
        } else {
            0.0
        };
        Self {
            power,
            range,
            attack_interval,
            dps,
        }
    }
}

/// Armor face hit by an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorFace {
    Front,
    Side,
    Back,
    Top,
}

/// Directional armor values
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ArmorProfile {
    pub front: i32,
    pub side: i32,
    pub back: i32,
    pub top: i32,
}

impl ArmorProfile {
    pub fn new(front: i32, side: i32, back: i32, top: i32) -> Self {
        Self {
            front,
            side,
            back,
            top,
        }
    }

    /// Sum of all four faces
    pub fn total(&self) -> i32 {
        self.front + self.side + self.back + self.top
    }

    /// True when every face is zero
    pub fn is_unarmored(&self) -> bool {
        self.total() == 0
    }

    /// Armor value for a face
    pub fn face(&self, face: ArmorFace) -> i32 {
        match face {
            ArmorFace::Front => self.front,
            ArmorFace::Side => self.side,
            ArmorFace::Back => self.back,
            ArmorFace::Top => self.top,
        }
    }
}

/// Classification used by production heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Command,
    Recon,
    Rifle,
    AntiTank,
    LightVehicle,
    HeavyVehicle,
}

/// Combat and mobility stats for a unit type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStats {
    pub hp: i32,
    #[serde(default)]
    pub armor: ArmorProfile,
    /// Hexes per second on plains
    pub move_speed: f32,
    #[serde(default)]
    pub he_weapon: Option<WeaponStats>,
    #[serde(default)]
    pub ap_weapon: Option<WeaponStats>,
    pub sight_multiplier: f32,
    /// Distance at which the unit is detectable on open ground
    pub detection_range: f32,
    /// Degrees per second; None means the unit turns instantly
    #[serde(default)]
    pub turn_speed: Option<f32>,
}

/// An immutable unit archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub id: String,
    pub name: String,
    pub cost: i32,
    pub production_time: f32,
    #[serde(default)]
    pub is_commander: bool,
    pub class: UnitClass,
    pub stats: UnitStats,
}

impl UnitDefinition {
    /// Weapon stats of the requested kind, if the unit carries one
    pub fn weapon(&self, kind: WeaponKind) -> Option<&WeaponStats> {
        match kind {
            WeaponKind::He => self.stats.he_weapon.as_ref(),
            WeaponKind::Ap => self.stats.ap_weapon.as_ref(),
        }
    }

    /// Longest weapon range the unit can fire at
    pub fn max_weapon_range(&self) -> u32 {
        let he = self.stats.he_weapon.map(|w| w.range).unwrap_or(0);
        let ap = self.stats.ap_weapon.map(|w| w.range).unwrap_or(0);
        he.max(ap)
    }
}

/// Catalogue of all available unit types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitCatalog {
    definitions: Vec<UnitDefinition>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default skirmish roster
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.add(UnitDefinition {
            id: "commander".into(),
            name: "Field Commander".into(),
            cost: 0,
            production_time: 0.0,
            is_commander: true,
            class: UnitClass::Command,
            stats: UnitStats {
                hp: 120,
                armor: ArmorProfile::new(8, 6, 4, 2),
                move_speed: 1.2,
                he_weapon: Some(WeaponStats::new(10, 2, 3.0)),
                ap_weapon: None,
                sight_multiplier: 1.0,
                detection_range: 3.0,
                turn_speed: Some(180.0),
            },
        });

        catalog.add(UnitDefinition {
            id: "recon_infantry".into(),
            name: "Recon Squad".into(),
            cost: 40,
            production_time: 12.0,
            is_commander: false,
            class: UnitClass::Recon,
            stats: UnitStats {
                hp: 60,
                armor: ArmorProfile::default(),
                move_speed: 1.6,
                he_weapon: Some(WeaponStats::new(6, 3, 2.0)),
                ap_weapon: None,
                sight_multiplier: 0.7,
                detection_range: 2.5,
                turn_speed: None,
            },
        });

        catalog.add(UnitDefinition {
            id: "rifle_infantry".into(),
            name: "Rifle Squad".into(),
            cost: 25,
            production_time: 8.0,
            is_commander: false,
            class: UnitClass::Rifle,
            stats: UnitStats {
                hp: 80,
                armor: ArmorProfile::default(),
                move_speed: 1.2,
                he_weapon: Some(WeaponStats::new(8, 2, 1.5)),
                ap_weapon: Some(WeaponStats::new(4, 1, 2.0)),
                sight_multiplier: 1.0,
                detection_range: 3.0,
                turn_speed: None,
            },
        });

        catalog.add(UnitDefinition {
            id: "at_infantry".into(),
            name: "Anti-Tank Team".into(),
            cost: 35,
            production_time: 10.0,
            is_commander: false,
            class: UnitClass::AntiTank,
            stats: UnitStats {
                hp: 70,
                armor: ArmorProfile::default(),
                move_speed: 1.0,
                he_weapon: None,
                ap_weapon: Some(WeaponStats::new(14, 3, 3.0)),
                sight_multiplier: 1.0,
                detection_range: 3.0,
                turn_speed: None,
            },
        });

        catalog.add(UnitDefinition {
            id: "scout_car".into(),
            name: "Scout Car".into(),
            cost: 50,
            production_time: 15.0,
            is_commander: false,
            class: UnitClass::LightVehicle,
            stats: UnitStats {
                hp: 90,
                armor: ArmorProfile::new(4, 3, 2, 1),
                move_speed: 2.5,
                he_weapon: Some(WeaponStats::new(8, 3, 2.0)),
                ap_weapon: None,
                sight_multiplier: 0.8,
                detection_range: 4.5,
                turn_speed: Some(180.0),
            },
        });

        catalog.add(UnitDefinition {
            id: "medium_tank".into(),
            name: "Medium Tank".into(),
            cost: 90,
            production_time: 25.0,
            is_commander: false,
            class: UnitClass::HeavyVehicle,
            stats: UnitStats {
                hp: 160,
                armor: ArmorProfile::new(15, 10, 6, 3),
                move_speed: 1.8,
                he_weapon: Some(WeaponStats::new(10, 4, 3.0)),
                ap_weapon: Some(WeaponStats::new(12, 5, 3.5)),
                sight_multiplier: 1.2,
                detection_range: 5.0,
                turn_speed: Some(120.0),
            },
        });

        catalog.add(UnitDefinition {
            id: "heavy_tank".into(),
            name: "Heavy Tank".into(),
            cost: 140,
            production_time: 40.0,
            is_commander: false,
            class: UnitClass::HeavyVehicle,
            stats: UnitStats {
                hp: 220,
                armor: ArmorProfile::new(22, 14, 8, 4),
                move_speed: 1.4,
                he_weapon: Some(WeaponStats::new(12, 4, 3.5)),
                ap_weapon: Some(WeaponStats::new(18, 6, 4.0)),
                sight_multiplier: 1.3,
                detection_range: 6.0,
                turn_speed: Some(90.0),
            },
        });

        catalog
    }

    /// Add a definition to the catalogue
    pub fn add(&mut self, definition: UnitDefinition) {
        self.definitions.push(definition);
    }

    /// Get a definition by id
    pub fn get(&self, id: &str) -> Option<&UnitDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// All definitions
    pub fn all(&self) -> &[UnitDefinition] {
        &self.definitions
    }

    /// All definitions of a class
    pub fn of_class(&self, class: UnitClass) -> impl Iterator<Item = &UnitDefinition> {
        self.definitions.iter().filter(move |d| d.class == class)
    }

    /// Cheapest non-commander definition, if any
    pub fn cheapest_non_commander(&self) -> Option<&UnitDefinition> {
        self.definitions
            .iter()
            .filter(|d| !d.is_commander)
            .min_by_key(|d| d.cost)
    }

    /// Load a catalogue from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse a catalogue from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, CatalogError> {
        let data: TomlUnits =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut catalog = Self::new();
        for unit in data.units {
            if catalog.get(&unit.id).is_some() {
                return Err(CatalogError::DuplicateId(unit.id));
            }
            catalog.add(unit);
        }
        Ok(catalog)
    }
}

/// Error type for catalogue loading
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Duplicate unit id: {0}")]
    DuplicateId(String),
}

/// TOML representation of a catalogue file
#[derive(Debug, Deserialize)]
struct TomlUnits {
    units: Vec<UnitDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_ids() {
        let catalog = UnitCatalog::with_defaults();
        for id in [
            "commander",
            "recon_infantry",
            "rifle_infantry",
            "at_infantry",
            "scout_car",
            "medium_tank",
            "heavy_tank",
        ] {
            assert!(catalog.get(id).is_some(), "missing {}", id);
        }
        assert!(catalog.get("battleship").is_none());
    }

    #[test]
    fn test_build_order_costs() {
        // Costs the early build order depends on
        let catalog = UnitCatalog::with_defaults();
        assert_eq!(catalog.get("recon_infantry").unwrap().cost, 40);
        assert_eq!(catalog.get("rifle_infantry").unwrap().cost, 25);
    }

    #[test]
    fn test_exactly_one_commander() {
        let catalog = UnitCatalog::with_defaults();
        let commanders: Vec<_> = catalog.all().iter().filter(|d| d.is_commander).collect();
        assert_eq!(commanders.len(), 1);
        assert_eq!(commanders[0].class, UnitClass::Command);
    }

    #[test]
    fn test_cheapest_non_commander() {
        let catalog = UnitCatalog::with_defaults();
        assert_eq!(catalog.cheapest_non_commander().unwrap().id, "rifle_infantry");
    }

    #[test]
    fn test_infantry_unarmored() {
        let catalog = UnitCatalog::with_defaults();
        assert!(catalog.get("rifle_infantry").unwrap().stats.armor.is_unarmored());
        assert!(!catalog.get("medium_tank").unwrap().stats.armor.is_unarmored());
    }

    #[test]
    fn test_weapon_lookup() {
        let catalog = UnitCatalog::with_defaults();
        let at = catalog.get("at_infantry").unwrap();
        assert!(at.weapon(WeaponKind::Ap).is_some());
        assert!(at.weapon(WeaponKind::He).is_none());
        assert_eq!(at.max_weapon_range(), 3);
    }

    #[test]
    fn test_dps_derived_from_interval() {
        let weapon = WeaponStats::new(12, 4, 3.0);
        assert!((weapon.dps - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_catalog_toml_parsing() {
        let toml_content = r#"
            [[units]]
            id = "militia"
            name = "Militia"
            cost = 15
            production_time = 5.0
            class = "rifle"

            [units.stats]
            hp = 50
            move_speed = 1.1
            sight_multiplier = 1.0
            detection_range = 3.0

            [units.stats.he_weapon]
            power = 5
            range = 1
            attack_interval = 1.5
            dps = 3.33
        "#;

        let catalog = UnitCatalog::parse_toml(toml_content).expect("parse failed");
        let militia = catalog.get("militia").unwrap();
        assert_eq!(militia.cost, 15);
        assert_eq!(militia.class, UnitClass::Rifle);
        assert!(!militia.is_commander);
        assert!(militia.stats.armor.is_unarmored());
        assert!(militia.stats.ap_weapon.is_none());
        assert_eq!(militia.stats.he_weapon.unwrap().range, 1);
    }

    #[test]
    fn test_catalog_toml_duplicate_id_rejected() {
        let toml_content = r#"
            [[units]]
            id = "militia"
            name = "Militia"
            cost = 15
            production_time = 5.0
            class = "rifle"
            [units.stats]
            hp = 50
            move_speed = 1.1
            sight_multiplier = 1.0
            detection_range = 3.0

            [[units]]
            id = "militia"
            name = "Militia Again"
            cost = 20
            production_time = 5.0
            class = "rifle"
            [units.stats]
            hp = 50
            move_speed = 1.1
            sight_multiplier = 1.0
            detection_range = 3.0
        "#;

        assert!(matches!(
            UnitCatalog::parse_toml(toml_content),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_catalog_toml_invalid_rejected() {
        assert!(matches!(
            UnitCatalog::parse_toml("units = 3"),
            Err(CatalogError::Parse(_))
        ));
    }
}
