//! Catalog seeding from a JSON description of the game's reference data.
//!
//! The seed lists every locale with its stages and the conditions it can be
//! driven in.  Rallies are generated as stage x allowed condition x vehicle
//! class, so a combination the game does not offer never gets a row.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Transaction};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSeed {
    /// Condition names, e.g. `["Dry", "Wet", "Snow"]`.
    pub conditions: Vec<String>,
    pub vehicle_classes: Vec<SeedVehicleClass>,
    pub locales: Vec<SeedLocale>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedVehicleClass {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLocale {
    pub code: String,
    pub name: String,
    pub surface_type: String,
    /// Names from [`CatalogSeed::conditions`] this locale supports.
    pub conditions: Vec<String>,
    pub stages: Vec<SeedStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedStage {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStats {
    pub locales: usize,
    pub stages: usize,
    pub vehicle_classes: usize,
    pub rallies: usize,
}

impl CatalogSeed {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check code shapes and cross references before touching the database.
    pub fn validate(&self) -> Result<()> {
        let conditions: HashSet<String> =
            self.conditions.iter().map(|c| c.to_lowercase()).collect();

        let mut class_codes = HashSet::new();
        for class in &self.vehicle_classes {
            let code = class.code.to_lowercase();
            if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(StoreError::Seed(format!(
                    "vehicle class code {:?} must be alphanumeric",
                    class.code
                )));
            }
            if !class_codes.insert(code) {
                return Err(StoreError::Seed(format!(
                    "duplicate vehicle class code {:?}",
                    class.code
                )));
            }
        }

        let mut locale_codes = HashSet::new();
        for locale in &self.locales {
            let len = locale.code.len();
            if !(2..=3).contains(&len) || !locale.code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(StoreError::Seed(format!(
                    "locale code {:?} must be 2-3 letters",
                    locale.code
                )));
            }
            if !locale_codes.insert(locale.code.to_lowercase()) {
                return Err(StoreError::Seed(format!(
                    "duplicate locale code {:?}",
                    locale.code
                )));
            }
            if let Some(unknown) = locale
                .conditions
                .iter()
                .find(|c| !conditions.contains(&c.to_lowercase()))
            {
                return Err(StoreError::Seed(format!(
                    "locale {:?} references unknown condition {:?}",
                    locale.code, unknown
                )));
            }

            let mut stage_codes = HashSet::new();
            for stage in &locale.stages {
                if stage.code.len() != 2 || !stage.code.chars().all(|c| c.is_ascii_digit()) {
                    return Err(StoreError::Seed(format!(
                        "stage code {:?} in {:?} must be 2 digits",
                        stage.code, locale.code
                    )));
                }
                if !stage_codes.insert(stage.code.as_str()) {
                    return Err(StoreError::Seed(format!(
                        "duplicate stage code {:?} in {:?}",
                        stage.code, locale.code
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Database {
    /// Insert the seed in a single transaction.
    ///
    /// Does nothing when the catalog already holds locales, so it is safe to
    /// call on every start.
    pub fn seed_catalog(&mut self, seed: &CatalogSeed) -> Result<SeedStats> {
        seed.validate()?;

        let existing: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM locales", [], |row| row.get(0))?;
        if existing > 0 {
            tracing::debug!(locales = existing, "catalog already seeded, skipping");
            return Ok(SeedStats::default());
        }

        let tx = self.conn_mut().transaction()?;
        let stats = insert_seed(&tx, seed)?;
        tx.commit()?;

        tracing::info!(
            locales = stats.locales,
            stages = stats.stages,
            vehicle_classes = stats.vehicle_classes,
            rallies = stats.rallies,
            "catalog seeded"
        );

        Ok(stats)
    }
}

fn insert_seed(tx: &Transaction<'_>, seed: &CatalogSeed) -> Result<SeedStats> {
    let mut stats = SeedStats::default();

    let mut condition_ids = Vec::with_capacity(seed.conditions.len());
    for name in &seed.conditions {
        tx.execute("INSERT INTO conditions (name) VALUES (?1)", params![name])?;
        condition_ids.push((name.to_lowercase(), tx.last_insert_rowid()));
    }

    let mut class_ids = Vec::with_capacity(seed.vehicle_classes.len());
    for class in &seed.vehicle_classes {
        tx.execute(
            "INSERT INTO vehicle_classes (name, code) VALUES (?1, ?2)",
            params![class.name, class.code],
        )?;
        class_ids.push(tx.last_insert_rowid());
        stats.vehicle_classes += 1;
    }

    for locale in &seed.locales {
        tx.execute(
            "INSERT INTO locales (name, code, surface_type) VALUES (?1, ?2, ?3)",
            params![locale.name, locale.code, locale.surface_type],
        )?;
        let locale_id = tx.last_insert_rowid();
        stats.locales += 1;

        let allowed: Vec<i64> = locale
            .conditions
            .iter()
            .filter_map(|name| {
                let name = name.to_lowercase();
                condition_ids
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, id)| *id)
            })
            .collect();

        for stage in &locale.stages {
            tx.execute(
                "INSERT INTO stages (locale_id, name, code) VALUES (?1, ?2, ?3)",
                params![locale_id, stage.name, stage.code],
            )?;
            let stage_id = tx.last_insert_rowid();
            stats.stages += 1;

            for condition_id in &allowed {
                for class_id in &class_ids {
                    tx.execute(
                        "INSERT INTO rallies (stage_id, condition_id, vehicle_class_id)
                         VALUES (?1, ?2, ?3)",
                        params![stage_id, condition_id, class_id],
                    )?;
                    stats.rallies += 1;
                }
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "conditions": ["Dry", "Wet", "Snow"],
        "vehicle_classes": [
            { "code": "h1", "name": "H1 FWD" },
            { "code": "r5", "name": "R5" }
        ],
        "locales": [
            {
                "code": "us", "name": "USA", "surface_type": "Gravel",
                "conditions": ["Dry", "Wet"],
                "stages": [
                    { "code": "01", "name": "North Fork Pass" },
                    { "code": "02", "name": "North Fork Pass Reverse" }
                ]
            },
            {
                "code": "se", "name": "Sweden", "surface_type": "Snow",
                "conditions": ["Snow"],
                "stages": [ { "code": "01", "name": "Hamra" } ]
            }
        ]
    }"#;

    #[test]
    fn seeds_cross_product_of_allowed_conditions() {
        let mut db = Database::open_in_memory().unwrap();
        let seed = CatalogSeed::from_json(SEED).unwrap();

        let stats = db.seed_catalog(&seed).unwrap();
        assert_eq!(stats.locales, 2);
        assert_eq!(stats.stages, 3);
        assert_eq!(stats.vehicle_classes, 2);
        // us: 2 stages x 2 conditions x 2 classes, se: 1 x 1 x 2
        assert_eq!(stats.rallies, 10);

        let catalog = db.load_catalog().unwrap();
        assert_eq!(catalog.rallies().len(), 10);
        let se = catalog.lookup_locale_by_code("SE").unwrap();
        let hamra = catalog.lookup_stage_by_locale_and_code(se.id, "01").unwrap();
        let dry = catalog.lookup_condition_by_name("Dry").unwrap();
        let h1 = catalog.lookup_vehicle_class_by_code("H1").unwrap();
        assert!(catalog.lookup_rally(hamra.id, dry.id, h1.id).is_none());
    }

    #[test]
    fn seeding_twice_is_a_no_op() {
        let mut db = Database::open_in_memory().unwrap();
        let seed = CatalogSeed::from_json(SEED).unwrap();

        db.seed_catalog(&seed).unwrap();
        let again = db.seed_catalog(&seed).unwrap();
        assert_eq!(again, SeedStats::default());
        assert_eq!(db.load_catalog().unwrap().locales().len(), 2);
    }

    #[test]
    fn rejects_malformed_stage_code() {
        let mut seed = CatalogSeed::from_json(SEED).unwrap();
        seed.locales[0].stages[0].code = "1".into();
        assert!(matches!(seed.validate(), Err(StoreError::Seed(_))));
    }

    #[test]
    fn rejects_unknown_condition_reference() {
        let mut seed = CatalogSeed::from_json(SEED).unwrap();
        seed.locales[0].conditions.push("Mud".into());
        assert!(matches!(seed.validate(), Err(StoreError::Seed(_))));
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(
            CatalogSeed::from_json("{"),
            Err(StoreError::SeedFormat(_))
        ));
    }

    #[test]
    fn bundled_catalog_seeds_cleanly() {
        let seed =
            CatalogSeed::from_json(include_str!("../../../data/dirt-rally-2.json")).unwrap();
        let mut db = Database::open_in_memory().unwrap();

        let stats = db.seed_catalog(&seed).unwrap();
        assert_eq!(stats.locales, 13);
        assert_eq!(stats.stages, 13 * 12);
        assert_eq!(stats.vehicle_classes, 13);
        // 11 dry/wet locales plus Sweden and Monte Carlo on snow only.
        assert_eq!(stats.rallies, (11 * 2 + 2) * 12 * 13);

        let catalog = db.load_catalog().unwrap();
        assert!(catalog.lookup_locale_by_code("wal").is_some());
        assert!(catalog.is_vehicle_class_code("2K"));
    }
}
