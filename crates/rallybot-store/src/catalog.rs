//! The in-memory reference catalog.
//!
//! [`Catalog`] is loaded once from the database at startup and never mutated
//! afterwards; callers share it behind an `Arc`.  Code lookups are exact and
//! case-insensitive.

use std::collections::HashMap;

use crate::database::Database;
use crate::error::Result;
use crate::models::{Condition, Locale, Rally, Stage, VehicleClass};

/// Immutable snapshot of locales, stages, conditions, vehicle classes and
/// rallies.  Every collection is sorted by ascending id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    locales: Vec<Locale>,
    stages: Vec<Stage>,
    conditions: Vec<Condition>,
    vehicle_classes: Vec<VehicleClass>,
    rallies: Vec<Rally>,

    locale_by_code: HashMap<String, usize>,
    stage_by_code: HashMap<(i64, String), usize>,
    condition_by_name: HashMap<String, usize>,
    class_by_code: HashMap<String, usize>,
    rally_by_key: HashMap<(i64, i64, i64), usize>,
}

impl Catalog {
    pub fn new(
        mut locales: Vec<Locale>,
        mut stages: Vec<Stage>,
        mut conditions: Vec<Condition>,
        mut vehicle_classes: Vec<VehicleClass>,
        mut rallies: Vec<Rally>,
    ) -> Self {
        locales.sort_by_key(|l| l.id);
        stages.sort_by_key(|s| s.id);
        conditions.sort_by_key(|c| c.id);
        vehicle_classes.sort_by_key(|v| v.id);
        rallies.sort_by_key(|r| r.id);

        let locale_by_code = locales
            .iter()
            .enumerate()
            .map(|(i, l)| (l.code.to_lowercase(), i))
            .collect();
        let stage_by_code = stages
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.locale_id, s.code.to_lowercase()), i))
            .collect();
        let condition_by_name = conditions
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_lowercase(), i))
            .collect();
        let class_by_code = vehicle_classes
            .iter()
            .enumerate()
            .map(|(i, v)| (v.code.to_lowercase(), i))
            .collect();
        let rally_by_key = rallies
            .iter()
            .enumerate()
            .map(|(i, r)| ((r.stage_id, r.condition_id, r.vehicle_class_id), i))
            .collect();

        Self {
            locales,
            stages,
            conditions,
            vehicle_classes,
            rallies,
            locale_by_code,
            stage_by_code,
            condition_by_name,
            class_by_code,
            rally_by_key,
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn lookup_locale_by_code(&self, code: &str) -> Option<&Locale> {
        self.locale_by_code
            .get(&code.to_lowercase())
            .map(|&i| &self.locales[i])
    }

    pub fn lookup_stage_by_locale_and_code(&self, locale_id: i64, code: &str) -> Option<&Stage> {
        self.stage_by_code
            .get(&(locale_id, code.to_lowercase()))
            .map(|&i| &self.stages[i])
    }

    pub fn lookup_vehicle_class_by_code(&self, code: &str) -> Option<&VehicleClass> {
        self.class_by_code
            .get(&code.to_lowercase())
            .map(|&i| &self.vehicle_classes[i])
    }

    pub fn lookup_condition_by_name(&self, name: &str) -> Option<&Condition> {
        self.condition_by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.conditions[i])
    }

    pub fn lookup_rally(
        &self,
        stage_id: i64,
        condition_id: i64,
        vehicle_class_id: i64,
    ) -> Option<&Rally> {
        self.rally_by_key
            .get(&(stage_id, condition_id, vehicle_class_id))
            .map(|&i| &self.rallies[i])
    }

    /// Whether `token` is a known vehicle class code (case-insensitive).
    pub fn is_vehicle_class_code(&self, token: &str) -> bool {
        self.class_by_code.contains_key(&token.to_lowercase())
    }

    pub fn locale(&self, id: i64) -> Option<&Locale> {
        self.locales.iter().find(|l| l.id == id)
    }

    pub fn stage(&self, id: i64) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn condition(&self, id: i64) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    pub fn vehicle_class(&self, id: i64) -> Option<&VehicleClass> {
        self.vehicle_classes.iter().find(|v| v.id == id)
    }

    // ------------------------------------------------------------------
    // Enumeration (ascending id)
    // ------------------------------------------------------------------

    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stages_for_locale(&self, locale_id: i64) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|s| s.locale_id == locale_id)
            .cloned()
            .collect()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn vehicle_classes(&self) -> &[VehicleClass] {
        &self.vehicle_classes
    }

    pub fn rallies(&self) -> &[Rally] {
        &self.rallies
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

impl Database {
    /// Read the whole catalog into memory.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let locales = self.query_all(
            "SELECT id, name, code, surface_type FROM locales",
            |row| {
                Ok(Locale {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                    surface_type: row.get(3)?,
                })
            },
        )?;
        let stages = self.query_all("SELECT id, locale_id, name, code FROM stages", |row| {
            Ok(Stage {
                id: row.get(0)?,
                locale_id: row.get(1)?,
                name: row.get(2)?,
                code: row.get(3)?,
            })
        })?;
        let conditions = self.query_all("SELECT id, name FROM conditions", |row| {
            Ok(Condition {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let vehicle_classes =
            self.query_all("SELECT id, name, code FROM vehicle_classes", |row| {
                Ok(VehicleClass {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?;
        let rallies = self.query_all(
            "SELECT id, stage_id, condition_id, vehicle_class_id FROM rallies",
            |row| {
                Ok(Rally {
                    id: row.get(0)?,
                    stage_id: row.get(1)?,
                    condition_id: row.get(2)?,
                    vehicle_class_id: row.get(3)?,
                })
            },
        )?;

        tracing::info!(
            locales = locales.len(),
            stages = stages.len(),
            vehicle_classes = vehicle_classes.len(),
            rallies = rallies.len(),
            "catalog loaded"
        );

        Ok(Catalog::new(
            locales,
            stages,
            conditions,
            vehicle_classes,
            rallies,
        ))
    }

    fn query_all<T, F>(&self, sql: &str, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map([], map)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}
