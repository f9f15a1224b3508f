//! Mapping shorthand codes onto exactly one catalog rally.
//!
//! Checks run locale, stage, vehicle class, then the combination, and stop at
//! the first failure so the reply can point at the first wrong token.

use serde::Serialize;
use thiserror::Error;

use rallybot_shared::constants::{
    CONDITION_DRY, CONDITION_SNOW, CONDITION_WET, SNOW_ONLY_LOCALES,
};
use rallybot_store::{Catalog, Condition, Locale, Rally, Stage, VehicleClass};

use crate::parser::StageCode;

/// Surface condition selected for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurfaceCondition {
    Dry,
    Wet,
    Snow,
}

impl SurfaceCondition {
    /// Snow-only locales always run on snow. Elsewhere a `w` flag selects
    /// wet and anything else dry.
    pub fn select(locale_code: &str, condition_flag: Option<char>) -> Self {
        let locale_code = locale_code.to_lowercase();
        if SNOW_ONLY_LOCALES.contains(&locale_code.as_str()) {
            return Self::Snow;
        }
        match condition_flag {
            Some(flag) if flag.eq_ignore_ascii_case(&'w') => Self::Wet,
            _ => Self::Dry,
        }
    }

    /// Condition name as seeded in the catalog.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dry => CONDITION_DRY,
            Self::Wet => CONDITION_WET,
            Self::Snow => CONDITION_SNOW,
        }
    }
}

/// A fully resolved rally together with the catalog rows it is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRally {
    pub rally: Rally,
    pub locale: Locale,
    pub stage: Stage,
    pub condition: Condition,
    pub vehicle_class: VehicleClass,
}

impl ResolvedRally {
    /// Rebuild the display context of a catalog rally.
    pub fn from_rally(catalog: &Catalog, rally: &Rally) -> Option<Self> {
        let stage = catalog.stage(rally.stage_id)?;
        Some(Self {
            rally: *rally,
            locale: catalog.locale(stage.locale_id)?.clone(),
            stage: stage.clone(),
            condition: catalog.condition(rally.condition_id)?.clone(),
            vehicle_class: catalog.vehicle_class(rally.vehicle_class_id)?.clone(),
        })
    }

    /// Upper-case shorthand such as `US-01 DRY / H1`.
    pub fn shorthand(&self) -> String {
        format!(
            "{}-{} {} / {}",
            self.locale.code, self.stage.code, self.condition.name, self.vehicle_class.code
        )
        .to_uppercase()
    }
}

/// Why a code tuple did not resolve. Each variant carries what the reply
/// needs to list valid options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("unknown locale code")]
    UnknownLocale { locales: Vec<Locale> },

    #[error("unknown stage code for {}", locale.code)]
    UnknownStage { locale: Locale, stages: Vec<Stage> },

    #[error("unknown or missing vehicle class code")]
    UnknownVehicleClass { vehicle_classes: Vec<VehicleClass> },

    #[error("no rally for this stage, condition and class")]
    UnknownRally,
}

/// Resolves code tuples against an immutable catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(
        &self,
        locale_code: &str,
        stage_code: &str,
        condition_flag: Option<char>,
        vehicle_class_code: Option<&str>,
    ) -> Result<ResolvedRally, ResolutionFailure> {
        let catalog = self.catalog;

        let locale = catalog.lookup_locale_by_code(locale_code).ok_or_else(|| {
            ResolutionFailure::UnknownLocale {
                locales: catalog.locales().to_vec(),
            }
        })?;

        let stage = catalog
            .lookup_stage_by_locale_and_code(locale.id, stage_code)
            .ok_or_else(|| ResolutionFailure::UnknownStage {
                locale: locale.clone(),
                stages: catalog.stages_for_locale(locale.id),
            })?;

        let condition_kind = SurfaceCondition::select(&locale.code, condition_flag);

        let vehicle_class = vehicle_class_code
            .and_then(|code| catalog.lookup_vehicle_class_by_code(code))
            .ok_or_else(|| ResolutionFailure::UnknownVehicleClass {
                vehicle_classes: catalog.vehicle_classes().to_vec(),
            })?;

        let condition = catalog
            .lookup_condition_by_name(condition_kind.name())
            .ok_or(ResolutionFailure::UnknownRally)?;

        let rally = catalog
            .lookup_rally(stage.id, condition.id, vehicle_class.id)
            .ok_or(ResolutionFailure::UnknownRally)?;

        Ok(ResolvedRally {
            rally: *rally,
            locale: locale.clone(),
            stage: stage.clone(),
            condition: condition.clone(),
            vehicle_class: vehicle_class.clone(),
        })
    }

    /// Convenience for parser output.
    pub fn resolve_code(
        &self,
        code: &StageCode,
        vehicle_class_code: Option<&str>,
    ) -> Result<ResolvedRally, ResolutionFailure> {
        self.resolve(
            &code.locale,
            &code.stage,
            code.condition_flag,
            vehicle_class_code,
        )
    }
}
