//! Random picks from the catalog for the `random` command.

use rand::seq::SliceRandom;
use rand::Rng;

use rallybot_store::Catalog;

use crate::command::RandomTarget;
use crate::resolver::ResolvedRally;
use crate::response;

/// Reply text for a random pick, or `None` when the catalog has nothing to
/// pick from.
pub fn pick<R: Rng + ?Sized>(catalog: &Catalog, target: RandomTarget, rng: &mut R) -> Option<String> {
    match target {
        RandomTarget::Rally => {
            let rally = catalog.rallies().choose(rng)?;
            ResolvedRally::from_rally(catalog, rally).map(|r| response::random_rally(&r))
        }
        RandomTarget::Stage => {
            let stage = catalog.stages().choose(rng)?;
            let locale = catalog.locale(stage.locale_id)?;
            Some(response::random_stage(locale, stage))
        }
        RandomTarget::Locale => catalog.locales().choose(rng).map(|l| l.name.clone()),
        RandomTarget::VehicleClass => catalog.vehicle_classes().choose(rng).map(|v| v.name.clone()),
    }
}
