//! Shared fixtures for unit tests.

use rallybot_store::{Catalog, CatalogSeed, Database};

pub const SEED: &str = r#"{
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
        },
        {
            "code": "gr", "name": "Greece", "surface_type": "Gravel",
            "conditions": ["Dry"],
            "stages": [ { "code": "01", "name": "Anodou Farmakas" } ]
        }
    ]
}"#;

pub fn database() -> Database {
    let mut db = Database::open_in_memory().unwrap();
    db.seed_catalog(&CatalogSeed::from_json(SEED).unwrap())
        .unwrap();
    db
}

pub fn catalog() -> Catalog {
    database().load_catalog().unwrap()
}
