use serde_json::{json, Value};

use crate::catalog::{Catalog, CatalogMode};
use crate::matching::StudentProfile;

pub(super) fn profile(payload: Value) -> StudentProfile {
    StudentProfile::from_value(&payload).expect("fixture profile normalizes")
}

pub(super) fn senior_profile() -> StudentProfile {
    profile(json!({
        "grade_level": 12,
        "average": 92,
        "wants_coop": true,
        "extra_curriculars": [["FIRST Robotics", 4], {"name": "DECA", "level": 2}],
        "major_interests": ["programming", "electronics", "design"],
        "courses_taken": [["ENG4U", 90], ["MHF4U", 94], ["MCV4U", 93], ["SPH4U", 91]],
    }))
}

pub(super) fn catalog(document: Value) -> Catalog {
    Catalog::from_document(&document, CatalogMode::Lenient).expect("fixture catalog parses")
}

pub(super) fn engineering_catalog() -> Catalog {
    catalog(json!({
        "_id": "snapshot-1",
        "apply_deadline": "January 15",
        "University of Waterloo": {
            "ec_quality": 5,
            "co-op": ["yes"],
            "programs": {
                "Computer Engineering": {
                    "recommended_average": [90, 95],
                    "required_courses": ["ENG4U", "MHF4U", "MCV4U", "SPH4U", "SCH4U", "One U/M"],
                    "interests": ["programming", "electronics", "computer networking"]
                },
                "Geological Engineering": {
                    "recommended_average": [84, 89],
                    "required_courses": ["ENG4U", "MHF4U", "MCV4U", "SPH4U", "SCH4U"],
                    "interests": ["geology"]
                },
                "Architectural Engineering": {
                    "required_courses": ["ENG4U"]
                }
            }
        },
        "York University": {
            "ec_quality": 3,
            "co-op": ["no"],
            "programs": {
                "Computer Engineering": {
                    "recommended_average": [80, 85],
                    "required_courses": ["ENG4U / EAE4U", "MHF4U"],
                    "interests": ["programming", "design"]
                }
            }
        }
    }))
}
