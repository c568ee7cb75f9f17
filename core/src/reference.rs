//! Reference lookup tables (names, places, jobs, companies).
//!
//! Loaded once at startup and never mutated afterwards. Generation
//! functions take `&ReferenceTables`, so nothing hides behind a
//! module-level global.

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, ForgeResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub first_names_male: Vec<String>,
    pub first_names_female: Vec<String>,
    pub last_names: Vec<String>,
    pub streets: Vec<String>,
    pub cities: Vec<String>,
    pub states: Vec<String>,
    pub postal_codes: Vec<String>,
    pub jobs: Vec<String>,
    pub companies: Vec<String>,
}

impl ReferenceTables {
    /// Load from `<data_dir>/reference/tables.json`.
    /// In tests, use ReferenceTables::builtin().
    pub fn load(data_dir: &str) -> ForgeResult<Self> {
        let path = format!("{data_dir}/reference/tables.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let tables: ReferenceTables = serde_json::from_str(&content)?;
        tables.check_non_empty()?;
        log::info!(
            "reference: loaded {} companies, {} streets, {} cities from {path}",
            tables.companies.len(),
            tables.streets.len(),
            tables.cities.len()
        );
        Ok(tables)
    }

    /// Curated defaults compiled into the binary.
    pub fn builtin() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            first_names_male: owned(&[
                "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph",
                "Thomas", "Charles", "Daniel", "Matthew", "Anthony", "Mark", "Steven", "Paul",
                "Andrew", "Joshua", "Kevin", "Brian", "George", "Edward", "Ryan", "Jacob",
            ]),
            first_names_female: owned(&[
                "Mary", "Patricia", "Jennifer", "Linda", "Barbara", "Elizabeth", "Susan",
                "Jessica", "Sarah", "Karen", "Lisa", "Nancy", "Margaret", "Sandra", "Ashley",
                "Emily", "Donna", "Michelle", "Amanda", "Melissa", "Laura", "Rachel", "Grace",
            ]),
            last_names: owned(&[
                "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
                "Rodriguez", "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas",
                "Taylor", "Moore", "Jackson", "Martin", "Lee", "Thompson", "White", "Harris",
                "Clark", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Nguyen",
            ]),
            streets: owned(&[
                "Main St", "Oak Ave", "Maple Dr", "Cedar Ln", "Pine St", "Elm St",
                "Washington Blvd", "Lakeview Rd", "Hillcrest Ave", "Park Pl", "River Rd",
                "Sunset Blvd", "Chestnut St", "Highland Ave", "Meadow Ln",
            ]),
            cities: owned(&[
                "Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton",
                "Fairview", "Salem", "Madison", "Georgetown", "Arlington", "Ashland",
            ]),
            states: owned(&[
                "AL", "AZ", "CA", "CO", "FL", "GA", "IL", "MA", "MI", "NC", "NY", "OH", "OR",
                "PA", "TX", "VA", "WA", "WI",
            ]),
            postal_codes: owned(&[
                "10001", "20002", "30303", "33101", "48201", "60601", "73301", "80202",
                "90001", "94103", "97201", "98101",
            ]),
            jobs: owned(&[
                "Accountant", "Architect", "Barista", "Carpenter", "Chemist", "Data Analyst",
                "Electrician", "Engineer", "Graphic Designer", "Nurse", "Pharmacist",
                "Plumber", "Teacher", "Veterinarian", "Writer",
            ]),
            companies: owned(&[
                "Acme Supply Co", "Brightline Retail", "Cobalt Outfitters", "Delta Home Goods",
                "Evergreen Sports", "Fairway Electronics", "Granite Book House",
                "Harbor Apparel", "Ironwood Garden Center", "Juniper Trading Co",
            ]),
        }
    }

    fn check_non_empty(&self) -> ForgeResult<()> {
        let tables: [(&'static str, &Vec<String>); 9] = [
            ("first_names_male", &self.first_names_male),
            ("first_names_female", &self.first_names_female),
            ("last_names", &self.last_names),
            ("streets", &self.streets),
            ("cities", &self.cities),
            ("states", &self.states),
            ("postal_codes", &self.postal_codes),
            ("jobs", &self.jobs),
            ("companies", &self.companies),
        ];
        for (table, values) in tables {
            if values.is_empty() {
                return Err(ForgeError::EmptyReferenceTable { table });
            }
        }
        Ok(())
    }
}
