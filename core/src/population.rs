use serde::{Deserialize, Serialize};

use crate::{
    name_generator::NameGenerator, reference::ReferenceTables, rng::StreamRng, types::CustomerId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
    pub job: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "City, ST 12345"
    pub fn city_line(&self) -> String {
        format!("{}, {} {}", self.city, self.state, self.zip)
    }
}

pub fn generate_person(rng: &mut StreamRng, tables: &ReferenceTables) -> Person {
    let first_name = NameGenerator::generate_first_name(rng, tables).to_string();
    let last_name = NameGenerator::generate_last_name(rng, tables).to_string();
    let street = NameGenerator::generate_street(rng, tables);
    let city = rng.pick(&tables.cities).clone();
    let state = rng.pick(&tables.states).clone();
    let zip = NameGenerator::generate_zip(rng);
    let phone = NameGenerator::generate_phone(rng);
    let email = NameGenerator::generate_email(rng, &first_name, &last_name);
    let job = rng.pick(&tables.jobs).clone();
    let customer_id = NameGenerator::generate_id(rng);

    Person {
        customer_id,
        first_name,
        last_name,
        street,
        city,
        state,
        zip,
        phone,
        email,
        job,
    }
}

pub fn generate_population(
    n: usize,
    rng: &mut StreamRng,
    tables: &ReferenceTables,
) -> Vec<Person> {
    let people: Vec<Person> = (0..n).map(|_| generate_person(rng, tables)).collect();
    log::info!("population: generated {} people", people.len());
    people
}
