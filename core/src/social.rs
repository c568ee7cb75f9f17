use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    name_generator::NameGenerator,
    population::Person,
    rng::StreamRng,
    transaction::{LOOKBACK_DAYS, TIMESTAMP_FORMAT},
};

pub const INTERACTION_TYPES: &[&str] = &["email", "phone", "meeting", "video_call"];
/// Interactions generated per person in the population.
pub const INTERACTIONS_PER_PERSON: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialInteraction {
    pub interaction_id: String,
    pub person1_id: String,
    pub person2_id: String,
    pub interaction_type: String,
    pub interaction_date: String,
}

/// Random pairwise interactions. Needs at least two people; a smaller
/// population yields nothing.
pub fn generate_interactions(
    people: &[Person],
    as_of: NaiveDateTime,
    rng: &mut StreamRng,
) -> Vec<SocialInteraction> {
    if people.len() < 2 {
        log::debug!("social: fewer than two people, no interactions");
        return Vec::new();
    }

    let n = people.len() * INTERACTIONS_PER_PERSON;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let first = rng.next_u64_below(people.len() as u64) as usize;
        // Draw from the remaining n-1 people, skipping `first`.
        let mut second = rng.next_u64_below(people.len() as u64 - 1) as usize;
        if second >= first {
            second += 1;
        }

        let interaction_type = rng.pick(INTERACTION_TYPES).to_string();
        let days_ago = rng.range_inclusive(0, LOOKBACK_DAYS);
        let interaction_date = (as_of - Duration::days(days_ago))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        out.push(SocialInteraction {
            interaction_id: NameGenerator::generate_id(rng),
            person1_id: people[first].customer_id.clone(),
            person2_id: people[second].customer_id.clone(),
            interaction_type,
            interaction_date,
        });
    }
    log::info!("social: generated {} interactions", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GenConfig, population::generate_population, reference::ReferenceTables};

    #[test]
    fn twice_as_many_interactions_as_people_never_self() {
        let tables = ReferenceTables::builtin();
        let mut rng = StreamRng::from_seed(30);
        let people = generate_population(6, &mut rng, &tables);
        let interactions = generate_interactions(&people, GenConfig::default_test().as_of, &mut rng);
        assert_eq!(interactions.len(), 12);
        for i in &interactions {
            assert_ne!(i.person1_id, i.person2_id);
            assert!(INTERACTION_TYPES.contains(&i.interaction_type.as_str()));
        }
    }

    #[test]
    fn single_person_has_no_interactions() {
        let tables = ReferenceTables::builtin();
        let mut rng = StreamRng::from_seed(31);
        let people = generate_population(1, &mut rng, &tables);
        assert!(generate_interactions(&people, GenConfig::default_test().as_of, &mut rng).is_empty());
    }
}
