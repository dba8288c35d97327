//! Person names drawn from bundled lists.
//!
//! The lists are compiled in as `&'static str` so generated values borrow
//! instead of allocating (except for full names and case folding, which
//! must build a new string anyway).

use std::borrow::Cow;

use rand::Rng;

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::{invalid, opt_string_field, seed_param, ParamMap, SeededRng, StateMap, Strategy};

const NAME: &str = "RANDOM_NAME_STRATEGY";

const MALE_FIRST_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Liam", "Noah", "Oliver", "Benjamin", "Elijah", "Lucas", "Mason", "Logan",
    "Alexander", "Ethan", "Jacob", "Daniel", "Henry", "Jackson", "Samuel", "Sebastian", "Owen",
    "Matthew", "Aiden", "Luke", "Gabriel", "Anthony", "Isaac", "Dylan", "Andrew", "Joshua",
    "Christopher", "Theodore", "Caleb", "Ryan",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah",
    "Karen", "Emma", "Olivia", "Ava", "Isabella", "Sophia", "Charlotte", "Mia", "Amelia",
    "Harper", "Evelyn", "Abigail", "Emily", "Ella", "Madison", "Scarlett", "Victoria", "Aria",
    "Grace", "Chloe", "Camila", "Penelope", "Riley", "Layla", "Lillian", "Nora", "Zoey",
    "Mila", "Aubrey", "Hannah", "Lily",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameType {
    First,
    Last,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gender {
    Any,
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseFormat {
    Title,
    Upper,
    Lower,
}

pub struct RandomNameStrategy {
    name_type: NameType,
    gender: Gender,
    case: CaseFormat,
    source: SeededRng,
}

impl RandomNameStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let name_type = match opt_string_field(NAME, params, "name_type")?.as_deref() {
            None | Some("first") => NameType::First,
            Some("last") => NameType::Last,
            Some("full") => NameType::Full,
            Some(other) => {
                return Err(invalid(
                    NAME,
                    "name_type",
                    format!("expected first|last|full, got '{}'", other),
                ))
            }
        };
        let gender = match opt_string_field(NAME, params, "gender")?.as_deref() {
            None | Some("any") => Gender::Any,
            Some("male") => Gender::Male,
            Some("female") => Gender::Female,
            Some(other) => {
                return Err(invalid(
                    NAME,
                    "gender",
                    format!("expected any|male|female, got '{}'", other),
                ))
            }
        };
        let case = match opt_string_field(NAME, params, "case")?.as_deref() {
            None | Some("title") => CaseFormat::Title,
            Some("upper") => CaseFormat::Upper,
            Some("lower") => CaseFormat::Lower,
            Some(other) => {
                return Err(invalid(
                    NAME,
                    "case",
                    format!("expected title|upper|lower, got '{}'", other),
                ))
            }
        };

        Ok(RandomNameStrategy {
            name_type,
            gender,
            case,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }

    fn pick_first(&mut self) -> &'static str {
        let pool: &[&str] = match self.gender {
            Gender::Male => MALE_FIRST_NAMES,
            Gender::Female => FEMALE_FIRST_NAMES,
            Gender::Any => {
                // Even split between the two pools keeps a single RNG draw
                // per decision, preserving chunk equivalence.
                let male = self.source.rng.random_range(0..2) == 0;
                if male {
                    MALE_FIRST_NAMES
                } else {
                    FEMALE_FIRST_NAMES
                }
            }
        };
        pool[self.source.rng.random_range(0..pool.len())]
    }

    fn pick_last(&mut self) -> &'static str {
        LAST_NAMES[self.source.rng.random_range(0..LAST_NAMES.len())]
    }

    fn next_name(&mut self) -> Value {
        let raw: Cow<'static, str> = match self.name_type {
            NameType::First => Cow::Borrowed(self.pick_first()),
            NameType::Last => Cow::Borrowed(self.pick_last()),
            NameType::Full => {
                let first = self.pick_first();
                let last = self.pick_last();
                Cow::Owned(format!("{} {}", first, last))
            }
        };
        let cased = match self.case {
            CaseFormat::Title => raw,
            CaseFormat::Upper => Cow::Owned(raw.to_uppercase()),
            CaseFormat::Lower => Cow::Owned(raw.to_lowercase()),
        };
        Value::Text(cased)
    }
}

impl Strategy for RandomNameStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Text
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        Ok((0..n).map(|_| self.next_name()).collect())
    }

    fn reset(&mut self) {
        self.source.reset();
    }

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("seed".into(), self.source.seed().into());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_chunk_equivalence, params};
    use super::*;

    #[test]
    fn test_first_names_from_pools() {
        let p = params(serde_json::json!({"seed": 1}));
        let mut s = RandomNameStrategy::from_params(&p).unwrap();
        for v in s.generate_chunk(100).unwrap() {
            let name = v.as_str().unwrap();
            assert!(
                MALE_FIRST_NAMES.contains(&name) || FEMALE_FIRST_NAMES.contains(&name),
                "unknown name {}",
                name
            );
        }
    }

    #[test]
    fn test_gender_filter() {
        let p = params(serde_json::json!({"gender": "female", "seed": 2}));
        let mut s = RandomNameStrategy::from_params(&p).unwrap();
        for v in s.generate_chunk(100).unwrap() {
            assert!(FEMALE_FIRST_NAMES.contains(&v.as_str().unwrap()));
        }
    }

    #[test]
    fn test_full_name_shape() {
        let p = params(serde_json::json!({"name_type": "full", "seed": 3}));
        let mut s = RandomNameStrategy::from_params(&p).unwrap();
        for v in s.generate_chunk(50).unwrap() {
            let name = v.as_str().unwrap();
            let parts: Vec<&str> = name.split(' ').collect();
            assert_eq!(parts.len(), 2, "full name should be 'First Last': {}", name);
            assert!(LAST_NAMES.contains(&parts[1]));
        }
    }

    #[test]
    fn test_case_formats() {
        let p = params(serde_json::json!({"case": "upper", "seed": 4}));
        let mut s = RandomNameStrategy::from_params(&p).unwrap();
        let v = s.generate_chunk(1).unwrap();
        let name = v[0].as_str().unwrap();
        assert_eq!(name, name.to_uppercase());

        let p = params(serde_json::json!({"case": "lower", "seed": 4}));
        let mut s = RandomNameStrategy::from_params(&p).unwrap();
        let v = s.generate_chunk(1).unwrap();
        let name = v[0].as_str().unwrap();
        assert_eq!(name, name.to_lowercase());
    }

    #[test]
    fn test_invalid_variant_rejected() {
        let p = params(serde_json::json!({"name_type": "nickname"}));
        assert!(RandomNameStrategy::from_params(&p).is_err());
        let p = params(serde_json::json!({"gender": "unknown"}));
        assert!(RandomNameStrategy::from_params(&p).is_err());
    }

    #[test]
    fn test_chunk_equivalence() {
        let p = params(serde_json::json!({"name_type": "full", "seed": 5}));
        let mut s = RandomNameStrategy::from_params(&p).unwrap();
        assert_chunk_equivalence(&mut s, 30);
    }
}
