use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{fields, AddictionLevel, Dataset, Record, Value};

// ---------------------------------------------------------------------------
// Filter predicate: what the user selected in the sidebar
// ---------------------------------------------------------------------------

/// Conjunctive filter over the working dataset.
///
/// An empty `countries` set means "no country constraint"; an empty
/// `genders` or `levels` set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub countries: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub min_age: i64,
    pub max_age: i64,
    pub levels: BTreeSet<AddictionLevel>,
}

impl FilterCriteria {
    /// Does a single record pass every predicate?
    pub fn matches(&self, record: &Record, check_country: bool) -> bool {
        if check_country {
            let country = record.get(fields::COUNTRY).map(cell_label);
            if !country.is_some_and(|c| self.countries.contains(&c)) {
                return false;
            }
        }

        let gender = record.get(fields::GENDER).map(cell_label);
        if !gender.is_some_and(|g| self.genders.contains(&g)) {
            return false;
        }

        match record.number(fields::AGE) {
            Some(age) if age >= self.min_age as f64 && age <= self.max_age as f64 => {}
            _ => return false,
        }

        record.level().is_some_and(|l| self.levels.contains(&l))
    }
}

/// Return the records passing all predicates, in their original order.
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    let check_country = dataset.has_field(fields::COUNTRY) && !criteria.countries.is_empty();
    let records = dataset
        .records
        .iter()
        .filter(|r| criteria.matches(r, check_country))
        .cloned()
        .collect();
    dataset.with_records(records)
}

/// Categorical cells compared as their display text.
fn cell_label(value: &Value) -> String {
    value.to_string()
}

// ---------------------------------------------------------------------------
// Filter options: what the sidebar offers for a dataset
// ---------------------------------------------------------------------------

/// Selectable values derived from the working dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Sorted distinct countries; empty when the column is absent.
    pub countries: Vec<String>,
    pub genders: Vec<String>,
    pub min_age: i64,
    pub max_age: i64,
    /// Levels present in the data, in canonical order.
    pub levels: Vec<AddictionLevel>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let labels = |field: &str| -> Vec<String> {
            dataset
                .distinct(field)
                .iter()
                .map(cell_label)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        let ages = dataset.numbers(fields::AGE);
        let min_age = ages.iter().copied().fold(f64::INFINITY, f64::min);
        let max_age = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (min_age, max_age) = if ages.is_empty() {
            (0, 0)
        } else {
            (min_age.floor() as i64, max_age.ceil() as i64)
        };

        let present: BTreeSet<AddictionLevel> =
            dataset.records.iter().filter_map(Record::level).collect();

        FilterOptions {
            countries: if dataset.has_field(fields::COUNTRY) {
                labels(fields::COUNTRY)
            } else {
                Vec::new()
            },
            genders: labels(fields::GENDER),
            min_age,
            max_age,
            levels: AddictionLevel::ALL
                .into_iter()
                .filter(|l| present.contains(l))
                .collect(),
        }
    }

    /// Initial selection: everything except countries, which default to
    /// the first `country_limit` when there are more than that.
    pub fn default_criteria(&self, country_limit: usize) -> FilterCriteria {
        let countries = if self.countries.len() > country_limit {
            self.countries.iter().take(country_limit).cloned().collect()
        } else {
            self.countries.iter().cloned().collect()
        };
        FilterCriteria {
            countries,
            genders: self.genders.iter().cloned().collect(),
            min_age: self.min_age,
            max_age: self.max_age,
            levels: self.levels.iter().copied().collect(),
        }
    }
}
