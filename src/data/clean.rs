use super::model::{fields, AddictionLevel, Dataset, Record, Value};

// ---------------------------------------------------------------------------
// Cleaning stage: raw Dataset → working Dataset
// ---------------------------------------------------------------------------

/// Produce the working dataset from a freshly loaded one.
///
/// * Hours fields become numbers (or missing) and are clamped at zero.
/// * Count / score fields and `Age` become numbers (or missing).
/// * Records without a numeric `Age`, a `Gender`, or a recognised
///   addiction level are dropped.
pub fn clean(raw: &Dataset) -> Dataset {
    let hours: Vec<&str> = fields::HOURS
        .into_iter()
        .filter(|f| raw.has_field(f))
        .collect();
    let measures: Vec<&str> = fields::MEASURES
        .into_iter()
        .chain([fields::AGE])
        .filter(|f| raw.has_field(f))
        .collect();

    let records: Vec<Record> = raw
        .records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            for field in &hours {
                coerce(&mut record, field, |v| v.max(0.0));
            }
            for field in &measures {
                coerce(&mut record, field, |v| v);
            }
            record
        })
        .filter(is_complete)
        .collect();

    let dropped = raw.len() - records.len();
    if dropped > 0 {
        log::info!("cleaning dropped {dropped} of {} records", raw.len());
    }
    Dataset::new(raw.columns.clone(), records)
}

/// Parse `field` as a number and pass it through `adjust`; anything that
/// is not a number becomes missing.
fn coerce(record: &mut Record, field: &str, adjust: impl Fn(f64) -> f64) {
    let Some(cell) = record.values.get_mut(field) else {
        return;
    };
    *cell = match &*cell {
        Value::Integer(i) => Value::Integer(adjust(*i as f64) as i64),
        other => match to_number(other) {
            Some(v) => Value::Float(adjust(v)),
            None => Value::Null,
        },
    };
}

fn to_number(cell: &Value) -> Option<f64> {
    match cell {
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        other => other.as_f64(),
    }
}

fn is_complete(record: &Record) -> bool {
    record.number(fields::AGE).is_some()
        && record.get(fields::GENDER).is_some()
        && record
            .text(fields::ADDICTION_LEVEL)
            .and_then(AddictionLevel::parse)
            .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(age: Value, sleep: Value, level: &str) -> Record {
        Record::from_iter([
            (fields::AGE, age),
            (fields::GENDER, Value::String("Female".into())),
            (fields::ADDICTION_LEVEL, Value::String(level.into())),
            (fields::SLEEP, sleep),
        ])
    }

    fn columns() -> Vec<String> {
        [fields::AGE, fields::GENDER, fields::ADDICTION_LEVEL, fields::SLEEP]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn negative_hours_clamp_to_zero() {
        let raw = Dataset::new(
            columns(),
            vec![
                row(Value::Integer(20), Value::Integer(-2), "Low"),
                row(Value::Integer(30), Value::Integer(5), "Low"),
                row(Value::Integer(40), Value::Float(7.0), "High"),
            ],
        );
        let cleaned = clean(&raw);

        assert_eq!(cleaned.numbers(fields::SLEEP), vec![0.0, 5.0, 7.0]);
        let mean = cleaned.numbers(fields::SLEEP).iter().sum::<f64>() / 3.0;
        assert_eq!(mean, 4.0);
    }

    #[test]
    fn unparsable_measures_become_missing_without_clamping() {
        let raw = Dataset::new(
            vec![fields::AGE.into(), fields::GENDER.into(), fields::ADDICTION_LEVEL.into(), fields::STRESS.into()],
            vec![
                Record::from_iter([
                    (fields::AGE, Value::Integer(20)),
                    (fields::GENDER, Value::String("Male".into())),
                    (fields::ADDICTION_LEVEL, Value::String("Severe".into())),
                    (fields::STRESS, Value::String("high".into())),
                ]),
                Record::from_iter([
                    (fields::AGE, Value::Integer(21)),
                    (fields::GENDER, Value::String("Male".into())),
                    (fields::ADDICTION_LEVEL, Value::String("Severe".into())),
                    (fields::STRESS, Value::Integer(-3)),
                ]),
            ],
        );
        let cleaned = clean(&raw);

        assert_eq!(cleaned.records[0].get(fields::STRESS), None);
        assert_eq!(cleaned.records[1].number(fields::STRESS), Some(-3.0));
        assert!(cleaned.is_numeric(fields::STRESS));
    }

    #[test]
    fn hours_are_never_negative_after_cleaning() {
        let raw = Dataset::new(
            columns(),
            (-5..5)
                .map(|h| row(Value::Integer(30), Value::Integer(h), "Moderate"))
                .chain([row(Value::Integer(30), Value::String("n/a".into()), "Low")])
                .collect(),
        );
        let cleaned = clean(&raw);
        for record in &cleaned.records {
            if let Some(v) = record.get(fields::SLEEP) {
                assert!(v.as_f64().is_some_and(|h| h >= 0.0));
            }
        }
    }

    #[test]
    fn incomplete_records_are_dropped() {
        let mut no_gender = row(Value::Integer(30), Value::Integer(7), "Low");
        no_gender.values.remove(fields::GENDER);

        let raw = Dataset::new(
            columns(),
            vec![
                row(Value::Null, Value::Integer(7), "Low"),
                row(Value::String("thirty".into()), Value::Integer(7), "Low"),
                row(Value::Integer(30), Value::Integer(7), "Extreme"),
                no_gender,
                row(Value::Integer(30), Value::Integer(7), "Severe"),
            ],
        );
        let cleaned = clean(&raw);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.records[0].level(), Some(AddictionLevel::Severe));
        assert_eq!(cleaned.columns, raw.columns);
    }
}
