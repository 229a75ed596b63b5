use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// Column headers of the usage / health dataset.
pub mod fields {
    pub const AGE: &str = "Age";
    pub const GENDER: &str = "Gender";
    pub const COUNTRY: &str = "Country";
    pub const ADDICTION_LEVEL: &str = "Self_Reported_Addiction_Level";
    pub const NIGHT_MODE: &str = "Has_Night_Mode_On";

    pub const SCREEN_TIME: &str = "Daily_Screen_Time_Hours";
    pub const SOCIAL_MEDIA: &str = "Social_Media_Usage_Hours";
    pub const GAMING: &str = "Gaming_Usage_Hours";
    pub const STREAMING: &str = "Streaming_Usage_Hours";
    pub const MESSAGING: &str = "Messaging_Usage_Hours";
    pub const WORK: &str = "Work_Related_Usage_Hours";
    pub const SLEEP: &str = "Sleep_Hours";
    pub const PHYSICAL_ACTIVITY: &str = "Physical_Activity_Hours";
    pub const FAMILY_TIME: &str = "Time_Spent_With_Family_Hours";
    pub const ONLINE_SHOPPING: &str = "Online_Shopping_Hours";

    pub const PHONE_UNLOCKS: &str = "Phone_Unlocks_Per_Day";
    pub const NOTIFICATIONS: &str = "Push_Notifications_Per_Day";
    pub const MENTAL_HEALTH: &str = "Mental_Health_Score";
    pub const DEPRESSION: &str = "Depression_Score";
    pub const ANXIETY: &str = "Anxiety_Score";
    pub const STRESS: &str = "Stress_Level";
    pub const INCOME: &str = "Income_USD";

    /// Hours-valued fields: coerced to numbers and clamped at zero.
    pub const HOURS: [&str; 10] = [
        SCREEN_TIME,
        SOCIAL_MEDIA,
        GAMING,
        STREAMING,
        MESSAGING,
        WORK,
        SLEEP,
        PHYSICAL_ACTIVITY,
        FAMILY_TIME,
        ONLINE_SHOPPING,
    ];

    /// Count / score fields: coerced to numbers, never clamped.
    pub const MEASURES: [&str; 7] = [
        PHONE_UNLOCKS,
        NOTIFICATIONS,
        MENTAL_HEALTH,
        DEPRESSION,
        ANXIETY,
        STRESS,
        INCOME,
    ];

    /// Fields a record must carry to enter the working dataset.
    pub const REQUIRED: [&str; 3] = [AGE, GENDER, ADDICTION_LEVEL];
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Used as a `BTreeSet` key downstream, so `Value` must be `Ord`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn rank(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let (ra, rb) = (rank(self), rank(other));
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Null, Null) => std::cmp::Ordering::Equal,
            // Mixed numeric columns compare by magnitude.
            (a, b) => raw_number(a).total_cmp(&raw_number(b)),
        }
    }
}

/// Numeric payload including NaN; only called on numeric variants.
fn raw_number(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "—"),
        }
    }
}

impl Value {
    /// Numeric view of the cell, `None` for text, bools and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

// ---------------------------------------------------------------------------
// AddictionLevel – the ordinal category
// ---------------------------------------------------------------------------

/// Self-reported addiction level; the derive order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AddictionLevel {
    Low,
    Moderate,
    High,
    Severe,
}

impl AddictionLevel {
    pub const ALL: [AddictionLevel; 4] = [
        AddictionLevel::Low,
        AddictionLevel::Moderate,
        AddictionLevel::High,
        AddictionLevel::Severe,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Low" => Some(AddictionLevel::Low),
            "Moderate" => Some(AddictionLevel::Moderate),
            "High" => Some(AddictionLevel::High),
            "Severe" => Some(AddictionLevel::Severe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AddictionLevel::Low => "Low",
            AddictionLevel::Moderate => "Moderate",
            AddictionLevel::High => "High",
            AddictionLevel::Severe => "Severe",
        }
    }
}

impl fmt::Display for AddictionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One subject's row: column_name → value. Absent keys read as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub values: BTreeMap<String, Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field).filter(|v| !v.is_null())
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn level(&self) -> Option<AddictionLevel> {
        self.text(fields::ADDICTION_LEVEL).and_then(AddictionLevel::parse)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Record {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete table
// ---------------------------------------------------------------------------

/// An ordered table of records with its column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Column names in source order.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    /// Columns whose non-missing cells are all numeric.
    numeric_columns: BTreeSet<String>,
}

impl Dataset {
    /// Build a dataset; any key found in a record but missing from
    /// `columns` is appended to the schema in sorted order.
    pub fn new(mut columns: Vec<String>, records: Vec<Record>) -> Self {
        let known: BTreeSet<String> = columns.iter().cloned().collect();
        let extra: BTreeSet<&String> = records
            .iter()
            .flat_map(|r| r.values.keys())
            .filter(|k| !known.contains(*k))
            .collect();
        columns.extend(extra.into_iter().cloned());

        let numeric_columns = columns
            .iter()
            .filter(|col| {
                records
                    .iter()
                    .filter_map(|r| r.get(col))
                    .all(Value::is_numeric)
            })
            .cloned()
            .collect();

        Dataset {
            columns,
            records,
            numeric_columns,
        }
    }

    /// Same schema, different rows. Used by the filter stage so column
    /// capabilities stay those of the source dataset.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Dataset {
            columns: self.columns.clone(),
            records,
            numeric_columns: self.numeric_columns.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Schema capability query: is `name` a column of this dataset?
    pub fn has_field(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Whether `name` is present and holds only numeric (or missing) cells.
    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric_columns.contains(name)
    }

    /// Sorted distinct non-missing values of a column.
    pub fn distinct(&self, field: &str) -> BTreeSet<Value> {
        self.records
            .iter()
            .filter_map(|r| r.get(field))
            .cloned()
            .collect()
    }

    /// Non-missing numeric values of a column, in row order.
    pub fn numbers(&self, field: &str) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.number(field)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_agrees_with_ordering() {
        use std::cmp::Ordering;

        let pairs = [
            (Value::Integer(1), Value::Float(1.0)),
            (Value::Float(0.0), Value::Float(-0.0)),
            (Value::Float(f64::NAN), Value::Float(2.0)),
            (Value::Null, Value::Null),
            (Value::String("a".into()), Value::String("a".into())),
        ];
        for (a, b) in &pairs {
            assert_eq!(a == b, a.cmp(b) == Ordering::Equal, "{a:?} vs {b:?}");
        }
        assert_eq!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));

        let keys: BTreeSet<Value> = [Value::Integer(2), Value::Float(2.0), Value::Float(1.5)]
            .into_iter()
            .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn numeric_columns_ignore_missing_cells() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                Record::from_iter([("a", Value::Integer(1)), ("b", Value::String("x".into()))]),
                Record::from_iter([("a", Value::Null), ("b", Value::Float(2.0))]),
            ],
        );
        assert!(ds.is_numeric("a"));
        assert!(!ds.is_numeric("b"));
        assert!(!ds.is_numeric("c"));
    }

    #[test]
    fn record_keys_outside_header_extend_schema() {
        let ds = Dataset::new(
            vec!["Age".into()],
            vec![Record::from_iter([("Age", Value::Integer(30)), ("Zeta", Value::Bool(true))])],
        );
        assert_eq!(ds.columns, vec!["Age".to_string(), "Zeta".to_string()]);
        assert!(ds.has_field("Zeta"));
    }

    #[test]
    fn levels_sort_in_canonical_order() {
        let mut levels = vec![
            AddictionLevel::Severe,
            AddictionLevel::Low,
            AddictionLevel::High,
            AddictionLevel::Moderate,
        ];
        levels.sort();
        assert_eq!(levels, AddictionLevel::ALL.to_vec());
        assert_eq!(AddictionLevel::parse("Extreme"), None);
    }

    #[test]
    fn nan_float_reads_as_missing() {
        let r = Record::from_iter([("x", Value::Float(f64::NAN))]);
        assert_eq!(r.number("x"), None);
        assert!(r.get("x").is_none());
    }
}
