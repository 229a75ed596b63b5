use std::collections::BTreeMap;

use serde::Serialize;

use super::error::AnalysisError;
use super::model::{fields, AddictionLevel, Dataset, Value};
use super::stats;

/// A trend line needs strictly more paired samples than this.
pub const TREND_MIN_SAMPLES: usize = 5;

/// Fewest non-missing bin-field values for a quartile split.
pub const QUARTILE_MIN_SAMPLES: usize = 4;

// ---------------------------------------------------------------------------
// Group means
// ---------------------------------------------------------------------------

/// Mean of one field for one addiction level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelMean {
    pub level: AddictionLevel,
    pub mean: f64,
    /// Non-missing values averaged.
    pub count: usize,
}

/// Mean of `field` per addiction level, in canonical level order.
///
/// Levels without any non-missing value of `field` are left out; an
/// absent `field` yields an empty result.
pub fn mean_by_level(dataset: &Dataset, field: &str) -> Vec<LevelMean> {
    if !dataset.has_field(field) {
        return Vec::new();
    }

    let mut groups: BTreeMap<AddictionLevel, Vec<f64>> = BTreeMap::new();
    for record in &dataset.records {
        if let (Some(level), Some(v)) = (record.level(), record.number(field)) {
            groups.entry(level).or_default().push(v);
        }
    }

    groups
        .into_iter()
        .filter_map(|(level, values)| {
            Some(LevelMean {
                level,
                mean: stats::mean(&values)?,
                count: values.len(),
            })
        })
        .collect()
}

/// Mean of a field for one distinct value of a grouping column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: Value,
    pub mean: f64,
    pub count: usize,
}

/// Mean of `value_field` per distinct value of `key_field`, sorted by key.
pub fn mean_by(dataset: &Dataset, key_field: &str, value_field: &str) -> Vec<GroupMean> {
    if !dataset.has_field(key_field) || !dataset.has_field(value_field) {
        return Vec::new();
    }

    let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
    for record in &dataset.records {
        if let (Some(key), Some(v)) = (record.get(key_field), record.number(value_field)) {
            groups.entry(key.clone()).or_default().push(v);
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, values)| {
            Some(GroupMean {
                mean: stats::mean(&values)?,
                count: values.len(),
                key,
            })
        })
        .collect()
}

/// Mean of a column over the dataset, `None` when absent or empty.
pub fn field_mean(dataset: &Dataset, field: &str) -> Option<f64> {
    if !dataset.has_field(field) {
        return None;
    }
    stats::mean(&dataset.numbers(field))
}

// ---------------------------------------------------------------------------
// Quartile bins
// ---------------------------------------------------------------------------

/// One quantile bin of `bin_field` and the mean of the value field in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileBin {
    pub lower: f64,
    pub upper: f64,
    /// `[lower, upper]` for the first bin, `(lower, upper]` after.
    pub label: String,
    /// Records whose bin value falls in this bin.
    pub count: usize,
    /// `None` when none of those records carries the value field.
    pub mean: Option<f64>,
}

/// Split records at the 25/50/75th percentiles of `bin_field` and average
/// `value_field` per bin, lowest bin first.
///
/// Duplicate edges collapse and empty bins are dropped, so ties or low
/// cardinality give fewer than four bins. Fewer than
/// [`QUARTILE_MIN_SAMPLES`] values give no bins at all.
pub fn quartile_bin_mean(dataset: &Dataset, bin_field: &str, value_field: &str) -> Vec<QuartileBin> {
    if !dataset.has_field(bin_field) || !dataset.has_field(value_field) {
        return Vec::new();
    }

    let mut sorted = dataset.numbers(bin_field);
    if sorted.len() < QUARTILE_MIN_SAMPLES {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = [0.0, 0.25, 0.5, 0.75, 1.0]
        .iter()
        .filter_map(|&q| stats::quantile_sorted(&sorted, q))
        .collect();
    edges.dedup();
    if edges.len() < 2 {
        return Vec::new();
    }

    let n_bins = edges.len() - 1;
    let mut counts = vec![0usize; n_bins];
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); n_bins];
    for record in &dataset.records {
        let Some(x) = record.number(bin_field) else {
            continue;
        };
        let bin = edges[1..]
            .iter()
            .position(|&upper| x <= upper)
            .unwrap_or(n_bins - 1);
        counts[bin] += 1;
        if let Some(v) = record.number(value_field) {
            values[bin].push(v);
        }
    }

    (0..n_bins)
        .filter(|&i| counts[i] > 0)
        .map(|i| {
            let (lower, upper) = (edges[i], edges[i + 1]);
            let open = if i == 0 { '[' } else { '(' };
            QuartileBin {
                lower,
                upper,
                label: format!("{open}{lower:.2}, {upper:.2}]"),
                count: counts[i],
                mean: stats::mean(&values[i]),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric Pearson matrix over `fields`. Off-diagonal cells are `None`
/// when a pair has fewer than two joint samples or no variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.fields.iter().position(|f| f == row)?;
        let j = self.fields.iter().position(|f| f == col)?;
        self.values[i][j]
    }
}

/// Pairwise Pearson correlation among the listed fields that are numeric
/// and carry data. Each pair uses the records where both are present.
pub fn pairwise_correlation(
    dataset: &Dataset,
    candidates: &[&str],
) -> Result<CorrelationMatrix, AnalysisError> {
    let fields: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|f| dataset.is_numeric(f))
        .filter(|f| dataset.records.iter().any(|r| r.number(f).is_some()))
        .collect();

    if fields.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "correlation needs at least two numeric fields, found {}",
            fields.len()
        )));
    }
    if dataset.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "correlation needs at least two records, found {}",
            dataset.len()
        )));
    }

    let n = fields.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = stats::pearson(&paired(dataset, fields[i], fields[j]));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        fields: fields.into_iter().map(String::from).collect(),
        values,
    })
}

// ---------------------------------------------------------------------------
// Scatter samples and trend lines
// ---------------------------------------------------------------------------

/// `(x, y)` pairs from records carrying both fields, in row order.
pub fn paired(dataset: &Dataset, x: &str, y: &str) -> Vec<(f64, f64)> {
    dataset
        .records
        .iter()
        .filter_map(|r| Some((r.number(x)?, r.number(y)?)))
        .collect()
}

/// Least-squares line fitted over a scatter's samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub samples: usize,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// `n` evenly spaced points across the sampled x range.
    pub fn points(&self, n: usize) -> Vec<[f64; 2]> {
        let span = self.x_max - self.x_min;
        let steps = n.saturating_sub(1).max(1) as f64;
        (0..n.max(2))
            .map(|i| {
                let x = self.x_min + span * (i as f64 / steps).min(1.0);
                [x, self.at(x)]
            })
            .collect()
    }
}

/// Fit a trend when there are more than [`TREND_MIN_SAMPLES`] pairs.
pub fn trend_line(pairs: &[(f64, f64)]) -> Option<TrendLine> {
    if pairs.len() <= TREND_MIN_SAMPLES {
        return None;
    }
    let (slope, intercept) = stats::least_squares(pairs)?;
    let x_min = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = pairs.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    Some(TrendLine {
        slope,
        intercept,
        x_min,
        x_max,
        samples: pairs.len(),
    })
}

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

/// Headline figures shown above the tabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub record_count: usize,
    pub mean_sleep: Option<f64>,
    pub mean_mental_health: Option<f64>,
    pub mean_social_media: Option<f64>,
}

pub fn kpis(dataset: &Dataset) -> Kpis {
    Kpis {
        record_count: dataset.len(),
        mean_sleep: field_mean(dataset, fields::SLEEP),
        mean_mental_health: field_mean(dataset, fields::MENTAL_HEALTH),
        mean_social_media: field_mean(dataset, fields::SOCIAL_MEDIA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use pretty_assertions::assert_eq;

    fn dataset(columns: &[&str], rows: Vec<Vec<Value>>) -> Dataset {
        let records = rows
            .into_iter()
            .map(|row| columns.iter().map(|c| c.to_string()).zip(row).collect::<Record>())
            .collect();
        Dataset::new(columns.iter().map(|c| c.to_string()).collect(), records)
    }

    fn s(v: &str) -> Value {
        Value::String(v.into())
    }

    fn f(v: f64) -> Value {
        Value::Float(v)
    }

    #[test]
    fn level_means_follow_canonical_order() {
        let ds = dataset(
            &[fields::ADDICTION_LEVEL, fields::SLEEP],
            vec![
                vec![s("Severe"), f(4.0)],
                vec![s("Low"), f(8.0)],
                vec![s("Severe"), f(5.0)],
                vec![s("High"), Value::Null],
                vec![s("Low"), f(7.0)],
            ],
        );
        let means = mean_by_level(&ds, fields::SLEEP);
        assert_eq!(
            means,
            vec![
                LevelMean { level: AddictionLevel::Low, mean: 7.5, count: 2 },
                LevelMean { level: AddictionLevel::Severe, mean: 4.5, count: 2 },
            ]
        );
        assert!(mean_by_level(&ds, "Missing_Field").is_empty());
    }

    #[test]
    fn group_means_sort_by_key() {
        let ds = dataset(
            &[fields::NIGHT_MODE, fields::SLEEP],
            vec![
                vec![Value::Bool(true), f(7.0)],
                vec![Value::Bool(false), f(5.0)],
                vec![Value::Bool(true), f(8.0)],
            ],
        );
        let means = mean_by(&ds, fields::NIGHT_MODE, fields::SLEEP);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].key, Value::Bool(false));
        assert_eq!(means[0].mean, 5.0);
        assert_eq!(means[1].mean, 7.5);
        assert!(mean_by(&ds, fields::COUNTRY, fields::SLEEP).is_empty());
    }

    #[test]
    fn quartiles_of_spread_data_give_four_bins() {
        let ds = dataset(
            &[fields::SOCIAL_MEDIA, fields::SLEEP],
            (1..=8).map(|i| vec![f(i as f64), f(10.0 - i as f64)]).collect(),
        );
        let bins = quartile_bin_mean(&ds, fields::SOCIAL_MEDIA, fields::SLEEP);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 8);
        assert!(bins.windows(2).all(|w| w[0].upper <= w[1].lower));
        assert_eq!(bins[0].label, "[1.00, 2.75]");
        assert_eq!(bins[0].mean, Some(8.5));
        assert_eq!(bins[3].mean, Some(2.5));
    }

    #[test]
    fn low_cardinality_gives_fewer_bins() {
        let ds = dataset(
            &[fields::SOCIAL_MEDIA, fields::SLEEP],
            [1.0, 1.0, 2.0, 2.0, 3.0, 3.0]
                .iter()
                .map(|&x| vec![f(x), f(x * 2.0)])
                .collect(),
        );
        let bins = quartile_bin_mean(&ds, fields::SOCIAL_MEDIA, fields::SLEEP);
        assert_eq!(bins.len(), 3);
        assert_eq!(
            bins.iter().map(|b| b.mean).collect::<Vec<_>>(),
            vec![Some(2.0), Some(4.0), Some(6.0)]
        );
    }

    #[test]
    fn ties_collapse_edges() {
        let ds = dataset(
            &[fields::SOCIAL_MEDIA, fields::SLEEP],
            [1.0, 1.0, 1.0, 1.0, 2.0]
                .iter()
                .map(|&x| vec![f(x), f(6.0)])
                .collect(),
        );
        let bins = quartile_bin_mean(&ds, fields::SOCIAL_MEDIA, fields::SLEEP);
        assert!(bins.len() < 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn too_few_or_constant_values_give_no_bins() {
        let few = dataset(
            &[fields::SOCIAL_MEDIA, fields::SLEEP],
            vec![vec![f(1.0), f(7.0)], vec![f(2.0), f(6.0)]],
        );
        assert!(quartile_bin_mean(&few, fields::SOCIAL_MEDIA, fields::SLEEP).is_empty());

        let constant = dataset(
            &[fields::SOCIAL_MEDIA, fields::SLEEP],
            (0..6).map(|_| vec![f(3.0), f(7.0)]).collect(),
        );
        assert!(quartile_bin_mean(&constant, fields::SOCIAL_MEDIA, fields::SLEEP).is_empty());
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let ds = dataset(
            &["a", "b", "c"],
            vec![
                vec![f(1.0), f(2.0), f(9.0)],
                vec![f(2.0), f(4.5), f(7.0)],
                vec![f(3.0), f(5.5), f(8.0)],
                vec![f(4.0), Value::Null, f(1.0)],
                vec![f(5.0), f(11.0), f(2.0)],
            ],
        );
        let m = pairwise_correlation(&ds, &["a", "b", "c"]).unwrap();
        assert_eq!(m.fields, vec!["a", "b", "c"]);
        for i in 0..3 {
            assert_eq!(m.values[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(m.values[i][j], m.values[j][i]);
            }
        }
        assert!(m.get("a", "b").unwrap() > 0.9);
        assert!(m.get("a", "c").unwrap() < 0.0);
    }

    #[test]
    fn single_numeric_field_is_insufficient() {
        let ds = dataset(
            &["a", "label"],
            vec![vec![f(1.0), s("x")], vec![f(2.0), s("y")]],
        );
        let err = pairwise_correlation(&ds, &["a", "label", "absent"]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn empty_dataset_correlation_is_insufficient() {
        let ds = dataset(&["a", "b"], vec![vec![f(1.0), f(2.0)]]);
        assert!(pairwise_correlation(&ds, &["a", "b"]).is_err());
    }

    #[test]
    fn trend_requires_more_than_five_pairs() {
        let pairs: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 2.0 * i as f64)).collect();
        assert_eq!(trend_line(&pairs), None);

        let pairs: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let trend = trend_line(&pairs).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 1.0).abs() < 1e-12);
        assert_eq!((trend.x_min, trend.x_max), (0.0, 5.0));

        let pts = trend.points(100);
        assert_eq!(pts.len(), 100);
        assert_eq!(pts[0][0], 0.0);
        assert_eq!(pts[99][0], 5.0);
    }

    #[test]
    fn paired_drops_rows_missing_either_side() {
        let ds = dataset(
            &["x", "y"],
            vec![
                vec![f(1.0), f(2.0)],
                vec![Value::Null, f(3.0)],
                vec![f(4.0), Value::Null],
                vec![f(5.0), f(6.0)],
            ],
        );
        assert_eq!(paired(&ds, "x", "y"), vec![(1.0, 2.0), (5.0, 6.0)]);
    }

    #[test]
    fn kpis_skip_absent_fields() {
        let ds = dataset(&[fields::SLEEP], vec![vec![f(6.0)], vec![f(8.0)]]);
        assert_eq!(
            kpis(&ds),
            Kpis {
                record_count: 2,
                mean_sleep: Some(7.0),
                mean_mental_health: None,
                mean_social_media: None,
            }
        );
    }
}
