//! Render model: everything one interaction needs, computed from scratch.
//!
//! `build` is a pure function of the working dataset, the filter criteria
//! and the per-tab metric choices. The UI and the `report` command both
//! draw from its output and keep no other derived state.

use serde::Serialize;

use crate::data::aggregate::{
    self, CorrelationMatrix, GroupMean, Kpis, LevelMean, QuartileBin, TrendLine,
};
use crate::data::filter::{self, FilterCriteria};
use crate::data::model::{fields, Dataset};

/// Health metrics offered on the health tab, in menu order.
pub const HEALTH_METRICS: [&str; 4] = [
    fields::MENTAL_HEALTH,
    fields::DEPRESSION,
    fields::ANXIETY,
    fields::STRESS,
];

/// Y-axis metrics offered on the social-media tab, in menu order.
pub const SOCIAL_METRICS: [&str; 5] = [
    fields::SLEEP,
    fields::MENTAL_HEALTH,
    fields::DEPRESSION,
    fields::ANXIETY,
    fields::STRESS,
];

/// Columns considered for the correlation matrix.
pub const CORRELATION_FIELDS: [&str; 11] = [
    fields::SCREEN_TIME,
    fields::SOCIAL_MEDIA,
    fields::PHONE_UNLOCKS,
    fields::SLEEP,
    fields::MENTAL_HEALTH,
    fields::DEPRESSION,
    fields::ANXIETY,
    fields::STRESS,
    fields::PHYSICAL_ACTIVITY,
    fields::FAMILY_TIME,
    fields::NOTIFICATIONS,
];

/// Points drawn along a trend line.
const TREND_POINTS: usize = 100;

/// Metric picked on each tab. `None`, or a metric the dataset lacks,
/// falls back to the first available one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewSelection {
    pub health_metric: Option<String>,
    pub social_metric: Option<String>,
}

// ---------------------------------------------------------------------------
// Model types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x_field: String,
    pub y_field: String,
    pub points: Vec<[f64; 2]>,
    pub trend: Option<TrendLine>,
}

impl Scatter {
    /// Sampled trend line, ready to draw.
    pub fn trend_points(&self) -> Option<Vec<[f64; 2]>> {
        self.trend.as_ref().map(|t| t.points(TREND_POINTS))
    }
}

/// Sleep tab; absent when the dataset has no sleep column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepView {
    pub by_level: Vec<LevelMean>,
    /// Sleep per social-media quartile; `None` without a social-media column.
    pub by_social_quartile: Option<Vec<QuartileBin>>,
    /// Sleep per night-mode setting; `None` without a night-mode column.
    pub by_night_mode: Option<Vec<GroupMean>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthView {
    /// Metrics the dataset carries, in menu order.
    pub metrics: Vec<String>,
    pub selected: Option<String>,
    pub by_level: Vec<LevelMean>,
    pub vs_screen_time: Option<Scatter>,
    pub unlocks_vs_stress: Option<Scatter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialView {
    pub metrics: Vec<String>,
    pub selected: Option<String>,
    pub scatter: Option<Scatter>,
    /// Social-media hours per level; empty without a social-media column.
    pub by_level: Vec<LevelMean>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationView {
    Matrix(CorrelationMatrix),
    Insufficient { reason: String },
}

/// First rows of the filtered table, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the filtered table, shown or not.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub criteria: FilterCriteria,
    pub kpis: Kpis,
    pub sleep: Option<SleepView>,
    pub health: HealthView,
    pub social: SocialView,
    pub correlation: CorrelationView,
    pub preview: Preview,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Filter `dataset` by `criteria` and derive every view from the result.
pub fn build(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    selection: &ViewSelection,
    preview_rows: usize,
) -> RenderModel {
    let filtered = filter::apply(dataset, criteria);
    log::debug!(
        "{} of {} records pass the current filters",
        filtered.len(),
        dataset.len()
    );

    RenderModel {
        criteria: criteria.clone(),
        kpis: aggregate::kpis(&filtered),
        sleep: sleep_view(&filtered),
        health: health_view(&filtered, selection.health_metric.as_deref()),
        social: social_view(&filtered, selection.social_metric.as_deref()),
        correlation: correlation_view(&filtered),
        preview: preview(&filtered, preview_rows),
    }
}

fn sleep_view(ds: &Dataset) -> Option<SleepView> {
    if !ds.has_field(fields::SLEEP) {
        return None;
    }
    Some(SleepView {
        by_level: aggregate::mean_by_level(ds, fields::SLEEP),
        by_social_quartile: ds
            .has_field(fields::SOCIAL_MEDIA)
            .then(|| aggregate::quartile_bin_mean(ds, fields::SOCIAL_MEDIA, fields::SLEEP)),
        by_night_mode: ds
            .has_field(fields::NIGHT_MODE)
            .then(|| aggregate::mean_by(ds, fields::NIGHT_MODE, fields::SLEEP)),
    })
}

fn health_view(ds: &Dataset, choice: Option<&str>) -> HealthView {
    let metrics = available(ds, &HEALTH_METRICS);
    let selected = resolve(&metrics, choice);

    let (by_level, vs_screen_time) = match &selected {
        Some(metric) => (
            aggregate::mean_by_level(ds, metric),
            ds.has_field(fields::SCREEN_TIME)
                .then(|| scatter(ds, fields::SCREEN_TIME, metric, true)),
        ),
        None => (Vec::new(), None),
    };

    HealthView {
        by_level,
        vs_screen_time,
        unlocks_vs_stress: (ds.has_field(fields::PHONE_UNLOCKS) && ds.has_field(fields::STRESS))
            .then(|| scatter(ds, fields::PHONE_UNLOCKS, fields::STRESS, false)),
        metrics,
        selected,
    }
}

fn social_view(ds: &Dataset, choice: Option<&str>) -> SocialView {
    let metrics = available(ds, &SOCIAL_METRICS);
    let selected = resolve(&metrics, choice);
    let has_social = ds.has_field(fields::SOCIAL_MEDIA);

    SocialView {
        scatter: selected
            .as_deref()
            .filter(|_| has_social)
            .map(|metric| scatter(ds, fields::SOCIAL_MEDIA, metric, true)),
        by_level: aggregate::mean_by_level(ds, fields::SOCIAL_MEDIA),
        metrics,
        selected,
    }
}

fn correlation_view(ds: &Dataset) -> CorrelationView {
    match aggregate::pairwise_correlation(ds, &CORRELATION_FIELDS) {
        Ok(matrix) => CorrelationView::Matrix(matrix),
        Err(e) => CorrelationView::Insufficient {
            reason: e.to_string(),
        },
    }
}

fn preview(ds: &Dataset, limit: usize) -> Preview {
    let rows = ds
        .records
        .iter()
        .take(limit)
        .map(|r| {
            ds.columns
                .iter()
                .map(|c| r.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    Preview {
        columns: ds.columns.clone(),
        rows,
        total: ds.len(),
    }
}

fn scatter(ds: &Dataset, x: &str, y: &str, with_trend: bool) -> Scatter {
    let pairs = aggregate::paired(ds, x, y);
    Scatter {
        x_field: x.to_string(),
        y_field: y.to_string(),
        points: pairs.iter().map(|&(x, y)| [x, y]).collect(),
        trend: if with_trend {
            aggregate::trend_line(&pairs)
        } else {
            None
        },
    }
}

fn available(ds: &Dataset, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|f| ds.has_field(f))
        .map(|f| f.to_string())
        .collect()
}

fn resolve(metrics: &[String], choice: Option<&str>) -> Option<String> {
    choice
        .and_then(|c| metrics.iter().find(|m| *m == c))
        .or_else(|| metrics.first())
        .cloned()
}
