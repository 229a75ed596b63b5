use std::collections::BTreeSet;
use std::sync::Arc;

use usage_health::data::model::AddictionLevel;
use usage_health::view::{self, RenderModel, ViewSelection};
use usage_health::{DashboardConfig, DataSource, Dataset, FilterCriteria, FilterOptions, SessionCache};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Tabs of the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Sleep,
    Health,
    Social,
    Correlation,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Sleep, Tab::Health, Tab::Social, Tab::Correlation];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Sleep => "Sleep",
            Tab::Health => "Health",
            Tab::Social => "Social Media",
            Tab::Correlation => "Correlation",
        }
    }
}

/// Categorical sidebar lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Country,
    Gender,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Cleaned dataset of this session, keyed by source.
    cache: SessionCache,

    /// Working dataset (None until a source loads).
    pub dataset: Option<Arc<Dataset>>,

    /// What the sidebar offers for the current dataset.
    pub options: FilterOptions,

    /// What the sidebar has selected.
    pub criteria: FilterCriteria,

    /// Metric picked on the health and social tabs.
    pub selection: ViewSelection,

    /// Output of the last pipeline run.
    pub model: Option<RenderModel>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: SessionCache::new(),
            dataset: None,
            options: FilterOptions::default(),
            criteria: FilterCriteria::default(),
            selection: ViewSelection::default(),
            model: None,
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Load `source` through the session cache and reset the filters.
    ///
    /// On failure the notice is shown and the previous dataset (if any)
    /// stays in place.
    pub fn open(&mut self, source: DataSource) {
        match self.cache.get_or_load(&source) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {source}: {e:#}");
                self.status_message = Some(format!(
                    "Could not load {source}: {e:#}. Open a CSV file to continue."
                ));
            }
        }
    }

    /// Ingest a newly loaded dataset and initialise the filters.
    fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.options = FilterOptions::from_dataset(&dataset);
        self.criteria = self.options.default_criteria(self.config.default_country_limit);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Rerun filter → aggregate for the current selections.
    pub fn refresh(&mut self) {
        self.model = self.dataset.as_ref().map(|ds| {
            view::build(ds, &self.criteria, &self.selection, self.config.preview_rows)
        });
    }

    fn facet_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Country => &mut self.criteria.countries,
            Facet::Gender => &mut self.criteria.genders,
        }
    }

    pub fn facet_values(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Country => &self.options.countries,
            Facet::Gender => &self.options.genders,
        }
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Country => self.criteria.countries.contains(value),
            Facet::Gender => self.criteria.genders.contains(value),
        }
    }

    /// Toggle a single value in a categorical filter.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selected = self.facet_mut(facet);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh();
    }

    /// Select all values of a categorical filter.
    pub fn select_all(&mut self, facet: Facet) {
        let all: BTreeSet<String> = self.facet_values(facet).iter().cloned().collect();
        *self.facet_mut(facet) = all;
        self.refresh();
    }

    /// Deselect all values of a categorical filter.
    pub fn select_none(&mut self, facet: Facet) {
        self.facet_mut(facet).clear();
        self.refresh();
    }

    pub fn toggle_level(&mut self, level: AddictionLevel) {
        if !self.criteria.levels.remove(&level) {
            self.criteria.levels.insert(level);
        }
        self.refresh();
    }

    /// Set the age range, keeping `min <= max`.
    pub fn set_age_range(&mut self, min: i64, max: i64) {
        self.criteria.min_age = min.min(max);
        self.criteria.max_age = max.max(min);
        self.refresh();
    }

    pub fn set_health_metric(&mut self, metric: String) {
        self.selection.health_metric = Some(metric);
        self.refresh();
    }

    pub fn set_social_metric(&mut self, metric: String) {
        self.selection.social_metric = Some(metric);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Age,Gender,Country,Self_Reported_Addiction_Level,Sleep_Hours\n\
                       20,Female,Spain,Low,8\n\
                       30,Male,Spain,High,6\n\
                       40,Female,India,Severe,5\n";

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.open(DataSource::upload("data.csv", CSV.as_bytes().to_vec()));
        state
    }

    #[test]
    fn opening_a_source_selects_everything() {
        let state = loaded();
        let model = state.model.as_ref().unwrap();
        assert_eq!(model.kpis.record_count, 3);
        assert_eq!(state.criteria.countries.len(), 2);
        assert_eq!((state.criteria.min_age, state.criteria.max_age), (20, 40));
    }

    #[test]
    fn toggles_rerun_the_pipeline() {
        let mut state = loaded();
        state.toggle(Facet::Gender, "Male");
        assert_eq!(state.model.as_ref().unwrap().kpis.record_count, 2);

        state.select_none(Facet::Gender);
        assert_eq!(state.model.as_ref().unwrap().kpis.record_count, 0);

        state.select_all(Facet::Gender);
        state.toggle_level(AddictionLevel::Severe);
        assert_eq!(state.model.as_ref().unwrap().kpis.record_count, 2);

        state.set_age_range(35, 25);
        assert_eq!((state.criteria.min_age, state.criteria.max_age), (25, 35));
    }

    #[test]
    fn failed_load_shows_a_notice_and_runs_nothing() {
        let mut state = AppState::new(DashboardConfig::default());
        state.open(DataSource::Path("/nonexistent/data.csv".into()));
        assert!(state.model.is_none());
        assert!(state.status_message.is_some());
    }
}
