use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use usage_health::AddictionLevel;
use usage_health::DataSource;

use crate::color;
use crate::state::{AppState, Facet};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if !state.options.countries.is_empty() {
                facet_list(ui, state, Facet::Country, "Country");
            }
            facet_list(ui, state, Facet::Gender, "Gender");
            ui.separator();

            age_range(ui, state);
            ui.separator();

            ui.strong("Addiction level");
            for level in state.options.levels.clone() {
                let mut checked = state.criteria.levels.contains(&level);
                let text = RichText::new(level.as_str()).color(color::level_color(level));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_level(level);
                }
            }
            if state.options.levels.len() < AddictionLevel::ALL.len() {
                ui.weak("Levels missing from the data are hidden.");
            }
        });
}

/// Collapsible checkbox list for one categorical column.
fn facet_list(ui: &mut Ui, state: &mut AppState, facet: Facet, title: &str) {
    let values = state.facet_values(facet).to_vec();
    let n_selected = values.iter().filter(|v| state.is_selected(facet, v)).count();
    let header_text = format!("{title}  ({n_selected}/{})", values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(facet == Facet::Gender)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(facet);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(facet);
                }
            });

            for value in &values {
                let mut checked = state.is_selected(facet, value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle(facet, value);
                }
            }
        });

    if facet == Facet::Country && n_selected == 0 {
        ui.weak("No country selected: all countries shown.");
    }
}

fn age_range(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Age range");
    let bounds = state.options.min_age..=state.options.max_age;
    let mut min = state.criteria.min_age;
    let mut max = state.criteria.max_age;

    let min_changed = ui
        .add(egui::Slider::new(&mut min, bounds.clone()).text("min"))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut max, bounds).text("max"))
        .changed();

    if min_changed || max_changed {
        state.set_age_range(min, max);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open default dataset").clicked() {
                state.open(DataSource::Path(state.config.data_path.clone()));
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(model)) = (&state.dataset, &state.model) {
            ui.label(format!(
                "{} records loaded, {} match the filters",
                ds.len(),
                model.kpis.record_count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Pick a file and hand its bytes to the session as an upload.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open usage & health data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match std::fs::read(&path) {
        Ok(bytes) => state.open(DataSource::upload(name, bytes)),
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            state.status_message = Some(format!("Error reading {name}: {e}"));
        }
    }
}
