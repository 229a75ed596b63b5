use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use usage_health::data::aggregate::{GroupMean, LevelMean, QuartileBin};
use usage_health::view::{HealthView, RenderModel, Scatter, SleepView, SocialView};

use crate::color;
use crate::state::{AppState, Tab};
use crate::ui::table;

const CHART_HEIGHT: f32 = 260.0;

/// Metric picked in a combo box this frame.
enum Pick {
    Health(String),
    Social(String),
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPIs, the active tab and the data preview.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(model) = state.model.as_ref() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV file to start  (File → Open…)");
        });
        return;
    };

    let mut pick = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_row(ui, model);
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut state.tab, tab, tab.title());
                }
            });
            ui.add_space(6.0);

            pick = match state.tab {
                Tab::Sleep => {
                    sleep_tab(ui, model.sleep.as_ref());
                    None
                }
                Tab::Health => health_tab(ui, &model.health),
                Tab::Social => social_tab(ui, &model.social),
                Tab::Correlation => {
                    ui.heading("Correlations between numeric measures");
                    table::correlation_table(ui, &model.correlation);
                    None
                }
            };

            ui.separator();
            ui.heading("Data preview");
            table::preview_table(ui, &model.preview);
        });

    match pick {
        Some(Pick::Health(metric)) => state.set_health_metric(metric),
        Some(Pick::Social(metric)) => state.set_social_metric(metric),
        None => {}
    }
}

fn kpi_row(ui: &mut Ui, model: &RenderModel) {
    let fmt = |v: Option<f64>| v.map_or_else(|| "—".to_string(), |v| format!("{v:.2}"));
    let kpis = &model.kpis;
    let cells = [
        ("Records", kpis.record_count.to_string()),
        ("Mean sleep (h)", fmt(kpis.mean_sleep)),
        ("Mean mental health", fmt(kpis.mean_mental_health)),
        ("Mean social media (h)", fmt(kpis.mean_social_media)),
    ];
    ui.columns(cells.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cells) {
            col.label(label);
            col.label(RichText::new(value).size(22.0).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn sleep_tab(ui: &mut Ui, view: Option<&SleepView>) {
    let Some(view) = view else {
        ui.label("The dataset has no Sleep_Hours column.");
        return;
    };

    ui.heading("Addiction level → sleep");
    level_chart(ui, "sleep_by_level", &view.by_level, "Mean sleep (h)");

    if let Some(bins) = &view.by_social_quartile {
        ui.strong("Sleep by social-media quartile");
        quartile_chart(ui, "sleep_by_social_quartile", bins, "Mean sleep (h)");
    }

    if let Some(groups) = &view.by_night_mode {
        ui.heading("Night mode on/off → sleep");
        group_chart(ui, "sleep_by_night_mode", groups, "Mean sleep (h)");
    }
}

fn health_tab(ui: &mut Ui, view: &HealthView) -> Option<Pick> {
    let mut pick = None;

    if let Some(selected) = &view.selected {
        ui.heading("Addiction level → health metric");
        if let Some(m) = metric_combo(ui, "health_metric", &view.metrics, selected) {
            pick = Some(Pick::Health(m));
        }
        ui.columns(2, |cols| {
            level_chart(&mut cols[0], "health_by_level", &view.by_level, &format!("Mean {selected}"));
            if let Some(scatter) = &view.vs_screen_time {
                cols[1].strong("Screen time vs selected metric");
                scatter_chart(&mut cols[1], "health_vs_screen", scatter);
            }
        });
    } else {
        ui.label("No health metric columns in the dataset.");
    }

    if let Some(scatter) = &view.unlocks_vs_stress {
        ui.heading("Phone unlocks → stress");
        scatter_chart(ui, "unlocks_vs_stress", scatter);
    }
    pick
}

fn social_tab(ui: &mut Ui, view: &SocialView) -> Option<Pick> {
    let mut pick = None;

    if let (Some(selected), Some(scatter)) = (&view.selected, &view.scatter) {
        ui.heading("Social media use → health");
        if let Some(m) = metric_combo(ui, "social_metric", &view.metrics, selected) {
            pick = Some(Pick::Social(m));
        }
        scatter_chart(ui, "social_scatter", scatter);
    }

    if !view.by_level.is_empty() {
        ui.heading("Addiction level → social media hours");
        level_chart(ui, "social_by_level", &view.by_level, "Mean social media (h)");
    }
    pick
}

fn metric_combo(ui: &mut Ui, id: &str, metrics: &[String], selected: &str) -> Option<String> {
    let mut pick = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui: &mut Ui| {
            for m in metrics {
                if ui.selectable_label(m == selected, m).clicked() && m != selected {
                    pick = Some(m.clone());
                }
            }
        });
    pick
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn level_chart(ui: &mut Ui, id: &str, means: &[LevelMean], y_label: &str) {
    if means.is_empty() {
        ui.weak("No data for the current filters.");
        return;
    }
    let bars = means
        .iter()
        .map(|m| (m.level.to_string(), m.mean, color::level_color(m.level)))
        .collect();
    bar_chart(ui, id, bars, "Addiction level", y_label);
}

fn quartile_chart(ui: &mut Ui, id: &str, bins: &[QuartileBin], y_label: &str) {
    if bins.is_empty() {
        ui.weak("Not enough data for a quartile split.");
        return;
    }
    let palette = color::generate_palette(bins.len(), 200.0);
    let bars = bins
        .iter()
        .zip(palette)
        .filter_map(|(b, c)| Some((b.label.clone(), b.mean?, c)))
        .collect();
    bar_chart(ui, id, bars, "Social media use (quartile)", y_label);
}

fn group_chart(ui: &mut Ui, id: &str, groups: &[GroupMean], y_label: &str) {
    if groups.is_empty() {
        ui.weak("No data for the current filters.");
        return;
    }
    let palette = color::generate_palette(groups.len(), 30.0);
    let bars = groups
        .iter()
        .zip(palette)
        .map(|(g, c)| (g.key.to_string(), g.mean, c))
        .collect();
    bar_chart(ui, id, bars, "Night mode", y_label);
}

/// Categorical bar chart; bar `i` sits at x = i and is labelled below.
fn bar_chart(ui: &mut Ui, id: &str, bars: Vec<(String, f64, Color32)>, x_label: &str, y_label: &str) {
    let labels: Vec<String> = bars.iter().map(|(l, _, _)| l.clone()).collect();
    let chart = BarChart::new(
        bars.into_iter()
            .enumerate()
            .map(|(i, (label, value, fill))| {
                Bar::new(i as f64, value).name(label).fill(fill).width(0.6)
            })
            .collect(),
    );

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn scatter_chart(ui: &mut Ui, id: &str, scatter: &Scatter) {
    if scatter.points.is_empty() {
        ui.weak("No data for the current filters.");
        return;
    }
    let points = Points::new(PlotPoints::from(scatter.points.clone()))
        .radius(1.5)
        .color(color::POINT_COLOR)
        .name(&scatter.y_field);
    let trend = scatter.trend.as_ref().zip(scatter.trend_points()).map(|(t, pts)| {
        Line::new(PlotPoints::from(pts))
            .color(color::TREND_COLOR)
            .width(2.0)
            .name(format!("y = {:.3}x + {:.3}", t.slope, t.intercept))
    });

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(&scatter.x_field)
        .y_axis_label(&scatter.y_field)
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(points);
            if let Some(line) = trend {
                plot_ui.line(line);
            }
        });
}
