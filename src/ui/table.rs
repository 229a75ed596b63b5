use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use usage_health::view::{CorrelationView, Preview};

use crate::color;

const ROW_HEIGHT: f32 = 18.0;

/// First rows of the filtered table.
pub fn preview_table(ui: &mut Ui, preview: &Preview) {
    ui.weak(format!(
        "Showing {} of {} filtered records",
        preview.rows.len(),
        preview.total
    ));
    if preview.rows.is_empty() {
        return;
    }

    ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui: &mut Ui| {
        ui.push_id("preview_table", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(320.0)
                .cell_layout(Layout::left_to_right(Align::Center))
                .columns(Column::auto().at_least(60.0), preview.columns.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for name in &preview.columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, preview.rows.len(), |mut row| {
                        let cells = &preview.rows[row.index()];
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}

/// Correlation matrix with cells tinted by sign and strength.
pub fn correlation_table(ui: &mut Ui, view: &CorrelationView) {
    let matrix = match view {
        CorrelationView::Matrix(m) => m,
        CorrelationView::Insufficient { reason } => {
            ui.label(format!("Not enough numeric data for correlations ({reason})."));
            return;
        }
    };

    ScrollArea::horizontal().id_salt("correlation_scroll").show(ui, |ui: &mut Ui| {
        ui.push_id("correlation_table", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(false)
                .cell_layout(Layout::centered_and_justified(egui::Direction::LeftToRight))
                .column(Column::auto().at_least(180.0))
                .columns(Column::auto().at_least(70.0), matrix.fields.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    header.col(|_| {});
                    for name in &matrix.fields {
                        header.col(|ui| {
                            ui.strong(short_name(name));
                        });
                    }
                })
                .body(|mut body| {
                    for (name, values) in matrix.fields.iter().zip(&matrix.values) {
                        body.row(ROW_HEIGHT + 2.0, |mut row| {
                            row.col(|ui| {
                                ui.strong(name);
                            });
                            for r in values {
                                row.col(|ui| match r {
                                    Some(r) => {
                                        ui.painter().rect_filled(
                                            ui.max_rect(),
                                            0.0,
                                            color::correlation_color(*r),
                                        );
                                        ui.label(format!("{r:.2}"));
                                    }
                                    None => {
                                        ui.weak("—");
                                    }
                                });
                            }
                        });
                    }
                });
        });
    });
    ui.label(RichText::new("A high |r| hints at a relationship; it is not evidence of causation.").italics());
}

/// Column headers without the unit suffix, to keep the matrix narrow.
fn short_name(field: &str) -> String {
    field
        .trim_end_matches("_Hours")
        .trim_end_matches("_Per_Day")
        .replace('_', " ")
}
