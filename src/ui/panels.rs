use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Facet;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – facet filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for facet in Facet::ALL {
                let all_values = dataset.distinct_values(facet);
                let n_selected = state.selection.values(facet).map_or(0, |s| s.len());
                let n_total = all_values.len();
                let header_text = if n_selected == 0 {
                    format!("{facet}  (all)")
                } else {
                    format!("{facet}  ({n_selected}/{n_total})")
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(facet)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(facet);
                            }
                            if ui
                                .small_button("None")
                                .on_hover_text("No selection shows every value")
                                .clicked()
                            {
                                state.select_none(facet);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.selection.is_selected(facet, val);
                            let label = if val.is_empty() { "<blank>" } else { val.as_str() };
                            if ui.checkbox(&mut checked, label).changed() {
                                state.toggle_filter_value(facet, val);
                            }
                        }
                    });
            }
        });
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
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} transactions loaded, {} selected",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(err) = &state.filter_error {
            ui.separator();
            ui.label(RichText::new(format!("Filter error: {err}")).color(Color32::YELLOW));
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

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet", "pq", "json"],
        )
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
