use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 8] = [
    "Order",
    "City",
    "Customer type",
    "Gender",
    "Product line",
    "Total",
    "Rating",
    "Time",
];

/// Filtered transactions, one row per visible index.
pub fn transactions_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };

    egui::CollapsingHeader::new(format!("Selected transactions ({})", state.visible_indices.len()))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(320.0)
                .columns(Column::auto().at_least(60.0), HEADERS.len())
                .header(20.0, |mut header| {
                    for h in HEADERS {
                        header.col(|ui| {
                            ui.strong(h);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, state.visible_indices.len(), |mut row| {
                        let t = &ds.rows[state.visible_indices[row.index()]];
                        let cells = [
                            t.order_id.clone(),
                            t.city.clone(),
                            t.customer_type.clone(),
                            t.gender.clone(),
                            t.product_line.clone(),
                            format!("{:.2}", t.total),
                            format!("{:.1}", t.rating),
                            t.time.clone(),
                        ];
                        for text in cells {
                            row.col(|ui| {
                                ui.label(text);
                            });
                        }
                    });
                });
        });
}
