use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::data::aggregate::{AggregateResult, SalesSummary};
use crate::state::AppState;

const HOUR_BAR_COLOR: Color32 = Color32::from_rgb(0x00, 0x83, 0xb8);

// ---------------------------------------------------------------------------
// Central panel – metrics and charts
// ---------------------------------------------------------------------------

/// Render the key metrics and both charts. Returns `false` when there is
/// nothing to show so the caller can skip the table as well.
pub fn dashboard(ui: &mut Ui, state: &AppState) -> bool {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            match &state.status_message {
                Some(msg) => ui.heading(RichText::new(msg).color(Color32::RED)),
                None => ui.heading("Open a file to view sales  (File → Open…)"),
            };
        });
        return false;
    }

    let summary = match &state.summary {
        AggregateResult::Summary(s) => s,
        AggregateResult::NoData => {
            ui.label(
                RichText::new("⚠ No matching data, adjust the filters")
                    .color(Color32::YELLOW)
                    .heading(),
            );
            return false;
        }
    };

    ui.heading("📊 Sales Dashboard");
    ui.add_space(8.0);
    key_metrics(ui, summary);
    ui.separator();

    let product_colors = state.product_colors.as_ref();
    ui.columns(2, |cols| {
        sales_by_hour_chart(&mut cols[0], summary);
        sales_by_product_line_chart(&mut cols[1], summary, |line| {
            product_colors
                .map(|m| m.color_for(line))
                .unwrap_or(HOUR_BAR_COLOR)
        });
    });
    true
}

fn key_metrics(ui: &mut Ui, s: &SalesSummary) {
    ui.columns(3, |cols| {
        cols[0].label(RichText::new("Total sales:").strong());
        cols[0].heading(format!("RMB ¥ {}", format_thousands(s.total_sales)));

        cols[1].label(RichText::new("Average rating:").strong());
        cols[1].heading(format!("{:.1} {}", s.average_rating, stars(s.star_count)));

        cols[2].label(RichText::new("Average sale per transaction:").strong());
        cols[2].heading(format!("RMB ¥ {:.2}", s.average_transaction_value));
    });
}

fn sales_by_hour_chart(ui: &mut Ui, s: &SalesSummary) {
    ui.label(RichText::new("Sales by hour").strong());
    let bars: Vec<Bar> = s
        .sales_by_hour
        .iter()
        .map(|(&hour, &sum)| Bar::new(hour as f64, sum).name(format!("{hour}:00")))
        .collect();

    Plot::new("sales_by_hour")
        .height(320.0)
        .x_axis_label("Hour")
        .y_axis_label("Total")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(HOUR_BAR_COLOR).width(0.8));
        });
}

/// Horizontal bars, smallest product line at the bottom.
fn sales_by_product_line_chart(
    ui: &mut Ui,
    s: &SalesSummary,
    color_for: impl Fn(&str) -> Color32,
) {
    ui.label(RichText::new("Sales by product line").strong());
    let labels: Vec<String> = s
        .sales_by_product_line
        .iter()
        .map(|(line, _)| line.clone())
        .collect();
    let bars: Vec<Bar> = s
        .sales_by_product_line
        .iter()
        .enumerate()
        .map(|(i, (line, sum))| {
            Bar::new(i as f64, *sum)
                .name(line)
                .fill(color_for(line))
                .width(0.7)
        })
        .collect();

    Plot::new("sales_by_product_line")
        .height(320.0)
        .x_axis_label("Total")
        .y_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn category_label(labels: &[String], position: f64) -> String {
    if position.fract().abs() > f64::EPSILON || position < 0.0 {
        return String::new();
    }
    labels
        .get(position as usize)
        .cloned()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Whole currency units with thousands separators, fraction truncated.
pub fn format_thousands(value: f64) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn stars(count: u32) -> String {
    "★".repeat(count as usize)
}
