//! Loading real `.xlsx` files laid out like the stock workbook.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use sales_dashboard::config::SourceConfig;
use sales_dashboard::data::error::DataSourceError;
use sales_dashboard::data::loader::load_file;
use sales_dashboard::data::model::Facet;
use tempfile::NamedTempFile;

const HEADER: [&str; 8] = ["订单号", "城市", "顾客类型", "性别", "产品类型", "总价", "评分", "时间"];

struct Sale {
    id: &'static str,
    city: &'static str,
    customer_type: &'static str,
    gender: &'static str,
    product_line: &'static str,
    total: f64,
    rating: f64,
    /// Fraction of a day, as Excel stores a time.
    time: f64,
}

fn sales() -> Vec<Sale> {
    vec![
        Sale {
            id: "750-67-8428",
            city: "太原",
            customer_type: "会员",
            gender: "女性",
            product_line: "健康美容",
            total: 548.97,
            rating: 9.1,
            // 13:08:00
            time: (13.0 * 3_600.0 + 8.0 * 60.0) / 86_400.0,
        },
        Sale {
            id: "226-31-3081",
            city: "大同",
            customer_type: "普通",
            gender: "男性",
            product_line: "电子配件",
            total: 80.22,
            rating: 9.6,
            // 10:29:00
            time: (10.0 * 3_600.0 + 29.0 * 60.0) / 86_400.0,
        },
    ]
}

/// Writes `sheet` with an optional title in A1, the header on `header_row`
/// and the sales below it.
fn workbook(sheet: &str, title: Option<&str>, header_row: u32) -> Result<NamedTempFile, XlsxError> {
    let f = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    let time_format = Format::new().set_num_format("hh:mm:ss");

    let mut book = Workbook::new();
    let ws = book.add_worksheet();
    ws.set_name(sheet)?;
    if let Some(title) = title {
        ws.write_string(0, 0, title)?;
    }
    for (col, name) in HEADER.iter().enumerate() {
        ws.write_string(header_row, col as u16, *name)?;
    }
    for (i, s) in sales().iter().enumerate() {
        let row = header_row + 1 + i as u32;
        ws.write_string(row, 0, s.id)?;
        ws.write_string(row, 1, s.city)?;
        ws.write_string(row, 2, s.customer_type)?;
        ws.write_string(row, 3, s.gender)?;
        ws.write_string(row, 4, s.product_line)?;
        ws.write_number(row, 5, s.total)?;
        ws.write_number(row, 6, s.rating)?;
        ws.write_number_with_format(row, 7, s.time, &time_format)?;
    }
    book.save(f.path())?;
    Ok(f)
}

#[test]
fn sales_sheet_with_title_row_loads() {
    let f = workbook("销售数据", Some("超市销售数据"), 1).unwrap();
    let ds = load_file(f.path(), &SourceConfig::default()).unwrap();

    assert_eq!(ds.len(), 2);
    assert_eq!(ds.rows[0].order_id, "750-67-8428");
    assert_eq!(ds.rows[0].total, 548.97);
    assert_eq!(ds.rows[0].time, "13:08:00");
    assert_eq!(ds.rows[0].hour, 13);
    assert_eq!(ds.rows[1].time, "10:29:00");
    assert_eq!(ds.rows[1].hour, 10);
    assert_eq!(ds.distinct_values(Facet::City).len(), 2);
}

#[test]
fn missing_sheet_is_reported_by_name() {
    let f = workbook("Sheet1", Some("超市销售数据"), 1).unwrap();
    let err = load_file(f.path(), &SourceConfig::default()).unwrap_err();
    assert!(matches!(err, DataSourceError::MissingSheet(ref s) if s == "销售数据"));
}

#[test]
fn header_offset_counts_from_sheet_top_when_used_range_starts_lower() {
    // Row 0 left empty: the used range begins at the header.
    let f = workbook("销售数据", None, 1).unwrap();
    let ds = load_file(f.path(), &SourceConfig::default()).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.rows[1].city, "大同");

    // Header further down, offset raised to match.
    let f = workbook("销售数据", None, 3).unwrap();
    let source = SourceConfig {
        header_offset: 3,
        ..SourceConfig::default()
    };
    let ds = load_file(f.path(), &source).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.rows[0].hour, 13);
}
