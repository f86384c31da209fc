//! Writes a synthetic `supermarket_sales.csv` (with a title line above the
//! header, like the workbook) and `supermarket_sales.parquet`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use sales_dashboard::config::ColumnMapping;

const ROWS: usize = 1_000;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct SampleRow {
    order_id: String,
    city: &'static str,
    customer_type: &'static str,
    gender: &'static str,
    product_line: &'static str,
    total: f64,
    rating: Option<f64>,
    time: String,
}

fn generate(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let cities = ["太原", "大同", "临汾"];
    let customer_types = ["会员", "普通"];
    let genders = ["男性", "女性"];
    let product_lines = ["食品饮料", "时尚配饰", "电子配件", "运动旅行", "家居生活", "健康美容"];

    (0..ROWS)
        .map(|i| {
            // Store hours are 10:00–20:59.
            let hour = 10 + rng.next_u64() % 11;
            let minute = rng.next_u64() % 60;
            let unit_price = rng.range(10.0, 100.0);
            let quantity = 1 + rng.next_u64() % 10;
            // Roughly one rating in fifty is left blank.
            let rating = (rng.next_f64() > 0.02)
                .then(|| (rng.range(4.0, 10.0) * 10.0).round() / 10.0);

            SampleRow {
                order_id: format!("{:03}-{:02}-{:04}", 100 + i % 900, i % 97, i),
                city: rng.pick(&cities),
                customer_type: rng.pick(&customer_types),
                gender: rng.pick(&genders),
                product_line: rng.pick(&product_lines),
                total: (unit_price * quantity as f64 * 1.05 * 100.0).round() / 100.0,
                rating,
                time: format!("{hour:02}:{minute:02}:00"),
            }
        })
        .collect()
}

fn header(cols: &ColumnMapping) -> [&str; 8] {
    [
        &cols.order_id,
        &cols.city,
        &cols.customer_type,
        &cols.gender,
        &cols.product_line,
        &cols.total,
        &cols.rating,
        &cols.time,
    ]
}

fn write_csv(path: &str, rows: &[SampleRow], cols: &ColumnMapping) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("creating {path}"))?;

    writer.write_record(["超市销售数据"])?;
    writer.write_record(header(cols))?;
    for r in rows {
        writer.write_record([
            r.order_id.clone(),
            r.city.to_string(),
            r.customer_type.to_string(),
            r.gender.to_string(),
            r.product_line.to_string(),
            format!("{:.2}", r.total),
            r.rating.map(|v| format!("{v:.1}")).unwrap_or_default(),
            r.time.clone(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[SampleRow], cols: &ColumnMapping) -> Result<()> {
    let names = header(cols);
    let text = |f: &dyn Fn(&SampleRow) -> String| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(names[0], DataType::Utf8, false),
        Field::new(names[1], DataType::Utf8, false),
        Field::new(names[2], DataType::Utf8, false),
        Field::new(names[3], DataType::Utf8, false),
        Field::new(names[4], DataType::Utf8, false),
        Field::new(names[5], DataType::Float64, false),
        Field::new(names[6], DataType::Float64, true),
        Field::new(names[7], DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        text(&|r: &SampleRow| r.order_id.clone()),
        text(&|r: &SampleRow| r.city.to_string()),
        text(&|r: &SampleRow| r.customer_type.to_string()),
        text(&|r: &SampleRow| r.gender.to_string()),
        text(&|r: &SampleRow| r.product_line.to_string()),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.total).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.rating).collect::<Vec<_>>())),
        text(&|r: &SampleRow| r.time.clone()),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);
    let cols = ColumnMapping::default();

    write_csv("supermarket_sales.csv", &rows, &cols)?;
    write_parquet("supermarket_sales.parquet", &rows, &cols)?;

    println!("Wrote {} transactions to supermarket_sales.csv and supermarket_sales.parquet", rows.len());
    Ok(())
}
