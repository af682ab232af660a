use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use data_dashboard::data::format::DataFormat;
use data_dashboard::export::export;
use data_dashboard::{Column, Table};

const ROWS: usize = 240;

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
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];
    let prices = [("Widget", 2.5), ("Gadget", 10.0), ("Gizmo", 7.25)];

    let mut region = Vec::with_capacity(ROWS);
    let mut product = Vec::with_capacity(ROWS);
    let mut units = Vec::with_capacity(ROWS);
    let mut revenue = Vec::with_capacity(ROWS);
    let mut rating: Vec<Option<f64>> = Vec::with_capacity(ROWS);

    for _ in 0..ROWS {
        let r = rng.pick(&regions);
        let p = rng.pick(&products);
        let u = 1 + (rng.next_u64() % 20) as i64;
        let price = prices
            .iter()
            .find(|(name, _)| *name == p)
            .map(|(_, price)| *price)
            .context("product without a price")?;

        region.push(r.to_string());
        product.push(p.to_string());
        units.push(u);
        revenue.push(u as f64 * price);
        // ~15% of ratings are left blank
        rating.push((rng.next_f64() > 0.15).then(|| 1.0 + (rng.next_u64() % 5) as f64));
    }

    // ---- CSV, through the same exporter the dashboard uses ----
    let table = Table::new(vec![
        Column::text("region", region.iter().map(Some)),
        Column::text("product", product.iter().map(Some)),
        Column::numeric("units", units.iter().map(|&u| Some(u as f64))),
        Column::numeric("revenue", revenue.iter().copied().map(Some)),
        Column::numeric("rating", rating.iter().copied()),
    ])?;
    let csv_path = "sample_sales.csv";
    export(&table, DataFormat::Csv)?
        .write_to(std::path::Path::new(csv_path))?;

    // ---- Parquet ----
    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("revenue", DataType::Float64, false),
        Field::new("rating", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(region)),
            Arc::new(StringArray::from(product)),
            Arc::new(Int64Array::from(units)),
            Arc::new(Float64Array::from(revenue)),
            Arc::new(Float64Array::from(rating)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_sales.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!("Wrote {ROWS} sales rows to {csv_path} and {parquet_path}");
    Ok(())
}
