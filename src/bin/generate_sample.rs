//! Write a deterministic synthetic diamonds dataset for trying the analyzer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;

const CUTS: [(&str, f64); 5] = [
    ("Fair", 0.03),
    ("Good", 0.09),
    ("Very Good", 0.22),
    ("Premium", 0.26),
    ("Ideal", 0.40),
];
const COLORS: [&str; 7] = ["D", "E", "F", "G", "H", "I", "J"];
const CLARITIES: [&str; 8] = ["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"];

/// Fraction of depth and price cells left empty.
const MISSING_RATE: f64 = 0.02;

#[derive(Parser, Debug)]
#[command(about = "Generate a synthetic diamonds dataset (CSV, or Parquet for .parquet)")]
struct Args {
    #[arg(default_value = "diamonds.csv")]
    output: PathBuf,

    #[arg(default_value_t = 1000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let i = (self.next_f64() * items.len() as f64) as usize;
        items[i.min(items.len() - 1)]
    }

    fn pick_weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let mut u = self.next_f64();
        for &(item, weight) in items {
            if u < weight {
                return item;
            }
            u -= weight;
        }
        items[items.len() - 1].0
    }

    fn maybe_missing(&mut self, value: f64) -> Option<f64> {
        (self.next_f64() >= MISSING_RATE).then_some(value)
    }
}

fn round(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

#[derive(Default)]
struct Columns {
    carat: Vec<Option<f64>>,
    cut: Vec<&'static str>,
    color: Vec<&'static str>,
    clarity: Vec<&'static str>,
    depth: Vec<Option<f64>>,
    table: Vec<Option<f64>>,
    price: Vec<Option<f64>>,
    x: Vec<Option<f64>>,
    y: Vec<Option<f64>>,
    z: Vec<Option<f64>>,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for _ in 0..rows {
        let carat = round(rng.gauss(-0.4, 0.55).exp().clamp(0.2, 5.0), 2);
        let cut = rng.pick_weighted(&CUTS);
        let color = rng.pick(&COLORS);
        let clarity = rng.pick(&CLARITIES);
        let depth = round(rng.gauss(61.75, 1.4), 1);
        let table = rng.gauss(57.5, 2.2).round();

        let clarity_rank = CLARITIES.iter().position(|c| *c == clarity).unwrap_or(0) as f64;
        let color_rank = COLORS.iter().position(|c| *c == color).unwrap_or(0) as f64;
        let grade = 1.0 + 0.04 * clarity_rank - 0.03 * color_rank;
        let price = (4000.0 * carat.powf(1.7) * grade * rng.gauss(1.0, 0.12).max(0.5))
            .round()
            .max(326.0);

        let x = round(6.45 * carat.cbrt() + rng.gauss(0.0, 0.05), 2);
        let y = round(x + rng.gauss(0.0, 0.04), 2);
        let z = round(x * depth / 100.0, 2);

        cols.carat.push(Some(carat));
        cols.cut.push(cut);
        cols.color.push(color);
        cols.clarity.push(clarity);
        cols.depth.push(rng.maybe_missing(depth));
        cols.table.push(Some(table));
        cols.price.push(rng.maybe_missing(price));
        cols.x.push(Some(x));
        cols.y.push(Some(y));
        cols.z.push(Some(z));
    }
    cols
}

fn floats(values: &[Option<f64>]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

fn strings(values: &[&str]) -> ArrayRef {
    Arc::new(StringArray::from(values.to_vec()))
}

fn to_batch(cols: &Columns) -> Result<RecordBatch> {
    let num = |name: &str| Field::new(name, DataType::Float64, true);
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let schema = Arc::new(Schema::new(vec![
        num("carat"),
        text("cut"),
        text("color"),
        text("clarity"),
        num("depth"),
        num("table"),
        num("price"),
        num("x"),
        num("y"),
        num("z"),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            floats(&cols.carat),
            strings(&cols.cut),
            strings(&cols.color),
            strings(&cols.clarity),
            floats(&cols.depth),
            floats(&cols.table),
            floats(&cols.price),
            floats(&cols.x),
            floats(&cols.y),
            floats(&cols.z),
        ],
    )
    .context("Failed to create RecordBatch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(cols: &Columns, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "carat", "cut", "color", "clarity", "depth", "table", "price", "x", "y", "z",
    ])?;

    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for i in 0..cols.cut.len() {
        writer.write_record([
            cell(cols.carat[i]),
            cols.cut[i].to_string(),
            cols.color[i].to_string(),
            cols.clarity[i].to_string(),
            cell(cols.depth[i]),
            cell(cols.table[i]),
            cell(cols.price[i]),
            cell(cols.x[i]),
            cell(cols.y[i]),
            cell(cols.z[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let cols = generate(args.rows, &mut rng);
    let batch = to_batch(&cols)?;

    let is_parquet = args
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&batch, &args.output)?;
    } else {
        write_csv(&cols, &args.output)?;
    }
    log::info!("Wrote {} rows to {}", args.rows, args.output.display());

    let preview = batch.slice(0, batch.num_rows().min(5));
    println!("{}", pretty_format_batches(&[preview])?);
    println!("Wrote {} diamonds to {}", args.rows, args.output.display());
    Ok(())
}
