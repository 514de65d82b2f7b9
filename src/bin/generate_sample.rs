use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// (city, state, cost-of-living factor)
const CITIES: [(&str, &str, f64); 10] = [
    ("San Francisco", "CA", 1.35),
    ("San Jose", "CA", 1.30),
    ("New York", "NY", 1.25),
    ("Seattle", "WA", 1.20),
    ("Boston", "MA", 1.15),
    ("Austin", "TX", 1.00),
    ("Chicago", "IL", 0.98),
    ("Denver", "CO", 0.95),
    ("Atlanta", "GA", 0.90),
    ("Columbus", "OH", 0.85),
];

/// (title, base salary in K, skill probabilities: python, r, spark, aws, excel)
const TITLES: [(&str, f64, [f64; 5]); 7] = [
    ("Data Scientist", 115.0, [0.9, 0.5, 0.3, 0.3, 0.4]),
    ("Senior Data Scientist", 140.0, [0.95, 0.5, 0.4, 0.4, 0.3]),
    ("Data Engineer", 120.0, [0.8, 0.1, 0.7, 0.7, 0.2]),
    ("Data Analyst", 70.0, [0.5, 0.3, 0.05, 0.1, 0.9]),
    ("Machine Learning Engineer", 145.0, [0.95, 0.1, 0.4, 0.6, 0.1]),
    ("Research Scientist", 130.0, [0.9, 0.4, 0.2, 0.2, 0.2]),
    ("Director of Analytics", 160.0, [0.4, 0.2, 0.1, 0.2, 0.8]),
];

/// (size text, salary factor)
const SIZES: [(&str, f64); 8] = [
    ("1 to 50 employees", 0.92),
    ("51 to 200 employees", 0.95),
    ("201 to 500 employees", 1.0),
    ("501 to 1000 employees", 1.0),
    ("1001 to 5000 employees", 1.05),
    ("5001 to 10000 employees", 1.08),
    ("10000+ employees", 1.1),
    ("-1", 1.0),
];

const INDUSTRIES: [&str; 5] = [
    "Biotech & Pharmaceuticals",
    "Insurance Carriers",
    "Computer Hardware & Software",
    "Consulting",
    "Internet",
];

const COMPANIES: [&str; 6] = ["Acme Analytics", "Globex", "Initech", "Umbrella", "Hooli", "Vandelay"];

struct Posting {
    title: String,
    location: String,
    estimate: String,
    avg_k: f64,
    size: String,
    industry: String,
    company: String,
    skills: [i64; 5],
}

fn generate(rng: &mut SimpleRng, count: usize) -> Vec<Posting> {
    (0..count)
        .map(|_| {
            let (city, state, col) = *rng.pick(&CITIES);
            let (title, base, probs) = *rng.pick(&TITLES);
            let (size, size_factor) = *rng.pick(&SIZES);

            let avg_k = (rng.gauss(base, base * 0.12) * col * size_factor).max(30.0).round();
            let spread = (avg_k * 0.18).round();
            let skills = probs.map(|p| i64::from(rng.chance(p)));

            Posting {
                title: title.to_string(),
                location: format!("{city}, {state}"),
                estimate: format!(
                    "${}K-${}K (Glassdoor est.)",
                    avg_k - spread,
                    avg_k + spread
                ),
                avg_k,
                size: size.to_string(),
                industry: rng.pick(&INDUSTRIES).to_string(),
                company: rng.pick(&COMPANIES).to_string(),
                skills,
            }
        })
        .collect()
}

const SKILL_COLUMNS: [&str; 5] = ["python_yn", "R_yn", "spark", "aws", "excel"];

fn write_parquet(path: &str, postings: &[Posting]) -> Result<()> {
    let text = |f: fn(&Posting) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(postings.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("Job Title", DataType::Utf8, false),
        Field::new("Location", DataType::Utf8, false),
        Field::new("Salary Estimate", DataType::Utf8, false),
        Field::new("Avg Salary(K)", DataType::Float64, false),
        Field::new("Size", DataType::Utf8, false),
        Field::new("Industry", DataType::Utf8, false),
        Field::new("Company Name", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        text(|p| p.title.as_str()),
        text(|p| p.location.as_str()),
        text(|p| p.estimate.as_str()),
        Arc::new(Float64Array::from(
            postings.iter().map(|p| p.avg_k).collect::<Vec<_>>(),
        )),
        text(|p| p.size.as_str()),
        text(|p| p.industry.as_str()),
        text(|p| p.company.as_str()),
    ];
    for (i, name) in SKILL_COLUMNS.iter().enumerate() {
        fields.push(Field::new(*name, DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from(
            postings.iter().map(|p| p.skills[i]).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(path: &str, postings: &[Posting]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    let mut header = vec![
        "Job Title",
        "Location",
        "Salary Estimate",
        "Avg Salary(K)",
        "Size",
        "Industry",
        "Company Name",
    ];
    header.extend(SKILL_COLUMNS);
    writer.write_record(&header)?;

    for p in postings {
        let mut row = vec![
            p.title.clone(),
            p.location.clone(),
            p.estimate.clone(),
            p.avg_k.to_string(),
            p.size.clone(),
            p.industry.clone(),
            p.company.clone(),
        ];
        row.extend(p.skills.iter().map(|s| s.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let postings = generate(&mut rng, 600);

    write_parquet("sample_jobs.parquet", &postings)?;
    write_csv("sample_jobs.csv", &postings)?;

    println!(
        "Wrote {} postings to sample_jobs.parquet and sample_jobs.csv",
        postings.len()
    );
    Ok(())
}
