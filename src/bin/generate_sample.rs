use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const COLUMNS: [&str; 13] = [
    "alcohol",
    "malic_acid",
    "ash",
    "alcalinity_of_ash",
    "magnesium",
    "total_phenols",
    "flavanoids",
    "nonflavanoid_phenols",
    "proanthocyanins",
    "color_intensity",
    "hue",
    "od280_od315",
    "proline",
];

/// Per-column spread shared by all cultivars.
const SPREAD: [f64; 13] = [
    0.45, 0.8, 0.2, 2.5, 11.0, 0.4, 0.45, 0.1, 0.45, 1.2, 0.15, 0.35, 180.0,
];

/// (cultivar, number of rows, per-column mean)
const CULTIVARS: [(&str, usize, [f64; 13]); 3] = [
    (
        "cultivar_0",
        59,
        [13.74, 2.01, 2.46, 17.04, 106.3, 2.84, 2.98, 0.29, 1.90, 5.53, 1.06, 3.16, 1116.0],
    ),
    (
        "cultivar_1",
        71,
        [12.28, 1.93, 2.24, 20.24, 94.5, 2.26, 2.08, 0.36, 1.63, 3.09, 1.06, 2.79, 520.0],
    ),
    (
        "cultivar_2",
        48,
        [13.15, 3.33, 2.44, 21.42, 99.3, 1.68, 0.78, 0.45, 1.15, 7.40, 0.68, 1.68, 630.0],
    ),
];

/// Box-Muller transform for a normal sample.
fn gauss(rng: &mut ChaCha8Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn main() -> Result<()> {
    env_logger::init();
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_table.csv".to_string());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut header: Vec<&str> = COLUMNS.to_vec();
    header.push("cultivar");
    writer.write_record(&header).context("writing header")?;

    let mut rows = 0;
    for (label, count, means) in &CULTIVARS {
        for _ in 0..*count {
            let mut record: Vec<String> = means
                .iter()
                .zip(SPREAD)
                .map(|(&mu, sigma)| format!("{:.3}", gauss(&mut rng, mu, sigma).max(0.01)))
                .collect();
            record.push(label.to_string());
            writer.write_record(&record).context("writing row")?;
            rows += 1;
        }
    }

    // A handful of gross outliers in the plotted columns.
    for k in 0..4 {
        let mut record: Vec<String> = CULTIVARS[1]
            .2
            .iter()
            .map(|v| format!("{v:.3}"))
            .collect();
        record[1] = format!("{:.3}", 5.2 + 0.15 * k as f64);
        record[2] = format!("{:.3}", 1.4 + 0.6 * k as f64);
        record[9] = format!("{:.3}", 12.5 + 1.2 * k as f64);
        record.push("outlier".to_string());
        writer.write_record(&record).context("writing row")?;
        rows += 1;
    }
    writer.flush().context("flushing CSV")?;

    log::info!("Wrote {rows} rows to {output_path}");
    println!("Wrote {rows} rows ({} numeric columns) to {output_path}", COLUMNS.len());
    Ok(())
}
