use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const REGIONS: [&str; 4] = ["Bretagne", "Occitanie", "Normandie", "Île-de-France"];
const ROWS: usize = 300;

/// Box-Muller transform for a normal sample.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(1e-15..1.0);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn csv_writer(dir: &Path, name: &str) -> Result<csv::Writer<std::fs::File>> {
    let path = dir.join(name);
    csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_report"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);

    let mut features = csv_writer(&out_dir, "X_test.csv")?;
    let mut labels = csv_writer(&out_dir, "y_test.csv")?;
    let mut predictions = csv_writer(&out_dir, "predictions.csv")?;

    features.write_record(["surface", "rooms", "distance_center_km", "Nom de la région"])?;
    labels.write_record(["price"])?;
    predictions.write_record(["target"])?;

    for _ in 0..ROWS {
        let region_idx = rng.gen_range(0..REGIONS.len());
        let surface = gauss(&mut rng, 70.0, 25.0).max(12.0);
        let rooms = ((surface / 22.0).round() as i64).max(1);
        let distance = rng.gen_range(0.2..25.0f64);

        // Regional price level per square metre.
        let per_m2 = [2600.0, 2900.0, 2300.0, 7800.0][region_idx];
        let price = surface * per_m2 * (1.0 - distance / 80.0) + 4000.0 * rooms as f64;
        let predicted = price * gauss(&mut rng, 1.0, 0.08) + gauss(&mut rng, 0.0, 5000.0);

        features.write_record([
            format!("{surface:.1}"),
            rooms.to_string(),
            format!("{distance:.2}"),
            REGIONS[region_idx].to_string(),
        ])?;
        labels.write_record([format!("{price:.0}")])?;
        predictions.write_record([format!("{predicted:.2}")])?;
    }

    let mut importance = csv_writer(&out_dir, "feature_importance.csv")?;
    importance.write_record(["Feature", "Importance"])?;
    for (feature, score) in [
        ("surface", 0.52),
        ("Nom de la région", 0.27),
        ("distance_center_km", 0.14),
        ("rooms", 0.07),
    ] {
        importance.write_record([feature.to_string(), score.to_string()])?;
    }

    for w in [&mut features, &mut labels, &mut predictions, &mut importance] {
        w.flush()?;
    }

    println!("Wrote {ROWS} test rows to {}", out_dir.display());
    Ok(())
}
