use anyhow::{Context, Result};
use serde::Serialize;

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One person in the generated survey.
#[derive(Serialize)]
struct Record {
    id: u32,
    age: u32,
    gender: &'static str,
    region: &'static str,
    smoker: bool,
    height_cm: f64,
    /// Left blank for roughly one record in twenty.
    income: Option<f64>,
}

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];
const GENDERS: [&str; 2] = ["F", "M"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let n = 500;
    for id in 0..n {
        let gender = rng.pick(&GENDERS);
        let height_mean = if gender == "F" { 164.0 } else { 177.0 };
        let age = rng.gauss(42.0, 14.0).clamp(18.0, 90.0).round() as u32;
        let income = (rng.next_f64() > 0.05)
            .then(|| (rng.gauss(10.6, 0.5).exp() / 100.0).round() * 100.0);

        writer
            .serialize(Record {
                id,
                age,
                gender,
                region: rng.pick(&REGIONS),
                smoker: rng.next_f64() < 0.2,
                height_cm: (rng.gauss(height_mean, 7.0) * 10.0).round() / 10.0,
                income,
            })
            .with_context(|| format!("writing record {id}"))?;
    }

    writer.flush().context("flushing CSV writer")?;
    println!("Wrote {n} records to {output_path}");
    Ok(())
}
