use anyhow::{Context, Result};

const CHANNELS: [&str; 4] = ["s1", "s2", "s3", "s4"];
/// HV at which each channel reaches half its plateau efficiency.
const KNEE_VOLTS: [f64; 4] = [1450.0, 1500.0, 1420.0, 1550.0];
const PLATEAU: [f64; 4] = [0.9, 0.8, 0.95, 0.7];
/// LED pulses per 10 s counting window.
const LED_PULSES: f64 = 10_000.0;
const READINGS_PER_STATE: usize = 3;

/// Detection efficiency per LED pulse: a logistic turn-on in HV.
fn efficiency(hv: f64, knee: f64, plateau: f64) -> f64 {
    plateau / (1.0 + (-(hv - knee) / 40.0).exp())
}

/// Deterministic source of counter readings (splitmix64 underneath).
struct CounterNoise(u64);

impl CounterNoise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        ((z ^ (z >> 31)) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Poisson-distributed count: exact product method for small means,
    /// normal approximation above that.
    fn counts(&mut self, mean: f64) -> u64 {
        if mean < 30.0 {
            let limit = (-mean).exp();
            let mut k = 0;
            let mut p = self.uniform();
            while p > limit {
                k += 1;
                p *= self.uniform();
            }
            return k;
        }
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        (mean + mean.sqrt() * z).round().max(0.0) as u64
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_hvscan.csv".to_string());
    let mut rng = CounterNoise(20151230);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    // The trailing blank header mirrors the spare column of the lab sheets.
    let mut header = vec!["HV", "cosmic", "led"];
    header.extend(CHANNELS);
    header.push("");
    writer.write_record(&header)?;

    let mut rows = 0usize;
    for step in 0..9 {
        // the supply reads negative
        let hv = -(1300.0 + step as f64 * 50.0);

        for led_on in [false, true] {
            for _ in 0..READINGS_PER_STATE {
                let cosmic = rng.counts(5.0);
                let led = if led_on { rng.counts(LED_PULSES) } else { 0 };

                let mut record = vec![format!("{hv}"), cosmic.to_string(), led.to_string()];
                for (i, _) in CHANNELS.iter().enumerate() {
                    let dark = 20.0 + (hv.abs() - 1300.0) * 0.05;
                    let mut mean = dark;
                    if led_on {
                        mean += led as f64 * efficiency(hv.abs(), KNEE_VOLTS[i], PLATEAU[i]);
                    }
                    let roll = rng.uniform();
                    let cell = if roll < 0.03 {
                        String::new()
                    } else if roll < 0.05 {
                        "-1".to_string()
                    } else {
                        rng.counts(mean).to_string()
                    };
                    record.push(cell);
                }
                record.push(String::new());
                writer.write_record(&record)?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!(
        "Wrote {rows} readings ({} signal channels) to {output_path}",
        CHANNELS.len()
    );
    Ok(())
}
