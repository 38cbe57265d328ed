use anyhow::{bail, Result};

use scrollto_core::EasingName;

const BAR_WIDTH: f64 = 40.0;

pub fn run(easing: EasingName, steps: u32) -> Result<()> {
    if steps == 0 {
        bail!("--steps must be at least 1");
    }

    println!("{} ({} steps)\n", easing, steps);

    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps);
        let value = easing.apply(t);
        // Elastic overshoot: clamp the bar, not the value
        let bar = "#".repeat((value.clamp(0.0, 1.25) * BAR_WIDTH).round() as usize);
        println!("  {:>5.3}  {:>8.4}  {}", t, value, bar);
    }

    Ok(())
}
