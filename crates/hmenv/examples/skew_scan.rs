//! Safe-sphere radius of a constant-speed pyramid across skew angles.
//!
//! Purpose
//! - Quick, code-backed look at how the guaranteed momentum radius of a
//!   four-CMG pyramid moves with mounting skew, for both radius estimators.
//!
//! Run: `cargo run -p hmenv --example skew_scan --release`

use std::time::Instant;

use hmenv::config::{BinCfg, ClusterCombination, EnvelopeCfg, SpeedType};
use hmenv::envelope::generate;
use hmenv::radius::{inscribed_radius, RadiusMethod};

fn main() {
    let bins = RadiusMethod::binned(BinCfg { theta: 12, phi: 24 });
    println!("skew_deg,points,hull_radius,binned_radius,ms");
    for skew in [0.0, 30.0, 45.0, 54.74, 60.0, 75.0, 90.0] {
        let cfg = EnvelopeCfg {
            skew_deg: skew,
            angle_segments: 18,
            combination: ClusterCombination::Pyramid,
            speed: SpeedType::Constant,
            ..EnvelopeCfg::default()
        };
        let start = Instant::now();
        let env = generate(&cfg).expect("sweep");
        let hull = inscribed_radius(&env.points, RadiusMethod::HullVertices);
        let binned = inscribed_radius(&env.points, bins);
        let ms = start.elapsed().as_secs_f64() * 1e3;
        let fmt = |r: Result<f64, _>| match r {
            Ok(v) => format!("{v:.4}"),
            Err(e) => format!("err({e})"),
        };
        println!(
            "{skew},{},{},{},{ms:.1}",
            env.points.len(),
            fmt(hull),
            fmt(binned)
        );
    }
}
