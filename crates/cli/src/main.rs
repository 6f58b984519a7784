use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hmenv::config::{BinCfg, EnvelopeCfg};
use hmenv::envelope::{generate_with_progress, plan, Envelope, Extents, SweepProgress};
use hmenv::grid::SweepMode;
use hmenv::radius::{inscribed_radius, RadiusMethod};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod settings;
mod table;

use provenance::{sibling_with_suffix, write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "hmenv")]
#[command(about = "Angular momentum envelopes of CMG and reaction-wheel clusters")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Nearest convex-hull vertex
    Hull,
    /// Shortest longest-ray over spherical bins
    Bins,
}

#[derive(Subcommand)]
enum Action {
    /// Sweep the envelope, estimate the safe radius, write cloud + summary
    Run {
        #[arg(long)]
        config: PathBuf,
        /// Point cloud output (.csv or .parquet)
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = Method::Hull)]
        method: Method,
    },
    /// Print the sweep size without running it
    Plan {
        #[arg(long)]
        config: PathBuf,
    },
    /// Estimate the safe radius of an existing point cloud (x, y, z columns)
    Radius {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Method::Bins)]
        method: Method,
        #[arg(long, default_value_t = BinCfg::default().theta)]
        theta_bins: usize,
        #[arg(long, default_value_t = BinCfg::default().phi)]
        phi_bins: usize,
    },
    /// Print a small provenance JSON block
    Report,
}

/// Contents of `<stem>.summary.json`.
#[derive(Serialize)]
struct RunSummary {
    mode: SweepMode,
    points: usize,
    surface_side: Option<usize>,
    extents: Extents,
    radius: f64,
    method: String,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            config,
            out,
            method,
        } => run(&config, &out, method),
        Action::Plan { config } => plan_only(&config),
        Action::Radius {
            input,
            method,
            theta_bins,
            phi_bins,
        } => radius(
            &input,
            radius_method(method, BinCfg {
                theta: theta_bins,
                phi: phi_bins,
            }),
        ),
        Action::Report => report(),
    }
}

fn radius_method(method: Method, bins: BinCfg) -> RadiusMethod {
    match method {
        Method::Hull => RadiusMethod::HullVertices,
        Method::Bins => RadiusMethod::binned(bins),
    }
}

fn run(config: &Path, out: &Path, method: Method) -> Result<()> {
    let cfg = settings::load(config)?;
    let plan = plan(&cfg)?;
    tracing::info!(
        mode = plan.mode.label(),
        points = plan.point_count,
        buffer_bytes = plan.buffer_bytes,
        "plan"
    );

    let env = sweep(&cfg)?;
    let ext = env.extents();
    tracing::info!(x = ext.x, y = ext.y, z = ext.z, "envelope extents");

    let method = radius_method(method, cfg.bins);
    let r = inscribed_radius(&env.points, method)
        .with_context(|| format!("estimating radius ({method})"))?;
    tracing::info!(radius = r, method = %method, "inscribed sphere");

    table::write_points(out, &env.points)?;
    let params = json!({
        "mode": plan.mode,
        "config": cfg,
        "method": method.to_string(),
    });
    write_sidecar(out, Payload::new(params.clone()).with_input(config))?;

    let summary_path = sibling_with_suffix(out, ".summary.json");
    let summary = RunSummary {
        mode: plan.mode,
        points: env.points.len(),
        surface_side: env.surface.as_ref().map(|s| s.side),
        extents: ext,
        radius: r,
        method: method.to_string(),
    };
    fs::write(&summary_path, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    write_sidecar(&summary_path, Payload::new(params).with_input(config))?;

    tracing::info!(
        cloud = %out.display(),
        summary = %summary_path.display(),
        "wrote outputs"
    );
    Ok(())
}

fn sweep(cfg: &EnvelopeCfg) -> Result<Envelope> {
    let mut next_report = 0usize;
    let env = generate_with_progress(cfg, |p: SweepProgress| {
        let pct = p.done * 100 / p.total;
        if pct >= next_report {
            tracing::info!(done = p.done, total = p.total, "sweep {pct}%");
            next_report = pct + 10;
        }
    })?;
    Ok(env)
}

fn plan_only(config: &Path) -> Result<()> {
    let cfg = settings::load(config)?;
    let plan = plan(&cfg)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn radius(input: &Path, method: RadiusMethod) -> Result<()> {
    let points = table::read_points(input)?;
    tracing::info!(points = points.len(), input = %input.display(), "loaded cloud");
    let r = inscribed_radius(&points, method)
        .with_context(|| format!("estimating radius ({method})"))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "input": input.to_string_lossy(),
            "points": points.len(),
            "method": method.to_string(),
            "radius": r,
        }))?
    );
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "hmenv_version": hmenv::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cli_parses_run() {
        let cmd = Cmd::try_parse_from([
            "hmenv", "run", "--config", "s.json", "--out", "o.csv", "--method", "bins",
        ])
        .unwrap();
        match cmd.action {
            Action::Run { method, out, .. } => {
                assert_eq!(method, Method::Bins);
                assert_eq!(out, PathBuf::from("o.csv"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn run_writes_cloud_summary_and_sidecars() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("Settings.json");
        fs::write(
            &config,
            r#"{"skew_deg": 54.74, "max_h": 1.0, "angle_segments": 3,
                "magnitude_segments": 2, "combination": "3RW",
                "style": "conv", "speed": "CS"}"#,
        )
        .unwrap();
        let out = dir.path().join("out").join("rw.csv");
        run(&config, &out, Method::Bins).unwrap();

        let cloud = table::read_points(&out).unwrap();
        assert_eq!(cloud.len(), 64);
        let summary: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("out/rw.summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["points"], 64);
        assert_eq!(summary["mode"], "TriReactionWheel");
        // Signed cube [-1, 1]^3: no ray is longer than a corner.
        let r = summary["radius"].as_f64().unwrap();
        assert!(r > 0.0 && r <= 3f64.sqrt() + 1e-12);
        assert_eq!(summary["extents"]["x"], 1.0);
        assert!(dir.path().join("out/rw.provenance.json").exists());
        assert!(dir.path().join("out/rw.summary.provenance.json").exists());
    }
}
