//! Run every strategy against a small grocery catalogue, once cold and once
//! bootstrapped from a synthetic purchase history.
//!
//! ```text
//! RUST_LOG=banditfriday=debug cargo run --example simulate
//! ```

use banditfriday::{
    generate_history, BaselineStrategy, BinnedStrategy, Catalogue, CheatingStrategy, Result,
    SimulationConfig, Simulator, Strategy, SurfaceProduct, ThompsonSampling,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn gaussian(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * std::f64::consts::PI).sqrt())
}

fn groceries() -> Result<Catalogue> {
    Catalogue::new()
        .with(
            "Beer",
            SurfaceProduct::new(|age, wealth| {
                if age < 0.2 {
                    0.0
                } else {
                    0.3 - age * 0.1 + (1.0 - wealth) * 0.2
                }
            })
            .normalized_to_mean(0.05),
        )?
        .with(
            "CheapToiletPaper",
            SurfaceProduct::new(|_, wealth| if wealth < 0.05 { 0.1 } else { 0.0 })
                .normalized_to_mean(0.05),
        )?
        .with(
            "Diapers",
            SurfaceProduct::new(|age, wealth| {
                if wealth > 0.2 {
                    gaussian(0.3, age, 0.2)
                } else {
                    0.0
                }
            })
            .normalized_to_mean(0.05),
        )?
        .with(
            "Lollipops",
            SurfaceProduct::new(|age, wealth| (-age).exp() * (1.0 - wealth * 0.2))
                .normalized_to_mean(0.05),
        )?
        .with(
            "Potatoes",
            SurfaceProduct::new(|age, wealth| (age - wealth * wealth).max(0.0))
                .normalized_to_mean(0.05),
        )?
        .with(
            "Sushi",
            SurfaceProduct::new(|age, wealth| gaussian(age, 0.35, 0.15) * wealth * wealth)
                .normalized_to_mean(0.05),
        )
}

fn lineup(catalogue: &Catalogue) -> Result<Vec<Box<dyn Strategy>>> {
    Ok(vec![
        Box::new(BaselineStrategy::new(catalogue)?),
        Box::new(ThompsonSampling::with_seed(catalogue, 1)?),
        Box::new(BinnedStrategy::new(catalogue, 4, ThompsonSampling::new)?),
        Box::new(CheatingStrategy::new(catalogue)?),
    ])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let catalogue = groceries()?;
    let cfg = SimulationConfig {
        rounds: 10_000,
        seed: 42,
    };

    let mut cold = lineup(&catalogue)?;
    let mut sim = Simulator::new(catalogue.clone(), cfg)?;
    let cold_reports = sim.run(&mut cold);

    let history = generate_history(&catalogue, 2_000, &mut StdRng::seed_from_u64(7));
    info!(rows = history.len(), "generated purchase history");
    let mut warm = lineup(&catalogue)?;
    for s in &mut warm {
        s.learn_from_history(&history)?;
    }
    let mut sim = Simulator::new(catalogue, cfg)?;
    let warm_reports = sim.run(&mut warm);

    for report in cold_reports.iter().chain(&warm_reports) {
        println!("{report} ({:.3} per round)", report.reward_rate());
    }
    Ok(())
}
