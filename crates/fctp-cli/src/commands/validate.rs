use std::path::Path;

use anyhow::Result;

use super::load_run;

pub fn handle(config_path: &Path) -> Result<()> {
    let (run, instance) = load_run(config_path)?;

    println!("Configuration is valid: {}", config_path.display());
    println!(
        "  {} origins, {} destinations, {} arcs",
        instance.num_origins(),
        instance.num_destinations(),
        instance.num_arcs()
    );
    println!(
        "  total capacity {:.4}, total demand {:.4}",
        instance.total_capacity(),
        instance.total_demand()
    );
    println!(
        "  max_iterations {}, tolerance {:e}, penalty_cost {}",
        run.max_iterations, run.tolerance, run.penalty_cost
    );

    if instance.has_capacity_shortfall() {
        println!(
            "  note: demand exceeds capacity by {:.4}; the shortfall will be penalized",
            instance.total_demand() - instance.total_capacity()
        );
    }
    if instance.max_unit_cost() >= run.penalty_cost {
        println!(
            "  note: unit cost {} reaches the penalty {}; leaving demand unmet may be cheaper",
            instance.max_unit_cost(),
            run.penalty_cost
        );
    }
    Ok(())
}
