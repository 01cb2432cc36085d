/// One-Compartment IV Bolus Example
///
/// Simulates a single 500 mg IV bolus in a one-compartment model and prints
/// the concentration-time course.
///
/// Model equation:
///   dx[CENTRAL]/dt = -K10 * x[CENTRAL]
///
/// Where:
///   K10 = CL / V   (elimination rate constant)

fn main() -> Result<(), pksol::PksolError> {
    use pksol::prelude::*;

    let config = ModelConfig::standard(1, Route::IvBolus);
    let parameters = Parameters::default()
        .with("CL", 5.0) // Clearance (L/hr)
        .with("V", 50.0); // Volume of distribution (L)
    let regimen = DosingRegimen::single(500.0); // mg at t = 0
    let options = SimulationOptions::new(24.0).with_reporting_step(2.0);

    let trajectory = simulate(&config, &parameters, &regimen, &options)?;

    println!("\n╔════════════════════════════════════════════╗");
    println!("║     One-Compartment Model Simulation       ║");
    println!("╠════════════════════════════════════════════╣");
    println!("║  CL = 5.0 L/hr, V = 50.0 L, dose = 500 mg  ║");
    println!("╠═════════════╦══════════════════════════════╣");
    println!("║  Time (hr)  ║  Concentration (mg/L)        ║");
    println!("╠═════════════╬══════════════════════════════╣");
    for sample in trajectory.samples() {
        println!("║ {:>10.1}  ║ {:>20.4}         ║", sample.time, sample.concentration);
    }
    println!("╚═════════════╩══════════════════════════════╝");

    println!(
        "Cmax = {:.2} mg/L, AUC(0-24) = {:.1} mg·hr/L\n",
        trajectory.cmax().unwrap_or(0.0),
        trajectory.auc()
    );

    Ok(())
}
