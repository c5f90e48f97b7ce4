use ivsurface::{build_vol_surface, default_configs, ExpirySlice, OptionQuote, SurfaceConfig};

fn describe(label: &str, config: &SurfaceConfig, use_case: &str) {
    println!("{label}:");
    println!("   Method: {:?}", config.solver.method);
    println!("   Tolerance: {:.1e}", config.solver.tolerance);
    println!("   Max iterations: {}", config.solver.max_iterations);
    println!(
        "   Volatility band: [{}, {}]",
        config.solver.vol_min, config.solver.vol_max
    );
    println!("   Risk-free rate: {:.2}%", config.risk_free_rate * 100.0);
    println!("   Use case: {use_case}\n");
}

fn main() {
    let slices = vec![ExpirySlice {
        expiry: "2025-04-17".to_string(),
        time_to_expiry: 0.25,
        quotes: vec![
            OptionQuote::call(95.0, "2025-04-17", 7.7),
            OptionQuote::call(100.0, "2025-04-17", 4.6),
            OptionQuote::put(95.0, "2025-04-17", 1.9),
        ],
    }];

    println!("ivsurface Default Configuration Examples\n");

    let standard = default_configs::standard();
    describe("1. Standard Configuration", &standard, "End-of-day surfaces");

    let precise = default_configs::precise();
    describe("2. Precise Configuration", &precise, "Research, validation");

    let fast = default_configs::fast();
    describe("3. Fast Configuration", &fast, "Quick previews, debugging");

    match toml::to_string_pretty(&standard) {
        Ok(text) => println!("Standard configuration as TOML:\n{text}"),
        Err(e) => println!("Could not render TOML: {e}"),
    }

    println!("Building a small surface with each preset...");
    for (name, config) in [("standard", standard), ("precise", precise), ("fast", fast)] {
        match build_vol_surface(&slices, 100.0, config) {
            Ok(surface) => {
                let vols: Vec<String> = surface
                    .points()
                    .map(|p| match p.implied_vol() {
                        Some(v) => format!("{v:.6}"),
                        None => "missing".to_string(),
                    })
                    .collect();
                println!("   {name:<9} {}", vols.join("  "));
            }
            Err(e) => println!("   {name:<9} failed: {e}"),
        }
    }
}
