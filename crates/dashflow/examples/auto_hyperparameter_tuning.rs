//! Auto Hyperparameter Tuning Example (BootstrapOptuna)
//!
//! This example demonstrates the concept of BootstrapOptuna, which uses Bayesian
//! optimization (via Optuna) to automatically find optimal hyperparameters.
//!
//! BootstrapOptuna can tune:
//! 1. max_few_shot_examples (number of demos)
//! 2. temperature (LLM randomness)
//! 3. learning_rate (for fine-tuning)
//! 4. Any custom hyperparameters
//!
//! This is a simplified conceptual example demonstrating automatic hyperparameter search.
//!
//! Run with: cargo run --package dashflow --example auto_hyperparameter_tuning

use dashflow::optimize::BootstrapOptuna;

fn main() -> dashflow::Result<()> {
    println!("=== BootstrapOptuna - Concept Demo ===\n");

    // 1. Create BootstrapOptuna optimizer
    println!("🔧 Creating BootstrapOptuna:");
    let _optuna = BootstrapOptuna::new();
    println!("   ✓ BootstrapOptuna created\n");

    // 2. Define search space
    println!("🔍 Defining Hyperparameter Search Space:");
    println!("   Parameter: max_few_shot_examples");
    println!("     Range: [1, 10]");
    println!("     Type: Integer");
    println!("     Impact: More examples = better quality, slower inference\n");

    println!("   Parameter: temperature");
    println!("     Range: [0.0, 1.0]");
    println!("     Type: Float");
    println!("     Impact: Higher = more creative, lower = more deterministic\n");

    println!("   Parameter: learning_rate (for fine-tuning)");
    println!("     Range: [1e-6, 1e-3]");
    println!("     Type: Log-uniform");
    println!("     Impact: Training speed vs stability\n");

    // 3. Demonstrate concept
    println!("=== How BootstrapOptuna Works ===\n");

    println!("1. Define Search Space");
    println!("   → Specify which parameters to tune");
    println!("   → Set ranges and distributions");
    println!("   → Example: max_demos in [1, 10]\n");

    println!("2. Bayesian Optimization");
    println!("   → Optuna suggests parameter combinations");
    println!("   → Try max_demos=3, temperature=0.7");
    println!("   → Evaluate performance on validation set");
    println!("   → Update belief about parameter importance\n");

    println!("3. Sequential Trials");
    println!("   Trial 1: max_demos=5, temp=0.5 → score=0.75");
    println!("   Trial 2: max_demos=3, temp=0.7 → score=0.82");
    println!("   Trial 3: max_demos=4, temp=0.6 → score=0.79");
    println!("   Trial 4: max_demos=3, temp=0.8 → score=0.84 ← Best!");
    println!("   ...");
    println!("   → Optuna converges to optimal configuration\n");

    println!("4. Return Best Configuration");
    println!("   → max_demos=3, temperature=0.8");
    println!("   → Validation score: 0.84");
    println!("   → Ready for production\n");

    // 4. Key benefits
    println!("=== Key Benefits ===\n");
    println!("✓ Automatic hyperparameter search (no manual tuning)");
    println!("✓ Bayesian optimization (smarter than grid search)");
    println!("✓ Saves hours of experimentation");
    println!("✓ Finds non-obvious parameter interactions");
    println!("✓ Works with any metric function\n");

    // 5. Comparison with manual tuning
    println!("=== Manual vs Automatic Tuning ===\n");

    println!("Manual Tuning:");
    println!("   1. Try max_demos=3 → test → record score");
    println!("   2. Try max_demos=5 → test → record score");
    println!("   3. Try max_demos=7 → test → record score");
    println!("   4. Try different temperatures...");
    println!("   Result: Tedious, time-consuming, may miss optimal config\n");

    println!("BootstrapOptuna:");
    println!("   1. Define search space");
    println!("   2. Run optuna.optimize(graph, trainset, metric)");
    println!("   3. Get best configuration automatically");
    println!("   Result: Fast, efficient, finds optimal config\n");

    // 6. Production usage
    println!("=== Production Usage ===\n");
    println!("```rust");
    println!("// Define what to optimize");
    println!("let optuna = BootstrapOptuna::new()");
    println!("    .with_param(\"max_demos\", 1, 10)");
    println!("    .with_param(\"temperature\", 0.0, 1.0)");
    println!("    .with_trials(20);");
    println!();
    println!("// Run optimization");
    println!("let result = optuna.optimize(graph, trainset, metric).await?;");
    println!();
    println!("// Use best configuration");
    println!("println!(\"Best score: {{}}\", result.best_score);");
    println!("println!(\"Best params: {{:?}}\", result.best_params);");
    println!("```\n");

    // 7. Advanced use cases
    println!("=== Advanced Use Cases ===\n");

    println!("1. Multi-Objective Optimization");
    println!("   → Optimize both quality and latency");
    println!("   → Find Pareto-optimal configurations");
    println!("   → Example: Best quality under 500ms latency\n");

    println!("2. Conditional Parameters");
    println!("   → Some params only active when others are set");
    println!("   → Example: learning_rate only matters if using fine-tuning");
    println!("   → Optuna handles conditional search spaces\n");

    println!("3. Pruning Unpromising Trials");
    println!("   → Stop bad trials early (saves compute)");
    println!("   → If score is worse than median after 5 examples, abort");
    println!("   → Focus compute on promising configurations\n");

    println!("See integration tests for full examples:");
    println!("  tests/optimizer_integration_tests.rs\n");

    Ok(())
}
