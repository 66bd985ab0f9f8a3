//! BootstrapFinetune Dataset Export Example
//!
//! This example demonstrates the concept of collecting execution traces from DashStream
//! and exporting them as fine-tuning datasets.
//!
//! BootstrapFinetune enables:
//! 1. Collecting successful execution traces from production
//! 2. Filtering high-quality examples
//! 3. Converting to fine-tuning format (OpenAI JSONL, etc.)
//! 4. Model distillation (GPT-4 → GPT-3.5 for cost savings)
//!
//! This is a simplified conceptual example. For production use, BootstrapFinetune requires:
//! - DashStream integration (traces logged to Kafka)
//! - Access to model fine-tuning API
//!
//! Run with: cargo run --package dashflow --example finetune_dataset_export

use dashflow::introspection::NodeExecution;
use serde_json::json;

fn main() -> dashflow::Result<()> {
    println!("=== BootstrapFinetune - Concept Demo ===\n");

    // 1. Create mock trace data (simulates DashStream traces)
    println!("📊 Creating Mock Trace Data:");
    let traces = create_mock_traces();
    println!("   {} traces collected from DashStream", traces.len());
    println!("   Traces include: predictor name, inputs, predictions\n");

    // 2. Filter successful traces
    println!("🔍 Filtering Successful Traces:");
    let successful_count = traces
        .iter()
        .filter(|t| t.success)
        .count();
    println!(
        "   {} successful / {} total",
        successful_count,
        traces.len()
    );
    println!("   Filtering criteria: No errors, valid predictions\n");

    // 3. Convert to fine-tuning format
    println!("📝 Converting to Fine-Tuning Format:");
    println!("   OpenAI JSONL format:");
    println!("   {{\"messages\": [");
    println!("     {{\"role\": \"system\", \"content\": \"...\"}},");
    println!("     {{\"role\": \"user\", \"content\": \"...\"}},");
    println!("     {{\"role\": \"assistant\", \"content\": \"...\"}}");
    println!("   ]}}\n");

    // 4. Create BootstrapFinetune instance
    println!("🔧 Creating BootstrapFinetune:");
    println!("   ```rust");
    println!("   let metric = Arc::new(|trace: &ExecutionTrace| {{");
    println!("       // Evaluate trace quality");
    println!("       Ok(true)  // Accept trace");
    println!("   }});");
    println!("   let finetune = BootstrapFinetune::new(metric);");
    println!("   ```");
    println!("   ✅ BootstrapFinetune created\n");

    // 5. Demonstrate concept
    println!("=== How BootstrapFinetune Works ===\n");

    println!("1. Trace Collection (via DashStream)");
    println!("   → DashFlow executes in production");
    println!("   → DashStream logs all events to Kafka");
    println!("   → BootstrapFinetune consumes events\n");

    println!("2. Trace Filtering");
    println!("   → Filter successful executions (no errors)");
    println!("   → Apply quality thresholds (optional metric)");
    println!("   → Select high-quality examples only\n");

    println!("3. Format Conversion");
    println!("   → Extract (input, output) pairs from traces");
    println!("   → Convert to OpenAI JSONL format");
    println!("   → Support other formats (local models, etc.)\n");

    println!("4. Dataset Export");
    println!("   → Write to file: fine_tune_dataset.jsonl");
    println!("   → Ready for model training\n");

    println!("5. Model Fine-Tuning");
    println!("   → Submit to OpenAI fine-tuning API");
    println!("   → Or train local model");
    println!("   → Wait for training completion\n");

    println!("=== Key Benefits ===\n");
    println!("✓ Automatic dataset generation from production traces");
    println!("✓ No manual labeling required");
    println!("✓ Model distillation: GPT-4 knowledge → GPT-3.5 speed/cost");
    println!("✓ Continuous improvement from production data");
    println!("✓ Leverages existing DashStream infrastructure\n");

    println!("=== Use Cases ===\n");
    println!("• Cost optimization: Distill expensive model → cheaper model");
    println!("• Specialization: Train model for specific domain");
    println!("• Privacy: Move from API model → self-hosted model");
    println!("• Performance: Reduce latency with smaller model\n");

    println!("=== Production Usage ===\n");
    println!("1. Enable DashStream in your graph");
    println!("2. Run in production, collect traces");
    println!("3. Use BootstrapFinetune to export dataset");
    println!("4. Submit to fine-tuning API");
    println!("5. Deploy optimized model\n");

    println!("See integration tests for full examples:");
    println!("  tests/optimizer_integration_tests.rs\n");

    Ok(())
}

/// Create mock trace data (simulates DashStream traces)
fn create_mock_traces() -> Vec<NodeExecution> {
    vec![
        // Successful classification
        NodeExecution::new("sentiment-classifier", 0)
            .with_state_before(json!({ "text": "This product is amazing! I love it." }))
            .with_state_after(json!({ "sentiment": "positive" })),
        // Successful classification
        NodeExecution::new("sentiment-classifier", 0)
            .with_state_before(json!({ "text": "Terrible experience, very disappointed." }))
            .with_state_after(json!({ "sentiment": "negative" })),
        // Failed prediction (would be filtered out)
        NodeExecution::new("sentiment-classifier", 0)
            .with_state_before(json!({ "text": "..." }))
            .with_error("Parse error"),
    ]
}
