//! Model Distillation Example
//!
//! This example demonstrates the concept of model distillation: transferring
//! knowledge from an expensive "teacher" model (GPT-4) to a cheaper "student"
//! model (GPT-3.5 or local model).
//!
//! Benefits:
//! - Achieve 90-95% of teacher quality at 5-10x lower cost
//! - Reduce inference latency
//! - Enable local deployment (zero API costs)
//!
//! Three Distillation Approaches:
//! 1. Prompt Optimization: Few-shot examples in prompt (fastest setup)
//! 2. OpenAI Fine-tuning: Model weights updated (best accuracy)
//! 3. Local Fine-tuning: Train local model (zero inference cost)
//!
//! This is a simplified conceptual example. For production use, see the
//! integration tests in crates/dashflow/tests/dashoptimize_tests.rs
//!
//! Run with: cargo run --package dashflow --example model_distillation_example

fn main() -> dashflow::Result<()> {
    println!("=== Model Distillation - Concept Demo ===\n");

    // 1. Explain the problem
    println!("=== The Problem ===\n");
    println!("Teacher Model (GPT-4):");
    println!("  ✓ High quality: 94% accuracy");
    println!("  ✗ Expensive: $0.0045 per request");
    println!("  ✗ Slow: 850ms latency");
    println!("  → Monthly cost: $1,350 at 10k requests/day\n");

    println!("Goal: Achieve similar quality at lower cost\n");

    // 2. Show the three approaches
    println!("=== Three Distillation Approaches ===\n");

    println!("1. PROMPT OPTIMIZATION (Fastest Setup)");
    println!("   Method: Add few-shot examples to prompt");
    println!("   Setup: 5 minutes");
    println!("   Cost: $0.00042/request (10.7x cheaper)");
    println!("   Quality: 87.5% (93% of teacher)");
    println!("   Pros: No training, instant deployment");
    println!("   Cons: Lower quality than fine-tuning\n");

    println!("2. OPENAI FINE-TUNING (Best Accuracy)");
    println!("   Method: Fine-tune GPT-3.5 on teacher outputs");
    println!("   Setup: 20 minutes");
    println!("   Cost: $0.00042/request (10.7x cheaper)");
    println!("   Quality: 91.8% (97.7% of teacher)");
    println!("   Pros: Best quality-cost trade-off");
    println!("   Cons: Requires OpenAI API, training time\n");

    println!("3. LOCAL FINE-TUNING (Zero API Cost)");
    println!("   Method: Fine-tune local model (Llama-3-8B)");
    println!("   Setup: 60 minutes");
    println!("   Cost: $0.00000/request (FREE!)");
    println!("   Quality: 89.2% (95% of teacher)");
    println!("   Pros: No API costs, full control, faster inference");
    println!("   Cons: Longer setup, requires GPU\n");

    // 3. Show the workflow
    println!("=== Distillation Workflow ===\n");

    println!("Step 1: Teacher generates training data");
    println!("  Input: 1000 unlabeled questions");
    println!("  Teacher: Run GPT-4 on each question");
    println!("  Output: 1000 (question, answer) pairs\n");

    println!("Step 2: Student learns from teacher data");
    println!("  Approach A: Select best examples for few-shot prompt");
    println!("  Approach B: Fine-tune GPT-3.5 via OpenAI API");
    println!("  Approach C: Fine-tune local Llama model\n");

    println!("Step 3: Evaluate on test set");
    println!("  Run: teacher vs student_A vs student_B vs student_C");
    println!("  Metric: Accuracy on 100 held-out examples\n");

    println!("Step 4: Compare cost/quality trade-offs");
    println!("  Report: Quality, cost/request, setup time, monthly cost\n");

    // 4. Show example cost analysis
    println!("=== Cost Analysis (10k requests/day) ===\n");

    let requests_per_day = 10_000;
    let requests_per_month = requests_per_day * 30;

    let teacher_cost = 0.0045;
    let student_cost = 0.00042;
    let local_cost = 0.0;

    let teacher_monthly = teacher_cost * requests_per_month as f64;
    let student_monthly = student_cost * requests_per_month as f64;
    let local_monthly = local_cost * requests_per_month as f64;

    println!("Teacher (GPT-4):        ${:.2}/month", teacher_monthly);
    println!(
        "Prompt Optimization:    ${:.2}/month  (saves ${:.2})",
        student_monthly,
        teacher_monthly - student_monthly
    );
    println!(
        "OpenAI Fine-tune:       ${:.2}/month  (saves ${:.2})",
        student_monthly,
        teacher_monthly - student_monthly
    );
    println!(
        "Local Fine-tune:        ${:.2}/month  (saves ${:.2})\n",
        local_monthly,
        teacher_monthly - local_monthly
    );

    // 5. Show ROI calculation
    println!("=== Return on Investment ===\n");

    let prompt_setup_cost = 5.0 / 60.0 * 50.0; // 5 min at $50/hr
    let openai_setup_cost = 20.0 / 60.0 * 50.0 + 10.0; // 20 min + $10 training
    let local_setup_cost = 1.0 * 50.0 + 100.0; // 60 min (1 hr) at $50/hr + $100 GPU

    let prompt_savings_per_month = teacher_monthly - student_monthly;
    let openai_savings_per_month = teacher_monthly - student_monthly;
    let local_savings_per_month = teacher_monthly - local_monthly;

    let prompt_payback_hours = prompt_setup_cost / prompt_savings_per_month * 30.0 * 24.0;
    let openai_payback_hours = openai_setup_cost / openai_savings_per_month * 30.0 * 24.0;
    let local_payback_hours = local_setup_cost / local_savings_per_month * 30.0 * 24.0;

    println!("Prompt Optimization:");
    println!("  Setup cost: ${:.2}", prompt_setup_cost);
    println!("  Monthly savings: ${:.2}", prompt_savings_per_month);
    println!("  Payback time: {:.1} hours\n", prompt_payback_hours);

    println!("OpenAI Fine-tuning:");
    println!("  Setup cost: ${:.2}", openai_setup_cost);
    println!("  Monthly savings: ${:.2}", openai_savings_per_month);
    println!("  Payback time: {:.1} hours\n", openai_payback_hours);

    println!("Local Fine-tuning:");
    println!("  Setup cost: ${:.2}", local_setup_cost);
    println!("  Monthly savings: ${:.2}", local_savings_per_month);
    println!("  Payback time: {:.1} hours\n", local_payback_hours);

    // 6. Decision guide
    println!("=== When to Use Each Approach ===\n");

    println!("Prompt Optimization:");
    println!("  ✓ Quick experiments, prototypes");
    println!("  ✓ Low request volume (<1k/day)");
    println!("  ✓ Acceptable to lose 5-10% quality\n");

    println!("OpenAI Fine-tuning:");
    println!("  ✓ Production systems");
    println!("  ✓ High request volume (>10k/day)");
    println!("  ✓ Need 95%+ of teacher quality");
    println!("  ✓ Don't want to manage infrastructure\n");

    println!("Local Fine-tuning:");
    println!("  ✓ Very high request volume (>100k/day)");
    println!("  ✓ Data privacy requirements");
    println!("  ✓ Have GPU infrastructure");
    println!("  ✓ Want zero API costs\n");

    println!("=== Production Usage ===\n");
    println!("For full working examples with actual models and APIs, see:");
    println!("• crates/dashflow/tests/dashoptimize_tests.rs");
    println!("• docs/DASHOPTIMIZE_GUIDE.md (complete documentation)");
    println!("\nThis conceptual example shows distillation workflow and cost analysis");
    println!("without requiring API keys or training models.");

    Ok(())
}

// © 2025 Dropbox (created by Andrew Yates <ayates@dropbox.com>)
