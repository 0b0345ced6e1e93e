use std::time::Duration;

use serde_json::{json, Map};

use a2a_bridge::prelude::*;

// Configuration - update these to match your agent
const AGENT_URL: &str = "https://your-agent-url";
const AUTH_TOKEN: &str = "your-auth-token";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("🚀 A2A Bridge Simple Client Example\n");

    // Build the A2A client with HTTP transport and bearer authentication
    let url = AGENT_URL.parse().unwrap();
    let mut client = A2AClientBuilder::new_http(url)
        .with_bearer_auth(AUTH_TOKEN)
        .with_timeout(Duration::from_secs(30))
        .build()?;

    println!("✓ Client configured for: {AGENT_URL}\n");

    // Step 1: Discover the agent card
    println!("📋 Discovering agent capabilities...");
    let skill = match client.fetch_agent_card(false).await {
        Ok(card) => {
            println!("✓ Connected to: {}", card.name);
            println!("  Description: {}", card.description);
            println!("  Skills:");
            for capability in &card.capabilities {
                println!("    - {}: {}", capability.name, capability.description);
            }
            println!();
            // The card invariant guarantees at least one capability
            card.capabilities[0].name.clone()
        }
        Err(e) => {
            eprintln!(
                r#"✗ Failed to discover agent: {e}

    Note: Make sure AGENT_URL points to a running A2A agent"#
            );
            return Ok(());
        }
    };

    // Step 2: Invoke the first advertised skill
    println!("💬 Invoking skill: {skill}...");
    let mut parameters = Map::new();
    parameters.insert("text".into(), json!("I love this!"));

    match client.invoke_skill(&skill, parameters.clone()).await {
        Ok(InvocationResult {
            status,
            result,
            artifacts,
            ..
        }) => {
            println!("✓ Invocation finished: {status:?}");
            for (key, value) in &result {
                println!("  {key}: {value}");
            }
            if !artifacts.is_empty() {
                println!("  Produced {} artifact(s)", artifacts.len());
            }
        }
        Err(A2AError::SkillNotFound { available, .. }) => {
            eprintln!("✗ Skill vanished; agent offers: {}", available.join(", "));
        }
        Err(e) => {
            eprintln!("✗ Invocation failed: {e}");
        }
    }

    // Step 3: Invoke the same skill over SSE
    println!("\n🌊 Invoking the same skill with streaming...");
    match client.invoke_skill_streaming(&skill, parameters).await {
        Ok(result) => {
            println!("✓ Stream completed: {:?}", result.status);
            for (key, value) in &result.result {
                println!("  {key}: {value}");
            }
        }
        Err(e) => {
            eprintln!("✗ Streaming invocation failed: {e}");
        }
    }

    // Step 4: Probe the agent's health endpoint
    println!("\n🩺 Checking agent health...");
    match client.health_check().await {
        Some(report) => println!("✓ Agent health: {}", report["status"]),
        None => println!("✗ Agent is unreachable"),
    }

    println!("\n✅ Example completed successfully!");

    Ok(())
}
