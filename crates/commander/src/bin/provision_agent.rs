//! One-shot registration of the Incident Commander agent with Azure AI Foundry.

use tracing_subscriber::EnvFilter;

use incident_commander::{config::ProvisionConfig, provision::AgentProvisioner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing settings abort before any request is made.
    let config = match ProvisionConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("Error: {}", e);
            return Ok(());
        }
    };

    println!("Connecting to Azure AI Project...");
    let provisioner = AgentProvisioner::new(&config)?;
    let agent = provisioner
        .create_agent(&config.model_deployment_name, &config.agent_name)
        .await?;

    println!("Successfully created agent!");
    println!("Agent ID: {}", agent.id);
    println!(
        "Agent Name: {}",
        agent.name.as_deref().unwrap_or(&config.agent_name)
    );
    println!("{}", "-".repeat(20));
    println!("Please add these values to your .NET appsettings.json or backend .env:");
    println!("Azure__AiFoundry__AgentId={}", agent.id);

    Ok(())
}
