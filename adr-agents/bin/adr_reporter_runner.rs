use adr_agents::{
    config::AppConfig,
    conversation::run_conversation,
    factory::{create_llm_client, create_tool_executor, AgentFactory},
    storage::{AgentStorage, InMemoryStorage},
    types::Session,
    Agent,
};
use adr_llm_sdk::auth::{MetadataServerTokenProvider, StaticTokenProvider, TokenProvider};
use adr_tools::SecretManagerClient;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Adverse drug reaction report or question for the root agent
    #[arg(short, long)]
    prompt: Option<String>,

    /// Keep the session open and read follow-up turns from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Optional TOML config file; environment variables take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    let metadata = Arc::new(MetadataServerTokenProvider::new()?);
    let tokens: Arc<dyn TokenProvider> = match &config.gcp.access_token {
        Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => metadata.clone() as Arc<dyn TokenProvider>,
    };

    let project_id = match &config.gcp.project {
        Some(project) => project.clone(),
        None => metadata.project_id().await.map_err(|e| {
            anyhow::anyhow!(
                "GOOGLE_CLOUD_PROJECT is not set and the metadata server is unavailable: {}",
                e
            )
        })?,
    };
    tracing::info!(project = %project_id, location = %config.gcp.location, vertex_ai = config.gcp.use_vertexai, "Configuration loaded");

    let secrets = Arc::new(SecretManagerClient::new(tokens.clone()));
    let tool_executor = Arc::new(create_tool_executor(&config, &project_id, secrets));
    let client = create_llm_client(&config, &project_id, tokens)?;
    let storage = Arc::new(InMemoryStorage::new());

    let factory = AgentFactory::new(
        client.clone(),
        storage.clone(),
        tool_executor,
        config.prompt_library(),
    );
    let agent = factory.create_root_agent()?;

    tracing::debug!("System prompt:\n{}", agent.system_prompt());

    let initial_prompt = match (&args.prompt, args.interactive) {
        (Some(prompt), _) => prompt.clone(),
        (None, true) => String::new(),
        (None, false) => anyhow::bail!("--prompt is required unless --interactive is set"),
    };

    println!("Running agent: {}", agent.name());

    let session = Session::start(
        agent.name(),
        client.provider_name(),
        agent.model(),
        Some(agent.system_prompt()),
        initial_prompt.clone(),
    );
    let session_id = storage.create_session(session).await?;

    if !initial_prompt.is_empty() {
        println!("User prompt: {}\n", initial_prompt);
        let result = agent.execute(&initial_prompt, session_id).await?;
        println!("\n--- Agent Result ---\n{}\n", result);
    }

    if args.interactive {
        println!("Interactive mode - session ID: {}", session_id);
        println!("Answer the agent's questions. Type 'quit' or 'exit' to end the session.\n");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        run_conversation(&agent, session_id, stdin.lock(), &mut stdout).await?;
    }

    Ok(())
}
