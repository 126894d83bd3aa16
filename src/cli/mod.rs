use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the chat relay HTTP server.
    Serve(ServeArgs),
    /// Open an interactive chat session against a running relay.
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    // --- Listener Args ---
    /// Port the relay listens on.
    #[arg(long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Interface the relay binds to.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Origin allowed by CORS (e.g., http://localhost:5173). Any origin when unset.
    #[arg(long, env = "FRONTEND_ORIGIN")]
    pub frontend_origin: Option<String>,

    // --- Provider Args ---
    /// Bearer key sent to the completion provider.
    #[arg(long, env = "OPENROUTER_API_KEY", default_value = "", hide_env_values = true)]
    pub openrouter_api_key: String,

    /// Chat-completion endpoint of the provider.
    #[arg(
        long,
        env = "PROVIDER_URL",
        default_value = "https://openrouter.ai/api/v1/chat/completions"
    )]
    pub provider_url: String,

    /// Model used when the caller does not name one.
    #[arg(long, env = "DEFAULT_MODEL", default_value = "deepseek/deepseek-r1")]
    pub default_model: String,

    /// Upper bound in seconds for one provider call.
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "60")]
    pub provider_timeout_secs: u64,

    // --- Persona Args ---
    /// Persona instruction placed first in every forwarded conversation.
    #[arg(long, env = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// File holding the persona instruction. Takes precedence over --system-prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the relay server.
    #[arg(long, env = "RELAY_URL", default_value = "http://localhost:3001")]
    pub relay_url: String,

    /// Model to request. The relay default applies when unset.
    #[arg(long, env = "CHAT_MODEL")]
    pub model: Option<String>,

    /// Seconds between fun-fact messages.
    #[arg(long, env = "FUN_FACT_INTERVAL_SECS", default_value = "300")]
    pub fun_fact_interval_secs: u64,

    /// Upper bound in seconds for one relay call.
    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value = "90")]
    pub relay_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let args = Args::try_parse_from(["deforestbot", "serve"]).unwrap();
        let Command::Serve(serve) = args.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(serve.default_model, "deepseek/deepseek-r1");
        assert!(serve.provider_url.starts_with("https://openrouter.ai/"));
    }

    #[test]
    fn chat_accepts_relay_url() {
        let args = Args::try_parse_from(
            ["deforestbot", "chat", "--relay-url", "http://relay.local:9000"]
        ).unwrap();
        let Command::Chat(chat) = args.command else {
            panic!("expected chat subcommand");
        };
        assert_eq!(chat.relay_url, "http://relay.local:9000");
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Args::try_parse_from(["deforestbot"]).is_err());
    }
}
