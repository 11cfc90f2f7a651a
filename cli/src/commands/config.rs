//! `oktaplus config` - inspect and edit config.toml

use crate::config::AppConfig;
use clap::Subcommand;
use oktaplus_shared::oauth::config::parse_scope;
use oktaplus_shared::oauth::{PkceMethod, ProviderRegistry, StrategyConfig};

#[derive(Subcommand, PartialEq, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print a complete sample configuration file
    Sample,
    /// Add a strategy built on a provider preset
    Init {
        /// Provider preset (e.g., "okta", "auth0", "google")
        #[arg(long)]
        provider: String,

        /// Strategy name (defaults to the provider id)
        #[arg(long)]
        name: Option<String>,

        /// Organisation domain, for presets that need one
        #[arg(long)]
        domain: Option<String>,

        /// OAuth client id
        #[arg(long)]
        client_id: String,

        /// Space-separated scopes (defaults to the preset's)
        #[arg(long)]
        scope: Option<String>,

        /// Use the authorization code flow with PKCE instead of the implicit flow.
        /// The code is exchanged with a GET request, which the okta, auth0 and
        /// google token endpoints refuse; set `token_endpoint` to a proxy that
        /// accepts GET and forwards a POST.
        #[arg(long, default_value_t = false)]
        code: bool,

        /// Make this the default strategy
        #[arg(long = "default", default_value_t = false)]
        make_default: bool,

        /// Replace an existing strategy of the same name
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

impl ConfigCommands {
    pub fn run(self, mut config: AppConfig) -> Result<(), String> {
        match self {
            ConfigCommands::Show => {
                print_config(&config);
                Ok(())
            }
            ConfigCommands::Sample => {
                print_sample_config();
                Ok(())
            }
            ConfigCommands::Init {
                provider,
                name,
                domain,
                client_id,
                scope,
                code,
                make_default,
                force,
            } => {
                let registry = ProviderRegistry::new();
                if !registry.has_provider(&provider) {
                    return Err(format!(
                        "Unknown provider '{}'. Available: {}",
                        provider,
                        registry.provider_ids().join(", ")
                    ));
                }

                let name = name.unwrap_or_else(|| provider.clone());
                if config.has_saved_strategy(&name) && !force {
                    return Err(format!(
                        "Strategy '{}' already exists. Use --force to replace it.",
                        name
                    ));
                }

                let strategy = StrategyConfig {
                    provider: Some(provider),
                    domain,
                    client_id: Some(client_id),
                    scope: scope.as_deref().map(parse_scope),
                    response_type: code.then(|| "code".to_string()),
                    code_challenge_method: code.then_some(PkceMethod::S256),
                    ..StrategyConfig::default()
                };

                // fail early on presets that need more than was given
                strategy
                    .clone()
                    .resolve(&registry)
                    .map_err(|e| format!("Invalid strategy: {}", e))?;

                let make_default = make_default || config.default_strategy.is_none();
                config
                    .save_strategy(&name, strategy, make_default)
                    .map_err(|e| format!("Failed to save config: {}", e))?;

                println!(
                    "Saved strategy '{}' to {}",
                    name,
                    config.config_path.display()
                );
                Ok(())
            }
        }
    }
}

fn print_config(config: &AppConfig) {
    println!("Current configuration:");
    println!("  Config file: {}", config.config_path.display());
    println!("  Callback listener: {}", config.callback_origin());
    println!(
        "  Callback route: {}",
        config.redirect.callback.as_deref().unwrap_or("(any)")
    );
    println!(
        "  Default strategy: {}",
        config.default_strategy.as_deref().unwrap_or("(not set)")
    );

    if config.strategies.is_empty() {
        println!("  Strategies: (none)");
        return;
    }

    println!("  Strategies:");
    for (name, strategy) in &config.strategies {
        let provider = strategy.provider.as_deref().unwrap_or("custom");
        let client_id = if strategy.client_id.as_deref().is_some_and(|c| !c.is_empty()) {
            "set"
        } else {
            "missing"
        };
        println!(
            "    - {} (provider: {}, client id: {})",
            name, provider, client_id
        );
    }
}

fn print_sample_config() {
    print!("{}", SAMPLE_CONFIG);
}

const SAMPLE_CONFIG: &str = r#"# oktaplus configuration file

# Routes of the host application
[redirect]
# The provider sends the browser back here ("" accepts any path)
callback = "/callback"
# Where to go after a successful sign-in
home = "/"
# Where to go after sign-out when the provider has no end-session endpoint
logout = "/"

[settings]
# Port of the local listener that receives the callback
callback_port = 8085
default_strategy = "okta"
open_browser = true

# Okta, implicit flow with an ID token
[strategies.okta]
provider = "okta"
domain = "dev-123456.okta.com"
client_id = "0oa1example"
# authorization_server = "default"
response_type = "id_token token"
redirect_uri_after_logout = "http://127.0.0.1:8085/"

# Auth0, implicit flow with an ID token
[strategies.auth0]
provider = "auth0"
domain = "tenant.eu.auth0.com"
client_id = "your_client_id"
response_type = "id_token token"
audience = "https://api.example.com"

# Any OAuth2 provider, authorization code flow with PKCE.
# The code is exchanged with a GET request carrying the parameters in the
# query. Okta, Auth0 and Google only accept POST at their token endpoints,
# so with those presets point token_endpoint at a proxy that accepts GET.
[strategies.custom]
authorization_endpoint = "https://sso.example.com/oauth/authorize"
token_endpoint = "https://sso.example.com/oauth/token"
userinfo_endpoint = "https://sso.example.com/oauth/userinfo"
client_id = "your_client_id"
scope = ["openid", "profile"]
response_type = "code"
code_challenge_method = "S256"
token_type = "Bearer"
token_name = "Authorization"

# Environment overrides (also read from .env):
#   OKTAPLUS_<STRATEGY>_CLIENT_ID, OKTAPLUS_<STRATEGY>_DOMAIN,
#   OKTAPLUS_<STRATEGY>_REDIRECT_URI, OKTAPLUS_<STRATEGY>_SCOPE,
#   OKTAPLUS_<STRATEGY>_REDIRECT_URI_ON_LOGOUT
"#;
