use std::{env, io::Write, time::Duration};

use daan_common::{helpers::env_flag, MinorUnits, Secret};
use daan_engine::settlement_objects::SettlementConfig;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_DAAN_HOST: &str = "127.0.0.1";
const DEFAULT_DAAN_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/daan_store.db";
/// Minimum length of the HS256 session secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub razorpay_config: RazorpayConfig,
    /// If false, webhook calls are accepted without checking the `X-Razorpay-Signature` header. **DANGER**
    pub webhook_checks: bool,
    /// Donation limits and gateway timeout handed to the settlement engine
    pub settlement: SettlementConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DAAN_HOST.to_string(),
            port: DEFAULT_DAAN_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            razorpay_config: RazorpayConfig::default(),
            webhook_checks: true,
            settlement: SettlementConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DAAN_HOST").ok().unwrap_or_else(|| DEFAULT_DAAN_HOST.into());
        let port = env::var("DAAN_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DAAN_PORT. {e} Using the default, {DEFAULT_DAAN_PORT}, \
                         instead."
                    );
                    DEFAULT_DAAN_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DAAN_PORT);
        let database_url = env::var("DAAN_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ DAAN_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let razorpay_config = RazorpayConfig::new_from_env_or_default();
        if !razorpay_config.has_credentials() {
            error!(
                "🪛️ Razorpay credentials are incomplete. The server will start, but donation orders and payment \
                 verification will fail until DAAN_RAZORPAY_KEY_ID and DAAN_RAZORPAY_KEY_SECRET are set."
            );
        }
        let webhook_checks = env_flag("DAAN_RAZORPAY_WEBHOOK_CHECKS", true);
        if !webhook_checks {
            warn!("🚨️ Webhook signature checks are DISABLED. Do not run production like this. 🚨️");
        }
        let settlement = configure_settlement(&razorpay_config);
        Self { host, port, database_url, auth, razorpay_config, webhook_checks, settlement }
    }
}

fn configure_settlement(razorpay_config: &RazorpayConfig) -> SettlementConfig {
    let defaults = SettlementConfig::default();
    let min_donation = configure_limit("DAAN_MIN_DONATION", defaults.min_donation);
    let max_donation = configure_limit("DAAN_MAX_DONATION", defaults.max_donation);
    let (min_donation, max_donation) = donation_limits(min_donation, max_donation, &defaults);
    let gateway_timeout: Duration = razorpay_config.timeout;
    info!("🪛️ Donations are limited to {min_donation} - {max_donation}. Gateway timeout: {gateway_timeout:?}");
    SettlementConfig { min_donation, max_donation, gateway_timeout, ..defaults }
}

/// Donations below one major unit are never accepted, whatever DAAN_MIN_DONATION says.
fn donation_limits(min: MinorUnits, max: MinorUnits, defaults: &SettlementConfig) -> (MinorUnits, MinorUnits) {
    let floor = MinorUnits::from_major(1);
    let min = if min < floor {
        warn!("🪛️ DAAN_MIN_DONATION ({min}) is below {floor}. Using {floor} instead.");
        floor
    } else {
        min
    };
    if min > max {
        warn!(
            "🪛️ DAAN_MIN_DONATION ({min}) is larger than DAAN_MAX_DONATION ({max}). Using the default limits instead."
        );
        (defaults.min_donation, defaults.max_donation)
    } else {
        (min, max)
    }
}

fn configure_limit(name: &str, default: MinorUnits) -> MinorUnits {
    env::var(name)
        .map_err(|_| info!("🪛️ {name} is not set. Using the default value of {default}."))
        .and_then(|s| {
            MinorUnits::parse_major(&s)
                .map_err(|e| warn!("🪛️ Invalid configuration value for {name}. {e}"))
                .and_then(|v| {
                    if v.is_positive() {
                        Ok(v)
                    } else {
                        warn!("🪛️ {name} must be positive. Using the default value of {default}.");
                        Err(())
                    }
                })
        })
        .ok()
        .unwrap_or(default)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret shared with the service that issues devotee session tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since no session token issued elsewhere will be accepted. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        match &mut tmpfile {
            Some((f, p)) => match writeln!(f, "{secret}") {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, you \
                     are doing it wrong! Set the DAAN_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret. ");
            },
        }
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new(secret: &str) -> Result<Self, ServerError> {
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ServerError::ConfigurationError(format!(
                "The JWT secret must be at least {MIN_JWT_SECRET_LEN} characters long"
            )));
        }
        Ok(Self { jwt_secret: Secret::new(secret.to_string()) })
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("DAAN_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [DAAN_JWT_SECRET]")))?;
        Self::new(secret.trim())
    }
}
