use std::{sync::Arc, time::Duration};

use anyhow::Result;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    amount::{AmountCodec, AmountError},
    calls::ContractModules,
    model::AccountAddress,
    utils::logger::TracingMode,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Local,
}

impl Network {
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.aptoslabs.com/",
            Network::Testnet => "https://fullnode.testnet.aptoslabs.com/",
            Network::Devnet => "https://fullnode.devnet.aptoslabs.com/",
            Network::Local => "http://127.0.0.1:8080/",
        }
    }
}

pub type SharedConf = Arc<Conf>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Conf {
    pub network: Network,
    /// Overrides the network's default fullnode
    pub node_url: Option<String>,
    pub module_address: AccountAddress,
    pub insurance_module: String,
    pub rental_module: String,
    /// Default account for creator and landlord listings
    pub creator_address: Option<AccountAddress>,
    pub decimals: u8,
    pub poll_interval_ms: u64,
    pub query_retries: usize,
    pub query_retry_delay_ms: u64,
    pub log_format: String,
}

impl Conf {
    pub fn new(
        config_file: Option<String>,
        network: Option<String>,
        node_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("conf_defaults.toml"),
            FileFormat::Toml,
        ));
        if let Some(config_file) = config_file {
            builder = builder.add_source(File::with_name(config_file.as_str()));
        }
        let s = builder
            // Priority order: defaults, config file, then environment variables, then CLI
            .add_source(Environment::with_prefix("rentsure").try_parsing(true))
            .set_override_option("network", network)?
            .set_override_option("node_url", node_url)?
            .build()?;

        s.try_deserialize()
    }

    pub fn new_shared(
        config_file: Option<String>,
        network: Option<String>,
        node_url: Option<String>,
    ) -> Result<SharedConf, ConfigError> {
        Self::new(config_file, network, node_url).map(Arc::new)
    }

    pub fn node_url(&self) -> String {
        self.node_url
            .clone()
            .unwrap_or_else(|| self.network.fullnode_url().to_string())
    }

    pub fn modules(&self) -> ContractModules {
        ContractModules {
            address: self.module_address.clone(),
            insurance: self.insurance_module.clone(),
            rental: self.rental_module.clone(),
        }
    }

    pub fn codec(&self) -> Result<AmountCodec, AmountError> {
        AmountCodec::new(self.decimals)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn query_retry_delay(&self) -> Duration {
        Duration::from_millis(self.query_retry_delay_ms)
    }

    pub fn tracing_mode(&self) -> Result<TracingMode> {
        self.log_format.parse()
    }
}
