use crate::error::TinyRsaError;
use cipher::rsa::{DEFAULT_KEY_BITS, DEFAULT_PUBLIC_EXPONENT};
use cipher::HashAlgorithm;
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

static CONFIG: OnceLock<TinyRsaConfig> = OnceLock::new();

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct TinyRsaConfig {
    // byte size
    pub io_buf_size: usize,

    // modulus bits for `generate` without `-s`
    pub key_bits: usize,

    pub public_exponent: u32,

    // signature hash for `sign` without `--hash`
    pub hash: String,

    // balanced prime pair attempts, 0 means unbounded
    pub max_search_attempts: usize,
}

impl Default for TinyRsaConfig {
    fn default() -> Self {
        Self {
            io_buf_size: 8 * 1024,
            key_bits: DEFAULT_KEY_BITS,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            hash: HashAlgorithm::default().name().to_string(),
            max_search_attempts: 0,
        }
    }
}

impl TinyRsaConfig {
    /// defaults, then the optional file, then `TINYRSA_*` variables
    pub fn load(f: Option<&Path>) -> anyhow::Result<Self> {
        let default_config = Config::try_from(&TinyRsaConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::from(f).required(true));
        }
        config = config.add_source(
            config::Environment::with_prefix("TINYRSA")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        );

        let mut tconfig: TinyRsaConfig = config.build()?.try_deserialize()?;
        tconfig.io_buf_size = tconfig.io_buf_size.max(1);
        tconfig.validate()?;

        log::trace!("{:?}", tconfig);
        Ok(tconfig)
    }

    fn validate(&self) -> Result<(), TinyRsaError> {
        self.hash
            .parse::<HashAlgorithm>()
            .map_err(|e| TinyRsaError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    /// Load once, later calls return the first result.
    pub fn init(f: Option<&Path>) -> anyhow::Result<&'static Self> {
        if let Some(c) = CONFIG.get() {
            return Ok(c);
        }

        let c = Self::load(f)?;
        Ok(CONFIG.get_or_init(|| c))
    }

    pub fn config() -> &'static Self {
        CONFIG.get_or_init(|| {
            Self::load(None).unwrap_or_else(|e| {
                log::warn!("{e:#}, falling back to the default configuration");
                Self::default()
            })
        })
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash.parse().unwrap_or_default()
    }

    /// `None` for an unbounded search
    pub fn search_attempts(&self) -> Option<usize> {
        (self.max_search_attempts > 0).then_some(self.max_search_attempts)
    }
}
