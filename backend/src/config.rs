use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Service settings, read from `DICE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub addr: SocketAddr,
    /// JSON outline font; the built-in segment font when unset.
    pub font_file: Option<PathBuf>,
    pub splice_padding: f64,
    /// Kernel tolerance for booleans and tessellation.
    pub tolerance: f64,
    /// Generated dice kept for STEP export before the oldest are dropped.
    pub max_stored: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.var, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            font_file: None,
            splice_padding: 1.0,
            tolerance: 0.01,
            max_stored: 64,
        }
    }
}

fn parse_positive(var: &'static str, value: String, allow_zero: bool) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (v > 0.0 || (allow_zero && v == 0.0)) => Ok(v),
        Ok(_) => Err(ConfigError {
            var,
            value,
            reason: "out of range".into(),
        }),
        Err(e) => Err(ConfigError {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(addr) = lookup("DICE_ADDR") {
            config.addr = addr.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError {
                var: "DICE_ADDR",
                reason: e.to_string(),
                value: addr.clone(),
            })?;
        }
        config.font_file = lookup("DICE_FONT_FILE").filter(|p| !p.is_empty()).map(PathBuf::from);
        if let Some(padding) = lookup("DICE_SPLICE_PADDING") {
            config.splice_padding = parse_positive("DICE_SPLICE_PADDING", padding, true)?;
        }
        if let Some(tolerance) = lookup("DICE_TOLERANCE") {
            config.tolerance = parse_positive("DICE_TOLERANCE", tolerance, false)?;
        }
        if let Some(max) = lookup("DICE_MAX_STORED") {
            config.max_stored = match max.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError {
                        var: "DICE_MAX_STORED",
                        value: max,
                        reason: "must be at least 1".into(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError {
                        var: "DICE_MAX_STORED",
                        reason: e.to_string(),
                        value: max,
                    })
                }
            };
        }
        Ok(config)
    }
}
