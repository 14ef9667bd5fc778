//! Capability flags consumed by the encoders and the vector probe.

use std::env;

use thiserror::Error;
use tracing::warn;

pub const ENV_USE_RVC: &str = "RVJIT_USE_RVC";
pub const ENV_USE_RVV: &str = "RVJIT_USE_RVV";
pub const ENV_MAX_VECTOR_SIZE: &str = "RVJIT_MAX_VECTOR_SIZE";

/// Smallest vector register length (bytes) the vector backend accepts.
pub const MIN_VECTOR_SIZE: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("unsupported max vector size: {0}")]
    UnsupportedMaxVectorSize(usize),
}

/// Code generation capability flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    /// Allow 16-bit compressed encodings inside compressible regions.
    pub use_rvc: bool,
    /// Allow vector instructions. Cleared when the probe finds no vector unit.
    pub use_rvv: bool,
    /// Maximum vector size in bytes; `None` means "not set by the user".
    pub max_vector_size: Option<usize>,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            use_rvc: true,
            use_rvv: true,
            max_vector_size: None,
        }
    }
}

impl Features {
    /// Defaults overridden by `RVJIT_*` environment variables.
    pub fn from_env() -> Result<Self, FeatureError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`Features::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FeatureError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut f = Self::default();
        if let Some(v) = lookup(ENV_USE_RVC) {
            f.use_rvc = parse_bool(ENV_USE_RVC, &v)?;
        }
        if let Some(v) = lookup(ENV_USE_RVV) {
            f.use_rvv = parse_bool(ENV_USE_RVV, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_VECTOR_SIZE) {
            let size = v
                .trim()
                .parse::<usize>()
                .map_err(|_| FeatureError::InvalidValue {
                    var: ENV_MAX_VECTOR_SIZE,
                    value: v.clone(),
                })?;
            f.max_vector_size = Some(size);
        }
        Ok(f)
    }

    pub fn with_rvc(mut self, on: bool) -> Self {
        self.use_rvc = on;
        self
    }

    pub fn with_rvv(mut self, on: bool) -> Self {
        self.use_rvv = on;
        self
    }

    pub fn with_max_vector_size(mut self, size: usize) -> Self {
        self.max_vector_size = Some(size);
        self
    }

    /// Fold the probed vector register length (bytes, 0 = no vector unit)
    /// into the flags.
    pub fn apply_vector_length(&mut self, vlenb: u32) -> Result<(), FeatureError> {
        if self.use_rvv && vlenb == 0 {
            warn!("vector extension not usable on this CPU, disabling RVV");
            self.use_rvv = false;
        }

        if !self.use_rvv {
            self.max_vector_size = Some(0);
            return Ok(());
        }

        let vlenb = vlenb as usize;
        match self.max_vector_size {
            None => self.max_vector_size = Some(vlenb),
            Some(size) if size < MIN_VECTOR_SIZE => {
                warn!(
                    size,
                    "RVV does not support vector length less than {MIN_VECTOR_SIZE} bytes, disabling RVV"
                );
                self.use_rvv = false;
                self.max_vector_size = Some(0);
            }
            Some(size) if size.is_power_of_two() => {
                if size > vlenb {
                    warn!(
                        requested = size,
                        supported = vlenb,
                        "max vector size clamped to hardware vector length"
                    );
                }
                self.max_vector_size = Some(vlenb);
            }
            Some(size) => return Err(FeatureError::UnsupportedMaxVectorSize(size)),
        }
        Ok(())
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, FeatureError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(FeatureError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}
