pub mod fruchterman_reingold;
pub mod kamada_kawai;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub use fruchterman_reingold::FruchtermanReingold;
pub use kamada_kawai::KamadaKawai;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "kebab-case")]
pub enum Algorithm {
    /// Spring embedder with a cooling schedule.
    FruchtermanReingold(FruchtermanReingoldOptions),
    /// Per-component spring-energy minimization.
    KamadaKawai(KamadaKawaiOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FruchtermanReingoldOptions {
    /// Inset from the right/bottom canvas edge, in pixels.
    pub pad: f64,
    /// Passes run at full temperature before cooling starts.
    pub initial_iterations: usize,
    pub max_passes: usize,
    /// Push a display frame every N passes; `0` disables intermediate frames.
    pub update_every_n_passes: usize,
    pub rescale_on_completion: bool,
    pub animate_transitions: bool,
    /// Seed for the first-call random placement. Unseeded runs use the clock.
    pub random_seed: Option<u64>,
}

impl Default for FruchtermanReingoldOptions {
    fn default() -> Self {
        Self {
            pad: 20.0,
            initial_iterations: 30,
            max_passes: 500,
            update_every_n_passes: 0,
            rescale_on_completion: true,
            animate_transitions: true,
            random_seed: None,
        }
    }
}

impl FruchtermanReingoldOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        validate_pad(self.pad)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KamadaKawaiOptions {
    pub spring_constant: f64,
    /// Convergence floor for the decaying energy threshold.
    pub min_epsilon: f64,
    /// Newton-Raphson sub-pass budget for one `update_layout` call.
    pub max_passes: usize,
    /// Re-seed every call from a circle instead of only the first one.
    pub circle_layout_each_time: bool,
    pub rescale_on_completion: bool,
    pub animate_transitions: bool,
    pub pad: f64,
    pub update_every_n_passes: usize,
}

impl Default for KamadaKawaiOptions {
    fn default() -> Self {
        Self {
            spring_constant: 1.0,
            min_epsilon: 1.0,
            max_passes: 5000,
            circle_layout_each_time: false,
            rescale_on_completion: true,
            animate_transitions: true,
            pad: 4.0,
            update_every_n_passes: 0,
        }
    }
}

impl KamadaKawaiOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        validate_pad(self.pad)?;
        if !(self.spring_constant.is_finite() && self.spring_constant > 0.0) {
            return Err(Error::InvalidOption {
                name: "springConstant",
                value: self.spring_constant.to_string(),
            });
        }
        if !(self.min_epsilon.is_finite() && self.min_epsilon > 0.0) {
            return Err(Error::InvalidOption {
                name: "minEpsilon",
                value: self.min_epsilon.to_string(),
            });
        }
        Ok(())
    }
}

fn validate_pad(pad: f64) -> Result<()> {
    if pad.is_finite() && pad >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidOption {
            name: "pad",
            value: pad.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let opts = FruchtermanReingoldOptions::from_json(r#"{ "pad": 4, "randomSeed": 7 }"#)
            .unwrap();
        assert_eq!(opts.pad, 4.0);
        assert_eq!(opts.random_seed, Some(7));
        assert_eq!(opts.max_passes, 500);
        assert!(opts.rescale_on_completion);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = KamadaKawaiOptions::from_json(r#"{ "springConstant": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOption {
                name: "springConstant",
                ..
            }
        ));
        assert!(matches!(
            FruchtermanReingoldOptions::from_json("{ pad: }"),
            Err(Error::OptionsJson(_))
        ));
    }

    #[test]
    fn algorithm_is_tagged() {
        let algo: Algorithm =
            serde_json::from_str(r#"{ "algorithm": "kamada-kawai", "maxPasses": 10 }"#).unwrap();
        let Algorithm::KamadaKawai(opts) = algo else {
            panic!("expected kamada-kawai");
        };
        assert_eq!(opts.max_passes, 10);
        assert_eq!(opts.spring_constant, 1.0);
    }
}
