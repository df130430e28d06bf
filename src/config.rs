//! Dissector configuration.
//!
//! Preferences are plain values handed to the dissectors at construction
//! time. Every field has a default, so partial configurations deserialize.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::atm::cell_header::ReferencePoint;
use crate::constants::{
    DEFAULT_ALLOW_CW_LENGTH_NONZERO, DEFAULT_DISSECT_LANE_AS_SSCOP,
    DEFAULT_EXTEND_CW_LENGTH_WITH_RSVD, DEFAULT_HEC_PRESENT,
};

/// How strictly the length field of a preferred control word is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlWordOptions {
    /// Accept a non-zero length field and derive the payload size from it.
    pub allow_nonzero_length: bool,
    /// Treat the two reserved bits in front of the length as part of it.
    pub extend_length_with_reserved: bool,
}

impl Default for ControlWordOptions {
    fn default() -> Self {
        Self {
            allow_nonzero_length: DEFAULT_ALLOW_CW_LENGTH_NONZERO,
            extend_length_with_reserved: DEFAULT_EXTEND_CW_LENGTH_WITH_RSVD,
        }
    }
}

/// ATM pseudowire preferences, one set per mode with a length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PwAtmConfig {
    /// N:1 cell mode with control word.
    pub n1_cw: ControlWordOptions,
    /// AAL5 SDU mode.
    pub aal5_sdu: ControlWordOptions,
}

/// ATM cell layer preferences.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub reference_point: ReferencePoint,
    /// Raw cells carry the HEC byte.
    pub hec_present: bool,
    /// Hand LANE traffic to the signalling decoder.
    pub dissect_lane_as_sscop: bool,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            reference_point: ReferencePoint::default(),
            hec_present: DEFAULT_HEC_PRESENT,
            dissect_lane_as_sscop: DEFAULT_DISSECT_LANE_AS_SSCOP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cw = ControlWordOptions::default();
        assert!(!cw.allow_nonzero_length);
        assert!(!cw.extend_length_with_reserved);

        let atm = AtmConfig::default();
        assert_eq!(atm.reference_point, ReferencePoint::Uni);
        assert!(atm.hec_present);
        assert!(!atm.dissect_lane_as_sscop);
    }

    #[test]
    fn atm_config_reference_point_as_string() {
        let config = AtmConfig {
            reference_point: ReferencePoint::Nni,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"reference_point\":\"nni\""));
        let back: AtmConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let pw: PwAtmConfig =
            serde_json::from_str(r#"{"aal5_sdu":{"allow_nonzero_length":true}}"#).unwrap();
        assert!(pw.aal5_sdu.allow_nonzero_length);
        assert!(!pw.aal5_sdu.extend_length_with_reserved);
        assert_eq!(pw.n1_cw, ControlWordOptions::default());

        let atm: AtmConfig = serde_json::from_str(r#"{"hec_present":false}"#).unwrap();
        assert!(!atm.hec_present);
        assert_eq!(atm.reference_point, ReferencePoint::Uni);
    }

    #[test]
    fn unknown_reference_point_is_rejected() {
        let result: Result<AtmConfig, _> =
            serde_json::from_str(r#"{"reference_point":"bogus"}"#);
        assert!(result.is_err());
    }
}
