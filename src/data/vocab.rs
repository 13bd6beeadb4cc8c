//! Fixed vocabularies the pipeline consumes as given configuration:
//! the 14 WUENIC vaccine codes and the conflict-country ISO3 list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The 14 vaccine codes present in the coverage workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VaccineCode {
    Bcg,
    Dtp1,
    Dtp3,
    Hepb3,
    Hepbb,
    Hib3,
    Ipv1,
    Mcv1,
    Mcv2,
    Pcv3,
    Pol3,
    Rcv1,
    Rotac,
    Yfv,
}

impl VaccineCode {
    pub const ALL: [VaccineCode; 14] = [
        VaccineCode::Bcg,
        VaccineCode::Dtp1,
        VaccineCode::Dtp3,
        VaccineCode::Hepb3,
        VaccineCode::Hepbb,
        VaccineCode::Hib3,
        VaccineCode::Ipv1,
        VaccineCode::Mcv1,
        VaccineCode::Mcv2,
        VaccineCode::Pcv3,
        VaccineCode::Pol3,
        VaccineCode::Rcv1,
        VaccineCode::Rotac,
        VaccineCode::Yfv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bcg => "BCG",
            Self::Dtp1 => "DTP1",
            Self::Dtp3 => "DTP3",
            Self::Hepb3 => "HEPB3",
            Self::Hepbb => "HEPBB",
            Self::Hib3 => "HIB3",
            Self::Ipv1 => "IPV1",
            Self::Mcv1 => "MCV1",
            Self::Mcv2 => "MCV2",
            Self::Pcv3 => "PCV3",
            Self::Pol3 => "POL3",
            Self::Rcv1 => "RCV1",
            Self::Rotac => "ROTAC",
            Self::Yfv => "YFV",
        }
    }

    /// Case-insensitive lookup of a code string. Returns `None` for anything
    /// outside the fixed vocabulary.
    pub fn parse(value: &str) -> Option<VaccineCode> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for VaccineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ISO3 codes for the conflict-country comparison charts. Taken as given
/// business input: the list includes THA and MEX even though they are not
/// conventionally classified as conflict zones.
pub const CONFLICT_COUNTRIES: [&str; 9] = [
    "AFG", "IRQ", "SDN", "THA", "PAK", "MEX", "NGA", "SYR", "YEM",
];

/// Region label the aggregate sheet uses for worldwide rollups.
pub const GLOBAL_REGION: &str = "Global";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_any_case_and_rejects_unknown_codes() {
        assert_eq!(VaccineCode::parse("dtp3"), Some(VaccineCode::Dtp3));
        assert_eq!(VaccineCode::parse(" BCG "), Some(VaccineCode::Bcg));
        assert_eq!(VaccineCode::parse("HEPB3"), Some(VaccineCode::Hepb3));
        assert_eq!(VaccineCode::parse("SMALLPOX"), None);
    }

    #[test]
    fn all_codes_round_trip_through_as_str() {
        for code in VaccineCode::ALL {
            assert_eq!(VaccineCode::parse(code.as_str()), Some(code));
        }
    }

    #[test]
    fn serde_uses_the_upper_case_code() {
        let json = serde_json::to_string(&VaccineCode::Rotac).unwrap();
        assert_eq!(json, "\"ROTAC\"");
        let back: VaccineCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VaccineCode::Rotac);
    }
}
