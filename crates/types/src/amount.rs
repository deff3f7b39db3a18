use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An INR amount held as paise (1/100 rupee).
///
/// The gateway carries amounts as decimal strings and hashes them verbatim,
/// so the request leg must render the same bytes every time. `Amount` is the
/// single formatting point: whatever the client sent ("500", "500.5",
/// "500.00") becomes the canonical two-decimal form before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount contains invalid characters: '{0}'")]
    InvalidCharacters(String),
    #[error("amount has more than two decimal places: '{0}'")]
    TooManyDecimals(String),
    #[error("amount is out of range: '{0}'")]
    OutOfRange(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_paise(paise: i64) -> Self {
        Amount(paise)
    }

    pub fn paise(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_mul(self, factor: i64) -> Option<Amount> {
        self.0.checked_mul(factor).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts unsigned decimal strings with at most two fractional digits.
    /// No signs, no thousands separators, no exponents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::InvalidCharacters(s.to_string()));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::InvalidCharacters(s.to_string()));
        }
        if frac.len() > 2 {
            return Err(AmountParseError::TooManyDecimals(s.to_string()));
        }

        let rupees: i64 = whole
            .parse()
            .map_err(|_| AmountParseError::OutOfRange(s.to_string()))?;
        let frac_paise: i64 = match frac.len() {
            0 => 0,
            1 => {
                frac.parse::<i64>()
                    .map_err(|_| AmountParseError::InvalidCharacters(s.to_string()))?
                    * 10
            }
            _ => frac
                .parse()
                .map_err(|_| AmountParseError::InvalidCharacters(s.to_string()))?,
        };

        rupees
            .checked_mul(100)
            .and_then(|r| r.checked_add(frac_paise))
            .map(Amount)
            .ok_or_else(|| AmountParseError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for Amount {
    /// Canonical gateway rendering: rupees, a dot, exactly two digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rupees = self.0 / 100;
        let paise = (self.0 % 100).abs();
        if self.0 < 0 && rupees == 0 {
            write!(f, "-0.{:02}", paise)
        } else {
            write!(f, "{}.{:02}", rupees, paise)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_rupees() {
        assert_eq!("500".parse::<Amount>().unwrap(), Amount::from_paise(50000));
        assert_eq!("0".parse::<Amount>().unwrap(), Amount::ZERO);
    }

    #[test]
    fn parses_fractional_amounts() {
        assert_eq!("500.5".parse::<Amount>().unwrap(), Amount::from_paise(50050));
        assert_eq!("500.00".parse::<Amount>().unwrap(), Amount::from_paise(50000));
        assert_eq!("0.01".parse::<Amount>().unwrap(), Amount::from_paise(1));
    }

    #[test]
    fn renders_two_decimal_places() {
        assert_eq!(Amount::from_paise(50000).to_string(), "500.00");
        assert_eq!(Amount::from_paise(50050).to_string(), "500.50");
        assert_eq!(Amount::from_paise(1).to_string(), "0.01");
        assert_eq!(Amount::from_paise(0).to_string(), "0.00");
    }

    #[test]
    fn parse_then_render_is_canonical() {
        for (input, expected) in [("500", "500.00"), ("500.5", "500.50"), ("500.00", "500.00")] {
            assert_eq!(input.parse::<Amount>().unwrap().to_string(), expected);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert!(matches!(
            "1,000".parse::<Amount>(),
            Err(AmountParseError::InvalidCharacters(_))
        ));
        assert!(matches!(
            "-5".parse::<Amount>(),
            Err(AmountParseError::InvalidCharacters(_))
        ));
        assert!(matches!(
            "+5".parse::<Amount>(),
            Err(AmountParseError::InvalidCharacters(_))
        ));
        assert!(matches!(
            "5.001".parse::<Amount>(),
            Err(AmountParseError::TooManyDecimals(_))
        ));
        assert!(matches!(
            ".50".parse::<Amount>(),
            Err(AmountParseError::InvalidCharacters(_))
        ));
        assert!(matches!(
            "1e3".parse::<Amount>(),
            Err(AmountParseError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(AmountParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn serde_round_trips_as_string() {
        let amount: Amount = serde_json::from_str("\"500.5\"").unwrap();
        assert_eq!(amount, Amount::from_paise(50050));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"500.50\"");
    }

    #[test]
    fn checked_arithmetic_saturates_to_none() {
        assert_eq!(Amount::from_paise(i64::MAX).checked_add(Amount::from_paise(1)), None);
        assert_eq!(Amount::from_paise(i64::MAX).checked_mul(2), None);
        assert_eq!(
            Amount::from_paise(100).checked_mul(3),
            Some(Amount::from_paise(300))
        );
    }
}
