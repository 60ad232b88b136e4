//! Display currencies.
//!
//! All amounts are stored in USD. A `Currency` converts a stored amount into the currency the user
//! wants to see, formats it the way an en-US locale would, and converts amounts typed in that
//! currency back into USD.

use crate::model::Amount;
use anyhow::anyhow;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Jpy,
    Gbp,
    Cad,
    Aud,
    Inr,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Jpy,
        Currency::Gbp,
        Currency::Cad,
        Currency::Aud,
        Currency::Inr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Inr => "INR",
        }
    }

    /// Units of this currency per one USD. These are fixed rates.
    pub fn rate(self) -> Decimal {
        match self {
            Currency::Usd => Decimal::ONE,
            Currency::Eur => Decimal::new(93, 2),
            Currency::Jpy => Decimal::new(15725, 2),
            Currency::Gbp => Decimal::new(79, 2),
            Currency::Cad => Decimal::new(137, 2),
            Currency::Aud => Decimal::new(150, 2),
            Currency::Inr => Decimal::new(8350, 2),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Jpy => "¥",
            Currency::Gbp => "£",
            Currency::Cad => "CA$",
            Currency::Aud => "A$",
            Currency::Inr => "₹",
        }
    }

    fn fraction_digits(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Converts a stored USD amount into this currency without rounding.
    pub fn convert(self, amount: Amount) -> Decimal {
        amount.value().saturating_mul(self.rate())
    }

    /// Converts an amount the user typed in this currency into USD for storage.
    pub fn to_base(self, entered: Amount) -> Amount {
        Amount::new(
            entered
                .value()
                .checked_div(self.rate())
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Formats a stored USD amount in this currency, e.g. `$1,234.56`, `-€9.30` or `¥15,725`.
    pub fn format(self, amount: Amount) -> String {
        let converted = self
            .convert(amount)
            .round_dp_with_strategy(self.fraction_digits(), RoundingStrategy::MidpointAwayFromZero);
        let sign = if converted.is_sign_negative() && !converted.is_zero() {
            "-"
        } else {
            ""
        };
        let f = converted.abs().to_f64().unwrap_or_default();
        let grouped = match self.fraction_digits() {
            0 => format_num::format_num!(",.0", f),
            _ => format_num::format_num!(",.2", f),
        };
        format!("{sign}{}{grouped}", self.symbol())
    }

    /// Maps a POSIX locale string such as `en_GB.UTF-8` or a BCP 47 tag such as `de-DE` to the
    /// currency of its country, if it is one we have a rate for.
    pub fn from_locale(locale: &str) -> Option<Currency> {
        let base = locale.split(['.', '@']).next().unwrap_or_default();
        if base.len() < 2 || !(base.contains('_') || base.contains('-')) {
            return None;
        }
        let country = base.get(base.len() - 2..)?.to_ascii_uppercase();
        match country.as_str() {
            "US" => Some(Currency::Usd),
            "GB" => Some(Currency::Gbp),
            "JP" => Some(Currency::Jpy),
            "CA" => Some(Currency::Cad),
            "AU" => Some(Currency::Aud),
            "IN" => Some(Currency::Inr),
            "AT" | "BE" | "CY" | "EE" | "FI" | "FR" | "DE" | "GR" | "IE" | "IT" | "LV" | "LT"
            | "LU" | "MT" | "NL" | "PT" | "SK" | "SI" | "ES" => Some(Currency::Eur),
            _ => None,
        }
    }

    /// Looks at the locale environment variables and picks the matching currency, falling back to
    /// USD.
    pub fn detect() -> Currency {
        for var in ["LC_ALL", "LC_MONETARY", "LANG"] {
            if let Ok(value) = std::env::var(var) {
                if value.is_empty() {
                    continue;
                }
                return match Currency::from_locale(&value) {
                    Some(currency) => {
                        debug!("Detected currency {currency} from {var}={value}");
                        currency
                    }
                    None => {
                        debug!("No currency for locale {var}={value}, defaulting to USD");
                        Currency::Usd
                    }
                };
            }
        }
        Currency::Usd
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| {
                let supported: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
                anyhow!(
                    "Unsupported currency '{s}', expected one of {}",
                    supported.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(Currency::Usd.format(amount("1234.5")), "$1,234.50");
        assert_eq!(Currency::Usd.format(amount("0")), "$0.00");
        assert_eq!(Currency::Usd.format(amount("-80")), "-$80.00");
    }

    #[test]
    fn test_format_converts() {
        assert_eq!(Currency::Eur.format(amount("10")), "€9.30");
        assert_eq!(Currency::Gbp.format(amount("100")), "£79.00");
        assert_eq!(Currency::Inr.format(amount("2")), "₹167.00");
        assert_eq!(Currency::Cad.format(amount("1")), "CA$1.37");
    }

    #[test]
    fn test_format_yen_has_no_fraction() {
        assert_eq!(Currency::Jpy.format(amount("100")), "¥15,725");
    }

    #[test]
    fn test_conversion_saturates() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(Currency::Jpy.convert(max), Decimal::MAX);
        assert_eq!(Currency::Gbp.to_base(max).value(), Decimal::MAX);
        assert!(Currency::Jpy.format(max).starts_with('¥'));
    }

    #[test]
    fn test_to_base() {
        let usd = Currency::Eur.to_base(amount("93"));
        assert_eq!(usd.value(), Decimal::from(100));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Currency::from_str("eur").unwrap(), Currency::Eur);
        assert_eq!(Currency::from_str("GBP").unwrap(), Currency::Gbp);
        assert!(Currency::from_str("XYZ").is_err());
    }

    #[test]
    fn test_from_locale() {
        assert_eq!(Currency::from_locale("en_GB.UTF-8"), Some(Currency::Gbp));
        assert_eq!(Currency::from_locale("de_DE"), Some(Currency::Eur));
        assert_eq!(Currency::from_locale("ja-JP"), Some(Currency::Jpy));
        assert_eq!(Currency::from_locale("en_US.UTF-8@posix"), Some(Currency::Usd));
        assert_eq!(Currency::from_locale("pt_BR.UTF-8"), None);
        assert_eq!(Currency::from_locale("C"), None);
        assert_eq!(Currency::from_locale("POSIX"), None);
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&Currency::Aud).unwrap();
        assert_eq!(json, "\"AUD\"");
        let back: Currency = serde_json::from_str("\"INR\"").unwrap();
        assert_eq!(back, Currency::Inr);
    }
}
