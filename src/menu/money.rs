use std::fmt::Display;

use crate::parse::Error;

/// `u32::MAX` has ten digits.
const MAX_DIGITS: usize = 10;

/// A price in Korean won. The won has no minor unit, so the amount is a whole number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Won(u32);

impl Won {
    pub const fn new(amount: u32) -> Self {
        Self(amount)
    }

    pub const fn amount(self) -> u32 {
        self.0
    }

    /// Parses the forms the cooperative pages use: `6000`, `6,500`, `6,500원`, `￦ 4,500`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let amount: String = s
            .trim()
            .trim_start_matches('￦')
            .trim_end_matches('원')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        // rusty-money panics on input it cannot hand to its decimal parser
        let digits = amount.chars().filter(char::is_ascii_digit).count();
        if digits == 0
            || digits > MAX_DIGITS
            || !amount.chars().all(|c| c.is_ascii_digit() || c == ',')
        {
            return Err(Error::price_parse_error(&format!("not a won amount: {s:?}")));
        }
        let money = rusty_money::Money::from_str(&amount, rusty_money::iso::KRW)?;
        u32::try_from(money.amount().trunc().mantissa())
            .map(Self)
            .map_err(|e| Error::price_parse_error(&format!("{s:?}: {e}")))
    }
}

impl Display for Won {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let money = rusty_money::Money::from_major(i64::from(self.0), rusty_money::iso::KRW);
        write!(f, "{money}")
    }
}
