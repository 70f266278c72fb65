//! Payment gateway routing by guest country.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// External payment processor a checkout is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gateway {
    Stripe,
    Paystack,
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gateway::Stripe => f.write_str("Stripe"),
            Gateway::Paystack => f.write_str("Paystack"),
        }
    }
}

/// Countries routed to Paystack by default.
pub const DEFAULT_PAYSTACK_COUNTRIES: [&str; 4] = ["NG", "GH", "ZA", "KE"];

/// Country-code routing table. Codes in the set go to Paystack, everything
/// else (including codes we have never heard of) goes to Stripe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRouting {
    paystack_countries: HashSet<String>,
}

impl GatewayRouting {
    pub fn new<I, S>(paystack_countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paystack_countries: paystack_countries
                .into_iter()
                .map(|code| code.as_ref().trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    /// Parse a comma separated list such as `"NG,GH,ZA,KE"`.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn select_gateway(&self, country_code: &str) -> Gateway {
        if self
            .paystack_countries
            .contains(&country_code.trim().to_uppercase())
        {
            Gateway::Paystack
        } else {
            Gateway::Stripe
        }
    }

    pub fn paystack_countries(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.paystack_countries.iter().cloned().collect();
        codes.sort();
        codes
    }
}

impl Default for GatewayRouting {
    fn default() -> Self {
        Self::new(DEFAULT_PAYSTACK_COUNTRIES)
    }
}
