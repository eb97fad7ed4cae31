//! Plans offered for sale.

use crate::expiry::PlanLabel;
use serde::Serialize;

/// A sellable plan. `name` doubles as the plan label given to the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanOffer {
    pub name: &'static str,
    /// Price in whole rupees.
    pub price: u32,
}

impl PlanOffer {
    /// Returns the parsed label used for expiry.
    #[must_use]
    pub fn label(&self) -> PlanLabel {
        PlanLabel::parse(self.name)
    }
}

const CATALOG: &[PlanOffer] = &[
    PlanOffer {
        name: "Monthly",
        price: 999,
    },
    PlanOffer {
        name: "6 Month",
        price: 4500,
    },
    PlanOffer {
        name: "1 Year",
        price: 8500,
    },
    // No duration keyword: expires on the monthly default.
    PlanOffer {
        name: "Lifetime",
        price: 15000,
    },
];

/// Returns the plan catalog.
#[must_use]
pub fn catalog() -> &'static [PlanOffer] {
    CATALOG
}

/// Looks up a plan by name, ignoring case.
#[must_use]
pub fn find_plan(name: &str) -> Option<&'static PlanOffer> {
    let name = name.trim();
    CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
