//! Static casino and bank catalogs.
//!
//! The full casino list lives here; which entries are actually offered is
//! decided per deposit by the remotely-fetched payment settings.

/// A casino the bot can top up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Casino {
    pub id: &'static str,
    pub name: &'static str,
}

/// A bank offered on the payment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bank {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const CASINOS: &[Casino] = &[
    Casino { id: "1xbet", name: "1xBet" },
    Casino { id: "melbet", name: "Melbet" },
    Casino { id: "1win", name: "1win" },
    Casino { id: "mostbet", name: "mostbet" },
    Casino { id: "winwin", name: "Winwin" },
    Casino { id: "888starz", name: "888starz" },
    Casino { id: "1xcasino", name: "1xCasino" },
    Casino { id: "betwinner", name: "BetWinner" },
];

pub const DEPOSIT_BANKS: &[Bank] = &[
    Bank { id: "mbank", name: "Mbank", icon: "/static/images/mbank.png" },
    Bank { id: "omoney", name: "О деньги", icon: "/static/images/omoney.jpg" },
    Bank { id: "bakai", name: "BAKAI", icon: "/static/images/bakai.jpg" },
    Bank { id: "megapay", name: "MEGApay", icon: "/static/images/megapay.jpg" },
];

/// Looks up a casino's display name, falling back to the raw id for
/// entries that have been removed from the catalog but still arrive in
/// callbacks.
pub fn casino_name(id: &str) -> &str {
    CASINOS
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name)
        .unwrap_or(id)
}
