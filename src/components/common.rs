/// Shared display types for the wallet panel
use crate::amount::format_amount;
use solana_sdk::pubkey::Pubkey;

/// A balance entry: native SOL (`mint: None`) or an SPL token
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    /// `None` marks the chain-native asset
    pub mint: Option<Pubkey>,
    pub decimals: u8,
    /// Balance in the mint's smallest units
    pub quantity: u64,
    pub price_usd: Option<f64>,
}

impl Asset {
    pub fn native_sol(quantity: u64, price_usd: Option<f64>) -> Self {
        Self {
            symbol: "SOL".to_string(),
            name: "Solana".to_string(),
            mint: None,
            decimals: 9,
            quantity,
            price_usd,
        }
    }

    pub fn is_native(&self) -> bool {
        self.mint.is_none()
    }

    pub fn quantity_display(&self) -> String {
        format_amount(self.quantity, self.decimals)
    }

    pub fn quantity_ui(&self) -> f64 {
        self.quantity as f64 / 10u64.pow(self.decimals as u32) as f64
    }

    pub fn value_usd(&self) -> Option<f64> {
        self.price_usd.map(|p| p * self.quantity_ui())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToastKind {
    Success,
    Failure,
}

/// One entry in the panel's toast stack
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}
