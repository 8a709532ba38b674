pub mod common;
pub mod address_input;
pub mod modals;
pub mod wallet_view;

pub use wallet_view::WalletView;
