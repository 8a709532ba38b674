pub mod wallet_modal;
pub mod send_modal;
pub mod receive_modal;
pub mod gift_views;

pub use wallet_modal::WalletPanel;
pub use send_modal::SendAssetForm;
pub use receive_modal::ReceiveModal;
pub use gift_views::{ClaimGiftView, ClaimGiftConfirmView, GiftInfoDetailView};
