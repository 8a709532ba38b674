// src/components/modals/send_modal.rs
use crate::amount::{format_amount, format_usd};
use crate::components::address_input::AddressInput;
use crate::components::common::{Asset, Toast, ToastKind};
use crate::domain_resolver::DomainResolver;
use crate::prices;
use crate::send_flow::{
    NotificationSink, Recipient, SendFlowCoordinator, SendReceipt, SendStatus,
};
use crate::signing::SoftwareSigner;
use crate::transaction::WalletTransfer;
use crate::view_state::ViewState;
use crate::wallet::{Wallet, WalletInfo};
use dioxus::prelude::*;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

/// Lamports held back when "Max" is used on the native asset, so the
/// transfer itself can still pay its fee.
const MAX_SEND_FEE_RESERVE: u64 = 100_000;

/// Production sink: outcomes are logged here, the form raises its own
/// toasts from the submit result it already has in hand.
struct LogSink;

impl NotificationSink for LogSink {
    fn success(&self, title: &str, message: &str) {
        log::info!("{}: {}", title, message);
    }

    fn failure(&self, title: &str, message: &str) {
        log::warn!("{}: {}", title, message);
    }
}

/// Poll the cluster until the signature confirms, then toast. Gives up
/// quietly after a minute; the submission toast already went out.
fn watch_confirmation(signature: String, rpc_url: Option<String>, on_toast: EventHandler<Toast>) {
    spawn(async move {
        let client = crate::transaction::TransactionClient::new(rpc_url.as_deref());
        for _ in 0..30 {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            match client.confirm_transaction(&signature).await {
                Ok(true) => {
                    on_toast.call(Toast {
                        kind: ToastKind::Success,
                        title: "Transaction Confirmed".to_string(),
                        message: signature.clone(),
                    });
                    return;
                }
                Ok(false) => {}
                Err(e) => {
                    log::warn!("Confirmation poll failed: {}", e);
                    return;
                }
            }
        }
    });
}

/// Prop-friendly wrapper: components compare coordinators by identity.
#[derive(Clone)]
pub struct CoordinatorHandle(pub Arc<SendFlowCoordinator>);

impl PartialEq for CoordinatorHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn build_coordinator(
    asset: &Asset,
    wallet: &WalletInfo,
    custom_rpc: Option<&str>,
) -> Option<Arc<SendFlowCoordinator>> {
    let wallet = Wallet::from_wallet_info(wallet).ok()?;
    let owner = Pubkey::from_str(&wallet.public_key()).ok()?;
    let signer = Arc::new(SoftwareSigner::new(wallet));
    let transfer = Arc::new(WalletTransfer::new(signer, owner, custom_rpc));
    Some(SendFlowCoordinator::new(
        asset.clone(),
        Arc::new(DomainResolver::new()),
        transfer.clone(),
        transfer,
        Arc::new(LogSink),
    ))
}

#[component]
pub fn SendAssetForm(
    asset: Asset,
    wallet: WalletInfo,
    custom_rpc: Option<String>,
    view: ViewState,
    on_view_change: EventHandler<ViewState>,
    on_toast: EventHandler<Toast>,
    on_gift_created: EventHandler<String>,
) -> Element {
    let coordinator = use_hook(|| {
        build_coordinator(&asset, &wallet, custom_rpc.as_deref()).map(CoordinatorHandle)
    });
    let Some(handle) = coordinator else {
        return rsx! {
            div { class: "error-message", "Wallet unavailable" }
        };
    };

    let mut snapshot = use_signal(|| handle.0.snapshot());

    // The coordinator mutates off the render loop; reconcile its snapshot
    // into a signal here on the UI scheduler.
    {
        let handle = handle.clone();
        use_future(move || {
            let coordinator = handle.0.clone();
            async move {
                loop {
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    let current = coordinator.snapshot();
                    if current != *snapshot.peek() {
                        snapshot.set(current);
                    }
                }
            }
        });
    }

    // SOL price for the USD fee row
    {
        let handle = handle.clone();
        use_future(move || {
            let coordinator = handle.0.clone();
            async move {
                match prices::get_sol_price_usd().await {
                    Ok(price) => coordinator.set_sol_price(price),
                    Err(e) => log::warn!("Could not fetch SOL price: {}", e),
                }
            }
        });
    }

    if view >= ViewState::ConfirmTransaction {
        return rsx! {
            ConfirmTransactionView {
                handle: handle.clone(),
                snapshot: snapshot(),
                custom_rpc: custom_rpc.clone(),
                on_view_change,
                on_toast,
                on_gift_created,
            }
        };
    }

    let snap = snapshot();
    let submitting = snap.status == SendStatus::Submitting;
    let price = snap.asset.price_usd.unwrap_or(0.0);
    let amount_usd = format_usd(snap.amount_input.trim().parse::<f64>().unwrap_or(0.0) * price);
    let balance_display = snap.asset.quantity_display();
    let fee_line = snap.estimated_fee.map(|fee| {
        let mut line = format!("~{} SOL", format_amount(fee, 9));
        if let Some(usd) = snap.estimated_fee_usd {
            line.push_str(&format!(" ({})", format_usd(usd)));
        }
        line
    });
    let gift_minimum_error = format!("Gift amount must be greater than {}", format_usd(crate::gift::GIFT_MIN_USD));

    let max_units = if snap.asset.is_native() {
        snap.asset.quantity.saturating_sub(MAX_SEND_FEE_RESERVE)
    } else {
        snap.asset.quantity
    };

    rsx! {
        div { class: "send-form",

            div { class: "send-gift-toggle",
                label {
                    input {
                        r#type: "checkbox",
                        checked: snap.gift_mode,
                        onchange: {
                            let handle = handle.clone();
                            move |e: FormEvent| handle.0.set_gift_mode(e.checked())
                        },
                    }
                    "Send as a gift (claimable with a code)"
                }
            }

            if !snap.gift_mode {
                AddressInput {
                    value: snap.recipient_input.clone(),
                    on_change: {
                        let handle = handle.clone();
                        move |value: String| handle.0.set_recipient_input(&value)
                    },
                    snapshot: snap.clone(),
                    label: Some("Recipient".to_string()),
                }
            }

            div { class: "send-asset-row",
                div { class: "send-asset-identity",
                    span { class: "send-asset-symbol", "{snap.asset.symbol}" }
                    span { class: "send-asset-name", "{snap.asset.name}" }
                }
                div { class: "send-asset-balance",
                    "Balance: {balance_display} {snap.asset.symbol}"
                    button {
                        class: "max-button",
                        onclick: {
                            let handle = handle.clone();
                            let decimals = snap.asset.decimals;
                            move |_| handle.0.set_amount_input(&format_amount(max_units, decimals))
                        },
                        "Max"
                    }
                }
            }

            div { class: "send-amount-field",
                input {
                    r#type: "number",
                    class: "amount-input",
                    value: "{snap.amount_input}",
                    placeholder: "0.0",
                    min: "0",
                    oninput: {
                        let handle = handle.clone();
                        move |e: FormEvent| handle.0.set_amount_input(&e.value())
                    },
                }
                if price > 0.0 && !snap.amount_input.trim().is_empty() {
                    div { class: "amount-usd", "~{amount_usd}" }
                }
            }

            if snap.insufficient_balance {
                div { class: "error-message", "Insufficient balance" }
            }

            if !snap.gift_amount_valid {
                div { class: "error-message", "{gift_minimum_error}" }
            }

            if let Some(fee_line) = fee_line {
                div { class: "fee-row",
                    span { "Network fee" }
                    span { "{fee_line}" }
                }
            }

            div { class: "modal-buttons",
                button {
                    class: "modal-button cancel",
                    onclick: move |_| on_view_change.call(ViewState::SendAssets),
                    "Close"
                }
                button {
                    class: "modal-button primary",
                    disabled: !snap.can_submit || submitting,
                    onclick: move |_| on_view_change.call(ViewState::ConfirmTransaction),
                    if submitting { "Confirming..." } else { "Next" }
                }
            }
        }
    }
}

#[component]
fn ConfirmTransactionView(
    handle: CoordinatorHandle,
    snapshot: crate::send_flow::SendSnapshot,
    custom_rpc: Option<String>,
    on_view_change: EventHandler<ViewState>,
    on_toast: EventHandler<Toast>,
    on_gift_created: EventHandler<String>,
) -> Element {
    let mut created = use_signal(|| None as Option<SendReceipt>);
    let snap = snapshot;
    let submitting = snap.status == SendStatus::Submitting;

    // A finished gift creation shows the claim code instead of the summary
    if let Some(receipt) = created() {
        let code = receipt.claim_code.clone().unwrap_or_default();
        return rsx! {
            div { class: "confirm-view",
                h3 { class: "confirm-title", "Gift created" }
                div { class: "info-message",
                    "Share this claim code. Anyone holding it can claim the gift."
                }
                div { class: "claim-code-display", "{code}" }
                div { class: "modal-buttons",
                    button {
                        class: "modal-button primary",
                        onclick: move |_| {
                            created.set(None);
                            on_view_change.call(ViewState::SendAssets);
                        },
                        "Done"
                    }
                }
            }
        };
    }

    let recipient_line = if snap.gift_mode {
        "Gift escrow (derived from the claim code)".to_string()
    } else {
        match &snap.recipient {
            Recipient::Resolved { name, address } => format!("{} ({})", name, address),
            Recipient::Direct(address) => address.to_string(),
            Recipient::Unresolved => "-".to_string(),
        }
    };
    let fee_line = snap.estimated_fee.map(|fee| {
        let mut line = format!("~{} SOL", format_amount(fee, 9));
        if let Some(usd) = snap.estimated_fee_usd {
            line.push_str(&format!(" ({})", format_usd(usd)));
        }
        line
    });

    rsx! {
        div { class: "confirm-view",
            h3 { class: "confirm-title", "Confirm transaction" }

            div { class: "confirm-row",
                span { class: "confirm-label", "Sending" }
                span { "{snap.amount_input} {snap.asset.symbol}" }
            }
            div { class: "confirm-row",
                span { class: "confirm-label", "To" }
                span { class: "confirm-recipient", "{recipient_line}" }
            }
            if let Some(fee_line) = fee_line {
                div { class: "confirm-row",
                    span { class: "confirm-label", "Network fee" }
                    span { "{fee_line}" }
                }
            }

            div { class: "modal-buttons",
                button {
                    class: "modal-button cancel",
                    disabled: submitting,
                    onclick: move |_| on_view_change.call(ViewState::SendAssets),
                    "Back"
                }
                button {
                    class: "modal-button primary",
                    disabled: submitting,
                    onclick: {
                        let handle = handle.clone();
                        let custom_rpc = custom_rpc.clone();
                        move |_| {
                            let coordinator = handle.0.clone();
                            let rpc = custom_rpc.clone();
                            spawn(async move {
                                match coordinator.submit().await {
                                    Ok(receipt) => {
                                        if let Some(code) = receipt.claim_code.clone() {
                                            on_gift_created.call(code);
                                            created.set(Some(receipt));
                                        } else {
                                            on_toast.call(Toast {
                                                kind: ToastKind::Success,
                                                title: "Transaction Submitted".to_string(),
                                                message: receipt.signature.clone(),
                                            });
                                            on_view_change.call(ViewState::SendAssets);
                                            watch_confirmation(receipt.signature, rpc, on_toast);
                                        }
                                    }
                                    Err(e) => {
                                        on_toast.call(Toast {
                                            kind: ToastKind::Failure,
                                            title: "Transaction Failed".to_string(),
                                            message: e.to_string(),
                                        });
                                    }
                                }
                            });
                        }
                    },
                    if submitting { "Sending..." } else { "Confirm" }
                }
            }
        }
    }
}
