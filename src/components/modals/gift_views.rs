// src/components/modals/gift_views.rs
use crate::amount::format_amount;
use crate::components::common::{Toast, ToastKind};
use crate::gift::{ClaimCode, GiftClient, GiftInfo};
use crate::view_state::ViewState;
use dioxus::prelude::*;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Claim-code entry. A valid code previews what the escrow holds before
/// anything moves.
#[component]
pub fn ClaimGiftView(
    custom_rpc: Option<String>,
    on_preview: EventHandler<(String, GiftInfo)>,
    on_view_change: EventHandler<ViewState>,
) -> Element {
    let mut code_input = use_signal(|| "".to_string());
    let mut loading = use_signal(|| false);
    let mut error_message = use_signal(|| None as Option<String>);

    rsx! {
        div { class: "claim-gift-view",
            h3 { class: "confirm-title", "Claim a gift" }

            if let Some(error) = error_message() {
                div { class: "error-message", "{error}" }
            }

            div { class: "wallet-field",
                label { "Claim code:" }
                input {
                    value: "{code_input}",
                    oninput: move |e| code_input.set(e.value()),
                    placeholder: "Paste the claim code you received"
                }
            }

            div { class: "modal-buttons",
                button {
                    class: "modal-button primary",
                    disabled: code_input().trim().is_empty() || loading(),
                    onclick: move |_| {
                        let raw = code_input();
                        let rpc = custom_rpc.clone();
                        error_message.set(None);

                        let code = match ClaimCode::from_str(&raw) {
                            Ok(code) => code,
                            Err(e) => {
                                error_message.set(Some(e));
                                return;
                            }
                        };

                        loading.set(true);
                        spawn(async move {
                            match GiftClient::new(rpc.as_deref()).gift_info(&code).await {
                                Ok(info) if info.claimed => {
                                    error_message.set(Some("This gift has already been claimed".to_string()));
                                }
                                Ok(info) => {
                                    on_preview.call((code.to_string(), info));
                                    on_view_change.call(ViewState::ClaimGiftConfirm);
                                }
                                Err(e) => {
                                    error_message.set(Some(format!("Could not look up gift: {}", e)));
                                }
                            }
                            loading.set(false);
                        });
                    },
                    if loading() { "Looking up..." } else { "Preview gift" }
                }
            }
        }
    }
}

/// Shows what the escrow holds and sweeps it into the claimer's wallet.
#[component]
pub fn ClaimGiftConfirmView(
    code: String,
    info: GiftInfo,
    claimer_address: String,
    custom_rpc: Option<String>,
    on_toast: EventHandler<Toast>,
    on_done: EventHandler<()>,
) -> Element {
    let mut claiming = use_signal(|| false);

    let sol_line = format!("{} SOL", format_amount(info.lamports, 9));
    let token_lines: Vec<String> = info
        .token_accounts
        .iter()
        .filter(|a| a.amount > 0)
        .map(|a| {
            let symbol = crate::prices::symbol_for_mint(&a.mint)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("{}...", &a.mint[..8.min(a.mint.len())]));
            format!("{} {}", format_amount(a.amount, a.decimals), symbol)
        })
        .collect();

    rsx! {
        div { class: "claim-gift-view",
            h3 { class: "confirm-title", "Gift contents" }

            div { class: "confirm-row",
                span { class: "confirm-label", "SOL" }
                span { "{sol_line}" }
            }
            for line in token_lines.iter() {
                div { class: "confirm-row",
                    span { class: "confirm-label", "Token" }
                    span { "{line}" }
                }
            }

            div { class: "info-message",
                "Claiming sweeps everything above into your wallet."
            }

            div { class: "modal-buttons",
                button {
                    class: "modal-button primary",
                    disabled: claiming(),
                    onclick: move |_| {
                        let raw = code.clone();
                        let rpc = custom_rpc.clone();
                        let claimer = claimer_address.clone();
                        claiming.set(true);

                        spawn(async move {
                            let result = async {
                                let code = ClaimCode::from_str(&raw)?;
                                let claimer = Pubkey::from_str(&claimer)
                                    .map_err(|e| format!("Bad wallet address: {}", e))?;
                                GiftClient::new(rpc.as_deref())
                                    .claim_gift(&code, &claimer)
                                    .await
                                    .map_err(|e| e.to_string())
                            }
                            .await;

                            match result {
                                Ok(signatures) => {
                                    on_toast.call(Toast {
                                        kind: ToastKind::Success,
                                        title: "Gift Claimed".to_string(),
                                        message: signatures.join(", "),
                                    });
                                    on_done.call(());
                                }
                                Err(e) => {
                                    on_toast.call(Toast {
                                        kind: ToastKind::Failure,
                                        title: "Claim Failed".to_string(),
                                        message: e,
                                    });
                                }
                            }
                            claiming.set(false);
                        });
                    },
                    if claiming() { "Claiming..." } else { "Claim gift" }
                }
            }
        }
    }
}

/// Detail view for a gift created this session: live escrow status plus
/// cancellation, which sweeps the escrow back to the creator.
#[component]
pub fn GiftInfoDetailView(
    code: String,
    creator_address: String,
    custom_rpc: Option<String>,
    on_toast: EventHandler<Toast>,
    on_done: EventHandler<()>,
) -> Element {
    let mut info = use_signal(|| None as Option<GiftInfo>);
    let mut cancelling = use_signal(|| false);

    {
        let raw = code.clone();
        let rpc = custom_rpc.clone();
        use_future(move || {
            let raw = raw.clone();
            let rpc = rpc.clone();
            async move {
                if let Ok(parsed) = ClaimCode::from_str(&raw) {
                    match GiftClient::new(rpc.as_deref()).gift_info(&parsed).await {
                        Ok(fetched) => info.set(Some(fetched)),
                        Err(e) => log::warn!("Could not fetch gift status: {}", e),
                    }
                }
            }
        });
    }

    let status_line = match info() {
        None => "Checking escrow...".to_string(),
        Some(i) if i.claimed => "Claimed".to_string(),
        Some(i) => format!("Unclaimed ({} SOL in escrow)", format_amount(i.lamports, 9)),
    };
    let cancellable = matches!(info(), Some(ref i) if !i.claimed);

    let code_for_cancel = code.clone();
    let rpc_for_cancel = custom_rpc.clone();
    let creator_for_cancel = creator_address.clone();

    rsx! {
        div { class: "gift-detail-view",
            h3 { class: "confirm-title", "Gift details" }

            div { class: "wallet-field",
                label { "Claim code:" }
                div { class: "claim-code-display", "{code}" }
            }

            div { class: "confirm-row",
                span { class: "confirm-label", "Status" }
                span { "{status_line}" }
            }

            div { class: "modal-buttons",
                button {
                    class: "modal-button cancel",
                    disabled: !cancellable || cancelling(),
                    onclick: move |_| {
                        let raw = code_for_cancel.clone();
                        let rpc = rpc_for_cancel.clone();
                        let creator = creator_for_cancel.clone();
                        cancelling.set(true);

                        spawn(async move {
                            let result = async {
                                let code = ClaimCode::from_str(&raw)?;
                                let creator = Pubkey::from_str(&creator)
                                    .map_err(|e| format!("Bad wallet address: {}", e))?;
                                GiftClient::new(rpc.as_deref())
                                    .cancel_gift(&code, &creator)
                                    .await
                                    .map_err(|e| e.to_string())
                            }
                            .await;

                            match result {
                                Ok(_) => {
                                    on_toast.call(Toast {
                                        kind: ToastKind::Success,
                                        title: "Gift Cancelled".to_string(),
                                        message: "Funds returned to your wallet".to_string(),
                                    });
                                    on_done.call(());
                                }
                                Err(e) => {
                                    on_toast.call(Toast {
                                        kind: ToastKind::Failure,
                                        title: "Cancel Failed".to_string(),
                                        message: e,
                                    });
                                }
                            }
                            cancelling.set(false);
                        });
                    },
                    if cancelling() { "Cancelling..." } else { "Cancel gift" }
                }
                button {
                    class: "modal-button primary",
                    onclick: move |_| on_done.call(()),
                    "Back"
                }
            }
        }
    }
}
