// src/components/modals/wallet_modal.rs
//
// The multi-view wallet panel. One ViewStateController drives which body
// renders; the comparison gates mirror the controller's documented
// variant order (see view_state.rs).

use crate::amount::format_usd;
use crate::components::common::{Asset, Toast};
use crate::components::modals::gift_views::{ClaimGiftConfirmView, ClaimGiftView, GiftInfoDetailView};
use crate::components::modals::send_modal::SendAssetForm;
use crate::gift::GiftInfo;
use crate::view_state::{ViewState, ViewStateController};
use crate::wallet::WalletInfo;
use dioxus::prelude::*;

#[component]
pub fn WalletPanel(
    wallet: WalletInfo,
    assets: Vec<Asset>,
    loading: bool,
    custom_rpc: Option<String>,
    ondismiss: EventHandler<()>,
    ondisconnect: EventHandler<()>,
    onreceive: EventHandler<()>,
    on_toast: EventHandler<Toast>,
) -> Element {
    let mut controller = use_signal(ViewStateController::new);
    let mut selected_asset = use_signal(|| None as Option<Asset>);
    let mut claim_preview = use_signal(|| None as Option<(String, GiftInfo)>);
    let mut created_gifts = use_signal(Vec::<String>::new);
    let mut selected_gift = use_signal(|| None as Option<String>);

    let view = controller.read().current();
    let can_go_back = controller.read().can_go_back();
    let total_usd: f64 = assets.iter().filter_map(|a| a.value_usd()).sum();
    let total_display = format_usd(total_usd);
    let no_assets = assets.is_empty() && !loading;

    let wallet_for_claim = wallet.clone();
    let wallet_for_gift = wallet.clone();

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: move |_| {
                controller.write().reset();
                ondismiss.call(());
            },

            div {
                class: "modal-content wallet-panel",
                onclick: move |e| e.stop_propagation(),

                // Header: back-navigation appears past the send entry view,
                // disconnect only at or before it.
                div { class: "panel-header",
                    if view > ViewState::SendAssets && can_go_back {
                        button {
                            class: "back-button",
                            onclick: move |_| controller.write().go_back(),
                            "←"
                        }
                    }

                    CopyAddress { address: wallet.address.clone() }

                    if view <= ViewState::SendAssets {
                        button {
                            class: "disconnect-button",
                            onclick: move |_| ondisconnect.call(()),
                            "Disconnect"
                        }
                    }
                }

                if view >= ViewState::SendAssets {
                    // Action views
                    if view == ViewState::GiftInfoDetail {
                        GiftInfoDetailView {
                            code: selected_gift().unwrap_or_default(),
                            creator_address: wallet_for_gift.address.clone(),
                            custom_rpc: custom_rpc.clone(),
                            on_toast,
                            on_done: move |_| {
                                selected_gift.set(None);
                                controller.write().go_to(ViewState::WalletInfo);
                            },
                        }
                    } else if view == ViewState::ClaimGift {
                        ClaimGiftView {
                            custom_rpc: custom_rpc.clone(),
                            on_preview: move |preview: (String, GiftInfo)| {
                                claim_preview.set(Some(preview));
                            },
                            on_view_change: move |next| controller.write().go_to(next),
                        }
                    } else if view == ViewState::ClaimGiftConfirm {
                        if let Some((code, info)) = claim_preview() {
                            ClaimGiftConfirmView {
                                code,
                                info,
                                claimer_address: wallet_for_claim.address.clone(),
                                custom_rpc: custom_rpc.clone(),
                                on_toast,
                                on_done: move |_| {
                                    claim_preview.set(None);
                                    controller.write().go_to(ViewState::WalletInfo);
                                },
                            }
                        }
                    } else if let Some(asset) = selected_asset() {
                        SendAssetForm {
                            key: "{asset.symbol}",
                            asset: asset.clone(),
                            wallet: wallet.clone(),
                            custom_rpc: custom_rpc.clone(),
                            view,
                            on_view_change: move |next: ViewState| controller.write().go_to(next),
                            on_toast,
                            on_gift_created: move |code: String| {
                                created_gifts.write().push(code);
                            },
                        }
                    } else {
                        // No asset picked yet: choose what to send
                        div { class: "send-picker",
                            div { class: "section-label", "Choose an asset to send" }
                            AssetsList {
                                assets: assets.clone(),
                                loading,
                                onselect: move |asset: Asset| selected_asset.set(Some(asset)),
                            }
                        }
                    }
                } else {
                    // Landing: balance summary, assets, gifts, actions
                    div { class: "panel-landing",
                        div { class: "total-balance", "{total_display}" }
                        div { class: "panel-title", "My Wallet" }

                        if no_assets {
                            div { class: "info-message",
                                "This wallet looks new. Receive some SOL to get started."
                            }
                        } else {
                            div { class: "section-label", "Assets" }
                            AssetsList {
                                assets: if view == ViewState::AssetList {
                                    assets.clone()
                                } else {
                                    assets.iter().take(4).cloned().collect::<Vec<_>>()
                                },
                                loading,
                                onselect: move |asset: Asset| {
                                    selected_asset.set(Some(asset));
                                    controller.write().go_to(ViewState::SendAssets);
                                },
                            }
                            if view == ViewState::WalletInfo && assets.len() > 4 {
                                button {
                                    class: "link-button",
                                    onclick: move |_| controller.write().go_to(ViewState::AssetList),
                                    "View all assets"
                                }
                            } else if view == ViewState::AssetList {
                                button {
                                    class: "link-button",
                                    onclick: move |_| controller.write().go_back(),
                                    "Show less"
                                }
                            }
                        }

                        if !created_gifts().is_empty() {
                            div { class: "section-label", "Gifts you created" }
                            for code in created_gifts() {
                                {
                                    let key = code.clone();
                                    let short = if code.len() > 12 { format!("{}...", &code[..12]) } else { code.clone() };
                                    rsx! {
                                        div {
                                            key: "{key}",
                                            class: "gift-list-item",
                                            onclick: move |_| {
                                                selected_gift.set(Some(code.clone()));
                                                controller.write().go_to(ViewState::GiftInfoDetail);
                                            },
                                            "{short}"
                                        }
                                    }
                                }
                            }
                        }

                        div { class: "panel-actions",
                            button {
                                class: "action-button",
                                onclick: move |_| {
                                    selected_asset.set(None);
                                    controller.write().go_to(ViewState::SendAssets);
                                },
                                "Send"
                            }
                            button {
                                class: "action-button",
                                onclick: move |_| onreceive.call(()),
                                "Receive"
                            }
                            button {
                                class: "action-button",
                                onclick: move |_| controller.write().go_to(ViewState::ClaimGift),
                                "Claim gift"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct AssetsListProps {
    assets: Vec<Asset>,
    loading: bool,
    onselect: EventHandler<Asset>,
}

#[component]
fn AssetsList(props: AssetsListProps) -> Element {
    if props.loading {
        return rsx! {
            div { class: "assets-loading", "Loading balances..." }
        };
    }

    let onselect = props.onselect;
    let rows = props.assets.clone();

    rsx! {
        div { class: "assets-list",
            for asset in rows.into_iter() {
                {
                    let quantity = asset.quantity_display();
                    let value = asset.value_usd().map(format_usd);
                    let symbol = asset.symbol.clone();
                    let name = asset.name.clone();
                    let key = asset.mint.map(|m| m.to_string()).unwrap_or_else(|| "native".to_string());
                    rsx! {
                        div {
                            key: "{key}",
                            class: "asset-row",
                            onclick: move |_| onselect.call(asset.clone()),
                            div { class: "asset-identity",
                                div { class: "asset-symbol", "{symbol}" }
                                div { class: "asset-name", "{name}" }
                            }
                            div { class: "asset-amounts",
                                div { class: "asset-quantity", "{quantity}" }
                                if let Some(value) = value {
                                    div { class: "asset-value", "{value}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Truncated address chip; clicking copies (or at least logs the copy on
/// platforms without a clipboard handle).
#[component]
fn CopyAddress(address: String) -> Element {
    let mut copied = use_signal(|| false);

    let short = if address.len() > 12 {
        format!("{}...{}", &address[..6], &address[address.len() - 6..])
    } else {
        address.clone()
    };

    rsx! {
        button {
            class: "copy-address-chip",
            onclick: move |_| {
                log::info!("Copy to clipboard: {}", address);
                copied.set(true);
                spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                    copied.set(false);
                });
            },
            if copied() { "Copied!" } else { "{short}" }
        }
    }
}
