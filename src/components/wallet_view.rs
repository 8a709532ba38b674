// src/components/wallet_view.rs
use crate::components::common::{Asset, Toast, ToastKind};
use crate::components::modals::{ReceiveModal, WalletPanel};
use crate::prices;
use crate::rpc;
use crate::storage;
use crate::wallet::Wallet;
use dioxus::prelude::*;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;

/// Assemble the panel's balance entries: native SOL first, then SPL
/// holdings sorted by USD value.
async fn load_assets(address: &str, rpc_url: Option<&str>) -> Result<Vec<Asset>, String> {
    let lamports = rpc::get_balance(address, rpc_url).await?;
    let token_accounts = rpc::get_token_accounts_by_owner(address, rpc_url).await?;

    let mut mints: Vec<String> = vec![prices::SOL_MINT.to_string()];
    mints.extend(token_accounts.iter().map(|a| a.mint.clone()));

    let price_map = match prices::get_prices_for_mints(&mints).await {
        Ok(map) => map,
        Err(e) => {
            log::warn!("Price fetch failed, showing balances without values: {}", e);
            HashMap::new()
        }
    };

    let mut assets = vec![Asset::native_sol(
        lamports,
        price_map.get(prices::SOL_MINT).copied(),
    )];

    for account in token_accounts.into_iter().filter(|a| a.amount > 0) {
        let mint = match Pubkey::from_str(&account.mint) {
            Ok(pk) => pk,
            Err(_) => continue,
        };
        let symbol = prices::symbol_for_mint(&account.mint)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{}...", &account.mint[..6.min(account.mint.len())]));
        assets.push(Asset {
            name: symbol.clone(),
            symbol,
            mint: Some(mint),
            decimals: account.decimals,
            quantity: account.amount,
            price_usd: price_map.get(&account.mint).copied(),
        });
    }

    // keep SOL pinned, order the rest by value
    assets[1..].sort_by(|a, b| {
        b.value_usd()
            .unwrap_or(0.0)
            .partial_cmp(&a.value_usd().unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(assets)
}

#[component]
pub fn WalletView() -> Element {
    let wallet = use_hook(|| {
        let mut wallets = storage::load_wallets_from_storage();
        match wallets.pop() {
            Some(info) => info,
            None => {
                let info = Wallet::new("Main Wallet".to_string()).to_wallet_info();
                storage::save_wallet_to_storage(&info);
                info
            }
        }
    });
    let custom_rpc = use_hook(storage::load_rpc_from_storage);

    let mut panel_open = use_signal(|| false);
    let mut receive_open = use_signal(|| false);
    let mut assets = use_signal(Vec::<Asset>::new);
    let mut loading = use_signal(|| true);
    let mut toasts = use_signal(Vec::<Toast>::new);

    let refresh = {
        let address = wallet.address.clone();
        let rpc_url = custom_rpc.clone();
        move || {
            let address = address.clone();
            let rpc_url = rpc_url.clone();
            loading.set(true);
            spawn(async move {
                match load_assets(&address, rpc_url.as_deref()).await {
                    Ok(loaded) => assets.set(loaded),
                    Err(e) => log::error!("Balance load failed: {}", e),
                }
                loading.set(false);
            });
        }
    };

    {
        let mut refresh = refresh.clone();
        use_effect(move || refresh());
    }

    let push_toast = move |toast: Toast| {
        toasts.write().push(toast);
        spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            let mut list = toasts.write();
            if !list.is_empty() {
                list.remove(0);
            }
        });
    };

    let wallet_for_panel = wallet.clone();
    let wallet_for_receive = wallet.clone();
    let rpc_for_panel = custom_rpc.clone();
    let mut refresh_for_button = refresh.clone();

    rsx! {
        div { class: "wallet-page",
            div { class: "wallet-page-header",
                h1 { "satchel" }
                div { class: "wallet-page-actions",
                    button {
                        class: "action-button",
                        onclick: move |_| refresh_for_button(),
                        "Refresh"
                    }
                    button {
                        class: "action-button primary",
                        onclick: move |_| panel_open.set(true),
                        "Open Wallet"
                    }
                }
            }

            if panel_open() {
                WalletPanel {
                    wallet: wallet_for_panel.clone(),
                    assets: assets(),
                    loading: loading(),
                    custom_rpc: rpc_for_panel.clone(),
                    ondismiss: move |_| panel_open.set(false),
                    ondisconnect: move |_| panel_open.set(false),
                    onreceive: move |_| receive_open.set(true),
                    on_toast: push_toast,
                }
            }

            if receive_open() {
                ReceiveModal {
                    wallet: wallet_for_receive.clone(),
                    onclose: move |_| receive_open.set(false),
                }
            }

            div { class: "toast-stack",
                for (index, toast) in toasts().iter().enumerate() {
                    {
                        let class = match toast.kind {
                            ToastKind::Success => "toast toast--success",
                            ToastKind::Failure => "toast toast--failure",
                        };
                        let title = toast.title.clone();
                        let message = toast.message.clone();
                        rsx! {
                            div { key: "{index}", class: "{class}",
                                div { class: "toast-title", "{title}" }
                                div { class: "toast-message", "{message}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
