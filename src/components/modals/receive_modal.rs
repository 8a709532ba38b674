// src/components/modals/receive_modal.rs
use crate::wallet::WalletInfo;
use dioxus::prelude::*;
use qrcode::{render::svg, QrCode};

const QR_SIZE: u32 = 200;

/// One address receives SOL and every SPL token, so the receive view is
/// just the address, big, with a QR for phone wallets.
#[component]
pub fn ReceiveModal(wallet: WalletInfo, onclose: EventHandler<()>) -> Element {
    let mut copied = use_signal(|| false);

    let address = wallet.address.clone();
    let qr_markup = address_qr_svg(&address);
    let address_for_copy = address.clone();

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: move |_| onclose.call(()),

            div {
                class: "modal-content receive-modal",
                onclick: move |e| e.stop_propagation(),

                h2 { class: "modal-title", "Receive" }

                div { class: "qr-code-container",
                    div { class: "qr-code", dangerous_inner_html: "{qr_markup}" }
                }

                div { class: "wallet-label", "{wallet.name}" }

                div { class: "address-container",
                    div { class: "address-display-full",
                        div { class: "address-text", "{address}" }
                        button {
                            class: "copy-button",
                            onclick: move |_| {
                                // No cross-platform clipboard handle; at
                                // least surface the address in the log.
                                log::info!("Copy to clipboard: {}", address_for_copy);
                                copied.set(true);
                                spawn(async move {
                                    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                                    copied.set(false);
                                });
                            },
                            if copied() { "Copied!" } else { "Copy" }
                        }
                    }
                }

                div { class: "info-message",
                    "Send SOL or any SPL token to this address; every token shares it."
                }

                div { class: "modal-buttons",
                    button {
                        class: "modal-button primary",
                        onclick: move |_| onclose.call(()),
                        "Done"
                    }
                }
            }
        }
    }
}

fn address_qr_svg(address: &str) -> String {
    let code = match QrCode::new(address) {
        Ok(code) => code,
        Err(e) => {
            log::warn!("Failed to generate QR code: {}", e);
            return format!(
                "<svg viewBox=\"0 0 {size} {size}\" xmlns=\"http://www.w3.org/2000/svg\">\
                 <rect width=\"{size}\" height=\"{size}\" fill=\"white\"/></svg>",
                size = QR_SIZE
            );
        }
    };

    code.render()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .quiet_zone(false)
        .dark_color(svg::Color("#0f172a"))
        .light_color(svg::Color("#ffffff"))
        .build()
}
