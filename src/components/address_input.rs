// src/components/address_input.rs
use crate::send_flow::{Recipient, SendSnapshot};
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct AddressInputProps {
    pub value: String,
    pub on_change: EventHandler<String>,
    pub snapshot: SendSnapshot,
    pub placeholder: Option<String>,
    pub label: Option<String>,
}

/// Recipient entry with live resolution feedback. The debounce and the
/// actual lookup live in the send-flow coordinator; this component only
/// renders the current snapshot.
#[component]
pub fn AddressInput(props: AddressInputProps) -> Element {
    let resolving = props.snapshot.resolving;
    let error = props.snapshot.address_error.clone();
    let resolved = match &props.snapshot.recipient {
        Recipient::Resolved { name, address } => Some((name.clone(), address.to_string())),
        _ => None,
    };

    let input_class = if resolving {
        "address-input address-input--resolving"
    } else if error.is_some() {
        "address-input address-input--error"
    } else if props.snapshot.recipient.address().is_some() {
        "address-input address-input--success"
    } else {
        "address-input"
    };

    rsx! {
        div { class: "address-input-container",
            if let Some(label) = &props.label {
                label { class: "address-input-label", "{label}" }
            }

            input {
                class: input_class,
                value: "{props.value}",
                placeholder: props.placeholder.clone().unwrap_or("Enter address or .sol domain".to_string()),
                oninput: move |e: FormEvent| props.on_change.call(e.value()),
            }

            div { class: "address-input-feedback",
                if resolving {
                    div { class: "feedback-resolving", "Resolving domain..." }
                } else if let Some((name, address)) = resolved {
                    div { class: "feedback-success",
                        div { class: "feedback-description", "{name}" }
                        div { class: "feedback-address", "{address}" }
                    }
                } else if let Some(error) = error {
                    div { class: "feedback-error", "{error}" }
                }
            }
        }
    }
}
