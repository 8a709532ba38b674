use dioxus::prelude::*;

mod amount;
mod components;
mod domain_resolver;
mod gift;
mod prices;
mod rpc;
mod send_flow;
mod signing;
mod storage;
mod transaction;
mod view_state;
mod wallet;

use components::WalletView;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    WalletView {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        Router::<Route> {}
    }
}
