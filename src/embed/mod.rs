//! Resources compiled into the binary.

pub mod serve {
    /// URL the preview server answers with the live reload client.
    pub const HOTRELOAD_URL: &str = "/__frontkit/hotreload.js";

    const WS_PORT_PLACEHOLDER: &str = "__FRONTKIT_WS_PORT__";

    /// Minified at build time with the overlay CSS inlined.
    const HOTRELOAD_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js"));

    /// The live reload client, pointed at `ws_port`.
    pub fn hotreload_js(ws_port: u16) -> String {
        HOTRELOAD_JS.replace(WS_PORT_PLACEHOLDER, &ws_port.to_string())
    }

    /// Script tag injected into served HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_URL}" defer></script>"#)
    }

}
