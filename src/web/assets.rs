// SPDX-License-Identifier: MPL-2.0
//! Upload page assets compiled into the binary.

use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "assets/web/"]
struct WebAsset;

pub const INDEX: &str = "index.html";
pub const SCRIPT: &str = "script.js";

/// Raw bytes of an embedded asset.
pub fn get(name: &str) -> Option<Cow<'static, [u8]>> {
    WebAsset::get(name).map(|file| file.data)
}

/// Content type for a file name, by extension.
pub fn content_type(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
