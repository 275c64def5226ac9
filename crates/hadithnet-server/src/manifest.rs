//! Web app manifest served at `/manifest.json`.

use serde_json::{json, Value};

const ICON_SIZES: &[u32] = &[72, 96, 128, 144, 152, 192, 384, 512];
const MASKABLE_SIZES: &[u32] = &[192, 512];

fn icon(size: u32, purpose: &str) -> Value {
    json!({
        "src": format!("/icons/icon-{size}x{size}.png"),
        "sizes": format!("{size}x{size}"),
        "type": "image/png",
        "purpose": purpose,
    })
}

pub fn manifest() -> Value {
    let icons: Vec<Value> = ICON_SIZES
        .iter()
        .map(|&size| icon(size, "any"))
        .chain(MASKABLE_SIZES.iter().map(|&size| icon(size, "maskable")))
        .collect();

    json!({
        "name": "Hadith.net - Authentic Islamic Hadith Collections",
        "short_name": "Hadith.net",
        "description": "Read authentic Hadith collections with translations in multiple languages",
        "start_url": "/",
        "display": "standalone",
        "background_color": "#ffffff",
        "theme_color": "#0ea5e9",
        "orientation": "portrait",
        "scope": "/",
        "id": "hadith-net-app",
        "icons": icons,
        "categories": ["education", "books", "lifestyle"],
        "lang": "en",
        "dir": "ltr",
        "prefer_related_applications": false,
    })
}
