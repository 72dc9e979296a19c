//! Presentation data
//!
//! Plain objects handed to clients: ids, labels, human-readable timestamps,
//! coordinate pairs, derived map links and static URLs. Nothing here knows
//! about storage.

use chrono::NaiveDateTime;
use findq_core::db::{QrCode, QrCodePing, User};
use serde::Serialize;

/// Zoom level used for embedded maps
pub const MAP_ZOOM: u8 = 15;

/// Mount point of the static directory
pub const STATIC_PREFIX: &str = "/static";

/// "8:32 PM, August 1, 2021"
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%-I:%M %p, %B %-d, %Y").to_string()
}

// Coordinates use `{:?}` so whole numbers keep their decimal point (`40.0`).

pub fn gmaps_embed_link(lat: f64, lon: f64, zoom: u8) -> String {
    format!("//maps.google.com/maps?q={:?},{:?}&z={}&output=embed", lat, lon, zoom)
}

pub fn gmaps_link(lat: f64, lon: f64) -> String {
    format!("https://www.google.com/maps?q={:?},{:?}", lat, lon)
}

pub fn static_url(subdir: &str, file_name: &str) -> String {
    format!("{}/{}/{}", STATIC_PREFIX, subdir, file_name)
}

/// Title on a single ping page
pub fn ping_title(ping: &QrCodePing) -> String {
    format!("Ping made on {}.", format_timestamp(&ping.created_at))
}

/// Title in the owner's ping list, naming the code that was scanned
pub fn listing_title(code_description: &str, ping: &QrCodePing) -> String {
    format!(
        "'{}' pinged on {}",
        code_description,
        format_timestamp(&ping.created_at)
    )
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            created_at: format_timestamp(&u.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QrCodeView {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub created_at: String,
    /// Static URL of the rendered artifact
    pub image_url: String,
    /// What the code encodes
    pub ping_url: String,
}

impl QrCodeView {
    pub fn new(code: QrCode, image_url: String, ping_url: String) -> Self {
        Self {
            id: code.id,
            user_id: code.user_id,
            description: code.description,
            created_at: format_timestamp(&code.created_at),
            image_url,
            ping_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PingView {
    pub id: i64,
    pub qr_code_id: i64,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lon: f64,
    pub created_at: String,
    pub gmaps_embed_link: String,
    pub gmaps_link: String,
    pub image_urls: Vec<String>,
}

impl PingView {
    pub fn new(ping: QrCodePing, title: String, image_urls: Vec<String>) -> Self {
        Self {
            id: ping.id,
            qr_code_id: ping.qr_code_id,
            title,
            gmaps_embed_link: gmaps_embed_link(ping.lat, ping.lon, MAP_ZOOM),
            gmaps_link: gmaps_link(ping.lat, ping.lon),
            created_at: format_timestamp(&ping.created_at),
            description: ping.description,
            lat: ping.lat,
            lon: ping.lon,
            image_urls,
        }
    }
}

/// Body returned by create endpoints
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ping() -> QrCodePing {
        QrCodePing {
            id: 3,
            qr_code_id: 7,
            lat: 40.5,
            lon: -73.25,
            description: "left package".into(),
            created_at: at(20, 32),
        }
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(&at(20, 32)), "8:32 PM, August 1, 2021");
        assert_eq!(format_timestamp(&at(9, 5)), "9:05 AM, August 1, 2021");
    }

    #[test]
    fn map_links() {
        assert_eq!(
            gmaps_embed_link(40.5, -73.25, 15),
            "//maps.google.com/maps?q=40.5,-73.25&z=15&output=embed"
        );
        assert_eq!(
            gmaps_link(40.5, -73.25),
            "https://www.google.com/maps?q=40.5,-73.25"
        );
    }

    #[test]
    fn map_links_keep_whole_degrees() {
        assert_eq!(gmaps_link(40.0, -73.0), "https://www.google.com/maps?q=40.0,-73.0");
        assert_eq!(
            gmaps_embed_link(0.0, 12.0, 15),
            "//maps.google.com/maps?q=0.0,12.0&z=15&output=embed"
        );
    }

    #[test]
    fn titles() {
        assert_eq!(ping_title(&ping()), "Ping made on 8:32 PM, August 1, 2021.");
        assert_eq!(
            listing_title("Front Door", &ping()),
            "'Front Door' pinged on 8:32 PM, August 1, 2021"
        );
    }

    #[test]
    fn ping_view_derives_links() {
        let view = PingView::new(ping(), "t".into(), vec!["/static/qr_ping_images/1.jpg".into()]);
        assert_eq!(view.gmaps_link, "https://www.google.com/maps?q=40.5,-73.25");
        assert_eq!(view.created_at, "8:32 PM, August 1, 2021");
        assert_eq!(view.image_urls.len(), 1);
    }
}
