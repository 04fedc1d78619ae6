//! Best-effort geographic session binding
//!
//! The origin scopes catalog availability and pricing to a delivery address
//! held in the server-side session. Before any catalog traversal the pipeline
//! binds a location once: a raw "lat,lon" pair is used directly, a free-text
//! address goes through the configured geocoder, and when both fail the
//! central-city default coordinate is used. Every failure here is logged and
//! swallowed; the run proceeds with whatever session state resulted.

use crate::config::LocationConfig;
use crate::crawler::FetchClient;
use url::Url;

/// Binds a delivery location to the current session
///
/// Never fails: errors degrade to the default coordinate or, at worst, to an
/// unscoped session.
pub async fn bind_location(
    client: &FetchClient,
    base: &Url,
    config: &LocationConfig,
    input: &str,
) {
    let (lat, lon) = match parse_coordinates(input) {
        Some(pair) => pair,
        None => match geocode(client, config, input).await {
            Some(pair) => pair,
            None => {
                tracing::info!(
                    "geocoding '{}' failed, using default coordinate {},{}",
                    input,
                    config.default_latitude,
                    config.default_longitude
                );
                (config.default_latitude, config.default_longitude)
            }
        },
    };

    let bind_url = match base.join(&config.bind_path) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("lat", &lat.to_string())
                .append_pair("lon", &lon.to_string())
                .append_pair("address", input);
            url
        }
        Err(e) => {
            tracing::warn!("invalid location bind path '{}': {}", config.bind_path, e);
            return;
        }
    };

    match client.get(&bind_url).await {
        Ok(response) if response.is_success() => {
            tracing::info!("location bound to {},{} for '{}'", lat, lon, input);
        }
        Ok(response) => {
            tracing::warn!(
                "location binding returned HTTP {}, continuing unscoped",
                response.status
            );
        }
        Err(e) => {
            tracing::warn!("location binding failed, continuing unscoped: {}", e);
        }
    }
}

/// Parses a raw "lat,lon" pair
///
/// Both components must be finite and inside the valid geographic ranges.
pub fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let (lat, lon) = input.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }

    Some((lat, lon))
}

/// Looks up an address against the configured geocoding endpoint
///
/// Expects a Nominatim-style JSON array response; any unexpected shape is
/// treated as a miss.
async fn geocode(client: &FetchClient, config: &LocationConfig, address: &str) -> Option<(f64, f64)> {
    let mut url = Url::parse(&config.geocode_url).ok()?;
    url.query_pairs_mut()
        .append_pair("q", address)
        .append_pair("format", "json")
        .append_pair("limit", "1");

    let response = match client.get(&url).await {
        Ok(r) if r.is_success() => r,
        Ok(r) => {
            tracing::debug!("geocoder returned HTTP {}", r.status);
            return None;
        }
        Err(e) => {
            tracing::debug!("geocoder request failed: {}", e);
            return None;
        }
    };

    let parsed: serde_json::Value = serde_json::from_str(&response.body).ok()?;
    let first = parsed.as_array()?.first()?;

    let lat = coordinate_field(first, "lat")?;
    let lon = coordinate_field(first, "lon")?;
    Some((lat, lon))
}

/// Geocoders serve coordinates either as JSON numbers or as quoted strings
fn coordinate_field(value: &serde_json::Value, key: &str) -> Option<f64> {
    let field = value.get(key)?;
    field
        .as_f64()
        .or_else(|| field.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_coordinates() {
        assert_eq!(parse_coordinates("55.7558,37.6173"), Some((55.7558, 37.6173)));
    }

    #[test]
    fn test_parse_coordinates_with_spaces() {
        assert_eq!(parse_coordinates("55.7558, 37.6173"), Some((55.7558, 37.6173)));
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert_eq!(parse_coordinates("Москва, Тверская 1"), None);
        assert_eq!(parse_coordinates("Санкт-Петербург"), None);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(parse_coordinates("95.0,37.6"), None);
        assert_eq!(parse_coordinates("55.7,181.0"), None);
    }

    #[test]
    fn test_coordinate_field_accepts_both_shapes() {
        let as_string: serde_json::Value =
            serde_json::from_str(r#"{"lat": "55.75", "lon": "37.61"}"#).unwrap();
        let as_number: serde_json::Value =
            serde_json::from_str(r#"{"lat": 55.75, "lon": 37.61}"#).unwrap();

        assert_eq!(coordinate_field(&as_string, "lat"), Some(55.75));
        assert_eq!(coordinate_field(&as_number, "lon"), Some(37.61));
        assert_eq!(coordinate_field(&as_number, "missing"), None);
    }
}
