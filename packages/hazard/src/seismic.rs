//! Seismic site-amplification lookup (J-SHIS mesh API).
//!
//! The earthquake category is not raster-derived: the score is the
//! site-amplification scalar for the resolved coordinate, fetched from
//! the J-SHIS subsurface-structure mesh service as a GeoJSON feature
//! collection whose first feature carries an `ARV` property.
//!
//! Unlike tile fetches, a failure here propagates: an HTTP error or a
//! malformed response aborts the whole query at the outer boundary
//! instead of degrading to a zero-risk placeholder.
//!
//! See <https://www.j-shis.bosai.go.jp/map/api/sstrct/V4/meshinfo.geojson>

use hazard_map_geo::GeoPoint;

use crate::HazardError;

/// Default J-SHIS mesh-info endpoint.
pub const DEFAULT_SEISMIC_BASE_URL: &str =
    "https://www.j-shis.bosai.go.jp/map/api/sstrct/V4/meshinfo.geojson";

/// Fetches the site-amplification factor at `point`.
///
/// # Errors
///
/// Returns [`HazardError::Http`] if the request fails or the service
/// answers with an error status, and [`HazardError::SeismicParse`] if
/// the response has no feature or no readable `ARV` value.
pub async fn site_amplification(
    client: &reqwest::Client,
    base_url: &str,
    point: GeoPoint,
) -> Result<f64, HazardError> {
    let position = format!("{},{}", point.longitude, point.latitude);
    let response = client
        .get(base_url)
        .query(&[("position", position.as_str()), ("epsg", "4612")])
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = response.json().await?;
    parse_amplification(&body)
}

/// Pulls `features[0].properties.ARV` out of the mesh-info response.
///
/// The service serializes the scalar as a string (e.g. `"1.45"`); a
/// plain JSON number is accepted as well.
fn parse_amplification(body: &serde_json::Value) -> Result<f64, HazardError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| HazardError::SeismicParse {
            message: "response has no features array".to_string(),
        })?;

    let first = features.first().ok_or_else(|| HazardError::SeismicParse {
        message: "features array is empty".to_string(),
    })?;

    let arv = &first["properties"]["ARV"];
    let value = match arv {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.parse::<f64>().ok(),
        _ => None,
    };

    value.ok_or_else(|| HazardError::SeismicParse {
        message: format!("missing or unreadable ARV value: {arv}"),
    })
}
