//! Session flows against mocked weather, geocoding and geolocation services.

use serde_json::json;
use tempfile::TempDir;
use wearcast::{Lookup, WeatherSession};
use wearcast_core::{App, AppError, Config, PreferenceStore, Preferences};
use wearcast_weather::WeatherError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.weather.forecast_url = server.uri();
    config.weather.geocoding_url = server.uri();
    config.weather.reverse_geocoding_url = format!("{}/reverse", server.uri());
    config.weather.geolocation_url = format!("{}/geo", server.uri());
    config.weather.request_timeout_secs = 5;
    config.weather.geolocation_timeout_secs = 2;
    config
}

fn session_in(dir: &TempDir, config: Config) -> WeatherSession {
    WeatherSession::new(App::with_parts(config, dir.path())).unwrap()
}

fn save_last_location(dir: &TempDir, city: &str) {
    let mut prefs = Preferences {
        last_location: city.to_string(),
        ..Default::default()
    };
    PreferenceStore::in_dir(dir.path()).save(&mut prefs).unwrap();
}

async fn mount_city(server: &MockServer, name: &str, latitude: f64, longitude: f64) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": name, "latitude": latitude, "longitude": longitude, "country_code": "XX" }]
        })))
        .mount(server)
        .await;
}

async fn mount_unknown_city(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {
                "temperature_2m": 12.0,
                "relative_humidity_2m": 70,
                "wind_speed_10m": 4.0,
                "weather_code": 3,
                "surface_pressure": 1011.0
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_city_remembers_location() {
    let server = MockServer::start().await;
    mount_city(&server, "Lima", -12.04, -77.03).await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();

    let session = session_in(&dir, config_for(&server));
    let snapshot = session.search_city("Lima").await.unwrap();

    assert!(snapshot.searched);
    assert!(!snapshot.degraded);
    assert_eq!(snapshot.report.description, "overcast");
    assert_eq!(session.last_lookup(), Some(Lookup::City("Lima".into())));
    assert!(!session.is_busy());

    let prefs = PreferenceStore::in_dir(dir.path()).load();
    assert_eq!(prefs.last_location, "Lima");
}

#[tokio::test]
async fn test_invalid_city_is_rejected_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let session = session_in(&dir, config_for(&server));
    let err = session.search_city("R2D2").await.unwrap_err();

    assert!(matches!(err, AppError::Weather(WeatherError::InvalidCityName(_))));
    assert!(session.last_lookup().is_none());
}

#[tokio::test]
async fn test_denied_geolocation_falls_back_to_saved_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_city(&server, "Cairo", 30.04, 31.24).await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();
    save_last_location(&dir, "Cairo");

    let session = session_in(&dir, config_for(&server));
    let snapshot = session.use_current_location().await.unwrap();

    assert_eq!(snapshot.report.location.city_name.as_deref(), Some("Cairo"));
    assert!(!snapshot.searched);
    assert_eq!(session.last_lookup(), Some(Lookup::CurrentLocation));
}

#[tokio::test]
async fn test_unknown_saved_location_falls_back_to_default_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_unknown_city(&server, "Atlantis").await;
    mount_city(&server, "London", 51.51, -0.13).await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();
    save_last_location(&dir, "Atlantis");

    let session = session_in(&dir, config_for(&server));
    let snapshot = session.start().await.unwrap();

    assert_eq!(snapshot.report.location.city_name.as_deref(), Some("London"));
}

#[tokio::test]
async fn test_geolocated_position_is_named_by_reverse_geocoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 45.46,
            "longitude": 9.19
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "city": "Milan", "state": "Lombardy", "country": "Italy" }
        })))
        .mount(&server)
        .await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();

    let session = session_in(&dir, config_for(&server));
    let snapshot = session.start().await.unwrap();

    assert_eq!(
        snapshot.report.location.city_name.as_deref(),
        Some("Milan, Lombardy")
    );
    assert_eq!(snapshot.report.location.latitude, 45.46);
}

#[tokio::test]
async fn test_start_without_auto_location_uses_saved_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_city(&server, "Hanoi", 21.03, 105.85).await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();
    save_last_location(&dir, "Hanoi");

    let mut config = config_for(&server);
    config.location.auto_locate = false;
    let session = session_in(&dir, config);
    let snapshot = session.start().await.unwrap();

    assert_eq!(snapshot.report.location.city_name.as_deref(), Some("Hanoi"));
}

#[tokio::test]
async fn test_refresh_without_auto_location_keeps_saved_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_city(&server, "Cairo", 30.04, 31.24).await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();
    save_last_location(&dir, "Cairo");

    let mut config = config_for(&server);
    config.location.auto_locate = false;
    let session = session_in(&dir, config);
    session.start().await.unwrap();
    let refreshed = session.refresh().await.unwrap();

    assert_eq!(refreshed.report.location.city_name.as_deref(), Some("Cairo"));
    assert_eq!(session.last_lookup(), Some(Lookup::SavedLocation));
}

#[tokio::test]
async fn test_canonical_city_name_survives_restart() {
    let server = MockServer::start().await;
    for typed in ["Zurich", "Zürich"] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("name", typed))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "name": "Zürich", "latitude": 47.37, "longitude": 8.54, "country_code": "CH" }]
            })))
            .mount(&server)
            .await;
    }
    mount_city(&server, "London", 51.51, -0.13).await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();

    let session = session_in(&dir, config_for(&server));
    session.search_city("Zurich").await.unwrap();
    session.shutdown();
    assert_eq!(PreferenceStore::in_dir(dir.path()).load().last_location, "Zürich");

    let mut config = config_for(&server);
    config.location.auto_locate = false;
    let restarted = session_in(&dir, config);
    let snapshot = restarted.start().await.unwrap();

    assert_eq!(snapshot.report.location.city_name.as_deref(), Some("Zürich"));
    assert_eq!(snapshot.report.location.country_code.as_deref(), Some("CH"));
}

#[tokio::test]
async fn test_overlapping_lookups_are_refused() {
    let server = MockServer::start().await;
    mount_city(&server, "Quito", -0.18, -78.47).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "current": {
                        "temperature_2m": 15.0,
                        "relative_humidity_2m": 60,
                        "weather_code": 0
                    }
                }))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir, config_for(&server));

    let (first, second) = tokio::join!(session.search_city("Quito"), session.search_city("Quito"));

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Busy)));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_refresh_repeats_city_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Perth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "Perth", "latitude": -31.95, "longitude": 115.86, "country_code": "AU" }]
        })))
        .expect(2)
        .mount(&server)
        .await;
    mount_forecast(&server).await;
    let dir = TempDir::new().unwrap();

    let session = session_in(&dir, config_for(&server));
    session.search_city("Perth").await.unwrap();
    let refreshed = session.refresh().await.unwrap();

    assert_eq!(refreshed.report.location.country_code.as_deref(), Some("AU"));
    assert!(refreshed.searched);
}

#[tokio::test]
async fn test_shutdown_persists_preferences() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let session = session_in(&dir, config_for(&server));
    session.shutdown();

    let store = PreferenceStore::in_dir(dir.path());
    assert!(store.path().exists());
    assert!(store.load().last_updated.is_some());
}
