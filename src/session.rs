//! Lookup session: resolves a location, fetches current conditions and runs
//! the advisor over them.
//!
//! Only one lookup runs at a time; a second request while one is in flight
//! is refused with [`AppError::Busy`].

use parking_lot::Mutex;
use wearcast_advisor::{Advisor, RecommendationBundle};
use wearcast_core::{App, AppError};
use wearcast_weather::geocode::reverse_geocode_with;
use wearcast_weather::{
    is_valid_city_name, Geolocator, Location, WeatherError, WeatherProvider, WeatherReport,
};

/// What a lookup was asked for, kept so a refresh can repeat it.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
    CurrentLocation,
    /// The saved last location, used when auto-location is off
    SavedLocation,
}

/// Lookup state for serializing fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Busy,
}

impl LookupState {
    /// True if a new lookup can be started.
    pub fn can_start(self) -> bool {
        matches!(self, LookupState::Idle)
    }
}

/// A finished lookup: the report and the advice derived from it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub report: WeatherReport,
    pub bundle: RecommendationBundle,
    /// The advice came from the reduced fallback generator
    pub degraded: bool,
    /// The location was typed by the user rather than detected
    pub searched: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    lookup: LookupState,
    last: Option<Lookup>,
}

pub struct WeatherSession {
    app: Mutex<App>,
    provider: WeatherProvider,
    geolocator: Geolocator,
    reverse_geocoding_url: String,
    advisor: Advisor,
    state: Mutex<SessionState>,
}

/// Returns the session to idle when a lookup finishes, however it finishes.
struct BusyGuard<'a>(&'a Mutex<SessionState>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().lookup = LookupState::Idle;
    }
}

impl WeatherSession {
    pub fn new(app: App) -> Result<Self, AppError> {
        let weather = app.config().weather.clone();
        let provider = WeatherProvider::new(weather.request_timeout())?
            .with_base_urls(&weather.forecast_url, &weather.geocoding_url);
        let geolocator = Geolocator::new(&weather.geolocation_url, weather.geolocation_timeout());

        Ok(Self {
            app: Mutex::new(app),
            provider,
            geolocator,
            reverse_geocoding_url: weather.reverse_geocoding_url,
            advisor: Advisor::new(),
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Initial lookup: the current location when auto-location is on,
    /// otherwise the saved location.
    pub async fn start(&self) -> Result<Snapshot, AppError> {
        let auto_locate = {
            let app = self.app.lock();
            app.config().location.auto_locate && app.preferences().auto_location
        };

        if auto_locate {
            self.use_current_location().await
        } else {
            self.use_saved_location().await
        }
    }

    /// Look up a city typed by the user. Only typed names are validated;
    /// the resolved city is remembered on success.
    pub async fn search_city(&self, city: &str) -> Result<Snapshot, AppError> {
        if !is_valid_city_name(city) {
            return Err(WeatherError::InvalidCityName(city.to_string()).into());
        }

        let _guard = self.begin()?;
        let snapshot = self.fetch_city(city, true).await?;

        self.remember_lookup(Lookup::City(city.trim().to_string()));
        let name = snapshot
            .report
            .location
            .city_name
            .clone()
            .unwrap_or_else(|| city.trim().to_string());
        if let Err(e) = self.app.lock().remember_location(&name) {
            tracing::warn!("Could not save last location: {}", e);
        }

        Ok(snapshot)
    }

    pub async fn lookup_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Snapshot, AppError> {
        let _guard = self.begin()?;
        let snapshot = self
            .fetch_at(Location::from_coordinates(latitude, longitude), false)
            .await?;
        self.remember_lookup(Lookup::Coordinates {
            latitude,
            longitude,
        });
        Ok(snapshot)
    }

    /// Detect the current location. When detection fails, falls back to the
    /// saved last location and then to the configured default city.
    pub async fn use_current_location(&self) -> Result<Snapshot, AppError> {
        let _guard = self.begin()?;
        self.remember_lookup(Lookup::CurrentLocation);

        match self.geolocator.locate().await {
            Ok(location) => match self.fetch_at(location, false).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => tracing::warn!("Weather for current location failed: {}", e),
            },
            Err(e) => tracing::info!("Current location unavailable: {}", e),
        }

        self.saved_or_default().await
    }

    async fn use_saved_location(&self) -> Result<Snapshot, AppError> {
        let _guard = self.begin()?;
        self.remember_lookup(Lookup::SavedLocation);
        self.saved_or_default().await
    }

    /// Repeat the most recent kind of lookup. Before any lookup this behaves
    /// like [`WeatherSession::start`].
    pub async fn refresh(&self) -> Result<Snapshot, AppError> {
        let last = self.state.lock().last.clone();

        match last {
            Some(Lookup::City(city)) => self.search_city(&city).await,
            Some(Lookup::Coordinates {
                latitude,
                longitude,
            }) => self.lookup_coordinates(latitude, longitude).await,
            Some(Lookup::CurrentLocation) => self.use_current_location().await,
            Some(Lookup::SavedLocation) => self.use_saved_location().await,
            None => self.start().await,
        }
    }

    pub fn last_lookup(&self) -> Option<Lookup> {
        self.state.lock().last.clone()
    }

    pub fn is_busy(&self) -> bool {
        !self.state.lock().lookup.can_start()
    }

    /// Persist preferences and consume the session.
    pub fn shutdown(self) {
        self.app.into_inner().shutdown();
    }

    fn begin(&self) -> Result<BusyGuard<'_>, AppError> {
        let mut state = self.state.lock();
        if !state.lookup.can_start() {
            tracing::debug!("Lookup refused, another one is running");
            return Err(AppError::Busy);
        }
        state.lookup = LookupState::Busy;
        Ok(BusyGuard(&self.state))
    }

    fn remember_lookup(&self, lookup: Lookup) {
        self.state.lock().last = Some(lookup);
    }

    async fn saved_or_default(&self) -> Result<Snapshot, AppError> {
        let (saved, default_city) = {
            let app = self.app.lock();
            (
                app.preferences().last_location.clone(),
                app.config().location.default_city.clone(),
            )
        };

        match self.fetch_city(&saved, false).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if saved != default_city => {
                tracing::warn!("Saved location {:?} failed ({}), using {}", saved, e, default_city);
                self.fetch_city(&default_city, false).await
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_city(&self, city: &str, searched: bool) -> Result<Snapshot, AppError> {
        let report = self.provider.current_for_city(city).await?;
        Ok(self.advise(report, searched))
    }

    async fn fetch_at(&self, mut location: Location, searched: bool) -> Result<Snapshot, AppError> {
        if location.city_name.is_none() {
            location.city_name = reverse_geocode_with(&self.reverse_geocoding_url, &location).await;
        }

        let report = self.provider.current_at(&location).await?;
        Ok(self.advise(report, searched))
    }

    fn advise(&self, report: WeatherReport, searched: bool) -> Snapshot {
        let prediction = self.advisor.evaluate(&report.observation);
        let degraded = prediction.is_fallback();
        if degraded {
            tracing::warn!("Showing fallback advice for {:?}", report.location.city_name);
        }

        Snapshot {
            report,
            bundle: prediction.into_bundle(),
            degraded,
            searched,
        }
    }
}
