//! Enrichment provider adapters.

mod exchange_rate;
pub mod mock;
mod open_meteo;
mod rest_countries;
mod review_price;

pub use exchange_rate::ExchangeRateProvider;
pub use open_meteo::OpenMeteoWeatherProvider;
pub use rest_countries::RestCountriesSafetyProvider;
pub use review_price::ReviewHeuristicPriceProvider;
