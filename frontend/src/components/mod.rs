pub mod baby_selector;
pub mod config_error;
pub mod create_baby_modal;
pub mod header;
pub mod notice;
pub mod protected_route;
pub mod sleep_chart;

pub use baby_selector::BabySelector;
pub use config_error::ConfigErrorScreen;
pub use create_baby_modal::{CreateBabyForm, CreateBabyModal};
pub use header::Header;
pub use notice::{ErrorBanner, LoadingSpinner, NoBabyNotice};
pub use protected_route::ProtectedRoute;
pub use sleep_chart::SleepChart;
