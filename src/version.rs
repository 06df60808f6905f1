// Version and build tracking for Cinebot

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "Movie Research Assistant";

pub fn version_string() -> String {
    format!("v{}", VERSION)
}

pub fn window_title() -> String {
    format!("{} {}", APP_NAME, version_string())
}
