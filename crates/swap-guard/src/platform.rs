pub mod headless;

#[cfg(feature = "browser")]
pub mod browser;
