pub mod assets;
pub mod config;
pub mod debrand;
pub mod extract;
pub mod fetch;
pub mod fsutil;
pub mod localize;
pub mod rewrite;

pub use config::SiteConfig;
pub use localize::Localizer;
