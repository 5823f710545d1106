pub mod fetch;
pub mod observer;
pub mod resolver;
pub mod settings;

pub use fetch::HttpFetcher;
pub use observer::ConsoleObserver;
pub use resolver::SiteResolver;
pub use settings::{ConvertArgs, load_config};
