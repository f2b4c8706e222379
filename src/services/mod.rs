pub mod droid;
pub mod exporter;
pub mod openai_client;
pub mod pipeline;
pub mod proposal;
pub mod result_store;
pub mod site_scraper;

pub use droid::*;
pub use exporter::*;
pub use openai_client::*;
pub use pipeline::*;
pub use proposal::*;
pub use result_store::*;
pub use site_scraper::*;
