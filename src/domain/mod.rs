pub mod analysis_record;
pub mod analysis_request;
pub mod site_metadata;
pub mod zone;
