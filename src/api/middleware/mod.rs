pub mod db_details;
pub mod request_span;

pub use db_details::DatabaseDetails;
pub use request_span::RequestSpan;
