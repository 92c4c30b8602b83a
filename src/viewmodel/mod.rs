//! Record filtering, aggregation and pagination shared by the attendance,
//! grade and finance pages.

pub mod aggregate;
pub mod filter;
pub mod format;
pub mod paginate;
pub mod state;
