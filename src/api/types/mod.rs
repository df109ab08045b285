mod error;
mod response;

pub use error::{ApiError, ApiErrorBody, AuditErrorMessage};
pub use response::{DataResponse, ListResponse, MessageResponse, PaginationMeta};
