//! Success envelopes shared by the handlers

use serde::Serialize;

use crate::domain::account::Pagination;

/// Pagination block attached to every list response
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl PaginationMeta {
    pub fn new(page: &Pagination, total: u64) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total,
            pages: page.pages(total),
        }
    }
}

/// `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{"success": true, "data": [...], "pagination": {...}}`
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, page: &Pagination, total: u64) -> Self {
        Self {
            success: true,
            data,
            pagination: PaginationMeta::new(page, total),
        }
    }
}

/// `{"success": true, "message": ...}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
