use serde::{Deserialize, Serialize};

use crate::models::{CityClass, CreativeParams};
use crate::services::schema::Field;

#[derive(Debug, Serialize)]
pub struct DisclaimerResponse {
    pub disclaimer: String,
    pub timestamp: String,
}

/// Batch request: `params.city` is ignored, `cities` drives the batch.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub params: CreativeParams,
    pub cities: Vec<String>,
    pub output_format: Option<String>, // "txt" | "xlsx"
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub disclaimers: Vec<crate::models::CityText>,
    pub count: usize,
    pub file: Option<FileAttachment>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct CityInfo {
    pub key: &'static str,
    pub display: String,
    pub class: CityClass,
    pub label: Option<&'static str>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileAttachment {
    pub id: String,
    pub filename: String,
    pub mime: String,
    pub size: usize,
    pub content_base64: String,
}
