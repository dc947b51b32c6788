use std::str::FromStr;

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::error;

use crate::handlers::disclaimer_error;
use crate::models::{
    geography, BatchRequest, BatchResponse, CityInfo, CityText, CreativeParams, CreativeType,
    DisclaimerResponse, ValidateRequest,
};
use crate::services::export::{self, ExportFormat};
use crate::services::{generator, schema, validators};

pub async fn list_cities() -> HttpResponse {
    let cities: Vec<CityInfo> = geography::registry()
        .records()
        .iter()
        .map(|record| CityInfo {
            key: record.key,
            display: geography::normalize_city_display(record.key),
            class: record.class,
            label: record.label,
        })
        .collect();

    HttpResponse::Ok().json(json!({
        "count": cities.len(),
        "cities": cities
    }))
}

pub async fn get_schema(path: web::Path<String>) -> HttpResponse {
    let tag = path.into_inner();
    match CreativeType::from_str(&tag) {
        Ok(creative_type) => HttpResponse::Ok().json(schema::schema_for(creative_type)),
        Err(_) => HttpResponse::NotFound().json(json!({
            "error": format!("Unknown creative type: {}", tag)
        })),
    }
}

pub async fn validate(data: web::Json<ValidateRequest>) -> HttpResponse {
    let req = data.into_inner();

    let Some(kind) = req.field.kind() else {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Field '{}' is chosen from a fixed set, not typed", req.field.as_ref())
        }));
    };

    match validators::validate_field(kind, &req.value) {
        Ok(value) => HttpResponse::Ok().json(json!({
            "valid": true,
            "value": value
        })),
        Err(err) => HttpResponse::UnprocessableEntity().json(json!({
            "valid": false,
            "error": err.message
        })),
    }
}

pub async fn generate(data: web::Json<CreativeParams>) -> HttpResponse {
    let params = data.into_inner();

    match generator::generate(&params) {
        Ok(disclaimer) => HttpResponse::Ok().json(DisclaimerResponse {
            disclaimer,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
        Err(err) => disclaimer_error(&err),
    }
}

pub async fn generate_batch(data: web::Json<BatchRequest>) -> HttpResponse {
    let req = data.into_inner();

    let format = match req.output_format.as_deref().map(ExportFormat::parse).transpose() {
        Ok(format) => format,
        Err(err) => {
            return HttpResponse::BadRequest().json(json!({
                "error": err.to_string()
            }))
        }
    };

    let results = match generator::generate_batch(&req.params, &req.cities) {
        Ok(results) => results,
        Err(err) => return disclaimer_error(&err),
    };

    let file = match format.map(|f| export::render(&results, f)).transpose() {
        Ok(file) => file,
        Err(err) => {
            error!(error = %err, "batch export failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": err.to_string()
            }));
        }
    };

    HttpResponse::Ok().json(BatchResponse {
        count: results.len(),
        disclaimers: results
            .into_iter()
            .map(|(city, text)| CityText { city, text })
            .collect(),
        file,
    })
}
