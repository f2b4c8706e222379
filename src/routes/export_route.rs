use actix_web::{get, http::header::ContentDisposition, web, HttpResponse};
use serde_json::json;

use crate::services::{render_docx, render_pdf, ResultStore};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Render a stored proposal as DOCX or PDF on demand. Unknown ids and
/// formats are 404s; a rendering failure never touches the stored analysis.
#[get("/export/{format}/{analysis_id}")]
pub async fn export_document(
    path: web::Path<(String, String)>,
    store: web::Data<ResultStore>,
) -> HttpResponse {
    let (format, analysis_id) = path.into_inner();

    let content_type = match format.as_str() {
        "docx" => DOCX_CONTENT_TYPE,
        "pdf" => PDF_CONTENT_TYPE,
        _ => {
            return HttpResponse::NotFound()
                .json(json!({ "error": format!("Unknown export format '{}'", format) }))
        }
    };

    let Some(record) = store.get(&analysis_id).await else {
        return HttpResponse::NotFound().json(json!({ "error": "Analysis not found" }));
    };
    let Some(proposal) = record.proposal.as_deref() else {
        return HttpResponse::NotFound()
            .json(json!({ "error": "Analysis has no proposal to export" }));
    };

    let rendered = match format.as_str() {
        "docx" => render_docx(proposal),
        _ => render_pdf(proposal),
    };

    match rendered {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type)
            .insert_header(ContentDisposition::attachment(format!(
                "proposal_{}.{}",
                analysis_id, format
            )))
            .body(bytes),
        Err(e) => {
            log::error!("Failed to render {} for {}: {:#}", format, analysis_id, e);
            HttpResponse::InternalServerError()
                .json(json!({ "error": format!("Failed to render {} document", format) }))
        }
    }
}
