use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::configuration::Settings;
use crate::domain::analysis_record::AnalysisRecord;
use crate::domain::analysis_request::AnalysisRequest;
use crate::services::{
    build_proposal, run_complete_analysis, Droid, OpenaiClient, ResultStore,
};

#[derive(Deserialize)]
pub struct AnalyzeBody {
    url: String,
}

/*
 Simple analysis:
 1. Load the page in a browser session, keep the rendered source
 2. Classify site type / traffic / zones from the markup (fatal on failure)
 3. Render the template proposal
 4. Store the record and return proposal text, zones and id
*/
#[post("/analyze")]
pub async fn analyze(
    body: web::Json<AnalyzeBody>,
    openai_client: web::Data<OpenaiClient>,
    settings: web::Data<Settings>,
    store: web::Data<ResultStore>,
) -> HttpResponse {
    let request = match AnalysisRequest::parse(&body.url) {
        Ok(request) => request,
        Err(e) => return HttpResponse::BadRequest().json(json!({ "error": e })),
    };
    let url = request.as_str();
    log::info!("Starting analysis for URL: {}", url);

    let html = match fetch_page_html(&settings, url).await {
        Ok(html) => html,
        Err(e) => {
            log::error!("Failed to crawl website {}: {:#}", url, e);
            return HttpResponse::BadRequest()
                .json(json!({ "error": format!("Failed to crawl website: {:#}", e) }));
        }
    };

    let analysis = match openai_client.analyze_site_structure(url, &html).await {
        Ok(analysis) => analysis,
        Err(e) => {
            log::error!("Failed to analyze website {}: {:#}", url, e);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": format!("Failed to analyze website: {:#}", e) }));
        }
    };

    let proposal_text = build_proposal(
        url,
        &analysis.site_type,
        &analysis.traffic_estimate,
        &analysis.zones,
    );

    let record = AnalysisRecord::simple(
        url,
        analysis.site_type,
        analysis.traffic_estimate,
        analysis.zones.clone(),
        proposal_text.clone(),
    );
    let analysis_id = store.insert(record).await;
    log::info!("Analysis completed for {}, ID: {}", url, analysis_id);

    HttpResponse::Ok().json(json!({
        "proposal_text": proposal_text,
        "zones": analysis.zones,
        "analysis_id": analysis_id,
    }))
}

async fn fetch_page_html(settings: &Settings, url: &str) -> anyhow::Result<String> {
    let droid = Droid::new(&settings.browser).await?;
    let result = droid
        .fetch_page_source(url, settings.pipeline.request_timeout_secs)
        .await;
    droid.quit().await;
    result
}

/// Complete workflow: the five-stage vision pipeline. Failures come back as
/// `{success: false, error}` rather than transport errors.
#[post("/analyze")]
pub async fn analyze_complete(
    body: web::Json<AnalyzeBody>,
    openai_client: web::Data<OpenaiClient>,
    settings: web::Data<Settings>,
    store: web::Data<ResultStore>,
) -> HttpResponse {
    let request = match AnalysisRequest::parse(&body.url) {
        Ok(request) => request,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({ "success": false, "error": e }))
        }
    };
    log::info!("Starting complete analysis for URL: {}", request);

    let record = run_complete_analysis(&openai_client, &settings, &request).await;
    store.insert(record.clone()).await;

    let response = match record.success {
        true => json!({
            "success": true,
            "screenshot": record.screenshot,
            "zones": record.zones,
            "language": record.language,
            "emails": record.emails,
            "company_name": record.company_name,
            "title": record.title,
            "description": record.description,
            "owner_info": record.owner_info,
            "proposal": record.proposal,
            "analysis_id": record.id,
        }),
        false => json!({
            "success": false,
            "error": record.error,
            "analysis_id": record.id,
        }),
    };

    HttpResponse::Ok().json(response)
}

#[get("/analysis/{analysis_id}")]
pub async fn get_analysis(
    path: web::Path<String>,
    store: web::Data<ResultStore>,
) -> HttpResponse {
    let analysis_id = path.into_inner();

    match store.get(&analysis_id).await {
        Some(record) => HttpResponse::Ok().json(json!({ "success": true, "data": record })),
        None => HttpResponse::NotFound().json(json!({ "error": "Analysis not found" })),
    }
}

#[delete("/analysis/{analysis_id}")]
pub async fn delete_analysis(
    path: web::Path<String>,
    store: web::Data<ResultStore>,
) -> HttpResponse {
    let analysis_id = path.into_inner();

    match store.remove(&analysis_id).await {
        true => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Analysis deleted successfully",
        })),
        false => HttpResponse::NotFound().json(json!({ "error": "Analysis not found" })),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, web::Data, App};

    use super::{delete_analysis, get_analysis};
    use crate::domain::analysis_record::AnalysisRecord;
    use crate::services::ResultStore;

    fn stored_record() -> AnalysisRecord {
        AnalysisRecord::simple(
            "https://example.com/",
            "corporate".to_string(),
            "low".to_string(),
            vec![],
            "Здравствуйте!".to_string(),
        )
    }

    #[actix_web::test]
    async fn retrieving_an_unknown_analysis_is_not_found() {
        let store = Data::new(ResultStore::new());
        let app = test::init_service(
            App::new()
                .service(web::scope("/complete").service(get_analysis))
                .app_data(store),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/complete/analysis/no-such-id")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn deleted_analysis_is_gone_on_retrieval() {
        let store = Data::new(ResultStore::new());
        let id = store.insert(stored_record()).await;
        let app = test::init_service(
            App::new()
                .service(
                    web::scope("/complete")
                        .service(get_analysis)
                        .service(delete_analysis),
                )
                .app_data(store),
        )
        .await;

        let get_req = test::TestRequest::get()
            .uri(&format!("/complete/analysis/{}", id))
            .to_request();
        assert_eq!(
            test::call_service(&app, get_req).await.status(),
            StatusCode::OK
        );

        let delete_req = test::TestRequest::delete()
            .uri(&format!("/complete/analysis/{}", id))
            .to_request();
        assert_eq!(
            test::call_service(&app, delete_req).await.status(),
            StatusCode::OK
        );

        let get_again = test::TestRequest::get()
            .uri(&format!("/complete/analysis/{}", id))
            .to_request();
        assert_eq!(
            test::call_service(&app, get_again).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn deleting_an_unknown_analysis_is_not_found() {
        let store = Data::new(ResultStore::new());
        let app = test::init_service(
            App::new()
                .service(web::scope("/complete").service(delete_analysis))
                .app_data(store),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri("/complete/analysis/no-such-id")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
