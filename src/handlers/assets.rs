use crate::{
    error::{AppError, AppResult},
    state::AppState,
};
use actix_files::NamedFile;
use actix_web::web;

/// Serve a stored reference clip.
///
/// ## Endpoint: `GET /static/{file_name}`
///
/// Content type comes from the extension; Range requests and conditional
/// GETs are answered by `NamedFile`.
pub async fn serve_static(
    state: web::Data<AppState>,
    file_name: web::Path<String>,
) -> AppResult<NamedFile> {
    let file_name = file_name.into_inner();
    let path = state
        .audio_store
        .resolve(&file_name)
        .ok_or_else(|| AppError::NotFound(format!("No such file: {}", file_name)))?;

    Ok(NamedFile::open_async(path).await?)
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure_routes;
    use crate::handlers::testing::state_with;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_serves_saved_audio() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), None, None);
        let url = state.audio_store.save("hello", b"ID3data").await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri(&url).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "audio/mpeg");
        assert!(resp.headers().contains_key(header::ETAG));
        assert_eq!(&test::read_body(resp).await[..], b"ID3data");
    }

    #[actix_web::test]
    async fn test_range_request_returns_partial_content() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), None, None);
        let url = state.audio_store.save("hello", b"ID3data").await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&url)
            .insert_header((header::RANGE, "bytes=0-2"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(&test::read_body(resp).await[..], b"ID3");
    }

    #[actix_web::test]
    async fn test_missing_and_hidden_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), None, None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        for uri in ["/static/nothing.mp3", "/static/..env"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }
}
