/// Request body extractor
///
/// `ApiJson<T>` behaves like `axum::Json<T>`, but a body that is not valid
/// JSON, has the wrong content type, or holds a field of the wrong type is
/// rejected through [`ApiError`], so the client gets 400 with the usual
/// `{"error", "message"}` body instead of axum's plain-text 422.
///
/// ```rust,ignore
/// async fn create(ApiJson(req): ApiJson<CreateTaskRequest>) -> ApiResult<...> { ... }
/// ```

use crate::error::ApiError;
use axum::extract::FromRequest;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
