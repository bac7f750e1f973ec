// src/services/session_resolver.rs
use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, Uri, request::Parts},
};
use uuid::Uuid;

use super::session_manager::SessionStore;
use crate::error::Result;
use crate::message::SessionQuery;

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_QUERY_PARAM: &str = "sessionId";

impl SessionQuery {
    /// First `sessionId` in the query string. Repeated or undecodable
    /// parameters never reject the request.
    pub fn from_uri(uri: &Uri) -> Self {
        let session_id = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(pairs)| {
                pairs
                    .into_iter()
                    .find(|(key, _)| key == SESSION_QUERY_PARAM)
                    .map(|(_, value)| value)
            });
        Self { session_id }
    }
}

impl<S> FromRequestParts<S> for SessionQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

/// Pick the session id from the header, then the query string, else a new UUID.
/// Client-supplied ids are taken as-is.
pub fn resolve_session_id(headers: &HeaderMap, query: &SessionQuery) -> String {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let from_query = query.session_id.as_deref().filter(|v| !v.is_empty());

    from_header
        .or(from_query)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Resolve the id and make sure its session exists.
pub async fn resolve_session(
    store: &dyn SessionStore,
    headers: &HeaderMap,
    query: &SessionQuery,
) -> Result<String> {
    let id = resolve_session_id(headers, query);
    store.ensure_session(&id).await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn query(id: Option<&str>) -> SessionQuery {
        SessionQuery { session_id: id.map(str::to_string) }
    }

    #[test]
    fn header_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-Session-Id").unwrap(),
            HeaderValue::from_static("from-header"),
        );
        assert_eq!(resolve_session_id(&headers, &query(Some("from-query"))), "from-header");
    }

    #[test]
    fn falls_back_to_query() {
        assert_eq!(resolve_session_id(&HeaderMap::new(), &query(Some("q"))), "q");
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static(""));
        let id = resolve_session_id(&headers, &query(Some("")));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn non_utf8_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_bytes(&[0xff]).unwrap());
        assert_eq!(resolve_session_id(&headers, &query(Some("q"))), "q");

        let id = resolve_session_id(&headers, &query(None));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn query_takes_first_session_id() {
        let uri: Uri = "/history?other=1&sessionId=a&sessionId=b".parse().unwrap();
        assert_eq!(SessionQuery::from_uri(&uri).session_id.as_deref(), Some("a"));

        let uri: Uri = "/history".parse().unwrap();
        assert!(SessionQuery::from_uri(&uri).session_id.is_none());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = resolve_session_id(&HeaderMap::new(), &query(None));
        let b = resolve_session_id(&HeaderMap::new(), &query(None));
        assert_ne!(a, b);
    }
}
