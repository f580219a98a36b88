use axum::http::HeaderMap;
use uuid::Uuid;

use licwarden_core::UserId;

/// Actor identity from the `x-actor-id` header.
///
/// Authentication lives in front of this service; requests without the
/// header are attributed to the nil actor rather than rejected.
pub fn actor_from_headers(headers: &HeaderMap) -> UserId {
    headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<UserId>().ok())
        .unwrap_or_else(|| UserId::from_uuid(Uuid::nil()))
}
