//! In-process backend for client tests.

use axum::Router;
use trackdesk_core::{Credentials, Role, SessionContext, UserProfile};

/// Serve `router` on a random local port and return its base URL.
pub(crate) async fn start_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub(crate) fn admin_session() -> SessionContext {
    SessionContext::in_memory(Credentials {
        token: "test-token".into(),
        user: UserProfile {
            id: Some(1),
            email: "admin@example.com".into(),
            name: "Admin".into(),
            personal_code: Some("0001".into()),
            role: Role::Admin,
            branch: None,
            whatsapp: None,
        },
    })
}
