use super::context::Desk;
use super::render;
use thesis_application::Notice;
use thesis_core::thesis::ActorRole;
use thesis_core::ThesisError;

pub async fn login(desk: &Desk, identifier: &str, password: &str) -> Notice {
    let outcome = desk.sessions.login(identifier, password).await;
    Notice::from_outcome("Login", &outcome, |session| {
        format!("Signed in as {}", render::session(session))
    })
}

pub async fn register(
    desk: &Desk,
    email: &str,
    username: &str,
    password: &str,
    role: Option<ActorRole>,
) -> Notice {
    let outcome = desk.sessions.register(email, username, password, role).await;
    Notice::from_outcome("Registration", &outcome, |_| {
        format!("Account {username} created; log in to continue")
    })
}

pub async fn logout(desk: &Desk) -> Notice {
    let outcome = desk.sessions.logout().await;
    Notice::from_outcome("Logout", &outcome, |_| "Credential cleared".to_string())
}

pub async fn whoami(desk: &Desk) -> Notice {
    let outcome = desk
        .sessions
        .current()
        .await
        .ok_or_else(|| ThesisError::authorization("not logged in"));
    Notice::from_outcome("Session", &outcome, render::session)
}
