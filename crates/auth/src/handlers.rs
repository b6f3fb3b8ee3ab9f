use super::*;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::web;
use agora_core::ACCESS_COOKIE;
use agora_core::REFRESH_COOKIE;
use agora_core::Unique;

pub async fn login(
    auth: web::Data<Authenticator>,
    cookies: web::Data<Cookies>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let (member, tokens) = auth.login(&req.username, &req.password).await?;
    Ok(Envelope::ok(UserInfo::from(&member)).respond_with(cookies.issue(&tokens)))
}

pub async fn register(
    auth: web::Data<Authenticator>,
    req: web::Json<RegisterRequest>,
) -> Result<Envelope<UserInfo>, AuthError> {
    let member = auth.register(&req.name, &req.username, &req.password).await?;
    Ok(Envelope::created(UserInfo::from(&member)))
}

/// Ends the session named by a pair rotated for this request, else by whichever
/// cookie is present. Always clears both cookies.
pub async fn logout(
    auth: web::Data<Authenticator>,
    cookies: web::Data<Cookies>,
    req: HttpRequest,
) -> Result<HttpResponse, StoreError> {
    let rotated = req.extensions().get::<TokenPair>().map(|t| t.access.clone());
    let session = rotated
        .into_iter()
        .chain(
            [ACCESS_COOKIE, REFRESH_COOKIE]
                .into_iter()
                .filter_map(|name| req.cookie(name))
                .map(|cookie| cookie.value().to_string()),
        )
        .find_map(|token| auth.sessions().session(&token));
    if let Some(session) = session {
        auth.sessions().revoke(session).await?;
    }
    Ok(Envelope::done().respond_with(cookies.clear()))
}

pub async fn logout_all(
    signed: Signed,
    auth: web::Data<Authenticator>,
    cookies: web::Data<Cookies>,
) -> Result<HttpResponse, StoreError> {
    let revoked = auth.sessions().revoke_all(signed.user().id()).await?;
    Ok(Envelope::new(StatusCode::OK, format!("revoked {} sessions", revoked), Vec::<()>::new())
        .respond_with(cookies.clear()))
}

pub async fn me(context: Context<HttpRequest>) -> Envelope<Option<UserInfo>> {
    Envelope::ok(context.user().map(UserInfo::from))
}

pub async fn edit_user(
    signed: Signed,
    auth: web::Data<Authenticator>,
    req: web::Json<Profile>,
) -> Result<Envelope<UserInfo>, AuthError> {
    let edited = auth.edit(signed.user(), req.into_inner()).await?;
    Ok(Envelope::ok(UserInfo::from(&edited)))
}

pub async fn change_password(
    signed: Signed,
    auth: web::Data<Authenticator>,
    cookies: web::Data<Cookies>,
    req: web::Json<PasswordChange>,
) -> Result<HttpResponse, AuthError> {
    let tokens = auth
        .change_password(signed.user(), &req.current_password, &req.new_password)
        .await?;
    Ok(Envelope::done().respond_with(cookies.issue(&tokens)))
}

pub async fn get_user_profile(
    auth: web::Data<Authenticator>,
    query: web::Query<UsernameQuery>,
) -> Result<Envelope<Option<UserInfo>>, AuthError> {
    let member = auth.profile(&query.username).await?;
    Ok(Envelope::ok(member.as_ref().map(UserInfo::from)))
}

pub async fn get_user_for_mentioning(
    signed: Signed,
    auth: web::Data<Authenticator>,
    query: web::Query<UsernameQuery>,
) -> Result<Envelope<Vec<UserInfo>>, AuthError> {
    let found = auth.mention(signed.user(), &query.username).await?;
    Ok(Envelope::ok(found.iter().map(UserInfo::from).collect()))
}

pub async fn get_user_for_invite(
    signed: Signed,
    auth: web::Data<Authenticator>,
    query: web::Query<UsernameQuery>,
) -> Result<Envelope<serde_json::Value>, AuthError> {
    let found = auth.invite(signed.user(), &query.username).await?;
    let users = found.iter().map(UsernameInfo::from).collect::<Vec<_>>();
    Ok(Envelope::ok(serde_json::json!({ "users": users })))
}
