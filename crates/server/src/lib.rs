//! Forum Backend Server
//!
//! Serves the RPC surface under `/rpc/<namespace>/<procedure>`: queries are
//! `GET` with query-string input, mutations are `POST` with a JSON body.
//!
//! ## Layers
//!
//! - [`context()`] — Per-request identity, locale, CSRF check, cookie rotation
//! - [`gate()`] — Page prefix redirects
//! - [`State`] — Shared services and the route table
//! - [`Config`] — Flags and environment

mod config;
mod gate;
mod middleware;

pub use config::*;
pub use gate::*;
pub use middleware::*;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::middleware::from_fn;
use actix_web::web;
use agora_auth::Authenticator;
use agora_auth::ContextBuilder;
use agora_auth::Cookies;
use agora_auth::CredentialStore;
use agora_auth::Crypto;
use agora_auth::Policy;
use agora_auth::SessionManager;
use agora_auth::SessionStore;
use agora_database::migrate;
use agora_forum::Board;
use agora_forum::Forum;
use std::sync::Arc;
use tokio_postgres::Client;

async fn health(client: Option<web::Data<Arc<Client>>>) -> impl Responder {
    let Some(client) = client else {
        return HttpResponse::Ok().body("ok");
    };
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

fn malformed(err: impl std::fmt::Display) -> HttpResponse {
    agora_auth::failure(StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string(), None)
}

/// Services shared by every worker.
#[derive(Clone)]
pub struct State {
    builder: web::Data<ContextBuilder>,
    auth: web::Data<Authenticator>,
    forum: web::Data<Forum>,
    cookies: web::Data<Cookies>,
    gate: web::Data<Gate>,
}

impl State {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        board: Arc<dyn Board>,
        config: &Config,
    ) -> Self {
        let crypto = Crypto::new(config.secret.as_bytes());
        let manager = Arc::new(SessionManager::new(
            sessions,
            users.clone(),
            crypto,
            Policy::default(),
        ));
        Self {
            builder: web::Data::new(ContextBuilder::new(manager.clone(), &config.base_url)),
            auth: web::Data::new(Authenticator::new(users.clone(), manager)),
            forum: web::Data::new(Forum::new(board, users)),
            cookies: web::Data::new(Cookies::new(config.secure_cookies)),
            gate: web::Data::new(Gate::new(config.maintenance.clone())),
        }
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        self.builder.sessions().clone()
    }

    #[rustfmt::skip]
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.builder.clone())
            .app_data(self.auth.clone())
            .app_data(self.forum.clone())
            .app_data(self.cookies.clone())
            .app_data(self.gate.clone())
            .app_data(web::JsonConfig::default().error_handler(|e, _| {
                let response = malformed(&e);
                actix_web::error::InternalError::from_response(e, response).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|e, _| {
                let response = malformed(&e);
                actix_web::error::InternalError::from_response(e, response).into()
            }))
            .route("/health", web::get().to(health))
            .service(
                web::scope("/rpc/user")
                    .route("/login",                web::post().to(agora_auth::login))
                    .route("/register",             web::post().to(agora_auth::register))
                    .route("/logout",               web::post().to(agora_auth::logout))
                    .route("/logoutAll",            web::post().to(agora_auth::logout_all))
                    .route("/me",                   web::get().to(agora_auth::me))
                    .route("/editUser",             web::post().to(agora_auth::edit_user))
                    .route("/changePassword",       web::post().to(agora_auth::change_password))
                    .route("/getUserProfile",       web::get().to(agora_auth::get_user_profile))
                    .route("/getUserForMentioning", web::get().to(agora_auth::get_user_for_mentioning))
                    .route("/getUserForInvite",     web::get().to(agora_auth::get_user_for_invite)),
            )
            .service(
                web::scope("/rpc/post")
                    .route("/getPublicPostDiscussions", web::get().to(agora_forum::get_public_post_discussions))
                    .route("/getPostDetail",            web::get().to(agora_forum::get_post_detail))
                    .route("/createPost",               web::post().to(agora_forum::create_post))
                    .route("/editPost",                 web::post().to(agora_forum::edit_post))
                    .route("/deletePost",               web::post().to(agora_forum::delete_post))
                    .route("/reportPost",               web::post().to(agora_forum::report_post)),
            )
            .service(
                web::scope("/rpc/comment")
                    .route("/getPostComments",    web::get().to(agora_forum::get_post_comments))
                    .route("/getReplyComments",   web::get().to(agora_forum::get_reply_comments))
                    .route("/createComment",      web::post().to(agora_forum::create_comment))
                    .route("/replyComment",       web::post().to(agora_forum::reply_comment))
                    .route("/editComment",        web::post().to(agora_forum::edit_comment))
                    .route("/editReplyComment",   web::post().to(agora_forum::edit_reply_comment))
                    .route("/deleteComment",      web::post().to(agora_forum::delete_comment))
                    .route("/deleteReplyComment", web::post().to(agora_forum::delete_reply_comment)),
            )
            .service(
                web::scope("/rpc/group")
                    .route("/getAvailableGroups",     web::get().to(agora_forum::get_available_groups))
                    .route("/getAllGroups",           web::get().to(agora_forum::get_all_groups))
                    .route("/getAvailableInvitation", web::get().to(agora_forum::get_available_invitation))
                    .route("/getGroupMembers",        web::get().to(agora_forum::get_group_members))
                    .route("/getAllGroupPosts",       web::get().to(agora_forum::get_all_group_posts))
                    .route("/getAllGroupTags",        web::get().to(agora_forum::get_all_group_tags))
                    .route("/createGroup",            web::post().to(agora_forum::create_group))
                    .route("/editGroup",              web::post().to(agora_forum::edit_group))
                    .route("/deleteGroup",            web::post().to(agora_forum::delete_group))
                    .route("/addNewMember",           web::post().to(agora_forum::add_new_member))
                    .route("/acceptInvitation",       web::post().to(agora_forum::accept_invitation))
                    .route("/declineInvitation",      web::post().to(agora_forum::decline_invitation))
                    .route("/createNewPostGroup",     web::post().to(agora_forum::create_new_post_group))
                    .route("/reportPostGroup",        web::post().to(agora_forum::report_post_group)),
            )
            .service(
                web::scope("/rpc/report")
                    .route("/getReportMessage", web::get().to(agora_forum::get_report_message))
                    .route("/safePost",         web::post().to(agora_forum::safe_post))
                    .route("/takeDownPost",     web::post().to(agora_forum::take_down_post)),
            )
            .service(
                web::scope("/rpc/notification")
                    .route("/getUserNotificationCounts", web::get().to(agora_forum::get_user_notification_counts))
                    .route("/getUserNotifications",      web::get().to(agora_forum::get_user_notifications))
                    .route("/markAsReaded",              web::post().to(agora_forum::mark_as_readed)),
            )
            .service(
                web::scope("/rpc/tag")
                    .route("/getAllTags", web::get().to(agora_forum::get_all_tags)),
            );
    }
}

/// Purges expired sessions every [`agora_core::SWEEP_INTERVAL`].
pub fn sweeper(sessions: Arc<SessionManager>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(agora_core::SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sessions.sweep().await {
                Ok(0) => log::debug!("no expired sessions"),
                Ok(n) => log::info!("swept {} expired sessions", n),
                Err(e) => log::error!("session sweep failed: {}", e),
            }
        }
    });
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = agora_database::db(&config.db_url).await?;
    migrate::<agora_auth::Role>(&client).await?;
    migrate::<agora_auth::Member>(&client).await?;
    migrate::<agora_auth::Session>(&client).await?;
    migrate::<agora_forum::Group>(&client).await?;
    migrate::<agora_forum::Post>(&client).await?;
    migrate::<agora_forum::Comment>(&client).await?;
    migrate::<agora_forum::Tag>(&client).await?;
    migrate::<agora_forum::Report>(&client).await?;
    migrate::<agora_forum::Notification>(&client).await?;
    let state = State::new(client.clone(), client.clone(), client.clone(), &config);
    sweeper(state.sessions());
    let database = web::Data::new(client);
    let origin = config.base_url.clone();
    log::info!("starting forum server on {}", config.bind);
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(from_fn(gate))
            .wrap(from_fn(context))
            .wrap(
                Cors::default()
                    .allowed_origin(&origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials(),
            )
            .wrap(Logger::new("%r %s %Ts"))
            .app_data(database.clone())
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(config.workers)
    .bind(&config.bind)?
    .run()
    .await?;
    Ok(())
}
