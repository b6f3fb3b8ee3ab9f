use super::*;
use actix_web::HttpRequest;
use actix_web::web;
use agora_auth::Context;
use agora_auth::Developer;
use agora_auth::Envelope;
use agora_auth::Signed;
use agora_core::ID;

pub async fn get_public_post_discussions(
    _: Signed,
    forum: web::Data<Forum>,
    query: web::Query<DiscussionQuery>,
) -> Result<Envelope<Vec<PostView>>, ForumError> {
    Ok(Envelope::ok(forum.discussions(&query.ids()).await?))
}

/// Open to visitors; group posts still require membership.
pub async fn get_post_detail(
    context: Context<HttpRequest>,
    forum: web::Data<Forum>,
    query: web::Query<PostQuery>,
) -> Result<Envelope<PostView>, ForumError> {
    let view = forum.detail(context.user(), ID::from(query.id)).await?;
    Ok(Envelope::ok(view))
}

pub async fn create_post(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<Draft>,
) -> Result<Envelope<PostView>, ForumError> {
    let view = forum.create(signed.user(), req.into_inner()).await?;
    Ok(Envelope::created(view))
}

pub async fn edit_post(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<EditRequest>,
) -> Result<Envelope<PostView>, ForumError> {
    let (id, draft) = req.into_inner().split();
    Ok(Envelope::ok(forum.edit(signed.user(), ID::from(id), draft).await?))
}

pub async fn delete_post(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<PostTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.delete(signed.user(), ID::from(req.post_id)).await?;
    Ok(Envelope::done())
}

pub async fn report_post(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<ReportRequest>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    let req = req.into_inner();
    forum.report(signed.user(), ID::from(req.id), req.reason).await?;
    Ok(Envelope::done())
}

pub async fn get_report_message(
    _: Developer,
    forum: web::Data<Forum>,
    query: web::Query<PostTarget>,
) -> Result<Envelope<Vec<ReportView>>, ForumError> {
    Ok(Envelope::ok(forum.reports(ID::from(query.post_id)).await?))
}

pub async fn safe_post(
    developer: Developer,
    forum: web::Data<Forum>,
    req: web::Json<PostTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.safe(developer.user(), ID::from(req.post_id)).await?;
    Ok(Envelope::done())
}

pub async fn take_down_post(
    developer: Developer,
    forum: web::Data<Forum>,
    req: web::Json<PostTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.take_down(developer.user(), ID::from(req.post_id)).await?;
    Ok(Envelope::done())
}

pub async fn get_user_notification_counts(
    signed: Signed,
    forum: web::Data<Forum>,
) -> Result<Envelope<usize>, ForumError> {
    Ok(Envelope::ok(forum.unread(signed.user()).await?))
}

pub async fn get_user_notifications(
    signed: Signed,
    forum: web::Data<Forum>,
) -> Result<Envelope<Vec<NotificationView>>, ForumError> {
    Ok(Envelope::ok(forum.inbox(signed.user()).await?))
}

pub async fn mark_as_readed(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<MarkRequest>,
) -> Result<Envelope<usize>, ForumError> {
    let which = req.notification_id.map(ID::from);
    Ok(Envelope::ok(forum.mark(signed.user(), which).await?))
}

pub async fn get_all_tags(
    _: Signed,
    forum: web::Data<Forum>,
    query: web::Query<TagQuery>,
) -> Result<Envelope<TagPage>, ForumError> {
    let page = forum.tags(query.name.as_deref(), query.cursor).await?;
    Ok(Envelope::ok(page))
}

pub async fn get_post_comments(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<CommentsQuery>,
) -> Result<Envelope<CommentPage>, ForumError> {
    let cursor = query.cursor.map(ID::from);
    let page = forum.comments(signed.user(), ID::from(query.post_id), cursor).await?;
    Ok(Envelope::ok(page))
}

pub async fn get_reply_comments(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<RepliesQuery>,
) -> Result<Envelope<ReplyPage>, ForumError> {
    let cursor = query.cursor.map(ID::from);
    let page = forum.replies(signed.user(), ID::from(query.comment_id), cursor).await?;
    Ok(Envelope::ok(page))
}

pub async fn create_comment(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<CommentRequest>,
) -> Result<Envelope<CommentView>, ForumError> {
    let req = req.into_inner();
    let view = forum.comment(signed.user(), ID::from(req.post_id), req.text).await?;
    Ok(Envelope::created(view))
}

pub async fn reply_comment(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<ReplyRequest>,
) -> Result<Envelope<ReplyView>, ForumError> {
    let req = req.into_inner();
    let view = forum.reply(signed.user(), ID::from(req.comment_id), req.text).await?;
    Ok(Envelope::created(view))
}

pub async fn edit_comment(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<EditCommentRequest>,
) -> Result<Envelope<CommentView>, ForumError> {
    let req = req.into_inner();
    let view = forum.edit_comment(signed.user(), ID::from(req.comment_id), req.text).await?;
    Ok(Envelope::ok(view))
}

pub async fn edit_reply_comment(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<EditReplyRequest>,
) -> Result<Envelope<ReplyView>, ForumError> {
    let req = req.into_inner();
    let id = ID::from(req.reply_comment_id);
    Ok(Envelope::ok(forum.edit_reply(signed.user(), id, req.text).await?))
}

pub async fn delete_comment(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<CommentTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.delete_comment(signed.user(), ID::from(req.comment_id)).await?;
    Ok(Envelope::done())
}

pub async fn delete_reply_comment(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<ReplyTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.delete_reply(signed.user(), ID::from(req.reply_comment_id)).await?;
    Ok(Envelope::done())
}

pub async fn get_available_groups(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<GroupCursor>,
) -> Result<Envelope<GroupPage>, ForumError> {
    let cursor = query.cursor.map(ID::from);
    Ok(Envelope::ok(forum.joined(signed.user(), cursor).await?))
}

pub async fn get_all_groups(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<GroupSearch>,
) -> Result<Envelope<GroupPage>, ForumError> {
    let cursor = query.cursor.map(ID::from);
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    Ok(Envelope::ok(forum.directory(signed.user(), search, cursor).await?))
}

pub async fn get_available_invitation(
    signed: Signed,
    forum: web::Data<Forum>,
) -> Result<Envelope<Vec<GroupView>>, ForumError> {
    Ok(Envelope::ok(forum.invitations(signed.user()).await?))
}

pub async fn get_group_members(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<GroupTarget>,
) -> Result<Envelope<Vec<Byline>>, ForumError> {
    let members = forum.members(signed.user(), ID::from(query.group_id)).await?;
    Ok(Envelope::ok(members))
}

pub async fn get_all_group_posts(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<GroupPostsQuery>,
) -> Result<Envelope<Vec<PostView>>, ForumError> {
    let id = ID::from(query.group_id);
    Ok(Envelope::ok(forum.group_posts(signed.user(), id, &query.ids()).await?))
}

pub async fn get_all_group_tags(
    signed: Signed,
    forum: web::Data<Forum>,
    query: web::Query<GroupTagQuery>,
) -> Result<Envelope<TagPage>, ForumError> {
    let id = ID::from(query.group_id);
    let page = forum
        .group_tags(signed.user(), id, query.name.as_deref(), query.cursor)
        .await?;
    Ok(Envelope::ok(page))
}

pub async fn create_group(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<Charter>,
) -> Result<Envelope<GroupView>, ForumError> {
    let view = forum.found(signed.user(), req.into_inner()).await?;
    Ok(Envelope::created(view))
}

pub async fn edit_group(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<EditGroupRequest>,
) -> Result<Envelope<GroupView>, ForumError> {
    let req = req.into_inner();
    let view = forum
        .rename_group(signed.user(), ID::from(req.group_id), req.name, req.description)
        .await?;
    Ok(Envelope::ok(view))
}

pub async fn delete_group(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<GroupTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.disband(signed.user(), ID::from(req.group_id)).await?;
    Ok(Envelope::done())
}

pub async fn add_new_member(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<InviteRequest>,
) -> Result<Envelope<usize>, ForumError> {
    let id = ID::from(req.group_id);
    let invited = forum.invite(signed.user(), id, &req.invited_username).await?;
    Ok(Envelope::ok(invited))
}

pub async fn accept_invitation(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<GroupTarget>,
) -> Result<Envelope<GroupView>, ForumError> {
    let view = forum.accept(signed.user(), ID::from(req.group_id)).await?;
    Ok(Envelope::ok(view))
}

pub async fn decline_invitation(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<GroupTarget>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    forum.decline(signed.user(), ID::from(req.group_id)).await?;
    Ok(Envelope::done())
}

pub async fn create_new_post_group(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<GroupDraft>,
) -> Result<Envelope<PostView>, ForumError> {
    let (group, draft) = req.into_inner().split();
    let view = forum.post_in(signed.user(), ID::from(group), draft).await?;
    Ok(Envelope::created(view))
}

pub async fn report_post_group(
    signed: Signed,
    forum: web::Data<Forum>,
    req: web::Json<GroupReportRequest>,
) -> Result<Envelope<Vec<()>>, ForumError> {
    let req = req.into_inner();
    forum
        .report_in(signed.user(), ID::from(req.group_id), ID::from(req.id), req.reason)
        .await?;
    Ok(Envelope::done())
}
