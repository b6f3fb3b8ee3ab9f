use super::*;
use agora_auth::Member;
use agora_auth::StoreError;
use agora_core::ID;
use agora_core::Unique;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    posts: HashMap<ID<Post>, Post>,
    comments: Vec<Comment>,
    reports: Vec<Report>,
    notifications: Vec<Notification>,
    tags: Vec<String>,
    groups: HashMap<ID<Group>, Group>,
    members: Vec<(ID<Group>, ID<Member>)>,
    invitations: Vec<(ID<Group>, ID<Member>)>,
}

impl State {
    /// Id of a tag name, assigned on first use starting from 1.
    fn tag(&self, name: &str) -> Option<i32> {
        self.tags
            .iter()
            .position(|t| t == name)
            .map(|i| i as i32 + 1)
    }

    fn learn(&mut self, post: &Post) {
        for tag in post.tags() {
            if self.tag(tag).is_none() {
                self.tags.push(tag.clone());
            }
        }
    }

    fn drop_post(&mut self, id: ID<Post>) -> bool {
        let removed = self.posts.remove(&id).is_some();
        self.comments.retain(|c| c.post() != id);
        self.reports.retain(|r| r.post() != id);
        self.notifications.retain(|n| n.post() != id);
        removed
    }

    /// Posts whose group is `group`, newest first, optionally filtered by tag ids.
    fn feed(&self, group: Option<ID<Group>>, tags: &[i32]) -> Vec<Post> {
        let mut posts = self
            .posts
            .values()
            .filter(|p| p.group() == group)
            .filter(|p| {
                tags.is_empty()
                    || p.tags()
                        .iter()
                        .filter_map(|t| self.tag(t))
                        .any(|id| tags.contains(&id))
            })
            .cloned()
            .collect::<Vec<_>>();
        posts.sort_by(|a, b| b.created().cmp(&a.created()).then(b.id().cmp(&a.id())));
        posts
    }

    /// Newest first, strictly older than `before`.
    fn page(
        &self,
        keep: impl Fn(&Comment) -> bool,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Vec<Comment> {
        let mut page = self
            .comments
            .iter()
            .filter(|&c| keep(c))
            .filter(|c| before.is_none_or(|b| c.id() < b))
            .cloned()
            .collect::<Vec<_>>();
        page.sort_by(|a, b| b.id().cmp(&a.id()));
        page.truncate(limit);
        page
    }
}

/// In-process [`Board`]. One lock guards all tables so cascades are atomic.
#[derive(Default)]
pub struct Memory {
    state: RwLock<State>,
}

#[async_trait::async_trait]
impl Board for Memory {
    async fn publish(&self, post: &Post) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.posts.contains_key(&post.id()) {
            return Err(StoreError::Conflict);
        }
        state.learn(post);
        state.posts.insert(post.id(), post.clone());
        Ok(())
    }

    async fn revise(&self, post: &Post) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post.id()) {
            return Ok(false);
        }
        state.learn(post);
        state.posts.insert(post.id(), post.clone());
        Ok(true)
    }

    async fn post(&self, id: ID<Post>) -> Result<Option<Post>, StoreError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn public(&self, tags: &[i32]) -> Result<Vec<Post>, StoreError> {
        Ok(self.state.read().await.feed(None, tags))
    }

    async fn grouped(&self, group: ID<Group>, tags: &[i32]) -> Result<Vec<Post>, StoreError> {
        Ok(self.state.read().await.feed(Some(group), tags))
    }

    async fn remove(&self, id: ID<Post>) -> Result<bool, StoreError> {
        Ok(self.state.write().await.drop_post(id))
    }

    async fn report(&self, report: &Report) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        match state.posts.contains_key(&report.post()) {
            true => {
                state.reports.push(report.clone());
                Ok(())
            }
            false => Err(StoreError::Backend(format!("no post {}", report.post()))),
        }
    }

    async fn reports(&self, post: ID<Post>) -> Result<Vec<Report>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .reports
            .iter()
            .filter(|r| r.post() == post)
            .cloned()
            .collect())
    }

    async fn dismiss(&self, post: ID<Post>) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        let before = state.reports.len();
        state.reports.retain(|r| r.post() != post);
        Ok(before - state.reports.len())
    }

    async fn notify(&self, notification: &Notification) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn unread(&self, user: ID<Member>) -> Result<usize, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.recipient() == user && !n.read())
            .count())
    }

    async fn inbox(&self, user: ID<Member>) -> Result<Vec<Notification>, StoreError> {
        let mut inbox = self
            .state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.recipient() == user)
            .cloned()
            .collect::<Vec<_>>();
        inbox.sort_by(|a, b| a.read().cmp(&b.read()).then(b.created().cmp(&a.created())));
        Ok(inbox)
    }

    async fn mark(
        &self,
        user: ID<Member>,
        which: Option<ID<Notification>>,
    ) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        let mut marked = 0;
        for n in state.notifications.iter_mut() {
            if n.recipient() == user && !n.read() && which.is_none_or(|id| id == n.id()) {
                *n = n.clone().marked();
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn tags(
        &self,
        group: Option<ID<Group>>,
        name: Option<&str>,
        cursor: Option<i32>,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError> {
        let state = self.state.read().await;
        let mut ranked = state
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| Tag {
                id: i as i32 + 1,
                name: tag.clone(),
                posts: state
                    .posts
                    .values()
                    .filter(|p| p.group() == group && p.tags().contains(tag))
                    .count() as i64,
            })
            .filter(|t| t.posts > 0)
            .filter(|t| name.is_none_or(|n| t.name.contains(n)))
            .collect::<Vec<_>>();
        ranked.sort_by(tag::ranked);
        if let Some(cursor) = cursor {
            let Some(at) = ranked.iter().position(|t| t.id == cursor) else {
                return Ok(Vec::new());
            };
            ranked.drain(..=at);
        }
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[async_trait::async_trait]
impl Threads for Memory {
    async fn add_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post()) {
            return Err(StoreError::Backend(format!("no post {}", comment.post())));
        }
        if state.comments.iter().any(|c| c.id() == comment.id()) {
            return Err(StoreError::Conflict);
        }
        state.comments.push(comment.clone());
        Ok(())
    }

    async fn comment(&self, id: ID<Comment>) -> Result<Option<Comment>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .comments
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn edit_comment(&self, comment: &Comment) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.comments.iter_mut().find(|c| c.id() == comment.id()) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn erase_comment(&self, id: ID<Comment>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state
            .comments
            .retain(|c| c.id() != id && c.parent() != Some(id));
        Ok(state.comments.len() < before)
    }

    async fn comments(
        &self,
        post: ID<Post>,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.read().await;
        Ok(state.page(|c| c.post() == post && !c.is_reply(), before, limit))
    }

    async fn replies(
        &self,
        parent: ID<Comment>,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.read().await;
        Ok(state.page(|c| c.parent() == Some(parent), before, limit))
    }

    async fn reply_count(&self, parent: ID<Comment>) -> Result<usize, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.parent() == Some(parent))
            .count())
    }
}

#[async_trait::async_trait]
impl Groups for Memory {
    async fn found(&self, group: &Group) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.groups.contains_key(&group.id()) {
            return Err(StoreError::Conflict);
        }
        state.groups.insert(group.id(), group.clone());
        state.members.push((group.id(), group.leader()));
        Ok(())
    }

    async fn group(&self, id: ID<Group>) -> Result<Option<Group>, StoreError> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn rename(&self, group: &Group) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.groups.get_mut(&group.id()) {
            Some(existing) => {
                *existing = group.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn disband(&self, id: ID<Group>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let removed = state.groups.remove(&id).is_some();
        let posts = state
            .posts
            .values()
            .filter(|p| p.group() == Some(id))
            .map(|p| p.id())
            .collect::<Vec<_>>();
        for post in posts {
            state.drop_post(post);
        }
        state.members.retain(|(g, _)| *g != id);
        state.invitations.retain(|(g, _)| *g != id);
        Ok(removed)
    }

    async fn groups(
        &self,
        member: Option<ID<Member>>,
        search: Option<&str>,
        before: Option<ID<Group>>,
        limit: usize,
    ) -> Result<Vec<Group>, StoreError> {
        let state = self.state.read().await;
        let search = search.map(str::to_lowercase);
        let mut groups = state
            .groups
            .values()
            .filter(|g| member.is_none_or(|m| state.members.contains(&(g.id(), m))))
            .filter(|g| {
                search
                    .as_deref()
                    .is_none_or(|s| g.name().to_lowercase().contains(s))
            })
            .filter(|g| before.is_none_or(|b| g.id() < b))
            .cloned()
            .collect::<Vec<_>>();
        groups.sort_by(|a, b| b.id().cmp(&a.id()));
        groups.truncate(limit);
        Ok(groups)
    }

    async fn members(&self, group: ID<Group>) -> Result<Vec<ID<Member>>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .members
            .iter()
            .filter(|(g, _)| *g == group)
            .map(|(_, m)| *m)
            .collect())
    }

    async fn is_member(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        Ok(self.state.read().await.members.contains(&(group, user)))
    }

    async fn join(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group) {
            return Err(StoreError::Backend(format!("no group {}", group)));
        }
        if state.members.contains(&(group, user)) {
            return Ok(false);
        }
        state.members.push((group, user));
        Ok(true)
    }

    async fn invite(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group) {
            return Err(StoreError::Backend(format!("no group {}", group)));
        }
        if state.invitations.contains(&(group, user)) {
            return Ok(false);
        }
        state.invitations.push((group, user));
        Ok(true)
    }

    async fn uninvite(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.invitations.len();
        state.invitations.retain(|i| *i != (group, user));
        Ok(state.invitations.len() < before)
    }

    async fn invitations(&self, user: ID<Member>) -> Result<Vec<Group>, StoreError> {
        let state = self.state.read().await;
        let mut groups = state
            .invitations
            .iter()
            .filter(|(_, u)| *u == user)
            .filter_map(|(g, _)| state.groups.get(g).cloned())
            .collect::<Vec<_>>();
        groups.sort_by(|a, b| b.id().cmp(&a.id()));
        Ok(groups)
    }
}
