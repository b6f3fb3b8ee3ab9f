use super::*;
use agora_auth::FieldError;
use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub leader: Byline,
    pub members: usize,
    pub already_member: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    pub groups: Vec<GroupView>,
    pub next_cursor: Option<uuid::Uuid>,
    pub has_next_page: bool,
}

/// Name, description and first invitees of a new group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charter {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub invited_username: Vec<String>,
}

fn charter(name: &str, description: &str) -> Result<(), ForumError> {
    let errors = [
        agora_auth::validation::bounded("name", name, agora_core::GROUP_MIN, agora_core::GROUP_MAX),
        agora_auth::validation::bounded(
            "description",
            description,
            agora_core::GROUP_MIN,
            agora_core::GROUP_MAX,
        ),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();
    match errors.is_empty() {
        true => Ok(()),
        false => Err(ForumError::Invalid(errors)),
    }
}

impl Forum {
    /// Groups `user` belongs to.
    pub async fn joined(
        &self,
        user: &Member,
        cursor: Option<ID<Group>>,
    ) -> Result<GroupPage, ForumError> {
        self.group_page(user, Some(user.id()), None, cursor).await
    }

    /// Every group, optionally narrowed by a name fragment.
    pub async fn directory(
        &self,
        user: &Member,
        search: Option<&str>,
        cursor: Option<ID<Group>>,
    ) -> Result<GroupPage, ForumError> {
        self.group_page(user, None, search, cursor).await
    }

    /// Creates a group led by `leader` and invites the named members.
    pub async fn found(&self, leader: &Member, charter: Charter) -> Result<GroupView, ForumError> {
        self::charter(&charter.name, &charter.description)?;
        let group = Group::new(ID::default(), charter.name, charter.description, leader.id());
        self.board.found(&group).await?;
        let invited = self.invite_all(&group, &charter.invited_username).await?;
        log::info!(
            "member {} founded group {} with {} invitations",
            leader.id(),
            group.id(),
            invited
        );
        self.group_view(leader, group).await
    }

    pub async fn rename_group(
        &self,
        caller: &Member,
        id: ID<Group>,
        name: String,
        description: String,
    ) -> Result<GroupView, ForumError> {
        charter(&name, &description)?;
        let group = self.led(caller, id).await?.renamed(name, description);
        if !self.board.rename(&group).await? {
            return Err(ForumError::NotFound);
        }
        self.group_view(caller, group).await
    }

    /// Leader only. The group's posts go with it.
    pub async fn disband(&self, caller: &Member, id: ID<Group>) -> Result<(), ForumError> {
        self.led(caller, id).await?;
        match self.board.disband(id).await? {
            true => {
                log::info!("member {} disbanded group {}", caller.id(), id);
                Ok(())
            }
            false => Err(ForumError::NotFound),
        }
    }

    /// Leader only. Returns how many new invitations were sent.
    pub async fn invite(
        &self,
        caller: &Member,
        id: ID<Group>,
        usernames: &[String],
    ) -> Result<usize, ForumError> {
        if usernames.iter().all(|u| u.trim().is_empty()) {
            return Err(ForumError::Invalid(vec![FieldError::new(
                "invitedUsername",
                "at least one username is required",
            )]));
        }
        let group = self.led(caller, id).await?;
        self.invite_all(&group, usernames).await
    }

    pub async fn invitations(&self, user: &Member) -> Result<Vec<GroupView>, ForumError> {
        let mut views = Vec::new();
        for group in self.board.invitations(user.id()).await? {
            views.push(self.group_view(user, group).await?);
        }
        Ok(views)
    }

    pub async fn accept(&self, user: &Member, id: ID<Group>) -> Result<GroupView, ForumError> {
        let group = self.board.group(id).await?.ok_or(ForumError::NotFound)?;
        if !self.board.uninvite(id, user.id()).await? {
            return Err(ForumError::NotFound);
        }
        self.board.join(id, user.id()).await?;
        log::info!("member {} joined group {}", user.id(), id);
        self.group_view(user, group).await
    }

    pub async fn decline(&self, user: &Member, id: ID<Group>) -> Result<(), ForumError> {
        match self.board.uninvite(id, user.id()).await? {
            true => Ok(()),
            false => Err(ForumError::NotFound),
        }
    }

    /// Members in joining order, the leader first.
    pub async fn members(&self, user: &Member, id: ID<Group>) -> Result<Vec<Byline>, ForumError> {
        self.enter(user, id).await?;
        let mut bylines = Vec::new();
        for member in self.board.members(id).await? {
            bylines.push(self.byline(member).await?);
        }
        Ok(bylines)
    }

    pub async fn group_posts(
        &self,
        user: &Member,
        id: ID<Group>,
        tags: &[i32],
    ) -> Result<Vec<PostView>, ForumError> {
        self.enter(user, id).await?;
        self.views(self.board.grouped(id, tags).await?).await
    }

    pub async fn group_tags(
        &self,
        user: &Member,
        id: ID<Group>,
        name: Option<&str>,
        cursor: Option<i32>,
    ) -> Result<TagPage, ForumError> {
        self.enter(user, id).await?;
        self.tag_page(Some(id), name, cursor).await
    }

    /// Publishes into a group. Mentions reach group members only.
    pub async fn post_in(
        &self,
        author: &Member,
        id: ID<Group>,
        draft: Draft,
    ) -> Result<PostView, ForumError> {
        self.enter(author, id).await?;
        self.publish(author, draft, Some(id)).await
    }

    /// Reports a post of the group; posts elsewhere are `NotFound`.
    pub async fn report_in(
        &self,
        reporter: &Member,
        id: ID<Group>,
        post: ID<Post>,
        reason: Option<String>,
    ) -> Result<(), ForumError> {
        self.enter(reporter, id).await?;
        match self.board.post(post).await? {
            Some(p) if p.group() == Some(id) => self.report(reporter, post, reason).await,
            _ => Err(ForumError::NotFound),
        }
    }

    /// The group, if `user` is one of its members.
    async fn enter(&self, user: &Member, id: ID<Group>) -> Result<Group, ForumError> {
        let group = self.board.group(id).await?.ok_or(ForumError::NotFound)?;
        match self.board.is_member(id, user.id()).await? {
            true => Ok(group),
            false => Err(ForumError::NotMember),
        }
    }

    /// The group, if `user` leads it.
    async fn led(&self, user: &Member, id: ID<Group>) -> Result<Group, ForumError> {
        let group = self.board.group(id).await?.ok_or(ForumError::NotFound)?;
        match group.leader() == user.id() {
            true => Ok(group),
            false => Err(ForumError::NotOwner),
        }
    }

    /// Unknown usernames and existing members are skipped.
    async fn invite_all(&self, group: &Group, usernames: &[String]) -> Result<usize, ForumError> {
        let mut invited = 0;
        for username in usernames.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            let Some((member, _)) = self.users.lookup(username).await? else {
                continue;
            };
            if self.board.is_member(group.id(), member.id()).await? {
                continue;
            }
            if self.board.invite(group.id(), member.id()).await? {
                invited += 1;
            }
        }
        Ok(invited)
    }

    async fn group_page(
        &self,
        user: &Member,
        member: Option<ID<Member>>,
        search: Option<&str>,
        cursor: Option<ID<Group>>,
    ) -> Result<GroupPage, ForumError> {
        let size = agora_core::GROUP_PAGE;
        let mut rows = self.board.groups(member, search, cursor, size + 1).await?;
        let has_next_page = rows.len() > size;
        rows.truncate(size);
        let next_cursor = has_next_page
            .then(|| rows.last().map(|g| g.id().inner()))
            .flatten();
        let mut groups = Vec::with_capacity(rows.len());
        for group in rows {
            groups.push(self.group_view(user, group).await?);
        }
        Ok(GroupPage {
            groups,
            next_cursor,
            has_next_page,
        })
    }

    async fn group_view(&self, viewer: &Member, group: Group) -> Result<GroupView, ForumError> {
        let members = self.board.members(group.id()).await?;
        Ok(GroupView {
            id: group.id().inner(),
            leader: self.byline(group.leader()).await?,
            already_member: members.contains(&viewer.id()),
            members: members.len(),
            name: group.name().to_string(),
            description: group.description().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_auth::CredentialStore;
    use agora_auth::Role;
    use std::sync::Arc;

    struct Fixture {
        forum: Forum,
        alice: Member,
        bob: Member,
        carol: Member,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(agora_auth::Memory::default());
        let alice = Member::new(ID::default(), "Alice".into(), "alice".into(), Role::Member);
        let bob = Member::new(ID::default(), "Bobby".into(), "bobby".into(), Role::Member);
        let carol = Member::new(ID::default(), "Carol".into(), "carol".into(), Role::Member);
        for m in [&alice, &bob, &carol] {
            users.create(m, "h").await.unwrap();
        }
        let forum = Forum::new(Arc::new(Memory::default()), users);
        Fixture {
            forum,
            alice,
            bob,
            carol,
        }
    }

    fn charter(invited: &[&str]) -> Charter {
        Charter {
            name: "Rust Club".into(),
            description: "crabs only".into(),
            invited_username: invited.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn draft(content: &str) -> Draft {
        Draft {
            content: content.into(),
            tags: vec!["crab".into()],
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn founding_invites_and_accepting_joins() {
        let f = fixture().await;
        let view = f
            .forum
            .found(&f.alice, charter(&["bobby", "nobody", "alice"]))
            .await
            .unwrap();
        assert_eq!(view.members, 1);
        assert!(view.already_member);
        assert_eq!(view.leader.username, "alice");
        let group = ID::from(view.id);
        let pending = f.forum.invitations(&f.bob).await.unwrap();
        assert_eq!(pending.iter().map(|g| g.id).collect::<Vec<_>>(), [view.id]);
        assert!(!pending[0].already_member);
        let joined = f.forum.accept(&f.bob, group).await.unwrap();
        assert_eq!(joined.members, 2);
        assert_eq!(f.forum.accept(&f.bob, group).await, Err(ForumError::NotFound));
        let members = f.forum.members(&f.bob, group).await.unwrap();
        assert_eq!(
            members.iter().map(|b| b.username.as_str()).collect::<Vec<_>>(),
            ["alice", "bobby"]
        );
        assert_eq!(f.forum.joined(&f.bob, None).await.unwrap().groups.len(), 1);
    }

    #[tokio::test]
    async fn declining_drops_the_invitation() {
        let f = fixture().await;
        let view = f.forum.found(&f.alice, charter(&["carol"])).await.unwrap();
        let group = ID::from(view.id);
        assert_eq!(f.forum.decline(&f.carol, group).await, Ok(()));
        assert_eq!(f.forum.decline(&f.carol, group).await, Err(ForumError::NotFound));
        assert_eq!(f.forum.accept(&f.carol, group).await, Err(ForumError::NotFound));
    }

    #[tokio::test]
    async fn leaders_manage_and_others_cannot() {
        let f = fixture().await;
        let group = ID::from(f.forum.found(&f.alice, charter(&[])).await.unwrap().id);
        let (name, description) = ("Crab Club".to_string(), "pinchy".to_string());
        assert_eq!(
            f.forum
                .rename_group(&f.bob, group, name.clone(), description.clone())
                .await,
            Err(ForumError::NotOwner)
        );
        let renamed = f.forum.rename_group(&f.alice, group, name, description).await;
        assert_eq!(renamed.unwrap().name, "Crab Club");
        let none: &[String] = &[];
        assert!(matches!(
            f.forum.invite(&f.alice, group, none).await,
            Err(ForumError::Invalid(_))
        ));
        let names = vec!["carol".to_string()];
        assert_eq!(f.forum.invite(&f.bob, group, &names).await, Err(ForumError::NotOwner));
        assert_eq!(f.forum.invite(&f.alice, group, &names).await, Ok(1));
        assert_eq!(f.forum.invite(&f.alice, group, &names).await, Ok(0));
        assert_eq!(f.forum.disband(&f.bob, group).await, Err(ForumError::NotOwner));
        assert_eq!(f.forum.disband(&f.alice, group).await, Ok(()));
        assert!(f.forum.invitations(&f.carol).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn charters_are_validated() {
        let f = fixture().await;
        let short = Charter {
            name: "ab".into(),
            description: "x".into(),
            invited_username: Vec::new(),
        };
        match f.forum.found(&f.alice, short).await {
            Err(ForumError::Invalid(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("expected invalid charter, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn group_content_is_for_members() {
        let f = fixture().await;
        let group = ID::from(f.forum.found(&f.alice, charter(&["bobby"])).await.unwrap().id);
        f.forum.accept(&f.bob, group).await.unwrap();
        let post = f
            .forum
            .post_in(&f.alice, group, draft("inside @bobby @carol"))
            .await
            .unwrap();
        let id = ID::from(post.id);
        assert_eq!(f.forum.unread(&f.bob).await.unwrap(), 1);
        assert_eq!(f.forum.unread(&f.carol).await.unwrap(), 0);
        assert!(f.forum.discussions(&[]).await.unwrap().is_empty());
        assert_eq!(f.forum.group_posts(&f.bob, group, &[]).await.unwrap(), vec![post.clone()]);
        assert_eq!(f.forum.group_posts(&f.carol, group, &[]).await, Err(ForumError::NotMember));
        assert_eq!(
            f.forum.post_in(&f.carol, group, draft("let me in")).await,
            Err(ForumError::NotMember)
        );
        assert_eq!(f.forum.detail(Some(&f.bob), id).await, Ok(post));
        assert_eq!(f.forum.detail(Some(&f.carol), id).await, Err(ForumError::NotMember));
        assert_eq!(f.forum.detail(None, id).await, Err(ForumError::NotFound));
        assert_eq!(
            f.forum.comment(&f.carol, id, "hello".into()).await,
            Err(ForumError::NotMember)
        );
        let tags = f.forum.group_tags(&f.bob, group, None, None).await.unwrap();
        assert_eq!(tags.tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["crab"]);
        assert!(f.forum.tags(None, None).await.unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn group_reports_stay_inside_the_group() {
        let f = fixture().await;
        let group = ID::from(f.forum.found(&f.alice, charter(&["bobby"])).await.unwrap().id);
        f.forum.accept(&f.bob, group).await.unwrap();
        let inside = ID::from(f.forum.post_in(&f.alice, group, draft("in")).await.unwrap().id);
        let outside = ID::from(f.forum.create(&f.alice, draft("out")).await.unwrap().id);
        assert_eq!(f.forum.report_in(&f.bob, group, inside, None).await, Ok(()));
        assert_eq!(
            f.forum.report_in(&f.bob, group, outside, None).await,
            Err(ForumError::NotFound)
        );
        assert_eq!(
            f.forum.report_in(&f.carol, group, inside, None).await,
            Err(ForumError::NotMember)
        );
        assert_eq!(f.forum.reports(inside).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn directory_searches_all_groups() {
        let f = fixture().await;
        f.forum.found(&f.alice, charter(&[])).await.unwrap();
        let other = Charter {
            name: "Go Gophers".into(),
            description: "not crabs".into(),
            invited_username: Vec::new(),
        };
        f.forum.found(&f.bob, other).await.unwrap();
        let all = f.forum.directory(&f.carol, None, None).await.unwrap();
        assert_eq!(all.groups.len(), 2);
        assert!(all.groups.iter().all(|g| !g.already_member));
        let rust = f.forum.directory(&f.carol, Some("rust"), None).await.unwrap();
        assert_eq!(rust.groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(), ["Rust Club"]);
        assert!(!rust.has_next_page);
    }
}
