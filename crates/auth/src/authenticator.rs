use super::*;
use agora_core::ID;
use agora_core::Unique;
use std::sync::Arc;

/// Credential checks in front of the [`SessionManager`].
pub struct Authenticator {
    users: Arc<dyn CredentialStore>,
    sessions: Arc<SessionManager>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn CredentialStore>, sessions: Arc<SessionManager>) -> Self {
        Self { users, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Signs a member in. Unknown usernames and wrong passwords fail identically,
    /// down to the cost of one Argon2 verification.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Member, TokenPair), AuthError> {
        let found = self
            .users
            .lookup(username)
            .await
            .inspect_err(|e| log::error!("login lookup: {}", e))?;
        let verified = match found {
            Some((member, hashword)) => password::matches(password.to_string(), hashword)
                .await?
                .then_some(member),
            None => {
                password::decoyed(password.to_string()).await?;
                None
            }
        };
        let Some(member) = verified else {
            log::info!("rejected sign in attempt");
            return Err(AuthError::InvalidCredentials);
        };
        let tokens = self.sessions.issue(member.id()).await?;
        log::info!("member {} signed in", member.id());
        Ok((member, tokens))
    }

    pub async fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<Member, AuthError> {
        validation::registration(name, username, password)?;
        if self.users.exists(username).await? {
            return Err(AuthError::AlreadyExists);
        }
        let hashword = password::hashed(password.to_string()).await?;
        let member = Member::new(
            ID::default(),
            name.to_string(),
            username.to_string(),
            Role::default(),
        );
        self.users
            .create(&member, &hashword)
            .await
            .inspect_err(|e| log::warn!("register {}: {}", username, e))?;
        log::info!("registered member {}", member.id());
        Ok(member)
    }

    /// Replaces the password, ends every session of the member, and opens a fresh
    /// one for the device that asked.
    pub async fn change_password(
        &self,
        member: &Member,
        current: &str,
        next: &str,
    ) -> Result<TokenPair, AuthError> {
        validation::password(next)?;
        let Some((_, hashword)) = self.users.lookup(member.username()).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !password::matches(current.to_string(), hashword).await? {
            return Err(AuthError::InvalidCredentials);
        }
        let hashword = password::hashed(next.to_string()).await?;
        self.users.rehash(member.id(), &hashword).await?;
        self.sessions.revoke_all(member.id()).await?;
        self.sessions.issue(member.id()).await
    }

    pub async fn edit(&self, member: &Member, profile: Profile) -> Result<Member, AuthError> {
        validation::profile(&profile.name, &profile.username, profile.bio.as_deref())?;
        if profile.username != member.username() && self.users.exists(&profile.username).await? {
            return Err(AuthError::AlreadyExists);
        }
        let edited = Member::new(member.id(), profile.name, profile.username, member.role())
            .with_profile(profile.bio, profile.avatar);
        self.users.edit(&edited).await?;
        Ok(edited)
    }

    pub async fn profile(&self, username: &str) -> Result<Option<Member>, AuthError> {
        Ok(self.users.lookup(username).await?.map(|(member, _)| member))
    }

    pub async fn find(&self, id: ID<Member>) -> Result<Option<Member>, AuthError> {
        Ok(self.users.find(id).await?)
    }

    /// Candidates for an `@mention`, the leading `@` being optional.
    pub async fn mention(&self, caller: &Member, fragment: &str) -> Result<Vec<Member>, AuthError> {
        let fragment = fragment.strip_prefix('@').unwrap_or(fragment);
        Ok(self
            .users
            .search(fragment, caller.id(), agora_core::MENTION_LIMIT)
            .await?)
    }

    pub async fn invite(&self, caller: &Member, fragment: &str) -> Result<Vec<Member>, AuthError> {
        Ok(self
            .users
            .search(fragment, caller.id(), agora_core::INVITE_LIMIT)
            .await?)
    }
}
