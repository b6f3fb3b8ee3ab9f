//! Composable authorization guards.
//!
//! Each guard consumes a context and either rejects it or hands on a narrower
//! one. [`Authenticated`] turns a [`Context`] into an [`Authed`], whose user is
//! always present, and [`RoleRestricted`] only accepts an [`Authed`]. Applying a
//! role check to an unauthenticated context therefore does not compile.
use super::*;
use std::marker::PhantomData;

pub trait Guard<I> {
    type Output;
    fn check(&self, input: I) -> Result<Self::Output, Rejection>;
    fn then<G>(self, next: G) -> Chain<I, Self, G>
    where
        Self: Sized,
        G: Guard<Self::Output>,
    {
        Chain {
            first: self,
            second: next,
            input: PhantomData,
        }
    }
}

/// Two guards run in order. The second never sees a rejected input.
pub struct Chain<I, A, B> {
    first: A,
    second: B,
    input: PhantomData<fn(I)>,
}

impl<I, A, B> Guard<I> for Chain<I, A, B>
where
    A: Guard<I>,
    B: Guard<A::Output>,
{
    type Output = B::Output;
    fn check(&self, input: I) -> Result<Self::Output, Rejection> {
        self.first
            .check(input)
            .and_then(|mid| self.second.check(mid))
    }
}

/// Context whose user is known to be signed in.
#[derive(Debug, Clone)]
pub struct Authed<R> {
    user: Member,
    locale: Locale,
    request: R,
}

impl<R> Authed<R> {
    pub fn user(&self) -> &Member {
        &self.user
    }
    pub fn locale(&self) -> Locale {
        self.locale
    }
    pub fn request(&self) -> &R {
        &self.request
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl<R> Guard<Context<R>> for Authenticated {
    type Output = Authed<R>;
    fn check(&self, context: Context<R>) -> Result<Authed<R>, Rejection> {
        match context.into_parts() {
            (Some(user), locale, request) => Ok(Authed {
                user,
                locale,
                request,
            }),
            (None, _, _) => Err(Rejection::Unauthenticated),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoleRestricted(pub Role);

impl<R> Guard<Authed<R>> for RoleRestricted {
    type Output = Authed<R>;
    fn check(&self, authed: Authed<R>) -> Result<Authed<R>, Rejection> {
        match authed.user.role() == self.0 {
            true => Ok(authed),
            false => Err(Rejection::Unauthorized),
        }
    }
}

pub const fn authenticated() -> Authenticated {
    Authenticated
}

pub const fn role_restricted(role: Role) -> RoleRestricted {
    RoleRestricted(role)
}
