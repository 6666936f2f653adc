use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::{Profile, Role};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileEvent {
    Updated { profile: Profile },
    RoleChanged { profile: Profile, previous: Role },
}

impl ProfileEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            ProfileEvent::Updated { profile } | ProfileEvent::RoleChanged { profile, .. } => profile.id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProfileEvent::Updated { .. } => "profile_updated",
            ProfileEvent::RoleChanged { .. } => "role_changed",
        }
    }
}

/// Fan-out of profile row changes to per-user subscribers.
///
/// Each user has one parent cancellation token; every subscription holds a
/// child of it, so `close_user` ends all of that user's streams at once.
/// Entries whose subscriptions have all been dropped are pruned on the next
/// `subscribe`, so the map only grows with users that are listening.
pub struct ProfileEventHub {
    sender: broadcast::Sender<ProfileEvent>,
    users: RwLock<HashMap<Uuid, UserChannel>>,
}

struct UserChannel {
    token: CancellationToken,
    // Each subscription holds a strong ref; none left means nobody listens
    live: Weak<()>,
}

impl ProfileEventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn subscribe(&self, user_id: Uuid) -> ProfileSubscription {
        let (parent, guard) = {
            let mut users = self.users.write().await;
            users.retain(|_, channel| channel.live.strong_count() > 0);

            let existing = users
                .get(&user_id)
                .and_then(|channel| channel.live.upgrade().map(|guard| (channel.token.clone(), guard)));

            match existing {
                Some(pair) => pair,
                None => {
                    let token = CancellationToken::new();
                    let guard = Arc::new(());
                    users.insert(user_id, UserChannel { token: token.clone(), live: Arc::downgrade(&guard) });
                    (token, guard)
                }
            }
        };

        ProfileSubscription {
            user_id,
            receiver: self.sender.subscribe(),
            cancel: parent.child_token(),
            _live: guard,
        }
    }

    /// Users with at least one subscription that has not been dropped.
    pub async fn listening_users(&self) -> usize {
        self.users
            .read()
            .await
            .values()
            .filter(|channel| channel.live.strong_count() > 0)
            .count()
    }

    /// Returns how many subscriptions (of any user) saw the event.
    pub fn publish(&self, event: ProfileEvent) -> usize {
        tracing::debug!("Publishing {} for {}", event.name(), event.user_id());
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    pub async fn close_user(&self, user_id: Uuid) {
        if let Some(channel) = self.users.write().await.remove(&user_id) {
            channel.token.cancel();
            tracing::debug!("Closed profile subscriptions for {}", user_id);
        }
    }
}

impl Default for ProfileEventHub {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ProfileSubscription {
    user_id: Uuid,
    receiver: broadcast::Receiver<ProfileEvent>,
    cancel: CancellationToken,
    _live: Arc<()>,
}

impl ProfileSubscription {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Next event for this user, or `None` once cancelled.
    pub async fn recv(&mut self) -> Option<ProfileEvent> {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                message = self.receiver.recv() => match message {
                    Ok(event) if event.user_id() == self.user_id => return Some(event),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Profile subscription for {} lagged, {} events dropped", self.user_id, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn unsubscribe(self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: Uuid, role: Role) -> Profile {
        Profile {
            id,
            email: "player@example.com".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            phone: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscriber_only_sees_own_events() {
        let hub = ProfileEventHub::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut sub = hub.subscribe(me).await;

        hub.publish(ProfileEvent::Updated { profile: profile(other, Role::Customer) });
        hub.publish(ProfileEvent::RoleChanged { profile: profile(me, Role::TurfOwner), previous: Role::Customer });

        let event = sub.recv().await.expect("event");
        assert_eq!(event.user_id(), me);
        assert_eq!(event.name(), "role_changed");
    }

    #[tokio::test]
    async fn close_user_ends_every_subscription() {
        let hub = ProfileEventHub::new();
        let me = Uuid::new_v4();
        let mut first = hub.subscribe(me).await;
        let mut second = hub.subscribe(me).await;

        hub.close_user(me).await;

        assert!(first.recv().await.is_none());
        assert!(second.recv().await.is_none());
    }

    #[tokio::test]
    async fn unsubscribe_leaves_siblings_running() {
        let hub = ProfileEventHub::new();
        let me = Uuid::new_v4();
        let first = hub.subscribe(me).await;
        let mut second = hub.subscribe(me).await;
        let token = first.cancellation_token();

        first.unsubscribe();
        assert!(token.is_cancelled());

        hub.publish(ProfileEvent::Updated { profile: profile(me, Role::Customer) });
        assert!(second.recv().await.is_some());
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_pruned() {
        let hub = ProfileEventHub::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        let first = hub.subscribe(me).await;
        let second = hub.subscribe(me).await;
        first.unsubscribe();
        assert_eq!(hub.listening_users().await, 1);

        drop(second);
        assert_eq!(hub.listening_users().await, 0);

        let _other = hub.subscribe(other).await;
        assert_eq!(hub.users.read().await.len(), 1);

        // A fresh subscription after pruning gets a working token
        let mut again = hub.subscribe(me).await;
        hub.publish(ProfileEvent::Updated { profile: profile(me, Role::Customer) });
        assert!(again.recv().await.is_some());
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let hub = ProfileEventHub::new();
        assert_eq!(hub.publish(ProfileEvent::Updated { profile: profile(Uuid::new_v4(), Role::Admin) }), 0);
    }
}
