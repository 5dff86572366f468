//! Publish/subscribe update engine
//!
//! Every entity owns an [`UpdateManager`]. Mutations publish a
//! [`Notification`] tagged with what changed; the [`Dispatcher`] delivers it
//! asynchronously to each registered [`Subscriber`] whose declared interests
//! intersect the tags.

mod dispatch;
mod manager;
mod subscription;

pub use dispatch::{DispatchStats, Dispatcher};
pub use manager::UpdateManager;
pub use subscription::{Notification, Subscriber, SubscriptionSet, SubscriptionType};
