use uuid::Uuid;

use amora_shared::clients::rabbitmq::RabbitMQClient;
use amora_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, user_id: Uuid) {
    let event = Event::new(
        "amora-user",
        routing_keys::USER_PROFILE_UPDATED,
        payloads::ProfileUpdated { user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_PROFILE_UPDATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.updated event");
    }
}

pub async fn publish_account_deleted(rabbitmq: &RabbitMQClient, user_id: Uuid) {
    let event = Event::new(
        "amora-user",
        routing_keys::USER_ACCOUNT_DELETED,
        payloads::AccountDeleted { user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_ACCOUNT_DELETED, &event).await {
        tracing::error!(error = %e, "failed to publish account.deleted event");
    }
}
