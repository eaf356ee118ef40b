use uuid::Uuid;

use amora_shared::clients::rabbitmq::RabbitMQClient;
use amora_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_user_registered(rabbitmq: &RabbitMQClient, user_id: Uuid, username: &str) {
    let event = Event::new(
        "amora-auth",
        routing_keys::AUTH_USER_REGISTERED,
        payloads::UserRegistered {
            user_id,
            username: username.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::AUTH_USER_REGISTERED, &event).await {
        tracing::error!(error = %e, "failed to publish user.registered event");
    }
}
