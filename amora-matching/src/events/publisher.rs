use uuid::Uuid;

use amora_shared::clients::rabbitmq::RabbitMQClient;
use amora_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_like_created(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    liker_id: Uuid,
    liked_id: Uuid,
) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCHING_LIKE_CREATED,
        payloads::LikeCreated {
            match_id,
            liker_id,
            liked_id,
        },
    )
    .with_user(liker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_LIKE_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish like.created event");
    }
}

pub async fn publish_match_created(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_lo: Uuid,
    user_hi: Uuid,
) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCHING_MATCH_CREATED,
        payloads::MatchCreated {
            match_id,
            user_lo,
            user_hi,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_match_ended(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    ended_by: Uuid,
    other_user_id: Uuid,
) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCHING_MATCH_ENDED,
        payloads::MatchEnded {
            match_id,
            ended_by,
            other_user_id,
        },
    )
    .with_user(ended_by);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_ENDED, &event).await {
        tracing::error!(error = %e, "failed to publish match.ended event");
    }
}
