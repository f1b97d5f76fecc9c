use crate::modules::delivery::fanout::{Channel, DeliveryEvent};

/// Outbound side of the fan-out.
///
/// Publishing is fire-and-forget: implementations log failures and never report them
/// back, so a durable write is never undone by a slow or missing subscriber.
pub trait Publisher: Send + Sync {
    fn publish(&self, channel: Channel, event: DeliveryEvent);

    fn publish_all(&self, channels: &[Channel], event: DeliveryEvent) {
        if let Some((last, rest)) = channels.split_last() {
            for channel in rest {
                self.publish(*channel, event.clone());
            }
            self.publish(*last, event);
        }
    }
}
