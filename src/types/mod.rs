pub use self::push::{
    Claims, PushData, PushHeader, PushTarget, SubscriptionData,
    SubscriptionKeys, Urgency, PUSH_TYPES,
};

mod push;
