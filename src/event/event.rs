use std::any::{Any, TypeId};

pub trait Event: Any + Send {
    fn event_type() -> TypeId
    where
        Self: Sized,
    {
        TypeId::of::<Self>()
    }
}
