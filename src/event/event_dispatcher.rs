use crate::sync::Mutex;
use crate::{Async, Event};
use std::any::{Any, TypeId};

type Handler = dyn for<'a> FnMut(&'a mut dyn Any) -> Async<'a, ()> + Send;

fn handler<F>(f: F) -> Box<Handler>
where
    F: for<'a> FnMut(&'a mut dyn Any) -> Async<'a, ()> + Send + 'static,
{
    Box::new(f)
}

struct Listener {
    event: TypeId,
    handler: Box<Handler>,
}

/// Dispatches typed events to the listeners registered for their type.
///
/// Listeners are called in registration order and awaited one at a time.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Mutex<Vec<Listener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_listener<Ev>(&self, mut action: impl FnMut(&mut Ev) + Send + 'static)
    where
        Ev: Event,
    {
        self.listeners.lock().await.push(Listener {
            event: Ev::event_type(),
            handler: handler(move |ev| {
                if let Some(ev) = ev.downcast_mut::<Ev>() {
                    action(ev);
                }

                Box::pin(async {})
            }),
        });
    }

    pub async fn add_async_listener<Ev, F>(&self, mut action: F)
    where
        Ev: Event,
        F: for<'a> FnMut(&'a mut Ev) -> Async<'a, ()> + Send + 'static,
    {
        self.listeners.lock().await.push(Listener {
            event: Ev::event_type(),
            handler: handler(move |ev| match ev.downcast_mut::<Ev>() {
                Some(ev) => action(ev),
                None => Box::pin(async {}),
            }),
        });
    }

    pub async fn dispatch<Ev>(&self, ev: &mut Ev)
    where
        Ev: Event,
    {
        let mut listeners = self.listeners.lock().await;
        for listener in listeners.iter_mut() {
            if listener.event == Ev::event_type() {
                (listener.handler)(&mut *ev as &mut dyn Any).await;
            }
        }
    }
}
