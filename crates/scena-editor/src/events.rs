//! Change notifications for the surrounding UI.

use scena_core::{ElementId, Frame};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// The selection changed.
    Select { ids: Vec<ElementId> },
    /// Elements were removed by a user operation.
    Remove { ids: Vec<ElementId> },
    /// Frames were committed (gesture end, property edit, replay).
    Change { changes: Vec<ChangedFrame> },
    /// Inline styles were re-rendered.
    Render { ids: Vec<ElementId> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedFrame {
    pub id: ElementId,
    pub next: Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&EditorEvent)>;

/// Registered observers, notified in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    handlers: Vec<(ObserverId, Observer)>,
}

impl Observers {
    pub fn subscribe(&mut self, handler: impl FnMut(&EditorEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: EditorEvent) {
        for (_, handler) in &mut self.handlers {
            handler(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        let sink = Rc::clone(&seen);
        let id = observers.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));

        observers.emit(EditorEvent::Remove {
            ids: vec![ElementId::intern("ev_a")],
        });
        assert_eq!(seen.borrow().len(), 1);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(EditorEvent::Render { ids: Vec::new() });
        assert_eq!(seen.borrow().len(), 1);
    }
}
