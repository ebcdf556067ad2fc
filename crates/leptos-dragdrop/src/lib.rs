//! Leptos DragDrop Utilities
//!
//! Mouse-driven drag-and-drop for card grids. A press only turns into a
//! drag after the pointer moves past a small threshold, so plain clicks on
//! a card still reach its buttons.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// Whether the pointer travelled far enough from the press to count as a drag
pub fn exceeds_threshold(start: (i32, i32), current: (i32, i32)) -> bool {
    (current.0 - start.0).abs() > DRAG_THRESHOLD_PX || (current.1 - start.1).abs() > DRAG_THRESHOLD_PX
}

/// DnD state signals, keyed by the draggable's id
pub struct DndSignals<T: Send + Sync + 'static> {
    pub dragging: RwSignal<Option<T>>,
    /// Card currently under the pointer while dragging
    pub over: RwSignal<Option<T>>,
    /// Pressed but not yet moved past the threshold
    pub pending: RwSignal<Option<T>>,
    pub start: RwSignal<(i32, i32)>,
    /// True briefly after a drop, to swallow the trailing click
    pub just_ended: RwSignal<bool>,
}

impl<T: Send + Sync + 'static> Clone for DndSignals<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for DndSignals<T> {}

impl<T> DndSignals<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            dragging: RwSignal::new(None),
            over: RwSignal::new(None),
            pending: RwSignal::new(None),
            start: RwSignal::new((0, 0)),
            just_ended: RwSignal::new(false),
        }
    }

    pub fn is_dragging(&self, id: &T) -> bool {
        self.dragging.with(|d| d.as_ref() == Some(id))
    }

    pub fn is_over(&self, id: &T) -> bool {
        self.over.with(|o| o.as_ref() == Some(id))
    }

    /// End drag operation
    pub fn end(&self) {
        self.dragging.set(None);
        self.over.set(None);
        self.pending.set(None);
        self.just_ended.set(true);

        if let Some(win) = web_sys::window() {
            let clear = self.just_ended;
            let cb = Closure::<dyn FnMut()>::new(move || {
                clear.try_set(false);
            });
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
            cb.forget();
        }
    }
}

impl<T> Default for DndSignals<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Mousedown on a card records a pending drag
pub fn make_on_mousedown<T>(dnd: DndSignals<T>, id: T) -> impl Fn(web_sys::MouseEvent) + Clone + 'static
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlAnchorElement>().is_some()
            {
                return;
            }
        }
        dnd.pending.set(Some(id.clone()));
        dnd.start.set((ev.client_x(), ev.client_y()));
    }
}

/// Mouseenter on a card makes it the drop target (never the dragged card itself)
pub fn make_on_mouseenter<T>(dnd: DndSignals<T>, id: T) -> impl Fn(web_sys::MouseEvent) + Clone + 'static
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging.get_untracked();
        if let Some(dragging) = dragging {
            if dragging != id {
                dnd.over.set(Some(id.clone()));
            }
        }
    }
}

pub fn make_on_mouseleave<T>(dnd: DndSignals<T>) -> impl Fn(web_sys::MouseEvent) + Clone + 'static
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging.with_untracked(Option::is_some) {
            dnd.over.set(None);
        }
    }
}

/// Document-level listeners; removed again when dropped
#[must_use = "listeners are removed as soon as this is dropped"]
pub struct GlobalListeners {
    mousemove: Closure<dyn FnMut(web_sys::MouseEvent)>,
    mouseup: Closure<dyn FnMut(web_sys::MouseEvent)>,
}

impl Drop for GlobalListeners {
    fn drop(&mut self) {
        if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
            let _ = doc.remove_event_listener_with_callback("mousemove", self.mousemove.as_ref().unchecked_ref());
            let _ = doc.remove_event_listener_with_callback("mouseup", self.mouseup.as_ref().unchecked_ref());
        }
    }
}

/// Bind the document-level mousemove/mouseup pair. `on_drop(dragged, target)`
/// fires only when a real drag ends over another card.
pub fn bind_global_mouseup<T, F>(dnd: DndSignals<T>, on_drop: F) -> GlobalListeners
where
    T: Clone + PartialEq + Send + Sync + 'static,
    F: Fn(T, T) + 'static,
{
    let mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending.try_get_untracked().flatten() else {
            return;
        };
        if dnd.dragging.try_with_untracked(Option::is_none).unwrap_or(false)
            && exceeds_threshold(dnd.start.get_untracked(), (ev.client_x(), ev.client_y()))
        {
            dnd.dragging.set(Some(pending));
        }
    });

    let mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let Some(dragged) = dnd.dragging.try_get_untracked() else {
            return;
        };
        let target = dnd.over.get_untracked();
        dnd.pending.set(None);

        match (dragged, target) {
            (Some(dragged), Some(target)) => {
                dnd.end();
                on_drop(dragged, target);
            }
            (Some(_), None) => dnd.end(),
            // Plain click: leave just_ended alone so the click goes through
            (None, _) => {}
        }
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref());
        let _ = doc.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref());
    }

    GlobalListeners { mousemove, mouseup }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_jitter_is_a_click() {
        assert!(!exceeds_threshold((100, 100), (103, 95)));
        assert!(!exceeds_threshold((0, 0), (5, -5)));
    }

    #[test]
    fn test_either_axis_starts_drag() {
        assert!(exceeds_threshold((0, 0), (6, 0)));
        assert!(exceeds_threshold((0, 0), (0, -6)));
    }
}
