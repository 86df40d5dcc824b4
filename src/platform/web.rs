//! Browser implementations of the clock, ticker handle and scene

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DomRect, Element, HtmlElement};

use crate::sim::{Frame, Geometry, Presenter};

/// Class toggled on the hull while the crash animation plays
pub const CRASH_CLASS: &str = "ship-inner--crash";

/// Monotonic milliseconds since page load
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// A live `setInterval`. Dropping the handle clears the interval.
pub struct IntervalHandle {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl IntervalHandle {
    pub fn new(period_ms: f64, callback: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = Closure::<dyn FnMut()>::new(callback);
        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period_ms.round().max(1.0) as i32,
        )?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
    }
}

/// The scene's DOM elements.
///
/// Expects `#ship` (whole hull wrapper, holding `.ship-inner`),
/// `#ship-split` (the two halves) and `#iceberg`. `#status` is optional.
pub struct DomScene {
    ship: HtmlElement,
    hull: Element,
    split: HtmlElement,
    iceberg: Element,
    status: Option<Element>,
}

impl DomScene {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        let ship: HtmlElement = by_id(document, "ship")?.dyn_into()?;
        let hull = ship
            .query_selector(".ship-inner")?
            .ok_or_else(|| JsValue::from_str("#ship has no .ship-inner"))?;
        let split: HtmlElement = by_id(document, "ship-split")?.dyn_into()?;
        let iceberg = by_id(document, "iceberg")?;
        let status = document.get_element_by_id("status");

        Ok(Self {
            ship,
            hull,
            split,
            iceberg,
            status,
        })
    }

    /// Element that fires `animationend` when the crash finishes
    pub fn hull(&self) -> &Element {
        &self.hull
    }
}

fn by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

/// A zero-sized rect means the element is not laid out (or hidden)
fn laid_out(rect: DomRect) -> Option<DomRect> {
    (rect.width() > 0.0 || rect.height() > 0.0).then_some(rect)
}

impl Geometry for DomScene {
    fn ship_right_edge(&self) -> Option<f64> {
        laid_out(self.ship.get_bounding_client_rect()).map(|r| r.right())
    }

    fn iceberg_left_edge(&self) -> Option<f64> {
        laid_out(self.iceberg.get_bounding_client_rect()).map(|r| r.left())
    }
}

impl Presenter for DomScene {
    fn present(&mut self, frame: Frame) {
        let transform = format!("translateX({}px)", frame.offset);
        let split = frame.phase.shows_split_hull();

        let _ = self.ship.style().set_property("transform", &transform);
        let _ = self.split.style().set_property("transform", &transform);
        self.ship.set_hidden(split);
        self.split.set_hidden(!split);
        let _ = self
            .hull
            .class_list()
            .toggle_with_force(CRASH_CLASS, frame.phase.plays_crash());

        if let Some(status) = &self.status {
            status.set_text_content(Some(&format!("State: {}", frame.phase)));
        }
    }
}
