//! DOM glue: the entity model is DOM-free, these adapters own every
//! on-screen overlay element and apply state the core hands them.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use crate::sky::label::LabelPlacement;
use crate::sky::scene::Scene;
use crate::sky::star::StarRecord;

const PARSECS_TO_LIGHT_YEARS: f32 = 3.2615637;

/// One absolutely positioned `<div>` per object, stacked by z-index.
pub struct LabelOverlay {
    container: Element,
    labels: Vec<HtmlElement>,
}

impl LabelOverlay {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let container = document
            .get_element_by_id("labels")
            .ok_or("No #labels container")?;
        Ok(LabelOverlay {
            container,
            labels: Vec::new(),
        })
    }

    /// Creates one label element per scene object. `on_click` receives the
    /// owning object's index; the click never reaches the canvas handler.
    pub fn build<F>(&mut self, document: &Document, scene: &Scene, on_click: F) -> Result<(), JsValue>
    where
        F: Fn(usize) + Clone + 'static,
    {
        self.clear();

        for (index, obj) in scene.objects.iter().enumerate() {
            let element: HtmlElement = document.create_element("div")?.dyn_into()?;
            element.set_class_name("star-label hidden");
            element.set_text_content(Some(obj.record.display_name()));

            let handler = on_click.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                // The object's own label consumes the click.
                event.stop_propagation();
                handler(index);
            }) as Box<dyn FnMut(_)>);
            element
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();

            self.container.append_child(&element)?;
            self.labels.push(element);
        }
        Ok(())
    }

    /// Applies one frame's projection result to a label element.
    pub fn apply(&self, index: usize, placement: Option<LabelPlacement>, dimmed: bool) {
        let Some(element) = self.labels.get(index) else {
            return;
        };
        match placement {
            Some(p) => {
                let style = element.style();
                style.set_property("left", &format!("{}px", p.x)).ok();
                style.set_property("top", &format!("{}px", p.y)).ok();
                style.set_property("z-index", &p.priority.to_string()).ok();
                element.class_list().remove_1("hidden").ok();
                if dimmed {
                    element.class_list().add_1("dimmed").ok();
                } else {
                    element.class_list().remove_1("dimmed").ok();
                }
            }
            None => {
                element.class_list().add_1("hidden").ok();
            }
        }
    }

    pub fn clear(&mut self) {
        for element in self.labels.drain(..) {
            element.remove();
        }
    }
}

/// Template-substituting detail panel, hidden until a selection exists.
pub struct InfoPanel {
    container: Element,
    template: String,
}

impl InfoPanel {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let container = document.get_element_by_id("info").ok_or("No #info panel")?;
        let template = container.inner_html();
        Ok(InfoPanel { container, template })
    }

    pub fn show(&self, record: &StarRecord) {
        let ly = (record.distance * PARSECS_TO_LIGHT_YEARS * 100.0).round() / 100.0;
        let distance = format!("{} pc / {} ly", record.distance, ly);

        let html = self
            .template
            .replace("{{ name }}", record.display_name())
            .replace("{{ type }}", &record.classification)
            .replace("{{ spectral }}", &record.spectral)
            .replace("{{ distance }}", &distance);

        self.container.set_inner_html(&html);
        self.container.class_list().remove_1("hidden").ok();
    }

    pub fn hide(&self) {
        self.container.class_list().add_1("hidden").ok();
    }
}
