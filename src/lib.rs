pub mod engine;
pub mod overlay;
pub mod sky;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    console, HtmlCanvasElement, MouseEvent, PointerEvent, Request, RequestInit, RequestMode,
    Response, WebGlRenderingContext, WheelEvent,
};

use crate::engine::renderer::Renderer;
use crate::overlay::{InfoPanel, LabelOverlay};
use crate::sky::error::CatalogError;
use crate::sky::picking::DetailUpdate;
use crate::sky::scene;
use crate::sky::star::StarRecord;
use crate::sky::SkyView;

/// Visibility cutoff in parsecs; also the radius of the ecliptic grid.
const VISIBILITY_RADIUS: f32 = 50.0;
const CATALOG_URL: &str = "/assets/stars.json";
/// A press that travels farther than this many pixels is a drag, not a click.
const CLICK_SLOP: i32 = 4;

struct App {
    view: SkyView,
    renderer: Renderer,
    labels: LabelOverlay,
    info: InfoPanel,
    canvas: HtmlCanvasElement,
    press: Option<(i32, i32)>,
}

impl App {
    fn apply_detail(&self, update: DetailUpdate) {
        match update {
            DetailUpdate::Show(index) => self.info.show(&self.view.scene.objects[index].record),
            DetailUpdate::Hide => self.info.hide(),
        }
    }

    fn frame(&mut self) {
        let labels = self.view.frame(&self.renderer);
        for (index, frame) in labels.iter().enumerate() {
            self.labels.apply(index, frame.placement, frame.dimmed);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.renderer.resize(width as i32, height as i32);
        self.view.camera.set_viewport(width, height);
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app(f: impl FnOnce(&mut App)) {
    APP.with(|app| {
        if let Some(app) = app.borrow_mut().as_mut() {
            f(app);
        }
    });
}

#[wasm_bindgen]
pub async fn init_chart() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let canvas = document
        .get_element_by_id("canvas")
        .ok_or("No canvas")?
        .dyn_into::<HtmlCanvasElement>()?;

    let width = window.inner_width()?.as_f64().unwrap_or(800.0) as u32;
    let height = window.inner_height()?.as_f64().unwrap_or(600.0) as u32;
    canvas.set_width(width);
    canvas.set_height(height);

    let gl = canvas
        .get_context("webgl")?
        .ok_or("No WebGL")?
        .dyn_into::<WebGlRenderingContext>()?;
    let renderer = Renderer::new(gl)?;
    renderer.resize(width as i32, height as i32);

    let records = fetch_catalog(&window)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let assembly = scene::assemble(records, VISIBILITY_RADIUS)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    for skipped in &assembly.skipped {
        console::warn_1(&format!("skipping catalog record: {skipped}").into());
    }
    console::log_1(&format!("star chart: {} objects in scene", assembly.scene.len()).into());

    let mut labels = LabelOverlay::new(&document)?;
    labels.build(&document, &assembly.scene, |index| {
        with_app(|app| {
            let update = app.view.label_click(index);
            app.apply_detail(update);
        });
    })?;
    let info = InfoPanel::new(&document)?;

    let view = SkyView::new(assembly.scene, width, height);
    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            view,
            renderer,
            labels,
            info,
            canvas: canvas.clone(),
            press: None,
        })
    });

    // Pointer input: movement feeds hover candidates and the camera drag.
    let move_closure = Closure::wrap(Box::new(move |event: PointerEvent| {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0);
        let ndc_x = (event.client_x() as f64 / w) * 2.0 - 1.0;
        let ndc_y = -(event.client_y() as f64 / h) * 2.0 + 1.0;
        with_app(|app| {
            app.view.set_pointer(ndc_x as f32, ndc_y as f32);
            app.view.camera.drag_to(event.client_x(), event.client_y());
        });
    }) as Box<dyn FnMut(_)>);
    document
        .add_event_listener_with_callback("pointermove", move_closure.as_ref().unchecked_ref())?;
    move_closure.forget();

    let down_closure = Closure::wrap(Box::new(move |event: PointerEvent| {
        with_app(|app| {
            app.press = Some((event.client_x(), event.client_y()));
            app.view.camera.begin_drag(event.client_x(), event.client_y());
        });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("pointerdown", down_closure.as_ref().unchecked_ref())?;
    down_closure.forget();

    let up_closure = Closure::wrap(Box::new(move |_event: PointerEvent| {
        with_app(|app| app.view.camera.end_drag());
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("pointerup", up_closure.as_ref().unchecked_ref())?;
    up_closure.forget();

    // A click that did not travel resolves a selection; label clicks stop
    // propagation and never reach this handler.
    let click_closure = Closure::wrap(Box::new(move |event: MouseEvent| {
        with_app(|app| {
            let stationary = app.press.map_or(false, |(x, y)| {
                (event.client_x() - x).abs() <= CLICK_SLOP
                    && (event.client_y() - y).abs() <= CLICK_SLOP
            });
            app.press = None;
            if stationary {
                let update = app.view.click();
                app.apply_detail(update);
            }
        });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
    click_closure.forget();

    let wheel_closure = Closure::wrap(Box::new(move |event: WheelEvent| {
        event.prevent_default();
        with_app(|app| app.view.camera.zoom(event.delta_y() as f32));
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("wheel", wheel_closure.as_ref().unchecked_ref())?;
    wheel_closure.forget();

    let resize_closure = Closure::wrap(Box::new(move || {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0) as u32;
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0) as u32;
        with_app(|app| app.resize(width, height));
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();

    // Frame loop.
    let f = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        with_app(|app| app.frame());
        if let Some(callback) = f.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback);
    }

    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    if let Some(window) = web_sys::window() {
        window
            .request_animation_frame(f.as_ref().unchecked_ref())
            .ok();
    }
}

async fn fetch_catalog(window: &web_sys::Window) -> Result<Vec<StarRecord>, CatalogError> {
    let fetch = |e: JsValue| CatalogError::Fetch(format!("{e:?}"));

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(CATALOG_URL, &opts).map_err(fetch)?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(fetch)?;
    let resp: Response = resp_value.dyn_into().map_err(|_| {
        CatalogError::Fetch("response is not a Response".to_string())
    })?;
    if !resp.ok() {
        return Err(CatalogError::Fetch(format!("HTTP {}", resp.status())));
    }

    let json = JsFuture::from(resp.json().map_err(fetch)?)
        .await
        .map_err(fetch)?;
    serde_wasm_bindgen::from_value(json).map_err(|e| CatalogError::Fetch(e.to_string()))
}
