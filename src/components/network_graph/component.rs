//! Leptos component wrapping the network graph canvas.
//!
//! The component creates an HTML canvas element and forwards mouse/wheel
//! events to [`NetworkGraphState`] with `performance.now()` timestamps. A
//! `requestAnimationFrame` loop hands each frame timestamp to the state, which
//! decides whether to tick and draw.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::perf::PerformanceOverride;
use super::render;
use super::state::{GraphNotification, NetworkGraphState};
use super::theme::Theme;
use super::types::{NetworkData, NetworkEdge, NetworkNode};

/// Milliseconds on the same clock as `requestAnimationFrame` timestamps.
fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Outbound callbacks, cheap to copy into every handler.
#[derive(Clone, Copy)]
struct Listeners {
	on_node_selected: Option<Callback<Option<NetworkNode>>>,
	on_edge_hovered: Option<Callback<Option<NetworkEdge>>>,
}

impl Listeners {
	fn dispatch(&self, notifications: Vec<GraphNotification>) {
		for notification in notifications {
			match notification {
				GraphNotification::NodeSelected(node) => {
					if let Some(cb) = self.on_node_selected {
						cb.run(node);
					}
				}
				GraphNotification::EdgeHovered(edge) => {
					if let Some(cb) = self.on_edge_hovered {
						cb.run(edge);
					}
				}
			}
		}
	}
}

/// Renders an interactive, budgeted network graph on a canvas element.
///
/// Pass the dataset via the reactive `data` signal. Each new value replaces
/// the dataset and re-selects the performance tier; with `refinement = true`
/// new values are treated as filtered views of the same dataset and keep the
/// tier chosen at mount. `performance` overrides individual budget fields.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
#[component]
pub fn NetworkGraphCanvas(
	#[prop(into)] data: Signal<NetworkData>,
	#[prop(optional)] performance: Option<PerformanceOverride>,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(optional, into)] on_node_selected: Option<Callback<Option<NetworkNode>>>,
	#[prop(optional, into)] on_edge_hovered: Option<Callback<Option<NetworkEdge>>>,
	#[prop(default = false)] refinement: bool,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let (cursor, set_cursor) = signal("grab");
	let listeners = Listeners {
		on_node_selected,
		on_edge_hovered,
	};

	let state: Rc<RefCell<Option<NetworkGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::warn!("network-graph: 2d canvas context unavailable");
			return;
		};

		*state_init.borrow_mut() = Some(NetworkGraphState::new(
			&data.get_untracked(),
			w,
			h,
			performance.clone(),
			theme.clone().unwrap_or_default(),
		));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			let notifications = match *state_anim.borrow_mut() {
				Some(ref mut s) => {
					if let Some(frame) = s.frame(timestamp) {
						render::render(&frame, &ctx, s.theme(), s.width(), s.height());
					}
					s.take_notifications()
				}
				None => Vec::new(),
			};
			listeners.dispatch(notifications);

			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_data = state.clone();
	Effect::new(move |initialized: Option<()>| {
		let next = data.get();
		if initialized.is_none() {
			return;
		}
		if let Some(ref mut s) = *state_data.borrow_mut() {
			let accepted = if refinement {
				s.refine_dataset(&next, now_ms())
			} else {
				s.load_dataset(&next, now_ms())
			};
			if accepted {
				log::info!(
					"network-graph: dataset updated to {} nodes, {} edges",
					next.node_count(),
					next.edge_count()
				);
			}
		}
	});

	let pointer_position = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	// Runs `f` against the state, then fires callbacks outside the borrow.
	let with_state = {
		let state = state.clone();
		move |f: &dyn Fn(&mut NetworkGraphState)| {
			let notifications = match *state.borrow_mut() {
				Some(ref mut s) => {
					f(s);
					set_cursor.set(s.cursor());
					s.take_notifications()
				}
				None => return,
			};
			listeners.dispatch(notifications);
		}
	};

	let with_state_md = with_state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = pointer_position(&ev) else {
			return;
		};
		with_state_md(&|s| s.pointer_down(x, y, now_ms()));
	};

	let with_state_mm = with_state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(&ev) else {
			return;
		};
		with_state_mm(&|s| s.pointer_move(x, y, now_ms()));
	};

	let with_state_mu = with_state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state_mu(&|s| s.pointer_up(now_ms()));
	};

	let with_state_ml = with_state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state_ml(&|s| s.pointer_leave(now_ms()));
	};

	let with_state_wh = with_state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(&ev) else {
			return;
		};
		let delta_y = ev.delta_y();
		with_state_wh(&|s| {
			s.wheel(x, y, delta_y, now_ms());
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=move || format!("display: block; cursor: {};", cursor.get())
		/>
	}
}
