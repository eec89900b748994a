mod farm;
mod input;
mod logger;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use rand::rngs::StdRng;
use rand::SeedableRng;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use farm::catalog::Catalog;
use farm::save::SaveStore;
use farm::tuning::{MAX_FRAME_DELTA_MS, TICK_INTERVAL_MS};
use farm::FarmGame;
use input::{pixel_to_cell, ClickState, InputEvent};
use time::{GameTime, WallClock};

/// Map a mouse position to a terminal cell using the grid container's
/// bounding rect.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend renders into the first <div> under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_to_cell(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_to_cell(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn open_store() -> Box<dyn SaveStore> {
    Box::new(farm::save::LocalStorage)
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store() -> Box<dyn SaveStore> {
    Box::new(farm::save::MemoryStore::new())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    if let Err(e) = logger::init(logger::default_level()) {
        eprintln!("logger already installed: {}", e);
    }

    let catalog = Catalog::builtin().map_err(|e| {
        log::error!("bad catalog: {}", e);
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;

    let game = Rc::new(RefCell::new(FarmGame::new(
        catalog,
        open_store(),
        Box::new(WallClock),
        StdRng::from_entropy(),
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let game_time = Rc::new(RefCell::new(GameTime::new(
        TICK_INTERVAL_MS as f64,
        MAX_FRAME_DELTA_MS,
    )));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;
    log::info!("plant farm started");

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(id) = action {
                log::debug!("click -> action {}", id);
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let step = game_time.borrow_mut().update(now_ms());
            {
                let mut g = game.borrow_mut();
                if let Some(gap) = step.gap_ms {
                    log::debug!("frame gap of {:.0}ms", gap);
                    g.catch_up_gap();
                }
                g.tick(step.ticks);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
