//! Plant Farm rendering. Reads the game, never changes it.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::achievements::{AchievementStatus, ACHIEVEMENTS};
use super::actions::*;
use super::catalog::Rarity;
use super::daily::DAILY_REWARDS;
use super::kitchen::{self, RECIPES};
use super::state::{ConsumableKind, FoodKind, Unlock, UpgradeKind};
use super::tuning;
use super::{FarmGame, Tab, GRID_COLUMNS};

/// Columns per grid cell: a two-column glyph with a space either side.
const CELL_WIDTH: u16 = 4;
const GROWTH_BARS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇'];

pub fn render(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let narrow = is_narrow_layout(area.width);

    let (main_area, log_area) = if narrow {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(12), Constraint::Length(6)])
            .split(area);
        (chunks[0], chunks[1])
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        (chunks[0], chunks[1])
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(1), // tabs
            Constraint::Min(6),    // panel
        ])
        .split(main_area);

    render_header(game, f, chunks[0]);
    render_tabs(game, f, chunks[1], click_state);
    match game.tab {
        Tab::Farm => render_farm(game, f, chunks[2], click_state),
        Tab::Inventory => render_inventory(game, f, chunks[2], click_state),
        Tab::Shop => render_shop(game, f, chunks[2], click_state),
        Tab::Kitchen => render_kitchen(game, f, chunks[2], click_state),
        Tab::Quests => render_quests(game, f, chunks[2], click_state),
        Tab::Collection => render_collection(game, f, chunks[2]),
        Tab::Stats => render_stats(game, f, chunks[2], click_state),
    }
    render_log(game, f, log_area);
}

fn render_header(game: &FarmGame, f: &mut Frame, area: Rect) {
    let state = &game.state;
    let now = game.now();

    let food = match state.food.kind {
        Some(kind) if state.food.active => Span::styled(
            format!("🍽️ {} {}", kind.name(), format_duration(state.food.remaining_ms(now))),
            Style::default().fg(Color::Green),
        ),
        _ => Span::styled("🍽️ no food", Style::default().fg(Color::Red)),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" 💰 {}G", state.ledger.gold),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        food,
        Span::styled(
            format!("   🌱 {} growing · {} ready", state.baby_count(), state.adult_count()),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            " 🌻 Plant Farm ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_tabs(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let bar = Tab::all()
        .iter()
        .fold(TabBar::new(game.tab.index()), |bar, tab| {
            bar.tab(tab.title(), tab.action_id())
        });
    bar.render(f, area, &mut click_state.borrow_mut());
}

// ── Farm ────────────────────────────────────────────────────────

fn render_farm(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let rows = game.grid_rows() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(rows.min(6) + 2), Constraint::Min(4)])
        .split(area);

    render_grid(game, f, chunks[0], click_state);

    let state = &game.state;
    let mut cl = ClickableList::new(" Field ");
    if state.buffs.is_empty() {
        cl.push(Line::from(Span::styled(" No active buffs", Style::default().fg(Color::DarkGray))));
    }
    for buff in state.buffs.iter() {
        let left = buff.end_time().saturating_sub(game.now());
        cl.push(Line::from(Span::styled(
            format!(" {} ({})", buff.description(), format_duration(left)),
            Style::default().fg(Color::Magenta),
        )));
    }
    cl.push(Line::from(Span::styled(
        format!(
            " Spawn chance {:.1}%  ·  pity {}",
            super::logic::spawn_probability(state) * 100.0,
            state.pity.failures()
        ),
        Style::default().fg(Color::DarkGray),
    )));
    if state.unlocks.has(Unlock::HarvestAll) {
        cl.push_clickable(button("H", "Harvest all adults", Color::Green), HARVEST_ALL);
    }
    if rows > chunks[0].height.saturating_sub(2) {
        cl.push_clickable(button("↑", "Scroll field up", Color::Gray), GRID_SCROLL_UP);
        cl.push_clickable(button("↓", "Scroll field down", Color::Gray), GRID_SCROLL_DOWN);
    }
    cl.push(Line::from(Span::styled(
        " Tap a grown plant to harvest it",
        Style::default().fg(Color::DarkGray),
    )));
    cl.render(f, chunks[1], &mut click_state.borrow_mut());
}

fn render_grid(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" Farm {} slots ", game.state.grid.len()));
    let inner = block.inner(area);

    let first_row = game.grid_scroll as usize;
    let visible = inner.height as usize;
    let mut lines = Vec::new();
    let mut cs = click_state.borrow_mut();

    for (r, row) in game
        .state
        .grid
        .chunks(GRID_COLUMNS)
        .enumerate()
        .skip(first_row)
        .take(visible)
    {
        let mut spans = Vec::with_capacity(row.len());
        for (c, slot) in row.iter().enumerate() {
            let index = r * GRID_COLUMNS + c;
            let span = match slot {
                None => Span::styled(" ·  ", Style::default().fg(Color::DarkGray)),
                Some(plant) if plant.is_adult() => {
                    let (emoji, color) = match game.catalog.get(&plant.kind) {
                        Some(p) => (p.emoji, rarity_color(p.rarity)),
                        None => ("?", Color::Gray),
                    };
                    Span::styled(format!(" {} ", emoji), Style::default().fg(color))
                }
                Some(plant) => {
                    let step = (plant.progress_ratio() * GROWTH_BARS.len() as f64) as usize;
                    let bar = GROWTH_BARS[step.min(GROWTH_BARS.len() - 1)];
                    Span::styled(format!(" {}  ", bar), Style::default().fg(Color::LightGreen))
                }
            };
            spans.push(span);

            let x = inner.x + c as u16 * CELL_WIDTH;
            let y = inner.y + (r - first_row) as u16;
            if x + CELL_WIDTH <= inner.x + inner.width {
                cs.add_click_target(
                    Rect::new(x, y, CELL_WIDTH, 1),
                    HARVEST_SLOT_BASE + index as u16,
                );
            }
        }
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Inventory ───────────────────────────────────────────────────

fn render_inventory(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let multiplier = state.buffs.gold_multiplier();
    let mut cl = ClickableList::new(" Bag ");

    if state.ledger.inventory.is_empty() {
        cl.push(Line::from(Span::styled(
            " Nothing harvested yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, entry) in state.ledger.inventory.values().enumerate() {
        let unit = super::economy::sale_value(entry.value, 1, multiplier);
        let stack = super::economy::sale_value(entry.value, entry.count, multiplier);
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    format!(" {} {} x{}", entry.emoji, entry.name, entry.count),
                    Style::default().fg(rarity_color(entry.rarity)),
                ),
                Span::styled(format!("  sell 1 → {}G", unit), Style::default().fg(Color::Yellow)),
            ]),
            SELL_ONE_BASE + i as u16,
        );
        cl.push_clickable(
            Line::from(Span::styled(
                format!("     sell all {} → {}G", entry.count, stack),
                Style::default().fg(Color::DarkGray),
            )),
            SELL_STACK_BASE + i as u16,
        );
    }
    if !state.ledger.inventory.is_empty() {
        cl.push(Line::from(""));
        cl.push_clickable(button("S", "Sell everything", Color::Yellow), SELL_ALL);
    }
    cl.render(f, area, &mut click_state.borrow_mut());
}

// ── Shop ────────────────────────────────────────────────────────

fn render_shop(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let now = game.now();
    let gold = state.ledger.gold;
    let mut cl = ClickableList::new(" Shop ");

    cl.push(section("Food"));
    for (i, kind) in FoodKind::all().iter().enumerate() {
        let secs = super::economy::food_duration_ms(*kind, state.upgrades.fertilizer) / 1000;
        cl.push_clickable(
            priced(
                format!(" {} · {}s · x{}", kind.name(), secs, kind.multiplier()),
                kind.cost(),
                gold,
            ),
            ACTIVATE_FOOD_BASE + i as u16,
        );
    }
    if state.food.active {
        cl.push_clickable(plain(" Take the food away"), CANCEL_FOOD);
    }

    cl.push(section("Upgrades"));
    for (i, kind) in UpgradeKind::all().iter().enumerate() {
        let level = state.upgrades.level(*kind);
        let maxed = kind.max_level().is_some_and(|max| level >= max);
        let label = format!(" {} Lv.{} · {}", kind.name(), level, kind.description());
        let line = if maxed {
            Line::from(Span::styled(format!("{} · MAX", label), Style::default().fg(Color::DarkGray)))
        } else {
            priced(label, kind.cost(level), gold)
        };
        cl.push_clickable(line, BUY_UPGRADE_BASE + i as u16);
    }

    cl.push(section("Unlocks"));
    for (i, unlock) in Unlock::all().iter().enumerate() {
        let line = if state.unlocks.has(*unlock) {
            Line::from(Span::styled(format!(" {} ✔", unlock.name()), Style::default().fg(Color::DarkGray)))
        } else {
            priced(format!(" {}", unlock.name()), tuning::UNLOCK_COST, gold)
        };
        cl.push_clickable(line, BUY_UNLOCK_BASE + i as u16);
    }

    cl.push(section("Items"));
    for (i, kind) in ConsumableKind::all().iter().enumerate() {
        let owned = state.consumables.count(*kind);
        cl.push_clickable(
            priced(format!(" Buy {} {} (have {})", kind.emoji(), kind.name(), owned), kind.cost(), gold),
            BUY_CONSUMABLE_BASE + i as u16,
        );
        if owned > 0 {
            cl.push_clickable(plain(&format!("   Use {} {}", kind.emoji(), kind.name())), USE_CONSUMABLE_BASE + i as u16);
        }
    }
    cl.push_clickable(priced(" 🎁 Lucky box".into(), tuning::LUCKY_BOX_COST, gold), LUCKY_BOX);

    let day = state.daily.next_day(now);
    let reward = &DAILY_REWARDS[(day as usize).saturating_sub(1) % DAILY_REWARDS.len()];
    if state.daily.claimed_today(now) {
        cl.push(Line::from(Span::styled(
            format!(" 📅 Day {} claimed, come back tomorrow", state.daily.day),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        cl.push_clickable(
            button("D", &format!("Daily reward, day {}: {}", day, reward.label()), Color::Cyan),
            DAILY_REWARD,
        );
    }

    cl.render(f, area, &mut click_state.borrow_mut());
}

// ── Kitchen ─────────────────────────────────────────────────────

fn render_kitchen(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let now = game.now();
    let mut cl = ClickableList::new(" Kitchen ");

    match &state.cooking.job {
        Some(job) if job.is_ready(now) => {
            let name = kitchen::recipe(&job.dish).map(|r| r.name).unwrap_or("Dish");
            cl.push_clickable(button("C", &format!("Take out the {}", name), Color::Green), CLAIM_DISH);
        }
        Some(job) => cl.push(Line::from(Span::styled(
            format!(" 🔥 Cooking... {} left", format_duration(job.ready_at().saturating_sub(now))),
            Style::default().fg(Color::LightRed),
        ))),
        None => {
            let pot: Vec<String> = game
                .pot
                .iter()
                .map(|k| game.catalog.get(k).map(|p| p.emoji.to_string()).unwrap_or_default())
                .collect();
            cl.push(Line::from(Span::styled(
                format!(" Pot: {} ({}/3)", pot.join(" "), game.pot.len()),
                Style::default().fg(Color::White),
            )));
            if game.pot.len() == 3 {
                cl.push_clickable(button("K", "Cook", Color::LightRed), START_COOKING);
            }
            if !game.pot.is_empty() {
                cl.push_clickable(button("X", "Empty the pot", Color::Gray), KITCHEN_CLEAR);
            }
        }
    }

    cl.push(section("Ingredients"));
    for (i, entry) in state.ledger.inventory.values().enumerate() {
        cl.push_clickable(
            plain(&format!(" + {} {} (x{})", entry.emoji, entry.name, entry.count)),
            KITCHEN_ADD_BASE + i as u16,
        );
    }

    cl.push(section("Pantry"));
    for (i, (key, count)) in state.ledger.pantry.iter().enumerate() {
        let Some(recipe) = kitchen::recipe(key) else {
            continue;
        };
        cl.push_clickable(
            plain(&format!(" Use {} {} x{} · {}", recipe.emoji, recipe.name, count, recipe.effect_text())),
            USE_DISH_BASE + i as u16,
        );
        cl.push_clickable(
            Line::from(Span::styled(
                format!("     sell one → {}G", recipe.value),
                Style::default().fg(Color::Yellow),
            )),
            SELL_DISH_BASE + i as u16,
        );
    }

    cl.push(section("Recipe book"));
    for recipe in RECIPES {
        let text = if state.cooking.discovered.contains(recipe.key) {
            format!(" {} {}: {}", recipe.emoji, recipe.name, recipe.effect_text())
        } else {
            " ??? ".to_string()
        };
        cl.push(Line::from(Span::styled(text, Style::default().fg(Color::Gray))));
    }

    cl.render(f, area, &mut click_state.borrow_mut());
}

// ── Quests & achievements ───────────────────────────────────────

fn render_quests(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let now = game.now();
    let mut cl = ClickableList::new(" Requests ");

    for (i, quest) in state.quests.quests.iter().enumerate() {
        let color = if quest.can_complete(state) { Color::Green } else { Color::Gray };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!(" {} wants ", quest.npc_label()), Style::default().fg(Color::White)),
                Span::styled(
                    format!("{}x {}", quest.count, quest.target_label(&game.catalog)),
                    Style::default().fg(color),
                ),
                Span::styled(format!(" → {}G", quest.reward), Style::default().fg(Color::Yellow)),
            ]),
            COMPLETE_QUEST_BASE + i as u16,
        );
    }
    cl.push(Line::from(Span::styled(
        format!(
            " New requests in {}",
            format_duration(state.quests.next_refresh_at.saturating_sub(now))
        ),
        Style::default().fg(Color::DarkGray),
    )));
    cl.push_clickable(
        priced(" 📜 Refresh now".into(), tuning::QUEST_REFRESH_COST, state.ledger.gold),
        REFRESH_QUESTS,
    );

    cl.push(section("Achievements"));
    for (i, achievement) in ACHIEVEMENTS.iter().enumerate() {
        let progress = achievement.stat.read(state).min(achievement.threshold);
        let (mark, color) = match state.achievements.status(i) {
            AchievementStatus::Locked => ("·", Color::DarkGray),
            AchievementStatus::Ready => ("🏆", Color::Yellow),
            AchievementStatus::Claimed => ("✔", Color::Green),
        };
        cl.push_clickable(
            Line::from(Span::styled(
                format!(
                    " {} {} {}/{} · {}G",
                    mark, achievement.name, progress, achievement.threshold, achievement.reward
                ),
                Style::default().fg(color),
            )),
            CLAIM_ACHIEVEMENT_BASE + i as u16,
        );
    }
    if state.achievements.ready_count() > 1 {
        cl.push_clickable(button("A", "Claim all achievements", Color::Yellow), CLAIM_ALL_ACHIEVEMENTS);
    }

    cl.render(f, area, &mut click_state.borrow_mut());
}

// ── Collection ──────────────────────────────────────────────────

fn render_collection(game: &FarmGame, f: &mut Frame, area: Rect) {
    let ledger = &game.state.ledger;
    let mut lines = vec![Line::from(Span::styled(
        format!(" Discovered {}/{}", ledger.discovered_count(), game.catalog.len()),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))];

    for plant in game.catalog.plants() {
        let entry = ledger.collection.get(&plant.key).filter(|e| e.discovered);
        let line = match entry {
            Some(e) => Line::from(vec![
                Span::styled(
                    format!(" {} {} ", plant.emoji, plant.name),
                    Style::default().fg(rarity_color(plant.rarity)),
                ),
                Span::styled(
                    format!("[{}] x{} · {}", plant.rarity.name(), e.count, plant.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            None => Line::from(Span::styled(
                format!(" ❔ ??? ({})", plant.rarity.name()),
                Style::default().fg(Color::DarkGray),
            )),
        };
        lines.push(line);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Plant book ");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

// ── Stats ───────────────────────────────────────────────────────

fn render_stats(game: &FarmGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = &game.state;
    let mut cl = ClickableList::new(" Statistics ");

    if !state.unlocks.has(Unlock::Statistics) {
        cl.push(Line::from(Span::styled(
            " Statistics are locked",
            Style::default().fg(Color::DarkGray),
        )));
        let index = Unlock::all().iter().position(|u| *u == Unlock::Statistics).unwrap_or(0);
        cl.push_clickable(
            priced(" 🔓 Unlock statistics".into(), tuning::UNLOCK_COST, state.ledger.gold),
            BUY_UNLOCK_BASE + index as u16,
        );
        cl.render(f, area, &mut click_state.borrow_mut());
        return;
    }

    let stats = &state.stats;
    let rows = [
        ("Plants harvested", stats.total_harvested),
        ("Gold earned", stats.total_gold_earned),
        ("Items sold", stats.total_sold),
        ("Plants sprouted", stats.spawns),
        ("Dishes cooked", stats.dishes_cooked),
        ("Requests filled", stats.quests_completed),
        ("Species discovered", state.ledger.discovered_count() as u64),
        ("Achievements claimed", state.achievements.claimed_count() as u64),
    ];
    for (label, value) in rows {
        cl.push(Line::from(vec![
            Span::styled(format!(" {:<22}", label), Style::default().fg(Color::Gray)),
            Span::styled(value.to_string(), Style::default().fg(Color::White)),
        ]));
    }
    cl.push(Line::from(Span::styled(
        format!(
            " Rarity Lv.{}  Growth Lv.{}  Fertilizer Lv.{}  Land Lv.{}",
            state.upgrades.rarity,
            state.upgrades.growth_speed,
            state.upgrades.fertilizer,
            state.upgrades.land_capacity
        ),
        Style::default().fg(Color::DarkGray),
    )));
    cl.render(f, area, &mut click_state.borrow_mut());
}

// ── Log ─────────────────────────────────────────────────────────

fn render_log(game: &FarmGame, f: &mut Frame, area: Rect) {
    let log = &game.state.log;
    let visible = area.height.saturating_sub(2) as usize;
    let start = log.len().saturating_sub(visible);
    let lines: Vec<Line> = log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Log ");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

// ── Helpers ─────────────────────────────────────────────────────

fn button(key: &str, label: &str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" [{}] ", key),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(label.to_string(), Style::default().fg(Color::White)),
    ])
}

fn plain(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::White)))
}

/// A purchasable row; the price is red when it cannot be paid.
fn priced(label: String, cost: u64, gold: u64) -> Line<'static> {
    let price = if cost == 0 { "free".to_string() } else { format!("{}G", cost) };
    let color = if gold >= cost { Color::Yellow } else { Color::Red };
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::White)),
        Span::styled(format!("  {}", price), Style::default().fg(color)),
    ])
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" ── {} ──", title),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::White,
        Rarity::Rare => Color::LightBlue,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Yellow,
        Rarity::Mythic => Color::LightRed,
    }
}

/// `95_000` → `"1m 35s"`.
pub fn format_duration(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, secs % 3600 / 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
