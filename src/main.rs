use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::KeyCode;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use rustact_hooks::runtime::Color;
use rustact_hooks::{App, AppConfig, Element, IntersectionConfig, Scope, component, is_key};

const APP_NAME: &str = "Rustact Hooks Demo";
const FEED_ROWS: usize = 12;
const TOAST_DELAY: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("read runtime configuration")?;
    App::new(APP_NAME, component("DemoRoot", demo_root))
        .with_config(config)
        .run()
        .await
}

fn demo_root(_ctx: &mut Scope) -> Element {
    Element::node("root")
        .row()
        .child(component("Popover", popover))
        .child(component("Feed", feed))
        .child(component("Toast", toast))
        .into()
}

/// Runs `handler` for every press of `code` while the component is mounted.
fn use_key<F>(ctx: &mut Scope, code: KeyCode, handler: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let handler = ctx.use_latest(Arc::new(handler));
    ctx.use_effect(code, move |dispatcher| {
        let mut events = dispatcher.events().subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if is_key(&event, code) {
                            let handler = handler.get();
                            handler();
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Some(Box::new(move || handle.abort()))
    });
}

fn popover(ctx: &mut Scope) -> Element {
    let (open, set_open) = ctx.use_state(|| false);
    let menu = ctx.use_node_ref();

    let toggle = set_open.clone();
    use_key(ctx, KeyCode::Char('p'), move || toggle.update(|open| *open = !*open));

    let close = set_open.clone();
    ctx.use_click_outside(&menu, move |event| {
        info!(clicked = ?event.target, "closing popover");
        close.set(false);
    });

    let body = if open {
        Element::block("Menu")
            .bind(&menu)
            .size(6)
            .color(Color::Cyan)
            .child("Open")
            .child("Rename")
            .child("Delete")
            .into()
    } else {
        Element::text("press p to open the menu")
    };
    Element::block("Popover")
        .child(body)
        .child("click anywhere else to close")
        .into()
}

fn feed(ctx: &mut Scope) -> Element {
    let (offset, set_offset) = ctx.use_state(|| 0u16);
    let (at_end, set_at_end) = ctx.use_state(|| false);
    let list = ctx.use_node_ref();
    let last = ctx.use_node_ref();

    let down = set_offset.clone();
    use_key(ctx, KeyCode::Down, move || {
        down.update(|offset| *offset = offset.saturating_add(1))
    });
    let up = set_offset.clone();
    use_key(ctx, KeyCode::Up, move || {
        up.update(|offset| *offset = offset.saturating_sub(1))
    });
    ctx.use_intersection_with(
        &last,
        move |visible| set_at_end.set(visible),
        IntersectionConfig::new().root(&list),
    );

    let rows = (0..FEED_ROWS).map(|index| {
        let row = Element::node("row").size(2).child(format!("item {index}"));
        if index + 1 == FEED_ROWS { row.bind(&last) } else { row }
    });
    let status = if at_end {
        "end of feed reached"
    } else {
        "use up/down to scroll"
    };
    Element::block("Feed")
        .child(Element::node("status").size(1).child(status))
        .child(Element::node("list").bind(&list).scroll(offset).children(rows))
        .into()
}

fn toast(ctx: &mut Scope) -> Element {
    let timeout = ctx.use_timeout(|| info!("toast expired"), TOAST_DELAY);

    let reset = timeout.clone();
    use_key(ctx, KeyCode::Char('r'), move || reset.reset());
    let stop = timeout.clone();
    use_key(ctx, KeyCode::Char('s'), move || stop.stop());

    let message = if timeout.fired_at_render() {
        "toast dismissed, press r to show it again"
    } else {
        "saved! (press s to pin)"
    };
    Element::block("Toast").child(message).into()
}
