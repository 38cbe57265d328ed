use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::info;

use scrollto_core::dom::{ComputedStyle, ElementSpec};
use scrollto_core::timing::TICK_MS;
use scrollto_core::{
    AppConfig, Document, EasingName, ListenerTarget, OffsetMap, Platform, ScrollToOptions,
    ScrollToService, Viewport, VirtualDom,
};

const VIEWPORT_HEIGHT: f64 = 800.0;
const CONTAINER_HEIGHT: f64 = 400.0;
/// Extra page length below the target so the scroll range never clamps it
const PAGE_MARGIN: f64 = 10_000.0;

#[derive(Args)]
pub struct SimulateArgs {
    /// Top of the target element, in the page or inside the container
    #[arg(short, long, allow_negative_numbers = true)]
    target_top: f64,

    /// Initial window scroll offset
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Duration in milliseconds (defaults to the configured value)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Easing curve (defaults to the configured value)
    #[arg(short, long)]
    easing: Option<EasingName>,

    /// Base offset in pixels
    #[arg(short, long, allow_negative_numbers = true)]
    offset: Option<f64>,

    /// Responsive offset as WIDTH=OFFSET; repeatable
    #[arg(short, long = "breakpoint", value_parser = parse_breakpoint)]
    breakpoints: Vec<(f64, f64)>,

    /// Viewport width used to pick a breakpoint
    #[arg(long, default_value_t = 1024.0)]
    viewport_width: f64,

    /// Put the target inside a scrolling container at this page offset
    #[arg(long)]
    container_top: Option<f64>,

    /// Initial scroll offset of the container
    #[arg(long, default_value_t = 0.0)]
    container_scroll: f64,

    /// Send a touchstart after this many ticks
    #[arg(long)]
    interrupt_after: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    easing: EasingName,
    duration_ms: u64,
    positions: Vec<f64>,
    final_scroll: f64,
    interrupted: bool,
}

fn parse_breakpoint(s: &str) -> Result<(f64, f64), String> {
    let (width, offset) = s
        .split_once('=')
        .ok_or_else(|| format!("expected WIDTH=OFFSET, got '{}'", s))?;
    let width = width
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid width '{}': {}", width, e))?;
    let offset = offset
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid offset '{}': {}", offset, e))?;
    Ok((width, offset))
}

pub async fn run(config: &AppConfig, args: SimulateArgs) -> Result<()> {
    let page_height = args.target_top.abs() + args.start.abs() + PAGE_MARGIN;
    let dom = Arc::new(VirtualDom::new(args.viewport_width, VIEWPORT_HEIGHT, page_height));

    let scroller = match args.container_top {
        Some(top) => {
            let container = dom.append(
                dom.body(),
                ElementSpec::new("div")
                    .id("container")
                    .top(top)
                    .height(CONTAINER_HEIGHT)
                    .content_height(page_height)
                    .style(ComputedStyle::scrollable()),
            );
            dom.set_scroll_top(container, args.container_scroll);
            dom.append(container, ElementSpec::new("div").id("target").top(args.target_top));
            ListenerTarget::Element(container)
        }
        None => {
            dom.append(dom.body(), ElementSpec::new("div").id("target").top(args.target_top));
            ListenerTarget::Window
        }
    };
    dom.window_scroll_to(0.0, args.start);

    let mut options = ScrollToOptions::new().target("target");
    if let Some(duration) = args.duration {
        options = options.duration_ms(duration);
    }
    if let Some(easing) = args.easing {
        options = options.easing(easing);
    }
    if let Some(offset) = args.offset {
        options = options.offset(offset);
    }
    if !args.breakpoints.is_empty() {
        options = options.offset_map(args.breakpoints.iter().copied().collect::<OffsetMap>());
    }
    let duration_ms = options.duration_ms.unwrap_or(config.defaults.duration_ms);
    let easing = options.easing.unwrap_or(config.defaults.easing);

    info!(?scroller, duration_ms, %easing, "Simulating scroll");

    let service = ScrollToService::new(dom.clone(), Platform::Browser, config.defaults.clone());
    let stream = service.scroll_to(options);

    let interrupter = args.interrupt_after.map(|ticks| {
        let dom = dom.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ticks * TICK_MS + TICK_MS / 2)).await;
            dom.dispatch_event(scroller, "touchstart") > 0
        })
    });

    let mut subscription = stream.subscribe();
    let mut positions = Vec::new();
    while let Some(item) = subscription.recv().await {
        positions.push(item?);
    }

    let interrupted = match interrupter {
        Some(handle) => {
            handle.abort();
            handle.await.unwrap_or(false)
        }
        None => false,
    };

    let final_scroll = match scroller {
        ListenerTarget::Window => dom.window_scroll_y(),
        ListenerTarget::Element(node) => dom.scroll_top(node),
    };

    let report = Report {
        easing,
        duration_ms,
        positions,
        final_scroll,
        interrupted,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} over {} ms\n", report.easing, report.duration_ms);
    for (tick, position) in report.positions.iter().enumerate() {
        println!("  tick {:>3}  {:>10.3}", tick + 1, position);
    }
    let suffix = if report.interrupted { " (interrupted)" } else { "" };
    println!("\nFinal scroll offset: {}{}", report.final_scroll, suffix);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_breakpoint() {
        assert_eq!(parse_breakpoint("800=50"), Ok((800.0, 50.0)));
        assert_eq!(parse_breakpoint(" 300 = -10 "), Ok((300.0, -10.0)));
        assert!(parse_breakpoint("800").is_err());
        assert!(parse_breakpoint("wide=10").is_err());
    }
}
