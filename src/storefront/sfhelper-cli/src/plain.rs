//! Plain-text output for non-interactive use.
//!
//! Mounts the same screen state the TUI uses, resolves its request
//! synchronously, and prints the result as text.

use crate::router::Route;
use crate::screens::{DetailScreen, ListingScreen};
use crate::state::{Status, Ticket};
use anyhow::{Result, bail};
use sfhelper_catalog::{
    CatalogSource, ListQuery, display_value, fetch_product_detail, fetch_product_list,
};
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Print the screen for `path` to stdout.
///
/// Fails if no route matches or the screen's request failed; the text
/// is printed first either way.
pub fn run(source: &CatalogSource, path: &str, query: &ListQuery) -> Result<()> {
    let Some(route) = Route::parse(path) else {
        bail!("no route matches '{}'", path);
    };

    let ticket = Ticket(1);
    let (text, status) = match route {
        Route::Products => {
            let mut screen = ListingScreen::default();
            screen.activate(ticket);
            screen.resolve(ticket, fetch_product_list(source, query));
            (listing_text(&screen), screen.status().clone())
        }
        Route::ProductDetails(params) => {
            let mut screen = DetailScreen::new(&params.id, Duration::ZERO);
            screen.activate(params.id.clone(), ticket);
            let result = fetch_product_detail(source, &params.id);
            screen.resolve(ticket, result, Instant::now());
            (detail_text(&screen), screen.status().clone())
        }
    };

    print!("{}", text);

    if let Status::Failed(reason) = status {
        bail!("request failed: {}", reason);
    }
    Ok(())
}

pub(crate) fn listing_text(screen: &ListingScreen) -> String {
    let mut out = String::from("Product List\n");
    if let Status::Failed(reason) = screen.status() {
        let _ = writeln!(out, "\nCould not load products: {}", reason);
        return out;
    }
    for product in screen.products() {
        let _ = writeln!(out, "\n{}  {}", product.title, product.detail_path());
        if let Some(description) = product.description.lines().next() {
            let _ = writeln!(out, "  {}", description);
        }
        let _ = writeln!(
            out,
            "  ★ {}   {} ({})   {} $",
            product.rating, product.stock, product.availability_status, product.price
        );
        if !product.thumbnail.is_empty() {
            let _ = writeln!(out, "  {}", product.thumbnail);
        }
    }
    out
}

pub(crate) fn detail_text(screen: &DetailScreen) -> String {
    let mut out = String::new();
    match screen.status() {
        Status::Loaded => {}
        Status::Failed(reason) => {
            let _ = writeln!(out, "No data ({})", reason);
            return out;
        }
        _ => {
            out.push_str("No data\n");
            return out;
        }
    }

    out.push_str("Product Details\n");

    let slides = screen.carousel().slides();
    if !slides.is_empty() {
        out.push_str("\nImages:\n");
        for (i, url) in slides.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, url);
        }
    }

    out.push('\n');
    if !screen.chips().is_empty() {
        let labels: Vec<&str> = screen.chips().iter().map(|c| c.label.as_str()).collect();
        let _ = writeln!(out, "Keywords: {}", labels.join(", "));
    }
    for (key, value) in screen.detail().listed_fields() {
        let _ = writeln!(out, "{}: {}", key, display_value(value));
    }
    out
}
